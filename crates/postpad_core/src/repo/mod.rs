//! Repository layer: per-collection contracts and SQLite implementations.
//!
//! # Responsibility
//! - Define use-case oriented data access contracts.
//! - Isolate SQLite query details from service/workflow orchestration.
//!
//! # Invariants
//! - Every user-data repository is bound to one `Session`; each statement
//!   filters on that session's user id.
//! - Writes of records owned by another user fail with `OwnerMismatch`.
//! - Reads of another user's record behave as not-found.
//! - Timestamps persist as INTEGER epoch milliseconds (UTC).

use crate::db::DbError;
use chrono::{DateTime, Utc};
use rusqlite::Connection;
use thiserror::Error;
use uuid::Uuid;

pub mod account_repo;
pub mod draft_repo;
pub mod post_repo;
pub mod streak_repo;
pub mod tag_repo;
pub mod todo_repo;

pub type RepoResult<T> = Result<T, RepoError>;

/// Persistence error shared by all repositories.
#[derive(Debug, Error)]
pub enum RepoError {
    #[error(transparent)]
    Db(#[from] DbError),
    #[error("{collection} record not found: {id}")]
    NotFound { collection: &'static str, id: Uuid },
    #[error("{collection} record `{key}` already exists")]
    Duplicate {
        collection: &'static str,
        key: String,
    },
    #[error("refusing to write {collection} record owned by another user")]
    OwnerMismatch { collection: &'static str },
    #[error("required table is missing: {0}")]
    MissingRequiredTable(&'static str),
    #[error("invalid persisted data: {0}")]
    InvalidData(String),
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

pub(crate) fn to_millis(value: DateTime<Utc>) -> i64 {
    value.timestamp_millis()
}

pub(crate) fn from_millis(value: i64, column: &str) -> RepoResult<DateTime<Utc>> {
    DateTime::from_timestamp_millis(value).ok_or_else(|| {
        RepoError::InvalidData(format!("timestamp `{value}` out of range in {column}"))
    })
}

pub(crate) fn parse_uuid(value: &str, column: &str) -> RepoResult<Uuid> {
    Uuid::parse_str(value)
        .map_err(|_| RepoError::InvalidData(format!("invalid uuid value `{value}` in {column}")))
}

pub(crate) fn bool_to_int(value: bool) -> i64 {
    if value {
        1
    } else {
        0
    }
}

pub(crate) fn int_to_bool(value: i64, column: &str) -> RepoResult<bool> {
    match value {
        0 => Ok(false),
        1 => Ok(true),
        other => Err(RepoError::InvalidData(format!(
            "invalid boolean `{other}` in {column}"
        ))),
    }
}

pub(crate) fn is_unique_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(code, _)
            if code.code == rusqlite::ErrorCode::ConstraintViolation
    )
}

pub(crate) fn ensure_table(conn: &Connection, table: &'static str) -> RepoResult<()> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = ?1
        );",
        [table],
        |row| row.get(0),
    )?;
    if exists == 1 {
        Ok(())
    } else {
        Err(RepoError::MissingRequiredTable(table))
    }
}

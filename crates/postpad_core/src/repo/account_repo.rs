//! Account persistence used by the auth service.

use crate::model::user::UserId;
use crate::repo::{
    ensure_table, from_millis, is_unique_violation, parse_uuid, to_millis, RepoError, RepoResult,
};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};

/// Stored account row including the password digest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountRecord {
    pub id: UserId,
    pub email: String,
    pub password_salt: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

pub trait AccountRepository {
    /// Inserts one account; duplicate email yields `RepoError::Duplicate`.
    fn create_account(&self, account: &AccountRecord) -> RepoResult<UserId>;
    fn find_by_email(&self, email: &str) -> RepoResult<Option<AccountRecord>>;
}

pub struct SqliteAccountRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteAccountRepository<'conn> {
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_table(conn, "accounts")?;
        Ok(Self { conn })
    }
}

impl AccountRepository for SqliteAccountRepository<'_> {
    fn create_account(&self, account: &AccountRecord) -> RepoResult<UserId> {
        let inserted = self.conn.execute(
            "INSERT INTO accounts (id, email, password_salt, password_hash, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5);",
            params![
                account.id.to_string(),
                account.email.as_str(),
                account.password_salt.as_str(),
                account.password_hash.as_str(),
                to_millis(account.created_at),
            ],
        );

        match inserted {
            Ok(_) => Ok(account.id),
            Err(err) if is_unique_violation(&err) => Err(RepoError::Duplicate {
                collection: "accounts",
                key: account.email.clone(),
            }),
            Err(err) => Err(err.into()),
        }
    }

    fn find_by_email(&self, email: &str) -> RepoResult<Option<AccountRecord>> {
        let row = self
            .conn
            .query_row(
                "SELECT id, email, password_salt, password_hash, created_at
                 FROM accounts
                 WHERE email = ?1;",
                [email],
                |row| {
                    Ok((
                        row.get::<_, String>("id")?,
                        row.get::<_, String>("email")?,
                        row.get::<_, String>("password_salt")?,
                        row.get::<_, String>("password_hash")?,
                        row.get::<_, i64>("created_at")?,
                    ))
                },
            )
            .optional()?;

        row.map(|(id, email, password_salt, password_hash, created_at)| {
            Ok(AccountRecord {
                id: parse_uuid(&id, "accounts.id")?,
                email,
                password_salt,
                password_hash,
                created_at: from_millis(created_at, "accounts.created_at")?,
            })
        })
        .transpose()
    }
}

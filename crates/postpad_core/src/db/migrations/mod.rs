//! Schema migrations for the content store.
//!
//! # Invariants
//! - Versions are contiguous from 1 and applied in order inside one
//!   transaction.
//! - The highest applied version is mirrored to `PRAGMA user_version`.

use crate::db::{DbError, DbResult};
use log::info;
use rusqlite::Connection;

struct Migration {
    version: u32,
    name: &'static str,
    sql: &'static str,
}

const MIGRATIONS: &[Migration] = &[
    Migration {
        version: 1,
        name: "init",
        sql: include_str!("0001_init.sql"),
    },
    Migration {
        version: 2,
        name: "draft_review",
        sql: include_str!("0002_draft_review.sql"),
    },
];

/// Schema version this binary writes.
pub fn latest_version() -> u32 {
    MIGRATIONS.last().map_or(0, |migration| migration.version)
}

/// Brings `conn` up to [`latest_version`]; returns how many steps ran.
pub fn apply_migrations(conn: &mut Connection) -> DbResult<usize> {
    let db_version: u32 = conn.query_row("PRAGMA user_version;", [], |row| row.get(0))?;
    let latest_supported = latest_version();
    if db_version > latest_supported {
        return Err(DbError::UnsupportedSchemaVersion {
            db_version,
            latest_supported,
        });
    }

    let pending = MIGRATIONS
        .iter()
        .filter(|migration| migration.version > db_version)
        .collect::<Vec<_>>();
    if pending.is_empty() {
        return Ok(0);
    }

    let tx = conn.transaction()?;
    for migration in &pending {
        tx.execute_batch(migration.sql)?;
        tx.pragma_update(None, "user_version", migration.version)?;
        info!(
            "event=db_migrate module=db status=ok version={} name={}",
            migration.version, migration.name
        );
    }
    tx.commit()?;
    Ok(pending.len())
}

#[cfg(test)]
mod tests {
    use super::{apply_migrations, latest_version, MIGRATIONS};
    use rusqlite::Connection;

    #[test]
    fn versions_are_contiguous() {
        for (index, migration) in MIGRATIONS.iter().enumerate() {
            assert_eq!(migration.version as usize, index + 1, "{}", migration.name);
        }
    }

    #[test]
    fn second_run_applies_nothing() {
        let mut conn = Connection::open_in_memory().unwrap();
        assert_eq!(apply_migrations(&mut conn).unwrap(), MIGRATIONS.len());
        assert_eq!(apply_migrations(&mut conn).unwrap(), 0);
        let version: u32 = conn
            .query_row("PRAGMA user_version;", [], |row| row.get(0))
            .unwrap();
        assert_eq!(version, latest_version());
    }
}

//! Streak record repository (one row per user).

use crate::model::streak::StreakRecord;
use crate::model::user::{Session, UserId};
use crate::repo::{ensure_table, RepoError, RepoResult};
use chrono::NaiveDate;
use rusqlite::{params, Connection, OptionalExtension};

const DATE_FORMAT: &str = "%Y-%m-%d";

pub trait StreakRepository {
    fn get_streak(&self) -> RepoResult<Option<StreakRecord>>;
    /// Inserts or replaces the caller's record.
    fn put_streak(&self, record: &StreakRecord) -> RepoResult<()>;
}

pub struct SqliteStreakRepository<'conn> {
    conn: &'conn Connection,
    owner: UserId,
}

impl<'conn> SqliteStreakRepository<'conn> {
    pub fn try_new(conn: &'conn Connection, session: &Session) -> RepoResult<Self> {
        ensure_table(conn, "streaks")?;
        Ok(Self {
            conn,
            owner: session.user_id(),
        })
    }
}

impl StreakRepository for SqliteStreakRepository<'_> {
    fn get_streak(&self) -> RepoResult<Option<StreakRecord>> {
        let row = self
            .conn
            .query_row(
                "SELECT current_streak, last_post_date FROM streaks WHERE user_id = ?1;",
                [self.owner.to_string()],
                |row| Ok((row.get::<_, i64>(0)?, row.get::<_, String>(1)?)),
            )
            .optional()?;

        let Some((current_streak, last_post_date)) = row else {
            return Ok(None);
        };
        let current_streak = u32::try_from(current_streak).map_err(|_| {
            RepoError::InvalidData(format!(
                "invalid streak count `{current_streak}` in streaks.current_streak"
            ))
        })?;
        let last_post_date =
            NaiveDate::parse_from_str(&last_post_date, DATE_FORMAT).map_err(|_| {
                RepoError::InvalidData(format!(
                    "invalid date `{last_post_date}` in streaks.last_post_date"
                ))
            })?;

        Ok(Some(StreakRecord {
            user_id: self.owner,
            current_streak,
            last_post_date,
        }))
    }

    fn put_streak(&self, record: &StreakRecord) -> RepoResult<()> {
        if record.user_id != self.owner {
            return Err(RepoError::OwnerMismatch {
                collection: "streaks",
            });
        }

        self.conn.execute(
            "INSERT INTO streaks (user_id, current_streak, last_post_date)
             VALUES (?1, ?2, ?3)
             ON CONFLICT(user_id) DO UPDATE SET
                current_streak = excluded.current_streak,
                last_post_date = excluded.last_post_date;",
            params![
                self.owner.to_string(),
                i64::from(record.current_streak),
                record.last_post_date.format(DATE_FORMAT).to_string(),
            ],
        )?;
        Ok(())
    }
}

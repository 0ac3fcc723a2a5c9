//! Draft repository contract and SQLite implementation.
//!
//! # Invariants
//! - Drafts are created and deleted, never updated in place.
//! - Listing is ordered by `created_at DESC, id ASC`.

use crate::model::draft::{Draft, DraftId};
use crate::model::user::{Session, UserId};
use crate::repo::{
    bool_to_int, ensure_table, from_millis, int_to_bool, parse_uuid, to_millis, RepoError,
    RepoResult,
};
use rusqlite::{params, Connection, Row};

const DRAFT_SELECT_SQL: &str = "SELECT
    id,
    user_id,
    content,
    created_at,
    needs_review
FROM drafts";

/// Session-scoped draft persistence.
pub trait DraftRepository {
    fn create_draft(&self, draft: &Draft) -> RepoResult<DraftId>;
    fn get_draft(&self, id: DraftId) -> RepoResult<Option<Draft>>;
    fn list_drafts(&self) -> RepoResult<Vec<Draft>>;
    /// Missing or foreign ids yield `RepoError::NotFound`.
    fn delete_draft(&self, id: DraftId) -> RepoResult<()>;
    fn count_drafts(&self) -> RepoResult<u64>;
}

pub struct SqliteDraftRepository<'conn> {
    conn: &'conn Connection,
    owner: UserId,
}

impl<'conn> SqliteDraftRepository<'conn> {
    pub fn try_new(conn: &'conn Connection, session: &Session) -> RepoResult<Self> {
        ensure_table(conn, "drafts")?;
        Ok(Self {
            conn,
            owner: session.user_id(),
        })
    }
}

impl DraftRepository for SqliteDraftRepository<'_> {
    fn create_draft(&self, draft: &Draft) -> RepoResult<DraftId> {
        if draft.user_id != self.owner {
            return Err(RepoError::OwnerMismatch {
                collection: "drafts",
            });
        }

        self.conn.execute(
            "INSERT INTO drafts (id, user_id, content, created_at, needs_review)
             VALUES (?1, ?2, ?3, ?4, ?5);",
            params![
                draft.id.to_string(),
                self.owner.to_string(),
                draft.content.as_str(),
                to_millis(draft.created_at),
                bool_to_int(draft.needs_review),
            ],
        )?;
        Ok(draft.id)
    }

    fn get_draft(&self, id: DraftId) -> RepoResult<Option<Draft>> {
        let mut stmt = self.conn.prepare(&format!(
            "{DRAFT_SELECT_SQL}
             WHERE id = ?1 AND user_id = ?2;"
        ))?;
        let mut rows = stmt.query(params![id.to_string(), self.owner.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_draft_row(row)?));
        }
        Ok(None)
    }

    fn list_drafts(&self) -> RepoResult<Vec<Draft>> {
        let mut stmt = self.conn.prepare(&format!(
            "{DRAFT_SELECT_SQL}
             WHERE user_id = ?1
             ORDER BY created_at DESC, id ASC;"
        ))?;
        let mut rows = stmt.query([self.owner.to_string()])?;
        let mut drafts = Vec::new();
        while let Some(row) = rows.next()? {
            drafts.push(parse_draft_row(row)?);
        }
        Ok(drafts)
    }

    fn delete_draft(&self, id: DraftId) -> RepoResult<()> {
        let changed = self.conn.execute(
            "DELETE FROM drafts WHERE id = ?1 AND user_id = ?2;",
            params![id.to_string(), self.owner.to_string()],
        )?;
        if changed == 0 {
            return Err(RepoError::NotFound {
                collection: "drafts",
                id,
            });
        }
        Ok(())
    }

    fn count_drafts(&self) -> RepoResult<u64> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM drafts WHERE user_id = ?1;",
            [self.owner.to_string()],
            |row| row.get(0),
        )?;
        Ok(count.max(0) as u64)
    }
}

fn parse_draft_row(row: &Row<'_>) -> RepoResult<Draft> {
    let id: String = row.get("id")?;
    let user_id: String = row.get("user_id")?;
    Ok(Draft {
        id: parse_uuid(&id, "drafts.id")?,
        user_id: parse_uuid(&user_id, "drafts.user_id")?,
        content: row.get("content")?,
        created_at: from_millis(row.get("created_at")?, "drafts.created_at")?,
        needs_review: int_to_bool(row.get("needs_review")?, "drafts.needs_review")?,
    })
}

//! Tag repository contract and SQLite implementation.
//!
//! # Invariants
//! - `(user_id, name)` is unique; a second insert yields `Duplicate`.
//! - Deleting a tag detaches it from every to-do (FK cascade on `todo_tags`).

use crate::model::tag::{Tag, TagId};
use crate::model::user::{Session, UserId};
use crate::repo::{ensure_table, is_unique_violation, parse_uuid, RepoError, RepoResult};
use rusqlite::{params, Connection};

pub trait TagRepository {
    fn create_tag(&self, tag: &Tag) -> RepoResult<TagId>;
    /// Sorted by name.
    fn list_tags(&self) -> RepoResult<Vec<Tag>>;
    fn find_tag_by_name(&self, name: &str) -> RepoResult<Option<Tag>>;
    fn delete_tag(&self, id: TagId) -> RepoResult<()>;
    fn count_tags(&self) -> RepoResult<u64>;
}

pub struct SqliteTagRepository<'conn> {
    conn: &'conn Connection,
    owner: UserId,
}

impl<'conn> SqliteTagRepository<'conn> {
    pub fn try_new(conn: &'conn Connection, session: &Session) -> RepoResult<Self> {
        ensure_table(conn, "tags")?;
        ensure_table(conn, "todo_tags")?;
        Ok(Self {
            conn,
            owner: session.user_id(),
        })
    }

    fn query_tags(&self, sql: &str, name: Option<&str>) -> RepoResult<Vec<Tag>> {
        let mut stmt = self.conn.prepare(sql)?;
        let mut rows = match name {
            Some(name) => stmt.query(params![self.owner.to_string(), name])?,
            None => stmt.query([self.owner.to_string()])?,
        };
        let mut tags = Vec::new();
        while let Some(row) = rows.next()? {
            let id: String = row.get("id")?;
            tags.push(Tag {
                id: parse_uuid(&id, "tags.id")?,
                user_id: self.owner,
                name: row.get("name")?,
            });
        }
        Ok(tags)
    }
}

impl TagRepository for SqliteTagRepository<'_> {
    fn create_tag(&self, tag: &Tag) -> RepoResult<TagId> {
        if tag.user_id != self.owner {
            return Err(RepoError::OwnerMismatch { collection: "tags" });
        }

        let inserted = self.conn.execute(
            "INSERT INTO tags (id, user_id, name) VALUES (?1, ?2, ?3);",
            params![tag.id.to_string(), self.owner.to_string(), tag.name.as_str()],
        );
        match inserted {
            Ok(_) => Ok(tag.id),
            Err(err) if is_unique_violation(&err) => Err(RepoError::Duplicate {
                collection: "tags",
                key: tag.name.clone(),
            }),
            Err(err) => Err(err.into()),
        }
    }

    fn list_tags(&self) -> RepoResult<Vec<Tag>> {
        self.query_tags(
            "SELECT id, name FROM tags WHERE user_id = ?1 ORDER BY name ASC;",
            None,
        )
    }

    fn find_tag_by_name(&self, name: &str) -> RepoResult<Option<Tag>> {
        let mut tags = self.query_tags(
            "SELECT id, name FROM tags WHERE user_id = ?1 AND name = ?2;",
            Some(name),
        )?;
        Ok(tags.pop())
    }

    fn delete_tag(&self, id: TagId) -> RepoResult<()> {
        let changed = self.conn.execute(
            "DELETE FROM tags WHERE id = ?1 AND user_id = ?2;",
            params![id.to_string(), self.owner.to_string()],
        )?;
        if changed == 0 {
            return Err(RepoError::NotFound {
                collection: "tags",
                id,
            });
        }
        Ok(())
    }

    fn count_tags(&self) -> RepoResult<u64> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM tags WHERE user_id = ?1;",
            [self.owner.to_string()],
            |row| row.get(0),
        )?;
        Ok(count.max(0) as u64)
    }
}

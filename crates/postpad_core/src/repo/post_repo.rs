//! Published-post log repository.
//!
//! The log is append-only: there is no update or delete path.

use crate::model::post::PublishedPost;
use crate::model::user::{Session, UserId};
use crate::repo::{ensure_table, from_millis, parse_uuid, to_millis, RepoError, RepoResult};
use rusqlite::{params, Connection, Row};
use uuid::Uuid;

pub trait PostRepository {
    fn append_post(&self, post: &PublishedPost) -> RepoResult<Uuid>;
    /// Newest first.
    fn list_posts(&self) -> RepoResult<Vec<PublishedPost>>;
    fn count_posts(&self) -> RepoResult<u64>;
}

pub struct SqlitePostRepository<'conn> {
    conn: &'conn Connection,
    owner: UserId,
}

impl<'conn> SqlitePostRepository<'conn> {
    pub fn try_new(conn: &'conn Connection, session: &Session) -> RepoResult<Self> {
        ensure_table(conn, "published_posts")?;
        Ok(Self {
            conn,
            owner: session.user_id(),
        })
    }
}

impl PostRepository for SqlitePostRepository<'_> {
    fn append_post(&self, post: &PublishedPost) -> RepoResult<Uuid> {
        if post.user_id != self.owner {
            return Err(RepoError::OwnerMismatch {
                collection: "published_posts",
            });
        }

        self.conn.execute(
            "INSERT INTO published_posts (id, user_id, content, external_post_id, posted_at)
             VALUES (?1, ?2, ?3, ?4, ?5);",
            params![
                post.id.to_string(),
                self.owner.to_string(),
                post.content.as_str(),
                post.external_post_id.as_str(),
                to_millis(post.posted_at),
            ],
        )?;
        Ok(post.id)
    }

    fn list_posts(&self) -> RepoResult<Vec<PublishedPost>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, user_id, content, external_post_id, posted_at
             FROM published_posts
             WHERE user_id = ?1
             ORDER BY posted_at DESC, id ASC;",
        )?;
        let mut rows = stmt.query([self.owner.to_string()])?;
        let mut posts = Vec::new();
        while let Some(row) = rows.next()? {
            posts.push(parse_post_row(row)?);
        }
        Ok(posts)
    }

    fn count_posts(&self) -> RepoResult<u64> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM published_posts WHERE user_id = ?1;",
            [self.owner.to_string()],
            |row| row.get(0),
        )?;
        Ok(count.max(0) as u64)
    }
}

fn parse_post_row(row: &Row<'_>) -> RepoResult<PublishedPost> {
    let id: String = row.get("id")?;
    let user_id: String = row.get("user_id")?;
    Ok(PublishedPost {
        id: parse_uuid(&id, "published_posts.id")?,
        user_id: parse_uuid(&user_id, "published_posts.user_id")?,
        content: row.get("content")?,
        external_post_id: row.get("external_post_id")?,
        posted_at: from_millis(row.get("posted_at")?, "published_posts.posted_at")?,
    })
}

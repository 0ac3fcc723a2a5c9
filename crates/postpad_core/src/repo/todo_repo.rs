//! To-do repository contract and SQLite implementation.
//!
//! # Invariants
//! - `update_todo` replaces every mutable field, including the tag set, in
//!   one transaction.
//! - Tag links only ever point at tags of the same owner.

use crate::model::todo::{Priority, TodoId, TodoItem, TodoStatus};
use crate::model::user::{Session, UserId};
use crate::repo::{
    bool_to_int, ensure_table, from_millis, int_to_bool, parse_uuid, to_millis, RepoError,
    RepoResult,
};
use rusqlite::{params, Connection, OptionalExtension, Row, Transaction};
use std::collections::BTreeSet;

const TODO_SELECT_SQL: &str = "SELECT
    id,
    user_id,
    text,
    completed,
    created_at,
    completed_at,
    priority,
    status
FROM todos";

/// Open and completed counts for one owner.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TodoCounts {
    pub open: u64,
    pub completed: u64,
}

pub trait TodoRepository {
    fn create_todo(&self, todo: &TodoItem) -> RepoResult<TodoId>;
    fn get_todo(&self, id: TodoId) -> RepoResult<Option<TodoItem>>;
    /// Newest first.
    fn list_todos(&self) -> RepoResult<Vec<TodoItem>>;
    fn update_todo(&self, todo: &TodoItem) -> RepoResult<()>;
    fn delete_todo(&self, id: TodoId) -> RepoResult<()>;
    fn count_todos(&self) -> RepoResult<TodoCounts>;
}

pub struct SqliteTodoRepository<'conn> {
    conn: &'conn Connection,
    owner: UserId,
}

impl<'conn> SqliteTodoRepository<'conn> {
    pub fn try_new(conn: &'conn Connection, session: &Session) -> RepoResult<Self> {
        ensure_table(conn, "todos")?;
        ensure_table(conn, "todo_tags")?;
        Ok(Self {
            conn,
            owner: session.user_id(),
        })
    }

    fn ensure_owned(&self, todo: &TodoItem) -> RepoResult<()> {
        if todo.user_id != self.owner {
            return Err(RepoError::OwnerMismatch { collection: "todos" });
        }
        Ok(())
    }

    fn parse_row(&self, row: &Row<'_>) -> RepoResult<TodoItem> {
        let id: String = row.get("id")?;
        let user_id: String = row.get("user_id")?;
        let priority: String = row.get("priority")?;
        let status: String = row.get("status")?;
        let completed_at = row
            .get::<_, Option<i64>>("completed_at")?
            .map(|value| from_millis(value, "todos.completed_at"))
            .transpose()?;

        Ok(TodoItem {
            tags: load_tag_names(self.conn, &id)?,
            id: parse_uuid(&id, "todos.id")?,
            user_id: parse_uuid(&user_id, "todos.user_id")?,
            text: row.get("text")?,
            completed: int_to_bool(row.get("completed")?, "todos.completed")?,
            created_at: from_millis(row.get("created_at")?, "todos.created_at")?,
            completed_at,
            priority: Priority::parse(&priority).ok_or_else(|| {
                RepoError::InvalidData(format!("invalid priority `{priority}` in todos.priority"))
            })?,
            status: TodoStatus::parse(&status).ok_or_else(|| {
                RepoError::InvalidData(format!("invalid status `{status}` in todos.status"))
            })?,
        })
    }
}

impl TodoRepository for SqliteTodoRepository<'_> {
    fn create_todo(&self, todo: &TodoItem) -> RepoResult<TodoId> {
        self.ensure_owned(todo)?;

        let tx = self.conn.unchecked_transaction()?;
        tx.execute(
            "INSERT INTO todos (id, user_id, text, completed, created_at, completed_at, priority, status)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8);",
            params![
                todo.id.to_string(),
                self.owner.to_string(),
                todo.text.as_str(),
                bool_to_int(todo.completed),
                to_millis(todo.created_at),
                todo.completed_at.map(to_millis),
                todo.priority.as_str(),
                todo.status.as_str(),
            ],
        )?;
        replace_tag_links(&tx, self.owner, todo)?;
        tx.commit()?;
        Ok(todo.id)
    }

    fn get_todo(&self, id: TodoId) -> RepoResult<Option<TodoItem>> {
        let mut stmt = self.conn.prepare(&format!(
            "{TODO_SELECT_SQL}
             WHERE id = ?1 AND user_id = ?2;"
        ))?;
        let mut rows = stmt.query(params![id.to_string(), self.owner.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(self.parse_row(row)?));
        }
        Ok(None)
    }

    fn list_todos(&self) -> RepoResult<Vec<TodoItem>> {
        let mut stmt = self.conn.prepare(&format!(
            "{TODO_SELECT_SQL}
             WHERE user_id = ?1
             ORDER BY created_at DESC, id ASC;"
        ))?;
        let mut rows = stmt.query([self.owner.to_string()])?;
        let mut todos = Vec::new();
        while let Some(row) = rows.next()? {
            todos.push(self.parse_row(row)?);
        }
        Ok(todos)
    }

    fn update_todo(&self, todo: &TodoItem) -> RepoResult<()> {
        self.ensure_owned(todo)?;

        let tx = self.conn.unchecked_transaction()?;
        let changed = tx.execute(
            "UPDATE todos
             SET
                text = ?3,
                completed = ?4,
                completed_at = ?5,
                priority = ?6,
                status = ?7
             WHERE id = ?1 AND user_id = ?2;",
            params![
                todo.id.to_string(),
                self.owner.to_string(),
                todo.text.as_str(),
                bool_to_int(todo.completed),
                todo.completed_at.map(to_millis),
                todo.priority.as_str(),
                todo.status.as_str(),
            ],
        )?;
        if changed == 0 {
            return Err(RepoError::NotFound {
                collection: "todos",
                id: todo.id,
            });
        }
        replace_tag_links(&tx, self.owner, todo)?;
        tx.commit()?;
        Ok(())
    }

    fn delete_todo(&self, id: TodoId) -> RepoResult<()> {
        let changed = self.conn.execute(
            "DELETE FROM todos WHERE id = ?1 AND user_id = ?2;",
            params![id.to_string(), self.owner.to_string()],
        )?;
        if changed == 0 {
            return Err(RepoError::NotFound {
                collection: "todos",
                id,
            });
        }
        Ok(())
    }

    fn count_todos(&self) -> RepoResult<TodoCounts> {
        let (open, completed): (i64, i64) = self.conn.query_row(
            "SELECT
                COALESCE(SUM(CASE WHEN completed = 0 THEN 1 ELSE 0 END), 0),
                COALESCE(SUM(CASE WHEN completed = 1 THEN 1 ELSE 0 END), 0)
             FROM todos
             WHERE user_id = ?1;",
            [self.owner.to_string()],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )?;
        Ok(TodoCounts {
            open: open.max(0) as u64,
            completed: completed.max(0) as u64,
        })
    }
}

fn replace_tag_links(tx: &Transaction<'_>, owner: UserId, todo: &TodoItem) -> RepoResult<()> {
    let todo_id = todo.id.to_string();
    tx.execute("DELETE FROM todo_tags WHERE todo_id = ?1;", [todo_id.as_str()])?;

    for name in &todo.tags {
        let tag_id: Option<String> = tx
            .query_row(
                "SELECT id FROM tags WHERE user_id = ?1 AND name = ?2;",
                params![owner.to_string(), name.as_str()],
                |row| row.get(0),
            )
            .optional()?;
        let Some(tag_id) = tag_id else {
            return Err(RepoError::InvalidData(format!(
                "todo references unknown tag `{name}`"
            )));
        };
        tx.execute(
            "INSERT INTO todo_tags (todo_id, tag_id) VALUES (?1, ?2);",
            params![todo_id.as_str(), tag_id],
        )?;
    }
    Ok(())
}

fn load_tag_names(conn: &Connection, todo_id: &str) -> RepoResult<BTreeSet<String>> {
    let mut stmt = conn.prepare(
        "SELECT t.name
         FROM todo_tags tt
         INNER JOIN tags t ON t.id = tt.tag_id
         WHERE tt.todo_id = ?1;",
    )?;
    let mut rows = stmt.query([todo_id])?;
    let mut names = BTreeSet::new();
    while let Some(row) = rows.next()? {
        names.insert(row.get::<_, String>(0)?);
    }
    Ok(names)
}

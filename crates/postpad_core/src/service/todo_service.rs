//! To-do use-case service.
//!
//! # Responsibility
//! - Create, toggle, re-status, re-tag and delete to-do items.
//!
//! # Invariants
//! - Text is trimmed and never empty.
//! - `completed_at` is present exactly while `completed` is true.
//! - Tags attached to an item are existing tags of the same user.

use crate::clock::Clock;
use crate::model::tag::normalize_tag_name;
use crate::model::todo::{Priority, TodoId, TodoItem, TodoStatus};
use crate::model::user::{Session, UserId};
use crate::repo::tag_repo::TagRepository;
use crate::repo::todo_repo::{TodoCounts, TodoRepository};
use crate::repo::RepoError;
use log::info;
use std::collections::BTreeSet;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TodoServiceError {
    #[error("to-do text cannot be empty")]
    EmptyText,
    #[error("unknown tag: `{0}`")]
    UnknownTag(String),
    #[error("to-do not found: {0}")]
    NotFound(TodoId),
    #[error(transparent)]
    Repo(RepoError),
}

impl From<RepoError> for TodoServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::NotFound { id, .. } => Self::NotFound(id),
            other => Self::Repo(other),
        }
    }
}

pub struct TodoService<'a, R: TodoRepository> {
    repo: R,
    tags: &'a dyn TagRepository,
    user_id: UserId,
    clock: &'a dyn Clock,
}

impl<'a, R: TodoRepository> TodoService<'a, R> {
    pub fn new(
        repo: R,
        tags: &'a dyn TagRepository,
        session: &Session,
        clock: &'a dyn Clock,
    ) -> Self {
        Self {
            repo,
            tags,
            user_id: session.user_id(),
            clock,
        }
    }

    pub fn repo(&self) -> &R {
        &self.repo
    }

    pub fn clock(&self) -> &dyn Clock {
        self.clock
    }

    /// Validates input and builds an unsaved item.
    pub fn build_todo(&self, text: &str, priority: Priority) -> Result<TodoItem, TodoServiceError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(TodoServiceError::EmptyText);
        }
        Ok(TodoItem::new(self.user_id, text, priority, self.clock.now()))
    }

    /// Persists an item produced by [`Self::build_todo`].
    pub fn insert_todo(&self, todo: &TodoItem) -> Result<(), TodoServiceError> {
        self.repo.create_todo(todo)?;
        info!(
            "event=todo_add module=todos status=ok todo_id={} priority={}",
            todo.id,
            todo.priority.as_str()
        );
        Ok(())
    }

    pub fn add_todo(&self, text: &str, priority: Priority) -> Result<TodoItem, TodoServiceError> {
        let todo = self.build_todo(text, priority)?;
        self.insert_todo(&todo)?;
        Ok(todo)
    }

    pub fn list_todos(&self) -> Result<Vec<TodoItem>, TodoServiceError> {
        Ok(self.repo.list_todos()?)
    }

    pub fn get_todo(&self, id: TodoId) -> Result<TodoItem, TodoServiceError> {
        self.repo.get_todo(id)?.ok_or(TodoServiceError::NotFound(id))
    }

    /// Writes every mutable field of `todo` back to the store.
    pub fn save_todo(&self, todo: &TodoItem) -> Result<(), TodoServiceError> {
        Ok(self.repo.update_todo(todo)?)
    }

    pub fn toggle_todo(&self, id: TodoId) -> Result<TodoItem, TodoServiceError> {
        let mut todo = self.get_todo(id)?;
        todo.toggle(self.clock.now());
        self.repo.update_todo(&todo)?;
        info!(
            "event=todo_toggle module=todos status=ok todo_id={id} completed={}",
            todo.completed
        );
        Ok(todo)
    }

    pub fn set_status(&self, id: TodoId, status: TodoStatus) -> Result<TodoItem, TodoServiceError> {
        let mut todo = self.get_todo(id)?;
        todo.status = status;
        self.repo.update_todo(&todo)?;
        Ok(todo)
    }

    /// Replaces the tag set; every name must already exist for this user.
    pub fn set_tags<S: AsRef<str>>(
        &self,
        id: TodoId,
        names: &[S],
    ) -> Result<TodoItem, TodoServiceError> {
        let mut tags = BTreeSet::new();
        for raw in names {
            let raw = raw.as_ref();
            let name = normalize_tag_name(raw)
                .ok_or_else(|| TodoServiceError::UnknownTag(raw.to_string()))?;
            if self.tags.find_tag_by_name(&name)?.is_none() {
                return Err(TodoServiceError::UnknownTag(name));
            }
            tags.insert(name);
        }

        let mut todo = self.get_todo(id)?;
        todo.tags = tags;
        self.repo.update_todo(&todo)?;
        Ok(todo)
    }

    pub fn delete_todo(&self, id: TodoId) -> Result<(), TodoServiceError> {
        self.repo.delete_todo(id)?;
        info!("event=todo_delete module=todos status=ok todo_id={id}");
        Ok(())
    }

    pub fn count_todos(&self) -> Result<TodoCounts, TodoServiceError> {
        Ok(self.repo.count_todos()?)
    }
}

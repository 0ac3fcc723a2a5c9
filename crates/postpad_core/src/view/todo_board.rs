//! To-do list view backed by an optimistic list.

use crate::model::todo::{Priority, TodoId, TodoItem};
use crate::repo::todo_repo::TodoRepository;
use crate::service::todo_service::{TodoService, TodoServiceError};
use crate::view::optimistic::{Keyed, OptimisticError, OptimisticList};
use log::warn;

impl Keyed for TodoItem {
    type Key = TodoId;

    fn key(&self) -> TodoId {
        self.id
    }
}

pub struct TodoBoard<'s, 'a, R: TodoRepository> {
    service: &'s TodoService<'a, R>,
    items: OptimisticList<TodoItem>,
}

impl<'s, 'a, R: TodoRepository> TodoBoard<'s, 'a, R> {
    /// Loads the current list from the store.
    pub fn load(service: &'s TodoService<'a, R>) -> Result<Self, TodoServiceError> {
        Ok(Self {
            items: OptimisticList::new(service.list_todos()?),
            service,
        })
    }

    pub fn items(&self) -> &[TodoItem] {
        self.items.items()
    }

    pub fn add(&mut self, text: &str, priority: Priority) -> Result<TodoId, TodoServiceError> {
        let todo = self.service.build_todo(text, priority)?;
        let id = todo.id;
        let service = self.service;
        self.items
            .insert(todo, |todo| service.insert_todo(todo))
            .map_err(|err| rolled_back("add", id, err))?;
        Ok(id)
    }

    pub fn toggle(&mut self, id: TodoId) -> Result<(), TodoServiceError> {
        let service = self.service;
        let now = service.clock().now();
        self.items
            .update(id, |todo| todo.toggle(now), |todo| service.save_todo(todo))
            .map_err(|err| rolled_back("toggle", id, err))
    }

    pub fn delete(&mut self, id: TodoId) -> Result<(), TodoServiceError> {
        let service = self.service;
        self.items
            .remove(id, |todo| service.delete_todo(todo.id))
            .map(|_| ())
            .map_err(|err| rolled_back("delete", id, err))
    }

    /// Replaces local state with store truth.
    pub fn refresh(&mut self) -> Result<(), TodoServiceError> {
        self.items.reset(self.service.list_todos()?);
        Ok(())
    }
}

fn rolled_back(
    action: &str,
    id: TodoId,
    err: OptimisticError<TodoServiceError>,
) -> TodoServiceError {
    match err {
        OptimisticError::Missing => TodoServiceError::NotFound(id),
        OptimisticError::Commit(err) => {
            warn!("event=todo_{action} module=todo_board status=rolled_back todo_id={id} error={err}");
            err
        }
    }
}

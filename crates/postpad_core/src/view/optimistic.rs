//! Optimistic list mutations with rollback.
//!
//! Every mutation runs in three steps: apply locally, run the commit
//! closure, restore the snapshot if the commit fails. Callers see the new
//! state immediately and the store stays the source of truth on failure.

use std::fmt::Debug;

/// Element with a stable identity inside an [`OptimisticList`].
pub trait Keyed {
    type Key: PartialEq + Copy + Debug;

    fn key(&self) -> Self::Key;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OptimisticError<E> {
    /// No element with that key is present locally.
    Missing,
    /// The store rejected the change; local state was rolled back.
    Commit(E),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptimisticList<T> {
    items: Vec<T>,
}

impl<T> Default for OptimisticList<T> {
    fn default() -> Self {
        Self { items: Vec::new() }
    }
}

impl<T: Keyed + Clone> OptimisticList<T> {
    pub fn new(items: Vec<T>) -> Self {
        Self { items }
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn get(&self, key: T::Key) -> Option<&T> {
        self.items.iter().find(|item| item.key() == key)
    }

    /// Replaces local state with store truth.
    pub fn reset(&mut self, items: Vec<T>) {
        self.items = items;
    }

    /// Shows `item` at the top, then commits it.
    pub fn insert<E>(
        &mut self,
        item: T,
        commit: impl FnOnce(&T) -> Result<(), E>,
    ) -> Result<(), OptimisticError<E>> {
        let key = item.key();
        self.items.insert(0, item);
        let result = commit(&self.items[0]);
        if let Err(err) = result {
            self.items.retain(|existing| existing.key() != key);
            return Err(OptimisticError::Commit(err));
        }
        Ok(())
    }

    /// Mutates the element in place, then commits the mutated copy.
    pub fn update<E>(
        &mut self,
        key: T::Key,
        mutate: impl FnOnce(&mut T),
        commit: impl FnOnce(&T) -> Result<(), E>,
    ) -> Result<(), OptimisticError<E>> {
        let index = self.position(key).ok_or(OptimisticError::Missing)?;
        let snapshot = self.items[index].clone();
        mutate(&mut self.items[index]);
        if let Err(err) = commit(&self.items[index]) {
            self.items[index] = snapshot;
            return Err(OptimisticError::Commit(err));
        }
        Ok(())
    }

    /// Hides the element, then commits the removal.
    pub fn remove<E>(
        &mut self,
        key: T::Key,
        commit: impl FnOnce(&T) -> Result<(), E>,
    ) -> Result<T, OptimisticError<E>> {
        let index = self.position(key).ok_or(OptimisticError::Missing)?;
        let removed = self.items.remove(index);
        if let Err(err) = commit(&removed) {
            self.items.insert(index, removed);
            return Err(OptimisticError::Commit(err));
        }
        Ok(removed)
    }

    fn position(&self, key: T::Key) -> Option<usize> {
        self.items.iter().position(|item| item.key() == key)
    }
}

//! Draft use-case service.
//!
//! # Responsibility
//! - Save, list, copy and delete drafts outside the composer flow.
//!
//! # Invariants
//! - Saved content is validated with the same guard as publishing.
//! - Lists are newest first.

use crate::clock::Clock;
use crate::model::draft::{Draft, DraftId, ValidationError};
use crate::model::user::{Session, UserId};
use crate::repo::draft_repo::DraftRepository;
use crate::repo::RepoError;
use log::info;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DraftServiceError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("draft not found: {0}")]
    NotFound(DraftId),
    #[error(transparent)]
    Repo(RepoError),
}

impl From<RepoError> for DraftServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::NotFound { id, .. } => Self::NotFound(id),
            other => Self::Repo(other),
        }
    }
}

pub struct DraftService<'a, R: DraftRepository> {
    repo: R,
    user_id: UserId,
    clock: &'a dyn Clock,
}

impl<'a, R: DraftRepository> DraftService<'a, R> {
    pub fn new(repo: R, session: &Session, clock: &'a dyn Clock) -> Self {
        Self {
            repo,
            user_id: session.user_id(),
            clock,
        }
    }

    pub fn save_draft(&self, text: &str) -> Result<Draft, DraftServiceError> {
        let draft = Draft::new(self.user_id, text, self.clock.now())?;
        self.repo.create_draft(&draft)?;
        info!(
            "event=draft_save module=drafts status=ok draft_id={} len={}",
            draft.id,
            text.len()
        );
        Ok(draft)
    }

    pub fn list_drafts(&self) -> Result<Vec<Draft>, DraftServiceError> {
        Ok(self.repo.list_drafts()?)
    }

    pub fn get_draft(&self, id: DraftId) -> Result<Draft, DraftServiceError> {
        self.repo
            .get_draft(id)?
            .ok_or(DraftServiceError::NotFound(id))
    }

    /// Returns the full draft content for clipboard use.
    pub fn copy_draft(&self, id: DraftId) -> Result<String, DraftServiceError> {
        Ok(self.get_draft(id)?.content)
    }

    pub fn delete_draft(&self, id: DraftId) -> Result<(), DraftServiceError> {
        self.repo.delete_draft(id)?;
        info!("event=draft_delete module=drafts status=ok draft_id={id}");
        Ok(())
    }

    pub fn count_drafts(&self) -> Result<u64, DraftServiceError> {
        Ok(self.repo.count_drafts()?)
    }
}

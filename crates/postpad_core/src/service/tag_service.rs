//! Tag use-case service.

use crate::model::tag::{normalize_tag_name, Tag, TagId, MAX_TAG_CHARS};
use crate::model::user::{Session, UserId};
use crate::repo::tag_repo::TagRepository;
use crate::repo::RepoError;
use log::info;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TagServiceError {
    #[error("tag name must be 1-{MAX_TAG_CHARS} characters: `{0}`")]
    InvalidName(String),
    #[error("tag already exists: `{0}`")]
    DuplicateTag(String),
    #[error("tag not found: {0}")]
    NotFound(TagId),
    #[error(transparent)]
    Repo(RepoError),
}

impl From<RepoError> for TagServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::Duplicate { key, .. } => Self::DuplicateTag(key),
            RepoError::NotFound { id, .. } => Self::NotFound(id),
            other => Self::Repo(other),
        }
    }
}

pub struct TagService<R: TagRepository> {
    repo: R,
    user_id: UserId,
}

impl<R: TagRepository> TagService<R> {
    pub fn new(repo: R, session: &Session) -> Self {
        Self {
            repo,
            user_id: session.user_id(),
        }
    }

    pub fn add_tag(&self, name: &str) -> Result<Tag, TagServiceError> {
        let name =
            normalize_tag_name(name).ok_or_else(|| TagServiceError::InvalidName(name.to_string()))?;
        let tag = Tag::new(self.user_id, name);
        self.repo.create_tag(&tag)?;
        info!("event=tag_add module=tags status=ok tag_id={}", tag.id);
        Ok(tag)
    }

    /// Sorted by name.
    pub fn list_tags(&self) -> Result<Vec<Tag>, TagServiceError> {
        Ok(self.repo.list_tags()?)
    }

    /// Removing a tag also detaches it from every to-do.
    pub fn delete_tag(&self, id: TagId) -> Result<(), TagServiceError> {
        self.repo.delete_tag(id)?;
        info!("event=tag_delete module=tags status=ok tag_id={id}");
        Ok(())
    }

    pub fn count_tags(&self) -> Result<u64, TagServiceError> {
        Ok(self.repo.count_tags()?)
    }
}

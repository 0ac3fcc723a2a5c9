//! Draft record and post-text validation.
//!
//! # Invariants
//! - Post text is non-empty and at most 280 UTF-16 code units.
//! - Drafts are never updated in place: a save creates a new record.

use crate::model::user::UserId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Maximum post length, counted in UTF-16 code units.
pub const MAX_POST_CHARS: usize = 280;

const PREVIEW_MAX_CHARS: usize = 50;
const PREVIEW_KEEP_CHARS: usize = 47;

pub type DraftId = Uuid;

/// Field-level rejection of composed text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Note cannot be empty.")]
    Empty,
    #[error("Note cannot exceed {max} characters ({len} given).")]
    TooLong { len: usize, max: usize },
}

/// Returns the length of `text` the way the posting platform counts it.
pub fn post_text_len(text: &str) -> usize {
    text.encode_utf16().count()
}

/// Checks the composer entry guard for `text`.
pub fn validate_post_text(text: &str) -> Result<(), ValidationError> {
    let len = post_text_len(text);
    if len == 0 {
        return Err(ValidationError::Empty);
    }
    if len > MAX_POST_CHARS {
        return Err(ValidationError::TooLong {
            len,
            max: MAX_POST_CHARS,
        });
    }
    Ok(())
}

/// Saved, unpublished note.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Draft {
    pub id: DraftId,
    pub user_id: UserId,
    pub content: String,
    pub created_at: DateTime<Utc>,
    /// Set when moderation was unavailable under the review-queue policy.
    pub needs_review: bool,
}

impl Draft {
    /// Creates a validated draft with a fresh id.
    pub fn new(
        user_id: UserId,
        content: impl Into<String>,
        created_at: DateTime<Utc>,
    ) -> Result<Self, ValidationError> {
        let content = content.into();
        validate_post_text(&content)?;
        Ok(Self {
            id: Uuid::new_v4(),
            user_id,
            content,
            created_at,
            needs_review: false,
        })
    }

    /// Marks this draft as waiting for a human moderation pass.
    pub fn flag_for_review(mut self) -> Self {
        self.needs_review = true;
        self
    }

    pub fn preview(&self) -> String {
        draft_preview(&self.content)
    }
}

/// Short list-row rendering of draft content.
pub fn draft_preview(content: &str) -> String {
    if content.chars().count() > PREVIEW_MAX_CHARS {
        let mut short = content.chars().take(PREVIEW_KEEP_CHARS).collect::<String>();
        short.push_str("...");
        short
    } else {
        content.to_string()
    }
}

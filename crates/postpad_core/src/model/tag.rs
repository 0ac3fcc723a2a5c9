//! User-defined tag for to-do items.
//!
//! # Invariants
//! - Names are trimmed, lowercase, 1..=25 chars.
//! - A name is unique per owner.

use crate::model::user::UserId;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const MAX_TAG_CHARS: usize = 25;

pub type TagId = Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    pub id: TagId,
    pub user_id: UserId,
    pub name: String,
}

impl Tag {
    pub fn new(user_id: UserId, name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            name: name.into(),
        }
    }
}

/// Normalizes one tag name; returns `None` for blank or over-long input.
pub fn normalize_tag_name(name: &str) -> Option<String> {
    let trimmed = name.trim();
    if trimmed.is_empty() || trimmed.chars().count() > MAX_TAG_CHARS {
        None
    } else {
        Some(trimmed.to_lowercase())
    }
}

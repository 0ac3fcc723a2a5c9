//! Published-post log entry.

use crate::model::user::UserId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Append-only record of one successful publish.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublishedPost {
    pub id: Uuid,
    pub user_id: UserId,
    pub content: String,
    /// Platform-assigned id returned by the publisher.
    pub external_post_id: String,
    pub posted_at: DateTime<Utc>,
}

impl PublishedPost {
    pub fn new(
        user_id: UserId,
        content: impl Into<String>,
        external_post_id: impl Into<String>,
        posted_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            content: content.into(),
            external_post_id: external_post_id.into(),
            posted_at,
        }
    }
}

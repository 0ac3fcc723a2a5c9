//! To-do item model.

use crate::model::user::UserId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use uuid::Uuid;

pub type TodoId = Uuid;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
}

impl Priority {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Low => "Low",
            Self::Medium => "Medium",
            Self::High => "High",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "low" => Some(Self::Low),
            "medium" => Some(Self::Medium),
            "high" => Some(Self::High),
            _ => None,
        }
    }
}

/// Workflow status shown next to a to-do.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TodoStatus {
    #[default]
    NoStatus,
    InProgress,
    NeedsReview,
    Blocked,
}

impl TodoStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::NoStatus => "No Status",
            Self::InProgress => "In Progress",
            Self::NeedsReview => "Needs Review",
            Self::Blocked => "Blocked",
        }
    }

    /// Accepts display names as well as kebab/snake spellings.
    pub fn parse(value: &str) -> Option<Self> {
        let key = value
            .trim()
            .to_ascii_lowercase()
            .replace(['-', '_'], " ");
        match key.as_str() {
            "no status" | "none" => Some(Self::NoStatus),
            "in progress" => Some(Self::InProgress),
            "needs review" => Some(Self::NeedsReview),
            "blocked" => Some(Self::Blocked),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TodoItem {
    pub id: TodoId,
    pub user_id: UserId,
    pub text: String,
    pub completed: bool,
    pub created_at: DateTime<Utc>,
    /// Present only while `completed` is true.
    pub completed_at: Option<DateTime<Utc>>,
    pub priority: Priority,
    pub tags: BTreeSet<String>,
    pub status: TodoStatus,
}

impl TodoItem {
    pub fn new(
        user_id: UserId,
        text: impl Into<String>,
        priority: Priority,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            text: text.into(),
            completed: false,
            created_at,
            completed_at: None,
            priority,
            tags: BTreeSet::new(),
            status: TodoStatus::NoStatus,
        }
    }

    /// Flips completion, stamping or clearing `completed_at`.
    pub fn toggle(&mut self, now: DateTime<Utc>) {
        self.completed = !self.completed;
        self.completed_at = if self.completed { Some(now) } else { None };
    }
}

//! Per-user posting streak record.

use crate::model::user::UserId;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One record per user; mutated on publish, never deleted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreakRecord {
    pub user_id: UserId,
    pub current_streak: u32,
    /// Calendar date in the reference zone, no time component.
    pub last_post_date: NaiveDate,
}

/// Result of recording one publish against the streak.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreakUpdate {
    pub new_streak: u32,
    pub is_first_post_of_day: bool,
}

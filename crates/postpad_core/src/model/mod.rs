//! Domain records for drafts, posts, streaks, to-dos and tags.
//!
//! # Invariants
//! - Every record is owned by exactly one `UserId`.
//! - Timestamps are UTC instants; calendar dates only appear on streaks.

pub mod draft;
pub mod post;
pub mod streak;
pub mod tag;
pub mod todo;
pub mod user;

//! Dashboard counters for one user.

use crate::clock::{Clock, ReferenceZone};
use crate::repo::draft_repo::DraftRepository;
use crate::repo::post_repo::PostRepository;
use crate::repo::streak_repo::StreakRepository;
use crate::repo::tag_repo::TagRepository;
use crate::repo::todo_repo::TodoRepository;
use crate::repo::RepoResult;
use crate::service::streak_service::effective_streak;
use serde::Serialize;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Stats {
    pub drafts: u64,
    pub published_posts: u64,
    /// Zero once a full day has been missed.
    pub current_streak: u32,
    pub open_todos: u64,
    pub completed_todos: u64,
    pub tags: u64,
}

pub struct StatsService<'a> {
    pub drafts: &'a dyn DraftRepository,
    pub posts: &'a dyn PostRepository,
    pub streaks: &'a dyn StreakRepository,
    pub todos: &'a dyn TodoRepository,
    pub tags: &'a dyn TagRepository,
    pub clock: &'a dyn Clock,
    pub zone: ReferenceZone,
}

impl StatsService<'_> {
    pub fn fetch_stats(&self) -> RepoResult<Stats> {
        let today = self.zone.today(self.clock);
        let todo_counts = self.todos.count_todos()?;
        Ok(Stats {
            drafts: self.drafts.count_drafts()?,
            published_posts: self.posts.count_posts()?,
            current_streak: effective_streak(self.streaks.get_streak()?.as_ref(), today),
            open_todos: todo_counts.open,
            completed_todos: todo_counts.completed,
            tags: self.tags.count_tags()?,
        })
    }
}

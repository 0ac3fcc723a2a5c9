//! Consecutive-day posting streak.
//!
//! # Responsibility
//! - Advance the per-user streak on each successful publish.
//! - Report the streak with lazy expiry on read.
//!
//! # Invariants
//! - Recording the same date twice never increments twice.
//! - A read never writes the record back.
//! - Dates are calendar days in the caller's reference zone.

use crate::model::streak::{StreakRecord, StreakUpdate};
use crate::model::user::{Session, UserId};
use crate::repo::streak_repo::StreakRepository;
use crate::repo::RepoResult;
use chrono::NaiveDate;
use log::info;

/// Applies one publish on `post_date` to `existing`.
///
/// Returns the record to persist (`None` when nothing changes) and the
/// update reported to the caller.
pub fn advance_streak(
    user_id: UserId,
    existing: Option<StreakRecord>,
    post_date: NaiveDate,
) -> (Option<StreakRecord>, StreakUpdate) {
    let restart = || {
        (
            Some(StreakRecord {
                user_id,
                current_streak: 1,
                last_post_date: post_date,
            }),
            StreakUpdate {
                new_streak: 1,
                is_first_post_of_day: true,
            },
        )
    };

    let Some(record) = existing else {
        return restart();
    };

    if record.last_post_date == post_date {
        return (
            None,
            StreakUpdate {
                new_streak: record.current_streak,
                is_first_post_of_day: false,
            },
        );
    }

    if post_date.pred_opt() == Some(record.last_post_date) {
        let new_streak = record.current_streak.saturating_add(1);
        return (
            Some(StreakRecord {
                user_id,
                current_streak: new_streak,
                last_post_date: post_date,
            }),
            StreakUpdate {
                new_streak,
                is_first_post_of_day: true,
            },
        );
    }

    restart()
}

/// Streak value as seen on `today`: zero once a full day has been missed.
pub fn effective_streak(record: Option<&StreakRecord>, today: NaiveDate) -> u32 {
    match record {
        Some(record)
            if record.last_post_date == today
                || today.pred_opt() == Some(record.last_post_date) =>
        {
            record.current_streak
        }
        _ => 0,
    }
}

pub struct StreakTracker<R: StreakRepository> {
    repo: R,
    user_id: UserId,
}

impl<R: StreakRepository> StreakTracker<R> {
    pub fn new(repo: R, session: &Session) -> Self {
        Self {
            repo,
            user_id: session.user_id(),
        }
    }

    pub fn record_post(&self, post_date: NaiveDate) -> RepoResult<StreakUpdate> {
        record_post(&self.repo, self.user_id, post_date)
    }

    pub fn get_streak(&self, today: NaiveDate) -> RepoResult<u32> {
        Ok(effective_streak(self.repo.get_streak()?.as_ref(), today))
    }
}

/// Read-modify-write of one user's streak through any repository.
pub(crate) fn record_post(
    repo: &dyn StreakRepository,
    user_id: UserId,
    post_date: NaiveDate,
) -> RepoResult<StreakUpdate> {
    let existing = repo.get_streak()?;
    let (next, update) = advance_streak(user_id, existing, post_date);
    if let Some(record) = next {
        repo.put_streak(&record)?;
    }
    info!(
        "event=streak_record module=streak status=ok user_id={user_id} streak={} first_of_day={}",
        update.new_streak, update.is_first_post_of_day
    );
    Ok(update)
}

//! Composer state machine.
//!
//! # Responsibility
//! - Validate composed text, route it through moderation and publish it.
//! - Save drafts without moderation.
//! - Keep text and verdict available for retry after a failure.
//!
//! # Invariants
//! - At most one submission runs per composer; overlapping calls fail with
//!   `ComposeError::Busy` and are never queued.
//! - Invalid text never reaches the gate, the publisher or the store.
//! - Once the publisher succeeds the outcome is success; later store
//!   failures only add notes to the report.
//! - The state lock is never held across a gate, publisher or store call.

use crate::clock::{Clock, ReferenceZone};
use crate::model::draft::{validate_post_text, Draft, DraftId, ValidationError};
use crate::model::post::PublishedPost;
use crate::model::streak::StreakUpdate;
use crate::model::user::Session;
use crate::moderation::{screen, ModerationGate, ModerationPolicy, ModerationVerdict, Screening};
use crate::publish::{PublishError, Publisher, GENERIC_PUBLISH_FAILURE};
use crate::repo::draft_repo::DraftRepository;
use crate::repo::post_repo::PostRepository;
use crate::repo::streak_repo::StreakRepository;
use crate::repo::RepoError;
use crate::service::streak_service;
use log::{error, info, warn};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};
use thiserror::Error;

pub const NOTE_DRAFT_NOT_REMOVED: &str =
    "Posted successfully, but the source draft could not be removed.";
pub const NOTE_HISTORY_NOT_SAVED: &str =
    "Posted successfully, but it could not be added to your post history.";
pub const NOTE_STREAK_NOT_UPDATED: &str =
    "Posted successfully, but your streak could not be updated.";

const STORE_FAILURE: &str = "Could not save your note. Please try again.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmissionKind {
    Publish,
    Draft,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComposerPhase {
    Editing,
    Submitting(SubmissionKind),
    AwaitingModeration,
    UserDecision,
    Publishing,
    Done,
    Failed,
}

impl ComposerPhase {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Editing => "editing",
            Self::Submitting(SubmissionKind::Publish) => "submitting_publish",
            Self::Submitting(SubmissionKind::Draft) => "submitting_draft",
            Self::AwaitingModeration => "awaiting_moderation",
            Self::UserDecision => "user_decision",
            Self::Publishing => "publishing",
            Self::Done => "done",
            Self::Failed => "failed",
        }
    }
}

/// User answer to a flagged verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// Back to editing; nothing is sent.
    EditManually,
    PostOriginal,
    /// Publish the rewrite and replace the composed text with it.
    UseSuggestion,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ComposeError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("{0}")]
    Configuration(String),
    #[error("platform rejected the post (HTTP {status})")]
    Platform { status: u16, detail: Option<String> },
    #[error("publish transport failure: {0}")]
    Transport(String),
    #[error("store failure: {0}")]
    Store(String),
    #[error("a submission is already in progress")]
    Busy,
    #[error("`{operation}` is not allowed while {}", .phase.as_str())]
    InvalidTransition {
        phase: ComposerPhase,
        operation: &'static str,
    },
    #[error("the moderation verdict has no suggested rewrite")]
    NoSuggestion,
    #[error("moderation is unavailable")]
    ModerationUnavailable,
}

impl ComposeError {
    /// Actionable message shown once to the user.
    pub fn user_message(&self) -> String {
        match self {
            Self::Validation(err) => err.to_string(),
            Self::Configuration(message) => message.clone(),
            Self::Platform {
                detail: Some(detail),
                ..
            } if !detail.trim().is_empty() => detail.clone(),
            Self::Platform { .. } | Self::Transport(_) => GENERIC_PUBLISH_FAILURE.to_string(),
            Self::Store(_) => STORE_FAILURE.to_string(),
            Self::Busy => "Please wait for the current submission to finish.".to_string(),
            Self::InvalidTransition { .. } => "That action is not available right now.".to_string(),
            Self::NoSuggestion => {
                "There is no suggested rewrite. Edit the note or post the original.".to_string()
            }
            Self::ModerationUnavailable => {
                "Moderation is unavailable right now, so the note was not posted. Please try again later."
                    .to_string()
            }
        }
    }
}

impl From<PublishError> for ComposeError {
    fn from(value: PublishError) -> Self {
        match value {
            PublishError::Configuration(message) => Self::Configuration(message),
            PublishError::Platform { status, detail } => Self::Platform { status, detail },
            PublishError::Transport(message) => Self::Transport(message),
        }
    }
}

impl From<RepoError> for ComposeError {
    fn from(value: RepoError) -> Self {
        Self::Store(value.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishReport {
    pub post: PublishedPost,
    /// `None` when the streak could not be persisted.
    pub streak: Option<StreakUpdate>,
    /// Secondary informational messages; empty on a clean run.
    pub notes: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PublishOutcome {
    Published(PublishReport),
    /// Flagged; waiting for [`Composer::decide`].
    NeedsDecision(ModerationVerdict),
    /// Gate unavailable under the review-queue policy; saved as a draft.
    QueuedForReview(Draft),
    /// The user chose to keep editing.
    ReturnedToEditing,
}

/// Collaborators for one composer call.
pub struct ComposerDeps<'a> {
    pub drafts: &'a dyn DraftRepository,
    pub posts: &'a dyn PostRepository,
    pub streaks: &'a dyn StreakRepository,
    pub gate: &'a dyn ModerationGate,
    pub publisher: &'a dyn Publisher,
    pub clock: &'a dyn Clock,
    pub zone: ReferenceZone,
    pub policy: ModerationPolicy,
}

#[derive(Debug)]
struct ComposerState {
    text: String,
    phase: ComposerPhase,
    verdict: Option<ModerationVerdict>,
    source_draft: Option<DraftId>,
}

struct InFlight<'a>(&'a AtomicBool);

impl<'a> InFlight<'a> {
    fn acquire(flag: &'a AtomicBool) -> Result<Self, ComposeError> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| ComposeError::Busy)?;
        Ok(Self(flag))
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

pub struct Composer {
    session: Session,
    state: Mutex<ComposerState>,
    in_flight: AtomicBool,
}

impl Composer {
    pub fn new(session: Session) -> Self {
        Self {
            session,
            state: Mutex::new(ComposerState {
                text: String::new(),
                phase: ComposerPhase::Editing,
                verdict: None,
                source_draft: None,
            }),
            in_flight: AtomicBool::new(false),
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn text(&self) -> String {
        self.state().text.clone()
    }

    pub fn phase(&self) -> ComposerPhase {
        self.state().phase
    }

    pub fn last_verdict(&self) -> Option<ModerationVerdict> {
        self.state().verdict.clone()
    }

    pub fn source_draft(&self) -> Option<DraftId> {
        self.state().source_draft
    }

    /// Replaces the composed text and returns to `Editing`.
    pub fn set_text(&self, text: impl Into<String>) -> Result<(), ComposeError> {
        let _guard = InFlight::acquire(&self.in_flight)?;
        let mut state = self.state();
        state.text = text.into();
        state.phase = ComposerPhase::Editing;
        state.verdict = None;
        Ok(())
    }

    /// Loads a saved draft; publishing it later removes that draft.
    pub fn load_draft(&self, draft: &Draft) -> Result<(), ComposeError> {
        let _guard = InFlight::acquire(&self.in_flight)?;
        let mut state = self.state();
        state.text = draft.content.clone();
        state.phase = ComposerPhase::Editing;
        state.verdict = None;
        state.source_draft = Some(draft.id);
        Ok(())
    }

    /// Saves the composed text as a draft, bypassing moderation.
    pub fn save_draft(&self, deps: &ComposerDeps<'_>) -> Result<Draft, ComposeError> {
        let _guard = InFlight::acquire(&self.in_flight)?;
        let text = self.begin_submission(SubmissionKind::Draft, "save_draft")?;

        let result = Draft::new(self.session.user_id(), text, deps.clock.now())
            .map_err(ComposeError::from)
            .and_then(|draft| {
                deps.drafts.create_draft(&draft)?;
                Ok(draft)
            });

        let mut state = self.state();
        match result {
            Ok(draft) => {
                state.text.clear();
                state.source_draft = None;
                state.verdict = None;
                state.phase = ComposerPhase::Done;
                info!(
                    "event=compose_save_draft module=workflow status=ok draft_id={}",
                    draft.id
                );
                Ok(draft)
            }
            Err(err) => {
                state.phase = ComposerPhase::Editing;
                error!("event=compose_save_draft module=workflow status=error error={err}");
                Err(err)
            }
        }
    }

    /// Screens the composed text and publishes it when clean.
    pub fn publish(&self, deps: &ComposerDeps<'_>) -> Result<PublishOutcome, ComposeError> {
        let _guard = InFlight::acquire(&self.in_flight)?;
        let text = self.begin_submission(SubmissionKind::Publish, "publish")?;

        self.set_phase(ComposerPhase::AwaitingModeration);
        match screen(deps.gate, deps.policy, &text) {
            Screening::Clean(verdict) => {
                self.state().verdict = Some(verdict);
                self.publish_text(&text, deps)
            }
            Screening::Flagged(verdict) => {
                let mut state = self.state();
                state.verdict = Some(verdict.clone());
                state.phase = ComposerPhase::UserDecision;
                Ok(PublishOutcome::NeedsDecision(verdict))
            }
            Screening::Blocked => {
                let mut state = self.state();
                state.verdict = None;
                state.phase = ComposerPhase::Editing;
                Err(ComposeError::ModerationUnavailable)
            }
            Screening::QueueForReview => self.queue_for_review(&text, deps),
        }
    }

    /// Resolves a flagged verdict.
    pub fn decide(
        &self,
        decision: Decision,
        deps: &ComposerDeps<'_>,
    ) -> Result<PublishOutcome, ComposeError> {
        let _guard = InFlight::acquire(&self.in_flight)?;
        let (text, verdict) = {
            let state = self.state();
            if state.phase != ComposerPhase::UserDecision {
                return Err(ComposeError::InvalidTransition {
                    phase: state.phase,
                    operation: "decide",
                });
            }
            (state.text.clone(), state.verdict.clone())
        };
        info!(
            "event=compose_decide module=workflow status=start decision={:?}",
            decision
        );

        match decision {
            Decision::EditManually => {
                self.set_phase(ComposerPhase::Editing);
                Ok(PublishOutcome::ReturnedToEditing)
            }
            Decision::PostOriginal => self.publish_text(&text, deps),
            Decision::UseSuggestion => {
                let suggestion = verdict
                    .filter(ModerationVerdict::has_suggestion)
                    .map(|verdict| verdict.rephrased_suggestion)
                    .ok_or(ComposeError::NoSuggestion)?;
                {
                    let mut state = self.state();
                    state.text = suggestion.clone();
                    if let Err(err) = validate_post_text(&suggestion) {
                        state.phase = ComposerPhase::Editing;
                        return Err(err.into());
                    }
                }
                self.publish_text(&suggestion, deps)
            }
        }
    }

    fn state(&self) -> MutexGuard<'_, ComposerState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn set_phase(&self, phase: ComposerPhase) {
        self.state().phase = phase;
    }

    /// Applies the entry guard and moves to `Submitting`.
    fn begin_submission(
        &self,
        kind: SubmissionKind,
        operation: &'static str,
    ) -> Result<String, ComposeError> {
        let mut state = self.state();
        match state.phase {
            ComposerPhase::Editing | ComposerPhase::Failed | ComposerPhase::Done => {}
            phase => return Err(ComposeError::InvalidTransition { phase, operation }),
        }
        if let Err(err) = validate_post_text(&state.text) {
            state.phase = ComposerPhase::Editing;
            warn!("event=compose_{operation} module=workflow status=rejected error={err}");
            return Err(err.into());
        }
        state.phase = ComposerPhase::Submitting(kind);
        info!(
            "event=compose_{operation} module=workflow status=start user_id={} text_len={}",
            self.session.user_id(),
            state.text.len()
        );
        Ok(state.text.clone())
    }

    fn queue_for_review(
        &self,
        text: &str,
        deps: &ComposerDeps<'_>,
    ) -> Result<PublishOutcome, ComposeError> {
        let result = Draft::new(self.session.user_id(), text, deps.clock.now())
            .map(Draft::flag_for_review)
            .map_err(ComposeError::from)
            .and_then(|draft| {
                deps.drafts.create_draft(&draft)?;
                Ok(draft)
            });

        let mut state = self.state();
        match result {
            Ok(draft) => {
                state.text.clear();
                state.verdict = None;
                state.source_draft = None;
                state.phase = ComposerPhase::Done;
                info!(
                    "event=compose_publish module=workflow status=queued draft_id={}",
                    draft.id
                );
                Ok(PublishOutcome::QueuedForReview(draft))
            }
            Err(err) => {
                state.phase = ComposerPhase::Editing;
                error!("event=compose_publish module=workflow status=error error={err}");
                Err(err)
            }
        }
    }

    fn publish_text(
        &self,
        text: &str,
        deps: &ComposerDeps<'_>,
    ) -> Result<PublishOutcome, ComposeError> {
        self.set_phase(ComposerPhase::Publishing);
        let receipt = match deps.publisher.publish(text) {
            Ok(receipt) => receipt,
            Err(err) => {
                self.set_phase(ComposerPhase::Failed);
                error!("event=compose_publish module=workflow status=error error={err}");
                return Err(err.into());
            }
        };

        let user_id = self.session.user_id();
        let now = deps.clock.now();
        let post = PublishedPost::new(user_id, text, receipt.external_post_id, now);
        let mut notes = Vec::new();

        if let Err(err) = deps.posts.append_post(&post) {
            warn!("event=compose_post_log module=workflow status=error error={err}");
            notes.push(NOTE_HISTORY_NOT_SAVED.to_string());
        }

        let streak =
            match streak_service::record_post(deps.streaks, user_id, deps.zone.date_of(now)) {
                Ok(update) => Some(update),
                Err(err) => {
                    warn!("event=compose_streak module=workflow status=error error={err}");
                    notes.push(NOTE_STREAK_NOT_UPDATED.to_string());
                    None
                }
            };

        let source_draft = self.state().source_draft;
        if let Some(draft_id) = source_draft {
            if let Err(err) = deps.drafts.delete_draft(draft_id) {
                warn!(
                    "event=compose_draft_cleanup module=workflow status=error draft_id={draft_id} error={err}"
                );
                notes.push(NOTE_DRAFT_NOT_REMOVED.to_string());
            }
        }

        {
            let mut state = self.state();
            state.text.clear();
            state.source_draft = None;
            state.phase = ComposerPhase::Done;
        }
        info!(
            "event=compose_publish module=workflow status=ok post_id={} external_id={} notes={}",
            post.id,
            post.external_post_id,
            notes.len()
        );
        Ok(PublishOutcome::Published(PublishReport {
            post,
            streak,
            notes,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::{ComposeError, ComposerPhase};
    use crate::model::draft::ValidationError;
    use crate::publish::{PublishError, GENERIC_PUBLISH_FAILURE};

    #[test]
    fn platform_detail_is_shown_verbatim() {
        let err: ComposeError = PublishError::Platform {
            status: 403,
            detail: Some("duplicate content".into()),
        }
        .into();
        assert_eq!(err.user_message(), "duplicate content");
    }

    #[test]
    fn transport_uses_generic_message() {
        let err: ComposeError = PublishError::Transport("reset".into()).into();
        assert_eq!(err.user_message(), GENERIC_PUBLISH_FAILURE);
    }

    #[test]
    fn validation_message_is_field_level() {
        let err: ComposeError = ValidationError::Empty.into();
        assert_eq!(err.user_message(), "Note cannot be empty.");
    }

    #[test]
    fn invalid_transition_names_phase() {
        let err = ComposeError::InvalidTransition {
            phase: ComposerPhase::UserDecision,
            operation: "publish",
        };
        assert_eq!(
            err.to_string(),
            "`publish` is not allowed while user_decision"
        );
    }
}

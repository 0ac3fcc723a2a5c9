//! Moderation gate contract and availability policy.
//!
//! # Responsibility
//! - Define the classifier seam (`ModerationGate`) the composer calls.
//! - Turn a gate result into a screening decision under `ModerationPolicy`.
//!
//! # Invariants
//! - One attempt per call; failures are never retried.
//! - Gate failures never escape `screen`; the policy decides the outcome.

use log::{info, warn};
use serde::{Deserialize, Serialize};
use thiserror::Error;

mod http;

pub use http::AssistClient;

/// Explanation reported when the gate could not be reached.
pub const UNAVAILABLE_EXPLANATION: &str = "moderation unavailable";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModerationVerdict {
    pub is_offensive: bool,
    /// Rewrite proposed by the service; may be empty.
    pub rephrased_suggestion: String,
    pub explanation: String,
}

impl ModerationVerdict {
    pub fn clean() -> Self {
        Self {
            is_offensive: false,
            rephrased_suggestion: String::new(),
            explanation: String::new(),
        }
    }

    /// Verdict substituted for a failed call under the fail-open policy.
    pub fn unavailable() -> Self {
        Self {
            is_offensive: false,
            rephrased_suggestion: String::new(),
            explanation: UNAVAILABLE_EXPLANATION.to_string(),
        }
    }

    pub fn has_suggestion(&self) -> bool {
        !self.rephrased_suggestion.trim().is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModerationError {
    #[error("assist endpoint is not configured")]
    NotConfigured,
    #[error("input text is empty")]
    EmptyInput,
    #[error("assist request failed: {0}")]
    Transport(String),
    #[error("assist service returned HTTP {status}")]
    Service { status: u16 },
    #[error("assist response could not be decoded: {0}")]
    InvalidResponse(String),
}

/// Classifies composed text and optionally proposes a rewrite.
pub trait ModerationGate {
    fn moderate(&self, text: &str) -> Result<ModerationVerdict, ModerationError>;
}

/// Turns a topic into a suggested post.
pub trait PostIdeaGenerator {
    fn generate(&self, topic: &str) -> Result<String, ModerationError>;
}

/// What the workflow does when the gate is unavailable.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ModerationPolicy {
    /// Treat content as clean and publish.
    #[default]
    FailOpen,
    /// Refuse to publish until moderation answers.
    FailClosed,
    /// Park the text as a draft flagged for review.
    FailReviewQueue,
}

impl ModerationPolicy {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().replace('_', "-").as_str() {
            "fail-open" | "open" => Some(Self::FailOpen),
            "fail-closed" | "closed" => Some(Self::FailClosed),
            "fail-review-queue" | "review-queue" => Some(Self::FailReviewQueue),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::FailOpen => "fail-open",
            Self::FailClosed => "fail-closed",
            Self::FailReviewQueue => "fail-review-queue",
        }
    }
}

/// Screening decision for one piece of text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Screening {
    /// Publish directly; carries the verdict (synthetic when failed open).
    Clean(ModerationVerdict),
    /// Ask the user how to proceed.
    Flagged(ModerationVerdict),
    /// Gate unavailable under `FailClosed`.
    Blocked,
    /// Gate unavailable under `FailReviewQueue`.
    QueueForReview,
}

/// Runs `gate` once on `text` and applies `policy` to failures.
pub fn screen(gate: &dyn ModerationGate, policy: ModerationPolicy, text: &str) -> Screening {
    match gate.moderate(text) {
        Ok(verdict) if verdict.is_offensive => {
            info!(
                "event=moderate module=moderation status=ok flagged=true has_suggestion={}",
                verdict.has_suggestion()
            );
            Screening::Flagged(verdict)
        }
        Ok(verdict) => {
            info!("event=moderate module=moderation status=ok flagged=false");
            Screening::Clean(verdict)
        }
        Err(err) => {
            warn!(
                "event=moderate module=moderation status=error policy={} error={}",
                policy.as_str(),
                err
            );
            match policy {
                ModerationPolicy::FailOpen => Screening::Clean(ModerationVerdict::unavailable()),
                ModerationPolicy::FailClosed => Screening::Blocked,
                ModerationPolicy::FailReviewQueue => Screening::QueueForReview,
            }
        }
    }
}

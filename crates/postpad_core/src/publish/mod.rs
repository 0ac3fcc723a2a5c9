//! Publisher contract for the external posting platform.
//!
//! # Invariants
//! - A publish call is attempted exactly once; there are no retries.
//! - `ConfigurationError` is reported before any network traffic.

use serde::{Deserialize, Serialize};
use thiserror::Error;

mod oauth;
mod x_client;

pub use x_client::XPublisher;

/// Shown when the platform gives no readable reason.
pub const GENERIC_PUBLISH_FAILURE: &str = "Failed to post. Please try again.";

/// The four static values used to sign requests as the posting account.
#[derive(Clone, PartialEq, Eq)]
pub struct XCredentials {
    pub api_key: String,
    pub api_secret: String,
    pub access_token: String,
    pub access_secret: String,
}

impl std::fmt::Debug for XCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("XCredentials")
            .field("api_key", &"<redacted>")
            .field("api_secret", &"<redacted>")
            .field("access_token", &"<redacted>")
            .field("access_secret", &"<redacted>")
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublishReceipt {
    pub external_post_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PublishError {
    #[error("{0}")]
    Configuration(String),
    #[error("platform rejected the post (HTTP {status})")]
    Platform { status: u16, detail: Option<String> },
    #[error("publish request failed: {0}")]
    Transport(String),
}

impl PublishError {
    /// Message surfaced to the user for this failure.
    pub fn user_message(&self) -> String {
        match self {
            Self::Configuration(message) => message.clone(),
            Self::Platform {
                detail: Some(detail),
                ..
            } if !detail.trim().is_empty() => detail.clone(),
            Self::Platform { .. } | Self::Transport(_) => GENERIC_PUBLISH_FAILURE.to_string(),
        }
    }
}

/// Sends approved text to the posting platform.
pub trait Publisher {
    fn publish(&self, text: &str) -> Result<PublishReceipt, PublishError>;
}

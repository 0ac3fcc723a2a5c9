//! Account identity and authenticated session.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable identifier of one account.
pub type UserId = Uuid;

/// Authenticated caller identity.
///
/// Only `AuthService` mints sessions, and repositories can only be built from
/// one, so every store query is bound to an identity that was verified here
/// rather than one supplied by the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    user_id: UserId,
    email: String,
}

impl Session {
    pub(crate) fn new(user_id: UserId, email: impl Into<String>) -> Self {
        Self {
            user_id,
            email: email.into(),
        }
    }

    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    pub fn email(&self) -> &str {
        &self.email
    }
}

//! Account sign-up/sign-in and session minting.
//!
//! # Invariants
//! - Emails are stored trimmed and lowercase.
//! - Passwords are stored only as salted, iterated SHA-256 digests.
//! - Unknown email and wrong password are reported identically.

use crate::clock::Clock;
use crate::model::user::Session;
use crate::repo::account_repo::{AccountRecord, AccountRepository};
use crate::repo::RepoError;
use log::{info, warn};
use once_cell::sync::Lazy;
use rand::RngCore;
use regex::Regex;
use sha2::{Digest, Sha256};
use thiserror::Error;
use uuid::Uuid;

const MIN_PASSWORD_CHARS: usize = 6;
const SALT_BYTES: usize = 16;
const HASH_ROUNDS: u32 = 10_000;

static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("valid email regex"));

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("`{0}` is not a valid email address")]
    InvalidEmail(String),
    #[error("password must be at least {MIN_PASSWORD_CHARS} characters")]
    WeakPassword,
    #[error("an account already exists for `{0}`")]
    EmailTaken(String),
    #[error("invalid email or password")]
    InvalidCredentials,
    #[error(transparent)]
    Repo(RepoError),
}

impl From<RepoError> for AuthError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::Duplicate { key, .. } => Self::EmailTaken(key),
            other => Self::Repo(other),
        }
    }
}

pub struct AuthService<R: AccountRepository> {
    repo: R,
}

impl<R: AccountRepository> AuthService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Creates an account and returns its first session.
    pub fn sign_up(
        &self,
        email: &str,
        password: &str,
        clock: &dyn Clock,
    ) -> Result<Session, AuthError> {
        let email = normalize_email(email)?;
        if password.chars().count() < MIN_PASSWORD_CHARS {
            return Err(AuthError::WeakPassword);
        }

        let mut salt = [0u8; SALT_BYTES];
        rand::thread_rng().fill_bytes(&mut salt);
        let password_salt = hex::encode(salt);
        let account = AccountRecord {
            id: Uuid::new_v4(),
            password_hash: hash_password(&password_salt, password),
            password_salt,
            email,
            created_at: clock.now(),
        };

        let user_id = self.repo.create_account(&account)?;
        info!("event=sign_up module=auth status=ok user_id={user_id}");
        Ok(Session::new(user_id, account.email))
    }

    /// Verifies credentials and returns a session.
    pub fn sign_in(&self, email: &str, password: &str) -> Result<Session, AuthError> {
        let email = normalize_email(email).map_err(|_| AuthError::InvalidCredentials)?;
        let Some(account) = self.repo.find_by_email(&email)? else {
            warn!("event=sign_in module=auth status=error error_code=unknown_account");
            return Err(AuthError::InvalidCredentials);
        };

        if hash_password(&account.password_salt, password) != account.password_hash {
            warn!(
                "event=sign_in module=auth status=error error_code=bad_password user_id={}",
                account.id
            );
            return Err(AuthError::InvalidCredentials);
        }

        info!("event=sign_in module=auth status=ok user_id={}", account.id);
        Ok(Session::new(account.id, account.email))
    }
}

fn normalize_email(email: &str) -> Result<String, AuthError> {
    let normalized = email.trim().to_lowercase();
    if EMAIL_RE.is_match(&normalized) {
        Ok(normalized)
    } else {
        Err(AuthError::InvalidEmail(email.trim().to_string()))
    }
}

fn hash_password(salt_hex: &str, password: &str) -> String {
    let mut digest = Sha256::new()
        .chain_update(salt_hex.as_bytes())
        .chain_update(password.as_bytes())
        .finalize();
    for _ in 1..HASH_ROUNDS {
        digest = Sha256::new()
            .chain_update(digest)
            .chain_update(password.as_bytes())
            .finalize();
    }
    hex::encode(digest)
}

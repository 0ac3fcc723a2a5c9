//! Core domain logic for Postpad.
//! This crate is the single source of truth for business invariants.

pub mod auth;
pub mod clock;
pub mod config;
pub mod db;
pub mod logging;
pub mod migrate;
pub mod model;
pub mod moderation;
pub mod publish;
pub mod repo;
pub mod service;
pub mod view;
pub mod workflow;

pub use auth::{AuthError, AuthService};
pub use clock::{Clock, FixedClock, ReferenceZone, SystemClock};
pub use config::{Config, ConfigError};
pub use db::{open_db, open_db_in_memory, DbError};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::draft::{draft_preview, validate_post_text, Draft, DraftId, ValidationError};
pub use model::post::PublishedPost;
pub use model::streak::{StreakRecord, StreakUpdate};
pub use model::tag::Tag;
pub use model::todo::{Priority, TodoItem, TodoStatus};
pub use model::user::{Session, UserId};
pub use moderation::{
    AssistClient, ModerationError, ModerationGate, ModerationPolicy, ModerationVerdict,
    PostIdeaGenerator,
};
pub use publish::{PublishError, PublishReceipt, Publisher, XCredentials, XPublisher};
pub use repo::{RepoError, RepoResult};
pub use workflow::{
    ComposeError, Composer, ComposerDeps, ComposerPhase, Decision, PublishOutcome, PublishReport,
};

/// Minimal health-check API.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

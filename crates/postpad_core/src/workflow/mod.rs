//! Stateful compose → moderate → publish flow.
//!
//! # Responsibility
//! - Own the only multi-step control flow in the crate (`Composer`).
//! - Translate gate/publisher/store failures into one user-facing taxonomy.

pub mod composer;

pub use composer::{
    ComposeError, Composer, ComposerDeps, ComposerPhase, Decision, PublishOutcome, PublishReport,
    SubmissionKind,
};

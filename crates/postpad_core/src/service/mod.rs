//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate repository calls into use-case level APIs.
//! - Keep the CLI and workflow layers decoupled from storage details.

pub mod draft_service;
pub mod stats_service;
pub mod streak_service;
pub mod tag_service;
pub mod todo_service;

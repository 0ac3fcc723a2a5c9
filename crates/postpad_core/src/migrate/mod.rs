//! One-time data migrations from earlier storage formats.

pub mod legacy;

pub use legacy::{coerce_timestamp, import_legacy_drafts, ImportError, ImportReport};

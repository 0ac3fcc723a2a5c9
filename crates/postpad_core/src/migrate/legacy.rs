//! Import of exported document-store drafts.
//!
//! # Responsibility
//! - Read a JSON array of `{content, createdAt}` documents.
//! - Coerce each historical timestamp shape once into the single persisted
//!   representation.
//!
//! # Invariants
//! - Documents that fail validation or timestamp coercion are skipped and
//!   counted, never partially written.
//! - Imported drafts belong to the importing session.

use crate::model::draft::Draft;
use crate::model::user::Session;
use crate::repo::draft_repo::DraftRepository;
use crate::repo::RepoError;
use chrono::{DateTime, Utc};
use log::{info, warn};
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ImportError {
    #[error("import file is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("import file must contain a JSON array of drafts")]
    NotAnArray,
    #[error(transparent)]
    Repo(#[from] RepoError),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ImportReport {
    pub imported: usize,
    pub skipped: usize,
}

pub fn import_legacy_drafts(
    drafts: &dyn DraftRepository,
    session: &Session,
    json: &str,
) -> Result<ImportReport, ImportError> {
    let documents = match serde_json::from_str::<Value>(json)? {
        Value::Array(documents) => documents,
        _ => return Err(ImportError::NotAnArray),
    };

    let mut report = ImportReport::default();
    for (index, document) in documents.iter().enumerate() {
        let Some(draft) = draft_from_document(session, document) else {
            warn!("event=legacy_import module=migrate status=skipped index={index}");
            report.skipped += 1;
            continue;
        };
        drafts.create_draft(&draft)?;
        report.imported += 1;
    }

    info!(
        "event=legacy_import module=migrate status=ok imported={} skipped={}",
        report.imported, report.skipped
    );
    Ok(report)
}

fn draft_from_document(session: &Session, document: &Value) -> Option<Draft> {
    let content = document.get("content")?.as_str()?;
    let created_at = coerce_timestamp(document.get("createdAt")?)?;
    Draft::new(session.user_id(), content, created_at).ok()
}

/// Reads a timestamp stored as `{seconds, nanoseconds}` (optionally
/// underscore-prefixed), an RFC 3339 string or epoch milliseconds.
pub fn coerce_timestamp(value: &Value) -> Option<DateTime<Utc>> {
    match value {
        Value::Object(fields) => {
            let seconds = fields
                .get("seconds")
                .or_else(|| fields.get("_seconds"))
                .and_then(Value::as_i64)?;
            let nanos = fields
                .get("nanoseconds")
                .or_else(|| fields.get("_nanoseconds"))
                .and_then(Value::as_u64)
                .unwrap_or(0);
            DateTime::from_timestamp(seconds, u32::try_from(nanos).ok()?)
        }
        Value::String(text) => DateTime::parse_from_rfc3339(text.trim())
            .ok()
            .map(|parsed| parsed.with_timezone(&Utc)),
        Value::Number(number) => {
            let millis = number
                .as_i64()
                .or_else(|| number.as_f64().map(|value| value.trunc() as i64))?;
            DateTime::from_timestamp_millis(millis)
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::coerce_timestamp;
    use chrono::{TimeZone, Utc};
    use serde_json::json;

    #[test]
    fn reads_timestamp_objects() {
        let expected = Utc.timestamp_opt(1_700_000_000, 500).unwrap();
        assert_eq!(
            coerce_timestamp(&json!({"seconds": 1_700_000_000, "nanoseconds": 500})),
            Some(expected)
        );
        assert_eq!(
            coerce_timestamp(&json!({"_seconds": 1_700_000_000, "_nanoseconds": 500})),
            Some(expected)
        );
    }

    #[test]
    fn reads_rfc3339_and_epoch_millis() {
        let expected = Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap();
        assert_eq!(
            coerce_timestamp(&json!("2024-01-02T04:04:05+01:00")),
            Some(expected)
        );
        assert_eq!(
            coerce_timestamp(&json!(expected.timestamp_millis())),
            Some(expected)
        );
    }

    #[test]
    fn rejects_unknown_shapes() {
        assert_eq!(coerce_timestamp(&json!("yesterday")), None);
        assert_eq!(coerce_timestamp(&json!({"nanoseconds": 1})), None);
        assert_eq!(coerce_timestamp(&json!(true)), None);
    }
}

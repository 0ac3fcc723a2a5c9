//! Process configuration.
//!
//! # Responsibility
//! - Read settings from `.env` and the process environment.
//! - Validate values that have a closed set of options.
//!
//! # Invariants
//! - Missing publishing credentials never fail loading; they surface as a
//!   configuration error on the first publish attempt.

use crate::clock::ReferenceZone;
use crate::logging::default_log_level;
use crate::moderation::ModerationPolicy;
use crate::publish::XCredentials;
use std::path::PathBuf;
use thiserror::Error;

pub const DB_PATH_KEY: &str = "POSTPAD_DB_PATH";
pub const LOG_DIR_KEY: &str = "POSTPAD_LOG_DIR";
pub const LOG_LEVEL_KEY: &str = "POSTPAD_LOG_LEVEL";
pub const MODERATION_URL_KEY: &str = "POSTPAD_MODERATION_URL";
pub const ASSIST_URL_KEY: &str = "POSTPAD_ASSIST_URL";
pub const MODERATION_POLICY_KEY: &str = "POSTPAD_MODERATION_POLICY";
pub const STREAK_OFFSET_KEY: &str = "POSTPAD_STREAK_UTC_OFFSET_MINUTES";
pub const X_API_BASE_URL_KEY: &str = "X_API_BASE_URL";
pub const X_API_KEY: &str = "X_API_KEY";
pub const X_API_KEY_SECRET: &str = "X_API_KEY_SECRET";
pub const X_ACCESS_TOKEN: &str = "X_ACCESS_TOKEN";
pub const X_ACCESS_TOKEN_SECRET: &str = "X_ACCESS_TOKEN_SECRET";

const DEFAULT_DB_PATH: &str = "postpad.sqlite3";
const DEFAULT_X_API_BASE_URL: &str = "https://api.twitter.com";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("invalid value `{value}` for {key}: {reason}")]
    InvalidValue {
        key: &'static str,
        value: String,
        reason: &'static str,
    },
}

#[derive(Debug, Clone)]
pub struct Config {
    pub db_path: PathBuf,
    pub log_dir: Option<String>,
    pub log_level: String,
    pub moderation_url: Option<String>,
    pub assist_url: Option<String>,
    pub moderation_policy: ModerationPolicy,
    pub reference_zone: ReferenceZone,
    pub x_api_base_url: String,
    /// Either the full credential set or the names of the missing keys.
    pub x_credentials: Result<XCredentials, Vec<&'static str>>,
}

impl Config {
    /// Loads `.env` when present, then reads the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds configuration from an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let moderation_policy = match get(MODERATION_POLICY_KEY) {
            Some(value) => {
                ModerationPolicy::parse(&value).ok_or(ConfigError::InvalidValue {
                    key: MODERATION_POLICY_KEY,
                    value,
                    reason: "expected fail-open|fail-closed|fail-review-queue",
                })?
            }
            None => ModerationPolicy::default(),
        };

        let reference_zone = match get(STREAK_OFFSET_KEY) {
            Some(value) => value
                .parse::<i32>()
                .ok()
                .and_then(ReferenceZone::from_offset_minutes)
                .ok_or(ConfigError::InvalidValue {
                    key: STREAK_OFFSET_KEY,
                    value,
                    reason: "expected integer minutes within +/-1080",
                })?,
            None => ReferenceZone::utc(),
        };

        Ok(Self {
            db_path: PathBuf::from(get(DB_PATH_KEY).unwrap_or_else(|| DEFAULT_DB_PATH.to_string())),
            log_dir: get(LOG_DIR_KEY),
            log_level: get(LOG_LEVEL_KEY).unwrap_or_else(|| default_log_level().to_string()),
            moderation_url: get(MODERATION_URL_KEY),
            assist_url: get(ASSIST_URL_KEY),
            moderation_policy,
            reference_zone,
            x_api_base_url: get(X_API_BASE_URL_KEY)
                .unwrap_or_else(|| DEFAULT_X_API_BASE_URL.to_string()),
            x_credentials: x_credentials_from(&get),
        })
    }
}

fn x_credentials_from(
    get: &impl Fn(&str) -> Option<String>,
) -> Result<XCredentials, Vec<&'static str>> {
    let keys = [X_API_KEY, X_API_KEY_SECRET, X_ACCESS_TOKEN, X_ACCESS_TOKEN_SECRET];
    let missing = keys
        .iter()
        .copied()
        .filter(|key| get(*key).is_none())
        .collect::<Vec<_>>();
    if !missing.is_empty() {
        return Err(missing);
    }

    let value = |key: &str| get(key).unwrap_or_default();
    Ok(XCredentials {
        api_key: value(X_API_KEY),
        api_secret: value(X_API_KEY_SECRET),
        access_token: value(X_ACCESS_TOKEN),
        access_secret: value(X_ACCESS_TOKEN_SECRET),
    })
}

#[cfg(test)]
mod tests {
    use super::{
        Config, ConfigError, MODERATION_POLICY_KEY, STREAK_OFFSET_KEY, X_ACCESS_TOKEN_SECRET,
    };
    use crate::moderation::ModerationPolicy;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect::<HashMap<_, _>>();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_apply_when_unset() {
        let config = Config::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.moderation_policy, ModerationPolicy::FailOpen);
        assert_eq!(config.reference_zone.offset_minutes(), 0);
        assert_eq!(config.db_path.to_str(), Some("postpad.sqlite3"));
        assert_eq!(config.x_credentials.unwrap_err().len(), 4);
    }

    #[test]
    fn reports_only_missing_credential_keys() {
        let config = Config::from_lookup(lookup(&[
            ("X_API_KEY", "k"),
            ("X_API_KEY_SECRET", "s"),
            ("X_ACCESS_TOKEN", "t"),
            ("X_ACCESS_TOKEN_SECRET", "  "),
        ]))
        .unwrap();
        assert_eq!(config.x_credentials.unwrap_err(), vec![X_ACCESS_TOKEN_SECRET]);
    }

    #[test]
    fn rejects_unknown_policy() {
        let err = Config::from_lookup(lookup(&[(MODERATION_POLICY_KEY, "maybe")])).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidValue { key, .. } if key == MODERATION_POLICY_KEY
        ));
    }

    #[test]
    fn parses_streak_offset() {
        let config = Config::from_lookup(lookup(&[(
            "POSTPAD_STREAK_UTC_OFFSET_MINUTES",
            "-480",
        )]))
        .unwrap();
        assert_eq!(config.reference_zone.offset_minutes(), -480);
        assert!(Config::from_lookup(lookup(&[(
            "POSTPAD_STREAK_UTC_OFFSET_MINUTES",
            "abc"
        )]))
        .is_err());
    }

    #[test]
    fn streak_offset_is_limited_to_eighteen_hours() {
        for value in ["1081", "-1081", "1400"] {
            let err = Config::from_lookup(lookup(&[(STREAK_OFFSET_KEY, value)])).unwrap_err();
            assert!(
                matches!(err, ConfigError::InvalidValue { key, .. } if key == STREAK_OFFSET_KEY),
                "offset {value} should be rejected"
            );
        }

        let config = Config::from_lookup(lookup(&[(STREAK_OFFSET_KEY, "1080")])).unwrap();
        assert_eq!(config.reference_zone.offset_minutes(), 1080);
        let config = Config::from_lookup(lookup(&[(STREAK_OFFSET_KEY, "-1080")])).unwrap();
        assert_eq!(config.reference_zone.offset_minutes(), -1080);
    }
}

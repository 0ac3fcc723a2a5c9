//! Blocking client for the X (Twitter) v2 create-post endpoint.

use super::oauth::{authorization_header, generate_nonce};
use super::{PublishError, PublishReceipt, Publisher, XCredentials};
use crate::config::Config;
use log::{info, warn};
use reqwest::blocking::Client;
use reqwest::header::AUTHORIZATION;
use serde::{Deserialize, Serialize};

const CREATE_POST_PATH: &str = "/2/tweets";

#[derive(Debug, Serialize)]
struct CreatePostRequest<'a> {
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct CreatePostResponse {
    data: CreatedPost,
}

#[derive(Debug, Deserialize)]
struct CreatedPost {
    id: String,
}

#[derive(Debug, Default, Deserialize)]
struct ProblemBody {
    detail: Option<String>,
    title: Option<String>,
    #[serde(default)]
    errors: Vec<ProblemEntry>,
}

#[derive(Debug, Deserialize)]
struct ProblemEntry {
    message: Option<String>,
}

pub struct XPublisher {
    http: Client,
    base_url: String,
    credentials: Result<XCredentials, Vec<&'static str>>,
}

impl XPublisher {
    /// `credentials` is either the full set or the names of the missing keys.
    pub fn new(
        base_url: impl Into<String>,
        credentials: Result<XCredentials, Vec<&'static str>>,
    ) -> Self {
        Self {
            http: Client::new(),
            base_url: base_url.into(),
            credentials,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.x_api_base_url.clone(), config.x_credentials.clone())
    }

    fn endpoint(&self) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), CREATE_POST_PATH)
    }
}

impl Publisher for XPublisher {
    fn publish(&self, text: &str) -> Result<PublishReceipt, PublishError> {
        let credentials = self.credentials.as_ref().map_err(|missing| {
            PublishError::Configuration(format!(
                "X API credentials are not fully configured (missing: {}).",
                missing.join(", ")
            ))
        })?;

        let url = self.endpoint();
        let header = authorization_header(
            credentials,
            "POST",
            &url,
            &[],
            &generate_nonce(),
            chrono::Utc::now().timestamp(),
        );

        let response = self
            .http
            .post(&url)
            .header(AUTHORIZATION, header)
            .json(&CreatePostRequest { text })
            .send()
            .map_err(|err| {
                warn!("event=publish_send module=publish status=error error={err}");
                PublishError::Transport(err.to_string())
            })?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .map_err(|err| PublishError::Transport(err.to_string()))?;
        let receipt = receipt_from_response(status, &body)?;
        info!(
            "event=publish_send module=publish status=ok external_id={}",
            receipt.external_post_id
        );
        Ok(receipt)
    }
}

fn receipt_from_response(status: u16, body: &str) -> Result<PublishReceipt, PublishError> {
    if (200..300).contains(&status) {
        let parsed: CreatePostResponse = serde_json::from_str(body)
            .map_err(|err| PublishError::Transport(format!("unreadable response: {err}")))?;
        return Ok(PublishReceipt {
            external_post_id: parsed.data.id,
        });
    }

    let problem: ProblemBody = serde_json::from_str(body).unwrap_or_default();
    let detail = problem
        .detail
        .or(problem.title)
        .or_else(|| problem.errors.into_iter().find_map(|entry| entry.message))
        .filter(|message| !message.trim().is_empty());
    warn!(
        "event=publish_send module=publish status=rejected http_status={status} has_detail={}",
        detail.is_some()
    );
    Err(PublishError::Platform { status, detail })
}

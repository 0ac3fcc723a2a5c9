//! HTTP client for the LLM-backed assist service.
//!
//! Wire format (JSON):
//! - moderation: `{tweet}` -> `{isOffensive, rephrasedTweet, explanation}`
//! - post ideas: `{topic}` -> `{tweet}`

use super::{ModerationError, ModerationGate, ModerationVerdict, PostIdeaGenerator};
use log::debug;
use reqwest::blocking::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize)]
struct ModerationRequest<'a> {
    tweet: &'a str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ModerationResponse {
    is_offensive: bool,
    #[serde(default)]
    rephrased_tweet: String,
    #[serde(default)]
    explanation: String,
}

#[derive(Debug, Serialize)]
struct IdeaRequest<'a> {
    topic: &'a str,
}

#[derive(Debug, Deserialize)]
struct IdeaResponse {
    tweet: String,
}

/// Blocking client for the moderation and post-idea endpoints.
#[derive(Debug, Clone)]
pub struct AssistClient {
    http: Client,
    moderation_url: Option<String>,
    ideas_url: Option<String>,
}

impl AssistClient {
    pub fn new(moderation_url: Option<String>, ideas_url: Option<String>) -> Self {
        Self {
            http: Client::new(),
            moderation_url,
            ideas_url,
        }
    }

    fn post_json<B: Serialize, T: DeserializeOwned>(
        &self,
        url: Option<&str>,
        body: &B,
    ) -> Result<T, ModerationError> {
        let url = url.ok_or(ModerationError::NotConfigured)?;
        let response = self
            .http
            .post(url)
            .json(body)
            .send()
            .map_err(|err| ModerationError::Transport(err.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ModerationError::Service {
                status: status.as_u16(),
            });
        }
        let text = response
            .text()
            .map_err(|err| ModerationError::Transport(err.to_string()))?;
        serde_json::from_str(&text).map_err(|err| ModerationError::InvalidResponse(err.to_string()))
    }
}

impl ModerationGate for AssistClient {
    fn moderate(&self, text: &str) -> Result<ModerationVerdict, ModerationError> {
        if text.is_empty() {
            return Err(ModerationError::EmptyInput);
        }
        debug!(
            "event=moderate_request module=moderation status=start text_len={}",
            text.len()
        );
        let response: ModerationResponse = self.post_json(
            self.moderation_url.as_deref(),
            &ModerationRequest { tweet: text },
        )?;
        Ok(verdict_from(response))
    }
}

impl PostIdeaGenerator for AssistClient {
    fn generate(&self, topic: &str) -> Result<String, ModerationError> {
        let topic = topic.trim();
        if topic.is_empty() {
            return Err(ModerationError::EmptyInput);
        }
        let response: IdeaResponse =
            self.post_json(self.ideas_url.as_deref(), &IdeaRequest { topic })?;
        Ok(response.tweet.trim().to_string())
    }
}

fn verdict_from(response: ModerationResponse) -> ModerationVerdict {
    ModerationVerdict {
        is_offensive: response.is_offensive,
        rephrased_suggestion: response.rephrased_tweet,
        explanation: response.explanation,
    }
}

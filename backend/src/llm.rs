//! Client for an OpenAI-compatible chat-completions endpoint (DeepSeek by
//! default). Only built when an API key is configured.

use std::time::Duration;

use common::model::chat::ChatTurn;
use serde::{Deserialize, Serialize};

use crate::config::Settings;

const MAX_TOKENS: u32 = 500;
const TEMPERATURE: f32 = 0.7;

#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("provider answered {status}: {body}")]
    Status { status: u16, body: String },
    #[error("provider returned no choices")]
    Empty,
}

#[derive(Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: &'a [ChatTurn],
    max_tokens: u32,
    temperature: f32,
}

#[derive(Deserialize)]
struct CompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: String,
}

#[derive(Clone)]
pub struct LlmClient {
    http: reqwest::Client,
    endpoint: String,
    api_key: String,
    model: String,
}

impl LlmClient {
    pub fn from_settings(settings: &Settings) -> Result<Option<Self>, reqwest::Error> {
        let Some(api_key) = settings.llm_key() else {
            return Ok(None);
        };
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()?;
        Ok(Some(Self {
            http,
            endpoint: format!("{}/chat/completions", settings.llm_base_url.trim_end_matches('/')),
            api_key: api_key.to_string(),
            model: settings.llm_model.clone(),
        }))
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub async fn complete(&self, messages: &[ChatTurn]) -> Result<String, LlmError> {
        let body = CompletionRequest {
            model: &self.model,
            messages,
            max_tokens: MAX_TOKENS,
            temperature: TEMPERATURE,
        };
        let response = self
            .http
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(LlmError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: CompletionResponse = response.json().await?;
        parsed
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content.trim().to_string())
            .filter(|content| !content.is_empty())
            .ok_or(LlmError::Empty)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_key_means_no_client() {
        let settings = Settings::default();
        assert!(LlmClient::from_settings(&settings).unwrap().is_none());
    }

    #[test]
    fn endpoint_joins_base_url() {
        let settings = Settings {
            llm_api_key: Some("sk-test".into()),
            llm_base_url: "https://api.example.com/v1/".into(),
            ..Settings::default()
        };
        let client = LlmClient::from_settings(&settings).unwrap().unwrap();
        assert_eq!(client.endpoint, "https://api.example.com/v1/chat/completions");
        assert_eq!(client.model(), "deepseek-chat");
    }
}

//! OpenAI-compatible chat completions client (https://api.openai.com by default).
//! Single-turn, non-streaming: one user message in, first choice content out.

use crate::config::{self, Config};
use crate::llm::ChatResponder;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

const DEFAULT_BASE_URL: &str = "https://api.openai.com";
const DEFAULT_MODEL: &str = "gpt-3.5-turbo";
const DEFAULT_MAX_TOKENS: u32 = 150;

/// Client for an OpenAI-compatible /v1/chat/completions endpoint.
#[derive(Clone)]
pub struct OpenAiClient {
    base_url: String,
    api_key: Option<String>,
    model: String,
    max_tokens: u32,
    client: reqwest::Client,
}

#[derive(Debug, thiserror::Error)]
pub enum UpstreamError {
    #[error("completion request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("completion api error: {0}")]
    Api(String),
    #[error("completion api key not configured")]
    NotConfigured,
    #[error("completion response malformed: {0}")]
    Malformed(String),
}

impl OpenAiClient {
    pub fn new(
        api_key: Option<String>,
        base_url: Option<String>,
        model: Option<String>,
        max_tokens: Option<u32>,
    ) -> Self {
        let base_url = base_url
            .map(|u| u.trim_end_matches('/').to_string())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        Self {
            base_url,
            api_key,
            model: model
                .map(|m| m.trim().to_string())
                .filter(|m| !m.is_empty())
                .unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            max_tokens: max_tokens.unwrap_or(DEFAULT_MAX_TOKENS),
            client: reqwest::Client::new(),
        }
    }

    /// Build a client from config; the API key comes from OPENAI_API_KEY or
    /// the config file.
    pub fn from_config(cfg: &Config) -> Self {
        Self::new(
            config::resolve_responder_key(cfg),
            cfg.responder.api_base.clone(),
            cfg.responder.model.clone(),
            cfg.responder.max_tokens,
        )
    }

    /// POST /v1/chat/completions with a single user message.
    async fn chat(&self, prompt: &str) -> Result<String, UpstreamError> {
        let key = self.api_key.as_ref().ok_or(UpstreamError::NotConfigured)?;
        let url = format!("{}/v1/chat/completions", self.base_url);
        let body = ChatRequest {
            model: self.model.clone(),
            messages: vec![ChatMessage {
                role: "user".to_string(),
                content: prompt.to_string(),
            }],
            max_tokens: self.max_tokens,
        };
        let res = self
            .client
            .post(&url)
            .bearer_auth(key)
            .json(&body)
            .send()
            .await?;
        if !res.status().is_success() {
            let status = res.status();
            let body = res.text().await.unwrap_or_default();
            return Err(UpstreamError::Api(format!("{} {}", status, body)));
        }
        let data: ChatResponse = res.json().await?;
        let content = data
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| UpstreamError::Malformed("no choices in response".to_string()))?;
        Ok(content)
    }
}

#[async_trait]
impl ChatResponder for OpenAiClient {
    async fn complete(&self, prompt: &str) -> Result<String, UpstreamError> {
        self.chat(prompt).await
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    max_tokens: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChatMessage,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_applied_when_unset() {
        let c = OpenAiClient::new(None, None, None, None);
        assert_eq!(c.base_url, DEFAULT_BASE_URL);
        assert_eq!(c.model, DEFAULT_MODEL);
        assert_eq!(c.max_tokens, DEFAULT_MAX_TOKENS);
    }

    #[test]
    fn base_url_trailing_slash_trimmed() {
        let c = OpenAiClient::new(None, Some("http://localhost:8000/".to_string()), None, None);
        assert_eq!(c.base_url, "http://localhost:8000");
    }

    #[tokio::test]
    async fn missing_key_fails_without_network() {
        let c = OpenAiClient::new(None, None, None, None);
        let err = c.complete("hola").await.unwrap_err();
        assert!(matches!(err, UpstreamError::NotConfigured));
    }

    #[test]
    fn response_parses_first_choice() {
        let data: ChatResponse = serde_json::from_str(
            r#"{"choices":[{"message":{"role":"assistant","content":"hola!"}}]}"#,
        )
        .unwrap();
        assert_eq!(data.choices[0].message.content, "hola!");
    }
}

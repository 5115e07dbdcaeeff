//! Chat-completion abstraction and OpenAI-compatible client.
//!
//! The router falls through to a [`ChatResponder`] for any message no rule
//! matched; failures degrade to an error string upstream, never a panic.

mod openai;

pub use openai::{OpenAiClient, UpstreamError};

use async_trait::async_trait;

/// Free-text responder behind the router's fallback rule.
#[async_trait]
pub trait ChatResponder: Send + Sync {
    async fn complete(&self, prompt: &str) -> Result<String, UpstreamError>;
}

//! Generative-text service clients

mod gemini;

use async_trait::async_trait;
use thiserror::Error;

pub use gemini::{GeminiClient, NO_RECOMMENDATION_TEXT};

/// Generative-text error types
#[derive(Debug, Error)]
pub enum LlmError {
    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Service returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Failed to decode response: {0}")]
    Decode(String),
}

/// A service that completes a prompt with free text
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Send one prompt and return the generated text. No retries.
    async fn complete(&self, prompt: &str) -> Result<String, LlmError>;
}

//! Generative model contract and the Ollama-backed implementation.
//!
//! Two call shapes: a single-prompt form used by the classifier and a
//! role-tagged chat form used by the response generator. Both are
//! timeout-bound; a timeout surfaces as a retryable generation error,
//! never as a hang.

use async_trait::async_trait;
use std::time::Duration;
use support_common::config::LlmConfig;
use support_common::{
    ChatMessage, OllamaChatRequest, OllamaChatResponse, OllamaGenerateRequest,
    OllamaGenerateResponse, OllamaMessage, SupportError,
};
use tracing::debug;

/// External generative model collaborator.
#[async_trait]
pub trait GenerativeModel: Send + Sync {
    /// Single-prompt completion (classification form).
    async fn generate(&self, prompt: &str) -> Result<String, SupportError>;

    /// Multi-turn role-tagged completion (generation form).
    async fn chat(&self, messages: &[ChatMessage]) -> Result<String, SupportError>;
}

/// Ollama HTTP client.
pub struct OllamaClient {
    http_client: reqwest::Client,
    base_url: String,
    model: String,
}

impl OllamaClient {
    pub fn new(config: &LlmConfig) -> Self {
        Self {
            http_client: reqwest::Client::builder()
                .timeout(Duration::from_secs(config.timeout_secs))
                .build()
                .unwrap_or_default(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
        }
    }

    /// Check whether the Ollama service answers at all.
    pub async fn is_available(&self) -> bool {
        self.http_client
            .get(format!("{}/api/tags", self.base_url))
            .timeout(Duration::from_secs(2))
            .send()
            .await
            .map(|r| r.status().is_success())
            .unwrap_or(false)
    }
}

#[async_trait]
impl GenerativeModel for OllamaClient {
    async fn generate(&self, prompt: &str) -> Result<String, SupportError> {
        debug!("Ollama generate: {} chars, model {}", prompt.len(), self.model);

        let body = OllamaGenerateRequest {
            model: self.model.clone(),
            prompt: prompt.to_string(),
            stream: false,
        };

        let response = self
            .http_client
            .post(format!("{}/api/generate", self.base_url))
            .json(&body)
            .send()
            .await
            .map_err(|e| SupportError::Generation(e.to_string()))?;

        if !response.status().is_success() {
            return Err(SupportError::Generation(format!(
                "Ollama request failed: {}",
                response.status()
            )));
        }

        let parsed: OllamaGenerateResponse = response
            .json()
            .await
            .map_err(|e| SupportError::Generation(e.to_string()))?;

        Ok(parsed.response)
    }

    async fn chat(&self, messages: &[ChatMessage]) -> Result<String, SupportError> {
        debug!("Ollama chat: {} messages, model {}", messages.len(), self.model);

        let body = OllamaChatRequest {
            model: self.model.clone(),
            messages: messages.iter().map(OllamaMessage::from).collect(),
            stream: false,
        };

        let response = self
            .http_client
            .post(format!("{}/api/chat", self.base_url))
            .json(&body)
            .send()
            .await
            .map_err(|e| SupportError::Generation(e.to_string()))?;

        if !response.status().is_success() {
            return Err(SupportError::Generation(format!(
                "Ollama request failed: {}",
                response.status()
            )));
        }

        let parsed: OllamaChatResponse = response
            .json()
            .await
            .map_err(|e| SupportError::Generation(e.to_string()))?;

        Ok(parsed.message.content)
    }
}

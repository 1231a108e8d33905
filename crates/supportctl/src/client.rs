//! Thin HTTP client for the supportd API.

use anyhow::{bail, Context, Result};
use support_common::{
    ChatReply, ChatRequest, HealthResponse, NotifyRequest, SubmitReply, TaskStatusReply,
};
use uuid::Uuid;

pub const DEFAULT_ADDR: &str = "http://127.0.0.1:7850";

pub struct DaemonClient {
    http_client: reqwest::Client,
    base_url: String,
}

impl DaemonClient {
    pub fn new(base_url: String) -> Self {
        Self {
            http_client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Resolve the daemon address: flag, then $SUPPORTD_ADDR, then the
    /// default.
    pub fn resolve_addr(flag: Option<String>) -> String {
        flag.or_else(|| std::env::var("SUPPORTD_ADDR").ok())
            .unwrap_or_else(|| DEFAULT_ADDR.to_string())
    }

    pub async fn query(&self, user_id: &str, message: &str) -> Result<ChatReply> {
        let request = ChatRequest {
            user_id: user_id.to_string(),
            message: message.to_string(),
        };
        let response = self
            .http_client
            .post(format!("{}/v1/chat/query", self.base_url))
            .json(&request)
            .send()
            .await
            .context("daemon unreachable")?;
        Self::parse(response).await
    }

    pub async fn submit(&self, user_id: &str, message: &str) -> Result<SubmitReply> {
        let request = ChatRequest {
            user_id: user_id.to_string(),
            message: message.to_string(),
        };
        let response = self
            .http_client
            .post(format!("{}/v1/chat/submit", self.base_url))
            .json(&request)
            .send()
            .await
            .context("daemon unreachable")?;
        Self::parse(response).await
    }

    pub async fn task(&self, task_id: Uuid) -> Result<TaskStatusReply> {
        let response = self
            .http_client
            .get(format!("{}/v1/chat/task/{}", self.base_url, task_id))
            .send()
            .await
            .context("daemon unreachable")?;
        Self::parse(response).await
    }

    pub async fn notify(&self, message: &str) -> Result<()> {
        let request = NotifyRequest { message: message.to_string() };
        let response = self
            .http_client
            .post(format!("{}/v1/notify", self.base_url))
            .json(&request)
            .send()
            .await
            .context("daemon unreachable")?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            bail!("daemon returned {}: {}", status, body);
        }
        Ok(())
    }

    pub async fn health(&self) -> Result<HealthResponse> {
        let response = self
            .http_client
            .get(format!("{}/v1/health", self.base_url))
            .send()
            .await
            .context("daemon unreachable")?;
        Self::parse(response).await
    }

    async fn parse<T: serde::de::DeserializeOwned>(response: reqwest::Response) -> Result<T> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            bail!("daemon returned {}: {}", status, body);
        }
        response.json().await.context("invalid daemon response")
    }
}

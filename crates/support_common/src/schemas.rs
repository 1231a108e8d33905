//! Wire schemas: daemon HTTP API and Ollama request/response shapes.

use crate::category::Category;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ============================================================================
// Daemon API
// ============================================================================

/// Inbound chat request (`/v1/chat/query` and `/v1/chat/submit`)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatRequest {
    pub user_id: String,
    pub message: String,
}

/// Synchronous chat reply
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatReply {
    pub response: String,
    pub category: Category,
}

/// Reply to an async submission: poll `/v1/chat/task/{task_id}`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitReply {
    pub task_id: Uuid,
    pub status: String,
}

/// Background task status
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskStatusReply {
    /// "pending", "completed" or "failed"
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<Category>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Operator notification relay (`/v1/notify`)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotifyRequest {
    pub message: String,
}

/// Daemon health report
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_seconds: u64,
}

// ============================================================================
// Chat context
// ============================================================================

/// Message role in a generation context
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::System => "system",
            Self::User => "user",
            Self::Assistant => "assistant",
        }
    }
}

/// One role-tagged message in a generation context
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self { role: Role::System, content: content.into() }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self { role: Role::User, content: content.into() }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self { role: Role::Assistant, content: content.into() }
    }
}

// ============================================================================
// Ollama API
// ============================================================================

/// Single-prompt generation request (`/api/generate`)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OllamaGenerateRequest {
    pub model: String,
    pub prompt: String,
    #[serde(default)]
    pub stream: bool,
}

/// Single-prompt generation response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OllamaGenerateResponse {
    #[serde(default)]
    pub response: String,
    #[serde(default)]
    pub done: bool,
}

/// Role-tagged chat request (`/api/chat`)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OllamaChatRequest {
    pub model: String,
    pub messages: Vec<OllamaMessage>,
    #[serde(default)]
    pub stream: bool,
}

/// Ollama message
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OllamaMessage {
    pub role: String,
    pub content: String,
}

impl From<&ChatMessage> for OllamaMessage {
    fn from(msg: &ChatMessage) -> Self {
        Self {
            role: msg.role.as_str().to_string(),
            content: msg.content.clone(),
        }
    }
}

/// Ollama chat response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OllamaChatResponse {
    pub message: OllamaMessage,
    #[serde(default)]
    pub done: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_task_status_omits_empty_fields() {
        let reply = TaskStatusReply {
            status: "pending".to_string(),
            response: None,
            category: None,
            error: None,
        };
        let json = serde_json::to_string(&reply).unwrap();
        assert_eq!(json, r#"{"status":"pending"}"#);
    }

    #[test]
    fn test_ollama_message_from_chat_message() {
        let msg = OllamaMessage::from(&ChatMessage::assistant("hi"));
        assert_eq!(msg.role, "assistant");
        assert_eq!(msg.content, "hi");
    }

    #[test]
    fn test_chat_reply_category_serializes_snake_case() {
        let reply = ChatReply {
            response: "ok".to_string(),
            category: Category::Cached,
        };
        let json = serde_json::to_string(&reply).unwrap();
        assert!(json.contains(r#""category":"cached""#));
    }
}

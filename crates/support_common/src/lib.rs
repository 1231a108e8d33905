//! Shared vocabulary for the support agent: categories, chat turns,
//! wire schemas, prompts, configuration, and the error taxonomy.

pub mod category;
pub mod config;
pub mod error;
pub mod prompts;
pub mod schemas;
pub mod turn;

pub use category::Category;
pub use config::SupportConfig;
pub use error::SupportError;
pub use schemas::{
    ChatMessage, ChatReply, ChatRequest, HealthResponse, NotifyRequest, OllamaChatRequest,
    OllamaChatResponse, OllamaGenerateRequest, OllamaGenerateResponse, OllamaMessage, Role,
    SubmitReply, TaskStatusReply,
};
pub use turn::{ChatTurn, ConversationWindow};

//! Support daemon: classification, retrieval, generation and
//! escalation for customer chat, behind a small HTTP API.

pub mod classifier;
pub mod dedup;
pub mod escalation;
pub mod generator;
pub mod history;
pub mod knowledge;
pub mod llm;
pub mod pipeline;
pub mod routes;
pub mod server;
pub mod tasks;

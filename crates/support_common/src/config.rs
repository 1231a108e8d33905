//! Daemon configuration: TOML file with per-section defaults.
//!
//! Every field has a default so a missing or partial file never
//! prevents startup. The config path comes from `SUPPORTD_CONFIG` or
//! falls back to `/etc/support-agent/config.toml`.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::warn;

const DEFAULT_CONFIG_PATH: &str = "/etc/support-agent/config.toml";

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct SupportConfig {
    pub server: ServerConfig,
    pub llm: LlmConfig,
    pub history: HistoryConfig,
    pub dedup: DedupConfig,
    pub knowledge: KnowledgeConfig,
    pub crm: CrmConfig,
    pub alerts: AlertConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Bind address for the HTTP API
    pub bind_addr: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:7850".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// Ollama API base URL
    pub base_url: String,
    /// Model used for both classification and generation
    pub model: String,
    /// Per-request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:11434".to_string(),
            model: "llama3.1:8b".to_string(),
            timeout_secs: 120,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HistoryConfig {
    /// SQLite database path for the chat history store
    pub db_path: PathBuf,
    /// Turns of prior conversation included in the generation context
    pub context_window: usize,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from("/var/lib/support-agent/chats.db"),
            context_window: 5,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DedupConfig {
    /// Recent turns scanned for repeated questions
    pub window: usize,
}

impl Default for DedupConfig {
    fn default() -> Self {
        Self { window: 5 }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct KnowledgeConfig {
    /// Snippets returned per retrieval
    pub top_k: usize,
    /// Optional snippets seed file (one snippet per line)
    pub snippets_path: Option<PathBuf>,
}

impl Default for KnowledgeConfig {
    fn default() -> Self {
        Self {
            top_k: 3,
            snippets_path: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CrmConfig {
    /// Ticket-creation endpoint; None disables CRM filing
    pub endpoint: Option<String>,
    /// Contact email attached to created tickets
    pub contact_email: String,
    /// Contact channel (phone) attached to created tickets
    pub contact_phone: String,
}

impl Default for CrmConfig {
    fn default() -> Self {
        Self {
            endpoint: None,
            contact_email: "support@example.com".to_string(),
            contact_phone: "".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct AlertConfig {
    /// Chat-webhook URL for operator alerts; None logs instead
    pub webhook_url: Option<String>,
}

impl SupportConfig {
    /// Load configuration from the default location, honoring the
    /// `SUPPORTD_CONFIG` override. Missing file or parse errors fall
    /// back to defaults with a warning rather than refusing to start.
    pub fn load() -> Self {
        let path = std::env::var("SUPPORTD_CONFIG")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_PATH));
        Self::load_from(&path)
    }

    /// Load configuration from an explicit path.
    pub fn load_from(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(contents) => match toml::from_str(&contents) {
                Ok(config) => config,
                Err(e) => {
                    warn!("Invalid config at {:?}: {}. Using defaults.", path, e);
                    Self::default()
                }
            },
            Err(_) => Self::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_defaults() {
        let config = SupportConfig::default();
        assert_eq!(config.dedup.window, 5);
        assert_eq!(config.knowledge.top_k, 3);
        assert_eq!(config.history.context_window, 5);
        assert!(config.crm.endpoint.is_none());
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[llm]\nmodel = \"qwen3:4b\"").unwrap();

        let config = SupportConfig::load_from(file.path());
        assert_eq!(config.llm.model, "qwen3:4b");
        // Untouched sections keep their defaults
        assert_eq!(config.llm.timeout_secs, 120);
        assert_eq!(config.dedup.window, 5);
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let config = SupportConfig::load_from(Path::new("/nonexistent/config.toml"));
        assert_eq!(config.server.bind_addr, "127.0.0.1:7850");
    }

    #[test]
    fn test_invalid_file_uses_defaults() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "not valid toml [[[").unwrap();

        let config = SupportConfig::load_from(file.path());
        assert_eq!(config.llm.model, "llama3.1:8b");
    }
}

//! supportd entry point: load config, wire the pipeline, serve.

use std::sync::Arc;
use support_common::SupportConfig;
use supportd::classifier::QueryClassifier;
use supportd::escalation::EscalationRouter;
use supportd::generator::ResponseGenerator;
use supportd::history::{HistoryStore, SqliteHistoryStore};
use supportd::knowledge::{KeywordIndex, KnowledgeIndex};
use supportd::llm::OllamaClient;
use supportd::pipeline::ChatPipeline;
use supportd::server::{self, AppState};
use supportd::tasks::TaskRunner;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = SupportConfig::load();
    info!("supportd v{} starting", env!("CARGO_PKG_VERSION"));

    let model = Arc::new(OllamaClient::new(&config.llm));
    if !model.is_available().await {
        warn!(
            "Ollama not reachable at {}. Chat will fail until it comes up.",
            config.llm.base_url
        );
    }

    let history: Arc<dyn HistoryStore> =
        Arc::new(SqliteHistoryStore::open(&config.history.db_path)?);

    let knowledge: Arc<dyn KnowledgeIndex> = match &config.knowledge.snippets_path {
        Some(path) => {
            info!("Loading knowledge snippets from {:?}", path);
            Arc::new(KeywordIndex::from_file(path)?)
        }
        None => Arc::new(KeywordIndex::with_default_seed()),
    };

    let escalation = Arc::new(EscalationRouter::from_config(&config.crm, &config.alerts));
    let classifier = QueryClassifier::new(model.clone());
    let generator = ResponseGenerator::new(model.clone(), escalation.clone());

    let pipeline = Arc::new(ChatPipeline::new(
        history,
        classifier,
        knowledge,
        generator,
        escalation.clone(),
        config.history.context_window,
        config.dedup.window,
        config.knowledge.top_k,
    ));

    let state = Arc::new(AppState::new(pipeline, Arc::new(TaskRunner::new()), escalation));
    server::run(state, &config.server.bind_addr).await
}

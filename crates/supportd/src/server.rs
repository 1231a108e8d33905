//! HTTP server assembly: shared state, router, listener.

use crate::escalation::EscalationRouter;
use crate::pipeline::ChatPipeline;
use crate::routes;
use crate::tasks::TaskRunner;
use axum::routing::{get, post};
use axum::Router;
use std::sync::Arc;
use std::time::Instant;
use tower_http::trace::TraceLayer;
use tracing::info;

/// Shared state handed to every handler.
pub struct AppState {
    pub pipeline: Arc<ChatPipeline>,
    pub tasks: Arc<TaskRunner>,
    pub escalation: Arc<EscalationRouter>,
    pub start_time: Instant,
}

impl AppState {
    pub fn new(
        pipeline: Arc<ChatPipeline>,
        tasks: Arc<TaskRunner>,
        escalation: Arc<EscalationRouter>,
    ) -> Self {
        Self {
            pipeline,
            tasks,
            escalation,
            start_time: Instant::now(),
        }
    }
}

/// Build the daemon API router.
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/v1/chat/query", post(routes::chat_query))
        .route("/v1/chat/submit", post(routes::chat_submit))
        .route("/v1/chat/task/:task_id", get(routes::task_status))
        .route("/v1/notify", post(routes::notify))
        .route("/v1/health", get(routes::health))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Bind and serve until the process is stopped.
pub async fn run(state: Arc<AppState>, bind_addr: &str) -> anyhow::Result<()> {
    let app = build_router(state);
    let listener = tokio::net::TcpListener::bind(bind_addr).await?;
    info!("supportd listening on {}", bind_addr);
    axum::serve(listener, app).await?;
    Ok(())
}

//! HTTP handlers for the daemon API.

use crate::server::AppState;
use crate::tasks::TaskState;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use std::sync::Arc;
use support_common::{
    ChatReply, ChatRequest, HealthResponse, NotifyRequest, SubmitReply, SupportError,
    TaskStatusReply,
};
use tracing::info;
use uuid::Uuid;

fn error_response(err: SupportError) -> (StatusCode, String) {
    let status = match &err {
        SupportError::BadRequest(_) => StatusCode::BAD_REQUEST,
        // Retryable: the model backend is down or overloaded
        SupportError::Generation(_) => StatusCode::SERVICE_UNAVAILABLE,
        SupportError::Persistence(_) | SupportError::External(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };
    (status, err.to_string())
}

/// POST /v1/chat/query: run the pipeline synchronously.
pub async fn chat_query(
    State(state): State<Arc<AppState>>,
    Json(request): Json<ChatRequest>,
) -> Result<Json<ChatReply>, (StatusCode, String)> {
    let outcome = state
        .pipeline
        .handle_message(&request.user_id, &request.message)
        .await
        .map_err(error_response)?;

    Ok(Json(ChatReply {
        response: outcome.response,
        category: outcome.category,
    }))
}

/// POST /v1/chat/submit: start a background pipeline run.
pub async fn chat_submit(
    State(state): State<Arc<AppState>>,
    Json(request): Json<ChatRequest>,
) -> Result<Json<SubmitReply>, (StatusCode, String)> {
    // Reject malformed submissions before spawning anything
    if request.user_id.trim().is_empty() || request.message.trim().is_empty() {
        return Err((
            StatusCode::BAD_REQUEST,
            "user_id and message must not be blank".to_string(),
        ));
    }

    let task_id = state
        .tasks
        .submit(Arc::clone(&state.pipeline), request.user_id, request.message)
        .await;

    Ok(Json(SubmitReply {
        task_id,
        status: "pending".to_string(),
    }))
}

/// GET /v1/chat/task/{task_id}: poll a background run. Idempotent.
pub async fn task_status(
    State(state): State<Arc<AppState>>,
    Path(task_id): Path<Uuid>,
) -> Result<Json<TaskStatusReply>, (StatusCode, String)> {
    let task = state
        .tasks
        .poll(task_id)
        .await
        .ok_or((StatusCode::NOT_FOUND, format!("unknown task {}", task_id)))?;

    let reply = match task {
        TaskState::Pending => TaskStatusReply {
            status: "pending".to_string(),
            response: None,
            category: None,
            error: None,
        },
        TaskState::Completed(outcome) => TaskStatusReply {
            status: "completed".to_string(),
            response: Some(outcome.response),
            category: Some(outcome.category),
            error: None,
        },
        TaskState::Failed(error) => TaskStatusReply {
            status: "failed".to_string(),
            response: None,
            category: None,
            error: Some(error),
        },
    };

    Ok(Json(reply))
}

/// POST /v1/notify: relay an operator notification to the alert
/// channel.
pub async fn notify(
    State(state): State<Arc<AppState>>,
    Json(request): Json<NotifyRequest>,
) -> Result<StatusCode, (StatusCode, String)> {
    if request.message.trim().is_empty() {
        return Err((StatusCode::BAD_REQUEST, "message must not be blank".to_string()));
    }

    info!("Relaying operator notification");
    state.escalation.raise_operator_alert(&request.message).await;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /v1/health
pub async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: state.start_time.elapsed().as_secs(),
    })
}

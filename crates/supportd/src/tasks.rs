//! Background task runner for the submit/poll chat surface.
//!
//! Submitting spawns the pipeline run on the runtime and returns a
//! task id immediately. Polling is idempotent: a finished task keeps
//! reporting the same terminal result on every subsequent poll.

use crate::pipeline::{ChatOutcome, ChatPipeline};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{info, warn};
use uuid::Uuid;

/// Lifecycle of one submitted chat task.
#[derive(Debug, Clone)]
pub enum TaskState {
    Pending,
    Completed(ChatOutcome),
    Failed(String),
}

impl TaskState {
    pub fn status_label(&self) -> &'static str {
        match self {
            TaskState::Pending => "pending",
            TaskState::Completed(_) => "completed",
            TaskState::Failed(_) => "failed",
        }
    }
}

#[derive(Default)]
pub struct TaskRunner {
    tasks: Arc<RwLock<HashMap<Uuid, TaskState>>>,
}

impl TaskRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a pipeline run in the background; returns its task id.
    pub async fn submit(
        &self,
        pipeline: Arc<ChatPipeline>,
        user_id: String,
        message: String,
    ) -> Uuid {
        let task_id = Uuid::new_v4();
        self.tasks.write().await.insert(task_id, TaskState::Pending);

        let tasks = Arc::clone(&self.tasks);
        tokio::spawn(async move {
            let state = match pipeline.handle_message(&user_id, &message).await {
                Ok(outcome) => TaskState::Completed(outcome),
                Err(e) => {
                    warn!("Task {} failed: {}", task_id, e);
                    TaskState::Failed(e.to_string())
                }
            };
            tasks.write().await.insert(task_id, state);
        });

        info!("Submitted chat task {}", task_id);
        task_id
    }

    /// Current state of a task, or None for an unknown id. Terminal
    /// states are stable across repeated polls.
    pub async fn poll(&self, task_id: Uuid) -> Option<TaskState> {
        self.tasks.read().await.get(&task_id).cloned()
    }
}

//! The chat pipeline, expressed as an explicit finite-state machine.
//!
//! Stage progression is a pure function of the accumulated state, so
//! the routing topology can be read (and tested) in one place. Stage
//! execution performs the side effects. Every completed run persists
//! exactly one turn and yields exactly one (response, category) pair.

use crate::classifier::QueryClassifier;
use crate::dedup::{self, DuplicateHit};
use crate::escalation::EscalationRouter;
use crate::generator::ResponseGenerator;
use crate::history::HistoryStore;
use crate::knowledge::KnowledgeIndex;
use serde::Serialize;
use std::sync::Arc;
use support_common::{Category, ChatTurn, ConversationWindow, SupportError};
use tracing::{error, info, warn};

// ============================================================================
// States and transitions
// ============================================================================

/// Pipeline stages. `Terminal` is the single accepting state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    DuplicateCheck,
    Classify,
    Retrieve,
    Generate,
    Escalate,
    Terminal,
}

/// Everything a run accumulates while moving through the stages.
#[derive(Debug, Default)]
pub struct PipelineState {
    pub user_id: String,
    pub incoming_message: String,
    /// Recent turns, newest first; sized for both dedup and context.
    pub window: ConversationWindow,
    pub duplicate: Option<DuplicateHit>,
    pub category: Option<Category>,
    pub snippets: Vec<String>,
    pub response: Option<String>,
    /// Set by generation when the escalation router owns the reply.
    pub escalated: bool,
}

impl PipelineState {
    pub fn new(user_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            incoming_message: message.into(),
            ..Default::default()
        }
    }
}

/// The transition function. Pure: no I/O, no clock, no randomness.
pub fn next_stage(stage: Stage, state: &PipelineState) -> Stage {
    match stage {
        Stage::DuplicateCheck => {
            if state.duplicate.is_some() {
                Stage::Terminal
            } else {
                Stage::Classify
            }
        }
        Stage::Classify => {
            if state.category.unwrap_or(Category::General).needs_knowledge() {
                Stage::Retrieve
            } else {
                Stage::Generate
            }
        }
        Stage::Retrieve => Stage::Generate,
        Stage::Generate => {
            if state.escalated {
                Stage::Escalate
            } else {
                Stage::Terminal
            }
        }
        Stage::Escalate => Stage::Terminal,
        Stage::Terminal => Stage::Terminal,
    }
}

// ============================================================================
// The pipeline
// ============================================================================

/// Result of one completed run.
#[derive(Debug, Clone, Serialize)]
pub struct ChatOutcome {
    pub response: String,
    pub category: Category,
}

pub struct ChatPipeline {
    history: Arc<dyn HistoryStore>,
    classifier: QueryClassifier,
    knowledge: Arc<dyn KnowledgeIndex>,
    generator: ResponseGenerator,
    router: Arc<EscalationRouter>,
    context_window: usize,
    dedup_window: usize,
    top_k: usize,
}

impl ChatPipeline {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        history: Arc<dyn HistoryStore>,
        classifier: QueryClassifier,
        knowledge: Arc<dyn KnowledgeIndex>,
        generator: ResponseGenerator,
        router: Arc<EscalationRouter>,
        context_window: usize,
        dedup_window: usize,
        top_k: usize,
    ) -> Self {
        Self {
            history,
            classifier,
            knowledge,
            generator,
            router,
            context_window,
            dedup_window,
            top_k,
        }
    }

    /// Run one message through the pipeline.
    ///
    /// Generation failures propagate (nothing was delivered, nothing is
    /// persisted). Persistence failures do not: the answer was already
    /// produced, so it is returned and the gap is alerted instead.
    pub async fn handle_message(
        &self,
        user_id: &str,
        message: &str,
    ) -> Result<ChatOutcome, SupportError> {
        if user_id.trim().is_empty() {
            return Err(SupportError::BadRequest("user_id must not be blank".to_string()));
        }
        if message.trim().is_empty() {
            return Err(SupportError::BadRequest("message must not be blank".to_string()));
        }

        let mut state = PipelineState::new(user_id, message);
        state.window = self.load_window(user_id).await;

        let mut stage = Stage::DuplicateCheck;
        while stage != Stage::Terminal {
            self.run_stage(stage, &mut state).await?;
            stage = next_stage(stage, &state);
        }

        let category = state.category.unwrap_or(Category::General);
        let response = state.response.take().unwrap_or_default();

        self.persist(&state, &response, category).await;

        info!("Handled {} message for {}", category, state.user_id);
        Ok(ChatOutcome { response, category })
    }

    async fn run_stage(&self, stage: Stage, state: &mut PipelineState) -> Result<(), SupportError> {
        match stage {
            Stage::DuplicateCheck => {
                let hit = dedup::scan(state.window.head(self.dedup_window), &state.incoming_message);
                if let Some(hit) = &hit {
                    state.response = Some(dedup::cached_reply(hit));
                    state.category = Some(Category::Cached);
                }
                state.duplicate = hit;
            }
            Stage::Classify => {
                state.category = Some(self.classifier.classify(&state.incoming_message).await);
            }
            Stage::Retrieve => {
                state.snippets = match self
                    .knowledge
                    .similarity_search(&state.incoming_message, self.top_k)
                    .await
                {
                    Ok(snippets) => snippets,
                    Err(e) => {
                        warn!("Knowledge retrieval failed: {}. Continuing without context.", e);
                        Vec::new()
                    }
                };
            }
            Stage::Generate => {
                let reply = self.generator.generate(state).await?;
                state.escalated = reply.escalated;
                if !reply.escalated {
                    state.response = Some(reply.response);
                }
            }
            Stage::Escalate => {
                let response = match state.category {
                    Some(Category::Escalation) => self.router.escalate_to_human(state).await,
                    _ => self.router.file_billing_ticket(state).await,
                };
                state.response = Some(response);
            }
            Stage::Terminal => {}
        }
        Ok(())
    }

    /// Fetch one window large enough for both the duplicate scan and
    /// the generation context. A failed read degrades to an empty
    /// window rather than failing the request.
    async fn load_window(&self, user_id: &str) -> ConversationWindow {
        let fetch = self.context_window.max(self.dedup_window);
        match self.history.query_recent(user_id, fetch).await {
            Ok(turns) => ConversationWindow::from_newest_first(turns),
            Err(e) => {
                warn!("History read failed for {}: {}. Proceeding without context.", user_id, e);
                ConversationWindow::default()
            }
        }
    }

    /// Persist the completed turn. A write failure is alerted and
    /// logged but never blocks response delivery.
    async fn persist(&self, state: &PipelineState, response: &str, category: Category) {
        let turn = ChatTurn::new(
            state.user_id.clone(),
            state.incoming_message.clone(),
            response,
            Some(category),
        );

        if let Err(e) = self.history.append(&turn).await {
            error!("Failed to persist turn for {}: {}", state.user_id, e);
            self.router
                .raise_operator_alert(&format!(
                    "History write FAILED for user {}: {}. Turn was delivered but not recorded.",
                    state.user_id, e
                ))
                .await;
        }
    }
}

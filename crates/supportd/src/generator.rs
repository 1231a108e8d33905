//! Response generation for the conversational categories.
//!
//! General queries get a full model chat call with history and
//! retrieved knowledge in context. Technical reports get a templated
//! acknowledgement plus a best-effort engineering notification; no
//! model call is made for them. Billing and escalation turns are
//! handled downstream by the escalation router.

use crate::escalation::EscalationRouter;
use crate::llm::GenerativeModel;
use crate::pipeline::PipelineState;
use std::sync::Arc;
use support_common::{prompts, Category, SupportError};
use tracing::warn;

/// Output of the generation stage.
#[derive(Debug, Clone)]
pub struct GeneratedReply {
    pub response: String,
    /// True when the turn still needs the escalation router to produce
    /// or finalize the response.
    pub escalated: bool,
}

pub struct ResponseGenerator {
    model: Arc<dyn GenerativeModel>,
    router: Arc<EscalationRouter>,
}

impl ResponseGenerator {
    pub fn new(model: Arc<dyn GenerativeModel>, router: Arc<EscalationRouter>) -> Self {
        Self { model, router }
    }

    /// Produce the reply for a classified turn. Generation errors
    /// propagate only for the general path, where the model call is
    /// the response; every other path is template-driven.
    pub async fn generate(&self, state: &PipelineState) -> Result<GeneratedReply, SupportError> {
        match state.category.unwrap_or(Category::General) {
            Category::General => self.generate_general(state).await,
            Category::Technical => {
                self.router
                    .notify_engineering(&state.user_id, &state.incoming_message)
                    .await;
                Ok(GeneratedReply {
                    response: prompts::technical_acknowledgement(),
                    escalated: false,
                })
            }
            Category::Billing | Category::Escalation => {
                // Text is produced by the escalation router
                Ok(GeneratedReply { response: String::new(), escalated: true })
            }
            Category::Cached => {
                // Cached turns terminate before generation
                Ok(GeneratedReply {
                    response: state.response.clone().unwrap_or_default(),
                    escalated: false,
                })
            }
        }
    }

    async fn generate_general(&self, state: &PipelineState) -> Result<GeneratedReply, SupportError> {
        let messages =
            prompts::build_chat_context(&state.window, &state.snippets, &state.incoming_message);

        let reply = self.model.chat(&messages).await?;
        let reply = reply.trim().to_string();

        if reply.is_empty() {
            warn!("Model returned an empty reply for user {}", state.user_id);
        }

        Ok(GeneratedReply { response: reply, escalated: false })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::escalation::{AlertChannel, DisabledTickets, TicketSystem};
    use async_trait::async_trait;
    use std::sync::Mutex;
    use support_common::config::CrmConfig;
    use support_common::ChatMessage;

    struct ScriptedModel {
        reply: &'static str,
        chat_calls: Mutex<usize>,
    }

    impl ScriptedModel {
        fn new(reply: &'static str) -> Self {
            Self { reply, chat_calls: Mutex::new(0) }
        }
    }

    #[async_trait]
    impl GenerativeModel for ScriptedModel {
        async fn generate(&self, _prompt: &str) -> Result<String, SupportError> {
            Ok(self.reply.to_string())
        }

        async fn chat(&self, _messages: &[ChatMessage]) -> Result<String, SupportError> {
            *self.chat_calls.lock().unwrap() += 1;
            Ok(self.reply.to_string())
        }
    }

    struct SilentAlerts {
        messages: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl AlertChannel for SilentAlerts {
        async fn notify(&self, text: &str) -> Result<(), SupportError> {
            self.messages.lock().unwrap().push(text.to_string());
            Ok(())
        }
    }

    fn generator(reply: &'static str) -> (ResponseGenerator, Arc<ScriptedModel>, Arc<SilentAlerts>) {
        let model = Arc::new(ScriptedModel::new(reply));
        let alerts = Arc::new(SilentAlerts { messages: Mutex::new(Vec::new()) });
        let tickets: Arc<dyn TicketSystem> = Arc::new(DisabledTickets);
        let router = Arc::new(EscalationRouter::new(
            tickets,
            alerts.clone(),
            &CrmConfig::default(),
        ));
        (ResponseGenerator::new(model.clone(), router), model, alerts)
    }

    fn state(message: &str, category: Category) -> PipelineState {
        let mut state = PipelineState::new("u1", message);
        state.category = Some(category);
        state
    }

    #[tokio::test]
    async fn test_general_uses_the_chat_model() {
        let (generator, model, _alerts) = generator("Here is how you reset it.");
        let reply = generator
            .generate(&state("How do I reset my password?", Category::General))
            .await
            .unwrap();

        assert_eq!(reply.response, "Here is how you reset it.");
        assert!(!reply.escalated);
        assert_eq!(*model.chat_calls.lock().unwrap(), 1);
    }

    #[tokio::test]
    async fn test_technical_is_templated_and_notifies() {
        let (generator, model, alerts) = generator("unused");
        let reply = generator
            .generate(&state("The app crashes on startup", Category::Technical))
            .await
            .unwrap();

        assert_eq!(reply.response, prompts::technical_acknowledgement());
        assert!(!reply.escalated);
        assert_eq!(*model.chat_calls.lock().unwrap(), 0);
        assert!(alerts
            .messages
            .lock()
            .unwrap()
            .iter()
            .any(|m| m.contains("crashes on startup")));
    }

    #[tokio::test]
    async fn test_billing_defers_to_escalation() {
        let (generator, model, _alerts) = generator("unused");
        let reply = generator
            .generate(&state("I want a refund", Category::Billing))
            .await
            .unwrap();

        assert!(reply.escalated);
        assert!(reply.response.is_empty());
        assert_eq!(*model.chat_calls.lock().unwrap(), 0);
    }
}

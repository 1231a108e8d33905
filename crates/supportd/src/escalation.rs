//! Escalation/ticket router and its external collaborators.
//!
//! CRM and alert calls are fire-and-forget from the pipeline's point
//! of view: a failed external call degrades the response text but
//! never aborts response delivery. Failures are surfaced to the
//! operator channel and the error log, not swallowed.

use async_trait::async_trait;
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use support_common::config::{AlertConfig, CrmConfig};
use support_common::{prompts, SupportError};
use tracing::{error, info, warn};

use crate::pipeline::PipelineState;

/// External CRM ticket system collaborator.
#[async_trait]
pub trait TicketSystem: Send + Sync {
    /// Create a support case; returns the opaque case identifier.
    async fn create_ticket(
        &self,
        email: &str,
        subject: &str,
        description: &str,
        contact_channel: &str,
    ) -> Result<String, SupportError>;
}

/// External operator alert channel collaborator.
#[async_trait]
pub trait AlertChannel: Send + Sync {
    async fn notify(&self, text: &str) -> Result<(), SupportError>;
}

// ============================================================================
// Production adapters
// ============================================================================

#[derive(Debug, Deserialize)]
struct TicketResponse {
    ticket_id: String,
}

/// CRM client: JSON POST against the configured ticket endpoint.
pub struct CrmClient {
    http_client: reqwest::Client,
    endpoint: String,
}

impl CrmClient {
    pub fn new(endpoint: String) -> Self {
        Self {
            http_client: reqwest::Client::builder()
                .timeout(Duration::from_secs(10))
                .build()
                .unwrap_or_default(),
            endpoint,
        }
    }
}

#[async_trait]
impl TicketSystem for CrmClient {
    async fn create_ticket(
        &self,
        email: &str,
        subject: &str,
        description: &str,
        contact_channel: &str,
    ) -> Result<String, SupportError> {
        let body = serde_json::json!({
            "email": email,
            "subject": subject,
            "description": description,
            "contact_channel": contact_channel,
            "origin": "chat",
        });

        let response = self
            .http_client
            .post(&self.endpoint)
            .json(&body)
            .send()
            .await
            .map_err(|e| SupportError::External(e.to_string()))?;

        if !response.status().is_success() {
            return Err(SupportError::External(format!(
                "ticket creation failed: {}",
                response.status()
            )));
        }

        let parsed: TicketResponse = response
            .json()
            .await
            .map_err(|e| SupportError::External(e.to_string()))?;

        Ok(parsed.ticket_id)
    }
}

/// CRM disabled by configuration: every filing attempt fails, which
/// the router degrades gracefully.
pub struct DisabledTickets;

#[async_trait]
impl TicketSystem for DisabledTickets {
    async fn create_ticket(
        &self,
        _email: &str,
        _subject: &str,
        _description: &str,
        _contact_channel: &str,
    ) -> Result<String, SupportError> {
        Err(SupportError::External("CRM endpoint not configured".to_string()))
    }
}

/// Chat-webhook alert channel (Slack-shaped payload).
pub struct WebhookAlerts {
    http_client: reqwest::Client,
    webhook_url: String,
}

impl WebhookAlerts {
    pub fn new(webhook_url: String) -> Self {
        Self {
            http_client: reqwest::Client::builder()
                .timeout(Duration::from_secs(10))
                .build()
                .unwrap_or_default(),
            webhook_url,
        }
    }
}

#[async_trait]
impl AlertChannel for WebhookAlerts {
    async fn notify(&self, text: &str) -> Result<(), SupportError> {
        let response = self
            .http_client
            .post(&self.webhook_url)
            .json(&serde_json::json!({ "text": text }))
            .send()
            .await
            .map_err(|e| SupportError::External(e.to_string()))?;

        if !response.status().is_success() {
            return Err(SupportError::External(format!(
                "alert delivery failed: {}",
                response.status()
            )));
        }
        Ok(())
    }
}

/// Alert channel fallback when no webhook is configured: alerts land
/// in the daemon log, which remains operator-visible.
pub struct LogAlerts;

#[async_trait]
impl AlertChannel for LogAlerts {
    async fn notify(&self, text: &str) -> Result<(), SupportError> {
        warn!("[ALERT] {}", text);
        Ok(())
    }
}

// ============================================================================
// Router
// ============================================================================

/// Routes billing and escalation turns to their external side effects
/// and rewrites the response text accordingly.
pub struct EscalationRouter {
    tickets: Arc<dyn TicketSystem>,
    alerts: Arc<dyn AlertChannel>,
    contact_email: String,
    contact_phone: String,
}

impl EscalationRouter {
    pub fn new(
        tickets: Arc<dyn TicketSystem>,
        alerts: Arc<dyn AlertChannel>,
        crm: &CrmConfig,
    ) -> Self {
        Self {
            tickets,
            alerts,
            contact_email: crm.contact_email.clone(),
            contact_phone: crm.contact_phone.clone(),
        }
    }

    /// Build router from configuration, choosing adapters per section.
    pub fn from_config(crm: &CrmConfig, alerts: &AlertConfig) -> Self {
        let tickets: Arc<dyn TicketSystem> = match &crm.endpoint {
            Some(endpoint) => Arc::new(CrmClient::new(endpoint.clone())),
            None => Arc::new(DisabledTickets),
        };
        let alert_channel: Arc<dyn AlertChannel> = match &alerts.webhook_url {
            Some(url) => Arc::new(WebhookAlerts::new(url.clone())),
            None => Arc::new(LogAlerts),
        };
        Self::new(tickets, alert_channel, crm)
    }

    /// Billing handoff: create a CRM case and synthesize the
    /// acknowledgement embedding its identifier. On CRM failure the
    /// acknowledgement degrades and the failure goes to the operator
    /// channel.
    pub async fn file_billing_ticket(&self, state: &PipelineState) -> String {
        let subject = ticket_subject(&state.incoming_message);

        match self
            .tickets
            .create_ticket(
                &self.contact_email,
                &subject,
                &state.incoming_message,
                &self.contact_phone,
            )
            .await
        {
            Ok(ticket_id) => {
                info!("Created billing ticket {} for {}", ticket_id, state.user_id);
                self.raise_operator_alert(&format!(
                    "Billing ticket {} created for user {}",
                    ticket_id, state.user_id
                ))
                .await;
                prompts::billing_acknowledgement(&ticket_id)
            }
            Err(e) => {
                error!("Ticket creation failed for {}: {}", state.user_id, e);
                self.raise_operator_alert(&format!(
                    "Billing ticket creation FAILED for user {}: {}. Message: {}",
                    state.user_id, e, state.incoming_message
                ))
                .await;
                prompts::billing_acknowledgement_unfiled()
            }
        }
    }

    /// Human handoff: notify the alert channel with the triggering
    /// message. The fixed escalation response stands regardless of
    /// delivery outcome.
    pub async fn escalate_to_human(&self, state: &PipelineState) -> String {
        self.raise_operator_alert(&format!(
            "Escalation requested by user {}: {}",
            state.user_id, state.incoming_message
        ))
        .await;
        prompts::escalation_response()
    }

    /// Best-effort engineering-queue notification for technical turns.
    pub async fn notify_engineering(&self, user_id: &str, message: &str) {
        self.raise_operator_alert(&format!(
            "Technical report from user {}: {}",
            user_id, message
        ))
        .await;
    }

    /// Send an operator alert, logging delivery failure instead of
    /// propagating it.
    pub async fn raise_operator_alert(&self, text: &str) {
        if let Err(e) = self.alerts.notify(text).await {
            error!("Operator alert delivery failed: {}", e);
        }
    }
}

/// Derive a short ticket subject from the message head.
fn ticket_subject(message: &str) -> String {
    const MAX_SUBJECT_WORDS: usize = 8;
    let head: Vec<&str> = message.split_whitespace().take(MAX_SUBJECT_WORDS).collect();
    if head.is_empty() {
        "Billing support request".to_string()
    } else {
        format!("Billing: {}", head.join(" "))
    }
}

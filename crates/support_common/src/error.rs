//! Pipeline error taxonomy.
//!
//! The split matters to callers: generation failures are retryable,
//! persistence failures mean the user got an answer that was never
//! recorded, and bad requests are the only outright rejections.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SupportError {
    /// Malformed request (missing user_id/message). The only error
    /// class rejected outright at the API surface.
    #[error("invalid request: {0}")]
    BadRequest(String),

    /// Generative model call failed or timed out. Retryable.
    #[error("generation failed: {0}")]
    Generation(String),

    /// History append failed after the response was produced. The
    /// answer was delivered but never recorded, which threatens
    /// duplicate detection and context continuity.
    #[error("history persistence failed: {0}")]
    Persistence(String),

    /// A collaborator (CRM, alert channel, knowledge index) failed.
    /// Degraded, never fatal to the user-facing response.
    #[error("external service error: {0}")]
    External(String),
}

impl SupportError {
    /// Whether the caller may retry the request as-is.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Generation(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable_classification() {
        assert!(SupportError::Generation("timeout".into()).is_retryable());
        assert!(!SupportError::BadRequest("missing user_id".into()).is_retryable());
        assert!(!SupportError::Persistence("disk full".into()).is_retryable());
    }
}

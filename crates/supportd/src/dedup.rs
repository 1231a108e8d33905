//! Duplicate-query detector.
//!
//! Scans the most recent turns for a question identical to the
//! incoming one (case-insensitive exact match) and short-circuits the
//! pipeline with the prior answer before any model call happens.

use support_common::{prompts, ChatTurn};
use tracing::info;

/// A repeated question found in the recent window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DuplicateHit {
    /// How many times the question already appears in the window
    pub occurrences: usize,
    /// Response of the most recent matching turn
    pub prior_response: String,
}

/// Scan a newest-first window for the incoming message.
///
/// Returns None when the question is fresh; the pipeline then proceeds
/// to classification.
pub fn scan(window: &[ChatTurn], message: &str) -> Option<DuplicateHit> {
    let needle = message.trim().to_lowercase();
    if needle.is_empty() {
        return None;
    }

    let mut occurrences = 0;
    let mut prior_response = None;

    for turn in window {
        if turn.message.trim().to_lowercase() == needle {
            occurrences += 1;
            if prior_response.is_none() {
                prior_response = Some(turn.response.clone());
            }
        }
    }

    let prior_response = prior_response?;
    info!("Duplicate question detected ({} prior occurrences)", occurrences);
    Some(DuplicateHit { occurrences, prior_response })
}

/// Build the cached reply for a duplicate hit: a reminder for a single
/// prior occurrence, an insistent variant reporting the count for two
/// or more.
pub fn cached_reply(hit: &DuplicateHit) -> String {
    if hit.occurrences >= 2 {
        prompts::duplicate_repeat(&hit.prior_response, hit.occurrences)
    } else {
        prompts::duplicate_reminder(&hit.prior_response)
    }
}

//! Canonical query categories for the support pipeline.
//!
//! Defined once and shared by the classifier, the response generator,
//! and the escalation router so no stage carries its own copy of the
//! label set.

use serde::{Deserialize, Serialize};

/// Closed category set driving pipeline routing.
///
/// `Cached` is a pipeline-internal pseudo-category: it is never
/// produced by the classifier, only by the duplicate-query detector
/// when a repeated question short-circuits the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    /// Billing issues: refunds, invoices, charges => CRM ticket
    Billing,
    /// Technical problems => templated ack + engineering queue
    Technical,
    /// Everything else => generative answer with knowledge context
    General,
    /// Explicit request for a human => alert channel handoff
    Escalation,
    /// Duplicate question answered from history, no new classification
    Cached,
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Billing => "billing",
            Self::Technical => "technical",
            Self::General => "general",
            Self::Escalation => "escalation",
            Self::Cached => "cached",
        };
        write!(f, "{}", s)
    }
}

impl Category {
    /// Parse a stored label (round-trip of `Display`, including `cached`).
    pub fn from_label(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "billing" => Some(Self::Billing),
            "technical" => Some(Self::Technical),
            "general" => Some(Self::General),
            "escalation" => Some(Self::Escalation),
            "cached" => Some(Self::Cached),
            _ => None,
        }
    }

    /// Parse a classifier reply. The classifier may never yield
    /// `Cached`; that label is treated as unrecognized here.
    pub fn from_classifier_label(s: &str) -> Option<Self> {
        match Self::from_label(s) {
            Some(Self::Cached) | None => None,
            some => some,
        }
    }

    /// Categories that hand off to the escalation/ticket router.
    pub fn needs_escalation(&self) -> bool {
        matches!(self, Self::Billing | Self::Escalation)
    }

    /// Categories whose response is produced by the generative model
    /// and therefore benefits from retrieved knowledge.
    pub fn needs_knowledge(&self) -> bool {
        matches!(self, Self::General)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_round_trip() {
        for cat in [
            Category::Billing,
            Category::Technical,
            Category::General,
            Category::Escalation,
            Category::Cached,
        ] {
            assert_eq!(Category::from_label(&cat.to_string()), Some(cat));
        }
    }

    #[test]
    fn test_classifier_label_excludes_cached() {
        assert_eq!(Category::from_classifier_label("billing"), Some(Category::Billing));
        assert_eq!(Category::from_classifier_label("BILLING"), Some(Category::Billing));
        assert_eq!(Category::from_classifier_label("cached"), None);
        assert_eq!(Category::from_classifier_label("unsure"), None);
    }

    #[test]
    fn test_routing_predicates() {
        assert!(Category::Billing.needs_escalation());
        assert!(Category::Escalation.needs_escalation());
        assert!(!Category::Technical.needs_escalation());
        assert!(!Category::General.needs_escalation());

        assert!(Category::General.needs_knowledge());
        assert!(!Category::Billing.needs_knowledge());
    }
}

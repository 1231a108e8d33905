//! Prompt building and fixed response templates.
//!
//! All model-facing text and all synthesized (non-generated) replies
//! live here so the pipeline stages stay free of string assembly.

use crate::schemas::ChatMessage;
use crate::turn::ConversationWindow;

/// Fixed system instruction for the general-purpose answer path.
pub const SUPPORT_SYSTEM_PROMPT: &str = "You are a customer support assistant. \
Answer the user's question clearly and concisely using the conversation \
history and any reference articles provided. If you do not know the answer, \
say so and suggest contacting support.";

/// Classification prompt: constrains the model to a single category word.
pub fn classifier_prompt(message: &str) -> String {
    format!(
        "Classify the following customer support message into exactly one \
         category. Reply with a single word, one of: billing, technical, \
         general, escalation. No explanation.\n\nMessage: {}",
        message
    )
}

/// Fold retrieved snippets into a system-style context note.
///
/// Duplicate snippet texts are dropped (first occurrence wins) before
/// entering the generation context. Returns None when nothing remains.
pub fn knowledge_note(snippets: &[String]) -> Option<String> {
    let mut seen: Vec<&str> = Vec::new();
    for snippet in snippets {
        let trimmed = snippet.trim();
        if trimmed.is_empty() || seen.contains(&trimmed) {
            continue;
        }
        seen.push(trimmed);
    }

    if seen.is_empty() {
        return None;
    }

    let mut note = String::from("Relevant support articles:\n");
    for snippet in seen {
        note.push_str("- ");
        note.push_str(snippet);
        note.push('\n');
    }
    Some(note)
}

/// Assemble the role-tagged generation context: system instruction,
/// prior conversation oldest-first, optional knowledge note, then the
/// new user message.
pub fn build_chat_context(
    window: &ConversationWindow,
    snippets: &[String],
    message: &str,
) -> Vec<ChatMessage> {
    let mut messages = vec![ChatMessage::system(SUPPORT_SYSTEM_PROMPT)];

    for turn in window.chronological() {
        messages.push(ChatMessage::user(turn.message.clone()));
        messages.push(ChatMessage::assistant(turn.response.clone()));
    }

    if let Some(note) = knowledge_note(snippets) {
        messages.push(ChatMessage::system(note));
    }

    messages.push(ChatMessage::user(message));
    messages
}

// ============================================================================
// Fixed response templates
// ============================================================================

/// Cached reply for a question seen exactly once before.
pub fn duplicate_reminder(prior_response: &str) -> String {
    format!(
        "It looks like you've asked this question before. Here is the answer \
         again:\n\n{}",
        prior_response
    )
}

/// Cached reply for a question seen two or more times before.
pub fn duplicate_repeat(prior_response: &str, occurrences: usize) -> String {
    format!(
        "You've asked this question {} times already. The answer has not \
         changed:\n\n{}",
        occurrences, prior_response
    )
}

/// Billing acknowledgement referencing the created CRM case.
pub fn billing_acknowledgement(ticket_id: &str) -> String {
    format!(
        "Thanks for reaching out. I've opened a billing support ticket for \
         you (reference: {}). Our billing team will follow up shortly.",
        ticket_id
    )
}

/// Billing acknowledgement when the CRM call failed. The ticket is
/// raised manually by an operator; the user still gets an answer.
pub fn billing_acknowledgement_unfiled() -> String {
    "Thanks for reaching out. Your billing request has been passed to our \
     billing team, who will follow up shortly."
        .to_string()
}

/// Technical acknowledgement: templated, queued to engineering.
pub fn technical_acknowledgement() -> String {
    "Thanks for the report. I've forwarded the details to our engineering \
     team, who will investigate and get back to you."
        .to_string()
}

/// Fixed human-handoff response for explicit escalations.
pub fn escalation_response() -> String {
    "I'm escalating this conversation to a human support agent. Someone \
     will be with you shortly."
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::category::Category;
    use crate::schemas::Role;
    use crate::turn::{ChatTurn, ConversationWindow};

    #[test]
    fn test_knowledge_note_deduplicates_preserving_order() {
        let snippets = vec!["A".to_string(), "A".to_string(), "B".to_string()];
        let note = knowledge_note(&snippets).unwrap();
        assert_eq!(note.matches("- A").count(), 1);
        assert_eq!(note.matches("- B").count(), 1);
        assert!(note.find("- A").unwrap() < note.find("- B").unwrap());
    }

    #[test]
    fn test_knowledge_note_empty_for_no_snippets() {
        assert!(knowledge_note(&[]).is_none());
        assert!(knowledge_note(&["  ".to_string()]).is_none());
    }

    #[test]
    fn test_chat_context_shape() {
        let window = ConversationWindow::from_newest_first(vec![ChatTurn::new(
            "u1",
            "old question",
            "old answer",
            Some(Category::General),
        )]);
        let snippets = vec!["How to reset a password".to_string()];

        let context = build_chat_context(&window, &snippets, "new question");

        assert_eq!(context[0].role, Role::System);
        assert_eq!(context[0].content, SUPPORT_SYSTEM_PROMPT);
        assert_eq!(context[1].content, "old question");
        assert_eq!(context[2].content, "old answer");
        assert_eq!(context[3].role, Role::System);
        assert!(context[3].content.contains("How to reset a password"));
        let last = context.last().unwrap();
        assert_eq!(last.role, Role::User);
        assert_eq!(last.content, "new question");
    }

    #[test]
    fn test_chat_context_without_knowledge() {
        let window = ConversationWindow::default();
        let context = build_chat_context(&window, &[], "hello");
        // System instruction + user message only
        assert_eq!(context.len(), 2);
    }

    #[test]
    fn test_duplicate_templates_embed_prior_answer() {
        let reminder = duplicate_reminder("prior answer");
        assert!(reminder.contains("you've asked this question before"));
        assert!(reminder.contains("prior answer"));

        let repeat = duplicate_repeat("prior answer", 3);
        assert!(repeat.contains("3 times"));
        assert!(repeat.contains("prior answer"));
    }

    #[test]
    fn test_classifier_prompt_lists_all_labels() {
        let prompt = classifier_prompt("help");
        for label in ["billing", "technical", "general", "escalation"] {
            assert!(prompt.contains(label));
        }
        assert!(!prompt.contains("cached"));
    }
}

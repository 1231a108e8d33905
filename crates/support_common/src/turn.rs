//! Chat turns and the per-request conversation window.

use crate::category::Category;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One completed exchange: user message plus system response.
///
/// Created once per pipeline run, immutable after persistence.
/// Retention is the history store's concern, never the pipeline's.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatTurn {
    /// Opaque user identifier
    pub user_id: String,
    /// Raw inbound message text
    pub message: String,
    /// Response delivered to the user
    pub response: String,
    /// Category assigned by the pipeline (None for legacy rows)
    pub category: Option<Category>,
    /// Wall-clock timestamp, used for ordering within a conversation
    pub timestamp: DateTime<Utc>,
}

impl ChatTurn {
    /// Create a turn stamped with the current time.
    pub fn new(
        user_id: impl Into<String>,
        message: impl Into<String>,
        response: impl Into<String>,
        category: Option<Category>,
    ) -> Self {
        Self {
            user_id: user_id.into(),
            message: message.into(),
            response: response.into(),
            category,
            timestamp: Utc::now(),
        }
    }
}

/// Read-time projection of a user's most recent turns, newest first.
///
/// Not a persisted entity: rebuilt from the history store on every
/// request. Holds at most the limit it was queried with.
#[derive(Debug, Clone, Default)]
pub struct ConversationWindow {
    turns: Vec<ChatTurn>,
}

impl ConversationWindow {
    /// Wrap turns already ordered newest first (the history store's
    /// query order).
    pub fn from_newest_first(turns: Vec<ChatTurn>) -> Self {
        Self { turns }
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    /// Newest-first iteration (duplicate scanning order).
    pub fn newest_first(&self) -> impl Iterator<Item = &ChatTurn> {
        self.turns.iter()
    }

    /// Oldest-first iteration (prompt rendering order).
    pub fn chronological(&self) -> impl Iterator<Item = &ChatTurn> {
        self.turns.iter().rev()
    }

    /// The newest-first slice capped to `limit` turns.
    pub fn head(&self, limit: usize) -> &[ChatTurn] {
        &self.turns[..self.turns.len().min(limit)]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn turn(msg: &str) -> ChatTurn {
        ChatTurn::new("u1", msg, "resp", Some(Category::General))
    }

    #[test]
    fn test_window_orderings() {
        let window =
            ConversationWindow::from_newest_first(vec![turn("third"), turn("second"), turn("first")]);

        let newest: Vec<_> = window.newest_first().map(|t| t.message.as_str()).collect();
        assert_eq!(newest, vec!["third", "second", "first"]);

        let chrono: Vec<_> = window.chronological().map(|t| t.message.as_str()).collect();
        assert_eq!(chrono, vec!["first", "second", "third"]);
    }

    #[test]
    fn test_head_caps_at_window_size() {
        let window = ConversationWindow::from_newest_first(vec![turn("a"), turn("b")]);
        assert_eq!(window.head(5).len(), 2);
        assert_eq!(window.head(1).len(), 1);
        assert_eq!(window.head(1)[0].message, "a");
    }
}

//! Knowledge retrieval: top-K relevant snippets for a message.
//!
//! Retrieval is augmentative. An unavailable index or an empty result
//! set is never an error; generation simply proceeds without
//! reference material.

use async_trait::async_trait;
use std::path::Path;
use support_common::SupportError;
use tracing::debug;

/// External knowledge index collaborator.
#[async_trait]
pub trait KnowledgeIndex: Send + Sync {
    /// Return up to `k` snippets ordered by relevance, best first.
    async fn similarity_search(&self, query: &str, k: usize)
        -> Result<Vec<String>, SupportError>;
}

/// Deterministic in-process index scoring snippets by keyword overlap
/// with the query. Stands in for an external vector index behind the
/// same contract.
pub struct KeywordIndex {
    snippets: Vec<String>,
}

impl KeywordIndex {
    pub fn new(snippets: Vec<String>) -> Self {
        Self { snippets }
    }

    /// Load snippets from a seed file: one snippet per line, blank
    /// lines and `#` comments skipped.
    pub fn from_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let snippets = contents
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with('#'))
            .map(String::from)
            .collect();
        Ok(Self::new(snippets))
    }

    /// Built-in support FAQ seed, used when no snippets file is
    /// configured.
    pub fn with_default_seed() -> Self {
        Self::new(vec![
            "To reset your password, click 'Forgot Password' on the login page \
             and follow the instructions."
                .to_string(),
            "Refunds are processed within 5-7 business days. Contact support if \
             you don't receive it."
                .to_string(),
            "If you're experiencing login issues, try clearing your cache and \
             cookies."
                .to_string(),
        ])
    }

    fn score(snippet: &str, query_terms: &[String]) -> usize {
        let snippet_lower = snippet.to_lowercase();
        query_terms
            .iter()
            .filter(|term| snippet_lower.contains(term.as_str()))
            .count()
    }
}

#[async_trait]
impl KnowledgeIndex for KeywordIndex {
    async fn similarity_search(
        &self,
        query: &str,
        k: usize,
    ) -> Result<Vec<String>, SupportError> {
        let query_terms: Vec<String> = query
            .to_lowercase()
            .split(|c: char| !c.is_ascii_alphanumeric())
            .filter(|term| term.len() >= 3)
            .map(String::from)
            .collect();

        if query_terms.is_empty() {
            return Ok(Vec::new());
        }

        let mut scored: Vec<(usize, &String)> = self
            .snippets
            .iter()
            .map(|snippet| (Self::score(snippet, &query_terms), snippet))
            .filter(|(score, _)| *score > 0)
            .collect();

        // Stable sort keeps seed order among equal scores
        scored.sort_by(|a, b| b.0.cmp(&a.0));

        let hits: Vec<String> = scored.into_iter().take(k).map(|(_, s)| s.clone()).collect();
        debug!("Knowledge retrieval: {} hits for {:?}", hits.len(), query);
        Ok(hits)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[tokio::test]
    async fn test_search_ranks_by_overlap() {
        let index = KeywordIndex::new(vec![
            "Refunds are processed within 5-7 business days.".to_string(),
            "Password resets happen on the login page.".to_string(),
            "Refund requests for invoices need the invoice number.".to_string(),
        ]);

        let hits = index
            .similarity_search("I want a refund for my last invoice", 3)
            .await
            .unwrap();

        assert_eq!(hits.len(), 2);
        // Both "refund" and "invoice" match the second snippet
        assert!(hits[0].contains("invoice number"));
    }

    #[tokio::test]
    async fn test_search_caps_at_k() {
        let index = KeywordIndex::with_default_seed();
        let hits = index.similarity_search("password login refund", 1).await.unwrap();
        assert_eq!(hits.len(), 1);
    }

    #[tokio::test]
    async fn test_no_match_is_empty_not_error() {
        let index = KeywordIndex::with_default_seed();
        let hits = index.similarity_search("zzz qqq", 3).await.unwrap();
        assert!(hits.is_empty());
    }

    #[tokio::test]
    async fn test_short_terms_are_ignored() {
        let index = KeywordIndex::with_default_seed();
        let hits = index.similarity_search("a to if", 3).await.unwrap();
        assert!(hits.is_empty());
    }

    #[test]
    fn test_from_file_skips_comments_and_blanks() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "# support snippets").unwrap();
        writeln!(file).unwrap();
        writeln!(file, "First snippet here.").unwrap();
        writeln!(file, "Second snippet here.").unwrap();

        let index = KeywordIndex::from_file(file.path()).unwrap();
        assert_eq!(index.snippets.len(), 2);
    }
}

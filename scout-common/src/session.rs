//! Per-conversation state shared between agents.
//!
//! A [`Session`] is created once per conversation and handed to every tool
//! call by mutable reference. The extractor writes full page text under
//! [`extracted_content_key`]; the summarizer reads it back by URL.
//! Writes are last-writer-wins and nothing expires.

use std::collections::HashMap;
use uuid::Uuid;

/// Key prefix for extracted page bodies.
pub const EXTRACTED_CONTENT_PREFIX: &str = "extracted_content_";

/// Session key under which the full text extracted from `url` is stored.
///
/// ```
/// use scout_common::session::extracted_content_key;
///
/// assert_eq!(
///     extracted_content_key("https://example.com/a"),
///     "extracted_content_https://example.com/a"
/// );
/// ```
pub fn extracted_content_key(url: &str) -> String {
    format!("{EXTRACTED_CONTENT_PREFIX}{url}")
}

#[derive(Debug, Clone)]
pub struct Session {
    id: Uuid,
    state: HashMap<String, String>,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            state: HashMap::new(),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.state.get(key).map(String::as_str)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.state.contains_key(key)
    }

    /// Insert a raw value, returning the previous one if any.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) -> Option<String> {
        self.state.insert(key.into(), value.into())
    }

    /// Persist the full extracted text for `url`, replacing any earlier extraction.
    pub fn store_extracted(&mut self, url: &str, content: impl Into<String>) {
        let key = extracted_content_key(url);
        let replaced = self.state.insert(key, content.into()).is_some();
        tracing::debug!(session = %self.id, %url, replaced, "session.extracted.stored");
    }

    /// Full text previously extracted from `url`.
    pub fn extracted(&self, url: &str) -> Option<&str> {
        self.get(&extracted_content_key(url))
    }

    /// URLs with extracted content, in no particular order.
    pub fn extracted_urls(&self) -> impl Iterator<Item = &str> {
        self.state
            .keys()
            .filter_map(|k| k.strip_prefix(EXTRACTED_CONTENT_PREFIX))
    }

    pub fn len(&self) -> usize {
        self.state.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state.is_empty()
    }

    pub fn clear(&mut self) {
        self.state.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn last_writer_wins() {
        let mut session = Session::new();
        session.store_extracted("https://a.example", "first");
        session.store_extracted("https://a.example", "second");
        assert_eq!(session.extracted("https://a.example"), Some("second"));
        assert_eq!(session.len(), 1);
    }

    #[test]
    fn lookups_are_keyed_by_exact_url() {
        let mut session = Session::new();
        session.store_extracted("https://a.example/page", "body");
        assert!(session.extracted("https://a.example/page/").is_none());
        assert!(session.contains_key("extracted_content_https://a.example/page"));
    }

    #[test]
    fn extracted_urls_skips_unrelated_keys() {
        let mut session = Session::new();
        session.insert("user_pref", "dark");
        session.store_extracted("https://b.example", "x");
        let urls: Vec<&str> = session.extracted_urls().collect();
        assert_eq!(urls, vec!["https://b.example"]);
    }

    #[test]
    fn sessions_get_distinct_ids() {
        assert_ne!(Session::new().id(), Session::default().id());
    }
}

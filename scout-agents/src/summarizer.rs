//! Word-count truncation "summaries".
//!
//! The output is always the first N whitespace-separated words of the source
//! joined by single spaces, followed by `...`, even when nothing was cut.

use scout_common::session::Session;
use scout_common::{Result, ScoutError};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Requested summary size.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LengthTier {
    Short,
    #[default]
    Medium,
    Long,
}

impl LengthTier {
    /// Words kept for this tier.
    pub fn word_limit(&self) -> usize {
        match self {
            LengthTier::Short => 100,
            LengthTier::Medium => 300,
            LengthTier::Long => 600,
        }
    }

    /// Lenient parse: anything that is not `short` or `medium` means long.
    pub fn parse_lenient(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "short" => LengthTier::Short,
            "medium" => LengthTier::Medium,
            _ => LengthTier::Long,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            LengthTier::Short => "short",
            LengthTier::Medium => "medium",
            LengthTier::Long => "long",
        }
    }
}

impl fmt::Display for LengthTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What to summarize. `url` wins over `content` when both are set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SummaryRequest {
    pub content: Option<String>,
    pub url: Option<String>,
    pub length: LengthTier,
}

impl SummaryRequest {
    pub fn text(content: impl Into<String>, length: LengthTier) -> Self {
        Self {
            content: Some(content.into()),
            url: None,
            length,
        }
    }

    pub fn url(url: impl Into<String>, length: LengthTier) -> Self {
        Self {
            content: None,
            url: Some(url.into()),
            length,
        }
    }
}

/// Summarize inline text or text previously extracted into `session`.
pub fn summarize(request: &SummaryRequest, session: &Session) -> Result<String> {
    let source = match request.url.as_deref() {
        Some(url) => session.extracted(url).ok_or_else(|| {
            ScoutError::State(format!(
                "No content found for URL {url}. Please extract it first."
            ))
        })?,
        None => request.content.as_deref().unwrap_or_default(),
    };
    if source.is_empty() {
        return Err(ScoutError::Validation(
            "No content provided for summarization.".to_string(),
        ));
    }

    let limit = request.length.word_limit();
    let words: Vec<&str> = source.split_whitespace().take(limit).collect();
    tracing::debug!(
        tier = %request.length,
        words = words.len(),
        from_session = request.url.is_some(),
        "summarize.done"
    );
    Ok(format!("{}...", words.join(" ")))
}

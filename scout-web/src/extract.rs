use async_trait::async_trait;
use scout_common::session::Session;
use scout_common::{FailedAttempt, Result, ScoutError};
use scout_config::ExtractorConfig;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;

use crate::fallback::FallbackFetcher;

/// Placeholder some renderers report for pages without a `<title>`.
const NO_TITLE_PLACEHOLDER: &str = "No title found";
const PRIMARY_DEFAULT_TITLE: &str = "Extracted Content";

/// Which fetcher produced an extraction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExtractionMethod {
    Primary,
    Fallback,
}

impl ExtractionMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExtractionMethod::Primary => "primary",
            ExtractionMethod::Fallback => "fallback",
        }
    }

    fn status_label(&self) -> &'static str {
        match self {
            ExtractionMethod::Primary => "the primary browser fetcher",
            ExtractionMethod::Fallback => "fallback method",
        }
    }
}

impl fmt::Display for ExtractionMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raw output of one fetcher. `title` is whatever the page reported.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchedPage {
    pub title: Option<String>,
    pub content: String,
}

/// One link in the extraction chain.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    fn method(&self) -> ExtractionMethod;

    async fn fetch(&self, url: &str) -> Result<FetchedPage>;
}

/// What the caller sees after a successful extraction. The full text lives in
/// the session; only a preview travels with the result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractionResult {
    pub title: String,
    pub url: String,
    pub content_preview: String,
    pub status: String,
    pub method: ExtractionMethod,
}

/// Ordered fetcher chain. The first fetcher to succeed wins; failures of all
/// but the last are logged and skipped.
pub struct ContentExtractor {
    fetchers: Vec<Arc<dyn PageFetcher>>,
    timeout: Duration,
    preview_chars: usize,
}

impl ContentExtractor {
    pub fn new(fetchers: Vec<Arc<dyn PageFetcher>>, timeout: Duration) -> Result<Self> {
        if fetchers.is_empty() {
            return Err(ScoutError::Config(
                "extraction chain needs at least one fetcher".to_string(),
            ));
        }
        Ok(Self {
            fetchers,
            timeout,
            preview_chars: 500,
        })
    }

    pub fn with_preview_chars(mut self, preview_chars: usize) -> Self {
        self.preview_chars = preview_chars;
        self
    }

    /// Default chain for `cfg`: the browser fetcher (when compiled in and
    /// enabled), then the HTTP fallback.
    pub fn from_config(cfg: &ExtractorConfig) -> Result<Self> {
        let mut fetchers: Vec<Arc<dyn PageFetcher>> = Vec::new();

        #[cfg(feature = "browser")]
        if cfg.browser.enabled {
            fetchers.push(Arc::new(crate::browser::BrowserFetcher::from_config(
                &cfg.browser,
            )));
        }
        #[cfg(not(feature = "browser"))]
        if cfg.browser.enabled {
            tracing::debug!("extract.primary.not_compiled");
        }

        fetchers.push(Arc::new(FallbackFetcher::new(
            &cfg.user_agent,
            Duration::from_secs(cfg.timeout_secs),
        )?));

        Ok(Self::new(fetchers, Duration::from_secs(cfg.timeout_secs))?
            .with_preview_chars(cfg.preview_chars))
    }

    pub fn methods(&self) -> Vec<ExtractionMethod> {
        self.fetchers.iter().map(|f| f.method()).collect()
    }

    /// Extract `url` and store the full text in `session`.
    ///
    /// Nothing is written to the session unless a fetcher succeeds.
    pub async fn extract(&self, url: &str, session: &mut Session) -> Result<ExtractionResult> {
        if url.trim().is_empty() {
            return Err(ScoutError::Validation("URL cannot be empty".to_string()));
        }

        let Some((last, rest)) = self.fetchers.split_last() else {
            return Err(ScoutError::Config("extraction chain is empty".to_string()));
        };

        let mut attempts = Vec::new();
        for fetcher in rest {
            let method = fetcher.method();
            match self.attempt(fetcher.as_ref(), url).await {
                Ok(page) => return Ok(self.finish(url, method, page, attempts.len(), session)),
                Err(err) => {
                    tracing::warn!(%url, %method, error = %err, "extract.fetcher.failed");
                    attempts.push(FailedAttempt {
                        method: method.to_string(),
                        reason: err.to_string(),
                    });
                }
            }
        }

        let method = last.method();
        match self.attempt(last.as_ref(), url).await {
            Ok(page) => Ok(self.finish(url, method, page, attempts.len(), session)),
            Err(err) => {
                tracing::warn!(%url, %method, error = %err, "extract.failed");
                Err(ScoutError::ExtractionFailed {
                    cause: err.to_string(),
                    attempts,
                })
            }
        }
    }

    async fn attempt(&self, fetcher: &dyn PageFetcher, url: &str) -> Result<FetchedPage> {
        tracing::debug!(%url, method = %fetcher.method(), "extract.attempt");
        match timeout(self.timeout, fetcher.fetch(url)).await {
            Ok(result) => result,
            Err(_) => Err(ScoutError::Timeout(self.timeout)),
        }
    }

    fn finish(
        &self,
        url: &str,
        method: ExtractionMethod,
        page: FetchedPage,
        skipped: usize,
        session: &mut Session,
    ) -> ExtractionResult {
        tracing::info!(%url, %method, skipped, "extract.success");
        let title = resolve_title(method, page.title.as_deref(), url);
        let content_preview = preview(&page.content, self.preview_chars);
        session.store_extracted(url, page.content);

        ExtractionResult {
            title,
            url: url.to_string(),
            content_preview,
            status: format!(
                "Content extracted successfully using {}",
                method.status_label()
            ),
            method,
        }
    }
}

/// Last `/`-separated segment of `url`, verbatim.
pub fn last_segment(url: &str) -> &str {
    url.rsplit('/').next().unwrap_or_default()
}

/// Title shown for an extraction: the page title when it is real, else the
/// URL's last segment. The primary fetcher never yields an empty title.
pub fn resolve_title(method: ExtractionMethod, page_title: Option<&str>, url: &str) -> String {
    let page_title = page_title
        .map(str::trim)
        .filter(|t| !t.is_empty() && *t != NO_TITLE_PLACEHOLDER);
    if let Some(title) = page_title {
        return title.to_string();
    }

    let segment = last_segment(url);
    match method {
        ExtractionMethod::Primary if segment.is_empty() => PRIMARY_DEFAULT_TITLE.to_string(),
        _ => segment.to_string(),
    }
}

/// First `max_chars` characters, with `...` only when something was cut.
pub fn preview(content: &str, max_chars: usize) -> String {
    match content.char_indices().nth(max_chars) {
        Some((cut, _)) => format!("{}...", &content[..cut]),
        None => content.to_string(),
    }
}

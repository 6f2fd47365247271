//! Plain HTTP fetch plus heuristic main-content extraction.
//!
//! The page is fetched with a desktop-browser User-Agent and parsed with
//! `scraper`. Text inside `script`/`style` elements is skipped, the first
//! matching content region wins and the text is whitespace-normalised.

use async_trait::async_trait;
use scout_common::{Result, ScoutError};
use scout_http::{HttpClient, HttpError, RequestOpts};
use scraper::{ElementRef, Html, Node, Selector};
use std::time::Duration;

use crate::extract::{ExtractionMethod, FetchedPage, PageFetcher};

/// Content regions, most specific first. `body` is the last resort.
pub const CONTENT_SELECTORS: &[&str] = &[
    "article",
    "main",
    "[role=\"main\"]",
    ".content",
    "#content",
    ".post-content",
    ".entry-content",
    ".article-content",
    ".main-content",
    "#main_article",
];

const SKIPPED_ELEMENTS: &[&str] = &["script", "style"];

const HTML_MEDIA_TYPES: &[&str] = &["text/html", "application/xhtml+xml"];

/// Requests go to absolute URLs only, so the base never resolves anything.
const DETACHED_BASE: &str = "about:blank";

pub struct FallbackFetcher {
    http: HttpClient,
    timeout: Duration,
}

impl FallbackFetcher {
    pub fn new(user_agent: &str, timeout: Duration) -> Result<Self> {
        let http = HttpClient::new(DETACHED_BASE)
            .and_then(|c| c.with_user_agent(user_agent))
            .map_err(|e| ScoutError::Config(format!("fallback HTTP client: {e}")))?
            .with_timeout(timeout)
            .with_retries(0);
        Ok(Self { http, timeout })
    }
}

#[async_trait]
impl PageFetcher for FallbackFetcher {
    fn method(&self) -> ExtractionMethod {
        ExtractionMethod::Fallback
    }

    async fn fetch(&self, url: &str) -> Result<FetchedPage> {
        let opts = RequestOpts {
            timeout: Some(self.timeout),
            retries: Some(0),
            allow_absolute: true,
            ..Default::default()
        };
        let response = self.http.get_text(url, opts).await.map_err(fetch_error)?;
        tracing::debug!(
            %url,
            status = %response.status,
            bytes = response.body.len(),
            "extract.fallback.fetched"
        );
        if let Some(content_type) = response.content_type.as_deref() {
            if !is_html(content_type) {
                return Err(ScoutError::Parse(format!(
                    "expected an HTML page, got {content_type}"
                )));
            }
        }
        parse_page(&response.body)
    }
}

/// Whether a `Content-Type` header names an HTML document. Parameters such as
/// `charset` are ignored.
pub fn is_html(content_type: &str) -> bool {
    let media_type = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    HTML_MEDIA_TYPES.contains(&media_type.as_str())
}

fn fetch_error(e: HttpError) -> ScoutError {
    match e {
        HttpError::Url(msg) => ScoutError::Fetch(format!("invalid URL: {msg}")),
        other => ScoutError::Fetch(other.to_string()),
    }
}

/// Title and normalised main-content text of an HTML document.
///
/// The parser always synthesises a `body`, so a region whose visible text
/// normalises to nothing counts as no main content.
pub fn parse_page(html: &str) -> Result<FetchedPage> {
    let document = Html::parse_document(html);
    let content = main_region(&document)
        .map(|region| normalize_text(&visible_text(region)))
        .filter(|text| !text.is_empty())
        .ok_or_else(|| ScoutError::Parse("Could not find main content".to_string()))?;

    Ok(FetchedPage {
        title: page_title(&document),
        content,
    })
}

fn select_first<'a>(document: &'a Html, css: &str) -> Option<ElementRef<'a>> {
    let selector = Selector::parse(css).ok()?;
    document.select(&selector).next()
}

fn main_region(document: &Html) -> Option<ElementRef<'_>> {
    CONTENT_SELECTORS
        .iter()
        .find_map(|css| select_first(document, css))
        .or_else(|| select_first(document, "body"))
}

fn page_title(document: &Html) -> Option<String> {
    select_first(document, "title").map(|el| el.text().collect::<String>().trim().to_string())
}

/// Concatenated text nodes under `region`, minus anything inside a skipped
/// element.
fn visible_text(region: ElementRef<'_>) -> String {
    let mut out = String::new();
    for node in region.descendants() {
        let Node::Text(text) = node.value() else {
            continue;
        };
        let hidden = node.ancestors().any(|a| {
            a.value()
                .as_element()
                .is_some_and(|el| SKIPPED_ELEMENTS.contains(&el.name()))
        });
        if !hidden {
            out.push_str(text);
        }
    }
    out
}

/// Trim every line, split lines on double spaces, drop empty fragments and
/// join what remains with single spaces.
pub fn normalize_text(text: &str) -> String {
    text.lines()
        .map(str::trim)
        .flat_map(|line| line.split("  "))
        .map(str::trim)
        .filter(|chunk| !chunk.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

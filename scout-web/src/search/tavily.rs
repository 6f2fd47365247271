use scout_common::{Result, ScoutError};
use scout_config::SearchConfig;
use scout_http::{HttpClient, HttpError};
use std::time::Instant;

use super::types::{SearchRequest, SearchResponse};

const QUERY_LOG_CHARS: usize = 160;

/// Minimal client for the Tavily search API.
#[derive(Clone)]
pub struct TavilyClient {
    http: HttpClient,
    api_key: String,
    config: SearchConfig,
}

impl std::fmt::Debug for TavilyClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TavilyClient")
            .field("endpoint", &self.http.base().as_str())
            .field("max_results", &self.config.max_results)
            .finish_non_exhaustive()
    }
}

impl TavilyClient {
    /// Fails with [`ScoutError::Config`] when no API key is configured or set
    /// in `TAVILY_API_KEY`.
    pub fn new(config: &SearchConfig) -> Result<Self> {
        let api_key = config.resolved_api_key().ok_or_else(|| {
            ScoutError::Config(
                "Tavily API key missing; set search.api_key or TAVILY_API_KEY".to_string(),
            )
        })?;
        let http = HttpClient::new(&config.endpoint)
            .map_err(|e| ScoutError::Config(format!("Tavily endpoint: {e}")))?;
        Ok(Self {
            http,
            api_key,
            config: config.clone(),
        })
    }

    pub async fn search(&self, query: &str) -> Result<SearchResponse> {
        let query = query.trim();
        if query.is_empty() {
            return Err(ScoutError::Validation(
                "Search query cannot be empty".to_string(),
            ));
        }

        let query_snippet: String = query.chars().take(QUERY_LOG_CHARS).collect();
        let started = Instant::now();
        tracing::info!(target: "web.tavily", query = %query_snippet, "search.tavily.start");

        let request = SearchRequest {
            query,
            max_results: self.config.max_results,
            search_depth: self.config.search_depth.as_str(),
            include_answer: self.config.include_answer,
            include_raw_content: self.config.include_raw_content,
            include_images: self.config.include_images,
        };
        let response: SearchResponse = self
            .http
            .post_json("search", Some(&self.api_key), &request)
            .await
            .map_err(|e| {
                tracing::warn!(
                    target: "web.tavily",
                    query = %query_snippet,
                    error = %e,
                    "search.tavily.failed"
                );
                search_error(e)
            })?;

        tracing::info!(
            target: "web.tavily",
            query = %query_snippet,
            results = response.results.len(),
            has_answer = response.direct_answer().is_some(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "search.tavily.success"
        );
        Ok(response)
    }
}

fn search_error(e: HttpError) -> ScoutError {
    match e {
        HttpError::Timeout(d) => ScoutError::Timeout(d),
        other => ScoutError::Agent(format!("Tavily search failed: {other}")),
    }
}

use serde::{Deserialize, Serialize};

/// Body of `POST /search`.
#[derive(Debug, Clone, Serialize)]
pub struct SearchRequest<'a> {
    pub query: &'a str,
    pub max_results: u32,
    pub search_depth: &'static str,
    pub include_answer: bool,
    pub include_raw_content: bool,
    pub include_images: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchResponse {
    #[serde(default)]
    pub query: String,
    #[serde(default)]
    pub answer: Option<String>,
    #[serde(default)]
    pub results: Vec<SearchHit>,
    #[serde(default)]
    pub response_time: Option<f64>,
}

impl SearchResponse {
    /// The direct answer, if the API produced a non-blank one.
    pub fn direct_answer(&self) -> Option<&str> {
        self.answer
            .as_deref()
            .map(str::trim)
            .filter(|a| !a.is_empty())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SearchHit {
    #[serde(default)]
    pub title: String,
    pub url: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub score: Option<f64>,
    #[serde(default)]
    pub raw_content: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn decodes_sparse_payloads() {
        let resp: SearchResponse = serde_json::from_value(json!({
            "query": "rust",
            "answer": null,
            "results": [{ "url": "https://www.rust-lang.org", "raw_content": null }]
        }))
        .unwrap();
        assert!(resp.direct_answer().is_none());
        assert_eq!(resp.results[0].title, "");
        assert!(resp.results[0].score.is_none());
    }

    #[test]
    fn blank_answers_are_ignored() {
        let resp = SearchResponse {
            answer: Some("   ".into()),
            ..Default::default()
        };
        assert!(resp.direct_answer().is_none());
    }
}

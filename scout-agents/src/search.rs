use scout_common::Result;
use scout_config::SearchConfig;
use scout_web::search::{SearchResponse, TavilyClient};
use std::fmt::Write as _;

const SNIPPET_CHARS: usize = 200;

/// Web research specialist: one Tavily call, formatted for a reader.
#[derive(Debug, Clone)]
pub struct SearchAgent {
    client: TavilyClient,
}

impl SearchAgent {
    /// Fails with a configuration error when no Tavily key is available.
    pub fn new(config: &SearchConfig) -> Result<Self> {
        Ok(Self {
            client: TavilyClient::new(config)?,
        })
    }

    pub async fn run(&self, query: &str) -> Result<String> {
        let response = self.client.search(query).await?;
        Ok(format_results(query.trim(), &response))
    }
}

/// Direct answer first, then numbered results with title, link and a short
/// preview of the snippet.
pub fn format_results(query: &str, response: &SearchResponse) -> String {
    let mut out = String::new();

    if let Some(answer) = response.direct_answer() {
        let _ = writeln!(out, "Answer: {answer}\n");
    }

    if response.results.is_empty() {
        let _ = write!(
            out,
            "No results found for \"{query}\". Try refining the query with more specific keywords."
        );
        return out;
    }

    let _ = writeln!(out, "Search results for \"{query}\":");
    for (i, hit) in response.results.iter().enumerate() {
        let title = if hit.title.trim().is_empty() {
            hit.url.as_str()
        } else {
            hit.title.trim()
        };
        let _ = writeln!(out, "\n{}. {}", i + 1, title);
        let _ = writeln!(out, "   Link: {}", hit.url);
        let preview = snippet(&hit.content, SNIPPET_CHARS);
        if !preview.is_empty() {
            let _ = writeln!(out, "   Preview: {preview}");
        }
    }
    out.trim_end().to_string()
}

fn snippet(text: &str, max_chars: usize) -> String {
    let text = text.split_whitespace().collect::<Vec<_>>().join(" ");
    match text.char_indices().nth(max_chars) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn response(v: serde_json::Value) -> SearchResponse {
        serde_json::from_value(v).unwrap()
    }

    #[test]
    fn answer_comes_first_then_numbered_results() {
        let resp = response(json!({
            "answer": "Rust 1.0 shipped in May 2015.",
            "results": [
                { "title": "Announcing Rust 1.0", "url": "https://blog.rust-lang.org/2015/05/15/Rust-1.0.html", "content": "Today we are very proud to announce the 1.0 release of Rust." },
                { "title": "", "url": "https://en.wikipedia.org/wiki/Rust_(programming_language)", "content": "" }
            ]
        }));
        let out = format_results("when was rust 1.0 released", &resp);

        assert!(out.starts_with("Answer: Rust 1.0 shipped in May 2015."));
        let first = out.find("1. Announcing Rust 1.0").unwrap();
        let second = out.find("2. https://en.wikipedia.org").unwrap();
        assert!(out.find("Answer:").unwrap() < first && first < second);
        assert!(out.contains("   Link: https://blog.rust-lang.org/2015/05/15/Rust-1.0.html"));
        assert!(out.contains("   Preview: Today we are very proud"));
    }

    #[test]
    fn long_snippets_are_cut_at_two_hundred_chars() {
        let long = "x".repeat(250);
        let resp = response(json!({
            "results": [{ "title": "t", "url": "https://u", "content": long }]
        }));
        let out = format_results("q", &resp);
        let preview = out
            .lines()
            .find_map(|l| l.strip_prefix("   Preview: "))
            .unwrap();
        assert_eq!(preview.len(), 203);
        assert!(preview.ends_with("..."));
    }

    #[test]
    fn empty_results_suggest_refining_the_query() {
        let out = format_results("zzqx", &SearchResponse::default());
        assert!(out.contains("No results found for \"zzqx\""));
        assert!(out.contains("Try refining the query"));
    }
}

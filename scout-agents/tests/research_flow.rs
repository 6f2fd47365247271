use async_trait::async_trait;
use scout_agents::tools::{EXTRACT_TOOL, SEARCH_TOOL, SUMMARIZE_TOOL};
use scout_agents::{
    Coordinator, RouteDecision, Router, Step, ToolRegistry, build_coordinator, build_tools,
};
use scout_common::session::Session;
use scout_common::{Result, ScoutError};
use scout_config::{LlmConfig, ScoutConfig, SearchConfig};
use serde_json::json;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use wiremock::matchers::{body_string_contains, method, path, path_regex, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const ARTICLE: &str = r#"<html><head><title>Rust Ownership</title></head><body>
<nav>Home | Blog</nav>
<article><h1>Ownership</h1><p>Each value in Rust has a single owner at a time.</p></article>
</body></html>"#;

fn offline_config(server: &MockServer) -> ScoutConfig {
    let mut config = ScoutConfig::default();
    config.search = SearchConfig {
        api_key: Some("tvly-test".into()),
        endpoint: format!("{}/", server.uri()),
        ..SearchConfig::default()
    };
    config.extractor.browser.enabled = false;
    config.extractor.timeout_secs = 5;
    config
}

async fn mount_search_and_page(server: &MockServer) -> String {
    let page_url = format!("{}/blog/ownership", server.uri());
    Mock::given(method("POST"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "query": "rust ownership",
            "answer": "Every value has one owner.",
            "results": [
                { "title": "Rust Ownership", "url": page_url, "content": "Ownership rules", "score": 0.9 }
            ]
        })))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/blog/ownership"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(ARTICLE, "text/html"))
        .mount(server)
        .await;
    page_url
}

/// Plays back a fixed list of decisions.
struct Playback(Mutex<VecDeque<RouteDecision>>);

#[async_trait]
impl Router for Playback {
    async fn next_step(
        &self,
        _request: &str,
        _transcript: &[Step],
        _tools: &ToolRegistry,
    ) -> Result<RouteDecision> {
        self.0
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| ScoutError::Agent("playback exhausted".into()))
    }
}

#[tokio::test]
async fn search_extract_then_summarize_by_url() {
    let server = MockServer::start().await;
    let page_url = mount_search_and_page(&server).await;
    let config = offline_config(&server);

    let tools = build_tools(&config).unwrap();
    assert_eq!(tools.names(), vec![SEARCH_TOOL, EXTRACT_TOOL, SUMMARIZE_TOOL]);

    let router = Playback(Mutex::new(
        vec![
            RouteDecision::Call {
                tool: SEARCH_TOOL.into(),
                args: json!({ "query": "rust ownership" }),
            },
            RouteDecision::Call {
                tool: EXTRACT_TOOL.into(),
                args: json!({ "url": page_url }),
            },
            RouteDecision::Call {
                tool: SUMMARIZE_TOOL.into(),
                args: json!({ "url": page_url, "length": "short" }),
            },
            RouteDecision::Respond("done".into()),
        ]
        .into(),
    ));
    let coordinator = Coordinator::new(Arc::new(router), tools, 6).unwrap();
    let mut session = Session::new();

    let turn = coordinator.run("explain rust ownership", &mut session).await.unwrap();
    assert_eq!(turn.answer, "done");
    assert_eq!(turn.steps.len(), 3);

    let search = &turn.steps[0].observation;
    assert!(search.starts_with("Answer: Every value has one owner."));
    assert!(search.contains(&format!("Link: {page_url}")));

    let extraction: serde_json::Value = serde_json::from_str(&turn.steps[1].observation).unwrap();
    assert_eq!(extraction["title"], "Rust Ownership");
    assert_eq!(extraction["method"], "fallback");

    let stored = session.extracted(&page_url).unwrap();
    assert!(stored.contains("single owner"));
    assert!(!stored.contains("Home | Blog"));
    assert_eq!(turn.steps[2].observation, format!("{stored}..."));
}

#[tokio::test]
async fn failed_extraction_is_reported_not_raised() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/missing"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;
    let config = offline_config(&server);
    let missing = format!("{}/missing", server.uri());

    let router = Playback(Mutex::new(
        vec![
            RouteDecision::Call {
                tool: EXTRACT_TOOL.into(),
                args: json!({ "url": missing }),
            },
            RouteDecision::Call {
                tool: SUMMARIZE_TOOL.into(),
                args: json!({ "url": missing }),
            },
            RouteDecision::Respond("The page could not be read.".into()),
        ]
        .into(),
    ));
    let coordinator =
        Coordinator::new(Arc::new(router), build_tools(&config).unwrap(), 6).unwrap();
    let mut session = Session::new();
    let turn = coordinator.run("summarize it", &mut session).await.unwrap();

    assert!(turn.steps[0]
        .observation
        .starts_with("Error: All extraction methods failed. Last error: "));
    assert!(turn.steps[1]
        .observation
        .contains("Please extract it first."));
    assert!(session.extracted(&missing).is_none());
    assert_eq!(turn.answer, "The page could not be read.");
}

#[test]
fn missing_tavily_key_fails_at_construction() {
    let mut config = ScoutConfig::default();
    config.extractor.browser.enabled = false;

    temp_env::with_var_unset("TAVILY_API_KEY", || {
        let err = build_tools(&config).err().unwrap();
        assert!(matches!(err, ScoutError::Config(msg) if msg.contains("TAVILY_API_KEY")));
    });
}

fn gemini_reply(text: &str) -> serde_json::Value {
    json!({
        "candidates": [{
            "content": { "parts": [{ "text": text }], "role": "model" },
            "finishReason": "STOP"
        }]
    })
}

#[tokio::test]
async fn llm_router_drives_the_loop_end_to_end() {
    let server = MockServer::start().await;
    let mut config = offline_config(&server);
    config.coordinator.llm = LlmConfig::Gemini {
        model: "gemini-test".into(),
        api_key: Some("g-test".into()),
        endpoint: format!("{}/v1beta/", server.uri()),
        temperature: None,
        max_tokens: None,
    };

    // First routing call: nothing observed yet, ask for a summary.
    Mock::given(method("POST"))
        .and(path_regex(r"generateContent$"))
        .and(query_param("key", "g-test"))
        .and(body_string_contains("No specialist has been called yet."))
        .respond_with(ResponseTemplate::new(200).set_body_json(gemini_reply(
            "```json\n{\"tool\": \"summarizer\", \"args\": {\"content\": \"alpha beta gamma\", \"length\": \"short\"}}\n```",
        )))
        .expect(1)
        .mount(&server)
        .await;
    // Second routing call sees the observation and answers.
    Mock::given(method("POST"))
        .and(path_regex(r"generateContent$"))
        .and(body_string_contains("alpha beta gamma..."))
        .respond_with(ResponseTemplate::new(200).set_body_json(gemini_reply(
            "{\"respond\": \"Summary: alpha beta gamma...\"}",
        )))
        .expect(1)
        .mount(&server)
        .await;

    let coordinator = build_coordinator(&config).unwrap();
    let answer = coordinator
        .handle("summarize: alpha beta gamma", &mut Session::new())
        .await
        .unwrap();
    assert_eq!(answer, "Summary: alpha beta gamma...");
}

#[tokio::test]
async fn missing_llm_key_fails_wiring() {
    let server = MockServer::start().await;
    let mut config = offline_config(&server);
    config.coordinator.llm = LlmConfig::default();

    temp_env::with_vars_unset(["GOOGLE_API_KEY", "GEMINI_API_KEY"], || {
        let err = build_coordinator(&config).err().unwrap();
        assert!(matches!(err, ScoutError::Config(msg) if msg.contains("GOOGLE_API_KEY")));
    });
}

use scout_common::ScoutError;
use scout_common::session::Session;
use scout_config::{DESKTOP_USER_AGENT, ExtractorConfig};
use scout_web::fallback::FallbackFetcher;
use scout_web::{ContentExtractor, ExtractionMethod, PageFetcher};
use std::time::Duration;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const ARTICLE: &str = r#"<!DOCTYPE html>
<html>
<head>
  <title>  Ownership in Rust  </title>
  <script>window.analytics = "do-not-extract";</script>
</head>
<body>
  <nav>Home  |  Blog</nav>
  <article>
    <h1>Ownership</h1>
    <p>Each value has a single owner.</p>
    <script>console.log("inline-noise")</script>
    <p>When the owner goes out of scope,  the value is dropped.</p>
  </article>
</body>
</html>"#;

async fn serve(server: &MockServer, route: &str, status: u16, body: &str) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(
            ResponseTemplate::new(status)
                .set_body_raw(body, "text/html"),
        )
        .mount(server)
        .await;
}

fn fallback_only() -> ExtractorConfig {
    let mut cfg = ExtractorConfig::default();
    cfg.browser.enabled = false;
    cfg
}

#[tokio::test]
async fn fallback_fetch_sends_desktop_user_agent() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/post"))
        .and(header("user-agent", DESKTOP_USER_AGENT))
        .respond_with(ResponseTemplate::new(200).set_body_raw(ARTICLE, "text/html"))
        .expect(1)
        .mount(&server)
        .await;

    let fetcher = FallbackFetcher::new(DESKTOP_USER_AGENT, Duration::from_secs(5)).unwrap();
    let page = fetcher
        .fetch(&format!("{}/post", server.uri()))
        .await
        .unwrap();
    assert_eq!(page.title.as_deref(), Some("Ownership in Rust"));
    assert_eq!(
        page.content,
        "Ownership Each value has a single owner. When the owner goes out of scope, the value is dropped."
    );
}

#[tokio::test]
async fn fallback_status_errors_are_fetch_errors_and_not_retried() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/down"))
        .respond_with(ResponseTemplate::new(503))
        .expect(1)
        .mount(&server)
        .await;

    let fetcher = FallbackFetcher::new(DESKTOP_USER_AGENT, Duration::from_secs(5)).unwrap();
    let err = fetcher
        .fetch(&format!("{}/down", server.uri()))
        .await
        .unwrap_err();
    assert!(matches!(err, ScoutError::Fetch(msg) if msg.contains("503")));
}

#[tokio::test]
async fn extraction_excludes_scripts_and_persists_full_text() {
    let server = MockServer::start().await;
    serve(&server, "/post", 200, ARTICLE).await;
    let url = format!("{}/post", server.uri());

    let extractor = ContentExtractor::from_config(&fallback_only()).unwrap();
    assert_eq!(extractor.methods(), vec![ExtractionMethod::Fallback]);

    let mut session = Session::new();
    let result = extractor.extract(&url, &mut session).await.unwrap();

    assert_eq!(result.method, ExtractionMethod::Fallback);
    assert_eq!(result.title, "Ownership in Rust");
    let stored = session.extracted(&url).expect("stored content");
    assert!(!stored.contains("do-not-extract"));
    assert!(!stored.contains("inline-noise"));
    assert!(!stored.contains("Blog"));
    assert_eq!(result.content_preview, stored);
}

#[tokio::test]
async fn unavailable_browser_falls_back_without_error() {
    let server = MockServer::start().await;
    serve(&server, "/post", 200, ARTICLE).await;
    let url = format!("{}/post", server.uri());

    let mut cfg = ExtractorConfig::default();
    cfg.timeout_secs = 5;
    cfg.browser.webdriver_url = "http://127.0.0.1:9".into();

    let extractor = ContentExtractor::from_config(&cfg).unwrap();
    let mut session = Session::new();
    let result = extractor.extract(&url, &mut session).await.unwrap();

    assert_eq!(result.method, ExtractionMethod::Fallback);
    assert_eq!(
        result.status,
        "Content extracted successfully using fallback method"
    );
    assert!(session.extracted(&url).is_some());
}

#[tokio::test]
async fn chain_failure_surfaces_the_fallback_error() {
    let server = MockServer::start().await;
    serve(&server, "/missing", 404, "<html><body>nope</body></html>").await;
    let url = format!("{}/missing", server.uri());

    let extractor = ContentExtractor::from_config(&fallback_only()).unwrap();
    let mut session = Session::new();
    let err = extractor.extract(&url, &mut session).await.unwrap_err();

    let message = err.to_string();
    assert!(message.starts_with("All extraction methods failed. Last error: "));
    assert!(message.contains("404"));
    assert!(session.is_empty());
}

#[tokio::test]
async fn relative_urls_fail_as_fetch_errors() {
    let extractor = ContentExtractor::from_config(&fallback_only()).unwrap();
    let mut session = Session::new();
    let err = extractor
        .extract("example.com/no-scheme", &mut session)
        .await
        .unwrap_err();
    assert!(err.to_string().contains("invalid URL"));
}

#[tokio::test]
async fn empty_html_page_is_an_extraction_failure() {
    let server = MockServer::start().await;
    serve(&server, "/blank", 200, "").await;
    let url = format!("{}/blank", server.uri());

    let extractor = ContentExtractor::from_config(&fallback_only()).unwrap();
    let mut session = Session::new();
    let err = extractor.extract(&url, &mut session).await.unwrap_err();

    assert!(matches!(&err, ScoutError::ExtractionFailed { cause, .. }
        if cause.contains("Could not find main content")));
    assert!(session.is_empty());
}

#[tokio::test]
async fn non_html_responses_are_rejected() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/notes.txt"))
        .respond_with(
            ResponseTemplate::new(200).set_body_raw("just some plain text, no markup", "text/plain"),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({ "json": true })))
        .mount(&server)
        .await;

    let fetcher = FallbackFetcher::new(DESKTOP_USER_AGENT, Duration::from_secs(5)).unwrap();
    for (route, media_type) in [("/notes.txt", "text/plain"), ("/api", "application/json")] {
        let err = fetcher
            .fetch(&format!("{}{route}", server.uri()))
            .await
            .unwrap_err();
        assert!(
            matches!(&err, ScoutError::Parse(msg) if msg.contains(media_type)),
            "{route} gave {err:?}"
        );
    }

    let extractor = ContentExtractor::from_config(&fallback_only()).unwrap();
    let mut session = Session::new();
    let url = format!("{}/notes.txt", server.uri());
    assert!(extractor.extract(&url, &mut session).await.is_err());
    assert!(session.extracted(&url).is_none());
}

use async_trait::async_trait;
use regex::Regex;
use scout_common::{Result, ScoutError};
use scout_config::BrowserConfig;
use scout_drivers::browser::behavioral::BehavioralEngine;
use scout_drivers::browser::driver::{DriverOptions, ScoutDriver};
use std::sync::OnceLock;
use std::time::Duration;

use crate::extract::{ExtractionMethod, FetchedPage, PageFetcher};

const READY_BUDGET: Duration = Duration::from_secs(10);

/// Renders the page in a WebDriver session and converts the DOM to markdown.
pub struct BrowserFetcher {
    options: DriverOptions,
    behavior: BehavioralEngine,
}

impl BrowserFetcher {
    pub fn new(options: DriverOptions) -> Self {
        Self {
            options,
            behavior: BehavioralEngine::new(),
        }
    }

    pub fn with_behavior(mut self, behavior: BehavioralEngine) -> Self {
        self.behavior = behavior;
        self
    }

    pub fn from_config(cfg: &BrowserConfig) -> Self {
        Self::new(DriverOptions::from(cfg)).with_behavior(BehavioralEngine {
            instant: !cfg.humanize,
        })
    }

    async fn render(driver: &mut ScoutDriver, url: &str) -> anyhow::Result<(String, String)> {
        let page = driver.goto(url).await?;
        if let Err(e) = page.wait_until_ready(READY_BUDGET).await {
            tracing::debug!(%url, error = %e, "extract.primary.not_ready");
        }
        let html = page.content().await?;
        let title = page.title().await.unwrap_or_default();
        Ok((html, title))
    }
}

#[async_trait]
impl PageFetcher for BrowserFetcher {
    fn method(&self) -> ExtractionMethod {
        ExtractionMethod::Primary
    }

    async fn fetch(&self, url: &str) -> Result<FetchedPage> {
        let mut driver = ScoutDriver::connect(&self.options)
            .await?
            .with_behavior(self.behavior.clone());
        let rendered = Self::render(&mut driver, url).await;
        if let Err(e) = driver.close().await {
            tracing::debug!(error = %e, "extract.primary.close_failed");
        }
        let (html, title) = rendered?;

        let markdown = html_to_markdown(&html);
        if markdown.trim().is_empty() {
            return Err(ScoutError::Parse(
                "browser rendered no extractable content".to_string(),
            ));
        }
        Ok(FetchedPage {
            title: Some(title),
            content: markdown,
        })
    }
}

fn strip_styles_and_scripts(html: &str) -> String {
    static STYLE: OnceLock<Option<Regex>> = OnceLock::new();
    static SCRIPT: OnceLock<Option<Regex>> = OnceLock::new();
    let style = STYLE.get_or_init(|| Regex::new(r"(?is)<style[^>]*>.*?</style>").ok());
    let script = SCRIPT.get_or_init(|| Regex::new(r"(?is)<script[^>]*>.*?</script>").ok());

    let mut cleaned = html.to_string();
    for re in [style, script].into_iter().flatten() {
        cleaned = re.replace_all(&cleaned, "").into_owned();
    }
    cleaned
}

/// Markdown rendering of `html` with scripts and styles removed.
pub fn html_to_markdown(html: &str) -> String {
    fast_html2md::parse_html(&strip_styles_and_scripts(html), true)
}

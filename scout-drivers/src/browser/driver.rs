use crate::browser::{
    behavioral::BehavioralEngine,
    fingerprint::{UserAgentManager, UserAgentProfile},
    page::ScoutPage,
    stealth::{build_stealth_arguments, StealthProfile},
};
use anyhow::{Context, Result};
use fantoccini::{Client, ClientBuilder};
use scout_config::BrowserConfig;
use serde_json::json;
use webdriver::capabilities::Capabilities;

/// Connection settings for a WebDriver session.
#[derive(Debug, Clone)]
pub struct DriverOptions {
    pub webdriver_url: String,
    pub headless: bool,
    pub stealth: StealthProfile,
}

impl Default for DriverOptions {
    fn default() -> Self {
        Self::from(&BrowserConfig::default())
    }
}

impl From<&BrowserConfig> for DriverOptions {
    fn from(cfg: &BrowserConfig) -> Self {
        Self {
            webdriver_url: cfg.webdriver_url.clone(),
            headless: cfg.headless,
            stealth: cfg.stealth.into(),
        }
    }
}

/// Chrome capabilities for a session using `profile`.
pub fn chrome_capabilities(options: &DriverOptions, profile: &UserAgentProfile) -> Capabilities {
    let args = build_stealth_arguments(options.stealth, profile, options.headless);
    let mut caps = Capabilities::new();
    caps.insert(
        "goog:chromeOptions".to_string(),
        json!({
            "args": args,
            "excludeSwitches": ["enable-automation"],
        }),
    );
    caps
}

/// Thin wrapper around a `fantoccini` WebDriver client with stealth and
/// behavioral helpers.
pub struct ScoutDriver {
    client: Client,
    behavioral_engine: BehavioralEngine,
    user_agent_manager: UserAgentManager,
    stealth_profile: StealthProfile,
}

impl ScoutDriver {
    /// Open a session on the WebDriver service at `options.webdriver_url`
    /// (Chromedriver listens on `http://localhost:9515` by default).
    pub async fn connect(options: &DriverOptions) -> Result<Self> {
        let mut user_agent_manager = UserAgentManager::new();
        let caps = chrome_capabilities(options, user_agent_manager.session_profile());

        tracing::debug!(
            webdriver_url = %options.webdriver_url,
            headless = options.headless,
            stealth = ?options.stealth,
            "browser.session.connect"
        );
        let client = ClientBuilder::native()
            .capabilities(caps)
            .connect(&options.webdriver_url)
            .await
            .with_context(|| format!("WebDriver not reachable at {}", options.webdriver_url))?;

        Ok(Self {
            client,
            behavioral_engine: BehavioralEngine::new(),
            user_agent_manager,
            stealth_profile: options.stealth,
        })
    }

    pub fn with_behavior(mut self, engine: BehavioralEngine) -> Self {
        self.behavioral_engine = engine;
        self
    }

    /// Navigate to `url` and return a [`ScoutPage`] with stealth scripts applied.
    pub async fn goto(&mut self, url: &str) -> Result<ScoutPage> {
        let platform = self.user_agent_manager.session_profile().platform.clone();
        let mut page = ScoutPage::new(
            self.client.clone(),
            self.stealth_profile,
            platform,
            self.behavioral_engine.clone(),
        );
        page.goto(url).await?;
        Ok(page)
    }

    /// Close the underlying browser session.
    pub async fn close(self) -> Result<()> {
        self.client.close().await?;
        tracing::debug!("browser.session.closed");
        Ok(())
    }
}

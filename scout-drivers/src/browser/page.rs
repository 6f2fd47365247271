use crate::browser::{
    behavioral::BehavioralEngine,
    stealth::{StealthProfile, StealthScripts},
};
use anyhow::{anyhow, Result};
use fantoccini::Client;
use std::time::Duration;
use tokio::time::{sleep, Instant};

const READY_POLL: Duration = Duration::from_millis(250);

/// A navigated tab: readiness checks and DOM reads.
pub struct ScoutPage {
    client: Client,
    stealth_profile: StealthProfile,
    platform: String,
    behavioral_engine: BehavioralEngine,
}

impl ScoutPage {
    /// Construct a page wrapper around an existing WebDriver client.
    pub fn new(
        client: Client,
        stealth_profile: StealthProfile,
        platform: String,
        behavioral_engine: BehavioralEngine,
    ) -> Self {
        Self {
            client,
            stealth_profile,
            platform,
            behavioral_engine,
        }
    }

    /// Navigate to `url` and apply the profile's stealth scripts.
    pub async fn goto(&mut self, url: &str) -> Result<()> {
        self.behavioral_engine.random_delay(300, 1200).await;
        self.client.goto(url).await?;

        for script in StealthScripts::for_profile(self.stealth_profile, &self.platform) {
            self.client.execute(&script, vec![]).await?;
        }
        Ok(())
    }

    /// Poll `document.readyState` until it reports `complete`.
    pub async fn wait_until_ready(&self, budget: Duration) -> Result<()> {
        let deadline = Instant::now() + budget;
        loop {
            let state = self
                .client
                .execute("return document.readyState", vec![])
                .await?;
            if state.as_str() == Some("complete") {
                return Ok(());
            }
            if Instant::now() >= deadline {
                return Err(anyhow!(
                    "page not ready after {budget:?} (readyState={state})"
                ));
            }
            sleep(READY_POLL).await;
        }
    }

    /// Return the full page HTML source.
    pub async fn content(&self) -> Result<String> {
        Ok(self.client.source().await?)
    }

    /// Return the page title.
    pub async fn title(&self) -> Result<String> {
        Ok(self.client.title().await?)
    }
}

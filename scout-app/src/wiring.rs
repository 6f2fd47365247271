use anyhow::{Context, Result};
use scout_agents::{
    Coordinator, ExtractorAgent, SearchAgent, SummaryRequest, Turn, build_coordinator, summarize,
};
use scout_common::session::Session;
use scout_config::ScoutConfig;
use scout_web::ExtractionResult;

/// Agents built from one config, sharing one session.
///
/// Each agent is constructed on first use so a subcommand only needs the
/// credentials it actually touches.
pub struct Scout {
    config: ScoutConfig,
    session: Session,
    search: Option<SearchAgent>,
    extractor: Option<ExtractorAgent>,
    coordinator: Option<Coordinator>,
}

impl Scout {
    pub fn new(config: ScoutConfig) -> Self {
        Self {
            config,
            session: Session::new(),
            search: None,
            extractor: None,
            coordinator: None,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn reset(&mut self) {
        tracing::info!(session = %self.session.id(), entries = self.session.len(), "app.session.reset");
        self.session.clear();
    }

    pub async fn search(&mut self, query: &str) -> Result<String> {
        if self.search.is_none() {
            self.search = Some(SearchAgent::new(&self.config.search)?);
        }
        let agent = self.search.as_ref().context("search agent unavailable")?;
        Ok(agent.run(query).await?)
    }

    pub async fn extract(&mut self, url: &str) -> Result<ExtractionResult> {
        if self.extractor.is_none() {
            self.extractor = Some(ExtractorAgent::new(&self.config.extractor)?);
        }
        let agent = self
            .extractor
            .as_ref()
            .context("extractor agent unavailable")?;
        Ok(agent.run(url, &mut self.session).await?)
    }

    pub fn summarize(&self, request: &SummaryRequest) -> Result<String> {
        Ok(summarize(request, &self.session)?)
    }

    pub async fn ask(&mut self, request: &str) -> Result<Turn> {
        if self.coordinator.is_none() {
            self.coordinator = Some(build_coordinator(&self.config)?);
        }
        let coordinator = self
            .coordinator
            .as_ref()
            .context("coordinator unavailable")?;
        Ok(coordinator.run(request, &mut self.session).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scout_agents::LengthTier;

    fn offline() -> ScoutConfig {
        let mut config = ScoutConfig::default();
        config.extractor.browser.enabled = false;
        config
    }

    #[test]
    fn summarize_by_url_needs_prior_extraction() {
        let scout = Scout::new(offline());
        let err = scout
            .summarize(&SummaryRequest::url("https://example.com/a", LengthTier::Short))
            .unwrap_err();
        assert!(err.to_string().contains("Please extract it first."));
    }

    #[tokio::test]
    async fn invalid_url_leaves_session_empty() {
        let mut scout = Scout::new(offline());
        assert!(scout.extract("   ").await.is_err());
        assert!(scout.session().is_empty());
    }
}

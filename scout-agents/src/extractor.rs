use scout_common::Result;
use scout_common::session::Session;
use scout_config::ExtractorConfig;
use scout_web::{ContentExtractor, ExtractionResult};

/// Content extraction specialist. Successful runs leave the full text in the
/// session for the summarizer.
pub struct ExtractorAgent {
    extractor: ContentExtractor,
}

impl ExtractorAgent {
    pub fn new(config: &ExtractorConfig) -> Result<Self> {
        Ok(Self {
            extractor: ContentExtractor::from_config(config)?,
        })
    }

    pub fn from_extractor(extractor: ContentExtractor) -> Self {
        Self { extractor }
    }

    pub async fn run(&self, url: &str, session: &mut Session) -> Result<ExtractionResult> {
        self.extractor.extract(url.trim(), session).await
    }
}

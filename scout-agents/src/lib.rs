//! Research team: search, extraction and summarization specialists plus the
//! coordinator that routes a request between them.
//!
//! Specialists are plain structs with an async `run`; the coordinator sees
//! them only as [`tools::Tool`]s and talks to an LLM through
//! [`router::Router`].

pub mod coordinator;
pub mod extractor;
pub mod router;
pub mod search;
pub mod summarizer;
pub mod tools;

use scout_common::Result;
use scout_config::ScoutConfig;
use std::sync::Arc;

pub use coordinator::{Coordinator, Turn};
pub use extractor::ExtractorAgent;
pub use router::{LlmRouter, RouteDecision, Router, Step};
pub use search::SearchAgent;
pub use summarizer::{LengthTier, SummaryRequest, summarize};
pub use tools::{ExtractTool, SearchTool, SummarizeTool, Tool, ToolRegistry};

/// Every specialist tool, built from `config`.
///
/// Fails with a configuration error when the Tavily key is missing.
pub fn build_tools(config: &ScoutConfig) -> Result<ToolRegistry> {
    let mut tools = ToolRegistry::new();
    tools
        .add(Arc::new(SearchTool::new(SearchAgent::new(&config.search)?)))
        .add(Arc::new(ExtractTool::new(ExtractorAgent::new(&config.extractor)?)))
        .add(Arc::new(SummarizeTool));
    Ok(tools)
}

/// Coordinator wired from `config`: LLM router plus every tool.
pub fn build_coordinator(config: &ScoutConfig) -> Result<Coordinator> {
    let llm = scout_llm::build_llm_client(&config.coordinator.llm)?;
    let tools = build_tools(config)?;
    tracing::info!(
        tools = %tools.names().join(","),
        max_steps = config.coordinator.max_steps,
        "agents.coordinator.ready"
    );
    Coordinator::new(
        Arc::new(LlmRouter::new(llm)),
        tools,
        config.coordinator.max_steps,
    )
}

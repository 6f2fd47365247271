//! Specialists exposed as named tools the coordinator can call.

use async_trait::async_trait;
use scout_common::session::Session;
use scout_common::{Result, ScoutError};
use serde_json::{Value, json};
use std::sync::Arc;

use crate::extractor::ExtractorAgent;
use crate::search::SearchAgent;
use crate::summarizer::{LengthTier, SummaryRequest, summarize};

pub const SEARCH_TOOL: &str = "search_agent";
pub const EXTRACT_TOOL: &str = "content_extractor";
pub const SUMMARIZE_TOOL: &str = "summarizer";

#[async_trait]
pub trait Tool: Send + Sync {
    fn name(&self) -> &str;

    fn description(&self) -> &str;

    /// JSON schema of the `args` object accepted by [`Tool::call`].
    fn parameters(&self) -> Value;

    async fn call(&self, args: Value, session: &mut Session) -> Result<String>;
}

/// Ordered set of tools; order is the order they are presented to the router.
#[derive(Clone, Default)]
pub struct ToolRegistry {
    tools: Vec<Arc<dyn Tool>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `tool`, replacing any tool registered under the same name.
    pub fn add(&mut self, tool: Arc<dyn Tool>) -> &mut Self {
        self.tools.retain(|t| t.name() != tool.name());
        self.tools.push(tool);
        self
    }

    pub fn find(&self, name: &str) -> Option<Arc<dyn Tool>> {
        self.tools.iter().find(|t| t.name() == name).cloned()
    }

    pub fn names(&self) -> Vec<&str> {
        self.tools.iter().map(|t| t.name()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Catalogue text for prompts: one entry per tool with its argument schema.
    pub fn describe(&self) -> String {
        self.tools
            .iter()
            .map(|t| {
                format!(
                    "- {}: {}\n  args schema: {}",
                    t.name(),
                    t.description(),
                    t.parameters()
                )
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

fn arg_str<'a>(args: &'a Value, key: &str) -> Option<&'a str> {
    args.get(key)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

fn required_str<'a>(args: &'a Value, key: &str) -> Result<&'a str> {
    arg_str(args, key)
        .ok_or_else(|| ScoutError::Validation(format!("missing required argument `{key}`")))
}

pub struct SearchTool {
    agent: SearchAgent,
}

impl SearchTool {
    pub fn new(agent: SearchAgent) -> Self {
        Self { agent }
    }
}

#[async_trait]
impl Tool for SearchTool {
    fn name(&self) -> &str {
        SEARCH_TOOL
    }

    fn description(&self) -> &str {
        "Searches the web and returns a direct answer (when available) plus ranked results with title, link and preview."
    }

    fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "query": { "type": "string", "description": "Search query." }
            },
            "required": ["query"]
        })
    }

    async fn call(&self, args: Value, _session: &mut Session) -> Result<String> {
        let query = required_str(&args, "query")?;
        self.agent.run(query).await
    }
}

pub struct ExtractTool {
    agent: ExtractorAgent,
}

impl ExtractTool {
    pub fn new(agent: ExtractorAgent) -> Self {
        Self { agent }
    }
}

#[async_trait]
impl Tool for ExtractTool {
    fn name(&self) -> &str {
        EXTRACT_TOOL
    }

    fn description(&self) -> &str {
        "Extracts the main content of a web page and stores the full text in the session so the summarizer can use it by URL."
    }

    fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "url": { "type": "string", "description": "Absolute http(s) URL." }
            },
            "required": ["url"]
        })
    }

    async fn call(&self, args: Value, session: &mut Session) -> Result<String> {
        let url = required_str(&args, "url")?;
        let result = self.agent.run(url, session).await?;
        serde_json::to_string_pretty(&result)
            .map_err(|e| ScoutError::Parse(format!("could not render extraction result: {e}")))
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SummarizeTool;

#[async_trait]
impl Tool for SummarizeTool {
    fn name(&self) -> &str {
        SUMMARIZE_TOOL
    }

    fn description(&self) -> &str {
        "Summarizes inline text, or text previously extracted from a URL in this session."
    }

    fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "content": { "type": "string", "description": "Text to summarize." },
                "url": { "type": "string", "description": "URL extracted earlier in this session; takes precedence over content." },
                "length": { "type": "string", "enum": ["short", "medium", "long"], "default": "medium" }
            }
        })
    }

    async fn call(&self, args: Value, session: &mut Session) -> Result<String> {
        let request = SummaryRequest {
            content: args
                .get("content")
                .and_then(Value::as_str)
                .map(str::to_string),
            url: arg_str(&args, "url").map(str::to_string),
            length: arg_str(&args, "length")
                .map(LengthTier::parse_lenient)
                .unwrap_or_default(),
        };
        summarize(&request, session)
    }
}

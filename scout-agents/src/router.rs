//! Routing policy: decides which tool to call next, or when to answer.

use async_trait::async_trait;
use regex::Regex;
use scout_common::{Result, ScoutError};
use scout_llm::traits::LlmClient;
use serde_json::Value;
use std::fmt::Write as _;
use std::sync::{Arc, OnceLock};

use crate::tools::ToolRegistry;

const OBSERVATION_PROMPT_CHARS: usize = 4000;

pub const COORDINATOR_INSTRUCTION: &str = r#"You are the coordinator of a research team.
Your team has three specialists:
- A search agent to find information online.
- A content extractor to get content from URLs.
- A summarizer to condense information.

Your job is to delegate tasks to the correct specialist based on the user's request.
For complex requests, you may need to chain the specialists together. For example:
1. Search for information.
2. Extract content from the most relevant URL.
3. Summarize the content.

Always present the final results to the user in a clear and organized way."#;

const OUTPUT_CONTRACT: &str = r#"Reply with exactly one JSON object and nothing else.
To call a specialist: {"tool": "<tool name>", "args": { ... }}
To answer the user:   {"respond": "<final answer>"}
If a specialist reported an error, explain it to the user instead of retrying the same call."#;

/// Next move chosen by a [`Router`].
#[derive(Debug, Clone, PartialEq)]
pub enum RouteDecision {
    Call { tool: String, args: Value },
    Respond(String),
}

/// One completed tool call and what came back (result text or error text).
#[derive(Debug, Clone, PartialEq)]
pub struct Step {
    pub tool: String,
    pub args: Value,
    pub observation: String,
}

#[async_trait]
pub trait Router: Send + Sync {
    async fn next_step(
        &self,
        request: &str,
        transcript: &[Step],
        tools: &ToolRegistry,
    ) -> Result<RouteDecision>;
}

/// Router that asks an LLM for the next step.
pub struct LlmRouter {
    llm: Arc<dyn LlmClient>,
    max_tokens: Option<u32>,
    temperature: Option<f32>,
}

impl LlmRouter {
    pub fn new(llm: Arc<dyn LlmClient>) -> Self {
        Self {
            llm,
            max_tokens: Some(1024),
            temperature: Some(0.2),
        }
    }

    fn system_prompt(tools: &ToolRegistry) -> String {
        format!(
            "{COORDINATOR_INSTRUCTION}\n\nAvailable specialists:\n{}\n\n{OUTPUT_CONTRACT}",
            tools.describe()
        )
    }

    fn user_prompt(request: &str, transcript: &[Step]) -> String {
        let mut prompt = format!("User request:\n{request}\n");
        if transcript.is_empty() {
            prompt.push_str("\nNo specialist has been called yet.\n");
            return prompt;
        }
        prompt.push_str("\nSteps so far:\n");
        for (i, step) in transcript.iter().enumerate() {
            let _ = writeln!(
                prompt,
                "{}. {} {}\n   result: {}",
                i + 1,
                step.tool,
                step.args,
                clip(&step.observation, OBSERVATION_PROMPT_CHARS)
            );
        }
        prompt
    }
}

#[async_trait]
impl Router for LlmRouter {
    async fn next_step(
        &self,
        request: &str,
        transcript: &[Step],
        tools: &ToolRegistry,
    ) -> Result<RouteDecision> {
        let system = Self::system_prompt(tools);
        let prompt = Self::user_prompt(request, transcript);
        let response = self
            .llm
            .generate(&prompt, Some(&system), self.max_tokens, self.temperature)
            .await?;
        tracing::debug!(
            model = self.llm.model_name(),
            step = transcript.len() + 1,
            reply_len = response.text.len(),
            "coordinator.route.reply"
        );
        parse_decision(&response.text)
    }
}

fn clip(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_string(),
    }
}

/// Try to extract a ```json ... ``` fenced block; fall back to the outermost
/// braces in the text.
pub fn extract_json_block(text: &str) -> Option<String> {
    static FENCE: OnceLock<Option<Regex>> = OnceLock::new();
    static PLAIN: OnceLock<Option<Regex>> = OnceLock::new();

    let fence = FENCE
        .get_or_init(|| Regex::new(r"(?s)```(?:json)?\s*(\{.*?\})\s*```").ok())
        .as_ref()?;
    if let Some(m) = fence.captures(text).and_then(|c| c.get(1)) {
        return Some(m.as_str().to_string());
    }
    let plain = PLAIN
        .get_or_init(|| Regex::new(r"(?s)(\{.*\})").ok())
        .as_ref()?;
    plain
        .captures(text)
        .and_then(|c| c.get(1).map(|m| m.as_str().to_string()))
}

/// Turn a router reply into a decision.
///
/// A reply with no usable JSON object is taken as a direct answer, so prose
/// that merely contains braces (code, examples) still reaches the user. Only a
/// reply that is nothing but a JSON object without `tool` or `respond` is an
/// error.
pub fn parse_decision(text: &str) -> Result<RouteDecision> {
    let text = text.trim();
    if text.is_empty() {
        return Err(ScoutError::Agent("router returned an empty reply".to_string()));
    }

    let Some(block) = extract_json_block(text) else {
        return Ok(RouteDecision::Respond(text.to_string()));
    };
    let value: Value = match serde_json::from_str(&block) {
        Ok(value) => value,
        Err(e) => {
            tracing::debug!(error = %e, "coordinator.route.prose_reply");
            return Ok(RouteDecision::Respond(text.to_string()));
        }
    };

    if let Some(answer) = value.get("respond").and_then(Value::as_str) {
        return Ok(RouteDecision::Respond(answer.to_string()));
    }
    if let Some(tool) = value.get("tool").and_then(Value::as_str) {
        let args = value
            .get("args")
            .or_else(|| value.get("arguments"))
            .cloned()
            .unwrap_or_else(|| Value::Object(Default::default()));
        return Ok(RouteDecision::Call {
            tool: tool.to_string(),
            args,
        });
    }
    if block != text {
        return Ok(RouteDecision::Respond(text.to_string()));
    }
    Err(ScoutError::Agent(format!(
        "router reply has neither `tool` nor `respond`: {}",
        clip(&block, 200)
    )))
}

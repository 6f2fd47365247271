use crate::gemini::ensure_trailing_slash;
use crate::http_to_scout;
use crate::traits::{GenerationDefaults, LlmClient, LlmResponse};
use async_trait::async_trait;
use scout_common::{Result, ScoutError};
use scout_http::HttpClient;
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const OPENAI_API_BASE: &str = "https://api.openai.com/v1/";
const DEFAULT_INSTRUCTIONS: &str = "You are a helpful research assistant.";

/// Client for the OpenAI Responses API.
pub struct OpenAiClient {
    client: HttpClient,
    api_key: String,
    model: String,
    defaults: GenerationDefaults,
}

#[derive(Serialize)]
struct ResponsesApiRequest<'a> {
    model: &'a str,
    input: &'a str,
    instructions: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_output_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

#[derive(Debug, Deserialize)]
struct ResponsesApiResponse {
    model: String,
    #[serde(default)]
    output: Vec<ResponseMessage>,
    usage: Option<ResponseUsage>,
}

/// One element in the `output` array
#[derive(Debug, Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: Vec<ResponseContent>,
}

/// One part of the message `content`
#[derive(Debug, Deserialize)]
struct ResponseContent {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    text: String,
}

#[derive(Debug, Deserialize)]
struct ResponseUsage {
    total_tokens: Option<u32>,
}

impl OpenAiClient {
    /// Create a new client for the given API key and model.
    pub fn new(api_key: String, model: String) -> Result<Self> {
        Self::with_endpoint(OPENAI_API_BASE, api_key, model)
    }

    /// Create a client against an OpenAI-compatible base URL.
    pub fn with_endpoint(endpoint: &str, api_key: String, model: String) -> Result<Self> {
        let client = HttpClient::new(&ensure_trailing_slash(endpoint))
            .map_err(|e| ScoutError::Config(format!("OpenAI endpoint: {e}")))?
            .with_timeout(Duration::from_secs(60));
        Ok(Self {
            client,
            api_key,
            model,
            defaults: GenerationDefaults::default(),
        })
    }

    pub fn with_defaults(mut self, defaults: GenerationDefaults) -> Self {
        self.defaults = defaults;
        self
    }
}

#[async_trait]
impl LlmClient for OpenAiClient {
    async fn generate(
        &self,
        prompt: &str,
        system_prompt: Option<&str>,
        max_tokens: Option<u32>,
        temperature: Option<f32>,
    ) -> Result<LlmResponse> {
        let (max_output_tokens, temperature) = self.defaults.apply(max_tokens, temperature);
        let req = ResponsesApiRequest {
            model: &self.model,
            input: prompt,
            instructions: system_prompt.unwrap_or(DEFAULT_INSTRUCTIONS),
            // The Responses API rejects values below 16.
            max_output_tokens: max_output_tokens.map(|n| n.max(16)),
            temperature,
        };
        tracing::debug!(model = %self.model, prompt_len = prompt.len(), "llm.openai.request");

        let resp: ResponsesApiResponse = self
            .client
            .post_json("responses", Some(&self.api_key), &req)
            .await
            .map_err(|e| http_to_scout("OpenAI", e))?;

        let text = resp
            .output
            .iter()
            .flat_map(|msg| &msg.content)
            .filter(|c| c.kind == "output_text")
            .map(|c| c.text.as_str())
            .collect::<String>();
        if text.is_empty() {
            return Err(ScoutError::Agent(
                "OpenAI response contained no output text".to_string(),
            ));
        }

        Ok(LlmResponse {
            text,
            model: Some(resp.model),
            tokens_used: resp.usage.and_then(|u| u.total_tokens),
        })
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

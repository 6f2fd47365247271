//! Provider-agnostic LLM integration for Scout.
//!
//! This crate exposes a common [`traits::LlmClient`] interface and concrete
//! provider implementations for Gemini and OpenAI. [`build_llm_client`]
//! turns a [`scout_config::LlmConfig`] into a ready client.
//!
//! # Examples
//! ```no_run
//! use scout_config::LlmConfig;
//! use scout_llm::build_llm_client;
//!
//! # fn main() -> scout_common::Result<()> {
//! let client = build_llm_client(&LlmConfig::default())?;
//! assert_eq!(client.model_name(), "gemini-1.5-flash");
//! # Ok(())
//! # }
//! ```
pub mod gemini;
pub mod openai;
pub mod traits;

use gemini::GeminiClient;
use openai::OpenAiClient;
use scout_common::{Result, ScoutError};
use scout_config::LlmConfig;
use scout_http::HttpError;
use std::sync::Arc;
use traits::{GenerationDefaults, LlmClient};

/// Build the configured provider client.
///
/// Fails with [`ScoutError::Config`] when no usable API key is configured or
/// present in the provider's conventional environment variable.
pub fn build_llm_client(config: &LlmConfig) -> Result<Arc<dyn LlmClient>> {
    let api_key = config.resolved_api_key().ok_or_else(|| {
        let hint = match config {
            LlmConfig::Gemini { .. } => "GOOGLE_API_KEY",
            LlmConfig::Openai { .. } => "OPENAI_API_KEY",
        };
        ScoutError::Config(format!(
            "no API key for model {}; set coordinator.llm.api_key or {hint}",
            config.model()
        ))
    })?;

    let client: Arc<dyn LlmClient> = match config {
        LlmConfig::Gemini {
            model,
            endpoint,
            temperature,
            max_tokens,
            ..
        } => Arc::new(
            GeminiClient::with_endpoint(endpoint, api_key, model.clone())?.with_defaults(
                GenerationDefaults {
                    temperature: *temperature,
                    max_tokens: *max_tokens,
                },
            ),
        ),
        LlmConfig::Openai {
            model,
            endpoint,
            temperature,
            max_tokens,
            ..
        } => Arc::new(
            OpenAiClient::with_endpoint(endpoint, api_key, model.clone())?.with_defaults(
                GenerationDefaults {
                    temperature: *temperature,
                    max_tokens: *max_tokens,
                },
            ),
        ),
    };
    tracing::info!(model = client.model_name(), "llm.client.ready");
    Ok(client)
}

pub(crate) fn http_to_scout(provider: &str, e: HttpError) -> ScoutError {
    match e {
        HttpError::Timeout(d) => ScoutError::Timeout(d),
        HttpError::Api { status, .. } if status.as_u16() == 429 => {
            ScoutError::Agent(format!("{provider}: rate limit exceeded"))
        }
        HttpError::Api { status, .. } if status.as_u16() == 401 => {
            ScoutError::Agent(format!("{provider}: invalid API key"))
        }
        HttpError::Api { status, .. } if status.as_u16() == 403 => {
            ScoutError::Agent(format!("{provider}: API access forbidden"))
        }
        other => ScoutError::Agent(format!("{provider} request failed: {other}")),
    }
}

//! Loader for Scout configuration with YAML + environment overlays.
//!
//! Sources are merged in order: YAML files/snippets, then `SCOUT__`-prefixed
//! environment variables (`SCOUT__SEARCH__MAX_RESULTS=3` sets
//! `search.max_results`). After merging, `${VAR}` placeholders in any string
//! are expanded from the process environment. Every section has defaults, so
//! an empty document is a valid configuration.
//!
//! ```yaml
//! version: "1"
//! coordinator:
//!   max_steps: 6
//!   llm:
//!     provider: gemini
//!     model: gemini-1.5-flash
//!     api_key: "${GOOGLE_API_KEY}"
//! search:
//!   api_key: "${TAVILY_API_KEY}"
//!   max_results: 5
//! extractor:
//!   timeout_secs: 30
//!   browser:
//!     webdriver_url: http://localhost:9515
//! logging:
//!   format: json
//!   emit_stderr: true
//! ```
use config::{Config, ConfigError, Environment, File, FileFormat};
use scout_common::observability::LogFormat;
use serde::Deserialize;
use serde_json::Value;
use std::path::{Path, PathBuf};

const MAXIMUM_ENV_EXPANSION_DEPTH: usize = 8;

pub const DEFAULT_CONFIG_FILE: &str = "scout.yaml";
pub const TAVILY_API_KEY_ENV: &str = "TAVILY_API_KEY";
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-1.5-flash";
pub const DEFAULT_OPENAI_MODEL: &str = "gpt-4o-mini";
pub const DESKTOP_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ScoutConfig {
    pub version: Option<String>,
    pub coordinator: CoordinatorConfig,
    pub search: SearchConfig,
    pub extractor: ExtractorConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CoordinatorConfig {
    /// Upper bound on tool calls the coordinator makes for one request.
    pub max_steps: usize,
    pub llm: LlmConfig,
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self {
            max_steps: 6,
            llm: LlmConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "provider", rename_all = "lowercase")]
pub enum LlmConfig {
    Gemini {
        #[serde(default = "default_gemini_model")]
        model: String,
        #[serde(default)]
        api_key: Option<String>,
        #[serde(default = "default_gemini_endpoint")]
        endpoint: String,
        #[serde(default)]
        temperature: Option<f32>,
        #[serde(default)]
        max_tokens: Option<u32>,
    },
    Openai {
        #[serde(default = "default_openai_model")]
        model: String,
        #[serde(default)]
        api_key: Option<String>,
        #[serde(default = "default_openai_endpoint")]
        endpoint: String,
        #[serde(default)]
        temperature: Option<f32>,
        #[serde(default)]
        max_tokens: Option<u32>,
    },
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self::Gemini {
            model: default_gemini_model(),
            api_key: None,
            endpoint: default_gemini_endpoint(),
            temperature: None,
            max_tokens: None,
        }
    }
}

impl LlmConfig {
    /// The configured key, or the provider's conventional environment variable.
    pub fn resolved_api_key(&self) -> Option<String> {
        match self {
            LlmConfig::Gemini { api_key, .. } => {
                resolve_secret(api_key.as_deref(), &["GOOGLE_API_KEY", "GEMINI_API_KEY"])
            }
            LlmConfig::Openai { api_key, .. } => {
                resolve_secret(api_key.as_deref(), &["OPENAI_API_KEY"])
            }
        }
    }

    pub fn model(&self) -> &str {
        match self {
            LlmConfig::Gemini { model, .. } | LlmConfig::Openai { model, .. } => model,
        }
    }
}

fn default_gemini_model() -> String {
    DEFAULT_GEMINI_MODEL.into()
}
fn default_openai_model() -> String {
    DEFAULT_OPENAI_MODEL.into()
}
fn default_gemini_endpoint() -> String {
    "https://generativelanguage.googleapis.com/v1beta/".into()
}
fn default_openai_endpoint() -> String {
    "https://api.openai.com/v1/".into()
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchDepth {
    Basic,
    #[default]
    Advanced,
}

impl SearchDepth {
    pub fn as_str(&self) -> &'static str {
        match self {
            SearchDepth::Basic => "basic",
            SearchDepth::Advanced => "advanced",
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    pub api_key: Option<String>,
    pub endpoint: String,
    pub max_results: u32,
    pub search_depth: SearchDepth,
    pub include_answer: bool,
    pub include_raw_content: bool,
    pub include_images: bool,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            endpoint: "https://api.tavily.com/".into(),
            max_results: 5,
            search_depth: SearchDepth::Advanced,
            include_answer: true,
            include_raw_content: true,
            include_images: false,
        }
    }
}

impl SearchConfig {
    /// The configured key, or `TAVILY_API_KEY` from the environment.
    pub fn resolved_api_key(&self) -> Option<String> {
        resolve_secret(self.api_key.as_deref(), &[TAVILY_API_KEY_ENV])
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ExtractorConfig {
    /// Budget for each fetcher in the extraction chain.
    pub timeout_secs: u64,
    pub preview_chars: usize,
    pub user_agent: String,
    pub browser: BrowserConfig,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 30,
            preview_chars: 500,
            user_agent: DESKTOP_USER_AGENT.into(),
            browser: BrowserConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BrowserStealth {
    Lightweight,
    #[default]
    Balanced,
    Maximum,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BrowserConfig {
    /// Try the WebDriver-rendered fetch before the plain HTTP fallback.
    pub enabled: bool,
    pub webdriver_url: String,
    pub headless: bool,
    pub stealth: BrowserStealth,
    /// Randomized pause before each navigation; `false` navigates at once.
    pub humanize: bool,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            webdriver_url: "http://localhost:9515".into(),
            headless: true,
            stealth: BrowserStealth::Balanced,
            humanize: true,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub format: LogFormat,
    pub emit_stderr: bool,
    pub filter: String,
    pub dir: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            format: LogFormat::Text,
            emit_stderr: false,
            filter: "info".into(),
            dir: None,
        }
    }
}

/// A secret is usable when it is non-blank and has no unexpanded `${...}`.
fn usable_secret(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed.contains("${") {
        None
    } else {
        Some(trimmed.to_string())
    }
}

fn resolve_secret(configured: Option<&str>, env_vars: &[&str]) -> Option<String> {
    configured.and_then(usable_secret).or_else(|| {
        env_vars
            .iter()
            .find_map(|var| std::env::var(var).ok().as_deref().and_then(usable_secret))
    })
}

fn expand_env_in_value(v: &mut Value) {
    match v {
        Value::String(s) => {
            if s.contains('$') {
                let mut cur = std::mem::take(s);
                for _ in 0..MAXIMUM_ENV_EXPANSION_DEPTH {
                    let expanded = match shellexpand::env(&cur) {
                        Ok(cow) => cow.into_owned(),
                        Err(_) => break,
                    };
                    if expanded == cur {
                        break;
                    }
                    cur = expanded;
                }
                *s = cur;
            }
        }
        Value::Array(arr) => arr.iter_mut().for_each(expand_env_in_value),
        Value::Object(obj) => obj.values_mut().for_each(expand_env_in_value),
        _ => {}
    }
}

/// Builder that hides the `config` crate wiring.
pub struct ScoutConfigLoader {
    builder: config::ConfigBuilder<config::builder::DefaultState>,
}

impl Default for ScoutConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl ScoutConfigLoader {
    /// Start empty; `SCOUT__` env overrides are layered on top in [`Self::load`].
    ///
    /// ```
    /// use scout_config::ScoutConfigLoader;
    ///
    /// let config = ScoutConfigLoader::new()
    ///     .with_yaml_str("version: '1'")
    ///     .load()
    ///     .expect("valid config");
    ///
    /// assert_eq!(config.version.as_deref(), Some("1"));
    /// assert_eq!(config.search.max_results, 5);
    /// assert_eq!(config.extractor.timeout_secs, 30);
    /// ```
    pub fn new() -> Self {
        Self {
            builder: Config::builder(),
        }
    }

    /// Attach a required YAML/TOML/JSON file; format is inferred by suffix.
    pub fn with_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.builder = self
            .builder
            .add_source(File::from(path.as_ref()).required(true));
        self
    }

    /// Attach a file that is skipped when absent.
    pub fn with_optional_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.builder = self
            .builder
            .add_source(File::from(path.as_ref()).required(false));
        self
    }

    /// Merge an inline YAML snippet.
    pub fn with_yaml_str(mut self, yaml: &str) -> Self {
        self.builder = self
            .builder
            .add_source(File::from_str(yaml, FileFormat::Yaml));
        self
    }

    /// Locations probed when no explicit `--config` is given: `./scout.yaml`,
    /// then `<config dir>/scout/scout.yaml`.
    pub fn default_paths() -> Vec<PathBuf> {
        let mut paths = vec![PathBuf::from(DEFAULT_CONFIG_FILE)];
        if let Some(dir) = dirs::config_dir() {
            paths.push(dir.join("scout").join(DEFAULT_CONFIG_FILE));
        }
        paths
    }

    /// Consume the builder and deserialize the merged sources.
    ///
    /// ```
    /// use scout_config::{LlmConfig, ScoutConfigLoader};
    ///
    /// let config = ScoutConfigLoader::new()
    ///     .with_yaml_str(r#"
    /// coordinator:
    ///   llm:
    ///     provider: openai
    ///     model: gpt-4o
    /// "#)
    ///     .load()
    ///     .expect("valid configuration");
    ///
    /// match &config.coordinator.llm {
    ///     LlmConfig::Openai { model, endpoint, .. } => {
    ///         assert_eq!(model, "gpt-4o");
    ///         assert_eq!(endpoint, "https://api.openai.com/v1/");
    ///     }
    ///     _ => panic!("expected OpenAI configuration"),
    /// }
    /// ```
    pub fn load(self) -> Result<ScoutConfig, ConfigError> {
        let cfg = self
            .builder
            .add_source(
                Environment::with_prefix("SCOUT")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let mut v: Value = cfg.try_deserialize()?;
        if v.is_null() {
            v = Value::Object(Default::default());
        }
        expand_env_in_value(&mut v);

        serde_json::from_value(v).map_err(|e| ConfigError::Message(e.to_string()))
    }
}

//! Shared types for the Scout workspace.
//!
//! Every other crate depends on this one, so it stays small:
//!
//! - [`ScoutError`] and [`Result`]: the error taxonomy surfaced to callers
//! - [`session::Session`]: per-conversation key/value state shared between agents
//! - [`observability`]: centralised tracing/logging initialisation
//!
//! # Examples
//!
//! ```rust
//! use scout_common::session::Session;
//!
//! let mut session = Session::new();
//! session.store_extracted("https://example.com/post", "body text");
//! assert_eq!(session.extracted("https://example.com/post"), Some("body text"));
//! ```
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub mod observability;
pub mod session;

/// A fetch attempt that failed before the extraction chain gave up.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailedAttempt {
    /// Label of the fetcher that failed (`primary`, `fallback`, ...).
    pub method: String,
    pub reason: String,
}

/// Error types used across the Scout system.
#[derive(thiserror::Error, Debug)]
pub enum ScoutError {
    /// Caller input was empty or malformed. Raised before any I/O.
    #[error("Validation error: {0}")]
    Validation(String),

    /// Network failure, timeout or non-success status while fetching.
    #[error("Fetch error: {0}")]
    Fetch(String),

    /// A document was fetched but nothing extractable was found in it.
    #[error("Parse error: {0}")]
    Parse(String),

    /// The session does not hold what the request refers to.
    #[error("State error: {0}")]
    State(String),

    /// Configuration was incomplete or invalid.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Every fetcher in the extraction chain failed. `cause` is the last
    /// fetcher's error; `attempts` keeps the earlier ones for diagnostics.
    #[error("All extraction methods failed. Last error: {cause}")]
    ExtractionFailed {
        cause: String,
        attempts: Vec<FailedAttempt>,
    },

    /// An LLM provider or agent failed to complete a requested operation.
    #[error("Agent error: {0}")]
    Agent(String),

    /// The browser driver reported an error.
    #[error("Driver error: {0}")]
    Driver(#[from] anyhow::Error),

    /// Operation exceeded its time budget.
    #[error("Timeout occurred after {0:?}")]
    Timeout(Duration),
}

/// Convenient alias for results that use [`ScoutError`].
pub type Result<T> = std::result::Result<T, ScoutError>;

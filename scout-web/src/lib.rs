//! Web discovery and acquisition.
//!
//! - Tavily search API client (`search`)
//! - Page fetchers: WebDriver-rendered markdown (`browser`, behind the
//!   `browser` feature) and plain HTTP + HTML parsing (`fallback`)
//! - The extraction chain that tries fetchers in order and records results
//!   in the caller's session (`extract`)

#[cfg(feature = "browser")]
pub mod browser;
pub mod extract;
pub mod fallback;
pub mod search;

pub use extract::{ContentExtractor, ExtractionMethod, ExtractionResult, FetchedPage, PageFetcher};

pub mod tavily;
pub mod types;

pub use tavily::TavilyClient;
pub use types::{SearchHit, SearchRequest, SearchResponse};

//! search-proxy: a web and code search aggregation proxy
//!
//! Routes web searches to one of several upstream providers by weighted random
//! choice with fallback, or fans out to many at once and merges the results.
//! Code searches combine remote code indexes with a graph search over a local
//! shallow clone of the repository in question.

pub mod code;
pub mod config;
pub mod error;
pub mod network;
pub mod providers;
pub mod results;
pub mod search;
pub mod tools;
pub mod web;

pub use config::Settings;
pub use error::{InputError, ProviderError, RepoError};
pub use providers::{ProviderLoader, ProviderRegistry, SearchProvider};
pub use results::{ResultContainer, SearchResult};
pub use search::{Aggregator, SearchResponse, Selector};
pub use tools::Toolkit;

/// Application version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

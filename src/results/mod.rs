//! Result types and container for search results
//!
//! Every provider normalizes into [`SearchResult`]; the container merges
//! per-provider sets for multi-provider searches.

mod container;
pub mod render;
mod types;

pub use container::ResultContainer;
pub use types::*;

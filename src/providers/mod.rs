//! Upstream providers
//!
//! Every external service is an adapter behind one of the capability traits
//! in [`traits`]. Web search adapters are collected in a [`ProviderRegistry`];
//! code search, Q&A, local graph search and page fetching are wired directly
//! by the code search aggregator and the tool surface.

mod loader;
mod registry;
mod traits;

pub mod brave;
pub mod deepwiki;
pub mod exa;
pub mod exa_mcp;
pub mod grep_app;
pub mod jina;
pub mod noodl;
pub mod perplexity;
pub mod serper;
pub mod tavily;

#[cfg(test)]
pub(crate) mod testing;

pub use loader::ProviderLoader;
pub use registry::ProviderRegistry;
pub use traits::*;

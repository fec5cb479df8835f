//! Web search orchestration
//!
//! Two strategies sit on top of the provider registry: the [`Selector`]
//! picks one provider by weight and falls back in weight order, the
//! [`Aggregator`] fans out to every candidate and merges the results.

mod aggregator;
mod models;
mod selector;

pub use aggregator::Aggregator;
pub use models::*;
pub use selector::{Selector, WeightTable};

use crate::error::{classify, ProviderError};
use crate::providers::SearchProvider;
use crate::results::SearchResult;
use std::sync::Arc;
use tokio::time::timeout;
use tracing::{debug, warn};

/// One provider call under its own deadline, with the failure classified
pub(crate) async fn call_provider(
    provider: Arc<dyn SearchProvider>,
    query: &str,
    max_results: usize,
) -> Result<Vec<SearchResult>, ProviderError> {
    let name = provider.name().to_string();

    let outcome = match timeout(provider.timeout(), provider.search(query, max_results)).await {
        Ok(Ok(results)) => Ok(results),
        Ok(Err(e)) => Err(classify(&name, &e)),
        Err(elapsed) => Err(classify(&name, &elapsed.into())),
    };

    match &outcome {
        Ok(results) => debug!("{} returned {} results", name, results.len()),
        Err(e) => warn!("{} failed: {}", name, e),
    }
    outcome
}

//! Multi-provider fan-out with merge and URL deduplication

use super::{call_provider, SearchResponse};
use crate::error::ProviderError;
use crate::providers::ProviderRegistry;
use crate::results::ResultContainer;
use futures::future::join_all;
use std::sync::Arc;
use std::time::Instant;
use tracing::info;

/// Queries every candidate provider concurrently
#[derive(Clone)]
pub struct Aggregator {
    registry: Arc<ProviderRegistry>,
}

impl Aggregator {
    pub fn new(registry: Arc<ProviderRegistry>) -> Self {
        Self { registry }
    }

    /// Eligible providers, optionally narrowed to `subset`, in registration order
    pub fn candidates(&self, subset: Option<&[String]>) -> Vec<&str> {
        self.registry
            .eligible()
            .into_iter()
            .filter(|name| subset.map_or(true, |wanted| wanted.iter().any(|w| w.as_str() == *name)))
            .collect()
    }

    /// Search all candidates and merge their results in candidate order
    ///
    /// Waits for every task; each is bounded by its provider's own timeout.
    pub async fn search_all(
        &self,
        query: &str,
        max_per_provider: usize,
        subset: Option<&[String]>,
        deduplicate: bool,
    ) -> SearchResponse {
        let started = Instant::now();
        let candidates = self.candidates(subset);

        if candidates.is_empty() {
            return SearchResponse::failed(query, ProviderError::NoneAvailable, vec![], started);
        }

        let futures: Vec<_> = candidates
            .iter()
            .filter_map(|name| self.registry.get(name).cloned())
            .map(|provider| async move {
                let name = provider.name().to_string();
                (name, call_provider(provider, query, max_per_provider).await)
            })
            .collect();

        info!("Executing search on {} providers", futures.len());
        let outcomes = join_all(futures).await;

        let mut container = ResultContainer::new(deduplicate);
        for (name, outcome) in outcomes {
            match outcome {
                Ok(results) => container.add_provider_results(&name, results),
                Err(e) => container.add_error(e),
            }
        }

        info!(
            "{} results from {:?} in {:?}",
            container.result_count(),
            container.providers_used(),
            started.elapsed()
        );
        SearchResponse::from_container(query, container, started)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::testing::{registry, Behavior, StubProvider};
    use std::collections::HashSet;
    use std::time::Duration;

    fn overlapping() -> Aggregator {
        Aggregator::new(registry(&[
            (
                StubProvider::new("serper", Behavior::Urls(vec!["https://a.com", "https://b.com"])),
                42,
            ),
            (
                StubProvider::new("brave", Behavior::Urls(vec!["https://b.com", "https://c.com"])),
                33,
            ),
            (StubProvider::new("tavily", Behavior::Status(401)), 17),
        ]))
    }

    #[tokio::test]
    async fn test_dedupe_keeps_first_seen_in_candidate_order() {
        let response = overlapping().search_all("rust", 10, None, true).await;

        let urls: Vec<_> = response.results.iter().map(|r| r.url.as_str()).collect();
        assert_eq!(urls, vec!["https://a.com", "https://b.com", "https://c.com"]);
        assert_eq!(response.results[1].source, "serper");
        assert_eq!(response.providers_used, vec!["serper", "brave"]);

        let unique: HashSet<_> = urls.iter().collect();
        assert_eq!(unique.len(), urls.len());
        // partial failure does not surface an error when results exist
        assert!(response.error.is_none());
        assert_eq!(response.errors.len(), 1);
    }

    #[tokio::test]
    async fn test_duplicates_preserved_without_dedupe() {
        let response = overlapping().search_all("rust", 10, None, false).await;
        assert_eq!(response.results.len(), 4);
    }

    #[tokio::test]
    async fn test_subset_ignores_unknown_names() {
        let subset = vec!["brave".to_string(), "bing".to_string()];
        let response = overlapping().search_all("rust", 10, Some(subset.as_slice()), true).await;

        assert_eq!(response.providers_used, vec!["brave"]);
        assert_eq!(response.results.len(), 2);
    }

    #[tokio::test]
    async fn test_unknown_subset_is_none_available() {
        let subset = vec!["bing".to_string()];
        let response = overlapping().search_all("rust", 10, Some(subset.as_slice()), true).await;

        assert!(response.is_empty());
        assert_eq!(
            response.error,
            Some(ProviderError::NoneAvailable.to_string())
        );
    }

    #[tokio::test]
    async fn test_all_failing_joins_errors() {
        let aggregator = Aggregator::new(registry(&[
            (StubProvider::new("serper", Behavior::Status(500)), 42),
            (StubProvider::new("brave", Behavior::Hang), 33),
        ]));

        let response = aggregator.search_all("rust", 10, None, true).await;
        let error = response.error.unwrap();

        assert!(response.results.is_empty());
        assert!(error.contains("serper: Server error (500)"));
        assert!(error.contains("brave: Request timed out"));
        assert!(error.contains("; "));
    }

    #[tokio::test]
    async fn test_providers_are_called_concurrently() {
        let names: [&'static str; 6] = ["serper", "brave", "tavily", "perplexity", "exa", "exa_mcp"];
        let stubs: Vec<_> = names
            .into_iter()
            .map(|name| (StubProvider::new(name, Behavior::Hang), 10u32))
            .collect();
        let aggregator = Aggregator::new(registry(&stubs));

        let started = std::time::Instant::now();
        let response = aggregator.search_all("rust", 10, None, true).await;
        let elapsed = started.elapsed();

        // six 50ms timeouts back to back would take at least 300ms
        assert!(elapsed < Duration::from_millis(200), "took {:?}", elapsed);
        assert_eq!(response.errors.len(), names.len());
        assert!(response
            .errors
            .iter()
            .all(|e| matches!(e, ProviderError::Timeout { .. })));
        assert!(stubs.iter().all(|(stub, _)| stub.calls() == 1));
    }

    #[tokio::test]
    async fn test_empty_without_errors_is_not_an_error() {
        let aggregator = Aggregator::new(registry(&[(
            StubProvider::new("serper", Behavior::Urls(vec![])),
            42,
        )]));

        let response = aggregator.search_all("rust", 10, None, true).await;
        assert!(response.is_empty());
        assert!(response.error.is_none());
        assert!(response.providers_used.is_empty());
    }
}

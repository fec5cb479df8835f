//! Single-provider selection: weighted random pick, then fallback by weight

use super::{call_provider, SearchResponse};
use crate::error::ProviderError;
use crate::providers::ProviderRegistry;
use crate::results::ResultContainer;
use rand::seq::SliceRandom;
use rand::Rng;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

/// Weights of the providers eligible for one request, in registration order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WeightTable {
    entries: Vec<(String, u32)>,
}

impl WeightTable {
    pub fn new(entries: Vec<(String, u32)>) -> Self {
        Self { entries }
    }

    /// Snapshot of the currently eligible providers
    pub fn from_registry(registry: &ProviderRegistry) -> Self {
        Self::new(registry.weights())
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn total_weight(&self) -> u64 {
        self.entries.iter().map(|(_, w)| u64::from(*w)).sum()
    }

    /// Draw one provider with probability proportional to its weight
    ///
    /// When every weight is zero the draw is uniform.
    pub fn weighted_choice<R: Rng>(&self, rng: &mut R) -> Option<&str> {
        let total = self.total_weight();
        if total == 0 {
            return self.entries.choose(rng).map(|(name, _)| name.as_str());
        }

        let draw = rng.gen_range(0..total);
        let mut cumulative = 0u64;
        for (name, weight) in &self.entries {
            cumulative += u64::from(*weight);
            if cumulative > draw {
                return Some(name.as_str());
            }
        }
        None
    }

    /// Names by descending weight; ties keep table order
    pub fn fallback_order(&self) -> Vec<&str> {
        let mut ordered: Vec<&(String, u32)> = self.entries.iter().collect();
        ordered.sort_by(|a, b| b.1.cmp(&a.1));
        ordered.into_iter().map(|(name, _)| name.as_str()).collect()
    }

    /// `first`, then the fallback order without `first`
    pub fn try_sequence<'a>(&'a self, first: &'a str) -> Vec<&'a str> {
        std::iter::once(first)
            .chain(self.fallback_order().into_iter().filter(|name| *name != first))
            .collect()
    }
}

/// Searches one provider at a time until one succeeds
#[derive(Clone)]
pub struct Selector {
    registry: Arc<ProviderRegistry>,
}

impl Selector {
    pub fn new(registry: Arc<ProviderRegistry>) -> Self {
        Self { registry }
    }

    /// Search the drawn provider, falling back through the rest by weight
    ///
    /// An empty weight table is reported as not configured without trying
    /// anything. When every candidate fails the last error is reported.
    pub async fn select_and_search(&self, query: &str, max_results: usize) -> SearchResponse {
        let started = Instant::now();
        let table = WeightTable::from_registry(&self.registry);

        let Some(first) = table.weighted_choice(&mut rand::thread_rng()) else {
            return SearchResponse::failed(query, ProviderError::NotConfigured, vec![], started);
        };
        let sequence = table.try_sequence(first);
        debug!("provider try sequence: {:?}", sequence);

        let mut errors = Vec::new();
        for name in sequence {
            let Some(provider) = self.registry.get(name) else {
                continue;
            };

            match call_provider(provider.clone(), query, max_results).await {
                Ok(results) => {
                    info!("search served by {} in {:?}", name, started.elapsed());
                    let mut container = ResultContainer::new(false);
                    container.add_provider_results(name, results);
                    let mut response = SearchResponse::from_container(query, container, started);
                    // a successful provider counts as used even with zero results
                    response.providers_used = vec![name.to_string()];
                    response.errors = errors;
                    return response;
                }
                Err(e) => errors.push(e),
            }
        }

        match errors.last().cloned() {
            Some(last) => SearchResponse::failed(query, last, errors, started),
            None => SearchResponse::failed(query, ProviderError::NotConfigured, errors, started),
        }
    }
}

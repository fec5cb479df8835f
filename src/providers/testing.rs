//! In-process provider doubles for unit tests

use super::registry::ProviderRegistry;
use super::traits::{ProviderAbout, SearchProvider};
use crate::config::ProviderConfig;
use crate::error::HttpStatusError;
use crate::results::SearchResult;
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

pub enum Behavior {
    /// Return results for these URLs
    Urls(Vec<&'static str>),
    /// Fail with an HTTP status
    Status(u16),
    /// Sleep past the timeout
    Hang,
}

pub struct StubProvider {
    pub name: &'static str,
    pub behavior: Behavior,
    pub calls: AtomicUsize,
}

impl StubProvider {
    pub fn new(name: &'static str, behavior: Behavior) -> Arc<Self> {
        Arc::new(Self {
            name,
            behavior,
            calls: AtomicUsize::new(0),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SearchProvider for StubProvider {
    fn name(&self) -> &str {
        self.name
    }

    fn about(&self) -> ProviderAbout {
        ProviderAbout::new().api_key_required(false)
    }

    fn timeout(&self) -> Duration {
        Duration::from_millis(50)
    }

    async fn search(&self, _query: &str, max_results: usize) -> anyhow::Result<Vec<SearchResult>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.behavior {
            Behavior::Urls(urls) => Ok(urls
                .iter()
                .take(max_results)
                .filter_map(|url| SearchResult::new(format!("{} result", self.name), *url, "", self.name))
                .collect()),
            Behavior::Status(status) => Err(HttpStatusError { status: *status }.into()),
            Behavior::Hang => {
                tokio::time::sleep(Duration::from_secs(5)).await;
                Ok(vec![])
            }
        }
    }
}

/// Registry of stubs, each registered with the given weight
pub fn registry(stubs: &[(Arc<StubProvider>, u32)]) -> Arc<ProviderRegistry> {
    let mut registry = ProviderRegistry::new();
    for (stub, weight) in stubs {
        registry.register(stub.clone(), ProviderConfig::new(stub.name, *weight));
    }
    Arc::new(registry)
}

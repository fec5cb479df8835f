//! Perplexity search provider implementation

use super::traits::*;
use crate::network::{HttpClient, ProviderRequest};
use crate::results::SearchResult;
use anyhow::Result;
use async_trait::async_trait;
use serde_json::json;
use std::time::Duration;

/// Perplexity search API provider
pub struct Perplexity {
    client: HttpClient,
    keys: KeyRing,
    api_url: String,
    timeout: Duration,
}

impl Perplexity {
    pub fn new(client: HttpClient, keys: KeyRing, timeout: Duration) -> Self {
        Self {
            client,
            keys,
            api_url: "https://api.perplexity.ai/search".to_string(),
            timeout,
        }
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_url = url.into();
        self
    }
}

#[async_trait]
impl SearchProvider for Perplexity {
    fn name(&self) -> &str {
        "perplexity"
    }

    fn about(&self) -> ProviderAbout {
        ProviderAbout::new()
            .api_key_required(true)
    }

    fn timeout(&self) -> Duration {
        self.timeout
    }

    async fn search(&self, query: &str, max_results: usize) -> Result<Vec<SearchResult>> {
        let key = self.keys.pick(self.name())?;

        let request = ProviderRequest::post(&self.api_url)
            .header("Authorization", format!("Bearer {}", key))
            .header("Accept", "application/json")
            .json(json!({ "query": query, "max_results": max_results }));

        let response = self
            .client
            .execute_with_timeout(request, self.timeout)
            .await?
            .error_for_status()?;
        let data: serde_json::Value = response.json()?;

        Ok(json_items(&data, &["results"])
            .iter()
            .filter_map(|item| {
                SearchResult::from_json(
                    item,
                    &["title"],
                    &["url"],
                    &["snippet", "content"],
                    self.name(),
                )
            })
            .collect())
    }
}

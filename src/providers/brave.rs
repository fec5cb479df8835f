//! Brave Search API provider implementation

use super::traits::*;
use crate::network::{HttpClient, ProviderRequest};
use crate::results::SearchResult;
use anyhow::Result;
use async_trait::async_trait;
use std::time::Duration;

/// Brave web search provider
pub struct Brave {
    client: HttpClient,
    keys: KeyRing,
    api_url: String,
    timeout: Duration,
}

impl Brave {
    pub fn new(client: HttpClient, keys: KeyRing, timeout: Duration) -> Self {
        Self {
            client,
            keys,
            api_url: "https://api.search.brave.com/res/v1/web/search".to_string(),
            timeout,
        }
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_url = url.into();
        self
    }

    fn parse_results(&self, data: &serde_json::Value) -> Vec<SearchResult> {
        json_items(data, &["web", "results"])
            .iter()
            .filter_map(|item| {
                SearchResult::from_json(item, &["title"], &["url"], &["description"], self.name())
            })
            .collect()
    }
}

#[async_trait]
impl SearchProvider for Brave {
    fn name(&self) -> &str {
        "brave"
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

        let request = ProviderRequest::get(&self.api_url)
            .header("X-Subscription-Token", key)
            .header("Accept", "application/json")
            .param("q", query)
            .param("count", max_results.to_string());

        let response = self
            .client
            .execute_with_timeout(request, self.timeout)
            .await?
            .error_for_status()?;
        let data: serde_json::Value = response.json()?;

        Ok(self.parse_results(&data))
    }
}

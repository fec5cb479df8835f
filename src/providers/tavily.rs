//! Tavily search provider implementation

use super::traits::*;
use crate::network::{HttpClient, ProviderRequest};
use crate::results::SearchResult;
use anyhow::Result;
use async_trait::async_trait;
use serde_json::json;
use std::time::Duration;

/// Tavily search provider
///
/// Several keys may be configured; one is picked at random per request.
pub struct Tavily {
    client: HttpClient,
    keys: KeyRing,
    api_url: String,
    timeout: Duration,
}

impl Tavily {
    pub fn new(client: HttpClient, keys: KeyRing, timeout: Duration) -> Self {
        Self {
            client,
            keys,
            api_url: "https://api.tavily.com/search".to_string(),
            timeout,
        }
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_url = url.into();
        self
    }
}

#[async_trait]
impl SearchProvider for Tavily {
    fn name(&self) -> &str {
        "tavily"
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

        let request = ProviderRequest::post(&self.api_url).json(json!({
            "api_key": key,
            "query": query,
            "max_results": max_results,
            "include_answer": false,
            "include_raw_content": false,
        }));

        let response = self
            .client
            .execute_with_timeout(request, self.timeout)
            .await?
            .error_for_status()?;
        let data: serde_json::Value = response.json()?;

        Ok(json_items(&data, &["results"])
            .iter()
            .filter_map(|item| {
                SearchResult::from_json(item, &["title"], &["url"], &["content"], self.name())
            })
            .collect())
    }
}

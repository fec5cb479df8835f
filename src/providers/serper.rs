//! Serper (Google results) provider implementation

use super::traits::*;
use crate::network::{HttpClient, ProviderRequest};
use crate::results::SearchResult;
use anyhow::Result;
use async_trait::async_trait;
use serde_json::json;
use std::time::Duration;

/// Serper.dev search provider
pub struct Serper {
    client: HttpClient,
    keys: KeyRing,
    api_url: String,
    timeout: Duration,
}

impl Serper {
    pub fn new(client: HttpClient, keys: KeyRing, timeout: Duration) -> Self {
        Self {
            client,
            keys,
            api_url: "https://google.serper.dev/search".to_string(),
            timeout,
        }
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_url = url.into();
        self
    }

    fn parse_results(&self, data: &serde_json::Value) -> Vec<SearchResult> {
        json_items(data, &["organic"])
            .iter()
            .filter_map(|item| {
                SearchResult::from_json(item, &["title"], &["link"], &["snippet"], self.name())
            })
            .collect()
    }
}

#[async_trait]
impl SearchProvider for Serper {
    fn name(&self) -> &str {
        "serper"
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
            .header("X-API-KEY", key)
            .json(json!({ "q": query, "num": max_results }));

        let response = self
            .client
            .execute_with_timeout(request, self.timeout)
            .await?
            .error_for_status()?;
        let data: serde_json::Value = response.json()?;

        Ok(self.parse_results(&data))
    }
}

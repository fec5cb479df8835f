//! Exa search provider using the official keyed API

use super::traits::*;
use crate::network::{HttpClient, ProviderRequest};
use crate::results::{truncate_chars, SearchResult, MAX_CONTENT_CHARS};
use anyhow::Result;
use async_trait::async_trait;
use serde_json::json;
use std::time::Duration;

/// Exa.ai search provider (requires an API key; see `exa_mcp` for the keyless endpoint)
pub struct Exa {
    client: HttpClient,
    keys: KeyRing,
    api_url: String,
    timeout: Duration,
}

impl Exa {
    pub fn new(client: HttpClient, keys: KeyRing, timeout: Duration) -> Self {
        Self {
            client,
            keys,
            api_url: "https://api.exa.ai/search".to_string(),
            timeout,
        }
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_url = url.into();
        self
    }

    fn parse_results(&self, data: &serde_json::Value) -> Vec<SearchResult> {
        json_items(data, &["results"])
            .iter()
            .filter_map(|item| {
                SearchResult::from_json(item, &["title"], &["url"], &["text", "snippet"], self.name())
            })
            .map(|mut result| {
                result.content = truncate_chars(&result.content, MAX_CONTENT_CHARS).to_string();
                result
            })
            .collect()
    }
}

#[async_trait]
impl SearchProvider for Exa {
    fn name(&self) -> &str {
        "exa"
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
            .header("x-api-key", key)
            .json(json!({
                "query": query,
                "numResults": max_results,
                "type": "auto",
                "useAutoprompt": true,
                "contents": { "text": { "maxCharacters": MAX_CONTENT_CHARS } },
            }));

        let response = self
            .client
            .execute_with_timeout(request, self.timeout)
            .await?
            .error_for_status()?;
        let data: serde_json::Value = response.json()?;

        Ok(self.parse_results(&data))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_truncated() {
        let exa = Exa::new(HttpClient::new().unwrap(), KeyRing::default(), DEFAULT_TIMEOUT);
        let data = json!({"results": [
            {"title": "Long", "url": "https://a.com", "text": "x".repeat(800)},
            {"title": "Snippet", "url": "https://b.com", "snippet": "short"}
        ]});

        let results = exa.parse_results(&data);
        assert_eq!(results[0].content.len(), MAX_CONTENT_CHARS);
        assert_eq!(results[1].content, "short");
    }
}

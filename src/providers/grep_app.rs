//! grep.app full-text code search across public GitHub repositories

use super::traits::*;
use crate::network::{HttpClient, ProviderRequest};
use crate::results::SearchResult;
use anyhow::Result;
use async_trait::async_trait;
use std::time::Duration;

/// grep.app code search provider
pub struct GrepApp {
    client: HttpClient,
    api_url: String,
    timeout: Duration,
}

impl GrepApp {
    pub fn new(client: HttpClient, timeout: Duration) -> Self {
        Self {
            client,
            api_url: "https://grep.app/api/search".to_string(),
            timeout,
        }
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_url = url.into();
        self
    }

    fn parse_hits(
        &self,
        data: &serde_json::Value,
        scope: Option<&str>,
        limit: usize,
    ) -> Vec<SearchResult> {
        let str_field = |hit: &serde_json::Value, key: &str| {
            hit.get(key)
                .and_then(|v| v.as_str())
                .unwrap_or_default()
                .to_string()
        };

        json_items(data, &["hits", "hits"])
            .iter()
            .filter(|hit| scope.map_or(true, |repo| hit.get("repo").and_then(|r| r.as_str()) == Some(repo)))
            .filter_map(|hit| {
                let repo = str_field(hit, "repo");
                let path = str_field(hit, "path");
                if repo.is_empty() || path.is_empty() {
                    return None;
                }
                let branch = hit
                    .get("branch")
                    .and_then(|b| b.as_str())
                    .filter(|b| !b.is_empty())
                    .unwrap_or("master");
                let snippet = hit
                    .get("content")
                    .and_then(|c| c.get("snippet"))
                    .and_then(|s| s.as_str())
                    .unwrap_or_default()
                    .trim();

                SearchResult::new(
                    format!("{}/{}", repo, path),
                    format!("https://github.com/{}/blob/{}/{}", repo, branch, path),
                    snippet,
                    "grep_app",
                )
            })
            .take(limit)
            .collect()
    }
}

#[async_trait]
impl CodeSearchProvider for GrepApp {
    fn name(&self) -> &str {
        "grep_app"
    }

    fn timeout(&self) -> Duration {
        self.timeout
    }

    async fn code_search(
        &self,
        query: &str,
        scope: Option<&str>,
        limit: usize,
    ) -> Result<Vec<SearchResult>> {
        let mut request = ProviderRequest::get(&self.api_url).param("q", query);
        if let Some(repo) = scope {
            request = request.param("f.repo.pattern", repo);
        }

        let response = self
            .client
            .execute_with_timeout(request, self.timeout)
            .await?
            .error_for_status()?;
        let data: serde_json::Value = response.json()?;

        Ok(self.parse_hits(&data, scope, limit))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn hits() -> serde_json::Value {
        json!({"hits": {"hits": [
            {"repo": "tokio-rs/tokio", "branch": "main", "path": "tokio/src/lib.rs",
             "content": {"snippet": "  pub mod runtime;  "}},
            {"repo": "rust-lang/rust", "path": "library/std/src/lib.rs",
             "content": {"snippet": "std"}},
            {"repo": "tokio-rs/tokio", "path": ""}
        ]}})
    }

    #[test]
    fn test_parse_hits_builds_blob_urls() {
        let grep = GrepApp::new(HttpClient::new().unwrap(), DEFAULT_TIMEOUT);
        let results = grep.parse_hits(&hits(), None, 10);

        assert_eq!(results.len(), 2);
        assert_eq!(results[0].title, "tokio-rs/tokio/tokio/src/lib.rs");
        assert_eq!(
            results[0].url,
            "https://github.com/tokio-rs/tokio/blob/main/tokio/src/lib.rs"
        );
        assert_eq!(results[0].content, "pub mod runtime;");
        // missing branch defaults to master
        assert!(results[1].url.contains("/blob/master/"));
    }

    #[test]
    fn test_parse_hits_scoped_and_limited() {
        let grep = GrepApp::new(HttpClient::new().unwrap(), DEFAULT_TIMEOUT);
        let scoped = grep.parse_hits(&hits(), Some("rust-lang/rust"), 10);
        assert_eq!(scoped.len(), 1);
        assert_eq!(scoped[0].source, "grep_app");

        assert_eq!(grep.parse_hits(&hits(), None, 1).len(), 1);
    }
}

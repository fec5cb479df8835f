//! Provider capability traits and shared types
//!
//! Capabilities are separate traits so each orchestration site depends only on
//! what it calls: web search, code search, repository Q&A, local graph search
//! or page fetching.

use crate::results::SearchResult;
use async_trait::async_trait;
use rand::seq::SliceRandom;
use std::path::Path;
use std::time::Duration;

/// Default per-call timeout for web search providers
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Provider metadata
#[derive(Debug, Clone, Default)]
pub struct ProviderAbout {
    /// Whether an API key is required
    pub require_api_key: bool,
}

impl ProviderAbout {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn api_key_required(mut self, required: bool) -> Self {
        self.require_api_key = required;
        self
    }
}

/// Web search capability, implemented by every selectable provider
#[async_trait]
pub trait SearchProvider: Send + Sync {
    /// Provider name, matches the registration key
    fn name(&self) -> &str;

    /// Provider metadata
    fn about(&self) -> ProviderAbout {
        ProviderAbout::default()
    }

    /// Deadline applied by the orchestrator around each `search` call
    fn timeout(&self) -> Duration {
        DEFAULT_TIMEOUT
    }

    /// Run a search and normalize the results
    ///
    /// Items without a URL are dropped, never reported as errors. Non-2xx
    /// replies surface as [`crate::error::HttpStatusError`].
    async fn search(&self, query: &str, max_results: usize) -> anyhow::Result<Vec<SearchResult>>;
}

/// Code-oriented search, optionally scoped to one `owner/name` repository
#[async_trait]
pub trait CodeSearchProvider: Send + Sync {
    fn name(&self) -> &str;

    fn timeout(&self) -> Duration {
        DEFAULT_TIMEOUT
    }

    /// `limit` is the provider's budget: a result count or a token budget.
    async fn code_search(
        &self,
        query: &str,
        scope: Option<&str>,
        limit: usize,
    ) -> anyhow::Result<Vec<SearchResult>>;
}

/// Free-text question answering over one repository
#[async_trait]
pub trait QuestionAnswerProvider: Send + Sync {
    fn name(&self) -> &str;

    fn timeout(&self) -> Duration {
        DEFAULT_TIMEOUT
    }

    /// Answer `question` about the `owner/name` repository
    async fn ask(&self, question: &str, scope: &str) -> anyhow::Result<String>;
}

/// Graph/symbol search over a local working copy
///
/// Calls block (they run a subprocess), so callers move them off the runtime.
pub trait LocalCodeSearch: Send + Sync {
    fn name(&self) -> &str;

    /// Whether the executable dependency is present on this host
    fn is_available(&self) -> bool;

    fn search_local(
        &self,
        query: &str,
        repo_path: &Path,
        limit: usize,
    ) -> anyhow::Result<Vec<SearchResult>>;
}

/// Extracted page content
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FetchedPage {
    pub url: String,
    pub title: String,
    pub content: String,
}

/// Webpage/PDF content extraction
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> anyhow::Result<FetchedPage>;
}

/// API keys of one provider, rotated at random per request
#[derive(Debug, Clone, Default)]
pub struct KeyRing {
    keys: Vec<String>,
}

impl KeyRing {
    pub fn new(keys: Vec<String>) -> Self {
        Self { keys }
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Pick a key, or fail with a message naming the missing variable
    pub fn pick(&self, provider: &str) -> anyhow::Result<&str> {
        self.keys
            .choose(&mut rand::thread_rng())
            .map(|k| k.as_str())
            .ok_or_else(|| {
                anyhow::anyhow!(
                    "API key is required (set {}_API_KEY)",
                    provider.to_uppercase()
                )
            })
    }
}

/// JSON array at `path` inside `value`, or empty when any segment is missing
pub fn json_items<'a>(value: &'a serde_json::Value, path: &[&str]) -> &'a [serde_json::Value] {
    let mut current = value;
    for key in path {
        match current.get(*key) {
            Some(next) => current = next,
            None => return &[],
        }
    }
    current.as_array().map(|a| a.as_slice()).unwrap_or(&[])
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_keyring_pick() {
        let ring = KeyRing::new(vec!["a".into(), "b".into()]);
        for _ in 0..20 {
            let key = ring.pick("tavily").unwrap();
            assert!(key == "a" || key == "b");
        }
    }

    #[test]
    fn test_empty_keyring_names_variable() {
        let err = KeyRing::default().pick("serper").unwrap_err();
        assert!(err.to_string().contains("SERPER_API_KEY"));
    }

    #[test]
    fn test_json_items() {
        let value = json!({"web": {"results": [1, 2]}});
        assert_eq!(json_items(&value, &["web", "results"]).len(), 2);
        assert!(json_items(&value, &["web", "missing"]).is_empty());
        assert!(json_items(&value, &["web"]).is_empty());
    }

    #[test]
    fn test_about_builder() {
        let about = ProviderAbout::new().api_key_required(true);
        assert!(about.require_api_key);
        assert!(!ProviderAbout::default().require_api_key);
    }
}

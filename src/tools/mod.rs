//! Tool operations: `search_web`, `search_code` and `fetch_webpage`
//!
//! Each tool validates its arguments, runs the matching orchestrator and
//! renders the outcome as text. Upstream failures become `**Error:**` text;
//! only invalid arguments are returned as errors.

use crate::code::CodeSearch;
use crate::config::Settings;
use crate::error::{classify, InputError, ProviderError};
use crate::network::HttpClient;
use crate::providers::jina::Jina;
use crate::providers::{PageFetcher, ProviderRegistry};
use crate::results::render;
use crate::search::{Aggregator, ProviderSelection, SearchResponse, Selector};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

pub const MAX_QUERY_CHARS: usize = 500;
pub const MAX_RESULTS_LIMIT: usize = 50;
pub const DEFAULT_MAX_RESULTS: usize = 10;

/// Output format for `search_web`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseFormat {
    #[default]
    Markdown,
    Json,
}

/// Everything the tools need, built once at startup
#[derive(Clone)]
pub struct Toolkit {
    registry: Arc<ProviderRegistry>,
    selector: Selector,
    aggregator: Aggregator,
    code: CodeSearch,
    fetcher: Arc<dyn PageFetcher>,
}

impl Toolkit {
    pub fn new(
        registry: Arc<ProviderRegistry>,
        code: CodeSearch,
        fetcher: Arc<dyn PageFetcher>,
    ) -> Self {
        Self {
            selector: Selector::new(registry.clone()),
            aggregator: Aggregator::new(registry.clone()),
            registry,
            code,
            fetcher,
        }
    }

    /// Standard wiring: code sources and the Jina reader from `settings`
    pub fn from_settings(
        settings: &Settings,
        client: &HttpClient,
        registry: Arc<ProviderRegistry>,
    ) -> Self {
        let jina_key = settings
            .get_provider("jina")
            .filter(|c| c.enabled)
            .and_then(|c| c.credentials().into_iter().next());
        let fetcher = Jina::new(
            client.clone(),
            jina_key,
            Duration::from_secs_f64(settings.outgoing.fetch_timeout),
        );

        Self::new(
            registry,
            CodeSearch::from_settings(settings, client),
            Arc::new(fetcher),
        )
    }

    pub fn registry(&self) -> &ProviderRegistry {
        &self.registry
    }

    /// Run a web search with the given provider selector
    pub async fn run_web_search(
        &self,
        query: &str,
        max_results: usize,
        selection: &ProviderSelection,
    ) -> SearchResponse {
        match selection {
            ProviderSelection::Auto => self.selector.select_and_search(query, max_results).await,
            ProviderSelection::All => self.aggregator.search_all(query, max_results, None, true).await,
            ProviderSelection::Subset(names) => {
                self.aggregator
                    .search_all(query, max_results, Some(names.as_slice()), true)
                    .await
            }
        }
    }

    /// `search_web(query, max_results, provider)`
    ///
    /// In multi-provider mode `max_results` applies per provider.
    pub async fn search_web(
        &self,
        query: &str,
        max_results: usize,
        provider: &str,
        format: ResponseFormat,
    ) -> Result<String, InputError> {
        let query = validate_query(query)?;
        if !(1..=MAX_RESULTS_LIMIT).contains(&max_results) {
            return Err(InputError::MaxResults {
                got: max_results,
                max: MAX_RESULTS_LIMIT,
            });
        }

        let selection = ProviderSelection::parse(provider);
        let response = self.run_web_search(query, max_results, &selection).await;
        info!(
            "search_web: {} results via {:?} in {}ms",
            response.results.len(),
            response.providers_used,
            response.elapsed_ms
        );

        Ok(match format {
            ResponseFormat::Markdown => {
                render::markdown(&response.results, response.error.as_deref())
            }
            ResponseFormat::Json => render::json(&response),
        })
    }

    /// `search_code(query, repo?)`
    pub async fn search_code(&self, query: &str, repo: Option<&str>) -> Result<String, InputError> {
        let query = validate_query(query)?;
        let repo = repo.map(str::trim).filter(|r| !r.is_empty());

        match self.code.search_code(query, repo).await {
            Ok(report) => Ok(report),
            Err(e) => {
                warn!("search_code failed: {}", e);
                Ok(render::error_text(&e.to_string()))
            }
        }
    }

    /// `fetch_webpage(url)`: page content as markdown, titled when possible
    pub async fn fetch_webpage(&self, url: &str) -> Result<String, InputError> {
        let url = url.trim();
        match url::Url::parse(url) {
            Ok(parsed) if matches!(parsed.scheme(), "http" | "https") => {}
            _ => return Err(InputError::InvalidUrl(url.to_string())),
        }

        match self.fetcher.fetch(url).await {
            Ok(page) if !page.title.is_empty() => Ok(format!("# {}\n\n{}", page.title, page.content)),
            Ok(page) => Ok(page.content),
            Err(e) => {
                warn!("fetch_webpage {} failed: {}", url, e);
                Ok(render::error_text(&fetch_error_message(&e)))
            }
        }
    }
}

fn validate_query(query: &str) -> Result<&str, InputError> {
    let query = query.trim();
    if query.is_empty() {
        return Err(InputError::EmptyQuery);
    }
    let len = query.chars().count();
    if len > MAX_QUERY_CHARS {
        return Err(InputError::QueryTooLong {
            len,
            max: MAX_QUERY_CHARS,
        });
    }
    Ok(query)
}

fn fetch_error_message(err: &anyhow::Error) -> String {
    match classify("jina", err) {
        ProviderError::Transport { status: 429, .. } => {
            "Rate limit exceeded (20 RPM without API key)".to_string()
        }
        ProviderError::Transport { status, .. } => format!("HTTP {}", status),
        ProviderError::Timeout { .. } => "Request timed out".to_string(),
        _ => err.to_string(),
    }
}

/// Tool descriptors with their argument schemas
pub fn descriptors() -> serde_json::Value {
    json!([
        {
            "name": "search_web",
            "description": "Search the web using weighted provider selection with fallback, or several providers at once.",
            "input_schema": {
                "type": "object",
                "properties": {
                    "query": { "type": "string", "minLength": 1, "maxLength": MAX_QUERY_CHARS },
                    "max_results": { "type": "integer", "minimum": 1, "maximum": MAX_RESULTS_LIMIT, "default": DEFAULT_MAX_RESULTS },
                    "provider": { "type": "string", "description": "auto (default), multi/all, a provider name, or a comma-separated list" },
                    "format": { "type": "string", "enum": ["markdown", "json"], "default": "markdown" }
                },
                "required": ["query"]
            }
        },
        {
            "name": "search_code",
            "description": "Search code across Exa code context, DeepWiki, grep.app and Noodl.",
            "input_schema": {
                "type": "object",
                "properties": {
                    "query": { "type": "string", "minLength": 1, "maxLength": MAX_QUERY_CHARS },
                    "repo": { "type": "string", "description": "Git URL or owner/repo to scope results" }
                },
                "required": ["query"]
            }
        },
        {
            "name": "fetch_webpage",
            "description": "Fetch and extract content from a webpage or PDF.",
            "input_schema": {
                "type": "object",
                "properties": { "url": { "type": "string" } },
                "required": ["url"]
            }
        }
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::code::RepoCache;
    use crate::error::HttpStatusError;
    use crate::providers::testing::{registry, Behavior, StubProvider};
    use crate::providers::FetchedPage;
    use async_trait::async_trait;

    struct StaticPage(Result<FetchedPage, u16>);

    #[async_trait]
    impl PageFetcher for StaticPage {
        async fn fetch(&self, url: &str) -> anyhow::Result<FetchedPage> {
            match &self.0 {
                Ok(page) => Ok(FetchedPage {
                    url: url.to_string(),
                    ..page.clone()
                }),
                Err(status) => Err(HttpStatusError { status: *status }.into()),
            }
        }
    }

    fn toolkit(fetch: Result<FetchedPage, u16>) -> Toolkit {
        let providers = registry(&[
            (StubProvider::new("serper", Behavior::Urls(vec!["https://a.com"])), 42),
            (StubProvider::new("brave", Behavior::Urls(vec!["https://a.com", "https://b.com"])), 33),
        ]);
        Toolkit::new(
            providers,
            CodeSearch::new(RepoCache::new(std::env::temp_dir().join("search-proxy-tool-tests"))),
            Arc::new(StaticPage(fetch)),
        )
    }

    #[tokio::test]
    async fn test_search_web_validates_input() {
        let tools = toolkit(Err(500));
        assert_eq!(
            tools.search_web("   ", 10, "auto", ResponseFormat::Markdown).await,
            Err(InputError::EmptyQuery)
        );
        assert!(matches!(
            tools.search_web(&"q".repeat(501), 10, "auto", ResponseFormat::Markdown).await,
            Err(InputError::QueryTooLong { len: 501, .. })
        ));
        assert!(matches!(
            tools.search_web("rust", 0, "auto", ResponseFormat::Markdown).await,
            Err(InputError::MaxResults { got: 0, .. })
        ));
        assert!(tools.search_web("rust", 51, "auto", ResponseFormat::Markdown).await.is_err());
    }

    #[tokio::test]
    async fn test_search_web_multi_dedupes() {
        let tools = toolkit(Err(500));
        let text = tools
            .search_web("rust", 10, "multi", ResponseFormat::Json)
            .await
            .unwrap();
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["results"].as_array().unwrap().len(), 2);
        assert_eq!(value["providers_used"], serde_json::json!(["serper", "brave"]));
        assert!(value["elapsed_ms"].is_u64());
    }

    #[tokio::test]
    async fn test_search_web_unknown_subset_reports_error() {
        let tools = toolkit(Err(500));
        let text = tools
            .search_web("rust", 10, "bing", ResponseFormat::Markdown)
            .await
            .unwrap();
        assert_eq!(
            text,
            "**Error:** No search providers available. Please configure API keys."
        );
    }

    #[tokio::test]
    async fn test_search_web_auto_renders_markdown() {
        let tools = toolkit(Err(500));
        let text = tools
            .search_web("rust", 10, "auto", ResponseFormat::Markdown)
            .await
            .unwrap();
        assert!(text.starts_with("## 1. "));
        assert!(text.contains("**URL:** https://a.com"));
    }

    #[tokio::test]
    async fn test_search_code_invalid_repo_is_rendered() {
        let tools = toolkit(Err(500));
        let text = tools.search_code("spawn", Some("../etc")).await.unwrap();
        assert!(text.starts_with("**Error:** Invalid repository reference"));
    }

    #[tokio::test]
    async fn test_fetch_webpage() {
        let page = FetchedPage {
            url: String::new(),
            title: "Example".into(),
            content: "# Example\n\nbody".into(),
        };
        let text = toolkit(Ok(page)).fetch_webpage("https://example.com").await.unwrap();
        assert!(text.starts_with("# Example\n\n"));

        let text = toolkit(Err(429)).fetch_webpage("https://example.com").await.unwrap();
        assert_eq!(text, "**Error:** Rate limit exceeded (20 RPM without API key)");

        let text = toolkit(Err(404)).fetch_webpage("https://example.com").await.unwrap();
        assert_eq!(text, "**Error:** HTTP 404");

        assert!(matches!(
            toolkit(Err(500)).fetch_webpage("file:///etc/passwd").await,
            Err(InputError::InvalidUrl(_))
        ));
    }

    #[test]
    fn test_descriptors_list_every_tool() {
        let names: Vec<String> = descriptors()
            .as_array()
            .unwrap()
            .iter()
            .map(|d| d["name"].as_str().unwrap().to_string())
            .collect();
        assert_eq!(names, vec!["search_web", "search_code", "fetch_webpage"]);
    }
}

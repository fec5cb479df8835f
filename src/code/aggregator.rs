//! Multi-source code search report
//!
//! Sources run concurrently; their sections are emitted in a fixed order:
//! code context, repository Q&A, full-text search, local graph search.

use super::repo::{resolve, RepoCache};
use crate::config::Settings;
use crate::error::RepoError;
use crate::network::HttpClient;
use crate::providers::deepwiki::DeepWiki;
use crate::providers::exa_mcp::ExaMcp;
use crate::providers::grep_app::GrepApp;
use crate::providers::noodl::Noodl;
use crate::providers::{CodeSearchProvider, LocalCodeSearch, QuestionAnswerProvider};
use crate::results::render::{section, NO_RESULTS};
use crate::results::SearchResult;
use std::future::Future;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Result budgets handed to each source
#[derive(Debug, Clone, Copy)]
pub struct SourceLimits {
    pub context_tokens: usize,
    pub full_text_results: usize,
    pub graph_results: usize,
}

impl Default for SourceLimits {
    fn default() -> Self {
        Self {
            context_tokens: 50_000,
            full_text_results: 10,
            graph_results: 10,
        }
    }
}

/// Code search over every configured source
#[derive(Clone)]
pub struct CodeSearch {
    cache: RepoCache,
    limits: SourceLimits,
    context: Option<Arc<dyn CodeSearchProvider>>,
    answers: Option<Arc<dyn QuestionAnswerProvider>>,
    full_text: Option<Arc<dyn CodeSearchProvider>>,
    graph: Option<Arc<dyn LocalCodeSearch>>,
}

impl CodeSearch {
    /// An aggregator with no sources attached
    pub fn new(cache: RepoCache) -> Self {
        Self {
            cache,
            limits: SourceLimits::default(),
            context: None,
            answers: None,
            full_text: None,
            graph: None,
        }
    }

    /// The standard source set: Exa code context, DeepWiki, grep.app and noodl
    pub fn from_settings(settings: &Settings, client: &HttpClient) -> Self {
        let outgoing = &settings.outgoing;
        let code = &settings.code_search;

        Self::new(RepoCache::new(settings.repo_cache_dir()))
            .with_limits(SourceLimits {
                context_tokens: code.exa_tokens as usize,
                full_text_results: code.grep_max_results,
                graph_results: code.graph_max_results,
            })
            .with_context(Arc::new(ExaMcp::new(
                client.clone(),
                Duration::from_secs_f64(outgoing.code_context_timeout),
            )))
            .with_answers(Arc::new(DeepWiki::new(
                client.clone(),
                Duration::from_secs_f64(outgoing.question_timeout),
            )))
            .with_full_text(Arc::new(GrepApp::new(
                client.clone(),
                Duration::from_secs_f64(outgoing.request_timeout),
            )))
            .with_graph(Arc::new(Noodl::new(code.graph_binary.clone())))
    }

    pub fn with_limits(mut self, limits: SourceLimits) -> Self {
        self.limits = limits;
        self
    }

    pub fn with_context(mut self, source: Arc<dyn CodeSearchProvider>) -> Self {
        self.context = Some(source);
        self
    }

    pub fn with_answers(mut self, source: Arc<dyn QuestionAnswerProvider>) -> Self {
        self.answers = Some(source);
        self
    }

    pub fn with_full_text(mut self, source: Arc<dyn CodeSearchProvider>) -> Self {
        self.full_text = Some(source);
        self
    }

    pub fn with_graph(mut self, source: Arc<dyn LocalCodeSearch>) -> Self {
        self.graph = Some(source);
        self
    }

    /// Build the report for `query`, optionally scoped to one repository
    ///
    /// Only resolving or cloning the repository can fail; a failing source
    /// just contributes no section.
    pub async fn search_code(&self, query: &str, repo: Option<&str>) -> Result<String, RepoError> {
        let (scope, local_path) = match repo {
            Some(input) => {
                let reference = resolve(input)?;
                let path = self.cache.materialize(&reference).await?;
                (Some(reference.full_name), Some(path))
            }
            None => (None, None),
        };
        let scope = scope.as_deref();
        debug!("code search for {:?} scoped to {:?}", query, scope);

        let (context, answer, full_text, graph) = tokio::join!(
            self.context_section(query, scope),
            self.answer_section(query, scope),
            self.full_text_section(query, scope),
            self.graph_section(query, local_path),
        );

        let sections: Vec<String> = [context, answer, full_text, graph]
            .into_iter()
            .flatten()
            .collect();
        info!("code search produced {} sections", sections.len());

        if sections.is_empty() {
            return Ok(NO_RESULTS.to_string());
        }
        Ok(sections.join("\n\n").trim().to_string())
    }

    async fn context_section(&self, query: &str, scope: Option<&str>) -> Option<String> {
        let source = self.context.as_ref()?;
        let results = guarded(
            source.name(),
            source.timeout(),
            source.code_search(query, scope, self.limits.context_tokens),
        )
        .await?;
        section("Exa Code Context", &results)
    }

    async fn answer_section(&self, query: &str, scope: Option<&str>) -> Option<String> {
        let (source, scope) = (self.answers.as_ref()?, scope?);
        let answer = guarded(source.name(), source.timeout(), source.ask(query, scope)).await?;
        let answer = answer.trim();
        if answer.is_empty() {
            return None;
        }
        Some(format!("## DeepWiki\n{}", answer))
    }

    async fn full_text_section(&self, query: &str, scope: Option<&str>) -> Option<String> {
        let source = self.full_text.as_ref()?;
        let results = guarded(
            source.name(),
            source.timeout(),
            source.code_search(query, scope, self.limits.full_text_results),
        )
        .await?;
        section("grep.app", &results)
    }

    async fn graph_section(&self, query: &str, repo_path: Option<PathBuf>) -> Option<String> {
        let (source, repo_path) = (self.graph.clone()?, repo_path?);
        if !source.is_available() {
            debug!("{} not available, skipping", source.name());
            return None;
        }

        let query = query.to_string();
        let limit = self.limits.graph_results;
        let outcome = tokio::task::spawn_blocking(move || {
            let results = source.search_local(&query, &repo_path, limit);
            (source, results)
        })
        .await;

        let results: Vec<SearchResult> = match outcome {
            Ok((_, Ok(results))) => results,
            Ok((source, Err(e))) => {
                warn!("{} failed: {}", source.name(), e);
                return None;
            }
            Err(e) => {
                warn!("local graph search task failed: {}", e);
                return None;
            }
        };
        section("Noodl", &results)
    }
}

/// Await one source under its deadline; failures are logged and dropped
async fn guarded<T, F>(name: &str, deadline: Duration, call: F) -> Option<T>
where
    F: Future<Output = anyhow::Result<T>>,
{
    match tokio::time::timeout(deadline, call).await {
        Ok(Ok(value)) => Some(value),
        Ok(Err(e)) => {
            warn!("{} failed: {}", name, e);
            None
        }
        Err(_) => {
            warn!("{} timed out after {:?}", name, deadline);
            None
        }
    }
}

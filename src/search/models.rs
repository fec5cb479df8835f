//! Search request and response models

use crate::error::ProviderError;
use crate::results::{ResultContainer, SearchResult};
use serde::Serialize;
use std::time::Instant;

/// How `search_web` picks providers
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderSelection {
    /// Weighted pick with fallback
    Auto,
    /// Every eligible provider
    All,
    /// Only the named providers; unknown names are ignored
    Subset(Vec<String>),
}

impl ProviderSelection {
    /// Parse a selector string, case-insensitively
    ///
    /// `auto` or blank selects one provider, `multi`/`all` selects every
    /// provider, anything else is a comma-separated list of names.
    pub fn parse(input: &str) -> Self {
        let normalized = input.trim().to_lowercase();
        match normalized.as_str() {
            "" | "auto" => Self::Auto,
            "multi" | "all" => Self::All,
            list => Self::Subset(
                list.split(',')
                    .map(str::trim)
                    .filter(|name| !name.is_empty())
                    .map(str::to_string)
                    .collect(),
            ),
        }
    }
}

impl Default for ProviderSelection {
    fn default() -> Self {
        Self::Auto
    }
}

/// Outcome of one web search request
#[derive(Debug, Clone, Serialize)]
pub struct SearchResponse {
    pub query: String,
    pub results: Vec<SearchResult>,
    pub providers_used: Vec<String>,
    pub elapsed_ms: u64,
    /// Request-level error text; set only when no results were found
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Every classified failure, including those a fallback recovered from
    #[serde(skip)]
    pub errors: Vec<ProviderError>,
}

impl SearchResponse {
    pub(crate) fn from_container(query: &str, container: ResultContainer, started: Instant) -> Self {
        let error = container.error_summary();
        let (results, providers_used, errors) = container.into_parts();

        Self {
            query: query.to_string(),
            results,
            providers_used,
            elapsed_ms: started.elapsed().as_millis() as u64,
            error,
            errors,
        }
    }

    /// A request that failed before or across every provider
    pub(crate) fn failed(
        query: &str,
        error: ProviderError,
        errors: Vec<ProviderError>,
        started: Instant,
    ) -> Self {
        Self {
            query: query.to_string(),
            results: Vec::new(),
            providers_used: Vec::new(),
            elapsed_ms: started.elapsed().as_millis() as u64,
            error: Some(error.to_string()),
            errors,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }
}

//! Result container for merging per-provider result sets

use super::types::SearchResult;
use crate::error::ProviderError;
use std::collections::HashSet;

/// Merges results from several providers in the order they are added
///
/// Order is construction order, not arrival order: callers add provider
/// outcomes in candidate-set order after every task has settled.
#[derive(Debug, Clone, Default)]
pub struct ResultContainer {
    results: Vec<SearchResult>,
    seen_urls: HashSet<String>,
    deduplicate: bool,
    providers_used: Vec<String>,
    errors: Vec<ProviderError>,
}

impl ResultContainer {
    /// Create a new empty container
    pub fn new(deduplicate: bool) -> Self {
        Self {
            deduplicate,
            ..Default::default()
        }
    }

    /// Add one provider's results
    ///
    /// A provider counts as used when it returned at least one result, even if
    /// every one of them was a duplicate of an earlier provider's.
    pub fn add_provider_results(&mut self, provider: &str, results: Vec<SearchResult>) {
        if results.is_empty() {
            return;
        }
        self.providers_used.push(provider.to_string());

        for result in results {
            if self.deduplicate && !self.seen_urls.insert(result.url.clone()) {
                continue;
            }
            self.results.push(result);
        }
    }

    /// Record a provider failure
    pub fn add_error(&mut self, error: ProviderError) {
        self.errors.push(error);
    }

    pub fn providers_used(&self) -> &[String] {
        &self.providers_used
    }

    pub fn result_count(&self) -> usize {
        self.results.len()
    }

    /// Joined error text, only when nothing was found
    ///
    /// Empty with no errors is "no results", not a failure.
    pub fn error_summary(&self) -> Option<String> {
        if !self.results.is_empty() || self.errors.is_empty() {
            return None;
        }

        Some(
            self.errors
                .iter()
                .map(|e| e.to_string())
                .collect::<Vec<_>>()
                .join("; "),
        )
    }

    pub fn into_parts(self) -> (Vec<SearchResult>, Vec<String>, Vec<ProviderError>) {
        (self.results, self.providers_used, self.errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(url: &str, source: &str) -> SearchResult {
        SearchResult::new(format!("from {}", source), url, "", source).unwrap()
    }

    #[test]
    fn test_result_deduplication() {
        let mut container = ResultContainer::new(true);
        container.add_provider_results(
            "serper",
            vec![result("https://a.com", "serper"), result("https://b.com", "serper")],
        );
        container.add_provider_results(
            "brave",
            vec![result("https://b.com", "brave"), result("https://c.com", "brave")],
        );

        assert_eq!(container.providers_used(), &["serper", "brave"]);
        let (results, _, errors) = container.into_parts();
        let urls: Vec<_> = results.iter().map(|r| r.url.as_str()).collect();
        assert_eq!(urls, vec!["https://a.com", "https://b.com", "https://c.com"]);
        // First provider wins on collision
        assert_eq!(results[1].source, "serper");
        assert!(errors.is_empty());
    }

    #[test]
    fn test_duplicates_kept_without_dedup() {
        let mut container = ResultContainer::new(false);
        container.add_provider_results("serper", vec![result("https://a.com", "serper")]);
        container.add_provider_results("brave", vec![result("https://a.com", "brave")]);

        assert_eq!(container.result_count(), 2);
    }

    #[test]
    fn test_empty_provider_not_used() {
        let mut container = ResultContainer::new(true);
        container.add_provider_results("serper", vec![]);
        assert!(container.providers_used().is_empty());
    }

    #[test]
    fn test_error_summary() {
        let mut container = ResultContainer::new(true);
        assert_eq!(container.error_summary(), None);

        container.add_error(ProviderError::Timeout {
            provider: "brave".into(),
        });
        container.add_error(ProviderError::Other {
            provider: "tavily".into(),
            message: "boom".into(),
        });
        assert_eq!(
            container.error_summary().as_deref(),
            Some("brave: Request timed out; tavily: boom")
        );

        container.add_provider_results("serper", vec![result("https://a.com", "serper")]);
        assert_eq!(container.error_summary(), None);
    }
}

//! Error types for provider orchestration and repository handling
//!
//! Provider failures are never propagated as request-level errors on their own.
//! They are classified once, in [`classify`], and recorded by whichever component
//! is orchestrating the call (selector, aggregator or code search).

use thiserror::Error;

/// Non-success HTTP status returned by an upstream provider.
///
/// Adapters raise this (wrapped in `anyhow::Error`) instead of parsing error bodies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("upstream returned HTTP {status}")]
pub struct HttpStatusError {
    pub status: u16,
}

/// Classified failure of a provider call, or of provider selection as a whole.
///
/// The `Display` text is what callers see, so it carries the guidance message.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProviderError {
    /// No enabled provider with credentials exists for single-provider search.
    #[error("No search providers configured. Please set API keys in environment variables.")]
    NotConfigured,

    /// The requested provider subset resolved to nothing.
    #[error("No search providers available. Please configure API keys.")]
    NoneAvailable,

    /// Upstream answered with an error status.
    #[error("{}", transport_message(.provider, *.status))]
    Transport { provider: String, status: u16 },

    /// The call exceeded its deadline.
    #[error("{provider}: Request timed out")]
    Timeout { provider: String },

    /// Anything else: connection refused, bad JSON, missing key...
    #[error("{provider}: {message}")]
    Other { provider: String, message: String },
}

fn transport_message(provider: &str, status: u16) -> String {
    match status {
        401 => format!(
            "{}: Invalid API key. Check your {}_API_KEY.",
            provider,
            provider.to_uppercase()
        ),
        403 => format!("{}: Access forbidden. API key may lack permissions.", provider),
        429 => format!("{}: Rate limit exceeded. Try again later.", provider),
        s if s >= 500 => format!("{}: Server error ({}). Try again.", provider, s),
        s => format!("{}: HTTP {}", provider, s),
    }
}

/// Classify any failure raised while calling `provider`.
///
/// Both the single-provider selector and the multi-provider aggregator go through
/// this function so that the same upstream failure always reads the same way.
pub fn classify(provider: &str, err: &anyhow::Error) -> ProviderError {
    for cause in err.chain() {
        if let Some(status) = cause.downcast_ref::<HttpStatusError>() {
            return ProviderError::Transport {
                provider: provider.to_string(),
                status: status.status,
            };
        }

        if cause.downcast_ref::<tokio::time::error::Elapsed>().is_some() {
            return ProviderError::Timeout {
                provider: provider.to_string(),
            };
        }

        if let Some(e) = cause.downcast_ref::<reqwest::Error>() {
            if e.is_timeout() {
                return ProviderError::Timeout {
                    provider: provider.to_string(),
                };
            }
            if let Some(status) = e.status() {
                return ProviderError::Transport {
                    provider: provider.to_string(),
                    status: status.as_u16(),
                };
            }
        }
    }

    ProviderError::Other {
        provider: provider.to_string(),
        message: err.to_string(),
    }
}

/// Failures resolving or materialising a repository scope.
#[derive(Debug, Error)]
pub enum RepoError {
    /// Local paths, missing owner/name, or unparseable identifiers.
    #[error("Invalid repository reference '{input}': {reason}")]
    InvalidReference { input: String, reason: String },

    /// `git clone` exited non-zero; carries its diagnostic output.
    #[error("Failed to clone {repo}: {output}")]
    CloneFailed { repo: String, output: String },

    #[error("Repository cache I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl RepoError {
    pub(crate) fn invalid(input: &str, reason: impl Into<String>) -> Self {
        Self::InvalidReference {
            input: input.to_string(),
            reason: reason.into(),
        }
    }
}

/// Tool arguments outside their accepted ranges.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InputError {
    #[error("query must not be empty")]
    EmptyQuery,

    #[error("query must be at most {max} characters, got {len}")]
    QueryTooLong { len: usize, max: usize },

    #[error("max_results must be within 1..={max}, got {got}")]
    MaxResults { got: usize, max: usize },

    #[error("invalid url '{0}': only http and https URLs can be fetched")]
    InvalidUrl(String),
}

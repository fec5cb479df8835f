//! Result type definitions

use serde::{Deserialize, Serialize};

/// Maximum characters of content kept from a single upstream item
pub const MAX_CONTENT_CHARS: usize = 500;

/// A single normalized search result
///
/// Every provider maps its raw items into this shape. The constructor refuses
/// an empty `url`, so a result without one can never reach a renderer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResult {
    /// Title of the result
    pub title: String,
    /// URL of the result (never empty)
    pub url: String,
    /// Snippet or content, may be empty
    #[serde(default)]
    pub content: String,
    /// Provider that returned this result
    pub source: String,
}

impl SearchResult {
    /// Build a result, or `None` when the upstream item had no URL.
    pub fn new(
        title: impl Into<String>,
        url: impl Into<String>,
        content: impl Into<String>,
        source: impl Into<String>,
    ) -> Option<Self> {
        let url = url.into();
        if url.trim().is_empty() {
            return None;
        }

        Some(Self {
            title: title.into(),
            url,
            content: content.into(),
            source: source.into(),
        })
    }

    /// Build a result from a JSON item, reading the first present field of each group.
    ///
    /// Missing fields fall back to empty strings; a missing URL drops the item.
    pub fn from_json(
        item: &serde_json::Value,
        title_keys: &[&str],
        url_keys: &[&str],
        content_keys: &[&str],
        source: &str,
    ) -> Option<Self> {
        let first = |keys: &[&str]| -> String {
            keys.iter()
                .filter_map(|k| item.get(*k).and_then(|v| v.as_str()))
                .find(|s| !s.is_empty())
                .unwrap_or_default()
                .to_string()
        };

        Self::new(
            first(title_keys),
            first(url_keys),
            first(content_keys),
            source,
        )
    }

    /// Content cut to `limit` characters, with an ellipsis when shortened
    pub fn preview(&self, limit: usize) -> String {
        if self.content.chars().count() > limit {
            format!("{}...", truncate_chars(&self.content, limit))
        } else {
            self.content.clone()
        }
    }
}

/// Truncate on a character boundary
pub fn truncate_chars(text: &str, limit: usize) -> &str {
    match text.char_indices().nth(limit) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

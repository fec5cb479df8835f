//! Text rendering of result lists for tool output

use super::types::{SearchResult, MAX_CONTENT_CHARS};
use crate::search::SearchResponse;
use serde_json::json;

/// Literal returned when nothing was found and nothing failed
pub const NO_RESULTS: &str = "No results found.";

/// Render an error for display
pub fn error_text(message: &str) -> String {
    format!("**Error:** {}", message)
}

/// Numbered entries under headings of the given level
fn entries(results: &[SearchResult], heading: &str) -> String {
    let mut lines = Vec::with_capacity(results.len() * 3);
    for (i, result) in results.iter().enumerate() {
        lines.push(format!("{} {}. {}", heading, i + 1, result.title));
        lines.push(format!("**URL:** {}", result.url));
        if result.content.is_empty() {
            lines.push(String::new());
        } else {
            lines.push(format!("\n{}\n", result.preview(MAX_CONTENT_CHARS)));
        }
    }
    lines.join("\n")
}

/// Markdown for a web search outcome
///
/// An error wins over results; an empty list without error is [`NO_RESULTS`].
pub fn markdown(results: &[SearchResult], error: Option<&str>) -> String {
    if let Some(message) = error {
        return error_text(message);
    }
    if results.is_empty() {
        return NO_RESULTS.to_string();
    }
    entries(results, "##")
}

/// JSON for a web search outcome:
/// `{"results": [...], "providers_used": [...], "elapsed_ms": n, "error"?}`
pub fn json(response: &SearchResponse) -> String {
    let items: Vec<_> = response
        .results
        .iter()
        .map(|r| json!({ "title": r.title, "url": r.url, "content": r.content }))
        .collect();

    let mut output = json!({
        "results": items,
        "providers_used": response.providers_used,
        "elapsed_ms": response.elapsed_ms,
    });
    if let Some(message) = &response.error {
        output["error"] = json!(message);
    }
    serde_json::to_string_pretty(&output).unwrap_or_else(|_| output.to_string())
}

/// One titled section of a code search report, or `None` when empty
pub fn section(title: &str, results: &[SearchResult]) -> Option<String> {
    if results.is_empty() {
        return None;
    }
    Some(format!("## {}\n{}", title, entries(results, "###")).trim().to_string())
}

//! Exa search through the free MCP endpoint (no API key)
//!
//! The endpoint speaks JSON-RPC and answers with server-sent events whose
//! payload is plain text. Two text layouts come back: web search results as
//! `Title:` / `URL:` / `Text:` blocks, and code context as `## title` sections
//! followed by a URL line and a code body.

use super::traits::*;
use crate::network::{HttpClient, ProviderRequest, ProviderResponse};
use crate::results::{truncate_chars, SearchResult, MAX_CONTENT_CHARS};
use anyhow::Result;
use async_trait::async_trait;
use serde_json::json;
use std::time::Duration;
use tracing::debug;

const NAME: &str = "exa_mcp";

/// Exa.ai provider over the keyless MCP endpoint
pub struct ExaMcp {
    client: HttpClient,
    mcp_url: String,
    timeout: Duration,
}

impl ExaMcp {
    pub fn new(client: HttpClient, timeout: Duration) -> Self {
        Self {
            client,
            mcp_url: "https://mcp.exa.ai/mcp".to_string(),
            timeout,
        }
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.mcp_url = url.into();
        self
    }

    async fn call_tool(&self, tool: &str, arguments: serde_json::Value) -> Result<ProviderResponse> {
        let request = ProviderRequest::post(&self.mcp_url)
            .header("Accept", "application/json, text/event-stream")
            .json(json!({
                "jsonrpc": "2.0",
                "method": "tools/call",
                "params": { "name": tool, "arguments": arguments },
                "id": 1,
            }));

        let response = self
            .client
            .execute_with_timeout(request, self.timeout)
            .await?
            .error_for_status()?;
        Ok(response)
    }
}

#[async_trait]
impl SearchProvider for ExaMcp {
    fn name(&self) -> &str {
        NAME
    }

    fn about(&self) -> ProviderAbout {
        ProviderAbout::new()
            .api_key_required(false)
    }

    fn timeout(&self) -> Duration {
        self.timeout
    }

    async fn search(&self, query: &str, max_results: usize) -> Result<Vec<SearchResult>> {
        let response = self
            .call_tool(
                "web_search_exa",
                json!({ "query": query, "numResults": max_results, "type": "auto" }),
            )
            .await?;

        Ok(parse_mcp_response(&response))
    }
}

#[async_trait]
impl CodeSearchProvider for ExaMcp {
    fn name(&self) -> &str {
        NAME
    }

    fn timeout(&self) -> Duration {
        self.timeout
    }

    /// `limit` is the token budget; a scope adds a `repo:` qualifier to the query.
    async fn code_search(
        &self,
        query: &str,
        scope: Option<&str>,
        limit: usize,
    ) -> Result<Vec<SearchResult>> {
        let query = match scope {
            Some(repo) => format!("{} repo:{}", query, repo),
            None => query.to_string(),
        };
        debug!("exa code context query: {}", query);

        let response = self
            .call_tool(
                "get_code_context_exa",
                json!({ "query": query, "tokensNum": limit }),
            )
            .await?;

        Ok(parse_mcp_response(&response))
    }
}

/// Extract results from every `data:` payload of the SSE reply
///
/// Payloads that are not JSON (keep-alives, partial frames) are skipped.
fn parse_mcp_response(response: &ProviderResponse) -> Vec<SearchResult> {
    let mut results = Vec::new();

    for data in response.sse_data() {
        let Ok(payload) = serde_json::from_str::<serde_json::Value>(data) else {
            continue;
        };

        for item in json_items(&payload, &["result", "content"]) {
            if item.get("type").and_then(|t| t.as_str()) != Some("text") {
                continue;
            }
            if let Some(text) = item.get("text").and_then(|t| t.as_str()) {
                results.extend(parse_text_results(text));
            }
        }
    }

    results
}

fn parse_text_results(text: &str) -> Vec<SearchResult> {
    // Only the head is checked so page content cannot trigger the code layout
    let head = truncate_chars(text, 100);
    if head.starts_with("##") || head.contains("\n## ") {
        parse_code_context(text)
    } else {
        parse_web_blocks(text)
    }
}

#[derive(Default)]
struct PartialResult {
    title: String,
    url: String,
    content: String,
}

impl PartialResult {
    fn finish(self) -> Option<SearchResult> {
        SearchResult::new(
            self.title,
            self.url,
            truncate_chars(&self.content, MAX_CONTENT_CHARS),
            NAME,
        )
    }
}

fn parse_web_blocks(text: &str) -> Vec<SearchResult> {
    let mut results = Vec::new();
    let mut current: Option<PartialResult> = None;

    for line in text.lines().map(str::trim) {
        if let Some(title) = line.strip_prefix("Title:") {
            if let Some(done) = current.take().and_then(PartialResult::finish) {
                results.push(done);
            }
            current = Some(PartialResult {
                title: title.trim().to_string(),
                ..Default::default()
            });
        } else if let Some(url) = line.strip_prefix("URL:") {
            current.get_or_insert_with(Default::default).url = url.trim().to_string();
        } else if let Some(body) = line.strip_prefix("Text:") {
            current.get_or_insert_with(Default::default).content = body.trim().to_string();
        } else if let Some(partial) = current.as_mut() {
            if !partial.content.is_empty() && !line.is_empty() {
                partial.content.push(' ');
                partial.content.push_str(line);
            }
        }
    }

    if let Some(done) = current.and_then(PartialResult::finish) {
        results.push(done);
    }

    results
}

fn parse_code_context(text: &str) -> Vec<SearchResult> {
    let mut results = Vec::new();

    for section in text.split("\n## ") {
        let mut lines = section.trim().lines();
        let Some(first) = lines.next() else {
            continue;
        };
        let title = first.trim_start_matches('#').trim();

        let mut url = "";
        let mut body: Vec<&str> = Vec::new();
        let mut in_code_block = false;

        for line in lines {
            let stripped = line.trim();
            if stripped.starts_with("http") {
                url = stripped;
            } else if stripped == "```" {
                in_code_block = !in_code_block;
            } else if in_code_block || !stripped.is_empty() {
                body.push(line);
            }
        }

        if title.is_empty() {
            continue;
        }
        let content = body.join("\n");
        if let Some(result) =
            SearchResult::new(title, url, truncate_chars(&content, MAX_CONTENT_CHARS), NAME)
        {
            results.push(result);
        }
    }

    results
}

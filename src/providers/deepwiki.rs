//! DeepWiki repository Q&A over MCP
//!
//! A session is opened with `initialize`; the returned `mcp-session-id`
//! header is echoed on the `ask_question` tool call.

use super::traits::*;
use crate::network::{HttpClient, ProviderRequest};
use anyhow::{anyhow, Result};
use async_trait::async_trait;
use serde_json::json;
use std::time::Duration;

const PROTOCOL_VERSION: &str = "2024-11-05";

/// DeepWiki question-answering provider
pub struct DeepWiki {
    client: HttpClient,
    mcp_url: String,
    timeout: Duration,
}

impl DeepWiki {
    pub fn new(client: HttpClient, timeout: Duration) -> Self {
        Self {
            client,
            mcp_url: "https://mcp.deepwiki.com/mcp".to_string(),
            timeout,
        }
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.mcp_url = url.into();
        self
    }

    async fn initialize_session(&self) -> Result<String> {
        let request = ProviderRequest::post(&self.mcp_url)
            .header("Accept", "application/json, text/event-stream")
            .json(json!({
                "jsonrpc": "2.0",
                "method": "initialize",
                "params": {
                    "protocolVersion": PROTOCOL_VERSION,
                    "capabilities": {},
                    "clientInfo": { "name": "search-proxy", "version": crate::VERSION },
                },
                "id": 1,
            }));

        let response = self
            .client
            .execute_with_timeout(request, self.timeout)
            .await?
            .error_for_status()?;

        response
            .header("mcp-session-id")
            .map(str::to_string)
            .ok_or_else(|| anyhow!("DeepWiki session id missing"))
    }
}

#[async_trait]
impl QuestionAnswerProvider for DeepWiki {
    fn name(&self) -> &str {
        "deepwiki"
    }

    fn timeout(&self) -> Duration {
        self.timeout
    }

    async fn ask(&self, question: &str, scope: &str) -> Result<String> {
        let session_id = self.initialize_session().await?;

        let request = ProviderRequest::post(&self.mcp_url)
            .header("Accept", "application/json, text/event-stream")
            .header("Mcp-Session-Id", session_id)
            .json(json!({
                "jsonrpc": "2.0",
                "method": "tools/call",
                "params": {
                    "name": "ask_question",
                    "arguments": { "repoName": scope, "question": question },
                },
                "id": uuid::Uuid::new_v4().to_string(),
            }));

        let response = self
            .client
            .execute_with_timeout(request, self.timeout)
            .await?
            .error_for_status()?;

        let mut answer = String::new();
        for data in response.sse_data() {
            if !data.starts_with('{') {
                continue;
            }
            let payload: serde_json::Value = serde_json::from_str(data)?;
            for item in json_items(&payload, &["result", "content"]) {
                if item.get("type").and_then(|t| t.as_str()) == Some("text") {
                    answer.push_str(item.get("text").and_then(|t| t.as_str()).unwrap_or_default());
                }
            }
        }

        Ok(answer)
    }
}

//! HTTP request handlers

use super::state::AppState;
use crate::error::InputError;
use crate::tools::{self, ResponseFormat, DEFAULT_MAX_RESULTS};
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

/// Arguments of `search_web`
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SearchWebArgs {
    pub query: String,
    #[serde(default = "default_max_results")]
    pub max_results: usize,
    /// Provider selector, `auto` when absent
    #[serde(default)]
    pub provider: Option<String>,
    #[serde(default)]
    pub format: ResponseFormat,
}

fn default_max_results() -> usize {
    DEFAULT_MAX_RESULTS
}

/// Arguments of `search_code`
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SearchCodeArgs {
    pub query: String,
    #[serde(default)]
    pub repo: Option<String>,
}

/// Arguments of `fetch_webpage`
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FetchArgs {
    pub url: String,
}

/// Body of every tool reply
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct ToolOutput {
    pub content: String,
}

fn reply(outcome: Result<String, InputError>) -> Response {
    match outcome {
        Ok(content) => Json(ToolOutput { content }).into_response(),
        Err(e) => (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(serde_json::json!({ "error": e.to_string() })),
        )
            .into_response(),
    }
}

/// Health check handler
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "version": crate::VERSION,
        "providers": state.tools.registry().eligible(),
    }))
}

/// Tool descriptors
pub async fn list_tools() -> impl IntoResponse {
    Json(tools::descriptors())
}

pub async fn search_web(
    State(state): State<AppState>,
    Json(args): Json<SearchWebArgs>,
) -> Response {
    let provider = args.provider.as_deref().unwrap_or("auto");
    reply(
        state
            .tools
            .search_web(&args.query, args.max_results, provider, args.format)
            .await,
    )
}

pub async fn search_code(
    State(state): State<AppState>,
    Json(args): Json<SearchCodeArgs>,
) -> Response {
    reply(state.tools.search_code(&args.query, args.repo.as_deref()).await)
}

pub async fn fetch_webpage(State(state): State<AppState>, Json(args): Json<FetchArgs>) -> Response {
    reply(state.tools.fetch_webpage(&args.url).await)
}

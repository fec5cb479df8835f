//! Route definitions

use super::handlers;
use super::state::AppState;
use axum::{
    routing::{get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};

/// Create the application router with all routes
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(handlers::health))
        .route("/tools", get(handlers::list_tools))
        .route("/tools/search_web", post(handlers::search_web))
        .route("/tools/search_code", post(handlers::search_code))
        .route("/tools/fetch_webpage", post(handlers::fetch_webpage))
        .layer(cors)
        .with_state(state)
}

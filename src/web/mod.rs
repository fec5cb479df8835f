//! HTTP tool-call surface
//!
//! Exposes the tools as JSON endpoints; every tool replies `{"content": text}`.

mod handlers;
mod routes;
mod state;

pub use handlers::ToolOutput;
pub use routes::create_router;
pub use state::AppState;

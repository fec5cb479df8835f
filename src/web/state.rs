//! Application state shared across handlers

use crate::config::Settings;
use crate::network::HttpClient;
use crate::providers::ProviderRegistry;
use crate::tools::Toolkit;
use std::sync::Arc;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Tool implementations
    pub tools: Arc<Toolkit>,
}

impl AppState {
    /// Create new application state
    pub fn new(settings: &Settings, registry: ProviderRegistry, client: HttpClient) -> Self {
        let tools = Toolkit::from_settings(settings, &client, Arc::new(registry));
        Self::with_toolkit(tools)
    }

    /// State around an already wired toolkit
    pub fn with_toolkit(tools: Toolkit) -> Self {
        Self {
            tools: Arc::new(tools),
        }
    }
}

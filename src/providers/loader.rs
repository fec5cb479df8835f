//! Provider loader for building the registry from configuration

use super::registry::ProviderRegistry;
use super::traits::{KeyRing, SearchProvider};
use super::{brave, exa, exa_mcp, perplexity, serper, tavily};
use crate::config::{ProviderConfig, Settings};
use crate::network::HttpClient;
use anyhow::{bail, Result};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Names that are configured like providers but are not web search adapters
const NON_SEARCH: &[&str] = &["jina"];

/// Loader for initializing providers from configuration
pub struct ProviderLoader;

impl ProviderLoader {
    /// Build every known web search provider
    ///
    /// Disabled or keyless providers are still registered; eligibility is
    /// decided per request by the registry.
    pub fn load(settings: &Settings, client: &HttpClient) -> Result<ProviderRegistry> {
        let mut registry = ProviderRegistry::new();
        let timeout = Duration::from_secs_f64(settings.outgoing.request_timeout);

        for config in &settings.providers {
            if NON_SEARCH.contains(&config.name.as_str()) {
                debug!("{} is not a web search provider, skipping", config.name);
                continue;
            }

            match Self::create_provider(config, client, timeout) {
                Ok(provider) => {
                    debug!(
                        "Loaded provider: {} (weight {}, enabled {})",
                        config.name, config.weight, config.enabled
                    );
                    registry.register(provider, config.clone());
                }
                Err(e) => warn!("Failed to load provider {}: {}", config.name, e),
            }
        }

        info!(
            "Loaded providers [{}], {} eligible",
            registry.names().join(", "),
            registry.eligible().len()
        );
        Ok(registry)
    }

    fn create_provider(
        config: &ProviderConfig,
        client: &HttpClient,
        timeout: Duration,
    ) -> Result<Arc<dyn SearchProvider>> {
        let client = client.clone();
        let keys = KeyRing::new(config.credentials());

        let provider: Arc<dyn SearchProvider> = match config.name.as_str() {
            "serper" => Arc::new(serper::Serper::new(client, keys, timeout)),
            "brave" => Arc::new(brave::Brave::new(client, keys, timeout)),
            "tavily" => Arc::new(tavily::Tavily::new(client, keys, timeout)),
            "perplexity" => Arc::new(perplexity::Perplexity::new(client, keys, timeout)),
            "exa" => Arc::new(exa::Exa::new(client, keys, timeout)),
            "exa_mcp" => Arc::new(exa_mcp::ExaMcp::new(client, timeout)),
            other => bail!("Unknown provider: {}", other),
        };

        Ok(provider)
    }
}

//! Provider registry: registration table plus the adapters behind it

use super::traits::SearchProvider;
use crate::config::ProviderConfig;
use std::collections::HashMap;
use std::sync::Arc;

/// Registry of web search providers
///
/// Registration order is preserved; it is the iteration order of every
/// weight table and candidate set built from this registry.
pub struct ProviderRegistry {
    /// Providers by name
    providers: HashMap<String, Arc<dyn SearchProvider>>,
    /// Provider configurations, in registration order
    configs: Vec<ProviderConfig>,
}

impl ProviderRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self {
            providers: HashMap::new(),
            configs: Vec::new(),
        }
    }

    /// Register a provider under its configuration
    ///
    /// Registering a name twice replaces the adapter and config in place.
    pub fn register(&mut self, provider: Arc<dyn SearchProvider>, config: ProviderConfig) {
        let name = config.name.clone();
        match self.configs.iter_mut().find(|c| c.name == name) {
            Some(existing) => *existing = config,
            None => self.configs.push(config),
        }
        self.providers.insert(name, provider);
    }

    /// Get a provider by name
    pub fn get(&self, name: &str) -> Option<&Arc<dyn SearchProvider>> {
        self.providers.get(name)
    }

    /// Get provider config
    pub fn get_config(&self, name: &str) -> Option<&ProviderConfig> {
        self.configs.iter().find(|c| c.name == name)
    }

    /// Whether a provider may be used for this request
    ///
    /// Disabled beats weight; a keyed provider without credentials counts as
    /// not configured.
    pub fn is_eligible(&self, name: &str) -> bool {
        let (Some(config), Some(provider)) = (self.get_config(name), self.get(name)) else {
            return false;
        };

        config.enabled && (!provider.about().require_api_key || !config.credentials().is_empty())
    }

    /// Names of all eligible providers, in registration order
    pub fn eligible(&self) -> Vec<&str> {
        self.configs
            .iter()
            .map(|c| c.name.as_str())
            .filter(|name| self.is_eligible(name))
            .collect()
    }

    /// Weights of all eligible providers, in registration order
    pub fn weights(&self) -> Vec<(String, u32)> {
        self.configs
            .iter()
            .filter(|c| self.is_eligible(&c.name))
            .map(|c| (c.name.clone(), c.weight))
            .collect()
    }

    /// Get all provider names, in registration order
    pub fn names(&self) -> Vec<&str> {
        self.configs.iter().map(|c| c.name.as_str()).collect()
    }
}

impl Default for ProviderRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::traits::ProviderAbout;
    use crate::results::SearchResult;
    use async_trait::async_trait;

    struct Stub {
        name: &'static str,
        keyed: bool,
    }

    #[async_trait]
    impl SearchProvider for Stub {
        fn name(&self) -> &str {
            self.name
        }

        fn about(&self) -> ProviderAbout {
            ProviderAbout::new().api_key_required(self.keyed)
        }

        async fn search(&self, _query: &str, _max: usize) -> anyhow::Result<Vec<SearchResult>> {
            Ok(vec![])
        }
    }

    fn registry() -> ProviderRegistry {
        let mut registry = ProviderRegistry::new();
        registry.register(
            Arc::new(Stub { name: "serper", keyed: true }),
            ProviderConfig::new("serper", 42).with_key("k"),
        );
        registry.register(
            Arc::new(Stub { name: "brave", keyed: true }),
            ProviderConfig::new("brave", 33),
        );
        registry.register(
            Arc::new(Stub { name: "exa", keyed: true }),
            ProviderConfig::new("exa", 50).with_key("k").disabled(),
        );
        registry.register(
            Arc::new(Stub { name: "exa_mcp", keyed: false }),
            ProviderConfig::new("exa_mcp", 15),
        );
        registry
    }

    #[test]
    fn test_registry() {
        let registry = registry();
        assert!(registry.get("serper").is_some());
        assert_eq!(registry.names(), vec!["serper", "brave", "exa", "exa_mcp"]);
    }

    #[test]
    fn test_eligibility() {
        let registry = registry();
        // brave has no key, exa is disabled, exa_mcp needs no key
        assert_eq!(registry.eligible(), vec!["serper", "exa_mcp"]);
        assert_eq!(
            registry.weights(),
            vec![("serper".to_string(), 42), ("exa_mcp".to_string(), 15)]
        );
        assert!(!registry.is_eligible("unknown"));
    }

    #[test]
    fn test_register_replaces_in_place() {
        let mut registry = registry();
        registry.register(
            Arc::new(Stub { name: "brave", keyed: true }),
            ProviderConfig::new("brave", 10).with_key("k2"),
        );
        assert_eq!(registry.names()[1], "brave");
        assert!(registry.is_eligible("brave"));
        assert_eq!(registry.get_config("brave").unwrap().weight, 10);
    }
}

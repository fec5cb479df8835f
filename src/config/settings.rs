//! Settings structures for search-proxy configuration

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// Upper bound accepted for any outgoing timeout, in seconds
pub const MAX_TIMEOUT_SECS: f64 = 3600.0;

/// Main settings structure, loaded from `settings.yml`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub server: ServerSettings,
    pub outgoing: OutgoingSettings,
    pub code_search: CodeSearchSettings,
    /// Provider registration table; order is the weight-table iteration order
    pub providers: Vec<ProviderConfig>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server: ServerSettings::default(),
            outgoing: OutgoingSettings::default(),
            code_search: CodeSearchSettings::default(),
            providers: default_providers(),
        }
    }
}

impl Settings {
    /// Load settings from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Parse settings from YAML text
    ///
    /// Providers named in the file replace the defaults of the same name;
    /// defaults not mentioned keep their place in the table.
    pub fn from_yaml(content: &str) -> Result<Self> {
        let mut settings: Settings = serde_yaml::from_str(content)?;
        settings.providers = merge_with_defaults(std::mem::take(&mut settings.providers));
        Ok(settings)
    }

    /// Merge credentials and overrides from the environment
    pub fn merge_env(&mut self) {
        self.merge_vars(|key| std::env::var(key).ok());
    }

    /// Merge from an arbitrary variable source
    pub fn merge_vars<F>(&mut self, var: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| var(key).filter(|v| !v.trim().is_empty());

        for (provider, key) in [
            ("serper", "SERPER_API_KEY"),
            ("brave", "BRAVE_API_KEY"),
            ("tavily", "TAVILY_API_KEY"),
            ("perplexity", "PERPLEXITY_API_KEY"),
            ("exa", "EXA_API_KEY"),
            ("jina", "JINA_API_KEY"),
        ] {
            if let (Some(value), Some(config)) = (var(key), self.provider_mut(provider)) {
                config.api_key = Some(value);
            }
        }

        // Second Tavily key enables rotation between both
        if let (Some(second), Some(tavily)) = (var("TAVILY_API_KEY_2"), self.provider_mut("tavily")) {
            if !tavily.api_keys.contains(&second) {
                tavily.api_keys.push(second);
            }
        }

        if let Some(timeout) = var("SEARCH_TIMEOUT_SECONDS").and_then(|v| v.parse().ok()) {
            self.outgoing.request_timeout = timeout;
        }
        if let Some(port) = var("SEARCH_PROXY_PORT").and_then(|v| v.parse().ok()) {
            self.server.port = port;
        }
        if let Some(addr) = var("SEARCH_PROXY_BIND_ADDRESS") {
            self.server.bind_address = addr;
        }
        if let Some(dir) = var("SEARCH_PROXY_CACHE_DIR") {
            self.code_search.cache_dir = Some(PathBuf::from(dir));
        }
    }

    /// Check value ranges and provider-name uniqueness
    pub fn validate(&self) -> Result<()> {
        let mut names = HashSet::new();
        for provider in &self.providers {
            if provider.name.trim().is_empty() {
                bail!("provider name must not be empty");
            }
            if !names.insert(provider.name.as_str()) {
                bail!("duplicate provider: {}", provider.name);
            }
            if provider.weight > 100 {
                bail!(
                    "provider {} weight must be within 0..=100, got {}",
                    provider.name,
                    provider.weight
                );
            }
        }

        for (name, value) in [
            ("request_timeout", self.outgoing.request_timeout),
            ("code_context_timeout", self.outgoing.code_context_timeout),
            ("question_timeout", self.outgoing.question_timeout),
            ("fetch_timeout", self.outgoing.fetch_timeout),
        ] {
            if !(value > 0.0 && value <= MAX_TIMEOUT_SECS) {
                bail!(
                    "outgoing.{} must be within (0, {}] seconds, got {}",
                    name,
                    MAX_TIMEOUT_SECS,
                    value
                );
            }
        }

        Ok(())
    }

    /// Get provider config by name
    pub fn get_provider(&self, name: &str) -> Option<&ProviderConfig> {
        self.providers.iter().find(|p| p.name == name)
    }

    fn provider_mut(&mut self, name: &str) -> Option<&mut ProviderConfig> {
        self.providers.iter_mut().find(|p| p.name == name)
    }

    /// Directory holding shallow clones
    pub fn repo_cache_dir(&self) -> PathBuf {
        self.code_search.cache_dir.clone().unwrap_or_else(|| {
            dirs::home_dir()
                .unwrap_or_else(std::env::temp_dir)
                .join(".cache")
                .join("search-proxy")
                .join("repos")
        })
    }
}

/// Server settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    /// Server port
    pub port: u16,
    /// Bind address
    pub bind_address: String,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            port: 8000,
            bind_address: "127.0.0.1".to_string(),
        }
    }
}

/// Outgoing request settings, all timeouts in seconds
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutgoingSettings {
    /// Per-call timeout for web search providers
    pub request_timeout: f64,
    /// Timeout for the code-context source
    pub code_context_timeout: f64,
    /// Timeout for repository Q&A
    pub question_timeout: f64,
    /// Timeout for page extraction
    pub fetch_timeout: f64,
    /// Pool max idle connections per host
    pub pool_maxsize: usize,
}

impl Default for OutgoingSettings {
    fn default() -> Self {
        Self {
            request_timeout: 30.0,
            code_context_timeout: 60.0,
            question_timeout: 90.0,
            fetch_timeout: 60.0,
            pool_maxsize: 20,
        }
    }
}

/// Code search settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CodeSearchSettings {
    /// Clone cache root (defaults to `~/.cache/search-proxy/repos`)
    pub cache_dir: Option<PathBuf>,
    /// Token budget requested from the code-context source
    pub exa_tokens: u32,
    /// Results kept from full-text code search
    pub grep_max_results: usize,
    /// Results kept from local graph search
    pub graph_max_results: usize,
    /// Executable used for local graph search
    pub graph_binary: String,
}

impl Default for CodeSearchSettings {
    fn default() -> Self {
        Self {
            cache_dir: None,
            exa_tokens: 50_000,
            grep_max_results: 10,
            graph_max_results: 10,
            graph_binary: "noodl".to_string(),
        }
    }
}

/// Individual provider registration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
    /// Provider name (unique key, also selects the adapter)
    pub name: String,
    /// Selection weight, 0..=100
    pub weight: u32,
    /// Whether the provider is enabled
    pub enabled: bool,
    /// Primary API key
    pub api_key: Option<String>,
    /// Additional keys for rotation
    pub api_keys: Vec<String>,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            name: String::new(),
            weight: 0,
            enabled: true,
            api_key: None,
            api_keys: Vec::new(),
        }
    }
}

impl ProviderConfig {
    pub fn new(name: impl Into<String>, weight: u32) -> Self {
        Self {
            name: name.into(),
            weight,
            ..Default::default()
        }
    }

    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }

    /// All non-blank credentials, primary key first, without duplicates
    pub fn credentials(&self) -> Vec<String> {
        let mut keys: Vec<String> = Vec::new();
        for key in self.api_key.iter().chain(self.api_keys.iter()) {
            let key = key.trim();
            if !key.is_empty() && !keys.iter().any(|k| k == key) {
                keys.push(key.to_string());
            }
        }
        keys
    }
}

fn merge_with_defaults(configured: Vec<ProviderConfig>) -> Vec<ProviderConfig> {
    let mut merged = default_providers();
    for config in configured {
        match merged.iter_mut().find(|p| p.name == config.name) {
            Some(existing) => *existing = config,
            None => merged.push(config),
        }
    }
    merged
}

/// Default provider table
///
/// Weights follow the free-tier monthly quotas of each service.
fn default_providers() -> Vec<ProviderConfig> {
    vec![
        ProviderConfig::new("serper", 42),
        ProviderConfig::new("brave", 33),
        ProviderConfig::new("tavily", 17),
        ProviderConfig::new("perplexity", 8),
        ProviderConfig::new("exa", 0).disabled(),
        ProviderConfig::new("exa_mcp", 15),
        ProviderConfig::new("jina", 0),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_default_settings() {
        let settings = Settings::default();
        assert_eq!(settings.server.port, 8000);
        assert_eq!(settings.outgoing.request_timeout, 30.0);
        assert_eq!(settings.get_provider("serper").unwrap().weight, 42);
        assert!(!settings.get_provider("exa").unwrap().enabled);
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_yaml_overrides_keep_default_order() {
        let yaml = r#"
providers:
  - name: brave
    weight: 90
  - name: serper
    enabled: false
outgoing:
  request_timeout: 12
"#;
        let settings = Settings::from_yaml(yaml).unwrap();
        let names: Vec<_> = settings.providers.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names[0], "serper");
        assert_eq!(names[1], "brave");
        assert_eq!(settings.get_provider("brave").unwrap().weight, 90);
        assert!(!settings.get_provider("serper").unwrap().enabled);
        assert_eq!(settings.outgoing.request_timeout, 12.0);
        // untouched sections keep defaults
        assert_eq!(settings.outgoing.question_timeout, 90.0);
    }

    #[test]
    fn test_merge_vars() {
        let vars: HashMap<&str, &str> = [
            ("SERPER_API_KEY", "s-key"),
            ("TAVILY_API_KEY", "t1"),
            ("TAVILY_API_KEY_2", "t2"),
            ("BRAVE_API_KEY", "  "),
            ("SEARCH_PROXY_PORT", "9100"),
        ]
        .into_iter()
        .collect();

        let mut settings = Settings::default();
        settings.merge_vars(|k| vars.get(k).map(|v| v.to_string()));

        assert_eq!(settings.get_provider("serper").unwrap().credentials(), vec!["s-key"]);
        assert_eq!(settings.get_provider("tavily").unwrap().credentials(), vec!["t1", "t2"]);
        assert!(settings.get_provider("brave").unwrap().credentials().is_empty());
        assert_eq!(settings.server.port, 9100);
    }

    #[test]
    fn test_credentials_deduplicated() {
        let mut config = ProviderConfig::new("tavily", 17).with_key("a");
        config.api_keys = vec!["a".into(), "".into(), "b".into()];
        assert_eq!(config.credentials(), vec!["a", "b"]);
    }

    #[test]
    fn test_validate_rejects_bad_weight_and_duplicates() {
        let mut settings = Settings::default();
        settings.providers.push(ProviderConfig::new("custom", 101));
        assert!(settings.validate().is_err());

        let mut settings = Settings::default();
        settings.providers.push(ProviderConfig::new("serper", 1));
        assert!(settings.validate().is_err());

        let mut settings = Settings::default();
        settings.outgoing.request_timeout = 0.0;
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_unbounded_timeouts() {
        let mut settings = Settings::default();
        settings.merge_vars(|k| (k == "SEARCH_TIMEOUT_SECONDS").then(|| "inf".to_string()));
        assert!(settings.outgoing.request_timeout.is_infinite());
        assert!(settings.validate().is_err());

        let yaml = "outgoing:\n  fetch_timeout: .inf\n";
        let settings: Settings = serde_yaml::from_str(yaml).unwrap();
        assert!(settings.validate().is_err());

        for value in [f64::NAN, MAX_TIMEOUT_SECS + 1.0] {
            let mut settings = Settings::default();
            settings.outgoing.question_timeout = value;
            assert!(settings.validate().is_err());
        }

        let mut settings = Settings::default();
        settings.outgoing.code_context_timeout = MAX_TIMEOUT_SECS;
        assert!(settings.validate().is_ok());
        let timeout = std::time::Duration::from_secs_f64(settings.outgoing.code_context_timeout);
        assert_eq!(timeout.as_secs(), 3600);
    }
}

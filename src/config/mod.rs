//! Configuration module for search-proxy
//!
//! Handles loading and validating settings from YAML files and environment variables.
//! The loaded [`Settings`] value is passed explicitly to whatever needs it.

mod settings;

pub use settings::*;

use anyhow::Result;
use std::path::PathBuf;
use tracing::info;

/// Load settings from an explicit path, the discovery paths, or defaults
///
/// Environment variables are merged last and the result is validated.
pub fn load(explicit: Option<PathBuf>) -> Result<Settings> {
    let candidates = explicit
        .into_iter()
        .chain(std::env::var("SEARCH_PROXY_SETTINGS_PATH").ok().map(PathBuf::from))
        .chain([
            PathBuf::from("settings.yml"),
            PathBuf::from("config/settings.yml"),
        ])
        .chain(dirs::config_dir().map(|p| p.join("search-proxy/settings.yml")));

    let mut settings = None;
    for path in candidates {
        if path.exists() {
            info!("Loading settings from: {}", path.display());
            settings = Some(Settings::from_file(&path)?);
            break;
        }
    }

    let mut settings = settings.unwrap_or_else(|| {
        info!("No settings file found, using defaults");
        Settings::default()
    });
    settings.merge_env();
    settings.validate()?;
    Ok(settings)
}

//! Configuration service implementation.
//!
//! Loads [`AppConfig`] from `config.toml` (see [`WhatnextPaths`]) and applies
//! environment overrides on top.

use crate::paths::WhatnextPaths;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};
use whatnext_core::config::AppConfig;
use whatnext_core::error::{Result, WhatnextError};

/// Overrides `[api] base_url`.
pub const ENV_API_BASE_URL: &str = "WHATNEXT_API_BASE_URL";
/// Overrides `[chat] user_id`.
pub const ENV_USER_ID: &str = "WHATNEXT_USER_ID";

/// Loads and caches the application configuration.
#[derive(Debug, Clone, Default)]
pub struct ConfigService {
    /// Explicit file location; the platform default is used when `None`.
    path: Option<PathBuf>,
    config: Arc<RwLock<Option<AppConfig>>>,
}

impl ConfigService {
    /// Creates a service reading the platform default `config.toml`.
    ///
    /// Nothing is read until the first [`get_config`](Self::get_config).
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a service reading `path` instead of the platform default.
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Some(path.into()),
            config: Arc::new(RwLock::new(None)),
        }
    }

    pub fn config_path(&self) -> Result<PathBuf> {
        match &self.path {
            Some(path) => Ok(path.clone()),
            None => WhatnextPaths::config_file(),
        }
    }

    /// Returns the configuration, loading it on first access.
    ///
    /// An unreadable or malformed file is logged and replaced by defaults.
    pub fn get_config(&self) -> AppConfig {
        {
            let read_lock = self.config.read().unwrap_or_else(|e| e.into_inner());
            if let Some(ref cached) = *read_lock {
                return cached.clone();
            }
        }

        let loaded = match self.load() {
            Ok(config) => config,
            Err(err) => {
                tracing::warn!("[ConfigService] using defaults: {}", err);
                AppConfig::default()
            }
        };
        let loaded = apply_overrides(loaded, |key| std::env::var(key).ok());

        {
            let mut write_lock = self.config.write().unwrap_or_else(|e| e.into_inner());
            *write_lock = Some(loaded.clone());
        }

        loaded
    }

    /// Invalidates the cache, forcing a reload on next access.
    pub fn invalidate_cache(&self) {
        let mut write_lock = self.config.write().unwrap_or_else(|e| e.into_inner());
        *write_lock = None;
    }

    /// Reads the file without touching the cache or the environment.
    ///
    /// A missing file yields the defaults.
    pub fn load(&self) -> Result<AppConfig> {
        let path = self.config_path()?;
        if !path.exists() {
            tracing::debug!("[ConfigService] {} not found, using defaults", path.display());
            return Ok(AppConfig::default());
        }
        read_config(&path)
    }

    /// Writes `config` to the config file, creating parent directories.
    pub fn save(&self, config: &AppConfig) -> Result<()> {
        let path = self.config_path()?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let text = toml::to_string_pretty(config)?;
        std::fs::write(&path, text)?;
        tracing::info!("[ConfigService] saved {}", path.display());
        self.invalidate_cache();
        Ok(())
    }
}

fn read_config(path: &Path) -> Result<AppConfig> {
    let text = std::fs::read_to_string(path).map_err(|err| {
        WhatnextError::io(format!("failed to read {}: {}", path.display(), err))
    })?;
    toml::from_str(&text).map_err(|err| {
        WhatnextError::config(format!("failed to parse {}: {}", path.display(), err))
    })
}

/// Applies environment overrides; `lookup` resolves a variable name.
///
/// Empty values are ignored.
pub fn apply_overrides<F>(mut config: AppConfig, lookup: F) -> AppConfig
where
    F: Fn(&str) -> Option<String>,
{
    let non_empty = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

    if let Some(base_url) = non_empty(ENV_API_BASE_URL) {
        config.api.base_url = base_url;
    }
    if let Some(user_id) = non_empty(ENV_USER_ID) {
        config.chat.user_id = user_id;
    }
    config
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overrides_replace_file_values() {
        let config = apply_overrides(AppConfig::default(), |key| match key {
            ENV_API_BASE_URL => Some("http://localhost:9000".to_string()),
            ENV_USER_ID => Some("   ".to_string()),
            _ => None,
        });
        assert_eq!(config.api.base_url, "http://localhost:9000");
        assert_eq!(config.chat.user_id, "");
    }

    #[test]
    fn no_overrides_is_identity() {
        let config = apply_overrides(AppConfig::default(), |_| None);
        assert_eq!(config, AppConfig::default());
    }
}

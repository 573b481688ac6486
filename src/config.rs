//! Application configuration management.
//!
//! Holds the backend origin and the last used login email, stored at
//! `~/.config/bayan-admin/config.json`. A `BAYAN_API_URL` environment
//! variable (or `.env` entry) overrides the configured origin.

use std::path::PathBuf;

use anyhow::Result;
use serde::{Deserialize, Serialize};

/// Application name used for config/cache directory paths
const APP_NAME: &str = "bayan-admin";

/// Config file name
const CONFIG_FILE: &str = "config.json";

/// Environment variable overriding the backend origin
const API_URL_ENV: &str = "BAYAN_API_URL";

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    pub api_url: Option<String>,
    pub last_email: Option<String>,
}

impl Config {
    pub fn load() -> Result<Self> {
        // Pick up a .env file if present (silently ignore if not found)
        let _ = dotenvy::dotenv();

        let path = Self::config_path()?;
        let mut config: Config = if path.exists() {
            let contents = std::fs::read_to_string(&path)?;
            serde_json::from_str(&contents)?
        } else {
            Self::default()
        };

        if let Ok(url) = std::env::var(API_URL_ENV) {
            if !url.is_empty() {
                config.api_url = Some(url);
            }
        }

        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        let path = Self::config_path()?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(self)?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?;
        Ok(config_dir.join(APP_NAME).join(CONFIG_FILE))
    }

    /// Directory holding the persisted session, one subdirectory per
    /// backend host so sessions against different origins don't collide.
    pub fn cache_dir(&self) -> Result<PathBuf> {
        let cache_dir = dirs::cache_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find cache directory"))?;

        let mut path = cache_dir.join(APP_NAME);
        if let Some(host) = self.host_slug() {
            path = path.join(host);
        }
        Ok(path)
    }

    fn host_slug(&self) -> Option<String> {
        let url = self.api_url.as_deref()?;
        let host = url
            .trim_start_matches("https://")
            .trim_start_matches("http://")
            .split('/')
            .next()?;
        if host.is_empty() {
            return None;
        }
        Some(
            host.chars()
                .map(|c| if c.is_ascii_alphanumeric() { c } else { '-' })
                .collect(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_host_slug() {
        let config = Config {
            api_url: Some("https://admin.bayan.example:8443/api".to_string()),
            last_email: None,
        };
        assert_eq!(
            config.host_slug().as_deref(),
            Some("admin-bayan-example-8443")
        );

        let bare = Config::default();
        assert_eq!(bare.host_slug(), None);
    }
}

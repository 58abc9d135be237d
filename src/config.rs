//! Application configuration management.
//!
//! This module handles loading and saving the application configuration:
//! where the site's static assets live and which host the realtime
//! messaging backend answers on.
//!
//! Configuration is stored at `~/.config/quotewheel/config.json`. The
//! cache manifest itself is baked in: `CACHE_VERSION` must change
//! whenever the asset list changes so activation purges the old
//! generation.

use std::path::PathBuf;

use anyhow::Result;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::cache::CacheManifest;

/// Application name used for config/cache directory paths
const APP_NAME: &str = "quotewheel";

/// Config file name
const CONFIG_FILE: &str = "config.json";

/// Named cache generation for the current asset set.
const CACHE_VERSION: &str = "quotewheel-cache-v2";

/// Asset paths pre-warmed at install, relative to the site base URL.
const STATIC_ASSETS: &[&str] = &[
    "index.html",
    "styles.css",
    "quotes.json",
    "nicknames.json",
    "offline.html",
];

/// Served in place of failed navigations.
const OFFLINE_PAGE: &str = "offline.html";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Base URL the static assets are served from.
    pub site_base_url: String,
    /// Host suffix of the realtime messaging backend.
    pub backend_host: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            site_base_url: "https://quotewheel.example.com".to_string(),
            backend_host: "backend.example.net".to_string(),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;
        if path.exists() {
            let contents = std::fs::read_to_string(&path)?;
            Ok(serde_json::from_str(&contents)?)
        } else {
            // First run: persist the defaults so there is a file to edit
            let config = Self::default();
            if let Err(e) = config.save() {
                warn!(error = %e, "Failed to write default config");
            }
            Ok(config)
        }
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

    pub fn cache_dir(&self) -> Result<PathBuf> {
        let cache_dir = dirs::cache_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find cache directory"))?;
        Ok(cache_dir.join(APP_NAME))
    }

    /// Absolute URL of an asset relative to the site base.
    pub fn asset_url(&self, path: &str) -> String {
        format!("{}/{}", self.site_base_url.trim_end_matches('/'), path)
    }

    pub fn content_url(&self) -> String {
        self.asset_url("quotes.json")
    }

    pub fn nicknames_url(&self) -> String {
        self.asset_url("nicknames.json")
    }

    /// The baked-in cache manifest for this deployment.
    pub fn cache_manifest(&self) -> CacheManifest {
        CacheManifest {
            version: CACHE_VERSION.to_string(),
            assets: STATIC_ASSETS.iter().map(|p| self.asset_url(p)).collect(),
            offline_fallback: self.asset_url(OFFLINE_PAGE),
        }
    }
}

// Allow dead code: lifecycle introspection accessors
#![allow(dead_code)]

//! Cache lifecycle: install, activate, and version garbage collection.
//!
//! The manifest ties a named cache version to the set of asset URLs it
//! should be pre-warmed with. `install` populates the version best-effort;
//! `activate` is the only place old versions are ever deleted. Routers
//! read and write entries within the current version but never manage
//! versions themselves.

use anyhow::Result;
use futures::stream::{self, StreamExt};
use tracing::{info, warn};

use crate::cache::store::{CacheEntry, CacheStore};
use crate::net::Fetcher;

/// Maximum concurrent asset fetches during pre-warm.
/// Keeps install fast on a cold cache without hammering the host.
const MAX_CONCURRENT_PREWARM: usize = 4;

/// A fixed, versioned asset list baked in at build time. The version
/// identifier must change whenever the asset set changes so activation
/// purges the stale generation.
#[derive(Debug, Clone)]
pub struct CacheManifest {
    pub version: String,
    pub assets: Vec<String>,
    /// Served in place of failed navigations; expected to be listed in
    /// `assets` so install pre-warms it.
    pub offline_fallback: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
    Uninitialized,
    Installed,
    Active,
}

pub struct CacheLifecycleManager {
    store: CacheStore,
    manifest: CacheManifest,
    state: LifecycleState,
}

impl CacheLifecycleManager {
    pub fn new(store: CacheStore, manifest: CacheManifest) -> Self {
        Self {
            store,
            manifest,
            state: LifecycleState::Uninitialized,
        }
    }

    pub fn version(&self) -> &str {
        &self.manifest.version
    }

    pub fn state(&self) -> LifecycleState {
        self.state
    }

    /// Pre-warm the manifest assets into this manifest's cache version.
    /// Each asset is fetched independently; failures are logged and
    /// skipped, never aborting the rest of the manifest. Returns how many
    /// assets were actually cached.
    pub async fn install<F: Fetcher>(&mut self, fetcher: &F) -> Result<usize> {
        self.store.open_version(&self.manifest.version)?;

        let results: Vec<_> = stream::iter(self.manifest.assets.iter())
            .map(|url| async move { (url.as_str(), fetcher.fetch(url).await) })
            .buffer_unordered(MAX_CONCURRENT_PREWARM)
            .collect()
            .await;

        let mut cached = 0;
        for (url, result) in results {
            match result {
                Ok(response) if response.is_success() => {
                    let entry = CacheEntry::from_response(url, &response);
                    match self.store.put(&self.manifest.version, &entry) {
                        Ok(()) => cached += 1,
                        Err(e) => warn!(url, error = %e, "Failed to store pre-cached asset"),
                    }
                }
                Ok(response) => {
                    warn!(url, status = response.status, "Skipping pre-cache of non-200 asset");
                }
                Err(e) => {
                    warn!(url, error = %e, "Failed to pre-cache asset");
                }
            }
        }

        self.state = LifecycleState::Installed;
        info!(
            version = %self.manifest.version,
            cached,
            total = self.manifest.assets.len(),
            "Cache installed"
        );
        Ok(cached)
    }

    /// Delete every cache version other than this manifest's and return
    /// the purged names.
    pub fn activate(&mut self) -> Result<Vec<String>> {
        // The current version must exist even if activate runs first
        self.store.open_version(&self.manifest.version)?;

        let mut purged = Vec::new();
        for version in self.store.list_versions()? {
            if version != self.manifest.version {
                self.store.delete_version(&version)?;
                purged.push(version);
            }
        }

        self.state = LifecycleState::Active;
        info!(version = %self.manifest.version, purged = purged.len(), "Cache activated");
        Ok(purged)
    }

    /// Look up an entry within the current cache version.
    pub fn lookup(&self, url: &str) -> Result<Option<CacheEntry>> {
        self.store.lookup(&self.manifest.version, url)
    }

    /// Store an entry within the current cache version.
    pub fn put(&self, entry: &CacheEntry) -> Result<()> {
        self.store.put(&self.manifest.version, entry)
    }

    /// The pre-cached offline fallback page, if install managed to cache it.
    pub fn offline_fallback(&self) -> Result<Option<CacheEntry>> {
        self.lookup(&self.manifest.offline_fallback)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::net::{FetchError, FetchedResponse};
    use std::collections::HashMap;

    struct FakeFetcher {
        responses: HashMap<String, FetchedResponse>,
    }

    impl FakeFetcher {
        fn new() -> Self {
            Self {
                responses: HashMap::new(),
            }
        }

        fn with(mut self, url: &str, status: u16, body: &[u8]) -> Self {
            self.responses.insert(
                url.to_string(),
                FetchedResponse {
                    url: url.to_string(),
                    status,
                    content_type: None,
                    body: body.to_vec(),
                },
            );
            self
        }
    }

    impl Fetcher for FakeFetcher {
        async fn fetch(&self, url: &str) -> Result<FetchedResponse, FetchError> {
            self.responses
                .get(url)
                .cloned()
                .ok_or_else(|| FetchError::Failed(format!("unreachable: {}", url)))
        }
    }

    fn manifest(version: &str, assets: &[&str]) -> CacheManifest {
        CacheManifest {
            version: version.to_string(),
            assets: assets.iter().map(|s| s.to_string()).collect(),
            offline_fallback: "https://example.com/offline.html".to_string(),
        }
    }

    #[tokio::test]
    async fn test_install_partial_success() {
        let dir = tempfile::tempdir().unwrap();
        let store = CacheStore::new(dir.path().to_path_buf()).unwrap();
        let fetcher = FakeFetcher::new()
            .with("https://example.com/index.html", 200, b"<html>")
            .with("https://example.com/broken.css", 500, b"oops");

        let mut lifecycle = CacheLifecycleManager::new(
            store,
            manifest(
                "v1",
                &[
                    "https://example.com/index.html",
                    "https://example.com/broken.css",
                    "https://example.com/unreachable.js",
                ],
            ),
        );

        // One success, one non-200, one transport failure: install still
        // completes and caches the one good asset.
        let cached = lifecycle.install(&fetcher).await.unwrap();
        assert_eq!(cached, 1);
        assert_eq!(lifecycle.state(), LifecycleState::Installed);
        assert!(lifecycle
            .lookup("https://example.com/index.html")
            .unwrap()
            .is_some());
        assert!(lifecycle
            .lookup("https://example.com/broken.css")
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_activate_purges_stale_versions() {
        let dir = tempfile::tempdir().unwrap();
        let store = CacheStore::new(dir.path().to_path_buf()).unwrap();

        // Seed an old generation with an entry.
        store.open_version("v1").unwrap();
        store
            .put(
                "v1",
                &CacheEntry {
                    url: "https://example.com/old".to_string(),
                    status: 200,
                    content_type: None,
                    body: b"old".to_vec(),
                    cached_at: chrono::Utc::now(),
                },
            )
            .unwrap();

        let fetcher = FakeFetcher::new().with("https://example.com/index.html", 200, b"<html>");
        let mut lifecycle = CacheLifecycleManager::new(
            store,
            manifest("v2", &["https://example.com/index.html"]),
        );
        lifecycle.install(&fetcher).await.unwrap();

        let purged = lifecycle.activate().unwrap();
        assert_eq!(purged, vec!["v1"]);
        assert_eq!(lifecycle.state(), LifecycleState::Active);
    }

    #[tokio::test]
    async fn test_activate_keeps_current_version() {
        let dir = tempfile::tempdir().unwrap();
        let store = CacheStore::new(dir.path().to_path_buf()).unwrap();
        let fetcher = FakeFetcher::new().with("https://example.com/a", 200, b"a");

        let mut lifecycle =
            CacheLifecycleManager::new(store, manifest("v1", &["https://example.com/a"]));
        lifecycle.install(&fetcher).await.unwrap();
        let purged = lifecycle.activate().unwrap();

        assert!(purged.is_empty());
        assert!(lifecycle.lookup("https://example.com/a").unwrap().is_some());
    }
}

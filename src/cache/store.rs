//! Versioned on-disk cache store.
//!
//! Each cache version is a directory under the store root; each entry is a
//! single JSON file named after its request URL. Entries are written whole
//! and replaced, never mutated in place, so reads and writes are atomic
//! from the router's point of view. Version directories are only ever
//! deleted by `CacheLifecycleManager::activate`.

use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::net::FetchedResponse;

/// One cached response, keyed by the request URL.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheEntry {
    pub url: String,
    pub status: u16,
    pub content_type: Option<String>,
    pub body: Vec<u8>,
    pub cached_at: DateTime<Utc>,
}

impl CacheEntry {
    /// Capture a network response under the URL the request targeted
    /// (not the post-redirect URL).
    pub fn from_response(request_url: &str, response: &FetchedResponse) -> Self {
        Self {
            url: request_url.to_string(),
            status: response.status,
            content_type: response.content_type.clone(),
            body: response.body.clone(),
            cached_at: Utc::now(),
        }
    }
}

pub struct CacheStore {
    root: PathBuf,
}

impl CacheStore {
    pub fn new(root: PathBuf) -> Result<Self> {
        std::fs::create_dir_all(&root)
            .with_context(|| format!("Failed to create cache root: {}", root.display()))?;
        Ok(Self { root })
    }

    /// Create the directory for a cache version if it does not exist yet.
    pub fn open_version(&self, version: &str) -> Result<()> {
        std::fs::create_dir_all(self.root.join(version))
            .with_context(|| format!("Failed to create cache version: {}", version))?;
        Ok(())
    }

    fn entry_path(&self, version: &str, url: &str) -> PathBuf {
        self.root
            .join(version)
            .join(format!("{}.json", encode_key(url)))
    }

    pub fn lookup(&self, version: &str, url: &str) -> Result<Option<CacheEntry>> {
        let path = self.entry_path(version, url);
        if !path.exists() {
            return Ok(None);
        }

        let contents = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read cache entry for: {}", url))?;
        let entry: CacheEntry = serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse cache entry for: {}", url))?;

        debug!(url, version, "Cache hit");
        Ok(Some(entry))
    }

    pub fn put(&self, version: &str, entry: &CacheEntry) -> Result<()> {
        let path = self.entry_path(version, &entry.url);
        let contents = serde_json::to_string(entry)?;
        std::fs::write(&path, contents)
            .with_context(|| format!("Failed to write cache entry for: {}", entry.url))?;
        debug!(url = %entry.url, version, bytes = entry.body.len(), "Cached");
        Ok(())
    }

    /// Names of all cache versions present in the store.
    pub fn list_versions(&self) -> Result<Vec<String>> {
        let mut versions = Vec::new();
        for dir_entry in std::fs::read_dir(&self.root)
            .with_context(|| format!("Failed to list cache root: {}", self.root.display()))?
        {
            let dir_entry = dir_entry?;
            if dir_entry.file_type()?.is_dir() {
                if let Some(name) = dir_entry.file_name().to_str() {
                    versions.push(name.to_string());
                }
            }
        }
        versions.sort();
        Ok(versions)
    }

    pub fn delete_version(&self, version: &str) -> Result<()> {
        let path = self.root.join(version);
        if path.exists() {
            std::fs::remove_dir_all(&path)
                .with_context(|| format!("Failed to delete cache version: {}", version))?;
        }
        Ok(())
    }
}

/// Map a URL to a filesystem-safe name: bytes outside `[A-Za-z0-9.-]` are
/// escaped as `_XX` hex. `_` itself is escaped so distinct URLs can never
/// collide.
fn encode_key(url: &str) -> String {
    let mut out = String::with_capacity(url.len());
    for byte in url.bytes() {
        match byte {
            b'a'..=b'z' | b'A'..=b'Z' | b'0'..=b'9' | b'.' | b'-' => out.push(byte as char),
            _ => out.push_str(&format!("_{:02X}", byte)),
        }
    }
    out
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(url: &str, body: &[u8]) -> CacheEntry {
        CacheEntry {
            url: url.to_string(),
            status: 200,
            content_type: Some("text/plain".to_string()),
            body: body.to_vec(),
            cached_at: Utc::now(),
        }
    }

    #[test]
    fn test_put_and_lookup() {
        let dir = tempfile::tempdir().unwrap();
        let store = CacheStore::new(dir.path().to_path_buf()).unwrap();
        store.open_version("v1").unwrap();

        let url = "https://example.com/styles.css?x=1";
        store.put("v1", &entry(url, b"body { }")).unwrap();

        let found = store.lookup("v1", url).unwrap().unwrap();
        assert_eq!(found.url, url);
        assert_eq!(found.body, b"body { }");
        assert_eq!(found.status, 200);
    }

    #[test]
    fn test_lookup_miss() {
        let dir = tempfile::tempdir().unwrap();
        let store = CacheStore::new(dir.path().to_path_buf()).unwrap();
        store.open_version("v1").unwrap();
        assert!(store
            .lookup("v1", "https://example.com/missing")
            .unwrap()
            .is_none());
    }

    #[test]
    fn test_put_replaces_entry() {
        let dir = tempfile::tempdir().unwrap();
        let store = CacheStore::new(dir.path().to_path_buf()).unwrap();
        store.open_version("v1").unwrap();

        let url = "https://example.com/app.js";
        store.put("v1", &entry(url, b"old")).unwrap();
        store.put("v1", &entry(url, b"new")).unwrap();

        let found = store.lookup("v1", url).unwrap().unwrap();
        assert_eq!(found.body, b"new");
    }

    #[test]
    fn test_versions_are_isolated() {
        let dir = tempfile::tempdir().unwrap();
        let store = CacheStore::new(dir.path().to_path_buf()).unwrap();
        store.open_version("v1").unwrap();
        store.open_version("v2").unwrap();

        let url = "https://example.com/a";
        store.put("v1", &entry(url, b"one")).unwrap();
        assert!(store.lookup("v2", url).unwrap().is_none());
    }

    #[test]
    fn test_list_and_delete_versions() {
        let dir = tempfile::tempdir().unwrap();
        let store = CacheStore::new(dir.path().to_path_buf()).unwrap();
        store.open_version("v1").unwrap();
        store.open_version("v2").unwrap();
        assert_eq!(store.list_versions().unwrap(), vec!["v1", "v2"]);

        store.delete_version("v1").unwrap();
        assert_eq!(store.list_versions().unwrap(), vec!["v2"]);

        // Deleting an absent version is not an error
        store.delete_version("v1").unwrap();
    }

    #[test]
    fn test_encode_key_escapes_ambiguity() {
        assert_eq!(encode_key("a_b"), "a_5Fb");
        assert_ne!(encode_key("a_b"), encode_key("a/b"));
        assert_eq!(
            encode_key("https://x.y/z"),
            "https_3A_2F_2Fx.y_2Fz"
        );
    }
}

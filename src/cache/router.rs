// Allow dead code: request constructors for paths driven by the UI layer
#![allow(dead_code)]

//! Request routing with a per-class caching policy.
//!
//! Classification is a pure function of the request, so the branch logic
//! is unit-testable without a live network; execution is generic over the
//! `Fetcher` seam. The router is stateless across requests - the only
//! persisted state is the cache content, owned by `CacheLifecycleManager`.

use reqwest::Url;
use tracing::{debug, warn};

use crate::cache::lifecycle::CacheLifecycleManager;
use crate::cache::store::CacheEntry;
use crate::net::{FetchedResponse, Fetcher};

/// Whether a request loads a page or a sub-resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestMode {
    Navigate,
    Asset,
}

#[derive(Debug, Clone)]
pub struct Request {
    pub url: String,
    pub method: String,
    pub mode: RequestMode,
}

impl Request {
    /// A GET request for an ordinary sub-resource.
    pub fn get(url: &str) -> Self {
        Self {
            url: url.to_string(),
            method: "GET".to_string(),
            mode: RequestMode::Asset,
        }
    }

    /// A top-level navigation request.
    pub fn navigate(url: &str) -> Self {
        Self {
            url: url.to_string(),
            method: "GET".to_string(),
            mode: RequestMode::Navigate,
        }
    }

    pub fn with_method(mut self, method: &str) -> Self {
        self.method = method.to_string();
        self
    }
}

/// Response strategy for one request class.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Policy {
    /// Not a cacheable read; the caller performs the request itself.
    Bypass,
    /// Realtime backend: network first, cache fallback, no write-back.
    NetworkFirst,
    /// Top-level navigation: network first, offline page on failure.
    NavigationFallback,
    /// Ordinary static asset: cache first, network on miss with write-back.
    CacheFirst,
}

/// How a request was answered.
#[derive(Debug)]
pub enum Routed {
    /// Live network response.
    Network(FetchedResponse),
    /// Served from the active cache version.
    Cached(CacheEntry),
    /// The pre-cached offline fallback page.
    Fallback(CacheEntry),
    /// Out of scope for the router; caller's own request path applies.
    Bypass,
    /// Nothing to serve; the caller's normal failed-request path applies.
    Miss,
}

pub struct CacheRouter<'a, F> {
    lifecycle: &'a CacheLifecycleManager,
    fetcher: &'a F,
    /// Host (or host suffix) of the realtime messaging backend.
    backend_host: &'a str,
}

impl<'a, F: Fetcher> CacheRouter<'a, F> {
    pub fn new(lifecycle: &'a CacheLifecycleManager, fetcher: &'a F, backend_host: &'a str) -> Self {
        Self {
            lifecycle,
            fetcher,
            backend_host,
        }
    }

    /// Pick the policy for a request. Evaluated in priority order: only
    /// well-formed http(s) GETs are handled at all, the realtime backend
    /// beats the navigation check, everything else is a static asset.
    pub fn classify(&self, request: &Request) -> Policy {
        if request.method != "GET" || !is_valid_url(&request.url) {
            return Policy::Bypass;
        }
        if self.is_backend(&request.url) {
            return Policy::NetworkFirst;
        }
        if request.mode == RequestMode::Navigate {
            return Policy::NavigationFallback;
        }
        Policy::CacheFirst
    }

    /// Route one request to completion. Every failure mode maps to a
    /// `Routed` outcome; the router itself never errors.
    pub async fn handle(&self, request: &Request) -> Routed {
        let policy = self.classify(request);
        debug!(url = %request.url, ?policy, "Routing request");

        match policy {
            Policy::Bypass => Routed::Bypass,
            Policy::NetworkFirst => self.network_first(request).await,
            Policy::NavigationFallback => self.navigation(request).await,
            Policy::CacheFirst => self.cache_first(request).await,
        }
    }

    async fn network_first(&self, request: &Request) -> Routed {
        match self.fetcher.fetch(&request.url).await {
            Ok(response) => Routed::Network(response),
            Err(e) => {
                debug!(url = %request.url, error = %e, "Backend fetch failed, trying cache");
                match self.lookup(&request.url) {
                    Some(entry) => Routed::Cached(entry),
                    None => Routed::Miss,
                }
            }
        }
    }

    async fn navigation(&self, request: &Request) -> Routed {
        match self.fetcher.fetch(&request.url).await {
            Ok(response) => Routed::Network(response),
            Err(e) => {
                warn!(url = %request.url, error = %e, "Navigation failed, serving offline page");
                match self.lifecycle.offline_fallback() {
                    Ok(Some(entry)) => Routed::Fallback(entry),
                    Ok(None) => Routed::Miss,
                    Err(e) => {
                        warn!(error = %e, "Failed to read offline fallback");
                        Routed::Miss
                    }
                }
            }
        }
    }

    async fn cache_first(&self, request: &Request) -> Routed {
        if let Some(entry) = self.lookup(&request.url) {
            return Routed::Cached(entry);
        }

        match self.fetcher.fetch(&request.url).await {
            Ok(response) => {
                // Only successful same-origin responses are captured;
                // caching is best-effort and never blocks delivery.
                if response.is_success() && response.same_origin_as(&request.url) {
                    let entry = CacheEntry::from_response(&request.url, &response);
                    if let Err(e) = self.lifecycle.put(&entry) {
                        warn!(url = %request.url, error = %e, "Failed to cache response");
                    }
                }
                Routed::Network(response)
            }
            Err(e) => {
                debug!(url = %request.url, error = %e, "Asset unavailable");
                Routed::Miss
            }
        }
    }

    /// Cache lookup that treats read errors as misses.
    fn lookup(&self, url: &str) -> Option<CacheEntry> {
        match self.lifecycle.lookup(url) {
            Ok(entry) => entry,
            Err(e) => {
                warn!(url, error = %e, "Cache lookup failed");
                None
            }
        }
    }

    fn is_backend(&self, url: &str) -> bool {
        let Ok(parsed) = Url::parse(url) else {
            return false;
        };
        match parsed.host_str() {
            Some(host) => {
                host == self.backend_host || host.ends_with(&format!(".{}", self.backend_host))
            }
            None => false,
        }
    }
}

/// A request is only routable if it targets a well-formed http(s) URL.
fn is_valid_url(url: &str) -> bool {
    match Url::parse(url) {
        Ok(parsed) => matches!(parsed.scheme(), "http" | "https"),
        Err(_) => false,
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::lifecycle::CacheManifest;
    use crate::cache::store::CacheStore;
    use crate::net::FetchError;
    use std::cell::RefCell;
    use std::collections::HashMap;

    const BACKEND_HOST: &str = "backend.example.net";
    const OFFLINE_URL: &str = "https://example.com/offline.html";

    struct FakeFetcher {
        responses: HashMap<String, FetchedResponse>,
        calls: RefCell<Vec<String>>,
    }

    impl FakeFetcher {
        fn new() -> Self {
            Self {
                responses: HashMap::new(),
                calls: RefCell::new(Vec::new()),
            }
        }

        fn with(self, url: &str, status: u16, body: &[u8]) -> Self {
            self.with_final_url(url, url, status, body)
        }

        fn with_final_url(mut self, url: &str, final_url: &str, status: u16, body: &[u8]) -> Self {
            self.responses.insert(
                url.to_string(),
                FetchedResponse {
                    url: final_url.to_string(),
                    status,
                    content_type: None,
                    body: body.to_vec(),
                },
            );
            self
        }

        fn call_count(&self) -> usize {
            self.calls.borrow().len()
        }
    }

    impl Fetcher for FakeFetcher {
        async fn fetch(&self, url: &str) -> Result<FetchedResponse, FetchError> {
            self.calls.borrow_mut().push(url.to_string());
            self.responses
                .get(url)
                .cloned()
                .ok_or_else(|| FetchError::Failed(format!("unreachable: {}", url)))
        }
    }

    fn lifecycle(dir: &tempfile::TempDir) -> CacheLifecycleManager {
        let store = CacheStore::new(dir.path().to_path_buf()).unwrap();
        store.open_version("v1").unwrap();
        CacheLifecycleManager::new(
            store,
            CacheManifest {
                version: "v1".to_string(),
                assets: vec![OFFLINE_URL.to_string()],
                offline_fallback: OFFLINE_URL.to_string(),
            },
        )
    }

    fn seed(lifecycle: &CacheLifecycleManager, url: &str, body: &[u8]) {
        lifecycle
            .put(&CacheEntry {
                url: url.to_string(),
                status: 200,
                content_type: None,
                body: body.to_vec(),
                cached_at: chrono::Utc::now(),
            })
            .unwrap();
    }

    #[test]
    fn test_classify_priority_order() {
        let dir = tempfile::tempdir().unwrap();
        let lc = lifecycle(&dir);
        let fetcher = FakeFetcher::new();
        let router = CacheRouter::new(&lc, &fetcher, BACKEND_HOST);

        // Non-GET wins over everything.
        let post = Request::navigate("https://backend.example.net/messages").with_method("POST");
        assert_eq!(router.classify(&post), Policy::Bypass);

        // Malformed and non-http URLs bypass.
        assert_eq!(router.classify(&Request::get("not a url")), Policy::Bypass);
        assert_eq!(
            router.classify(&Request::get("ftp://example.com/file")),
            Policy::Bypass
        );

        // Backend beats the navigation check.
        let backend_nav = Request::navigate("https://app.backend.example.net/sync");
        assert_eq!(router.classify(&backend_nav), Policy::NetworkFirst);

        assert_eq!(
            router.classify(&Request::navigate("https://example.com/")),
            Policy::NavigationFallback
        );
        assert_eq!(
            router.classify(&Request::get("https://example.com/styles.css")),
            Policy::CacheFirst
        );
    }

    #[tokio::test]
    async fn test_navigation_failure_serves_offline_page() {
        let dir = tempfile::tempdir().unwrap();
        let lc = lifecycle(&dir);
        seed(&lc, OFFLINE_URL, b"<h1>offline</h1>");
        // A cached copy of the page itself must NOT be preferred.
        seed(&lc, "https://example.com/page", b"stale page");

        let fetcher = FakeFetcher::new();
        let router = CacheRouter::new(&lc, &fetcher, BACKEND_HOST);

        match router.handle(&Request::navigate("https://example.com/page")).await {
            Routed::Fallback(entry) => {
                assert_eq!(entry.url, OFFLINE_URL);
                assert_eq!(entry.body, b"<h1>offline</h1>");
            }
            other => panic!("expected offline fallback, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_navigation_success_uses_network() {
        let dir = tempfile::tempdir().unwrap();
        let lc = lifecycle(&dir);
        let fetcher = FakeFetcher::new().with("https://example.com/", 200, b"<html>");
        let router = CacheRouter::new(&lc, &fetcher, BACKEND_HOST);

        match router.handle(&Request::navigate("https://example.com/")).await {
            Routed::Network(resp) => assert_eq!(resp.body, b"<html>"),
            other => panic!("expected network response, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_asset_cache_hit_skips_network() {
        let dir = tempfile::tempdir().unwrap();
        let lc = lifecycle(&dir);
        let url = "https://example.com/styles.css";
        seed(&lc, url, b"body { }");

        let fetcher = FakeFetcher::new().with(url, 200, b"fresher");
        let router = CacheRouter::new(&lc, &fetcher, BACKEND_HOST);

        match router.handle(&Request::get(url)).await {
            Routed::Cached(entry) => assert_eq!(entry.body, b"body { }"),
            other => panic!("expected cached response, got {:?}", other),
        }
        assert_eq!(fetcher.call_count(), 0, "cache hit must not touch the network");
    }

    #[tokio::test]
    async fn test_asset_miss_fetches_and_caches() {
        let dir = tempfile::tempdir().unwrap();
        let lc = lifecycle(&dir);
        let url = "https://example.com/app.js";
        let fetcher = FakeFetcher::new().with(url, 200, b"console.log(1)");
        let router = CacheRouter::new(&lc, &fetcher, BACKEND_HOST);

        match router.handle(&Request::get(url)).await {
            Routed::Network(resp) => assert_eq!(resp.body, b"console.log(1)"),
            other => panic!("expected network response, got {:?}", other),
        }
        let entry = lc.lookup(url).unwrap().expect("response should be cached");
        assert_eq!(entry.body, b"console.log(1)");
    }

    #[tokio::test]
    async fn test_asset_non_200_not_cached() {
        let dir = tempfile::tempdir().unwrap();
        let lc = lifecycle(&dir);
        let url = "https://example.com/missing.png";
        let fetcher = FakeFetcher::new().with(url, 404, b"not found");
        let router = CacheRouter::new(&lc, &fetcher, BACKEND_HOST);

        match router.handle(&Request::get(url)).await {
            Routed::Network(resp) => assert_eq!(resp.status, 404),
            other => panic!("expected network response, got {:?}", other),
        }
        assert!(lc.lookup(url).unwrap().is_none());
    }

    #[tokio::test]
    async fn test_asset_cross_origin_not_cached() {
        let dir = tempfile::tempdir().unwrap();
        let lc = lifecycle(&dir);
        let url = "https://example.com/lib.js";
        // Redirected off-origin: returned, but never written back.
        let fetcher =
            FakeFetcher::new().with_final_url(url, "https://cdn.example.net/lib.js", 200, b"x");
        let router = CacheRouter::new(&lc, &fetcher, BACKEND_HOST);

        assert!(matches!(
            router.handle(&Request::get(url)).await,
            Routed::Network(_)
        ));
        assert!(lc.lookup(url).unwrap().is_none());
    }

    #[tokio::test]
    async fn test_asset_miss_with_network_failure() {
        let dir = tempfile::tempdir().unwrap();
        let lc = lifecycle(&dir);
        let fetcher = FakeFetcher::new();
        let router = CacheRouter::new(&lc, &fetcher, BACKEND_HOST);

        assert!(matches!(
            router.handle(&Request::get("https://example.com/gone.css")).await,
            Routed::Miss
        ));
    }

    #[tokio::test]
    async fn test_backend_network_first_no_write_back() {
        let dir = tempfile::tempdir().unwrap();
        let lc = lifecycle(&dir);
        let url = "https://backend.example.net/messages";
        let fetcher = FakeFetcher::new().with(url, 200, b"[]");
        let router = CacheRouter::new(&lc, &fetcher, BACKEND_HOST);

        assert!(matches!(
            router.handle(&Request::get(url)).await,
            Routed::Network(_)
        ));
        assert!(lc.lookup(url).unwrap().is_none(), "backend responses are not cached");
    }

    #[tokio::test]
    async fn test_backend_failure_falls_back_to_cache() {
        let dir = tempfile::tempdir().unwrap();
        let lc = lifecycle(&dir);
        let url = "https://backend.example.net/messages";
        seed(&lc, url, b"[cached]");

        let fetcher = FakeFetcher::new();
        let router = CacheRouter::new(&lc, &fetcher, BACKEND_HOST);

        match router.handle(&Request::get(url)).await {
            Routed::Cached(entry) => assert_eq!(entry.body, b"[cached]"),
            other => panic!("expected cached fallback, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_non_get_bypasses_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let lc = lifecycle(&dir);
        let fetcher = FakeFetcher::new();
        let router = CacheRouter::new(&lc, &fetcher, BACKEND_HOST);

        let request = Request::get("https://example.com/save").with_method("POST");
        assert!(matches!(router.handle(&request).await, Routed::Bypass));
        assert_eq!(fetcher.call_count(), 0);
    }
}

//! Network fetching behind a trait seam.
//!
//! The cache router and lifecycle manager only see the `Fetcher` trait, so
//! tests inject fakes and never open a socket. `HttpFetcher` is the real
//! implementation over a shared reqwest client.

use reqwest::{header, Client, Url};
use tracing::debug;

use super::FetchError;

/// HTTP request timeout in seconds.
/// 30s tolerates slow asset hosts while still failing fast enough for the
/// offline fallback paths to feel responsive.
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// A captured network response. HTTP error statuses are data, not errors -
/// the router passes non-200 responses through without caching them.
#[derive(Debug, Clone)]
pub struct FetchedResponse {
    /// Final URL after redirects.
    pub url: String,
    pub status: u16,
    pub content_type: Option<String>,
    pub body: Vec<u8>,
}

impl FetchedResponse {
    pub fn is_success(&self) -> bool {
        self.status == 200
    }

    /// Whether the response landed on the same origin the request targeted
    /// (scheme, host, and port). Redirected-away responses are not cached.
    pub fn same_origin_as(&self, request_url: &str) -> bool {
        match (Url::parse(&self.url), Url::parse(request_url)) {
            (Ok(a), Ok(b)) => {
                a.scheme() == b.scheme()
                    && a.host_str() == b.host_str()
                    && a.port_or_known_default() == b.port_or_known_default()
            }
            _ => false,
        }
    }
}

#[allow(async_fn_in_trait)]
pub trait Fetcher {
    async fn fetch(&self, url: &str) -> Result<FetchedResponse, FetchError>;
}

/// Fetcher backed by reqwest.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new() -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;
        Ok(Self { client })
    }
}

impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<FetchedResponse, FetchError> {
        let parsed = Url::parse(url)
            .map_err(|e| FetchError::InvalidUrl(url.to_string(), e.to_string()))?;
        let response = self.client.get(parsed).send().await?;

        let status = response.status().as_u16();
        let final_url = response.url().to_string();
        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let body = response.bytes().await?.to_vec();

        debug!(url, status, bytes = body.len(), "Fetched");
        Ok(FetchedResponse {
            url: final_url,
            status,
            content_type,
            body,
        })
    }
}

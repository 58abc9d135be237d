//! Network layer: the `Fetcher` trait and its reqwest-backed implementation.

pub mod error;
pub mod fetcher;

pub use error::FetchError;
pub use fetcher::{FetchedResponse, Fetcher, HttpFetcher};

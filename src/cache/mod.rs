//! Offline caching layer.
//!
//! Three pieces with strict ownership boundaries:
//!
//! - `CacheStore`: versioned on-disk entry storage
//! - `CacheLifecycleManager`: owns which version is current; populates it
//!   at install and purges stale versions at activate
//! - `CacheRouter`: per-request policy decisions; reads and writes entries
//!   within the current version, never manages versions

pub mod lifecycle;
pub mod router;
pub mod store;

pub use lifecycle::{CacheLifecycleManager, CacheManifest, LifecycleState};
pub use router::{CacheRouter, Policy, Request, RequestMode, Routed};
pub use store::{CacheEntry, CacheStore};

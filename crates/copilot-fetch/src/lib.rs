//! copilot-fetch — upstream access for the Copilot metrics exporter.
//!
//! # Architecture
//!
//! ```text
//! FreshnessCache::get_or_refresh(now, ttl, || fetcher.fetch(token, org))
//!   ├── fresh slot   → cached Arc<Snapshot>          (hit)
//!   └── stale/empty  → Fetcher::fetch → store + return (miss)
//!                        ├── 2xx + document → latest Snapshot
//!                        ├── transport / non-2xx / bad body → empty Snapshot
//!                        └── missing token or org → FetchError::Config
//! ```
//!
//! The slot is guarded by an async mutex held across the fetch, so
//! concurrent callers during a miss share one upstream call.

pub mod cache;
pub mod error;
pub mod fetcher;

pub use cache::{DEFAULT_TTL, FreshnessCache};
pub use error::{FetchError, FetchResult};
pub use fetcher::{Fetcher, FetcherConfig, MetricsScope};

//! Generic in-memory caching for query results.
//!
//! This module is API-agnostic:
//! - Entries are keyed by a hashed `QueryKey`
//! - Freshness is evaluated lazily on read against a fixed duration
//! - Stale entries stay in place until overwritten or evicted
//! - An optional entry bound evicts least-recently-used keys

mod lru;
mod timed;
mod traits;

pub use timed::TimedCache;
pub use traits::QueryKey;

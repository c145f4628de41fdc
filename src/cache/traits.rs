//! Core traits for the caching system.

/// A query whose result can be cached.
///
/// Two keys with the same operation and parameters must produce the same
/// `cache_hash`; distinct parameters must produce distinct hashes.
pub trait QueryKey {
  /// Stable, fixed-length key used for cache lookup
  fn cache_hash(&self) -> String;

  /// Human-readable form for logging
  fn description(&self) -> String;
}

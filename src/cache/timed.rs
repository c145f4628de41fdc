//! Time-boxed cache storage.

use std::collections::HashMap;
use std::time::Duration;
use tokio::time::Instant;

use super::lru::LruTracker;

/// A single cached payload.
#[derive(Debug, Clone)]
struct CacheEntry<T> {
  payload: T,
  stored_at: Instant,
}

/// A fresh cache hit.
#[derive(Debug, Clone, PartialEq)]
pub struct Cached<T> {
  pub payload: T,
  /// Time since the payload was stored
  pub age: Duration,
}

/// In-memory cache whose entries are fresh for a fixed duration.
///
/// Staleness is only checked on read. A stale entry reads as a miss and stays
/// in the map until the next `put` for its key replaces it.
#[derive(Debug)]
pub struct TimedCache<T> {
  entries: HashMap<String, CacheEntry<T>>,
  duration: Duration,
  /// Present only when the cache is bounded
  lru: Option<(LruTracker, usize)>,
}

impl<T: Clone> TimedCache<T> {
  pub fn new(duration: Duration) -> Self {
    Self {
      entries: HashMap::new(),
      duration,
      lru: None,
    }
  }

  /// Bound the cache to `max_entries`, evicting least-recently-used keys.
  pub fn with_max_entries(mut self, max_entries: Option<usize>) -> Self {
    self.lru = max_entries
      .filter(|max| *max > 0)
      .map(|max| (LruTracker::new(), max));
    self
  }

  fn is_fresh(&self, entry: &CacheEntry<T>) -> bool {
    entry.stored_at.elapsed() < self.duration
  }

  /// Get a fresh entry, if any.
  pub fn get(&mut self, key: &str) -> Option<Cached<T>> {
    let entry = self.entries.get(key)?;
    if !self.is_fresh(entry) {
      return None;
    }

    let hit = Cached {
      payload: entry.payload.clone(),
      age: entry.stored_at.elapsed(),
    };
    if let Some((lru, _)) = &mut self.lru {
      lru.touch(key);
    }
    Some(hit)
  }

  /// Store a payload, replacing any previous entry for the key.
  pub fn put(&mut self, key: &str, payload: T) {
    self.entries.insert(
      key.to_string(),
      CacheEntry {
        payload,
        stored_at: Instant::now(),
      },
    );

    if let Some((lru, max)) = &mut self.lru {
      lru.touch(key);
      while lru.len() > *max {
        match lru.evict_oldest() {
          Some(oldest) => {
            self.entries.remove(&oldest);
          }
          None => break,
        }
      }
    }
  }

  /// Number of stored entries, stale ones included.
  pub fn len(&self) -> usize {
    self.entries.len()
  }
}

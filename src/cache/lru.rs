//! Least-recently-used ordering for bounded caches.

use std::collections::VecDeque;

/// Tracks access order of cache keys.
///
/// Front = most recently used, back = least recently used.
#[derive(Debug, Default)]
pub struct LruTracker {
  order: VecDeque<String>,
}

impl LruTracker {
  pub fn new() -> Self {
    Self::default()
  }

  /// Mark a key as just used.
  pub fn touch(&mut self, key: &str) {
    self.remove(key);
    self.order.push_front(key.to_string());
  }

  pub fn remove(&mut self, key: &str) {
    self.order.retain(|k| k != key);
  }

  /// Remove and return the least recently used key.
  pub fn evict_oldest(&mut self) -> Option<String> {
    self.order.pop_back()
  }

  pub fn len(&self) -> usize {
    self.order.len()
  }

  #[cfg(test)]
  pub fn peek_oldest(&self) -> Option<&str> {
    self.order.back().map(String::as_str)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_touch_orders_by_recency() {
    let mut lru = LruTracker::new();
    lru.touch("users-page-1");
    lru.touch("users-page-2");
    lru.touch("users-page-3");

    assert_eq!(lru.len(), 3);
    assert_eq!(lru.peek_oldest(), Some("users-page-1"));
  }

  #[test]
  fn test_touch_existing_moves_to_front() {
    let mut lru = LruTracker::new();
    lru.touch("a");
    lru.touch("b");
    lru.touch("c");
    lru.touch("a");

    assert_eq!(lru.len(), 3);
    assert_eq!(lru.evict_oldest().as_deref(), Some("b"));
    assert_eq!(lru.evict_oldest().as_deref(), Some("c"));
    assert_eq!(lru.evict_oldest().as_deref(), Some("a"));
    assert_eq!(lru.evict_oldest(), None);
  }

  #[test]
  fn test_remove_unknown_key_is_noop() {
    let mut lru = LruTracker::new();
    lru.touch("a");
    lru.remove("missing");
    assert_eq!(lru.len(), 1);
  }
}

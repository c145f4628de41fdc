//! Cache-checked request dispatch shared by the stores.
//!
//! A `Dispatcher` owns one state slot of a store (list, detail, categories)
//! and the cache behind it. Every dispatch is tagged with a sequence number
//! both for its cache key and for the slot:
//! - a response only writes the cache if no newer dispatch for its key started
//! - a response only publishes if no newer dispatch for its slot started
//!
//! so a slow, superseded request can never overwrite newer data.

use color_eyre::{eyre::eyre, Result};
use std::collections::HashMap;
use std::future::Future;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::sync::watch;
use tracing::debug;

use crate::cache::{QueryKey, TimedCache};
use crate::config::Config;

/// Cache and request settings shared by all dispatchers.
#[derive(Debug, Clone, Copy)]
pub struct DispatchSettings {
  pub cache_duration: Duration,
  pub max_entries: Option<usize>,
  pub timeout: Duration,
}

impl DispatchSettings {
  pub fn from_config(config: &Config) -> Self {
    Self {
      cache_duration: config.cache.duration(),
      max_entries: config.cache.max_entries,
      timeout: config.api.timeout(),
    }
  }
}

impl Default for DispatchSettings {
  fn default() -> Self {
    Self::from_config(&Config::default())
  }
}

/// Identifies one dispatch.
#[derive(Debug, Clone)]
pub struct Ticket {
  hash: String,
  description: String,
  key_seq: u64,
  slot_seq: u64,
}

impl Ticket {
  pub fn description(&self) -> &str {
    &self.description
  }
}

#[derive(Debug, Default)]
struct DispatchLog {
  next_seq: u64,
  /// Sequence of the latest dispatch for the slot
  slot_seq: u64,
  /// Sequence of the latest in-flight dispatch per cache key
  in_flight: HashMap<String, u64>,
}

impl DispatchLog {
  fn finish(&mut self, ticket: &Ticket) {
    if self.in_flight.get(&ticket.hash) == Some(&ticket.key_seq) {
      self.in_flight.remove(&ticket.hash);
    }
  }
}

/// Completes a dispatch when dropped, including when the awaiting task is
/// aborted mid-request.
struct InFlight<'a> {
  log: &'a Mutex<DispatchLog>,
  ticket: &'a Ticket,
}

impl Drop for InFlight<'_> {
  fn drop(&mut self) {
    lock(self.log).finish(self.ticket);
  }
}

pub struct Dispatcher<T> {
  name: &'static str,
  cache: Mutex<TimedCache<T>>,
  log: Mutex<DispatchLog>,
  timeout: Duration,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
  mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl<T: Clone> Dispatcher<T> {
  pub fn new(name: &'static str, settings: &DispatchSettings) -> Self {
    Self {
      name,
      cache: Mutex::new(
        TimedCache::new(settings.cache_duration).with_max_entries(settings.max_entries),
      ),
      log: Mutex::new(DispatchLog::default()),
      timeout: settings.timeout,
    }
  }

  /// Start a dispatch, superseding every earlier one for this slot.
  pub fn begin(&self, key: &impl QueryKey) -> Ticket {
    let mut log = lock(&self.log);
    log.next_seq += 1;
    let seq = log.next_seq;
    log.slot_seq = seq;

    let hash = key.cache_hash();
    log.in_flight.insert(hash.clone(), seq);

    Ticket {
      hash,
      description: key.description(),
      key_seq: seq,
      slot_seq: seq,
    }
  }

  /// Whether no newer dispatch for the same slot has started.
  pub fn is_current(&self, ticket: &Ticket) -> bool {
    lock(&self.log).slot_seq == ticket.slot_seq
  }

  fn is_latest_for_key(&self, ticket: &Ticket) -> bool {
    lock(&self.log).in_flight.get(&ticket.hash) == Some(&ticket.key_seq)
  }

  /// Fresh cached payload for the ticket's key.
  ///
  /// A hit completes the dispatch.
  pub fn cached(&self, ticket: &Ticket) -> Option<T> {
    let hit = lock(&self.cache).get(&ticket.hash);
    match hit {
      Some(hit) => {
        debug!(
          store = self.name,
          query = %ticket.description,
          age_secs = hit.age.as_secs(),
          "cache hit"
        );
        lock(&self.log).finish(ticket);
        Some(hit.payload)
      }
      None => {
        debug!(store = self.name, query = %ticket.description, "cache miss");
        None
      }
    }
  }

  /// Run the request with the configured timeout.
  ///
  /// On success the payload is written to the cache when `write_through` is
  /// set and the ticket is still the latest dispatch for its key.
  pub async fn fetch<Fut>(&self, ticket: &Ticket, write_through: bool, request: Fut) -> Result<T>
  where
    Fut: Future<Output = Result<T>>,
  {
    let _in_flight = InFlight {
      log: &self.log,
      ticket,
    };
    let result = match tokio::time::timeout(self.timeout, request).await {
      Ok(result) => result,
      Err(_) => Err(eyre!(
        "Request for {} timed out after {}s",
        ticket.description,
        self.timeout.as_secs_f32()
      )),
    };

    if let Ok(payload) = &result {
      if write_through && self.is_latest_for_key(ticket) {
        lock(&self.cache).put(&ticket.hash, payload.clone());
      } else if write_through {
        debug!(
          store = self.name,
          query = %ticket.description,
          "superseded response not cached"
        );
      }
    }

    result
  }

  /// Apply `update` to the store state in one transition, unless a newer
  /// dispatch for this slot has started. Returns whether it was applied.
  pub fn publish<S>(
    &self,
    state: &watch::Sender<S>,
    ticket: &Ticket,
    update: impl FnOnce(&mut S),
  ) -> bool {
    let applied = state.send_if_modified(|s| {
      if !self.is_current(ticket) {
        return false;
      }
      update(s);
      true
    });

    if !applied {
      debug!(
        store = self.name,
        query = %ticket.description,
        "discarded superseded response"
      );
    }
    applied
  }
}

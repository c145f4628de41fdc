use std::future::Future;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{info, warn};

use super::dispatch::{DispatchSettings, Dispatcher};
use crate::api::cache::ApiQueryKey;
use crate::api::types::{Page, User};
use crate::api::DummyApi;
use color_eyre::Result;

/// Observable user state
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UserState {
  pub users: Vec<User>,
  pub total: u64,
  pub selected_user: Option<User>,
  pub loading: bool,
  pub error: Option<String>,
}

/// User list, search and detail queries with response caching.
#[derive(Clone)]
pub struct UserStore {
  inner: Arc<UserStoreInner>,
}

struct UserStoreInner {
  api: Arc<dyn DummyApi>,
  state: watch::Sender<UserState>,
  lists: Dispatcher<Page<User>>,
  details: Dispatcher<User>,
  /// Detail lookups skip the cache unless enabled
  cache_details: bool,
}

impl UserStore {
  pub fn new(api: Arc<dyn DummyApi>, settings: &DispatchSettings, cache_details: bool) -> Self {
    let (state, _) = watch::channel(UserState::default());
    Self {
      inner: Arc::new(UserStoreInner {
        api,
        state,
        lists: Dispatcher::new("users", settings),
        details: Dispatcher::new("user", settings),
        cache_details,
      }),
    }
  }

  pub fn snapshot(&self) -> UserState {
    self.inner.state.borrow().clone()
  }

  pub fn subscribe(&self) -> watch::Receiver<UserState> {
    self.inner.state.subscribe()
  }

  pub async fn fetch_users(&self, limit: u32, skip: u32) {
    self
      .load_list(
        ApiQueryKey::UsersPage { limit, skip },
        "Failed to fetch users",
        || self.inner.api.users(limit, skip),
      )
      .await
  }

  pub async fn search_users(&self, query: &str) {
    self
      .load_list(
        ApiQueryKey::UserSearch {
          query: query.to_string(),
        },
        "Failed to search users",
        || self.inner.api.search_users(query),
      )
      .await
  }

  pub async fn fetch_user_by_id(&self, id: &str) {
    let inner = &self.inner;
    let ticket = inner.details.begin(&ApiQueryKey::UserDetail { id: id.to_string() });
    inner.state.send_modify(|s| {
      s.loading = true;
      s.error = None;
      s.selected_user = None;
    });

    if inner.cache_details {
      if let Some(user) = inner.details.cached(&ticket) {
        inner.details.publish(&inner.state, &ticket, |s| {
          s.selected_user = Some(user);
          s.loading = false;
        });
        return;
      }
    }

    match inner
      .details
      .fetch(&ticket, inner.cache_details, inner.api.user(id))
      .await
    {
      Ok(user) => {
        inner.details.publish(&inner.state, &ticket, |s| {
          s.selected_user = Some(user);
          s.loading = false;
        });
      }
      Err(e) => {
        warn!(error = %e, id, "Failed to fetch user");
        inner.details.publish(&inner.state, &ticket, |s| {
          s.error = Some("Failed to fetch user".to_string());
          s.loading = false;
        });
      }
    }
  }

  async fn load_list<F, Fut>(&self, key: ApiQueryKey, failure: &str, fetcher: F)
  where
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<Page<User>>>,
  {
    let inner = &self.inner;
    let ticket = inner.lists.begin(&key);
    inner.state.send_modify(|s| {
      s.loading = true;
      s.error = None;
    });

    let page = match inner.lists.cached(&ticket) {
      Some(page) => page,
      None => match inner.lists.fetch(&ticket, true, fetcher()).await {
        Ok(page) => {
          info!(query = ticket.description(), total = page.total, "Fetched users");
          page
        }
        Err(e) => {
          warn!(error = %e, query = ticket.description(), "{}", failure);
          inner.lists.publish(&inner.state, &ticket, |s| {
            s.error = Some(failure.to_string());
            s.loading = false;
          });
          return;
        }
      },
    };

    inner.lists.publish(&inner.state, &ticket, |s| {
      s.users = page.items;
      s.total = page.total;
      s.loading = false;
    });
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::api::mock::{page, user, MockApi};
  use std::time::Duration;

  fn settings() -> DispatchSettings {
    DispatchSettings {
      cache_duration: Duration::from_secs(300),
      max_entries: None,
      timeout: Duration::from_secs(10),
    }
  }

  fn ten_users() -> Vec<User> {
    (1..=10).map(|i| user(i, &format!("User{}", i))).collect()
  }

  #[tokio::test(start_paused = true)]
  async fn test_fetch_users_twice_hits_network_once() {
    let api = Arc::new(MockApi::new().with_users_page(10, 0, page(ten_users(), 57)));
    let store = UserStore::new(api.clone(), &settings(), false);

    store.fetch_users(10, 0).await;
    let first = store.snapshot();
    store.fetch_users(10, 0).await;
    let second = store.snapshot();

    assert_eq!(api.call_count("users:10:0"), 1);
    assert_eq!(first, second);
    assert_eq!(second.total, 57);
    assert_eq!(second.users.len(), 10);
    assert!(!second.loading);
    assert_eq!(second.error, None);
  }

  #[tokio::test(start_paused = true)]
  async fn test_refetch_after_cache_duration() {
    let api = Arc::new(MockApi::new().with_users_page(10, 0, page(ten_users(), 57)));
    let store = UserStore::new(api.clone(), &settings(), false);

    store.fetch_users(10, 0).await;
    tokio::time::advance(Duration::from_secs(299)).await;
    store.fetch_users(10, 0).await;
    assert_eq!(api.call_count("users:10:0"), 1);

    api.set_user_page("users:10:0", page(ten_users(), 58));
    tokio::time::advance(Duration::from_secs(1)).await;
    store.fetch_users(10, 0).await;

    assert_eq!(api.call_count("users:10:0"), 2);
    assert_eq!(store.snapshot().total, 58);
  }

  #[tokio::test]
  async fn test_distinct_pages_are_cached_separately() {
    let api = Arc::new(
      MockApi::new()
        .with_users_page(10, 0, page(ten_users(), 57))
        .with_users_page(10, 10, page(vec![user(11, "Eleven")], 57)),
    );
    let store = UserStore::new(api.clone(), &settings(), false);

    store.fetch_users(10, 0).await;
    store.fetch_users(10, 10).await;
    assert_eq!(store.snapshot().users[0].first_name, "Eleven");

    store.fetch_users(10, 0).await;
    assert_eq!(store.snapshot().users.len(), 10);
    assert_eq!(api.calls(), vec!["users:10:0", "users:10:10"]);
  }

  #[tokio::test]
  async fn test_list_failure_keeps_previous_items() {
    let api = Arc::new(MockApi::new().with_users_page(10, 0, page(ten_users(), 57)));
    let store = UserStore::new(api.clone(), &settings(), false);
    store.fetch_users(10, 0).await;

    api.set_failing(true);
    store.search_users("nobody").await;

    let state = store.snapshot();
    assert_eq!(state.error.as_deref(), Some("Failed to search users"));
    assert!(!state.loading);
    assert_eq!(state.users.len(), 10);
    assert_eq!(state.total, 57);
  }

  #[tokio::test]
  async fn test_failed_search_is_not_cached() {
    let api = Arc::new(MockApi::new());
    let store = UserStore::new(api.clone(), &settings(), false);

    store.search_users("emily").await;
    assert!(store.snapshot().error.is_some());

    api.set_user_page("search_users:emily", page(vec![user(1, "Emily")], 1));
    store.search_users("emily").await;

    let state = store.snapshot();
    assert_eq!(state.error, None);
    assert_eq!(state.total, 1);
    assert_eq!(api.call_count("search_users:emily"), 2);
  }

  #[tokio::test]
  async fn test_user_details_bypass_cache_by_default() {
    let api = Arc::new(MockApi::new().with_user(user(3, "Three")));
    let store = UserStore::new(api.clone(), &settings(), false);

    store.fetch_user_by_id("3").await;
    store.fetch_user_by_id("3").await;

    assert_eq!(api.call_count("user:3"), 2);
    assert_eq!(
      store.snapshot().selected_user.map(|u| u.first_name),
      Some("Three".to_string())
    );
  }

  #[tokio::test]
  async fn test_user_details_cached_when_enabled() {
    let api = Arc::new(MockApi::new().with_user(user(3, "Three")));
    let store = UserStore::new(api.clone(), &settings(), true);

    store.fetch_user_by_id("3").await;
    store.fetch_user_by_id("3").await;

    assert_eq!(api.call_count("user:3"), 1);
    assert!(store.snapshot().selected_user.is_some());
  }

  #[tokio::test]
  async fn test_missing_user_leaves_selection_empty() {
    let api = Arc::new(MockApi::new().with_user(user(3, "Three")));
    let store = UserStore::new(api.clone(), &settings(), false);
    store.fetch_user_by_id("3").await;

    store.fetch_user_by_id("999").await;

    let state = store.snapshot();
    assert_eq!(state.selected_user, None);
    assert_eq!(state.error.as_deref(), Some("Failed to fetch user"));
    assert!(!state.loading);
  }

  #[tokio::test(start_paused = true)]
  async fn test_latest_search_wins() {
    let api = Arc::new(
      MockApi::new()
        .with_user_search("e", page(vec![user(1, "Slow")], 1))
        .with_user_search("em", page(vec![user(2, "Fast")], 1)),
    );
    api.set_delay("search_users:e", Duration::from_secs(3));
    let store = UserStore::new(api.clone(), &settings(), false);

    let slow = tokio::spawn({
      let store = store.clone();
      async move { store.search_users("e").await }
    });
    tokio::time::sleep(Duration::from_millis(10)).await;
    store.search_users("em").await;
    slow.await.unwrap();

    let state = store.snapshot();
    assert_eq!(state.users[0].first_name, "Fast");
    assert!(!state.loading);

    // The slow response was still valid for its own key
    store.search_users("e").await;
    assert_eq!(api.call_count("search_users:e"), 1);
    assert_eq!(store.snapshot().users[0].first_name, "Slow");
  }

  #[tokio::test(start_paused = true)]
  async fn test_hung_request_times_out() {
    let api = Arc::new(MockApi::new().with_users_page(10, 0, page(ten_users(), 57)));
    api.set_delay("users:10:0", Duration::from_secs(3600));
    let store = UserStore::new(api.clone(), &settings(), false);

    store.fetch_users(10, 0).await;

    let state = store.snapshot();
    assert!(!state.loading);
    assert_eq!(state.error.as_deref(), Some("Failed to fetch users"));
  }

  #[tokio::test]
  async fn test_skip_near_max_fails_cleanly() {
    let api = Arc::new(MockApi::new());
    let store = UserStore::new(api.clone(), &settings(), false);

    store.fetch_users(10, u32::MAX - 5).await;

    let state = store.snapshot();
    assert!(!state.loading);
    assert_eq!(state.error.as_deref(), Some("Failed to fetch users"));
    assert_eq!(api.call_count(&format!("users:10:{}", u32::MAX - 5)), 1);
  }
}

use chrono::Utc;
use color_eyre::{eyre::eyre, Result};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tracing::{info, warn};

use super::session::{SessionStorage, StoredSession};
use crate::api::types::{Credentials, SessionUser};
use crate::api::DummyApi;

/// Observable auth state
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthState {
  pub token: Option<String>,
  /// Profile returned at login; absent for tokens set directly
  pub user: Option<SessionUser>,
}

/// Holds the session token. Nothing here is cached: a login is not an
/// idempotent query.
#[derive(Clone)]
pub struct AuthStore {
  inner: Arc<AuthStoreInner>,
}

struct AuthStoreInner {
  api: Arc<dyn DummyApi>,
  storage: Arc<dyn SessionStorage>,
  state: watch::Sender<AuthState>,
  timeout: Duration,
}

impl AuthStore {
  pub fn new(api: Arc<dyn DummyApi>, storage: Arc<dyn SessionStorage>, timeout: Duration) -> Self {
    Self::with_state(api, storage, timeout, AuthState::default())
  }

  /// Create the store hydrated from the persisted session.
  pub fn restore(
    api: Arc<dyn DummyApi>,
    storage: Arc<dyn SessionStorage>,
    timeout: Duration,
  ) -> Result<Self> {
    let state = match storage.load()? {
      Some(session) => {
        info!(saved_at = %session.saved_at, "Restored persisted session");
        AuthState {
          token: Some(session.token),
          user: session.user,
        }
      }
      None => AuthState::default(),
    };
    Ok(Self::with_state(api, storage, timeout, state))
  }

  fn with_state(
    api: Arc<dyn DummyApi>,
    storage: Arc<dyn SessionStorage>,
    timeout: Duration,
    state: AuthState,
  ) -> Self {
    let (state, _) = watch::channel(state);
    Self {
      inner: Arc::new(AuthStoreInner {
        api,
        storage,
        state,
        timeout,
      }),
    }
  }

  pub fn snapshot(&self) -> AuthState {
    self.inner.state.borrow().clone()
  }

  pub fn subscribe(&self) -> watch::Receiver<AuthState> {
    self.inner.state.subscribe()
  }

  pub fn token(&self) -> Option<String> {
    self.inner.state.borrow().token.clone()
  }

  pub fn is_authenticated(&self) -> bool {
    self.inner.state.borrow().token.is_some()
  }

  /// Exchange credentials for a token.
  ///
  /// Failures are returned to the caller and leave the current token as is.
  pub async fn login(&self, username: &str, password: &str) -> Result<()> {
    let credentials = Credentials {
      username: username.to_string(),
      password: password.to_string(),
    };

    let session = tokio::time::timeout(self.inner.timeout, self.inner.api.login(&credentials))
      .await
      .map_err(|_| eyre!("Login timed out after {}s", self.inner.timeout.as_secs()))??;

    self.persist(Some(StoredSession {
      token: session.token.clone(),
      user: Some(session.user.clone()),
      saved_at: Utc::now(),
    }));
    self.inner.state.send_modify(|s| {
      s.token = Some(session.token);
      s.user = Some(session.user);
    });

    info!(username, "Logged in");
    Ok(())
  }

  /// Drop the session. Never touches the network.
  pub fn logout(&self) {
    self.inner.state.send_modify(|s| *s = AuthState::default());
    self.persist(None);
    info!("Logged out");
  }

  /// Hydrate from a session established elsewhere.
  ///
  /// The profile is kept only when the token is the one it came with.
  pub fn set_token(&self, token: Option<String>) {
    let user = {
      let state = self.inner.state.borrow();
      if token.is_some() && state.token == token {
        state.user.clone()
      } else {
        None
      }
    };
    self.persist(token.as_ref().map(|token| StoredSession {
      token: token.clone(),
      user: user.clone(),
      saved_at: Utc::now(),
    }));
    self.inner.state.send_modify(|s| {
      s.token = token;
      s.user = user;
    });
  }

  /// Write through to durable storage. The in-memory session stays valid
  /// when this fails, so failures are only logged.
  fn persist(&self, session: Option<StoredSession>) {
    let result = match &session {
      Some(session) => self.inner.storage.save(session),
      None => self.inner.storage.clear(),
    };
    if let Err(e) = result {
      warn!(error = %e, "Failed to persist session");
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::api::mock::MockApi;
  use crate::store::session::MemorySessionStorage;

  fn store_with(api: MockApi, storage: Arc<MemorySessionStorage>) -> AuthStore {
    AuthStore::new(Arc::new(api), storage, Duration::from_secs(10))
  }

  #[tokio::test]
  async fn test_login_stores_and_persists_token() {
    let storage = Arc::new(MemorySessionStorage::new());
    let api = MockApi::new().with_account("emilys", "emilyspass", "tok-1");
    let store = store_with(api, storage.clone());

    store.login("emilys", "emilyspass").await.unwrap();

    assert_eq!(store.token().as_deref(), Some("tok-1"));
    assert_eq!(
      store.snapshot().user.map(|u| u.username),
      Some("emilys".to_string())
    );
    assert_eq!(
      storage.load().unwrap().map(|s| s.token),
      Some("tok-1".to_string())
    );
  }

  #[tokio::test]
  async fn test_failed_login_keeps_token() {
    let storage = Arc::new(MemorySessionStorage::new());
    let store = store_with(MockApi::new(), storage.clone());
    store.set_token(Some("existing".to_string()));

    let result = store.login("emilys", "wrong").await;

    assert!(result.is_err());
    assert_eq!(store.token().as_deref(), Some("existing"));
    assert_eq!(
      storage.load().unwrap().map(|s| s.token),
      Some("existing".to_string())
    );
  }

  #[tokio::test]
  async fn test_logout_clears_without_network() {
    let storage = Arc::new(MemorySessionStorage::new());
    let api = Arc::new(MockApi::new().with_account("emilys", "pw", "tok"));
    let store = AuthStore::new(api.clone(), storage.clone(), Duration::from_secs(10));
    store.login("emilys", "pw").await.unwrap();
    let calls_before = api.calls().len();

    store.logout();

    assert_eq!(store.snapshot(), AuthState::default());
    assert!(!store.is_authenticated());
    assert_eq!(storage.load().unwrap(), None);
    assert_eq!(api.calls().len(), calls_before);
  }

  #[test]
  fn test_logout_then_set_token() {
    let storage = Arc::new(MemorySessionStorage::new());
    let store = store_with(MockApi::new(), storage);

    for prior in [None, Some("old".to_string())] {
      store.set_token(prior);
      store.logout();
      store.set_token(Some("t".to_string()));
      assert_eq!(store.token().as_deref(), Some("t"));
    }
  }

  #[tokio::test]
  async fn test_new_token_drops_previous_profile() {
    let storage = Arc::new(MemorySessionStorage::new());
    let api = MockApi::new().with_account("emilys", "emilyspass", "tok-1");
    let store = store_with(api, storage.clone());
    store.login("emilys", "emilyspass").await.unwrap();

    // Same token keeps the profile it came with
    store.set_token(Some("tok-1".to_string()));
    assert!(store.snapshot().user.is_some());

    store.set_token(Some("someone-else".to_string()));

    let state = store.snapshot();
    assert_eq!(state.token.as_deref(), Some("someone-else"));
    assert_eq!(state.user, None);
    let persisted = storage.load().unwrap().unwrap();
    assert_eq!(persisted.token, "someone-else");
    assert_eq!(persisted.user, None);
  }

  #[test]
  fn test_restore_from_storage() {
    let storage = Arc::new(MemorySessionStorage::new());
    storage
      .save(&StoredSession {
        token: "persisted".to_string(),
        user: None,
        saved_at: Utc::now(),
      })
      .unwrap();

    let store = AuthStore::restore(
      Arc::new(MockApi::new()),
      storage,
      Duration::from_secs(10),
    )
    .unwrap();
    assert_eq!(store.token().as_deref(), Some("persisted"));
  }

  #[tokio::test]
  async fn test_subscribers_see_login() {
    let api = MockApi::new().with_account("emilys", "pw", "tok");
    let store = store_with(api, Arc::new(MemorySessionStorage::new()));
    let mut rx = store.subscribe();

    store.login("emilys", "pw").await.unwrap();

    assert!(rx.has_changed().unwrap());
    assert_eq!(rx.borrow_and_update().token.as_deref(), Some("tok"));
  }
}

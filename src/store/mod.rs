//! Stateful, cache-backed access to the API.
//!
//! Each store owns its state in a `watch` channel and its own caches. Views
//! read snapshots or subscribe; operations publish every transition at once.

mod auth;
mod dispatch;
mod products;
mod session;
mod users;

pub use auth::{AuthState, AuthStore};
pub use dispatch::DispatchSettings;
pub use products::{ProductState, ProductStore};
pub use session::{MemorySessionStorage, SessionStorage, SqliteSessionStorage, StoredSession};
pub use users::{UserState, UserStore};

use color_eyre::Result;
use std::sync::Arc;

use crate::api::DummyApi;
use crate::config::Config;

/// The three stores, handed to every view.
#[derive(Clone)]
pub struct Stores {
  pub auth: AuthStore,
  pub users: UserStore,
  pub products: ProductStore,
}

impl Stores {
  /// Build the stores, restoring any persisted session.
  pub fn new(
    api: Arc<dyn DummyApi>,
    session: Arc<dyn SessionStorage>,
    config: &Config,
  ) -> Result<Self> {
    let settings = DispatchSettings::from_config(config);

    Ok(Self {
      auth: AuthStore::restore(api.clone(), session, settings.timeout)?,
      users: UserStore::new(api.clone(), &settings, config.cache.cache_user_details),
      products: ProductStore::new(api, &settings, config.cache.cache_product_details),
    })
  }
}

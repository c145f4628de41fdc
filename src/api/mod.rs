//! Access to the DummyJSON REST API.

pub mod api_types;
pub mod cache;
pub mod client;
pub mod types;

#[cfg(test)]
pub mod mock;

use async_trait::async_trait;
use color_eyre::Result;

use types::{Category, Credentials, Page, Product, Session, User};

/// Remote data source used by the stores.
///
/// `HttpClient` talks to the real API; tests substitute a scripted mock.
#[async_trait]
pub trait DummyApi: Send + Sync {
  async fn login(&self, credentials: &Credentials) -> Result<Session>;

  async fn users(&self, limit: u32, skip: u32) -> Result<Page<User>>;

  async fn search_users(&self, query: &str) -> Result<Page<User>>;

  async fn user(&self, id: &str) -> Result<User>;

  async fn products(&self, limit: u32, skip: u32) -> Result<Page<Product>>;

  async fn search_products(&self, query: &str) -> Result<Page<Product>>;

  async fn products_by_category(&self, slug: &str) -> Result<Page<Product>>;

  async fn categories(&self) -> Result<Vec<Category>>;

  async fn product(&self, id: &str) -> Result<Product>;
}

//! Scripted in-memory `DummyApi` for store and view tests.

use async_trait::async_trait;
use color_eyre::{eyre::eyre, Result};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use super::types::{Category, Credentials, Page, Product, Session, SessionUser, User};
use super::DummyApi;

/// Responses are looked up by call label (e.g. `users:10:0`, `product:7`).
/// A label without a scripted response fails like a 404.
#[derive(Default)]
pub struct MockApi {
  calls: Mutex<Vec<String>>,
  user_pages: Mutex<HashMap<String, Page<User>>>,
  users: Mutex<HashMap<String, User>>,
  product_pages: Mutex<HashMap<String, Page<Product>>>,
  products: Mutex<HashMap<String, Product>>,
  categories: Mutex<Option<Vec<Category>>>,
  accounts: Mutex<HashMap<(String, String), Session>>,
  delays: Mutex<HashMap<String, Duration>>,
  failing: AtomicBool,
}

pub fn user(id: u64, first_name: &str) -> User {
  User {
    id,
    first_name: first_name.to_string(),
    last_name: "Tester".to_string(),
    ..Default::default()
  }
}

pub fn product(id: u64, title: &str) -> Product {
  Product {
    id,
    title: title.to_string(),
    price: 10.0,
    ..Default::default()
  }
}

pub fn page<T>(items: Vec<T>, total: u64) -> Page<T> {
  Page {
    limit: items.len() as u64,
    items,
    total,
    skip: 0,
  }
}

impl MockApi {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn with_users_page(self, limit: u32, skip: u32, page: Page<User>) -> Self {
    self.set_user_page(&format!("users:{}:{}", limit, skip), page);
    self
  }

  pub fn with_user_search(self, query: &str, page: Page<User>) -> Self {
    self.set_user_page(&format!("search_users:{}", query), page);
    self
  }

  pub fn with_user(self, user: User) -> Self {
    self.set_user(user);
    self
  }

  pub fn with_products_page(self, limit: u32, skip: u32, page: Page<Product>) -> Self {
    self.set_product_page(&format!("products:{}:{}", limit, skip), page);
    self
  }

  pub fn with_product_search(self, query: &str, page: Page<Product>) -> Self {
    self.set_product_page(&format!("search_products:{}", query), page);
    self
  }

  pub fn with_category(self, slug: &str, page: Page<Product>) -> Self {
    self.set_product_page(&format!("category:{}", slug), page);
    self
  }

  pub fn with_categories(self, categories: Vec<Category>) -> Self {
    *self.categories.lock().unwrap() = Some(categories);
    self
  }

  pub fn with_product(self, product: Product) -> Self {
    self
      .products
      .lock()
      .unwrap()
      .insert(product.id.to_string(), product);
    self
  }

  pub fn with_account(self, username: &str, password: &str, token: &str) -> Self {
    let session = Session {
      token: token.to_string(),
      refresh_token: None,
      user: SessionUser {
        id: 1,
        username: username.to_string(),
        first_name: "Emily".to_string(),
        ..Default::default()
      },
    };
    self
      .accounts
      .lock()
      .unwrap()
      .insert((username.to_string(), password.to_string()), session);
    self
  }

  pub fn set_user_page(&self, label: &str, page: Page<User>) {
    self
      .user_pages
      .lock()
      .unwrap()
      .insert(label.to_string(), page);
  }

  pub fn set_product_page(&self, label: &str, page: Page<Product>) {
    self
      .product_pages
      .lock()
      .unwrap()
      .insert(label.to_string(), page);
  }

  pub fn set_user(&self, user: User) {
    self.users.lock().unwrap().insert(user.id.to_string(), user);
  }

  /// Delay responses for one call label.
  pub fn set_delay(&self, label: &str, delay: Duration) {
    self
      .delays
      .lock()
      .unwrap()
      .insert(label.to_string(), delay);
  }

  /// Make every subsequent call fail.
  pub fn set_failing(&self, failing: bool) {
    self.failing.store(failing, Ordering::SeqCst);
  }

  /// All calls received so far, in order.
  pub fn calls(&self) -> Vec<String> {
    self.calls.lock().unwrap().clone()
  }

  /// Number of calls with exactly this label.
  pub fn call_count(&self, label: &str) -> usize {
    self
      .calls
      .lock()
      .unwrap()
      .iter()
      .filter(|c| c.as_str() == label)
      .count()
  }

  async fn respond<T>(&self, label: String, response: Option<T>) -> Result<T> {
    self.calls.lock().unwrap().push(label.clone());

    let delay = self.delays.lock().unwrap().get(&label).copied();
    if let Some(delay) = delay {
      tokio::time::sleep(delay).await;
    }

    if self.failing.load(Ordering::SeqCst) {
      return Err(eyre!("connection refused"));
    }
    response.ok_or_else(|| eyre!("404 Not Found: {}", label))
  }

  fn user_page(&self, label: &str) -> Option<Page<User>> {
    self.user_pages.lock().unwrap().get(label).cloned()
  }

  fn product_page(&self, label: &str) -> Option<Page<Product>> {
    self.product_pages.lock().unwrap().get(label).cloned()
  }
}

#[async_trait]
impl DummyApi for MockApi {
  async fn login(&self, credentials: &Credentials) -> Result<Session> {
    let session = self
      .accounts
      .lock()
      .unwrap()
      .get(&(credentials.username.clone(), credentials.password.clone()))
      .cloned();
    self
      .respond(format!("login:{}", credentials.username), session)
      .await
  }

  async fn users(&self, limit: u32, skip: u32) -> Result<Page<User>> {
    let label = format!("users:{}:{}", limit, skip);
    let page = self.user_page(&label);
    self.respond(label, page).await
  }

  async fn search_users(&self, query: &str) -> Result<Page<User>> {
    let label = format!("search_users:{}", query);
    let page = self.user_page(&label);
    self.respond(label, page).await
  }

  async fn user(&self, id: &str) -> Result<User> {
    let user = self.users.lock().unwrap().get(id).cloned();
    self.respond(format!("user:{}", id), user).await
  }

  async fn products(&self, limit: u32, skip: u32) -> Result<Page<Product>> {
    let label = format!("products:{}:{}", limit, skip);
    let page = self.product_page(&label);
    self.respond(label, page).await
  }

  async fn search_products(&self, query: &str) -> Result<Page<Product>> {
    let label = format!("search_products:{}", query);
    let page = self.product_page(&label);
    self.respond(label, page).await
  }

  async fn products_by_category(&self, slug: &str) -> Result<Page<Product>> {
    let label = format!("category:{}", slug);
    let page = self.product_page(&label);
    self.respond(label, page).await
  }

  async fn categories(&self) -> Result<Vec<Category>> {
    let categories = self.categories.lock().unwrap().clone();
    self.respond("categories".to_string(), categories).await
  }

  async fn product(&self, id: &str) -> Result<Product> {
    let product = self.products.lock().unwrap().get(id).cloned();
    self.respond(format!("product:{}", id), product).await
  }
}

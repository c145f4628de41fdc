use std::future::Future;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{info, warn};

use super::dispatch::{DispatchSettings, Dispatcher};
use crate::api::cache::ApiQueryKey;
use crate::api::types::{Category, Page, Product};
use crate::api::DummyApi;
use color_eyre::Result;

/// Observable product state
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProductState {
  pub products: Vec<Product>,
  pub total: u64,
  pub selected_product: Option<Product>,
  pub categories: Vec<Category>,
  pub loading: bool,
  pub error: Option<String>,
}

/// Product list, search, category and detail queries with response caching.
#[derive(Clone)]
pub struct ProductStore {
  inner: Arc<ProductStoreInner>,
}

struct ProductStoreInner {
  api: Arc<dyn DummyApi>,
  state: watch::Sender<ProductState>,
  lists: Dispatcher<Page<Product>>,
  details: Dispatcher<Product>,
  categories: Dispatcher<Vec<Category>>,
  cache_details: bool,
}

impl ProductStore {
  pub fn new(api: Arc<dyn DummyApi>, settings: &DispatchSettings, cache_details: bool) -> Self {
    let (state, _) = watch::channel(ProductState::default());
    Self {
      inner: Arc::new(ProductStoreInner {
        api,
        state,
        lists: Dispatcher::new("products", settings),
        details: Dispatcher::new("product", settings),
        categories: Dispatcher::new("categories", settings),
        cache_details,
      }),
    }
  }

  pub fn snapshot(&self) -> ProductState {
    self.inner.state.borrow().clone()
  }

  pub fn subscribe(&self) -> watch::Receiver<ProductState> {
    self.inner.state.subscribe()
  }

  pub async fn fetch_products(&self, limit: u32, skip: u32) {
    self
      .load_list(
        ApiQueryKey::ProductsPage { limit, skip },
        "Failed to fetch products".to_string(),
        || self.inner.api.products(limit, skip),
      )
      .await
  }

  pub async fn search_products(&self, query: &str) {
    self
      .load_list(
        ApiQueryKey::ProductSearch {
          query: query.to_string(),
        },
        "Failed to search products".to_string(),
        || self.inner.api.search_products(query),
      )
      .await
  }

  pub async fn fetch_products_by_category(&self, slug: &str) {
    self
      .load_list(
        ApiQueryKey::ProductsByCategory {
          slug: slug.to_string(),
        },
        format!("Failed to fetch products for category: {}", slug),
        || self.inner.api.products_by_category(slug),
      )
      .await
  }

  /// Load the category list. Runs alongside list queries, so it leaves
  /// `loading` alone and only reports failures through `error`.
  pub async fn fetch_categories(&self) {
    let inner = &self.inner;
    let ticket = inner.categories.begin(&ApiQueryKey::Categories);

    let categories = match inner.categories.cached(&ticket) {
      Some(categories) => categories,
      None => match inner
        .categories
        .fetch(&ticket, true, inner.api.categories())
        .await
      {
        Ok(categories) => {
          info!(count = categories.len(), "Fetched product categories");
          categories
        }
        Err(e) => {
          warn!(error = %e, "Failed to fetch categories");
          inner.categories.publish(&inner.state, &ticket, |s| {
            s.error = Some("Failed to fetch categories".to_string());
          });
          return;
        }
      },
    };

    inner.categories.publish(&inner.state, &ticket, |s| {
      s.categories = categories;
    });
  }

  pub async fn fetch_product_by_id(&self, id: &str) {
    let inner = &self.inner;
    let ticket = inner
      .details
      .begin(&ApiQueryKey::ProductDetail { id: id.to_string() });
    inner.state.send_modify(|s| {
      s.loading = true;
      s.error = None;
      s.selected_product = None;
    });

    if inner.cache_details {
      if let Some(product) = inner.details.cached(&ticket) {
        inner.details.publish(&inner.state, &ticket, |s| {
          s.selected_product = Some(product);
          s.loading = false;
        });
        return;
      }
    }

    match inner
      .details
      .fetch(&ticket, inner.cache_details, inner.api.product(id))
      .await
    {
      Ok(product) => {
        inner.details.publish(&inner.state, &ticket, |s| {
          s.selected_product = Some(product);
          s.loading = false;
        });
      }
      Err(e) => {
        warn!(error = %e, id, "Failed to fetch product");
        inner.details.publish(&inner.state, &ticket, |s| {
          s.error = Some("Failed to fetch product".to_string());
          s.loading = false;
        });
      }
    }
  }

  async fn load_list<F, Fut>(&self, key: ApiQueryKey, failure: String, fetcher: F)
  where
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<Page<Product>>>,
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
          info!(query = ticket.description(), total = page.total, "Fetched products");
          page
        }
        Err(e) => {
          warn!(error = %e, query = ticket.description(), "{}", failure);
          inner.lists.publish(&inner.state, &ticket, |s| {
            s.error = Some(failure);
            s.loading = false;
          });
          return;
        }
      },
    };

    inner.lists.publish(&inner.state, &ticket, |s| {
      s.products = page.items;
      s.total = page.total;
      s.loading = false;
    });
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::api::mock::{page, product, MockApi};
  use std::time::Duration;

  fn settings() -> DispatchSettings {
    DispatchSettings {
      cache_duration: Duration::from_secs(300),
      max_entries: None,
      timeout: Duration::from_secs(10),
    }
  }

  fn category(slug: &str) -> Category {
    Category {
      slug: slug.to_string(),
      name: slug.to_string(),
      url: String::new(),
    }
  }

  fn twelve_products() -> Vec<Product> {
    (1..=12).map(|i| product(i, &format!("Item {}", i))).collect()
  }

  #[tokio::test]
  async fn test_fetch_products_cached() {
    let api = Arc::new(MockApi::new().with_products_page(12, 0, page(twelve_products(), 194)));
    let store = ProductStore::new(api.clone(), &settings(), true);

    store.fetch_products(12, 0).await;
    store.fetch_products(12, 0).await;

    let state = store.snapshot();
    assert_eq!(api.call_count("products:12:0"), 1);
    assert_eq!(state.products.len(), 12);
    assert_eq!(state.total, 194);
    assert!(!state.loading);
  }

  #[tokio::test]
  async fn test_empty_search_is_not_an_error() {
    let api = Arc::new(
      MockApi::new()
        .with_products_page(12, 0, page(twelve_products(), 194))
        .with_product_search("phone", page(Vec::new(), 0)),
    );
    let store = ProductStore::new(api.clone(), &settings(), true);
    store.fetch_products(12, 0).await;

    store.search_products("phone").await;

    let state = store.snapshot();
    assert!(state.products.is_empty());
    assert_eq!(state.total, 0);
    assert_eq!(state.error, None);
    assert!(!state.loading);
  }

  #[tokio::test]
  async fn test_category_failure_names_slug() {
    let api = Arc::new(MockApi::new());
    let store = ProductStore::new(api.clone(), &settings(), true);

    store.fetch_products_by_category("laptops").await;

    assert_eq!(
      store.snapshot().error.as_deref(),
      Some("Failed to fetch products for category: laptops")
    );
  }

  #[tokio::test]
  async fn test_category_products() {
    let api = Arc::new(
      MockApi::new().with_category("smartphones", page(vec![product(121, "iPhone 5s")], 16)),
    );
    let store = ProductStore::new(api.clone(), &settings(), true);

    store.fetch_products_by_category("smartphones").await;
    store.fetch_products_by_category("smartphones").await;

    let state = store.snapshot();
    assert_eq!(state.total, 16);
    assert_eq!(state.products[0].title, "iPhone 5s");
    assert_eq!(api.call_count("category:smartphones"), 1);
  }

  #[tokio::test]
  async fn test_categories_do_not_touch_loading() {
    let api = Arc::new(
      MockApi::new().with_categories(vec![category("beauty"), category("laptops")]),
    );
    let store = ProductStore::new(api.clone(), &settings(), true);
    let mut rx = store.subscribe();

    store.fetch_categories().await;
    store.fetch_categories().await;

    let state = rx.borrow_and_update().clone();
    assert_eq!(state.categories.len(), 2);
    assert!(!state.loading);
    assert_eq!(api.call_count("categories"), 1);
  }

  #[tokio::test]
  async fn test_categories_failure_keeps_products() {
    let api = Arc::new(MockApi::new().with_products_page(12, 0, page(twelve_products(), 194)));
    let store = ProductStore::new(api.clone(), &settings(), true);
    store.fetch_products(12, 0).await;

    store.fetch_categories().await;

    let state = store.snapshot();
    assert_eq!(state.error.as_deref(), Some("Failed to fetch categories"));
    assert_eq!(state.products.len(), 12);
    assert!(state.categories.is_empty());
  }

  #[tokio::test]
  async fn test_missing_product() {
    let api = Arc::new(MockApi::new().with_product(product(1, "Mascara")));
    let store = ProductStore::new(api.clone(), &settings(), true);
    store.fetch_product_by_id("1").await;
    assert!(store.snapshot().selected_product.is_some());

    store.fetch_product_by_id("999").await;

    let state = store.snapshot();
    assert_eq!(state.selected_product, None);
    assert_eq!(state.error.as_deref(), Some("Failed to fetch product"));
    assert!(!state.loading);
  }

  #[tokio::test]
  async fn test_product_details_cached() {
    let api = Arc::new(MockApi::new().with_product(product(1, "Mascara")));
    let store = ProductStore::new(api.clone(), &settings(), true);

    store.fetch_product_by_id("1").await;
    store.fetch_product_by_id("1").await;

    assert_eq!(api.call_count("product:1"), 1);
    assert_eq!(
      store.snapshot().selected_product.map(|p| p.title),
      Some("Mascara".to_string())
    );
  }

  #[tokio::test(start_paused = true)]
  async fn test_slow_page_does_not_overwrite_search() {
    let api = Arc::new(
      MockApi::new()
        .with_products_page(12, 0, page(twelve_products(), 194))
        .with_product_search("phone", page(vec![product(121, "iPhone 5s")], 1)),
    );
    api.set_delay("products:12:0", Duration::from_secs(2));
    let store = ProductStore::new(api.clone(), &settings(), true);

    let slow = tokio::spawn({
      let store = store.clone();
      async move { store.fetch_products(12, 0).await }
    });
    tokio::time::sleep(Duration::from_millis(10)).await;
    store.search_products("phone").await;
    slow.await.unwrap();

    let state = store.snapshot();
    assert_eq!(state.total, 1);
    assert_eq!(state.products[0].title, "iPhone 5s");
  }
}

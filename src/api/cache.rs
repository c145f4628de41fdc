//! Cache keys for DummyJSON queries.

use sha2::{Digest, Sha256};

use crate::cache::QueryKey;

/// Query key types for API calls.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ApiQueryKey {
  /// One page of users
  UsersPage { limit: u32, skip: u32 },
  /// Free-text user search
  UserSearch { query: String },
  /// A single user by id
  UserDetail { id: String },
  /// One page of products
  ProductsPage { limit: u32, skip: u32 },
  /// Free-text product search
  ProductSearch { query: String },
  /// Products in one category
  ProductsByCategory { slug: String },
  /// All product categories
  Categories,
  /// A single product by id
  ProductDetail { id: String },
}

impl ApiQueryKey {
  /// Canonical form. Every variant has its own prefix and free-text
  /// parameters always come last, so distinct parameters never collide.
  fn canonical(&self) -> String {
    match self {
      Self::UsersPage { limit, skip } => format!("users-limit-{}-skip-{}", limit, skip),
      Self::UserSearch { query } => format!("users-search-query-{}", query),
      Self::UserDetail { id } => format!("user-id-{}", id),
      Self::ProductsPage { limit, skip } => format!("products-limit-{}-skip-{}", limit, skip),
      Self::ProductSearch { query } => format!("products-search-query-{}", query),
      Self::ProductsByCategory { slug } => format!("products-category-{}", slug),
      Self::Categories => "product-categories".to_string(),
      Self::ProductDetail { id } => format!("product-id-{}", id),
    }
  }
}

impl QueryKey for ApiQueryKey {
  fn cache_hash(&self) -> String {
    // SHA256 hash for stable, fixed-length keys
    let mut hasher = Sha256::new();
    hasher.update(self.canonical().as_bytes());
    hex::encode(hasher.finalize())
  }

  fn description(&self) -> String {
    match self {
      Self::UsersPage { limit, skip } => format!("users {}..{}", skip, skip.saturating_add(*limit)),
      Self::UserSearch { query } => format!("users matching '{}'", query),
      Self::UserDetail { id } => format!("user {}", id),
      Self::ProductsPage { limit, skip } => format!("products {}..{}", skip, skip.saturating_add(*limit)),
      Self::ProductSearch { query } => format!("products matching '{}'", query),
      Self::ProductsByCategory { slug } => format!("products in {}", slug),
      Self::Categories => "product categories".to_string(),
      Self::ProductDetail { id } => format!("product {}", id),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::collections::HashSet;

  #[test]
  fn test_same_parameters_same_key() {
    let a = ApiQueryKey::UsersPage { limit: 10, skip: 20 };
    let b = ApiQueryKey::UsersPage { limit: 10, skip: 20 };
    assert_eq!(a.cache_hash(), b.cache_hash());
    assert_eq!(a.cache_hash().len(), 64);
  }

  #[test]
  fn test_distinct_parameters_distinct_keys() {
    let keys = vec![
      ApiQueryKey::UsersPage { limit: 1, skip: 23 },
      ApiQueryKey::UsersPage { limit: 12, skip: 3 },
      ApiQueryKey::ProductsPage { limit: 1, skip: 23 },
      ApiQueryKey::UserSearch { query: "phone".into() },
      ApiQueryKey::UserSearch { query: "Phone".into() },
      ApiQueryKey::UserSearch { query: "phone ".into() },
      ApiQueryKey::UserSearch { query: String::new() },
      ApiQueryKey::ProductSearch { query: "phone".into() },
      ApiQueryKey::ProductSearch { query: "limit-1-skip-23".into() },
      ApiQueryKey::ProductsByCategory { slug: "laptops".into() },
      ApiQueryKey::ProductsByCategory { slug: "mens-shirts".into() },
      ApiQueryKey::Categories,
      ApiQueryKey::ProductDetail { id: "1".into() },
      ApiQueryKey::ProductDetail { id: "11".into() },
      ApiQueryKey::UserDetail { id: "1".into() },
    ];

    let hashes: HashSet<String> = keys.iter().map(|k| k.cache_hash()).collect();
    assert_eq!(hashes.len(), keys.len());
  }

  #[test]
  fn test_description() {
    let key = ApiQueryKey::ProductsPage { limit: 12, skip: 24 };
    assert_eq!(key.description(), "products 24..36");
    assert_eq!(ApiQueryKey::Categories.description(), "product categories");
  }

  #[test]
  fn test_description_with_skip_near_max() {
    let key = ApiQueryKey::UsersPage {
      limit: 10,
      skip: u32::MAX - 5,
    };
    assert_eq!(key.description(), format!("users {}..{}", u32::MAX - 5, u32::MAX));
    assert_ne!(key.cache_hash(), ApiQueryKey::UsersPage { limit: 10, skip: 0 }.cache_hash());
  }
}

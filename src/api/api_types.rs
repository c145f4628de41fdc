//! Serde-deserializable types matching DummyJSON responses.
//!
//! List endpoints wrap their items in an envelope named after the entity;
//! these types unwrap them into domain types.

use serde::Deserialize;

use super::types::{Category, Page, Product, Session, SessionUser, User};

// ============================================================================
// List envelopes
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct ApiUsersResponse {
  #[serde(default)]
  pub users: Vec<User>,
  #[serde(default)]
  pub total: u64,
  #[serde(default)]
  pub skip: u64,
  #[serde(default)]
  pub limit: u64,
}

#[derive(Debug, Deserialize)]
pub struct ApiProductsResponse {
  #[serde(default)]
  pub products: Vec<Product>,
  #[serde(default)]
  pub total: u64,
  #[serde(default)]
  pub skip: u64,
  #[serde(default)]
  pub limit: u64,
}

// ============================================================================
// Categories endpoint response
// ============================================================================

/// Current API versions return objects, older ones bare slugs.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum ApiCategory {
  Full(Category),
  Slug(String),
}

// ============================================================================
// Login endpoint response
// ============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiLoginResponse {
  #[serde(alias = "accessToken")]
  pub token: String,
  pub refresh_token: Option<String>,
  #[serde(default)]
  pub id: u64,
  #[serde(default)]
  pub username: String,
  #[serde(default)]
  pub email: String,
  #[serde(default)]
  pub first_name: String,
  #[serde(default)]
  pub last_name: String,
  #[serde(default)]
  pub image: String,
}

// ============================================================================
// Conversions to domain types
// ============================================================================

impl From<ApiUsersResponse> for Page<User> {
  fn from(resp: ApiUsersResponse) -> Self {
    Page {
      items: resp.users,
      total: resp.total,
      skip: resp.skip,
      limit: resp.limit,
    }
  }
}

impl From<ApiProductsResponse> for Page<Product> {
  fn from(resp: ApiProductsResponse) -> Self {
    Page {
      items: resp.products,
      total: resp.total,
      skip: resp.skip,
      limit: resp.limit,
    }
  }
}

impl From<ApiCategory> for Category {
  fn from(category: ApiCategory) -> Self {
    match category {
      ApiCategory::Full(c) => c,
      ApiCategory::Slug(slug) => Category {
        name: slug.clone(),
        slug,
        url: String::new(),
      },
    }
  }
}

impl From<ApiLoginResponse> for Session {
  fn from(resp: ApiLoginResponse) -> Self {
    Session {
      token: resp.token,
      refresh_token: resp.refresh_token,
      user: SessionUser {
        id: resp.id,
        username: resp.username,
        email: resp.email,
        first_name: resp.first_name,
        last_name: resp.last_name,
        image: resp.image,
      },
    }
  }
}

use crate::api::api_types::{ApiCategory, ApiLoginResponse, ApiProductsResponse, ApiUsersResponse};
use crate::api::types::{Category, Credentials, Page, Product, Session, User};
use crate::api::DummyApi;
use crate::config::ApiConfig;
use async_trait::async_trait;
use color_eyre::{eyre::eyre, Result};
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

/// DummyJSON HTTP client
#[derive(Clone)]
pub struct HttpClient {
  client: reqwest::Client,
  base_url: Url,
}

impl HttpClient {
  pub fn new(config: &ApiConfig) -> Result<Self> {
    // Url::join drops the last path segment unless the base ends with a slash
    let mut base = config.base_url.trim_end_matches('/').to_string();
    base.push('/');
    let base_url =
      Url::parse(&base).map_err(|e| eyre!("Invalid API base URL {}: {}", config.base_url, e))?;

    let client = reqwest::Client::builder()
      .timeout(config.timeout())
      .user_agent(concat!("dummydash/", env!("CARGO_PKG_VERSION")))
      .build()
      .map_err(|e| eyre!("Failed to create HTTP client: {}", e))?;

    Ok(Self { client, base_url })
  }

  /// Build an endpoint URL from path segments and query parameters.
  ///
  /// Segments are percent-encoded individually so ids and slugs can't
  /// escape their position in the path.
  fn endpoint(&self, segments: &[&str], query: &[(&str, String)]) -> Result<Url> {
    let mut url = self.base_url.clone();
    {
      let mut path = url
        .path_segments_mut()
        .map_err(|_| eyre!("API base URL cannot have path segments"))?;
      path.pop_if_empty();
      path.extend(segments);
    }
    if !query.is_empty() {
      url
        .query_pairs_mut()
        .extend_pairs(query.iter().map(|(k, v)| (*k, v.as_str())));
    }
    Ok(url)
  }

  async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T> {
    debug!(%url, "GET");
    let response = self
      .client
      .get(url.clone())
      .send()
      .await
      .map_err(|e| eyre!("Request to {} failed: {}", url, e))?
      .error_for_status()
      .map_err(|e| eyre!("Request to {} failed: {}", url, e))?;

    response
      .json::<T>()
      .await
      .map_err(|e| eyre!("Failed to parse response from {}: {}", url, e))
  }
}

#[async_trait]
impl DummyApi for HttpClient {
  async fn login(&self, credentials: &Credentials) -> Result<Session> {
    let url = self.endpoint(&["auth", "login"], &[])?;
    debug!(%url, username = %credentials.username, "POST");

    let response: ApiLoginResponse = self
      .client
      .post(url)
      .json(credentials)
      .send()
      .await
      .map_err(|e| eyre!("Login request failed: {}", e))?
      .error_for_status()
      .map_err(|e| eyre!("Login rejected: {}", e))?
      .json()
      .await
      .map_err(|e| eyre!("Failed to parse login response: {}", e))?;

    Ok(response.into())
  }

  async fn users(&self, limit: u32, skip: u32) -> Result<Page<User>> {
    let url = self.endpoint(
      &["users"],
      &[("limit", limit.to_string()), ("skip", skip.to_string())],
    )?;
    let response: ApiUsersResponse = self.get_json(url).await?;
    Ok(response.into())
  }

  async fn search_users(&self, query: &str) -> Result<Page<User>> {
    let url = self.endpoint(&["users", "search"], &[("q", query.to_string())])?;
    let response: ApiUsersResponse = self.get_json(url).await?;
    Ok(response.into())
  }

  async fn user(&self, id: &str) -> Result<User> {
    let url = self.endpoint(&["users", id], &[])?;
    self.get_json(url).await
  }

  async fn products(&self, limit: u32, skip: u32) -> Result<Page<Product>> {
    let url = self.endpoint(
      &["products"],
      &[("limit", limit.to_string()), ("skip", skip.to_string())],
    )?;
    let response: ApiProductsResponse = self.get_json(url).await?;
    Ok(response.into())
  }

  async fn search_products(&self, query: &str) -> Result<Page<Product>> {
    let url = self.endpoint(&["products", "search"], &[("q", query.to_string())])?;
    let response: ApiProductsResponse = self.get_json(url).await?;
    Ok(response.into())
  }

  async fn products_by_category(&self, slug: &str) -> Result<Page<Product>> {
    let url = self.endpoint(&["products", "category", slug], &[])?;
    let response: ApiProductsResponse = self.get_json(url).await?;
    Ok(response.into())
  }

  async fn categories(&self) -> Result<Vec<Category>> {
    let url = self.endpoint(&["products", "categories"], &[])?;
    let response: Vec<ApiCategory> = self.get_json(url).await?;
    Ok(response.into_iter().map(Category::from).collect())
  }

  async fn product(&self, id: &str) -> Result<Product> {
    let url = self.endpoint(&["products", id], &[])?;
    self.get_json(url).await
  }
}

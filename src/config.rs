use color_eyre::{eyre::eyre, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://dummyjson.com";

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
  #[serde(default)]
  pub api: ApiConfig,
  #[serde(default)]
  pub cache: CacheConfig,
  #[serde(default)]
  pub ui: UiConfig,
  #[serde(default)]
  pub login: LoginConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
  #[serde(default = "default_base_url")]
  pub base_url: String,
  /// Upper bound for a single request, in seconds
  #[serde(default = "default_timeout_secs")]
  pub timeout_secs: u64,
}

impl Default for ApiConfig {
  fn default() -> Self {
    Self {
      base_url: default_base_url(),
      timeout_secs: default_timeout_secs(),
    }
  }
}

impl ApiConfig {
  pub fn timeout(&self) -> Duration {
    Duration::from_secs(self.timeout_secs)
  }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CacheConfig {
  /// How long a cached response stays fresh, in seconds
  #[serde(default = "default_cache_secs")]
  pub duration_secs: u64,
  /// Per-cache entry limit with LRU eviction (unbounded when unset)
  #[serde(default)]
  pub max_entries: Option<usize>,
  #[serde(default = "default_true")]
  pub cache_product_details: bool,
  /// User details are always fetched fresh unless enabled
  #[serde(default)]
  pub cache_user_details: bool,
}

impl Default for CacheConfig {
  fn default() -> Self {
    Self {
      duration_secs: default_cache_secs(),
      max_entries: None,
      cache_product_details: true,
      cache_user_details: false,
    }
  }
}

impl CacheConfig {
  pub fn duration(&self) -> Duration {
    Duration::from_secs(self.duration_secs)
  }
}

#[derive(Debug, Clone, Deserialize)]
pub struct UiConfig {
  /// Custom title for header (defaults to "Admin Panel")
  pub title: Option<String>,
  #[serde(default = "default_users_per_page")]
  pub users_per_page: u32,
  #[serde(default = "default_products_per_page")]
  pub products_per_page: u32,
}

impl Default for UiConfig {
  fn default() -> Self {
    Self {
      title: None,
      users_per_page: default_users_per_page(),
      products_per_page: default_products_per_page(),
    }
  }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoginConfig {
  /// Username prefilled in the login form
  pub username: Option<String>,
}

fn default_base_url() -> String {
  DEFAULT_BASE_URL.to_string()
}

fn default_timeout_secs() -> u64 {
  10
}

fn default_cache_secs() -> u64 {
  5 * 60
}

fn default_true() -> bool {
  true
}

fn default_users_per_page() -> u32 {
  10
}

fn default_products_per_page() -> u32 {
  12
}

impl Config {
  /// Load configuration from file.
  ///
  /// Search order:
  /// 1. Explicit path if provided
  /// 2. ./dummydash.yaml (current directory)
  /// 3. $XDG_CONFIG_HOME/dummydash/config.yaml
  ///
  /// Falls back to built-in defaults when no file exists.
  pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
    let path = if let Some(p) = explicit_path {
      if p.exists() {
        Some(p.to_path_buf())
      } else {
        return Err(eyre!("Config file not found: {}", p.display()));
      }
    } else {
      Self::find_config_file()
    };

    match path {
      Some(p) => Self::load_from_path(&p),
      None => Ok(Self::default()),
    }
  }

  fn find_config_file() -> Option<PathBuf> {
    let local = PathBuf::from("dummydash.yaml");
    if local.exists() {
      return Some(local);
    }

    if let Some(config_dir) = dirs::config_dir() {
      let xdg_path = config_dir.join("dummydash").join("config.yaml");
      if xdg_path.exists() {
        return Some(xdg_path);
      }
    }

    None
  }

  fn load_from_path(path: &Path) -> Result<Self> {
    let contents = std::fs::read_to_string(path)
      .map_err(|e| eyre!("Failed to read config file {}: {}", path.display(), e))?;

    Self::parse(&contents)
      .map_err(|e| eyre!("Failed to parse config file {}: {}", path.display(), e))
  }

  fn parse(contents: &str) -> Result<Self> {
    let config: Config = serde_yaml::from_str(contents)?;

    if config.ui.users_per_page == 0 || config.ui.products_per_page == 0 {
      return Err(eyre!("Page sizes must be greater than zero"));
    }

    Ok(config)
  }

  /// Header title
  pub fn title(&self) -> &str {
    self.ui.title.as_deref().unwrap_or("Admin Panel")
  }

  /// Get the login password from the environment, if set.
  ///
  /// Checks DUMMYDASH_PASSWORD.
  pub fn get_password() -> Option<String> {
    std::env::var("DUMMYDASH_PASSWORD").ok()
  }
}

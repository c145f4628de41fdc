mod api;
mod app;
mod cache;
mod commands;
mod config;
mod event;
mod logging;
mod query;
mod store;
mod ui;

use api::client::HttpClient;
use clap::Parser;
use color_eyre::Result;
use std::path::PathBuf;
use std::sync::Arc;
use store::{MemorySessionStorage, SessionStorage, SqliteSessionStorage, Stores};
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "dummydash")]
#[command(about = "A terminal admin panel for the DummyJSON demo API")]
#[command(version)]
struct Args {
  /// Path to config file (default: $XDG_CONFIG_HOME/dummydash/config.yaml)
  #[arg(short, long)]
  config: Option<PathBuf>,

  /// API base URL, overriding the config file
  #[arg(short, long)]
  base_url: Option<String>,

  /// Keep the session in memory only
  #[arg(long)]
  no_persist: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
  color_eyre::install()?;

  let args = Args::parse();
  let _log_guard = logging::init()?;

  // Load configuration
  let mut config = config::Config::load(args.config.as_deref())?;
  if let Some(base_url) = args.base_url {
    config.api.base_url = base_url;
  }

  let client = HttpClient::new(&config.api)?;
  let host = ui::renderfns::display_host(&config.api.base_url).to_string();
  info!(host = %host, "Starting dummydash");

  let session: Arc<dyn SessionStorage> = if args.no_persist {
    Arc::new(MemorySessionStorage::new())
  } else {
    Arc::new(SqliteSessionStorage::open()?)
  };

  let stores = Stores::new(Arc::new(client), session, &config)?;
  let ctx = ui::ViewContext::new(stores, &config);

  let mut app = app::App::new(ctx, &config, &host);
  app.run().await?;

  Ok(())
}

//! casework-server binary.
//!
//! Reads `config.toml` (or the path given with `--config`), opens the SQLite
//! live store, and serves the JSON API under `/api`.

use std::path::PathBuf;

use anyhow::Context as _;
use axum::Router;
use casework_api::{AppState, api_router};
use casework_core::{CaseService, demo::DEMO_DATASET_VERSION};
use casework_server::{ServerConfig, expand_tilde};
use casework_store_sqlite::SqliteStore;
use clap::Parser;
use tokio::net::TcpListener;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "Casework compliance case server")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "config.toml")]
  config: PathBuf,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();

  let server_cfg = ServerConfig::load(&cli.config)
    .with_context(|| format!("failed to load configuration from {:?}", cli.config))?;

  let store_path = expand_tilde(&server_cfg.store_path);
  if let Some(parent) = store_path.parent()
    && !parent.as_os_str().is_empty()
  {
    std::fs::create_dir_all(parent)
      .with_context(|| format!("failed to create store directory {parent:?}"))?;
  }

  let store = SqliteStore::open(&store_path)
    .await
    .with_context(|| format!("failed to open store at {store_path:?}"))?;

  let service = CaseService::new(store).with_timeout(server_cfg.fetch_timeout());
  let app = Router::new().nest("/api", api_router(AppState::new(service)));

  let address = server_cfg.address();
  tracing::info!(
    store = %store_path.display(),
    fetch_timeout_ms = server_cfg.fetch_timeout_ms,
    demo_dataset = DEMO_DATASET_VERSION,
    "Listening on http://{address}"
  );
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app).await.context("server error")?;

  Ok(())
}

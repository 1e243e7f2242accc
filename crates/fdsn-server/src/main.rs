//! fdsn-mirror server binary.
//!
//! Reads `config.toml` (or the path specified with `--config`) layered under
//! `FDSN_*` environment variables, opens the SQLite store, seeds the
//! configured data centres, and serves `/fdsnws` and `/api/v1` over HTTP.

use std::{
  path::{Path, PathBuf},
  sync::Arc,
  time::Duration,
};

use anyhow::Context as _;
use clap::Parser;
use fdsn_server::{AppState, ServerConfig, seed_sources};
use fdsn_store_sqlite::SqliteStore;
use tokio::net::TcpListener;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "FDSN metadata mirror")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "config.toml")]
  config: PathBuf,

  /// Port to listen on, overriding the configuration.
  #[arg(short, long)]
  port: Option<u16>,

  /// SQLite database path, overriding the configuration.
  #[arg(long)]
  db_path: Option<PathBuf>,
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

  let settings = config::Config::builder()
    .add_source(config::File::from(cli.config).required(false))
    .add_source(config::Environment::with_prefix("FDSN").try_parsing(true))
    .build()
    .context("failed to read config file")?;

  let mut server_cfg: ServerConfig = settings
    .try_deserialize()
    .context("failed to deserialise ServerConfig")?;
  if let Some(port) = cli.port {
    server_cfg.port = port;
  }
  if let Some(db_path) = cli.db_path {
    server_cfg.db_path = db_path;
  }

  let db_path = expand_tilde(&server_cfg.db_path);
  if let Some(dir) = db_path.parent().filter(|d| !d.as_os_str().is_empty()) {
    std::fs::create_dir_all(dir)
      .with_context(|| format!("failed to create database directory {dir:?}"))?;
  }

  let store = SqliteStore::open(&db_path)
    .await
    .with_context(|| format!("failed to open store at {db_path:?}"))?;
  tracing::info!(path = %db_path.display(), "database opened");

  if let Err(e) = seed_sources(&store, &server_cfg.sources).await {
    tracing::warn!(error = %e, "source seeding failed");
  }

  let http = fdsn_client::http_client(Duration::from_secs(server_cfg.upstream_timeout_secs))
    .context("failed to build HTTP client")?;

  let state = AppState {
    store:  Arc::new(store),
    config: Arc::new(server_cfg.clone()),
    http,
  };

  let app = fdsn_server::app(state);
  let address = format!("{}:{}", server_cfg.host, server_cfg.port);

  tracing::info!("Listening on http://{address}");
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app).await.context("server error")?;

  Ok(())
}

/// Expand a leading `~` to the user's home directory.
fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}

//! taqvim server binary.
//!
//! Reads `config.toml` (or the path specified with `--config`) layered under
//! `TAQVIM_*` environment variables, opens the SQLite store, seeds the
//! configured range and serves the calendar API over HTTP.
//!
//! ```sh
//! TAQVIM_SEED__JALALI_YEAR=1405 cargo run -p taqvim-server --bin server
//! ```

use std::{
  path::{Path, PathBuf},
  sync::Arc,
};

use anyhow::Context as _;
use clap::Parser;
use taqvim_server::ServerConfig;
use taqvim_store_sqlite::SqliteStore;
use tokio::net::TcpListener;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "Taqvim hourly calendar server")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "config.toml")]
  config: PathBuf,

  /// Seed the calendar and exit without serving.
  #[arg(long)]
  seed_only: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  // Initialise tracing.
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();

  // Load configuration.
  let settings = config::Config::builder()
    .add_source(config::File::from(cli.config).required(false))
    .add_source(
      config::Environment::with_prefix("TAQVIM")
        .prefix_separator("_")
        .separator("__")
        .try_parsing(true),
    )
    .build()
    .context("failed to read config file")?;

  let server_cfg: ServerConfig = settings
    .try_deserialize()
    .context("failed to deserialise ServerConfig")?;

  // Open SQLite store.
  let store = if server_cfg.is_in_memory() {
    SqliteStore::open_in_memory()
      .await
      .context("failed to open in-memory store")?
  } else {
    let store_path = expand_tilde(&server_cfg.store_path);
    ensure_parent_dir(&store_path)?;
    SqliteStore::open(&store_path)
      .await
      .with_context(|| format!("failed to open store at {store_path:?}"))?
  };
  let store = Arc::new(store);

  // Seed before binding: a half-seeded calendar is never served.
  taqvim_server::seed_calendar(store.clone(), &server_cfg.seed).await?;
  if cli.seed_only {
    return Ok(());
  }

  let app = taqvim_server::app(store, &server_cfg);
  let address = server_cfg.address();

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

fn ensure_parent_dir(path: &Path) -> anyhow::Result<()> {
  if let Some(parent) = path.parent()
    && !parent.as_os_str().is_empty()
  {
    std::fs::create_dir_all(parent)
      .with_context(|| format!("failed to create {parent:?}"))?;
  }
  Ok(())
}

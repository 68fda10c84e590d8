//! Process bootstrap for the Taqvim calendar server.
//!
//! Holds the runtime configuration, the startup seeding step and the
//! top-level router: the calendar API plus request tracing, CORS and an
//! optional static frontend.

use std::{path::PathBuf, sync::Arc};

use anyhow::Context as _;
use axum::{
  Router,
  http::{HeaderValue, Method, header},
};
use chrono::NaiveDate;
use serde::Deserialize;
use taqvim_core::{
  jalali,
  seed::{CalendarSeeder, SeedRange, SeedReport},
  store::CalendarStore,
};
use tower_http::{
  cors::{Any, CorsLayer},
  services::ServeDir,
  trace::TraceLayer,
};

/// The Jalali year seeded when the configuration names no range.
pub const DEFAULT_JALALI_YEAR: i32 = 1404;

// ─── Configuration ───────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml` and
/// `TAQVIM_*` environment variables.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
  pub host:                  String,
  pub port:                  u16,
  /// SQLite database file; `:memory:` for a throwaway store.
  pub store_path:            PathBuf,
  /// Directory of static assets served for every non-API path.
  pub frontend_dir:          Option<PathBuf>,
  pub cors_allow_any_origin: bool,
  /// Origins allowed when `cors_allow_any_origin` is off.
  pub cors_allowed_origins:  Vec<String>,
  pub seed:                  SeedConfig,
}

impl Default for ServerConfig {
  fn default() -> Self {
    Self {
      host:                  "0.0.0.0".to_string(),
      port:                  8000,
      store_path:            PathBuf::from("db/app.db"),
      frontend_dir:          None,
      cors_allow_any_origin: true,
      cors_allowed_origins:  Vec::new(),
      seed:                  SeedConfig::default(),
    }
  }
}

impl ServerConfig {
  pub fn address(&self) -> String { format!("{}:{}", self.host, self.port) }

  pub fn is_in_memory(&self) -> bool { self.store_path.as_os_str() == ":memory:" }
}

/// The Gregorian range seeded at startup.
///
/// `jalali_year` wins when set. Otherwise `start` and `end` are used, each
/// falling back to the bounds of [`DEFAULT_JALALI_YEAR`].
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SeedConfig {
  pub jalali_year: Option<i32>,
  pub start:       Option<NaiveDate>,
  pub end:         Option<NaiveDate>,
}

impl SeedConfig {
  pub fn range(&self) -> taqvim_core::Result<SeedRange> {
    if let Some(year) = self.jalali_year {
      return SeedRange::for_jalali_year(year);
    }
    let (default_start, default_end) = jalali::year_bounds(DEFAULT_JALALI_YEAR)?;
    SeedRange::new(
      self.start.unwrap_or(default_start),
      self.end.unwrap_or(default_end),
    )
  }
}

// ─── Seeding ─────────────────────────────────────────────────────────────────

/// Seed the configured range into `store`. Any failure is fatal to startup.
pub async fn seed_calendar<S>(store: Arc<S>, config: &SeedConfig) -> anyhow::Result<SeedReport>
where
  S: CalendarStore,
{
  let range = config.range().context("invalid seed configuration")?;
  let report = CalendarSeeder::new(store)
    .seed(range)
    .await
    .context("failed to seed calendar")?;
  Ok(report)
}

// ─── Router ──────────────────────────────────────────────────────────────────

/// Build the full application router for `store`.
pub fn app<S>(store: Arc<S>, config: &ServerConfig) -> Router
where
  S: CalendarStore + 'static,
{
  let mut router = taqvim_api::api_router(store);
  if let Some(dir) = &config.frontend_dir {
    router = router.fallback_service(ServeDir::new(dir).append_index_html_on_directories(true));
  }

  let router = router.layer(TraceLayer::new_for_http());
  match cors_layer(config) {
    Some(cors) => router.layer(cors),
    None => router,
  }
}

fn cors_layer(config: &ServerConfig) -> Option<CorsLayer> {
  if config.cors_allow_any_origin {
    return Some(
      CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any),
    );
  }
  if config.cors_allowed_origins.is_empty() {
    return None;
  }

  let mut origins = Vec::new();
  for origin in &config.cors_allowed_origins {
    match HeaderValue::from_str(origin) {
      Ok(value) => origins.push(value),
      Err(err) => tracing::warn!("ignoring invalid CORS origin '{origin}': {err}"),
    }
  }
  Some(
    CorsLayer::new()
      .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
      .allow_headers([header::CONTENT_TYPE])
      .allow_origin(origins),
  )
}

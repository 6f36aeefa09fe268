//! HTTP host for Discover Mansalay.
//!
//! Wires the unified content store into an axum [`Router`]: the read API
//! under `/api`, uploaded media under `/uploads`, and a JSON banner at `/`.
//! The binary in `main.rs` loads configuration, consolidates the legacy
//! tables and then serves this router.

use std::{
  path::{Path, PathBuf},
  sync::Arc,
};

use anyhow::Context as _;
use axum::{Json, Router, routing::get};
use mansalay_core::{
  consolidate::{ConsolidationReport, Consolidator},
  store::ContentStore,
};
use mansalay_store_sqlite::SqliteStore;
use serde::Deserialize;
use serde_json::{Value, json};
use tokio::signal;
use tower_http::{services::ServeDir, trace::TraceLayer};
use tracing::{info, warn};

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml` and
/// `MANSALAY_*` environment variables. Every key is optional.
#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct ServerConfig {
  pub host:                   String,
  pub port:                   u16,
  pub store_path:             PathBuf,
  pub uploads_dir:            PathBuf,
  /// Run the consolidator before the listener is bound.
  pub consolidate_on_startup: bool,
}

impl Default for ServerConfig {
  fn default() -> Self {
    Self {
      host:                   "0.0.0.0".to_owned(),
      port:                   5000,
      store_path:             PathBuf::from("mansalay.db"),
      uploads_dir:            PathBuf::from("uploads"),
      consolidate_on_startup: true,
    }
  }
}

impl ServerConfig {
  /// Layer `path` (if it exists) and the environment over the defaults.
  pub fn load(path: &Path) -> anyhow::Result<Self> {
    let settings = config::Config::builder()
      .add_source(config::File::from(path).required(false))
      .add_source(config::Environment::with_prefix("MANSALAY").try_parsing(true))
      .build()
      .context("failed to read config file")?;

    settings
      .try_deserialize()
      .context("failed to deserialise ServerConfig")
  }

  pub fn address(&self) -> String { format!("{}:{}", self.host, self.port) }

  /// `store_path` with `~` expanded.
  pub fn store_file(&self) -> PathBuf { expand_tilde(&self.store_path) }

  /// `uploads_dir` with `~` expanded.
  pub fn uploads_path(&self) -> PathBuf { expand_tilde(&self.uploads_dir) }
}

/// Expand a leading `~` to the user's home directory.
pub fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}

// ─── Startup ──────────────────────────────────────────────────────────────────

/// Open the SQLite store named by `config`, optionally creating empty legacy
/// tables for a fresh database.
pub async fn open_store(
  config: &ServerConfig,
  bootstrap_legacy: bool,
) -> anyhow::Result<Arc<SqliteStore>> {
  let store_path = config.store_file();

  let store = SqliteStore::open(&store_path)
    .await
    .with_context(|| format!("failed to open store at {store_path:?}"))?;

  if bootstrap_legacy {
    store
      .bootstrap_legacy_schema()
      .await
      .context("failed to create legacy tables")?;
  }

  Ok(Arc::new(store))
}

/// Run one consolidation pass. Only a schema failure is an error; per-source
/// failures are logged and reported.
pub async fn consolidate<S: ContentStore>(
  store: &Arc<S>,
) -> anyhow::Result<ConsolidationReport> {
  let report = Consolidator::new(Arc::clone(store))
    .run()
    .await
    .context("consolidation aborted")?;

  for failed in report.failed() {
    warn!(source = %failed.source, "source left unmigrated");
  }
  Ok(report)
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build the full application router.
pub fn router<S>(store: Arc<S>, uploads_dir: &Path) -> Router
where
  S: ContentStore + Send + Sync + 'static,
{
  Router::new()
    .route("/", get(root))
    .nest("/api", mansalay_api::api_router(store))
    .nest_service("/uploads", ServeDir::new(uploads_dir))
    .layer(TraceLayer::new_for_http())
}

async fn root() -> Json<Value> {
  Json(json!({
    "message":  "Discover Mansalay API",
    "services": {
      "content":     "/api/content",
      "search":      "/api/search",
      "suggestions": "/api/search/suggestions",
      "uploads":     "/uploads",
    },
  }))
}

/// Resolve on Ctrl+C or, on unix, SIGTERM.
pub async fn shutdown_signal() {
  let ctrl_c = async {
    if let Err(e) = signal::ctrl_c().await {
      warn!("failed to install Ctrl+C handler: {e}");
      std::future::pending::<()>().await;
    }
    info!("received Ctrl+C, shutting down");
  };

  #[cfg(unix)]
  let terminate = async {
    match signal::unix::signal(signal::unix::SignalKind::terminate()) {
      Ok(mut sig) => {
        sig.recv().await;
        info!("received terminate signal, shutting down");
      }
      Err(e) => {
        warn!("failed to install SIGTERM handler: {e}");
        std::future::pending::<()>().await;
      }
    }
  };

  #[cfg(not(unix))]
  let terminate = std::future::pending::<()>();

  tokio::select! {
    _ = ctrl_c => {},
    _ = terminate => {},
  }
}

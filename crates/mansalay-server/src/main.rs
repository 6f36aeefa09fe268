//! mansalay-server binary.
//!
//! Reads `config.toml` (or the path specified with `--config`), opens the
//! SQLite store, consolidates the legacy section tables into
//! `content_items`, and serves the content API over HTTP.
//!
//! # One-off consolidation
//!
//! ```
//! cargo run -p mansalay-server -- --consolidate-only
//! ```

use std::path::PathBuf;

use anyhow::Context as _;
use clap::Parser;
use mansalay_server::{ServerConfig, consolidate, open_store, router, shutdown_signal};
use tokio::net::TcpListener;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "Discover Mansalay content server")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "config.toml")]
  config: PathBuf,

  /// Create any missing legacy section tables before consolidating.
  #[arg(long)]
  bootstrap_legacy: bool,

  /// Consolidate, print the report as JSON and exit.
  #[arg(long)]
  consolidate_only: bool,
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
  let server_cfg = ServerConfig::load(&cli.config)?;

  let store = open_store(&server_cfg, cli.bootstrap_legacy).await?;

  if cli.consolidate_only {
    let report = consolidate(&store).await?;
    println!("{}", serde_json::to_string_pretty(&report)?);
    return Ok(());
  }

  if server_cfg.consolidate_on_startup {
    consolidate(&store).await?;
  }

  let app = router(store, &server_cfg.uploads_path());
  let address = server_cfg.address();

  tracing::info!("Listening on http://{address}");
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app)
    .with_graceful_shutdown(shutdown_signal())
    .await
    .context("server error")?;

  Ok(())
}

//! Essay Scoring Backend
//!
//! - Axum HTTP API (v1 + legacy aliases)
//! - Deterministic heuristic scoring, in-memory stores
//! - Background reaper for expired results
//!
//! Important env variables:
//!   ESSAY_CONFIG_PATH     : path to TOML config (server/results/workflow/scoring/tests)
//!   PORT / SERVER_PORT    : u16 (default 5000)
//!   CORS_ALLOWED_ORIGINS  : comma-separated origins, "*" for any
//!   LOG_LEVEL             : tracing filter, e.g. "debug" or full directives
//!   LOG_FORMAT            : "pretty" (default) or "json"

use std::{net::SocketAddr, sync::Arc, time::Duration};

use tokio::net::TcpListener;
use tracing::{error, info, warn};

use essay_scoring_backend::config::AppConfig;
use essay_scoring_backend::lifecycle::spawn_reaper;
use essay_scoring_backend::routes::build_router;
use essay_scoring_backend::state::AppState;
use essay_scoring_backend::telemetry;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
  telemetry::init_tracing();

  let config = AppConfig::load_from_env();
  let port = config.server.port;
  let reap_every = Duration::from_secs(config.results.reap_interval_secs);

  let state = Arc::new(AppState::from_config(config).await);
  let reaper = spawn_reaper(state.results(), reap_every);

  let app = build_router(state.clone());

  let addr = SocketAddr::from(([0, 0, 0, 0], port));
  let listener = TcpListener::bind(addr).await?;
  info!(target: "essay_backend", %addr, "HTTP server listening");
  axum::serve(listener, app)
    .with_graceful_shutdown(shutdown_signal())
    .await?;

  reaper.abort();
  info!(target: "essay_backend", "Server stopped");
  Ok(())
}

async fn shutdown_signal() {
  match tokio::signal::ctrl_c().await {
    Ok(()) => warn!(target: "essay_backend", "Shutdown signal received, draining connections"),
    Err(e) => {
      error!(target: "essay_backend", error = %e, "Failed to listen for Ctrl+C; running until killed");
      std::future::pending::<()>().await
    }
  }
}

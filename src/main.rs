//! Plonk · Geography Quiz Backend
//!
//! - Axum HTTP + WebSocket API around the question engine
//! - Static SPA fallback (./static/index.html: the map page)
//!
//! Important env variables:
//!   PORT              : u16 (default 3000)
//!   QUIZ_CONFIG_PATH  : path to TOML config (data paths + quiz policies)
//!   LOG_LEVEL         : tracing filter, e.g. "debug" or full directives
//!   LOG_FORMAT        : "pretty" (default) or "json"

use std::net::SocketAddr;

use tokio::net::TcpListener;
use tracing::{error, info, instrument};

use plonk_backend::config::load_quiz_config_from_env;
use plonk_backend::routes::build_router;
use plonk_backend::state::AppState;
use plonk_backend::telemetry;

#[instrument(level = "info", skip_all)]
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
  telemetry::init_tracing();

  // Load quiz config (TOML) or fall back to defaults.
  let cfg = load_quiz_config_from_env().unwrap_or_default();

  // Fetch both data files concurrently; either failure aborts startup with
  // the full (aggregated) message. No automatic retry: rerun after fixing.
  let state = match AppState::load(cfg).await {
    Ok(state) => state,
    Err(e) => {
      error!(target: "plonk_backend", error = %e, "Startup data load failed");
      return Err(e.into());
    }
  };

  // Build the HTTP router with routes, CORS and tracing layers.
  let app = build_router(state);

  // Read port from env or default to 3000.
  let addr: SocketAddr = std::env::var("PORT")
    .ok()
    .and_then(|p| p.parse::<u16>().ok())
    .map(|port| SocketAddr::from(([0, 0, 0, 0], port)))
    .unwrap_or_else(|| SocketAddr::from(([0, 0, 0, 0], 3000)));

  let listener = TcpListener::bind(addr).await?;
  info!(target: "plonk_backend", %addr, "HTTP server listening");
  axum::serve(listener, app).await?;
  Ok(())
}

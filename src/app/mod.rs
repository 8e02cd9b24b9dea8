//! Application setup and runtime.

use crate::{db, http, smtp, store::Store, store::raw::RawStore};
use std::net::SocketAddr;
use std::path::Path;
use tracing::{error, info};

/// Runtime settings, read once from the environment at startup.
#[derive(Debug, Clone)]
pub struct Config {
  pub smtp_addr: String,
  pub http_addr: String,
  pub db_path: String,
  pub store_dir: String,
  pub api_token: Option<String>,
}

impl Config {
  pub fn from_env() -> Self {
    Config {
      smtp_addr: std::env::var("MAILSINK_SMTP_ADDR")
        .unwrap_or_else(|_| "127.0.0.1:1025".to_string()),
      http_addr: std::env::var("MAILSINK_HTTP_ADDR")
        .unwrap_or_else(|_| "127.0.0.1:8025".to_string()),
      db_path: std::env::var("MAILSINK_DB")
        .unwrap_or_else(|_| "./localdata/messages.db".to_string()),
      store_dir: std::env::var("MAILSINK_STORE_DIR").unwrap_or_else(|_| "./localdata".to_string()),
      api_token: std::env::var("MAILSINK_API_TOKEN")
        .ok()
        .filter(|t| !t.is_empty()),
    }
  }
}

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
  pub store: Store,
  pub api_token: Option<String>,
}

/// Start the SMTP capture listener and the HTTP API.
pub async fn run() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
  crate::util::init_tracing();

  let cfg = Config::from_env();
  let pool = db::open_pool(Path::new(&cfg.db_path)).await?;
  let raw = RawStore::open(&cfg.store_dir).await?;
  let state = AppState {
    store: Store::new(pool, raw),
    api_token: cfg.api_token.clone(),
  };

  let app = http::build_router(state.clone());

  let addr: SocketAddr = cfg.http_addr.parse()?;

  info!("message api:    http://{}/messages", addr);
  info!("smtp capture:   {}", cfg.smtp_addr);
  if state.api_token.is_some() {
    info!("api token:      required");
  }

  // Start SMTP listener in background
  let smtp_state = state.clone();
  let smtp_addr = cfg.smtp_addr.clone();
  tokio::spawn(async move {
    if let Err(e) = smtp::start_smtp(smtp_state, &smtp_addr).await {
      error!("smtp listener error: {e}");
    }
  });

  // Start HTTP server
  let listener = tokio::net::TcpListener::bind(addr).await?;
  axum::serve(listener, app).await?;
  Ok(())
}

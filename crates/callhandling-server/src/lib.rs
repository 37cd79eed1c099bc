//! HTTP server assembly for the call handling store.
//!
//! Holds the runtime configuration and wires the API router, the SQLite
//! store, and the tracing layer together. The binary in `main.rs` only
//! parses arguments, loads configuration, and serves.

use std::{
  path::{Path, PathBuf},
  sync::Arc,
  time::Duration,
};

use axum::Router;
use callhandling_api::{ApiConfig, api_router};
use callhandling_core::store::Store;
use serde::Deserialize;
use tower_http::trace::TraceLayer;

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml` and
/// `CALLHANDLING_*` environment variables.
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct ServerConfig {
  pub host:               String,
  pub port:               u16,
  pub store_path:         PathBuf,
  /// Deadline for every record operation, in milliseconds.
  pub request_timeout_ms: u64,
  /// Deadline for the liveness round trip, in milliseconds.
  pub ping_timeout_ms:    u64,
}

impl Default for ServerConfig {
  fn default() -> Self {
    Self {
      host:               "127.0.0.1".to_string(),
      port:               8080,
      store_path:         PathBuf::from("callhandling.db"),
      request_timeout_ms: 1000,
      ping_timeout_ms:    1000,
    }
  }
}

impl ServerConfig {
  pub fn address(&self) -> String { format!("{}:{}", self.host, self.port) }

  pub fn api_config(&self) -> ApiConfig {
    ApiConfig {
      request_timeout: Duration::from_millis(self.request_timeout_ms),
      ping_timeout:    Duration::from_millis(self.ping_timeout_ms),
    }
  }
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

// ─── Application ──────────────────────────────────────────────────────────────

/// Build the full application: the API routes behind a request trace layer.
pub fn app<S>(store: Arc<S>, config: &ServerConfig) -> Router
where
  S: Store + 'static,
{
  api_router(store, config.api_config()).layer(TraceLayer::new_for_http())
}

/// Resolve once Ctrl-C is received.
pub async fn shutdown_signal() {
  match tokio::signal::ctrl_c().await {
    Ok(()) => tracing::info!("received Ctrl-C, shutting down"),
    Err(e) => {
      tracing::error!(error = %e, "failed to listen for Ctrl-C");
      std::future::pending::<()>().await;
    }
  }
}

#[cfg(test)]
mod tests {
  use axum::{
    body::Body,
    http::{Request, StatusCode},
  };
  use callhandling_store_sqlite::SqliteStore;
  use config::{Config, File, FileFormat};
  use tower::ServiceExt as _;

  use super::*;

  fn load(toml: &str) -> ServerConfig {
    Config::builder()
      .add_source(File::from_str(toml, FileFormat::Toml))
      .build()
      .unwrap()
      .try_deserialize()
      .unwrap()
  }

  #[test]
  fn empty_config_uses_defaults() {
    let cfg = load("");
    assert_eq!(cfg, ServerConfig::default());
    assert_eq!(cfg.api_config().request_timeout, Duration::from_secs(1));
    assert_eq!(cfg.api_config().ping_timeout, Duration::from_secs(1));
  }

  #[test]
  fn file_values_override_defaults() {
    let cfg = load(
      r#"
        host = "0.0.0.0"
        port = 9000
        store_path = "/var/lib/callhandling/store.db"
        request_timeout_ms = 250
      "#,
    );
    assert_eq!(cfg.address(), "0.0.0.0:9000");
    assert_eq!(cfg.store_path, PathBuf::from("/var/lib/callhandling/store.db"));
    assert_eq!(cfg.api_config().request_timeout, Duration::from_millis(250));
    assert_eq!(cfg.ping_timeout_ms, 1000);
  }

  #[test]
  fn tilde_expands_to_home() {
    let Ok(home) = std::env::var("HOME") else { return };
    assert_eq!(
      expand_tilde(Path::new("~/calls.db")),
      PathBuf::from(home).join("calls.db")
    );
    assert_eq!(
      expand_tilde(Path::new("/tmp/calls.db")),
      PathBuf::from("/tmp/calls.db")
    );
  }

  #[tokio::test]
  async fn app_serves_ping() {
    let store = Arc::new(SqliteStore::open_in_memory().await.unwrap());
    let req = Request::builder()
      .uri("/ping?data=x")
      .body(Body::empty())
      .unwrap();
    let resp = app(store, &ServerConfig::default()).oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["data"], "Data: x; Database: up");
  }
}

//! Process plumbing for the explore server: configuration, store bootstrap,
//! middleware, and shutdown.
//!
//! The binary in `main.rs` strings these together; everything here is usable
//! (and tested) without binding a socket.

use std::{
  path::{Path, PathBuf},
  sync::Arc,
  time::Duration,
};

use anyhow::Context as _;
use axum::{Router, http::StatusCode};
use explore_store_sqlite::SqliteStore;
use serde::Deserialize;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

/// Store path that selects an in-memory database.
pub const IN_MEMORY: &str = ":memory:";

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml` and
/// `EXPLORE_*` environment variables. Every field has a default.
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ServerConfig {
  pub host:                 String,
  pub port:                 u16,
  pub store_path:           PathBuf,
  pub request_timeout_secs: u64,
  pub connect_attempts:     u32,
  pub connect_backoff_ms:   u64,
}

impl Default for ServerConfig {
  fn default() -> Self {
    Self {
      host:                 "0.0.0.0".to_owned(),
      port:                 50051,
      store_path:           PathBuf::from("explore.db"),
      request_timeout_secs: 10,
      connect_attempts:     10,
      connect_backoff_ms:   1000,
    }
  }
}

impl ServerConfig {
  pub fn address(&self) -> String { format!("{}:{}", self.host, self.port) }
}

/// Read `path` (if it exists) and overlay `EXPLORE_*` environment variables.
pub fn load_config(path: &Path) -> anyhow::Result<ServerConfig> {
  let settings = config::Config::builder()
    .add_source(config::File::from(path).required(false))
    .add_source(config::Environment::with_prefix("EXPLORE"))
    .build()
    .context("failed to read config file")?;

  settings
    .try_deserialize()
    .context("failed to deserialise ServerConfig")
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

// ─── Store bootstrap ──────────────────────────────────────────────────────────

async fn open_store(path: &Path) -> explore_store_sqlite::Result<SqliteStore> {
  let store = if path == Path::new(IN_MEMORY) {
    SqliteStore::open_in_memory().await?
  } else {
    SqliteStore::open(path).await?
  };
  store.ping().await?;
  Ok(store)
}

/// Open and ping the configured store, retrying with exponential backoff.
///
/// The delay before attempt `n + 1` is `connect_backoff_ms * 2^n`.
pub async fn connect(cfg: &ServerConfig) -> anyhow::Result<SqliteStore> {
  let path = expand_tilde(&cfg.store_path);
  let attempts = cfg.connect_attempts.max(1);

  let mut attempt = 0;
  loop {
    match open_store(&path).await {
      Ok(store) => {
        tracing::info!(path = %path.display(), "store ready");
        return Ok(store);
      }
      Err(e) if attempt + 1 < attempts => {
        let delay = Duration::from_millis(
          cfg.connect_backoff_ms.saturating_mul(1u64 << attempt.min(20)),
        );
        tracing::warn!(
          error = %e,
          attempt = attempt + 1,
          attempts,
          delay_ms = delay.as_millis() as u64,
          "store not ready, retrying"
        );
        tokio::time::sleep(delay).await;
        attempt += 1;
      }
      Err(e) => {
        return Err(e).with_context(|| {
          format!("failed to open store at {path:?} after {attempts} attempts")
        });
      }
    }
  }
}

// ─── Application ──────────────────────────────────────────────────────────────

/// The API router wrapped in request tracing and a per-request timeout.
pub fn app(store: SqliteStore, cfg: &ServerConfig) -> Router {
  explore_api::api_router(Arc::new(store))
    .layer(TimeoutLayer::with_status_code(
      StatusCode::REQUEST_TIMEOUT,
      Duration::from_secs(cfg.request_timeout_secs),
    ))
    .layer(TraceLayer::new_for_http())
}

/// Resolves on Ctrl-C or SIGTERM.
pub async fn shutdown_signal() {
  let ctrl_c = async {
    if let Err(e) = tokio::signal::ctrl_c().await {
      tracing::error!(error = %e, "failed to listen for Ctrl-C");
      std::future::pending::<()>().await;
    }
  };

  #[cfg(unix)]
  let terminate = async {
    use tokio::signal::unix::{SignalKind, signal};
    match signal(SignalKind::terminate()) {
      Ok(mut sig) => {
        sig.recv().await;
      }
      Err(e) => {
        tracing::error!(error = %e, "failed to listen for SIGTERM");
        std::future::pending::<()>().await;
      }
    }
  };

  #[cfg(not(unix))]
  let terminate = std::future::pending::<()>();

  tokio::select! {
    () = ctrl_c => {},
    () = terminate => {},
  }
  tracing::info!("shutdown signal received");
}

#[cfg(test)]
mod tests {
  use axum::{
    body::Body,
    http::{Request, StatusCode},
  };
  use tower::ServiceExt as _;

  use super::*;

  fn temp_path(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!("explore-server-{}-{name}", std::process::id()))
  }

  #[test]
  fn missing_config_file_yields_defaults() {
    let cfg = load_config(&temp_path("absent.toml")).unwrap();
    assert_eq!(cfg.host, "0.0.0.0");
    assert_eq!(cfg.port, 50051);
    assert_eq!(cfg.store_path, PathBuf::from("explore.db"));
    assert_eq!(cfg.request_timeout_secs, 10);
    assert_eq!(cfg.address(), "0.0.0.0:50051");
  }

  #[test]
  fn config_file_overrides_some_fields() {
    let path = temp_path("partial.toml");
    std::fs::write(&path, "port = 8080\nstore_path = \":memory:\"\n").unwrap();

    let cfg = load_config(&path).unwrap();
    std::fs::remove_file(&path).ok();

    assert_eq!(cfg.port, 8080);
    assert_eq!(cfg.store_path, PathBuf::from(IN_MEMORY));
    assert_eq!(cfg.connect_attempts, 10);
  }

  #[test]
  fn tilde_expands_to_home() {
    let Ok(home) = std::env::var("HOME") else { return };
    assert_eq!(
      expand_tilde(Path::new("~/data/explore.db")),
      PathBuf::from(home).join("data/explore.db")
    );
    assert_eq!(expand_tilde(Path::new("/abs.db")), PathBuf::from("/abs.db"));
  }

  #[tokio::test]
  async fn connect_opens_in_memory_store() {
    let cfg = ServerConfig {
      store_path: PathBuf::from(IN_MEMORY),
      ..ServerConfig::default()
    };
    let store = connect(&cfg).await.unwrap();
    store.ping().await.unwrap();
  }

  #[tokio::test]
  async fn connect_gives_up_after_the_last_attempt() {
    let cfg = ServerConfig {
      store_path: temp_path("no-such-dir").join("nested").join("explore.db"),
      connect_attempts: 3,
      connect_backoff_ms: 1,
      ..ServerConfig::default()
    };
    let Err(err) = connect(&cfg).await else {
      panic!("connect should fail for a missing directory");
    };
    assert!(format!("{err}").contains("after 3 attempts"), "{err}");
  }

  #[tokio::test]
  async fn app_serves_the_api() {
    let store = SqliteStore::open_in_memory().await.unwrap();
    let app = app(store, &ServerConfig::default());

    let resp = app
      .oneshot(
        Request::builder()
          .uri("/liked-you/count?recipient_user_id=r")
          .body(Body::empty())
          .unwrap(),
      )
      .await
      .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
  }
}

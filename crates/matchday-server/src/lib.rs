//! HTTP server assembly for Matchday.
//!
//! Combines the public and admin routers from [`matchday_api`], puts Basic
//! auth in front of the admin routes and request tracing around everything.

pub mod audit;
pub mod auth;
pub mod error;

pub use error::Error;

use std::{path::PathBuf, sync::Arc, time::Duration};

use axum::{Router, middleware};
use matchday_api::ApiState;
use matchday_core::store::MatchdayStore;
use serde::Deserialize;
use tower_http::trace::{DefaultOnResponse, TraceLayer};
use tracing::Level;

use auth::{AuthConfig, require_admin};

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml` and
/// `MATCHDAY_*` environment variables.
#[derive(Deserialize, Clone)]
pub struct ServerConfig {
  #[serde(default = "default_host")]
  pub host:                 String,
  #[serde(default = "default_port")]
  pub port:                 u16,
  #[serde(default = "default_store_path")]
  pub store_path:           PathBuf,
  pub auth_username:        String,
  pub auth_password_hash:   String,
  #[serde(default = "default_audit_queue_capacity")]
  pub audit_queue_capacity: usize,
  #[serde(default = "default_request_timeout_secs")]
  pub request_timeout_secs: u64,
}

fn default_host() -> String { "127.0.0.1".to_string() }
fn default_port() -> u16 { 8080 }
fn default_store_path() -> PathBuf { PathBuf::from("matchday.db") }
fn default_audit_queue_capacity() -> usize { audit::DEFAULT_CAPACITY }
fn default_request_timeout_secs() -> u64 { 8 }

impl ServerConfig {
  pub fn request_timeout(&self) -> Duration { Duration::from_secs(self.request_timeout_secs) }

  pub fn auth(&self) -> AuthConfig {
    AuthConfig {
      username:      self.auth_username.clone(),
      password_hash: self.auth_password_hash.clone(),
    }
  }
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build the complete application router.
pub fn router<S>(api: ApiState<S>, auth: Arc<AuthConfig>) -> Router
where
  S: MatchdayStore + 'static,
{
  let admin = matchday_api::admin_router(api.clone())
    .route_layer(middleware::from_fn_with_state(auth, require_admin));

  matchday_api::public_router(api)
    .merge(admin)
    .layer(TraceLayer::new_for_http().on_response(DefaultOnResponse::new().level(Level::INFO)))
}

// ─── Integration tests ────────────────────────────────────────────────────────

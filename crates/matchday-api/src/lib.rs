//! JSON REST API for Matchday.
//!
//! Exposes axum [`Router`]s backed by a [`MatchEngine`] over any
//! [`MatchdayStore`]. Reads and writes are split into two routers so the
//! caller can put authentication in front of the writes only. TLS and auth
//! are the caller's responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! let state = matchday_api::ApiState::new(engine, Duration::from_secs(8));
//! let app = matchday_api::public_router(state.clone())
//!   .merge(matchday_api::admin_router(state).route_layer(auth));
//! ```

pub mod error;
pub mod matches;
pub mod table;
pub mod teams;

use std::{future::Future, sync::Arc, time::Duration};

use axum::{
  Router,
  routing::{get, patch, post},
};
use matchday_core::{engine::MatchEngine, store::MatchdayStore};

pub use error::ApiError;

/// Shared handler state: the engine and the per-request deadline.
pub struct ApiState<S> {
  pub engine:  Arc<MatchEngine<S>>,
  pub timeout: Duration,
}

impl<S> Clone for ApiState<S> {
  fn clone(&self) -> Self {
    Self {
      engine:  Arc::clone(&self.engine),
      timeout: self.timeout,
    }
  }
}

impl<S> ApiState<S> {
  pub fn new(engine: MatchEngine<S>, timeout: Duration) -> Self {
    Self {
      engine: Arc::new(engine),
      timeout,
    }
  }

  /// Run `op` under the request deadline.
  pub(crate) async fn bounded<T>(
    &self,
    op: impl Future<Output = matchday_core::Result<T>>,
  ) -> Result<T, ApiError> {
    with_deadline(self.timeout, op).await
  }
}

/// Expiry is reported as [`matchday_core::Error::Timeout`]. A store write
/// already in flight still commits or rolls back as a whole.
async fn with_deadline<T>(
  limit: Duration,
  op: impl Future<Output = matchday_core::Result<T>>,
) -> Result<T, ApiError> {
  match tokio::time::timeout(limit, op).await {
    Ok(result) => Ok(result?),
    Err(_) => Err(matchday_core::Error::Timeout.into()),
  }
}

/// Unauthenticated read routes.
pub fn public_router<S>(state: ApiState<S>) -> Router<()>
where
  S: MatchdayStore + 'static,
{
  Router::new()
    // Registry
    .route("/leagues", get(teams::leagues::<S>))
    .route("/teams", get(teams::list::<S>))
    .route("/teams/{code}", get(teams::get_one::<S>))
    // Matches
    .route("/matches", get(matches::list::<S>))
    .route("/matches/{key}", get(matches::get_one::<S>))
    // Derived views
    .route("/table", get(table::standings::<S>))
    .route("/stats", get(table::stats::<S>))
    .with_state(state)
}

/// Routes that change matches, plus audit inspection.
pub fn admin_router<S>(state: ApiState<S>) -> Router<()>
where
  S: MatchdayStore + 'static,
{
  Router::new()
    .route("/matches", post(matches::create::<S>))
    .route("/matches/{key}/events", patch(matches::add_event::<S>))
    .route("/matches/{key}/status", patch(matches::set_status::<S>))
    .route("/matches/{key}/finalize", post(matches::finalize::<S>))
    .route("/audit", get(table::audit::<S>))
    .with_state(state)
}

//! Derived views: the league table, aggregate stats and the audit trail.

use axum::{
  Json,
  extract::{Query, State, rejection::QueryRejection},
};
use matchday_core::{
  audit::AuditRecord,
  standings::{MatchStats, Standings},
  store::MatchdayStore,
};
use serde::Deserialize;

use crate::{ApiState, error::ApiError};

const DEFAULT_AUDIT_LIMIT: usize = 50;
const MAX_AUDIT_LIMIT: usize = 500;

#[derive(Debug, Deserialize)]
pub struct TableParams {
  pub league:   Option<String>,
  pub favorite: Option<String>,
}

/// `GET /table[?league=<league>&favorite=<code>]`
pub async fn standings<S>(
  State(state): State<ApiState<S>>,
  params: Result<Query<TableParams>, QueryRejection>,
) -> Result<Json<Standings>, ApiError>
where
  S: MatchdayStore,
{
  let Query(params) = params?;
  let table = state
    .bounded(
      state
        .engine
        .standings(params.league.as_deref(), params.favorite.as_deref()),
    )
    .await?;
  Ok(Json(table))
}

/// `GET /stats`
pub async fn stats<S>(State(state): State<ApiState<S>>) -> Result<Json<MatchStats>, ApiError>
where
  S: MatchdayStore,
{
  let stats = state.bounded(state.engine.stats()).await?;
  Ok(Json(stats))
}

#[derive(Debug, Deserialize)]
pub struct AuditParams {
  pub limit: Option<usize>,
}

/// `GET /audit[?limit=<n>]` — newest first, capped at 500.
pub async fn audit<S>(
  State(state): State<ApiState<S>>,
  params: Result<Query<AuditParams>, QueryRejection>,
) -> Result<Json<Vec<AuditRecord>>, ApiError>
where
  S: MatchdayStore,
{
  let Query(params) = params?;
  let limit = params.limit.unwrap_or(DEFAULT_AUDIT_LIMIT).min(MAX_AUDIT_LIMIT);
  let records = state.bounded(state.engine.recent_audit(limit)).await?;
  Ok(Json(records))
}

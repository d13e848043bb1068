//! Handlers for the team registry.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/leagues` | Distinct league names |
//! | `GET`  | `/teams` | Optional `?league=EPL` |
//! | `GET`  | `/teams/{code}` | 404 if not found |

use axum::{
  Json,
  extract::{Path, Query, State, rejection::QueryRejection},
};
use matchday_core::{store::MatchdayStore, team::Team};
use serde::Deserialize;

use crate::{ApiState, error::ApiError};

/// `GET /leagues`
pub async fn leagues<S>(State(state): State<ApiState<S>>) -> Result<Json<Vec<String>>, ApiError>
where
  S: MatchdayStore,
{
  let leagues = state.bounded(state.engine.list_leagues()).await?;
  Ok(Json(leagues))
}

#[derive(Debug, Deserialize)]
pub struct ListParams {
  pub league: Option<String>,
}

/// `GET /teams[?league=<league>]`
pub async fn list<S>(
  State(state): State<ApiState<S>>,
  params: Result<Query<ListParams>, QueryRejection>,
) -> Result<Json<Vec<Team>>, ApiError>
where
  S: MatchdayStore,
{
  let Query(params) = params?;
  let teams = state
    .bounded(state.engine.list_teams(params.league.as_deref()))
    .await?;
  Ok(Json(teams))
}

/// `GET /teams/{code}`
pub async fn get_one<S>(
  State(state): State<ApiState<S>>,
  Path(code): Path<String>,
) -> Result<Json<Team>, ApiError>
where
  S: MatchdayStore,
{
  let team = state.bounded(state.engine.get_team(&code)).await?;
  Ok(Json(team))
}

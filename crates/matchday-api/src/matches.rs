//! Handlers for `/matches` endpoints.
//!
//! | Method  | Path | Notes |
//! |---------|------|-------|
//! | `GET`   | `/matches` | Optional `?status=live&team=ARS` |
//! | `GET`   | `/matches/{key}` | 404 if not found |
//! | `POST`  | `/matches` | Body: `{"home_code":"ARS","away_code":"LIV","kickoff":"..."}` |
//! | `PATCH` | `/matches/{key}/events` | Body: `{"type":"goal","team_code":"ARS","minute":10,"player":"Saka"}` |
//! | `PATCH` | `/matches/{key}/status` | Body: `{"status":"live"}` |
//! | `POST`  | `/matches/{key}/finalize` | No body |

use axum::{
  Json,
  extract::{
    Path, Query, State,
    rejection::{JsonRejection, QueryRejection},
  },
  http::StatusCode,
  response::IntoResponse,
};
use matchday_core::{
  Error,
  fixture::{EventInput, Match, MatchStatus, NewMatch},
  store::{MatchQuery, MatchdayStore},
};
use serde::Deserialize;

use crate::{ApiState, error::ApiError};

// ─── List ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ListParams {
  pub status: Option<String>,
  pub team:   Option<String>,
}

impl ListParams {
  fn into_query(self) -> Result<MatchQuery, ApiError> {
    let status = self
      .status
      .as_deref()
      .map(str::trim)
      .filter(|s| !s.is_empty())
      .map(|s| {
        s.parse::<MatchStatus>().map_err(|_| {
          Error::InvalidArgument(format!(
            "status must be scheduled, live or finished; got {s:?}"
          ))
        })
      })
      .transpose()?;
    let team = self.team.filter(|t| !t.trim().is_empty());
    Ok(MatchQuery { status, team })
  }
}

/// `GET /matches[?status=<status>&team=<code>]`
pub async fn list<S>(
  State(state): State<ApiState<S>>,
  params: Result<Query<ListParams>, QueryRejection>,
) -> Result<Json<Vec<Match>>, ApiError>
where
  S: MatchdayStore,
{
  let Query(params) = params?;
  let query = params.into_query()?;
  let matches = state.bounded(state.engine.list_matches(&query)).await?;
  Ok(Json(matches))
}

// ─── Get one ──────────────────────────────────────────────────────────────────

/// `GET /matches/{key}`
pub async fn get_one<S>(
  State(state): State<ApiState<S>>,
  Path(key): Path<String>,
) -> Result<Json<Match>, ApiError>
where
  S: MatchdayStore,
{
  let fixture = state.bounded(state.engine.get_match(&key)).await?;
  Ok(Json(fixture))
}

// ─── Writes ───────────────────────────────────────────────────────────────────

/// `POST /matches`
pub async fn create<S>(
  State(state): State<ApiState<S>>,
  body: Result<Json<NewMatch>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError>
where
  S: MatchdayStore,
{
  let Json(input) = body?;
  let created = state.bounded(state.engine.create_match(input)).await?;
  Ok((StatusCode::CREATED, Json(created)))
}

/// `PATCH /matches/{key}/events`
pub async fn add_event<S>(
  State(state): State<ApiState<S>>,
  Path(key): Path<String>,
  body: Result<Json<EventInput>, JsonRejection>,
) -> Result<Json<Match>, ApiError>
where
  S: MatchdayStore,
{
  let Json(input) = body?;
  let updated = state.bounded(state.engine.add_event(&key, input)).await?;
  Ok(Json(updated))
}

#[derive(Debug, Deserialize)]
pub struct StatusBody {
  pub status: String,
}

/// `PATCH /matches/{key}/status`
pub async fn set_status<S>(
  State(state): State<ApiState<S>>,
  Path(key): Path<String>,
  body: Result<Json<StatusBody>, JsonRejection>,
) -> Result<Json<Match>, ApiError>
where
  S: MatchdayStore,
{
  let Json(StatusBody { status }) = body?;
  let updated = state
    .bounded(state.engine.set_status(&key, &status))
    .await?;
  Ok(Json(updated))
}

/// `POST /matches/{key}/finalize`
pub async fn finalize<S>(
  State(state): State<ApiState<S>>,
  Path(key): Path<String>,
) -> Result<Json<Match>, ApiError>
where
  S: MatchdayStore,
{
  let finished = state.bounded(state.engine.finalize(&key)).await?;
  Ok(Json(finished))
}

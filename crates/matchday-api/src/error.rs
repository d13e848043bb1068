//! API error type and [`axum::response::IntoResponse`] implementation.
//!
//! Every error body has the shape `{"error": "<kind>", "message": "..."}`,
//! where `kind` is the snake_case [`ErrorKind`].

use axum::{
  Json,
  extract::rejection::{JsonRejection, QueryRejection},
  http::StatusCode,
  response::{IntoResponse, Response},
};
use matchday_core::ErrorKind;
use serde_json::json;
use thiserror::Error;

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error(transparent)]
  Core(#[from] matchday_core::Error),

  /// The request could not be decoded into the handler's input type.
  #[error("bad request: {0}")]
  BadRequest(String),
}

impl From<JsonRejection> for ApiError {
  fn from(rejection: JsonRejection) -> Self { Self::BadRequest(rejection.body_text()) }
}

impl From<QueryRejection> for ApiError {
  fn from(rejection: QueryRejection) -> Self { Self::BadRequest(rejection.body_text()) }
}

impl ApiError {
  pub fn kind(&self) -> ErrorKind {
    match self {
      ApiError::Core(e) => e.kind(),
      ApiError::BadRequest(_) => ErrorKind::InvalidArgument,
    }
  }
}

fn status_for(kind: ErrorKind) -> StatusCode {
  match kind {
    ErrorKind::NotFound => StatusCode::NOT_FOUND,
    ErrorKind::InvalidArgument => StatusCode::BAD_REQUEST,
    ErrorKind::Conflict => StatusCode::CONFLICT,
    ErrorKind::Unavailable => StatusCode::SERVICE_UNAVAILABLE,
    ErrorKind::Timeout => StatusCode::GATEWAY_TIMEOUT,
    ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let kind = self.kind();
    let message = match (&self, kind) {
      (_, ErrorKind::Internal) => {
        tracing::error!(error = %self, "internal error");
        "internal error".to_owned()
      }
      (ApiError::BadRequest(m), _) => m.clone(),
      (ApiError::Core(e), _) => e.to_string(),
    };
    (status_for(kind), Json(json!({ "error": kind, "message": message }))).into_response()
  }
}

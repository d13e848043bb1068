//! Error types for `matchday-core`.
//!
//! Every failure a caller can observe falls into one of the [`ErrorKind`]s.
//! Storage backends convert their own errors into this type so the engine can
//! surface a single taxonomy.

use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  /// Unknown match key or team code.
  #[error("{0}")]
  NotFound(String),

  /// Malformed or semantically invalid input.
  #[error("{0}")]
  InvalidArgument(String),

  /// State-machine violation, duplicate key, or a lost conditional update.
  #[error("{0}")]
  Conflict(String),

  /// The backing store could not be reached or failed to execute.
  #[error("storage unavailable: {0}")]
  Unavailable(String),

  #[error("operation timed out")]
  Timeout,

  /// A stored record could not be decoded.
  #[error("internal error: {0}")]
  Internal(String),

  #[error("serialization error: {0}")]
  Serialization(#[from] serde_json::Error),
}

/// The coarse category of an [`Error`], stable across message changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
  NotFound,
  InvalidArgument,
  Conflict,
  Unavailable,
  Timeout,
  Internal,
}

impl Error {
  pub fn kind(&self) -> ErrorKind {
    match self {
      Self::NotFound(_) => ErrorKind::NotFound,
      Self::InvalidArgument(_) => ErrorKind::InvalidArgument,
      Self::Conflict(_) => ErrorKind::Conflict,
      Self::Unavailable(_) => ErrorKind::Unavailable,
      Self::Timeout => ErrorKind::Timeout,
      Self::Internal(_) | Self::Serialization(_) => ErrorKind::Internal,
    }
  }

  pub(crate) fn invalid(msg: impl Into<String>) -> Self {
    Self::InvalidArgument(msg.into())
  }

  pub(crate) fn conflict(msg: impl Into<String>) -> Self {
    Self::Conflict(msg.into())
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

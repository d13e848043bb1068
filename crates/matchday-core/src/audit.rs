//! Audit records describing each accepted mutation.
//!
//! The engine hands records to an [`AuditSink`] after the store has committed
//! a change. Delivery is best effort: a sink may drop records, and nothing it
//! does can fail or delay the mutation that produced them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString, IntoStaticStr};

#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Serialize,
  Deserialize,
  Display,
  EnumString,
  AsRefStr,
  IntoStaticStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum AuditKind {
  MatchCreated,
  EventAdded,
  StatusChanged,
  Finalized,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditRecord {
  pub kind:       AuditKind,
  pub match_key:  String,
  pub message:    String,
  pub created_at: DateTime<Utc>,
}

impl AuditRecord {
  pub fn new(kind: AuditKind, match_key: &str, message: impl Into<String>) -> Self {
    Self {
      kind,
      match_key: match_key.to_owned(),
      message: message.into(),
      created_at: Utc::now(),
    }
  }
}

/// Fire-and-forget destination for audit records.
///
/// `enqueue` must return promptly and must not panic; implementations drop
/// records they cannot accept.
pub trait AuditSink: Send + Sync {
  fn enqueue(&self, record: AuditRecord);
}

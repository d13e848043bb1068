//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! All timestamps are stored as fixed-width RFC 3339 UTC strings. Enums are
//! stored as their lowercase wire names. Event payloads are stored as compact
//! JSON with the discriminant in its own column.

use chrono::{DateTime, SecondsFormat, Utc};
use matchday_core::{
  audit::{AuditKind, AuditRecord},
  fixture::{EventDetail, Match, MatchEvent, MatchStatus},
  team::Team,
};

use crate::{Error, Result};

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

/// Fixed-width so that text order matches time order.
pub fn encode_dt(dt: DateTime<Utc>) -> String {
  dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── Enums ───────────────────────────────────────────────────────────────────

pub fn encode_status(status: MatchStatus) -> &'static str { status.into() }

pub fn decode_status(s: &str) -> Result<MatchStatus> {
  s.parse()
    .map_err(|_| Error::Decode(format!("unknown match status: {s:?}")))
}

pub fn decode_audit_kind(s: &str) -> Result<AuditKind> {
  s.parse()
    .map_err(|_| Error::Decode(format!("unknown audit kind: {s:?}")))
}

// ─── Counters ────────────────────────────────────────────────────────────────

fn decode_count(column: &str, n: i64) -> Result<u32> {
  u32::try_from(n).map_err(|_| Error::Decode(format!("{column} out of range: {n}")))
}

// ─── Event payload ───────────────────────────────────────────────────────────

pub fn encode_event_detail(detail: &EventDetail) -> Result<String> {
  Ok(detail.to_json()?.to_string())
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw values read directly from a `teams` row.
pub struct RawTeam {
  pub code:   String,
  pub name:   String,
  pub league: String,
}

impl RawTeam {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      code:   row.get(0)?,
      name:   row.get(1)?,
      league: row.get(2)?,
    })
  }

  pub fn into_team(self) -> Team {
    Team {
      code:   self.code,
      name:   self.name,
      league: self.league,
    }
  }
}

/// Raw values read directly from a `match_events` row.
pub struct RawEvent {
  pub event_type:  String,
  pub team_code:   String,
  pub minute:      i64,
  pub detail_json: String,
}

impl RawEvent {
  pub fn into_event(self) -> Result<MatchEvent> {
    let data: serde_json::Value = serde_json::from_str(&self.detail_json)?;
    let detail = EventDetail::from_parts(&self.event_type, data)?;
    let minute = u8::try_from(self.minute)
      .map_err(|_| Error::Decode(format!("event minute out of range: {}", self.minute)))?;
    Ok(MatchEvent {
      team_code: self.team_code,
      minute,
      detail,
    })
  }
}

/// Raw values read from a `matches` row, plus its events in append order.
pub struct RawMatch {
  pub match_key:  String,
  pub kickoff:    String,
  pub home_code:  String,
  pub away_code:  String,
  pub home_goals: i64,
  pub away_goals: i64,
  pub status:     String,
  pub created_at: String,
  pub events:     Vec<RawEvent>,
}

impl RawMatch {
  pub const COLUMNS: &'static str = "match_key, kickoff, home_code, away_code, \
                                     home_goals, away_goals, status, created_at";

  /// Reads the columns listed in [`RawMatch::COLUMNS`]; events are attached
  /// separately.
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      match_key:  row.get(0)?,
      kickoff:    row.get(1)?,
      home_code:  row.get(2)?,
      away_code:  row.get(3)?,
      home_goals: row.get(4)?,
      away_goals: row.get(5)?,
      status:     row.get(6)?,
      created_at: row.get(7)?,
      events:     Vec::new(),
    })
  }

  pub fn into_match(self) -> Result<Match> {
    Ok(Match {
      kickoff:    decode_dt(&self.kickoff)?,
      home_goals: decode_count("home_goals", self.home_goals)?,
      away_goals: decode_count("away_goals", self.away_goals)?,
      status:     decode_status(&self.status)?,
      created_at: decode_dt(&self.created_at)?,
      events:     self
        .events
        .into_iter()
        .map(RawEvent::into_event)
        .collect::<Result<_>>()?,
      key:        self.match_key,
      home_code:  self.home_code,
      away_code:  self.away_code,
    })
  }
}

/// Raw values read directly from an `audit_log` row.
pub struct RawAudit {
  pub kind:       String,
  pub match_key:  String,
  pub message:    String,
  pub created_at: String,
}

impl RawAudit {
  pub fn into_record(self) -> Result<AuditRecord> {
    Ok(AuditRecord {
      kind:       decode_audit_kind(&self.kind)?,
      match_key:  self.match_key,
      message:    self.message,
      created_at: decode_dt(&self.created_at)?,
    })
  }
}

//! Match types — one fixture between two teams and its append-only event log.
//!
//! A match is created `Scheduled` with a zero score and an empty log. Events
//! are appended, never edited; the score is derived from the goal events that
//! were accepted. Once `Finished`, the match accepts nothing further.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString, IntoStaticStr};
use uuid::Uuid;

use crate::{Error, Result, team::canonical_code};

/// Inclusive bounds on an event's `minute`, stoppage time included.
pub const MINUTE_RANGE: std::ops::RangeInclusive<i64> = 1..=130;

const MAX_KEY_LEN: usize = 64;

// ─── Status ──────────────────────────────────────────────────────────────────

/// Where a match is in its lifecycle. Transition rules live in
/// [`crate::lifecycle`].
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Hash,
  Serialize,
  Deserialize,
  Display,
  EnumString,
  AsRefStr,
  IntoStaticStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum MatchStatus {
  Scheduled,
  Live,
  Finished,
}

/// Which side of a fixture a team plays on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
  Home,
  Away,
}

// ─── Events ──────────────────────────────────────────────────────────────────

/// The discriminant of an [`EventDetail`], as accepted on the wire.
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
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum EventKind {
  Goal,
  Card,
  Injury,
  Var,
  Sub,
}

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
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum CardColor {
  Yellow,
  Red,
}

/// The kind-specific payload of an event. Each variant carries exactly the
/// fields that kind requires.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EventDetail {
  Goal {
    player: String,
  },
  Card {
    player: String,
    color:  CardColor,
  },
  Injury {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    player: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    detail: Option<String>,
  },
  Var {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    player: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    detail: Option<String>,
  },
  Sub {
    player_out: String,
    player_in:  String,
  },
}

impl EventDetail {
  pub fn kind(&self) -> EventKind {
    match self {
      Self::Goal { .. } => EventKind::Goal,
      Self::Card { .. } => EventKind::Card,
      Self::Injury { .. } => EventKind::Injury,
      Self::Var { .. } => EventKind::Var,
      Self::Sub { .. } => EventKind::Sub,
    }
  }

  /// Serialise the payload without its `type` tag, for storage alongside a
  /// separate discriminant column.
  pub fn to_json(&self) -> Result<serde_json::Value> {
    let mut full = serde_json::to_value(self)?;
    if let Some(obj) = full.as_object_mut() {
      obj.remove("type");
    }
    Ok(full)
  }

  /// Rebuild from a stored discriminant and the payload produced by
  /// [`EventDetail::to_json`].
  pub fn from_parts(discriminant: &str, data: serde_json::Value) -> Result<Self> {
    let mut obj = match data {
      serde_json::Value::Object(map) => map,
      serde_json::Value::Null => serde_json::Map::new(),
      other => {
        return Err(Error::Internal(format!(
          "event payload is not an object: {other}"
        )));
      }
    };
    obj.insert("type".into(), serde_json::Value::String(discriminant.to_owned()));
    Ok(serde_json::from_value(serde_json::Value::Object(obj))?)
  }
}

/// One entry in a match's event log. Immutable once appended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchEvent {
  pub team_code: String,
  pub minute:    u8,
  #[serde(flatten)]
  pub detail:    EventDetail,
}

impl MatchEvent {
  pub fn kind(&self) -> EventKind { self.detail.kind() }

  pub fn is_goal(&self) -> bool { matches!(self.detail, EventDetail::Goal { .. }) }
}

/// An event as submitted by a caller, before validation.
///
/// Every field is optional so that a missing or malformed value is reported
/// as an invalid argument rather than a decoding failure.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EventInput {
  #[serde(rename = "type")]
  pub kind:       Option<String>,
  pub team_code:  Option<String>,
  pub minute:     Option<i64>,
  pub player:     Option<String>,
  pub detail:     Option<String>,
  pub color:      Option<String>,
  pub player_out: Option<String>,
  pub player_in:  Option<String>,
}

impl EventInput {
  /// Check field presence and ranges and build the typed event.
  ///
  /// Participation in a particular match is not checked here; see
  /// [`crate::lifecycle::MatchMutation::append_event`].
  pub fn validate(self) -> Result<MatchEvent> {
    let kind_raw = required("type", self.kind)?;
    let kind: EventKind = kind_raw.parse().map_err(|_| {
      Error::invalid(format!(
        "unknown event type {kind_raw:?}; expected goal, card, injury, var or sub"
      ))
    })?;

    let team_code = canonical_code(&required("team_code", self.team_code)?);

    let minute = self
      .minute
      .ok_or_else(|| Error::invalid("minute is required"))?;
    if !MINUTE_RANGE.contains(&minute) {
      return Err(Error::invalid(format!(
        "minute must be between {} and {}, got {minute}",
        MINUTE_RANGE.start(),
        MINUTE_RANGE.end()
      )));
    }

    let detail = match kind {
      EventKind::Goal => EventDetail::Goal {
        player: required("player", self.player)?,
      },
      EventKind::Card => {
        let color_raw = required("color", self.color)?;
        let color = color_raw.parse().map_err(|_| {
          Error::invalid(format!("card color must be yellow or red, got {color_raw:?}"))
        })?;
        EventDetail::Card {
          player: required("player", self.player)?,
          color,
        }
      }
      EventKind::Injury => EventDetail::Injury {
        player: optional(self.player),
        detail: optional(self.detail),
      },
      EventKind::Var => EventDetail::Var {
        player: optional(self.player),
        detail: optional(self.detail),
      },
      EventKind::Sub => EventDetail::Sub {
        player_out: required("player_out", self.player_out)?,
        player_in:  required("player_in", self.player_in)?,
      },
    };

    Ok(MatchEvent {
      team_code,
      minute: minute as u8,
      detail,
    })
  }
}

fn required(field: &str, value: Option<String>) -> Result<String> {
  optional(value).ok_or_else(|| Error::invalid(format!("{field} is required")))
}

fn optional(value: Option<String>) -> Option<String> {
  value
    .map(|v| v.trim().to_owned())
    .filter(|v| !v.is_empty())
}

// ─── Match ───────────────────────────────────────────────────────────────────

/// A fixture and everything recorded against it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Match {
  pub key:        String,
  pub kickoff:    DateTime<Utc>,
  pub home_code:  String,
  pub away_code:  String,
  /// Count of accepted goal events for the home side.
  pub home_goals: u32,
  /// Count of accepted goal events for the away side.
  pub away_goals: u32,
  pub status:     MatchStatus,
  /// Append order, not sorted by minute.
  pub events:     Vec<MatchEvent>,
  /// Server-assigned; never changes after creation.
  pub created_at: DateTime<Utc>,
}

impl Match {
  pub fn side_of(&self, team_code: &str) -> Option<Side> {
    if team_code == self.home_code {
      Some(Side::Home)
    } else if team_code == self.away_code {
      Some(Side::Away)
    } else {
      None
    }
  }

  pub fn total_goals(&self) -> u32 { self.home_goals + self.away_goals }
}

// ─── NewMatch ────────────────────────────────────────────────────────────────

/// Input to [`crate::engine::MatchEngine::create_match`].
#[derive(Debug, Clone, Deserialize)]
pub struct NewMatch {
  /// Generated from the participants and kickoff date when absent.
  #[serde(default)]
  pub key:       Option<String>,
  /// RFC 3339 timestamp, e.g. `2026-02-10T18:30:00Z`.
  pub kickoff:   String,
  pub home_code: String,
  pub away_code: String,
}

impl NewMatch {
  pub fn new(home_code: &str, away_code: &str, kickoff: &str) -> Self {
    Self {
      key:       None,
      kickoff:   kickoff.to_owned(),
      home_code: home_code.to_owned(),
      away_code: away_code.to_owned(),
    }
  }

  pub fn with_key(mut self, key: &str) -> Self {
    self.key = Some(key.to_owned());
    self
  }

  /// Validate the shape of the request and build the `Scheduled` match it
  /// describes. Team existence is the caller's concern.
  pub fn validate(self, now: DateTime<Utc>) -> Result<Match> {
    let home_code = canonical_code(&self.home_code);
    let away_code = canonical_code(&self.away_code);
    if home_code.is_empty() || away_code.is_empty() {
      return Err(Error::invalid("home_code and away_code are required"));
    }
    if home_code == away_code {
      return Err(Error::invalid("home_code and away_code must differ"));
    }

    let kickoff = DateTime::parse_from_rfc3339(self.kickoff.trim())
      .map(|dt| dt.with_timezone(&Utc))
      .map_err(|_| {
        Error::invalid(format!(
          "kickoff must be RFC 3339, e.g. 2026-02-10T18:30:00Z; got {:?}",
          self.kickoff
        ))
      })?;

    let key = match optional(self.key) {
      Some(key) => {
        validate_key(&key)?;
        key
      }
      None => generate_key(&home_code, &away_code, kickoff),
    };

    Ok(Match {
      key,
      kickoff,
      home_code,
      away_code,
      home_goals: 0,
      away_goals: 0,
      status: MatchStatus::Scheduled,
      events: Vec::new(),
      created_at: now,
    })
  }
}

fn validate_key(key: &str) -> Result<()> {
  let well_formed = key.len() <= MAX_KEY_LEN
    && key
      .chars()
      .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
  if well_formed {
    Ok(())
  } else {
    Err(Error::invalid(format!(
      "match key must be 1-{MAX_KEY_LEN} characters of A-Z, a-z, 0-9, '-' or '_'; got {key:?}"
    )))
  }
}

fn generate_key(home: &str, away: &str, kickoff: DateTime<Utc>) -> String {
  let suffix = Uuid::new_v4().simple().to_string();
  format!("{home}-{away}-{}-{}", kickoff.format("%Y%m%d"), &suffix[..8])
}

#[cfg(test)]
mod tests {
  use super::*;

  fn input(kind: &str) -> EventInput {
    EventInput {
      kind: Some(kind.into()),
      team_code: Some("ars".into()),
      minute: Some(10),
      ..Default::default()
    }
  }

  // ── EventInput ─────────────────────────────────────────────────────────────

  #[test]
  fn goal_requires_player() {
    let err = input("goal").validate().unwrap_err();
    assert!(matches!(err, Error::InvalidArgument(_)), "{err}");

    let mut ok = input("GOAL");
    ok.player = Some("  Saka ".into());
    let event = ok.validate().unwrap();
    assert_eq!(event.team_code, "ARS");
    assert_eq!(event.detail, EventDetail::Goal { player: "Saka".into() });
  }

  #[test]
  fn card_requires_known_color() {
    let mut card = input("card");
    card.player = Some("Rice".into());
    card.color = Some("green".into());
    assert!(matches!(card.clone().validate(), Err(Error::InvalidArgument(_))));

    card.color = Some("Red".into());
    let event = card.validate().unwrap();
    assert_eq!(event.detail, EventDetail::Card {
      player: "Rice".into(),
      color:  CardColor::Red,
    });
  }

  #[test]
  fn sub_requires_both_players() {
    let mut sub = input("sub");
    sub.player_out = Some("Odegaard".into());
    assert!(matches!(sub.clone().validate(), Err(Error::InvalidArgument(_))));

    sub.player_in = Some("Havertz".into());
    assert_eq!(sub.validate().unwrap().kind(), EventKind::Sub);
  }

  #[test]
  fn injury_and_var_fields_are_optional() {
    let injury = input("injury").validate().unwrap();
    assert_eq!(injury.detail, EventDetail::Injury { player: None, detail: None });

    let mut var = input("var");
    var.detail = Some("penalty check".into());
    var.player = Some("   ".into());
    assert_eq!(var.validate().unwrap().detail, EventDetail::Var {
      player: None,
      detail: Some("penalty check".into()),
    });
  }

  #[test]
  fn minute_bounds_are_inclusive() {
    for (minute, ok) in [(0, false), (1, true), (130, true), (131, false), (-5, false)] {
      let mut e = input("injury");
      e.minute = Some(minute);
      assert_eq!(e.validate().is_ok(), ok, "minute {minute}");
    }

    let mut missing = input("injury");
    missing.minute = None;
    assert!(matches!(missing.validate(), Err(Error::InvalidArgument(_))));
  }

  #[test]
  fn unknown_type_is_invalid() {
    let err = input("corner").validate().unwrap_err();
    assert!(err.to_string().contains("corner"));
  }

  #[test]
  fn missing_team_code_is_invalid() {
    let mut e = input("injury");
    e.team_code = None;
    assert!(matches!(e.validate(), Err(Error::InvalidArgument(_))));
  }

  // ── Serialisation ──────────────────────────────────────────────────────────

  #[test]
  fn event_serialises_flat_with_type_tag() {
    let event = MatchEvent {
      team_code: "LIV".into(),
      minute:    80,
      detail:    EventDetail::Goal { player: "Salah".into() },
    };
    let json = serde_json::to_value(&event).unwrap();
    assert_eq!(json, serde_json::json!({
      "team_code": "LIV",
      "minute": 80,
      "type": "goal",
      "player": "Salah",
    }));
    let back: MatchEvent = serde_json::from_value(json).unwrap();
    assert_eq!(back, event);
  }

  #[test]
  fn detail_parts_round_trip_through_storage_form() {
    let detail = EventDetail::Card {
      player: "Rodri".into(),
      color:  CardColor::Yellow,
    };
    let data = detail.to_json().unwrap();
    assert!(data.get("type").is_none());
    assert_eq!(EventDetail::from_parts("card", data).unwrap(), detail);
  }

  #[test]
  fn detail_from_parts_rejects_unknown_discriminant() {
    assert!(EventDetail::from_parts("corner", serde_json::json!({})).is_err());
  }

  // ── NewMatch ───────────────────────────────────────────────────────────────

  #[test]
  fn new_match_is_scheduled_and_empty() {
    let m = NewMatch::new("ars", " liv", "2026-02-10T18:30:00Z")
      .with_key("ARS-LIV-001")
      .validate(Utc::now())
      .unwrap();
    assert_eq!(m.key, "ARS-LIV-001");
    assert_eq!(m.home_code, "ARS");
    assert_eq!(m.away_code, "LIV");
    assert_eq!(m.status, MatchStatus::Scheduled);
    assert_eq!((m.home_goals, m.away_goals), (0, 0));
    assert!(m.events.is_empty());
  }

  #[test]
  fn new_match_rejects_same_team_twice() {
    let err = NewMatch::new("ARS", "ars", "2026-02-10T18:30:00Z")
      .validate(Utc::now())
      .unwrap_err();
    assert!(matches!(err, Error::InvalidArgument(_)));
  }

  #[test]
  fn new_match_rejects_bad_kickoff() {
    let err = NewMatch::new("ARS", "LIV", "next tuesday")
      .validate(Utc::now())
      .unwrap_err();
    assert!(matches!(err, Error::InvalidArgument(_)));
  }

  #[test]
  fn new_match_rejects_malformed_key() {
    let err = NewMatch::new("ARS", "LIV", "2026-02-10T18:30:00Z")
      .with_key("ARS/LIV")
      .validate(Utc::now())
      .unwrap_err();
    assert!(matches!(err, Error::InvalidArgument(_)));
  }

  #[test]
  fn generated_key_names_teams_and_date() {
    let m = NewMatch::new("ARS", "LIV", "2026-02-10T18:30:00+01:00")
      .validate(Utc::now())
      .unwrap();
    assert!(m.key.starts_with("ARS-LIV-20260210-"), "{}", m.key);
    assert_eq!(m.key.len(), "ARS-LIV-20260210-".len() + 8);
  }

  #[test]
  fn status_parses_case_insensitively() {
    assert_eq!("LIVE".parse::<MatchStatus>().unwrap(), MatchStatus::Live);
    assert_eq!(MatchStatus::Finished.to_string(), "finished");
    assert!("halftime".parse::<MatchStatus>().is_err());
  }
}

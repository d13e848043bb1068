//! The match state machine.
//!
//! | State     | append event | → Scheduled / Live        | → Finished |
//! |-----------|--------------|---------------------------|------------|
//! | Scheduled | allowed      | allowed                   | finalize   |
//! | Live      | allowed      | Live only (no regression) | finalize   |
//! | Finished  | `Conflict`   | `Conflict`                | no-op      |
//!
//! Every rule is decided here. Callers plan a change with
//! [`MatchStatus::plan_change`], or build a [`MatchMutation`] whose
//! [`expected_statuses`](MatchMutation::expected_statuses) the store re-checks
//! at write time.

use crate::{
  Error, Result,
  fixture::{Match, MatchEvent, MatchStatus, Side},
};

// ─── Status transitions ──────────────────────────────────────────────────────

/// What a requested status change amounts to, given the current status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusChange {
  /// Target equals the current non-final status; nothing to write.
  Unchanged,
  /// Move to a different non-final status.
  Advance(MatchStatus),
  /// Seal the match; handled by the single finalize path.
  Finalize,
  /// Finalize requested on a match that is already finished.
  AlreadyFinished,
}

impl MatchStatus {
  const OPEN: &'static [MatchStatus] = &[MatchStatus::Scheduled, MatchStatus::Live];
  const SCHEDULED_ONLY: &'static [MatchStatus] = &[MatchStatus::Scheduled];

  /// Whether events may still be appended.
  pub fn accepts_events(self) -> bool { Self::OPEN.contains(&self) }

  pub fn is_final(self) -> bool { self == MatchStatus::Finished }

  /// The statuses from which `self` may be entered by a write.
  ///
  /// The engine never writes `Scheduled`, since `plan_change` only ever
  /// advances to `Live` or finalizes. The entry for it guards direct store
  /// callers building a [`MatchMutation::SetStatus`] themselves.
  pub fn predecessors(self) -> &'static [MatchStatus] {
    match self {
      MatchStatus::Scheduled => Self::SCHEDULED_ONLY,
      MatchStatus::Live | MatchStatus::Finished => Self::OPEN,
    }
  }

  /// Decide what moving from `self` to `target` means.
  pub fn plan_change(self, target: MatchStatus) -> Result<StatusChange> {
    use MatchStatus::*;
    match (self, target) {
      (Finished, Finished) => Ok(StatusChange::AlreadyFinished),
      (Finished, _) => Err(Error::conflict("finished match cannot be changed")),
      (_, Finished) => Ok(StatusChange::Finalize),
      (Live, Scheduled) => Err(Error::conflict(
        "live match cannot return to scheduled",
      )),
      (current, target) if current == target => Ok(StatusChange::Unchanged),
      (_, target) => Ok(StatusChange::Advance(target)),
    }
  }
}

// ─── Mutations ───────────────────────────────────────────────────────────────

/// Goals to add to each side as part of one atomic update.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScoreDelta {
  pub home: u32,
  pub away: u32,
}

/// A single change to a stored match, applied by
/// [`crate::store::MatchdayStore::conditional_update`] only while the match
/// is still in one of [`MatchMutation::expected_statuses`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatchMutation {
  /// Append to the log and bump the scoring side's counter together.
  AppendEvent { event: MatchEvent, score: ScoreDelta },
  SetStatus(MatchStatus),
}

impl MatchMutation {
  /// Build the append for `event` against `fixture`.
  ///
  /// Fails with `InvalidArgument` if the event's team is not playing.
  pub fn append_event(fixture: &Match, event: MatchEvent) -> Result<Self> {
    let side = fixture.side_of(&event.team_code).ok_or_else(|| {
      Error::invalid(format!(
        "team {} is not playing in match {}",
        event.team_code, fixture.key
      ))
    })?;

    let score = match (event.is_goal(), side) {
      (false, _) => ScoreDelta::default(),
      (true, Side::Home) => ScoreDelta { home: 1, away: 0 },
      (true, Side::Away) => ScoreDelta { home: 0, away: 1 },
    };

    Ok(Self::AppendEvent { event, score })
  }

  pub fn expected_statuses(&self) -> &'static [MatchStatus] {
    match self {
      Self::AppendEvent { .. } => MatchStatus::OPEN,
      Self::SetStatus(target) => target.predecessors(),
    }
  }

  pub fn score_delta(&self) -> ScoreDelta {
    match self {
      Self::AppendEvent { score, .. } => *score,
      Self::SetStatus(_) => ScoreDelta::default(),
    }
  }

  pub fn new_status(&self) -> Option<MatchStatus> {
    match self {
      Self::AppendEvent { .. } => None,
      Self::SetStatus(status) => Some(*status),
    }
  }

  pub fn event(&self) -> Option<&MatchEvent> {
    match self {
      Self::AppendEvent { event, .. } => Some(event),
      Self::SetStatus(_) => None,
    }
  }
}

#[cfg(test)]
mod tests {
  use chrono::Utc;

  use super::*;
  use crate::fixture::{EventDetail, NewMatch};

  use MatchStatus::*;

  fn fixture() -> Match {
    NewMatch::new("ARS", "LIV", "2026-02-10T18:30:00Z")
      .with_key("ARS-LIV-001")
      .validate(Utc::now())
      .unwrap()
  }

  fn event(team: &str, detail: EventDetail) -> MatchEvent {
    MatchEvent { team_code: team.into(), minute: 10, detail }
  }

  #[test]
  fn transition_table() {
    let cases = [
      (Scheduled, Scheduled, StatusChange::Unchanged),
      (Scheduled, Live, StatusChange::Advance(Live)),
      (Scheduled, Finished, StatusChange::Finalize),
      (Live, Live, StatusChange::Unchanged),
      (Live, Finished, StatusChange::Finalize),
      (Finished, Finished, StatusChange::AlreadyFinished),
    ];
    for (from, to, expected) in cases {
      assert_eq!(from.plan_change(to).unwrap(), expected, "{from} -> {to}");
    }
  }

  #[test]
  fn finished_is_absorbing() {
    for target in [Scheduled, Live] {
      let err = Finished.plan_change(target).unwrap_err();
      assert!(matches!(err, Error::Conflict(_)), "{target}: {err}");
    }
  }

  #[test]
  fn live_cannot_regress() {
    assert!(matches!(Live.plan_change(Scheduled), Err(Error::Conflict(_))));
  }

  #[test]
  fn only_open_statuses_accept_events() {
    assert!(Scheduled.accepts_events());
    assert!(Live.accepts_events());
    assert!(!Finished.accepts_events());
  }

  #[test]
  fn predecessors_never_include_finished() {
    for status in [Scheduled, Live, Finished] {
      assert!(!status.predecessors().contains(&Finished), "{status}");
    }
    assert_eq!(Scheduled.predecessors(), &[Scheduled]);
  }

  #[test]
  fn goal_credits_the_scoring_side() {
    let m = fixture();
    let home = MatchMutation::append_event(&m, event("ARS", EventDetail::Goal {
      player: "Saka".into(),
    }))
    .unwrap();
    assert_eq!(home.score_delta(), ScoreDelta { home: 1, away: 0 });

    let away = MatchMutation::append_event(&m, event("LIV", EventDetail::Goal {
      player: "Salah".into(),
    }))
    .unwrap();
    assert_eq!(away.score_delta(), ScoreDelta { home: 0, away: 1 });
    assert_eq!(away.expected_statuses(), &[Scheduled, Live]);
  }

  #[test]
  fn non_goal_events_leave_score_alone() {
    let m = fixture();
    let injury = MatchMutation::append_event(&m, event("LIV", EventDetail::Injury {
      player: None,
      detail: None,
    }))
    .unwrap();
    assert_eq!(injury.score_delta(), ScoreDelta::default());
    assert!(injury.new_status().is_none());
  }

  #[test]
  fn outsider_event_is_invalid() {
    let m = fixture();
    let err = MatchMutation::append_event(&m, event("CHE", EventDetail::Goal {
      player: "Palmer".into(),
    }))
    .unwrap_err();
    assert!(matches!(err, Error::InvalidArgument(_)));
  }

  #[test]
  fn set_status_expects_legal_predecessors() {
    let finish = MatchMutation::SetStatus(Finished);
    assert_eq!(finish.expected_statuses(), &[Scheduled, Live]);
    assert_eq!(finish.new_status(), Some(Finished));
    assert!(finish.event().is_none());
  }
}

//! League table and aggregate statistics, derived from finished matches.
//!
//! Nothing here is stored. Each call folds the current set of finished
//! matches into one accumulator per team and sorts the result with a total
//! order, so equal inputs always produce the same table.

use std::{cmp::Ordering, collections::HashMap};

use serde::{Deserialize, Serialize};

use crate::{fixture::Match, team::Team};

const POINTS_WIN: u32 = 3;
const POINTS_DRAW: u32 = 1;

// ─── Table ───────────────────────────────────────────────────────────────────

/// One team's line in the table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableRow {
  pub team_code:     String,
  pub team_name:     String,
  pub league:        String,
  /// Set only on the row matching the requested favourite team.
  pub is_favorite:   bool,
  pub played:        u32,
  pub wins:          u32,
  pub draws:         u32,
  pub losses:        u32,
  pub goals_for:     u32,
  pub goals_against: u32,
  pub goal_diff:     i64,
  pub points:        u32,
}

impl TableRow {
  fn blank(team: &Team, is_favorite: bool) -> Self {
    Self {
      team_code: team.code.clone(),
      team_name: team.name.clone(),
      league: team.league.clone(),
      is_favorite,
      played: 0,
      wins: 0,
      draws: 0,
      losses: 0,
      goals_for: 0,
      goals_against: 0,
      goal_diff: 0,
      points: 0,
    }
  }

  fn record(&mut self, scored: u32, conceded: u32) {
    self.played += 1;
    self.goals_for += scored;
    self.goals_against += conceded;
    match scored.cmp(&conceded) {
      Ordering::Greater => {
        self.wins += 1;
        self.points += POINTS_WIN;
      }
      Ordering::Less => self.losses += 1,
      Ordering::Equal => {
        self.draws += 1;
        self.points += POINTS_DRAW;
      }
    }
  }

  /// Descending table order: points, goal difference, goals scored, then
  /// team name ascending. The team code breaks any remaining tie.
  fn table_order(a: &Self, b: &Self) -> Ordering {
    b.points
      .cmp(&a.points)
      .then(b.goal_diff.cmp(&a.goal_diff))
      .then(b.goals_for.cmp(&a.goals_for))
      .then_with(|| a.team_name.cmp(&b.team_name))
      .then_with(|| a.team_code.cmp(&b.team_code))
  }
}

/// A computed table, tagged with the league it was filtered to.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Standings {
  pub league: Option<String>,
  pub rows:   Vec<TableRow>,
}

/// Build the table for `teams` from `matches`.
///
/// Only `Finished` matches count. With a `league`, `teams` is narrowed to that
/// league and a match contributes only when both participants belong to it.
/// Without one, every finished match between known teams contributes. Teams
/// with no finished matches still get an all-zero row.
pub fn compute_table(
  teams: &[Team],
  matches: &[Match],
  league: Option<&str>,
  favorite: Option<&str>,
) -> Vec<TableRow> {
  let mut rows: Vec<TableRow> = teams
    .iter()
    .filter(|t| league.is_none_or(|l| t.league == l))
    .map(|t| TableRow::blank(t, favorite == Some(t.code.as_str())))
    .collect();

  // Lookup only; iteration order of this map is never observed.
  let index: HashMap<String, usize> = rows
    .iter()
    .enumerate()
    .map(|(i, row)| (row.team_code.clone(), i))
    .collect();

  for m in matches.iter().filter(|m| m.status.is_final()) {
    let (Some(&home), Some(&away)) =
      (index.get(&m.home_code), index.get(&m.away_code))
    else {
      continue;
    };
    rows[home].record(m.home_goals, m.away_goals);
    rows[away].record(m.away_goals, m.home_goals);
  }

  for row in &mut rows {
    row.goal_diff = i64::from(row.goals_for) - i64::from(row.goals_against);
  }

  rows.sort_by(TableRow::table_order);
  rows
}

// ─── Aggregate statistics ────────────────────────────────────────────────────

/// Totals across all matches.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchStats {
  pub total_matches:       usize,
  pub finished_matches:    usize,
  /// Goals across finished matches only.
  pub total_goals:         u64,
  pub avg_goals_per_match: f64,
}

pub fn compute_stats(matches: &[Match]) -> MatchStats {
  let finished: Vec<&Match> = matches.iter().filter(|m| m.status.is_final()).collect();
  let total_goals: u64 = finished.iter().map(|m| u64::from(m.total_goals())).sum();
  let avg_goals_per_match = if finished.is_empty() {
    0.0
  } else {
    total_goals as f64 / finished.len() as f64
  };

  MatchStats {
    total_matches: matches.len(),
    finished_matches: finished.len(),
    total_goals,
    avg_goals_per_match,
  }
}

#[cfg(test)]
mod tests {
  use chrono::Utc;

  use super::*;
  use crate::fixture::{MatchStatus, NewMatch};

  fn teams() -> Vec<Team> {
    vec![
      Team::new("ARS", "Arsenal", "EPL"),
      Team::new("LIV", "Liverpool", "EPL"),
      Team::new("CHE", "Chelsea", "EPL"),
      Team::new("AVL", "Aston Villa", "EPL"),
      Team::new("RMA", "Real Madrid", "LaLiga"),
      Team::new("FCB", "Barcelona", "LaLiga"),
    ]
  }

  fn result(home: &str, away: &str, hg: u32, ag: u32) -> Match {
    let mut m = NewMatch::new(home, away, "2026-02-10T18:30:00Z")
      .validate(Utc::now())
      .unwrap();
    m.home_goals = hg;
    m.away_goals = ag;
    m.status = MatchStatus::Finished;
    m
  }

  fn row<'a>(table: &'a [TableRow], code: &str) -> &'a TableRow {
    table.iter().find(|r| r.team_code == code).unwrap()
  }

  #[test]
  fn draw_credits_both_sides() {
    let table = compute_table(&teams(), &[result("ARS", "LIV", 1, 1)], Some("EPL"), None);
    for code in ["ARS", "LIV"] {
      let r = row(&table, code);
      assert_eq!((r.played, r.draws, r.points, r.goal_diff), (1, 1, 1, 0), "{code}");
    }
  }

  #[test]
  fn win_and_loss_are_cross_credited() {
    let table = compute_table(&teams(), &[result("CHE", "AVL", 0, 2)], None, None);
    let villa = row(&table, "AVL");
    assert_eq!((villa.wins, villa.points, villa.goals_for, villa.goals_against), (1, 3, 2, 0));
    let chelsea = row(&table, "CHE");
    assert_eq!((chelsea.losses, chelsea.points, chelsea.goal_diff), (1, 0, -2));
    assert_eq!(table[0].team_code, "AVL");
  }

  #[test]
  fn unfinished_matches_do_not_count() {
    let mut live = result("ARS", "LIV", 3, 0);
    live.status = MatchStatus::Live;
    let table = compute_table(&teams(), &[live], None, None);
    assert!(table.iter().all(|r| r.played == 0));
  }

  #[test]
  fn league_filter_drops_cross_league_matches() {
    let matches = [result("ARS", "RMA", 5, 0), result("RMA", "FCB", 2, 1)];
    let epl = compute_table(&teams(), &matches, Some("EPL"), None);
    assert_eq!(epl.len(), 4);
    assert!(epl.iter().all(|r| r.played == 0));

    let laliga = compute_table(&teams(), &matches, Some("LaLiga"), None);
    assert_eq!(laliga.len(), 2);
    assert_eq!(row(&laliga, "RMA").played, 1);
  }

  #[test]
  fn unfiltered_table_mixes_leagues() {
    let table = compute_table(&teams(), &[result("ARS", "RMA", 2, 0)], None, None);
    assert_eq!(table.len(), 6);
    assert_eq!(table[0].team_code, "ARS");
    assert_eq!(row(&table, "RMA").losses, 1);
  }

  #[test]
  fn tie_break_chain() {
    // ARS and LIV: equal points, equal goal difference, ARS scored more.
    // CHE and AVL: identical records, ordered by name.
    // RMA and FCB: no points, equal goal difference, RMA scored more.
    let matches = [
      result("ARS", "RMA", 3, 1),
      result("LIV", "FCB", 2, 0),
      result("CHE", "RMA", 1, 0),
      result("AVL", "FCB", 1, 0),
    ];
    let table = compute_table(&teams(), &matches, None, None);
    let order: Vec<&str> = table.iter().map(|r| r.team_code.as_str()).collect();
    assert_eq!(order, ["ARS", "LIV", "AVL", "CHE", "RMA", "FCB"]);
  }

  #[test]
  fn teams_without_matches_sort_last_on_equal_points() {
    let table = compute_table(&teams(), &[result("ARS", "LIV", 0, 0)], Some("EPL"), None);
    let order: Vec<&str> = table.iter().map(|r| r.team_code.as_str()).collect();
    // The drawn sides lead on points; the untouched teams follow by name.
    assert_eq!(order, ["ARS", "LIV", "AVL", "CHE"]);
  }

  #[test]
  fn favorite_only_marks_a_row() {
    let plain = compute_table(&teams(), &[result("ARS", "LIV", 0, 1)], None, None);
    let marked = compute_table(&teams(), &[result("ARS", "LIV", 0, 1)], None, Some("CHE"));
    let strip = |rows: &[TableRow]| -> Vec<String> {
      rows.iter().map(|r| r.team_code.clone()).collect()
    };
    assert_eq!(strip(&plain), strip(&marked));
    assert!(row(&marked, "CHE").is_favorite);
    assert_eq!(marked.iter().filter(|r| r.is_favorite).count(), 1);
  }

  #[test]
  fn table_is_deterministic() {
    let matches = [
      result("ARS", "LIV", 2, 2),
      result("CHE", "AVL", 1, 1),
      result("RMA", "FCB", 0, 0),
    ];
    let first = compute_table(&teams(), &matches, None, None);
    for _ in 0..10 {
      assert_eq!(compute_table(&teams(), &matches, None, None), first);
    }
  }

  #[test]
  fn matches_with_unknown_teams_are_skipped() {
    let table = compute_table(&teams(), &[result("ARS", "XXX", 4, 0)], None, None);
    assert_eq!(row(&table, "ARS").played, 0);
  }

  #[test]
  fn stats_average_finished_matches_only() {
    let mut live = result("CHE", "AVL", 0, 0);
    live.status = MatchStatus::Live;
    let stats = compute_stats(&[result("ARS", "LIV", 2, 1), result("RMA", "FCB", 1, 0), live]);
    assert_eq!(stats.total_matches, 3);
    assert_eq!(stats.finished_matches, 2);
    assert_eq!(stats.total_goals, 4);
    assert!((stats.avg_goals_per_match - 2.0).abs() < f64::EPSILON);
  }

  #[test]
  fn stats_on_empty_history() {
    let stats = compute_stats(&[]);
    assert_eq!(stats.finished_matches, 0);
    assert_eq!(stats.avg_goals_per_match, 0.0);
  }
}

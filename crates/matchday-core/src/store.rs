//! The `MatchdayStore` trait and supporting query types.
//!
//! The trait is implemented by storage backends (e.g. `matchday-store-sqlite`).
//! It bundles three capabilities: the read-only team registry, the match
//! store with its atomic conditional update, and the audit log the background
//! writer appends to.

use std::future::Future;

use crate::{
  audit::AuditRecord,
  fixture::{Match, MatchStatus},
  lifecycle::MatchMutation,
  team::Team,
};

// ─── Query and outcome types ─────────────────────────────────────────────────

/// Parameters for [`MatchdayStore::list_matches`].
#[derive(Debug, Clone, Default)]
pub struct MatchQuery {
  pub status: Option<MatchStatus>,
  /// Only matches this team plays in, home or away.
  pub team:   Option<String>,
}

/// Result of [`MatchdayStore::insert_match`].
#[derive(Debug, Clone)]
pub enum InsertOutcome {
  Inserted(Match),
  /// Another match already holds this key.
  DuplicateKey,
}

/// Result of [`MatchdayStore::conditional_update`].
#[derive(Debug, Clone)]
pub enum UpdateOutcome {
  /// The precondition held and the mutation was committed; carries the
  /// match as stored afterwards.
  Applied(Match),
  /// The match was missing or no longer in an expected status. Nothing was
  /// written.
  NotApplied,
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Abstraction over a Matchday storage backend.
///
/// All methods return `Send` futures so the trait can be used in multi-threaded
/// async runtimes (e.g. tokio with `axum`).
pub trait MatchdayStore: Send + Sync {
  /// Backend errors convert into the core taxonomy, so the engine can report
  /// an unreachable store as `Unavailable` and a corrupt row as `Internal`.
  type Error: std::error::Error + Send + Sync + 'static + Into<crate::Error>;

  // ── Team registry ─────────────────────────────────────────────────────

  fn team_exists<'a>(
    &'a self,
    code: &'a str,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + 'a;

  fn find_team<'a>(
    &'a self,
    code: &'a str,
  ) -> impl Future<Output = Result<Option<Team>, Self::Error>> + Send + 'a;

  /// All teams ordered by name, optionally restricted to one league.
  fn list_teams<'a>(
    &'a self,
    league: Option<&'a str>,
  ) -> impl Future<Output = Result<Vec<Team>, Self::Error>> + Send + 'a;

  /// Distinct league names, ascending.
  fn list_leagues(
    &self,
  ) -> impl Future<Output = Result<Vec<String>, Self::Error>> + Send + '_;

  // ── Matches ───────────────────────────────────────────────────────────

  /// Persist a new match. The key is unique; a concurrent insert of the same
  /// key yields [`InsertOutcome::DuplicateKey`] for the loser.
  fn insert_match(
    &self,
    fixture: Match,
  ) -> impl Future<Output = Result<InsertOutcome, Self::Error>> + Send + '_;

  fn find_match<'a>(
    &'a self,
    key: &'a str,
  ) -> impl Future<Output = Result<Option<Match>, Self::Error>> + Send + 'a;

  /// Matches ordered by kickoff, then key.
  fn list_matches<'a>(
    &'a self,
    query: &'a MatchQuery,
  ) -> impl Future<Output = Result<Vec<Match>, Self::Error>> + Send + 'a;

  fn list_finished(
    &self,
  ) -> impl Future<Output = Result<Vec<Match>, Self::Error>> + Send + '_;

  /// Apply `mutation` to the match at `key` only if its status is, at write
  /// time, one of `expected`. The status check, the score change and the
  /// event append commit together or not at all.
  fn conditional_update<'a>(
    &'a self,
    key: &'a str,
    expected: &'a [MatchStatus],
    mutation: MatchMutation,
  ) -> impl Future<Output = Result<UpdateOutcome, Self::Error>> + Send + 'a;

  // ── Audit log ─────────────────────────────────────────────────────────

  fn append_audit(
    &self,
    record: AuditRecord,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// The newest `limit` records, newest first.
  fn recent_audit(
    &self,
    limit: usize,
  ) -> impl Future<Output = Result<Vec<AuditRecord>, Self::Error>> + Send + '_;
}

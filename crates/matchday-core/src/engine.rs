//! [`MatchEngine`] — the operations callers run against matches.
//!
//! Each write validates against the current match and the team registry
//! before touching the store, then commits through a single conditional
//! update whose precondition the store re-checks. A lost race comes back as
//! `Conflict` and is not retried here. Audit records are emitted only after
//! a write commits.

use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info};

use crate::{
  Error, Result,
  audit::{AuditKind, AuditRecord, AuditSink},
  fixture::{EventInput, Match, MatchStatus, NewMatch},
  lifecycle::{MatchMutation, StatusChange},
  standings::{MatchStats, Standings, compute_stats, compute_table},
  store::{InsertOutcome, MatchQuery, MatchdayStore, UpdateOutcome},
  team::{Team, canonical_code},
};

fn store_err<E: Into<Error>>(err: E) -> Error { err.into() }

fn lost_race(key: &str) -> Error {
  debug!(match_key = %key, "conditional update not applied");
  Error::conflict(format!("match {key} changed concurrently; reload and retry"))
}

/// Match lifecycle and standings over a [`MatchdayStore`].
///
/// Cloning is cheap; the store and sink are shared.
pub struct MatchEngine<S> {
  store: Arc<S>,
  audit: Arc<dyn AuditSink>,
}

impl<S> Clone for MatchEngine<S> {
  fn clone(&self) -> Self {
    Self {
      store: Arc::clone(&self.store),
      audit: Arc::clone(&self.audit),
    }
  }
}

impl<S: MatchdayStore> MatchEngine<S> {
  pub fn new(store: Arc<S>, audit: Arc<dyn AuditSink>) -> Self { Self { store, audit } }

  pub fn store(&self) -> &Arc<S> { &self.store }

  // ── Lifecycle ─────────────────────────────────────────────────────────────

  /// Create a `Scheduled` match with a zero score and an empty log.
  pub async fn create_match(&self, input: NewMatch) -> Result<Match> {
    let fixture = input.validate(Utc::now())?;

    for code in [&fixture.home_code, &fixture.away_code] {
      if !self.store.team_exists(code).await.map_err(store_err)? {
        return Err(Error::NotFound(format!("team {code} not found")));
      }
    }

    let key = fixture.key.clone();
    match self.store.insert_match(fixture).await.map_err(store_err)? {
      InsertOutcome::Inserted(created) => {
        info!(match_key = %key, home = %created.home_code, away = %created.away_code, "match created");
        self.emit(
          AuditKind::MatchCreated,
          &key,
          format!("{} vs {}", created.home_code, created.away_code),
        );
        Ok(created)
      }
      InsertOutcome::DuplicateKey => {
        Err(Error::conflict(format!("match key {key} already exists")))
      }
    }
  }

  /// Append an event; a goal also bumps the scoring side's counter in the
  /// same write.
  pub async fn add_event(&self, key: &str, input: EventInput) -> Result<Match> {
    let key = key.trim();
    let fixture = self.load(key).await?;
    if !fixture.status.accepts_events() {
      return Err(Error::conflict(format!("match {key} already finished")));
    }

    let event = input.validate()?;
    let team = event.team_code.clone();
    let kind = event.kind();
    let mutation = MatchMutation::append_event(&fixture, event)?;
    if !self.store.team_exists(&team).await.map_err(store_err)? {
      return Err(Error::invalid(format!("team {team} not found")));
    }

    let updated = self.commit(key, mutation).await?;
    info!(match_key = %key, event = %kind, team = %team, "event added");
    self.emit(AuditKind::EventAdded, key, format!("{kind} by {team}"));
    Ok(updated)
  }

  /// Move a match to `status`, given as `scheduled`, `live` or `finished`.
  /// `finished` goes through [`MatchEngine::finalize`].
  pub async fn set_status(&self, key: &str, status: &str) -> Result<Match> {
    let target: MatchStatus = status.trim().parse().map_err(|_| {
      Error::invalid(format!(
        "status must be scheduled, live or finished; got {status:?}"
      ))
    })?;

    let key = key.trim();
    let fixture = self.load(key).await?;
    match fixture.status.plan_change(target)? {
      StatusChange::Finalize | StatusChange::AlreadyFinished => self.finalize(key).await,
      StatusChange::Unchanged => Ok(fixture),
      StatusChange::Advance(next) => {
        let from = fixture.status;
        let updated = self.commit(key, MatchMutation::SetStatus(next)).await?;
        info!(match_key = %key, %from, to = %next, "status changed");
        self.emit(AuditKind::StatusChanged, key, format!("{from} -> {next}"));
        Ok(updated)
      }
    }
  }

  /// Seal the match against further events. The score is left as the goal
  /// events made it. Finalizing a finished match returns it unchanged, also
  /// when another finalize got there between our read and our write.
  pub async fn finalize(&self, key: &str) -> Result<Match> {
    let key = key.trim();
    let fixture = self.load(key).await?;
    match fixture.status.plan_change(MatchStatus::Finished)? {
      StatusChange::AlreadyFinished => Ok(fixture),
      _ => {
        let mutation = MatchMutation::SetStatus(MatchStatus::Finished);
        let expected = mutation.expected_statuses();
        let updated = match self
          .store
          .conditional_update(key, expected, mutation)
          .await
          .map_err(store_err)?
        {
          UpdateOutcome::Applied(updated) => updated,
          UpdateOutcome::NotApplied => {
            let current = self.load(key).await?;
            if current.status.is_final() {
              debug!(match_key = %key, "match already finalized concurrently");
              return Ok(current);
            }
            return Err(lost_race(key));
          }
        };
        info!(
          match_key = %key,
          home_goals = updated.home_goals,
          away_goals = updated.away_goals,
          "match finalized"
        );
        self.emit(
          AuditKind::Finalized,
          key,
          format!(
            "{} {}-{} {}",
            updated.home_code, updated.home_goals, updated.away_goals, updated.away_code
          ),
        );
        Ok(updated)
      }
    }
  }

  // ── Reads ─────────────────────────────────────────────────────────────────

  pub async fn get_match(&self, key: &str) -> Result<Match> { self.load(key).await }

  pub async fn list_matches(&self, query: &MatchQuery) -> Result<Vec<Match>> {
    let query = MatchQuery {
      status: query.status,
      team:   query.team.as_deref().map(canonical_code),
    };
    self.store.list_matches(&query).await.map_err(store_err)
  }

  pub async fn get_team(&self, code: &str) -> Result<Team> {
    let code = canonical_code(code);
    self
      .store
      .find_team(&code)
      .await
      .map_err(store_err)?
      .ok_or_else(|| Error::NotFound(format!("team {code} not found")))
  }

  pub async fn list_teams(&self, league: Option<&str>) -> Result<Vec<Team>> {
    let league = league.map(str::trim).filter(|l| !l.is_empty());
    self.store.list_teams(league).await.map_err(store_err)
  }

  pub async fn list_leagues(&self) -> Result<Vec<String>> {
    self.store.list_leagues().await.map_err(store_err)
  }

  /// Recompute the table from the finished matches currently stored.
  pub async fn standings(
    &self,
    league: Option<&str>,
    favorite: Option<&str>,
  ) -> Result<Standings> {
    let league = league.map(str::trim).filter(|l| !l.is_empty());
    let favorite = favorite.map(canonical_code).filter(|f| !f.is_empty());

    let teams = self.store.list_teams(league).await.map_err(store_err)?;
    let finished = self.store.list_finished().await.map_err(store_err)?;
    let rows = compute_table(&teams, &finished, league, favorite.as_deref());

    Ok(Standings {
      league: league.map(str::to_owned),
      rows,
    })
  }

  pub async fn stats(&self) -> Result<MatchStats> {
    let all = self
      .store
      .list_matches(&MatchQuery::default())
      .await
      .map_err(store_err)?;
    Ok(compute_stats(&all))
  }

  /// The newest `limit` persisted audit records. Records still queued for
  /// the writer are not included.
  pub async fn recent_audit(&self, limit: usize) -> Result<Vec<AuditRecord>> {
    self.store.recent_audit(limit).await.map_err(store_err)
  }

  // ── Helpers ───────────────────────────────────────────────────────────────

  async fn load(&self, key: &str) -> Result<Match> {
    let key = key.trim();
    self
      .store
      .find_match(key)
      .await
      .map_err(store_err)?
      .ok_or_else(|| Error::NotFound(format!("match {key} not found")))
  }

  async fn commit(&self, key: &str, mutation: MatchMutation) -> Result<Match> {
    let expected = mutation.expected_statuses();
    match self
      .store
      .conditional_update(key, expected, mutation)
      .await
      .map_err(store_err)?
    {
      UpdateOutcome::Applied(updated) => Ok(updated),
      UpdateOutcome::NotApplied => Err(lost_race(key)),
    }
  }

  fn emit(&self, kind: AuditKind, key: &str, message: String) {
    self.audit.enqueue(AuditRecord::new(kind, key, message));
  }
}

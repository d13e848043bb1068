//! [`SqliteStore`] — the SQLite implementation of [`MatchdayStore`].

use std::path::Path;

use rusqlite::{OptionalExtension as _, types::Value};
use tracing::info;

use matchday_core::{
  audit::AuditRecord,
  fixture::{Match, MatchStatus},
  lifecycle::MatchMutation,
  store::{InsertOutcome, MatchQuery, MatchdayStore, UpdateOutcome},
  team::Team,
};

use crate::{
  Result,
  encode::{
    RawAudit, RawEvent, RawMatch, RawTeam, encode_dt, encode_event_detail, encode_status,
  },
  schema::SCHEMA,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A Matchday store backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted. Every call
/// runs on the connection's one background thread, so each closure passed to
/// `call` executes without interleaving with any other.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Load `teams` into the registry if it is empty. Returns the number of
  /// teams inserted; zero when the registry was already populated.
  pub async fn seed_teams_if_empty(&self, teams: &[Team]) -> Result<usize> {
    let rows: Vec<(String, String, String)> = teams
      .iter()
      .map(|t| (t.code.clone(), t.name.clone(), t.league.clone()))
      .collect();

    let inserted = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let existing: i64 =
          tx.query_row("SELECT COUNT(*) FROM teams", [], |r| r.get(0))?;
        if existing > 0 {
          return Ok(0);
        }
        {
          let mut stmt =
            tx.prepare("INSERT INTO teams (code, name, league) VALUES (?1, ?2, ?3)")?;
          for (code, name, league) in &rows {
            stmt.execute(rusqlite::params![code, name, league])?;
          }
        }
        tx.commit()?;
        Ok(rows.len())
      })
      .await?;

    if inserted > 0 {
      info!(teams = inserted, "seeded team registry");
    }
    Ok(inserted)
  }
}

// ─── Row loading (runs inside `call`) ────────────────────────────────────────

fn load_events(
  conn: &rusqlite::Connection,
  key: &str,
) -> rusqlite::Result<Vec<RawEvent>> {
  let mut stmt = conn.prepare_cached(
    "SELECT event_type, team_code, minute, detail_json
     FROM match_events
     WHERE match_key = ?1
     ORDER BY seq",
  )?;
  stmt
    .query_map(rusqlite::params![key], |row| {
      Ok(RawEvent {
        event_type:  row.get(0)?,
        team_code:   row.get(1)?,
        minute:      row.get(2)?,
        detail_json: row.get(3)?,
      })
    })?
    .collect()
}

fn load_match(conn: &rusqlite::Connection, key: &str) -> rusqlite::Result<Option<RawMatch>> {
  let sql = format!("SELECT {} FROM matches WHERE match_key = ?1", RawMatch::COLUMNS);
  let Some(mut raw) = conn
    .query_row(&sql, rusqlite::params![key], RawMatch::from_row)
    .optional()?
  else {
    return Ok(None);
  };
  raw.events = load_events(conn, key)?;
  Ok(Some(raw))
}

// ─── MatchdayStore impl ──────────────────────────────────────────────────────

impl MatchdayStore for SqliteStore {
  type Error = crate::Error;

  // ── Team registry ─────────────────────────────────────────────────────────

  async fn team_exists(&self, code: &str) -> Result<bool> {
    let code = code.to_owned();
    let exists = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT 1 FROM teams WHERE code = ?1",
              rusqlite::params![code],
              |_| Ok(true),
            )
            .optional()?
            .unwrap_or(false),
        )
      })
      .await?;
    Ok(exists)
  }

  async fn find_team(&self, code: &str) -> Result<Option<Team>> {
    let code = code.to_owned();
    let raw: Option<RawTeam> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT code, name, league FROM teams WHERE code = ?1",
              rusqlite::params![code],
              RawTeam::from_row,
            )
            .optional()?,
        )
      })
      .await?;
    Ok(raw.map(RawTeam::into_team))
  }

  async fn list_teams(&self, league: Option<&str>) -> Result<Vec<Team>> {
    let league = league.map(str::to_owned);
    let raws: Vec<RawTeam> = self
      .conn
      .call(move |conn| {
        let rows = if let Some(league) = league {
          let mut stmt = conn.prepare(
            "SELECT code, name, league FROM teams WHERE league = ?1 ORDER BY name, code",
          )?;
          stmt
            .query_map(rusqlite::params![league], RawTeam::from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?
        } else {
          let mut stmt =
            conn.prepare("SELECT code, name, league FROM teams ORDER BY name, code")?;
          stmt
            .query_map([], RawTeam::from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?
        };
        Ok(rows)
      })
      .await?;
    Ok(raws.into_iter().map(RawTeam::into_team).collect())
  }

  async fn list_leagues(&self) -> Result<Vec<String>> {
    let leagues = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare("SELECT DISTINCT league FROM teams ORDER BY league")?;
        let rows = stmt
          .query_map([], |r| r.get(0))?
          .collect::<rusqlite::Result<Vec<String>>>()?;
        Ok(rows)
      })
      .await?;
    Ok(leagues)
  }

  // ── Matches ───────────────────────────────────────────────────────────────

  async fn insert_match(&self, fixture: Match) -> Result<InsertOutcome> {
    let key        = fixture.key.clone();
    let kickoff    = encode_dt(fixture.kickoff);
    let home       = fixture.home_code.clone();
    let away       = fixture.away_code.clone();
    let home_goals = i64::from(fixture.home_goals);
    let away_goals = i64::from(fixture.away_goals);
    let status     = encode_status(fixture.status);
    let created_at = encode_dt(fixture.created_at);

    let inserted = self
      .conn
      .call(move |conn| {
        let res = conn.execute(
          "INSERT INTO matches (
             match_key, kickoff, home_code, away_code,
             home_goals, away_goals, status, created_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
          rusqlite::params![
            key, kickoff, home, away, home_goals, away_goals, status, created_at,
          ],
        );
        match res {
          Ok(_) => Ok(true),
          Err(rusqlite::Error::SqliteFailure(e, _))
            if e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_PRIMARYKEY =>
          {
            Ok(false)
          }
          Err(e) => Err(e.into()),
        }
      })
      .await?;

    Ok(if inserted {
      InsertOutcome::Inserted(fixture)
    } else {
      InsertOutcome::DuplicateKey
    })
  }

  async fn find_match(&self, key: &str) -> Result<Option<Match>> {
    let key = key.to_owned();
    let raw = self.conn.call(move |conn| Ok(load_match(conn, &key)?)).await?;
    raw.map(RawMatch::into_match).transpose()
  }

  async fn list_matches(&self, query: &MatchQuery) -> Result<Vec<Match>> {
    let mut conds: Vec<&'static str> = vec![];
    let mut args: Vec<Value> = vec![];
    if let Some(status) = query.status {
      conds.push("status = ?");
      args.push(Value::Text(encode_status(status).to_owned()));
    }
    if let Some(team) = &query.team {
      conds.push("(home_code = ? OR away_code = ?)");
      args.push(Value::Text(team.clone()));
      args.push(Value::Text(team.clone()));
    }

    let where_clause = if conds.is_empty() {
      String::new()
    } else {
      format!("WHERE {}", conds.join(" AND "))
    };
    let sql = format!(
      "SELECT {} FROM matches {where_clause} ORDER BY kickoff, match_key",
      RawMatch::COLUMNS
    );

    let raws: Vec<RawMatch> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&sql)?;
        let mut rows = stmt
          .query_map(rusqlite::params_from_iter(args), RawMatch::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        for raw in &mut rows {
          raw.events = load_events(conn, &raw.match_key)?;
        }
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawMatch::into_match).collect()
  }

  async fn list_finished(&self) -> Result<Vec<Match>> {
    let query = MatchQuery {
      status: Some(MatchStatus::Finished),
      team:   None,
    };
    self.list_matches(&query).await
  }

  async fn conditional_update(
    &self,
    key:      &str,
    expected: &[MatchStatus],
    mutation: MatchMutation,
  ) -> Result<UpdateOutcome> {
    if expected.is_empty() {
      return Ok(UpdateOutcome::NotApplied);
    }

    let key   = key.to_owned();
    let delta = mutation.score_delta();
    let event = match mutation.event() {
      Some(e) => Some((
        e.kind().to_string(),
        e.team_code.clone(),
        i64::from(e.minute),
        encode_event_detail(&e.detail)?,
      )),
      None => None,
    };

    let placeholders = vec!["?"; expected.len()].join(", ");
    let sql = format!(
      "UPDATE matches
       SET home_goals = home_goals + ?,
           away_goals = away_goals + ?,
           status     = COALESCE(?, status)
       WHERE match_key = ? AND status IN ({placeholders})"
    );
    let mut args = vec![
      Value::Integer(i64::from(delta.home)),
      Value::Integer(i64::from(delta.away)),
      mutation
        .new_status()
        .map_or(Value::Null, |s| Value::Text(encode_status(s).to_owned())),
      Value::Text(key.clone()),
    ];
    args.extend(
      expected
        .iter()
        .map(|s| Value::Text(encode_status(*s).to_owned())),
    );

    let raw: Option<RawMatch> = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        // The status precondition and the write are one statement.
        if tx.execute(&sql, rusqlite::params_from_iter(args))? == 0 {
          return Ok(None);
        }
        if let Some((event_type, team_code, minute, detail_json)) = event {
          tx.execute(
            "INSERT INTO match_events
               (match_key, seq, event_type, team_code, minute, detail_json)
             SELECT ?1, COALESCE(MAX(seq) + 1, 0), ?2, ?3, ?4, ?5
             FROM match_events WHERE match_key = ?1",
            rusqlite::params![key, event_type, team_code, minute, detail_json],
          )?;
        }
        let updated = load_match(&tx, &key)?;
        tx.commit()?;
        Ok(updated)
      })
      .await?;

    Ok(match raw {
      Some(raw) => UpdateOutcome::Applied(raw.into_match()?),
      None => UpdateOutcome::NotApplied,
    })
  }

  // ── Audit log ─────────────────────────────────────────────────────────────

  async fn append_audit(&self, record: AuditRecord) -> Result<()> {
    let kind       = record.kind.to_string();
    let created_at = encode_dt(record.created_at);
    let AuditRecord { match_key, message, .. } = record;

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO audit_log (kind, match_key, message, created_at)
           VALUES (?1, ?2, ?3, ?4)",
          rusqlite::params![kind, match_key, message, created_at],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn recent_audit(&self, limit: usize) -> Result<Vec<AuditRecord>> {
    let limit = i64::try_from(limit).unwrap_or(i64::MAX);
    let raws: Vec<RawAudit> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT kind, match_key, message, created_at
           FROM audit_log
           ORDER BY id DESC
           LIMIT ?1",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![limit], |row| {
            Ok(RawAudit {
              kind:       row.get(0)?,
              match_key:  row.get(1)?,
              message:    row.get(2)?,
              created_at: row.get(3)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawAudit::into_record).collect()
  }
}

//! SQL schema for the Matchday SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

-- Seeded once; never written by the service afterwards.
CREATE TABLE IF NOT EXISTS teams (
    code    TEXT PRIMARY KEY,      -- canonical uppercase
    name    TEXT NOT NULL,
    league  TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS matches (
    match_key   TEXT PRIMARY KEY,
    kickoff     TEXT NOT NULL,     -- RFC 3339 UTC
    home_code   TEXT NOT NULL REFERENCES teams(code),
    away_code   TEXT NOT NULL REFERENCES teams(code),
    home_goals  INTEGER NOT NULL DEFAULT 0,
    away_goals  INTEGER NOT NULL DEFAULT 0,
    status      TEXT NOT NULL,     -- 'scheduled' | 'live' | 'finished'
    created_at  TEXT NOT NULL,
    CHECK (home_code != away_code)
);

-- Append-only. seq is the append position within a match.
CREATE TABLE IF NOT EXISTS match_events (
    match_key   TEXT NOT NULL REFERENCES matches(match_key),
    seq         INTEGER NOT NULL,
    event_type  TEXT NOT NULL,     -- discriminant of EventDetail
    team_code   TEXT NOT NULL,
    minute      INTEGER NOT NULL,
    detail_json TEXT NOT NULL,     -- JSON payload (inner data only)
    PRIMARY KEY (match_key, seq)
);

CREATE TABLE IF NOT EXISTS audit_log (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    kind        TEXT NOT NULL,
    match_key   TEXT NOT NULL,
    message     TEXT NOT NULL,
    created_at  TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS teams_league_idx    ON teams(league);
CREATE INDEX IF NOT EXISTS matches_status_idx  ON matches(status);
CREATE INDEX IF NOT EXISTS matches_kickoff_idx ON matches(kickoff);

PRAGMA user_version = 1;
";

//! Team — the static catalog entry a match refers to by code.
//!
//! Teams are seeded once and never change afterwards. Everything else in the
//! system references a team only through its canonical uppercase code.

use serde::{Deserialize, Serialize};

/// A club belonging to exactly one league.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Team {
  /// Canonical uppercase identifier, e.g. `ARS`.
  pub code:   String,
  pub name:   String,
  pub league: String,
}

impl Team {
  pub fn new(code: &str, name: &str, league: &str) -> Self {
    Self {
      code:   canonical_code(code),
      name:   name.to_owned(),
      league: league.to_owned(),
    }
  }
}

/// Trim and uppercase a team code as it arrives from a caller.
pub fn canonical_code(raw: &str) -> String { raw.trim().to_uppercase() }

// ─── Seed catalog ────────────────────────────────────────────────────────────

const CATALOG: &[(&str, &str, &str)] = &[
  // EPL
  ("ARS", "Arsenal", "EPL"),
  ("AVL", "Aston Villa", "EPL"),
  ("BOU", "Bournemouth", "EPL"),
  ("BRE", "Brentford", "EPL"),
  ("BHA", "Brighton", "EPL"),
  ("BUR", "Burnley", "EPL"),
  ("CHE", "Chelsea", "EPL"),
  ("CRY", "Crystal Palace", "EPL"),
  ("EVE", "Everton", "EPL"),
  ("FUL", "Fulham", "EPL"),
  ("LIV", "Liverpool", "EPL"),
  ("LUT", "Luton Town", "EPL"),
  ("MCI", "Manchester City", "EPL"),
  ("MUN", "Manchester United", "EPL"),
  ("NEW", "Newcastle", "EPL"),
  ("NFO", "Nottingham Forest", "EPL"),
  ("SHU", "Sheffield United", "EPL"),
  ("TOT", "Tottenham", "EPL"),
  ("WHU", "West Ham", "EPL"),
  ("WOL", "Wolves", "EPL"),
  // LaLiga
  ("RMA", "Real Madrid", "LaLiga"),
  ("FCB", "Barcelona", "LaLiga"),
  ("ATM", "Atletico Madrid", "LaLiga"),
  ("SEV", "Sevilla", "LaLiga"),
  ("VAL", "Valencia", "LaLiga"),
  ("RSO", "Real Sociedad", "LaLiga"),
  ("VIL", "Villarreal", "LaLiga"),
  ("ATH", "Athletic Bilbao", "LaLiga"),
  ("BET", "Real Betis", "LaLiga"),
  ("OSA", "Osasuna", "LaLiga"),
  ("GIR", "Girona", "LaLiga"),
  ("GET", "Getafe", "LaLiga"),
  ("ALM", "Almeria", "LaLiga"),
  ("CAD", "Cadiz", "LaLiga"),
  ("CEL", "Celta Vigo", "LaLiga"),
  ("MLL", "Mallorca", "LaLiga"),
  ("RAY", "Rayo Vallecano", "LaLiga"),
  ("GRA", "Granada", "LaLiga"),
  ("ALV", "Alaves", "LaLiga"),
  ("LAS", "Las Palmas", "LaLiga"),
  // SerieA
  ("INT", "Inter", "SerieA"),
  ("ACM", "AC Milan", "SerieA"),
  ("JUV", "Juventus", "SerieA"),
  ("NAP", "Napoli", "SerieA"),
  ("ROM", "Roma", "SerieA"),
  ("LAZ", "Lazio", "SerieA"),
  ("ATA", "Atalanta", "SerieA"),
  ("FIO", "Fiorentina", "SerieA"),
  ("BOL", "Bologna", "SerieA"),
  ("TOR", "Torino", "SerieA"),
  ("UDI", "Udinese", "SerieA"),
  ("SAS", "Sassuolo", "SerieA"),
  ("MON", "Monza", "SerieA"),
  ("GEN", "Genoa", "SerieA"),
  ("EMP", "Empoli", "SerieA"),
  ("LEC", "Lecce", "SerieA"),
  ("CAG", "Cagliari", "SerieA"),
  ("VER", "Verona", "SerieA"),
  ("SAL", "Salernitana", "SerieA"),
  ("FRO", "Frosinone", "SerieA"),
  // KPL (Kazakhstan Premier League)
  ("AST", "Astana", "KPL"),
  ("KAI", "Kairat", "KPL"),
  ("ORD", "Ordabasy", "KPL"),
  ("AKT", "Aktobe", "KPL"),
  ("TOB", "Tobol", "KPL"),
  ("ATY", "Atyrau", "KPL"),
  ("KYZ", "Kyzylzhar", "KPL"),
  ("SHA", "Shakhter Karagandy", "KPL"),
  ("ZHE", "Zhetysu", "KPL"),
  ("KAS", "Kaspiy", "KPL"),
  ("MAK", "Maktaaral", "KPL"),
  ("TUR", "Turan", "KPL"),
];

/// The teams every fresh store is seeded with.
pub fn seed_catalog() -> Vec<Team> {
  CATALOG
    .iter()
    .map(|(code, name, league)| Team::new(code, name, league))
    .collect()
}

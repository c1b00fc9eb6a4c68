use std::collections::HashMap;
use std::fmt;

use chrono::{Local, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Leagues the service aggregates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum League {
    Mlb,
    Nba,
    Nfl,
}

impl League {
    pub const ALL: [League; 3] = [League::Mlb, League::Nba, League::Nfl];

    pub fn as_str(&self) -> &'static str {
        match self {
            League::Mlb => "mlb",
            League::Nba => "nba",
            League::Nfl => "nfl",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "mlb" => Some(League::Mlb),
            "nba" => Some(League::Nba),
            "nfl" => Some(League::Nfl),
            _ => None,
        }
    }

    /// Only the NFL records ties; MLB and NBA games always resolve.
    pub fn allows_ties(&self) -> bool {
        matches!(self, League::Nfl)
    }
}

impl fmt::Display for League {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Join key between primary and secondary sources. Immutable once sourced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamIdentity {
    pub name: String,
    pub abbr: String,
    pub league: League,
}

/// One win/loss(/tie) record, per source per team per as-of date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    pub wins: u32,
    pub losses: u32,
    pub ties_or_ot: Option<u32>,
}

impl Record {
    pub fn new(wins: u32, losses: u32) -> Self {
        Self {
            wins,
            losses,
            ties_or_ot: None,
        }
    }

    pub fn with_ties(wins: u32, losses: u32, ties: u32) -> Self {
        Self {
            wins,
            losses,
            ties_or_ot: Some(ties),
        }
    }
}

/// Verdict from corroborating a primary record against a secondary source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationResult {
    pub verified: bool,
    pub notes: Option<String>,
}

/// A single game outcome. Sequences are chronological, oldest to newest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResultToken {
    Win,
    Loss,
    Tie,
}

impl ResultToken {
    pub fn letter(&self) -> char {
        match self {
            ResultToken::Win => 'W',
            ResultToken::Loss => 'L',
            ResultToken::Tie => 'T',
        }
    }

    pub fn from_letter(c: char) -> Option<Self> {
        match c {
            'W' => Some(ResultToken::Win),
            'L' => Some(ResultToken::Loss),
            'T' => Some(ResultToken::Tie),
            _ => None,
        }
    }
}

/// Normalized primary-source input: one team with its record and its own
/// chronological game outcomes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrimaryTeam {
    pub identity: TeamIdentity,
    pub record: Record,
    pub results: Vec<ResultToken>,
}

/// Normalized secondary-source input. Secondary providers only expose a name
/// and a record; matching against primary identities happens in the core.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SecondaryTeam {
    pub name: String,
    pub record: Record,
}

/// Reconciliation output, one per primary team. Created fresh each run and
/// superseded (not mutated) by the next run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamStanding {
    pub team: TeamIdentity,
    pub record: Record,
    pub streak: String,
    pub last_five: String,
    pub record_as_of: NaiveDate,
    pub verification: VerificationResult,
    pub sources: Vec<String>,
}

/// Home/away marker on a game log, serialized as "H"/"A" on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HomeAway {
    #[serde(rename = "H")]
    Home,
    #[serde(rename = "A")]
    Away,
}

impl HomeAway {
    pub fn as_str(&self) -> &'static str {
        match self {
            HomeAway::Home => "H",
            HomeAway::Away => "A",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "H" => Some(HomeAway::Home),
            "A" => Some(HomeAway::Away),
            _ => None,
        }
    }
}

/// One player game log. `stats` is `None` when the provider sent no stats
/// container at all for the game.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameLogEntry {
    pub date: NaiveDate,
    pub opponent: String,
    pub home_away: HomeAway,
    pub stats: Option<HashMap<String, f64>>,
}

/// Count/average/min/max over one selected statistic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatSummary {
    pub games: u32,
    pub avg: f64,
    pub min: f64,
    pub max: f64,
}

/// Generated-at timestamps attached by the service layer, never by the core.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedAt {
    pub generated_at_utc: String,
    pub generated_at_local: String,
}

impl GeneratedAt {
    pub fn now() -> Self {
        Self {
            generated_at_utc: Utc::now().to_rfc3339(),
            generated_at_local: Local::now().to_rfc3339(),
        }
    }
}

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub database_path: String,
    pub port: u16,
    pub sportsdataio_key: Option<String>,
    pub use_mock_data: bool,
    pub standings_refresh_secs: u64,
    pub secondary_nba_feed: Option<String>,
    pub secondary_nfl_feed: Option<String>,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenv::dotenv().ok();

        let database_path =
            std::env::var("DATABASE_PATH").unwrap_or_else(|_| "./statline.db".to_string());

        let port = std::env::var("PORT")
            .unwrap_or_else(|_| "8080".to_string())
            .parse()
            .unwrap_or(8080);

        let sportsdataio_key = std::env::var("SPORTSDATAIO_KEY").ok();

        let use_mock_data = std::env::var("USE_MOCK_DATA")
            .map(|v| v == "true" || v == "1")
            .unwrap_or(false);

        let standings_refresh_secs = std::env::var("STANDINGS_REFRESH_SECS")
            .unwrap_or_else(|_| "900".to_string())
            .parse()
            .unwrap_or(900);

        let secondary_nba_feed = std::env::var("SECONDARY_NBA_FEED").ok();
        let secondary_nfl_feed = std::env::var("SECONDARY_NFL_FEED").ok();

        Ok(Self {
            database_path,
            port,
            sportsdataio_key,
            use_mock_data,
            standings_refresh_secs,
            secondary_nba_feed,
            secondary_nfl_feed,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_league_parse_roundtrip() {
        for league in League::ALL {
            assert_eq!(League::parse(league.as_str()), Some(league));
        }
        assert_eq!(League::parse("NFL"), Some(League::Nfl));
        assert_eq!(League::parse("nhl"), None);
    }

    #[test]
    fn test_only_nfl_allows_ties() {
        assert!(League::Nfl.allows_ties());
        assert!(!League::Mlb.allows_ties());
        assert!(!League::Nba.allows_ties());
    }

    #[test]
    fn test_result_token_letters() {
        assert_eq!(ResultToken::from_letter('W'), Some(ResultToken::Win));
        assert_eq!(ResultToken::from_letter('T'), Some(ResultToken::Tie));
        assert_eq!(ResultToken::from_letter('X'), None);
        assert_eq!(ResultToken::Loss.letter(), 'L');
    }

    #[test]
    fn test_home_away_wire_format() {
        let json = serde_json::to_string(&HomeAway::Home).unwrap();
        assert_eq!(json, "\"H\"");
        let parsed: HomeAway = serde_json::from_str("\"A\"").unwrap();
        assert_eq!(parsed, HomeAway::Away);
    }
}

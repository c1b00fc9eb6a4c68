//! SportsDataIO standings integration (primary source).
//!
//! MLB standings arrive grouped by division; NBA and NFL arrive as flat
//! rows with PascalCase keys. Both are normalized here into `PrimaryTeam`
//! tuples before anything downstream sees them.

use std::time::Duration;

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use chrono::{Datelike, Utc};
use reqwest::Client;
use serde::Deserialize;
use tracing::info;

use crate::models::{League, PrimaryTeam, Record, ResultToken, TeamIdentity};

use super::PrimarySource;

const BASE_URL: &str = "https://api.sportsdata.io/v3";

pub struct SportsDataIo {
    client: Client,
    api_key: Option<String>,
    use_mock: bool,
}

impl SportsDataIo {
    pub fn new(api_key: Option<String>, use_mock: bool) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent("statline/0.1 (standings aggregator)")
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            api_key,
            use_mock,
        }
    }

    async fn fetch_raw(&self, league: League) -> Result<serde_json::Value> {
        let Some(key) = &self.api_key else {
            bail!("SportsDataIO API key is not configured");
        };

        let season = Utc::now().year();
        let url = format!(
            "{}/{}/scores/json/Standings/{}",
            BASE_URL,
            league.as_str(),
            season
        );

        let response = self
            .client
            .get(&url)
            .query(&[("key", key.as_str())])
            .send()
            .await
            .with_context(|| format!("SportsDataIO request failed for {}", league))?;

        if !response.status().is_success() {
            bail!(
                "SportsDataIO API error for {}: {}",
                league,
                response.status()
            );
        }

        response
            .json()
            .await
            .with_context(|| format!("Failed to parse SportsDataIO standings for {}", league))
    }
}

#[async_trait]
impl PrimarySource for SportsDataIo {
    fn source_id(&self) -> &'static str {
        "https://sportsdata.io"
    }

    async fn fetch_standings(&self, league: League) -> Result<Vec<PrimaryTeam>> {
        let payload = if self.use_mock {
            mock_payload(league)?
        } else {
            self.fetch_raw(league).await?
        };

        let teams = normalize_standings(league, payload)?;
        info!("Fetched {} primary {} teams", teams.len(), league);
        Ok(teams)
    }
}

// ===== Payload shapes =====

/// MLB standings: divisions wrapping team records.
#[derive(Debug, Deserialize)]
pub struct MlbDivisionStandings {
    #[serde(rename = "teamRecords")]
    pub team_records: Vec<MlbTeamRecord>,
}

#[derive(Debug, Deserialize)]
pub struct MlbTeamRecord {
    pub team: MlbTeamRef,
    pub wins: u32,
    pub losses: u32,
    /// Chronological outcome letters (oldest to newest), e.g. "WWLWW".
    #[serde(rename = "gameResults", default)]
    pub game_results: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct MlbTeamRef {
    pub name: String,
    #[serde(default)]
    pub abbreviation: String,
}

/// NBA/NFL standings row (flat, PascalCase keys).
#[derive(Debug, Deserialize)]
pub struct FlatStandingRow {
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Key")]
    pub key: String,
    #[serde(rename = "Wins")]
    pub wins: u32,
    #[serde(rename = "Losses")]
    pub losses: u32,
    #[serde(rename = "Ties", default)]
    pub ties: Option<u32>,
    #[serde(rename = "GameResults", default)]
    pub game_results: Option<String>,
}

// ===== Normalization =====

/// Normalize a raw standings payload into `PrimaryTeam` tuples.
pub fn normalize_standings(league: League, payload: serde_json::Value) -> Result<Vec<PrimaryTeam>> {
    match league {
        League::Mlb => {
            let divisions: Vec<MlbDivisionStandings> = serde_json::from_value(payload)
                .context("Unexpected MLB standings payload shape")?;
            normalize_mlb(&divisions)
        }
        League::Nba | League::Nfl => {
            let rows: Vec<FlatStandingRow> = serde_json::from_value(payload)
                .with_context(|| format!("Unexpected {} standings payload shape", league))?;
            normalize_flat(league, &rows)
        }
    }
}

pub fn normalize_mlb(divisions: &[MlbDivisionStandings]) -> Result<Vec<PrimaryTeam>> {
    let mut teams = Vec::new();
    for division in divisions {
        for record in &division.team_records {
            if record.team.name.trim().is_empty() {
                bail!("MLB standings entry without a team name");
            }
            teams.push(PrimaryTeam {
                identity: TeamIdentity {
                    name: record.team.name.clone(),
                    abbr: record.team.abbreviation.clone(),
                    league: League::Mlb,
                },
                record: Record::new(record.wins, record.losses),
                results: parse_results(record.game_results.as_deref())?,
            });
        }
    }
    Ok(teams)
}

pub fn normalize_flat(league: League, rows: &[FlatStandingRow]) -> Result<Vec<PrimaryTeam>> {
    let mut teams = Vec::with_capacity(rows.len());
    for row in rows {
        if row.name.trim().is_empty() || row.key.trim().is_empty() {
            bail!("{} standings entry without a team identity", league);
        }
        let record = if league.allows_ties() {
            Record::with_ties(row.wins, row.losses, row.ties.unwrap_or(0))
        } else {
            Record::new(row.wins, row.losses)
        };
        teams.push(PrimaryTeam {
            identity: TeamIdentity {
                name: row.name.clone(),
                abbr: row.key.clone(),
                league,
            },
            record,
            results: parse_results(row.game_results.as_deref())?,
        });
    }
    Ok(teams)
}

/// Parse an outcome-letter string into tokens. Providers that send no
/// per-game outcomes yield an empty sequence, which downstream renders as
/// empty streak/last-five strings.
fn parse_results(letters: Option<&str>) -> Result<Vec<ResultToken>> {
    let Some(letters) = letters else {
        return Ok(Vec::new());
    };

    letters
        .chars()
        .map(|c| {
            ResultToken::from_letter(c)
                .with_context(|| format!("Unrecognized game outcome letter '{}'", c))
        })
        .collect()
}

// ===== Mock fixtures =====

const MLB_MOCK: &str = r#"[
  {
    "division": { "name": "American League East" },
    "teamRecords": [
      { "team": { "name": "New York Yankees", "abbreviation": "NYY" }, "wins": 95, "losses": 67, "gameResults": "WWLWW" },
      { "team": { "name": "Boston Red Sox", "abbreviation": "BOS" }, "wins": 78, "losses": 84, "gameResults": "LLWLL" },
      { "team": { "name": "Baltimore Orioles", "abbreviation": "BAL" }, "wins": 83, "losses": 79, "gameResults": "WLWLW" }
    ]
  },
  {
    "division": { "name": "National League West" },
    "teamRecords": [
      { "team": { "name": "Los Angeles Dodgers", "abbreviation": "LAD" }, "wins": 100, "losses": 62, "gameResults": "WWWWL" },
      { "team": { "name": "San Francisco Giants", "abbreviation": "SF" }, "wins": 79, "losses": 83, "gameResults": "LWLLW" }
    ]
  },
  {
    "division": { "name": "National League Central" },
    "teamRecords": [
      { "team": { "name": "Chicago Cubs", "abbreviation": "CHC" }, "wins": 84, "losses": 78, "gameResults": "WWLLW" }
    ]
  }
]"#;

const NBA_MOCK: &str = r#"[
  { "Name": "Boston Celtics", "Key": "BOS", "Wins": 57, "Losses": 25, "GameResults": "WWLWW" },
  { "Name": "Miami Heat", "Key": "MIA", "Wins": 44, "Losses": 38, "GameResults": "LWLWL" },
  { "Name": "Chicago Bulls", "Key": "CHI", "Wins": 40, "Losses": 42, "GameResults": "LLWLL" },
  { "Name": "New York Knicks", "Key": "NYK", "Wins": 47, "Losses": 35, "GameResults": "WLWWW" },
  { "Name": "Los Angeles Lakers", "Key": "LAL", "Wins": 52, "Losses": 30, "GameResults": "WWWLW" },
  { "Name": "Golden State Warriors", "Key": "GSW", "Wins": 44, "Losses": 38, "GameResults": "WLLWW" }
]"#;

const NFL_MOCK: &str = r#"[
  { "Name": "Kansas City Chiefs", "Key": "KC", "Wins": 14, "Losses": 3, "Ties": 0, "GameResults": "WLWWW" },
  { "Name": "Philadelphia Eagles", "Key": "PHI", "Wins": 14, "Losses": 3, "Ties": 0, "GameResults": "WWWLL" },
  { "Name": "San Francisco 49ers", "Key": "SF", "Wins": 13, "Losses": 4, "Ties": 0, "GameResults": "WWWWW" },
  { "Name": "Buffalo Bills", "Key": "BUF", "Wins": 13, "Losses": 3, "Ties": 1, "GameResults": "WWTWW" },
  { "Name": "Dallas Cowboys", "Key": "DAL", "Wins": 12, "Losses": 5, "Ties": 0, "GameResults": "WWWWL" }
]"#;

fn mock_payload(league: League) -> Result<serde_json::Value> {
    let raw = match league {
        League::Mlb => MLB_MOCK,
        League::Nba => NBA_MOCK,
        League::Nfl => NFL_MOCK,
    };
    serde_json::from_str(raw).context("Invalid embedded mock standings")
}

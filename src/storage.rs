//! SQLite persistence for reconciled standings and player game logs.
//!
//! Standings are kept as history: each reconciliation run upserts one row
//! per (team, record_as_of) and the current standing is simply the most
//! recent as-of date. Prior rows are never mutated.

use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::{NaiveDate, Utc};
use parking_lot::Mutex;
use rusqlite::{params, Connection, OpenFlags, OptionalExtension};
use serde_json::json;
use tracing::info;

use crate::models::{
    GameLogEntry, HomeAway, League, Record, TeamIdentity, TeamStanding, VerificationResult,
};

const SCHEMA_SQL: &str = r#"
PRAGMA journal_mode = WAL;
PRAGMA synchronous = NORMAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS teams (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    league TEXT NOT NULL,
    name TEXT NOT NULL,
    abbr TEXT NOT NULL,
    UNIQUE (league, abbr)
);

CREATE TABLE IF NOT EXISTS team_standings (
    team_id INTEGER NOT NULL REFERENCES teams(id),
    record_as_of TEXT NOT NULL,
    wins INTEGER NOT NULL,
    losses INTEGER NOT NULL,
    ties_or_ot INTEGER,
    streak TEXT NOT NULL,
    last_five TEXT NOT NULL,
    verified INTEGER NOT NULL,
    notes TEXT,
    sources_json TEXT NOT NULL,
    updated_at TEXT NOT NULL,
    PRIMARY KEY (team_id, record_as_of)
);

CREATE INDEX IF NOT EXISTS idx_standings_recent
    ON team_standings(team_id, record_as_of DESC);

CREATE TABLE IF NOT EXISTS players (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    league TEXT NOT NULL,
    name TEXT NOT NULL,
    team_abbr TEXT NOT NULL,
    UNIQUE (league, name, team_abbr)
);

CREATE TABLE IF NOT EXISTS player_game_logs (
    player_id INTEGER NOT NULL REFERENCES players(id),
    game_date TEXT NOT NULL,
    opponent_abbr TEXT NOT NULL,
    home_away TEXT NOT NULL,
    stats_json TEXT NOT NULL,
    PRIMARY KEY (player_id, game_date)
);
"#;

pub struct Storage {
    conn: Arc<Mutex<Connection>>,
}

impl Storage {
    pub fn open(db_path: &str) -> Result<Self> {
        let flags = OpenFlags::SQLITE_OPEN_READ_WRITE | OpenFlags::SQLITE_OPEN_CREATE;

        let conn = Connection::open_with_flags(db_path, flags)
            .with_context(|| format!("Failed to open database at {}", db_path))?;

        conn.execute_batch(SCHEMA_SQL)
            .context("Failed to initialize database schema")?;

        info!("📊 Database initialized at: {}", db_path);

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().context("Failed to open in-memory database")?;
        conn.execute_batch(SCHEMA_SQL)
            .context("Failed to initialize database schema")?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    // ===== Standings =====

    /// Upsert one standing, keyed (team, record_as_of). The team row is
    /// created on first sight; re-running a reconciliation for the same
    /// as-of date replaces that date's row and leaves history alone.
    pub fn upsert_standing(&self, standing: &TeamStanding) -> Result<()> {
        let sources_json = serde_json::to_string(&standing.sources)?;
        let updated_at = Utc::now().to_rfc3339();

        let conn = self.conn.lock();
        conn.execute(
            "INSERT INTO teams (league, name, abbr) VALUES (?1, ?2, ?3)
             ON CONFLICT(league, abbr) DO UPDATE SET name = excluded.name",
            params![
                standing.team.league.as_str(),
                standing.team.name,
                standing.team.abbr
            ],
        )
        .context("Failed to upsert team")?;

        let team_id: i64 = conn.query_row(
            "SELECT id FROM teams WHERE league = ?1 AND abbr = ?2",
            params![standing.team.league.as_str(), standing.team.abbr],
            |row| row.get(0),
        )?;

        conn.execute(
            "INSERT OR REPLACE INTO team_standings
                (team_id, record_as_of, wins, losses, ties_or_ot, streak,
                 last_five, verified, notes, sources_json, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
            params![
                team_id,
                standing.record_as_of.to_string(),
                standing.record.wins,
                standing.record.losses,
                standing.record.ties_or_ot,
                standing.streak,
                standing.last_five,
                standing.verification.verified,
                standing.verification.notes,
                sources_json,
                updated_at,
            ],
        )
        .context("Failed to upsert standing")?;

        Ok(())
    }

    pub fn upsert_standings(&self, standings: &[TeamStanding]) -> Result<()> {
        for standing in standings {
            self.upsert_standing(standing)?;
        }
        Ok(())
    }

    /// Current standing for a team, found by abbreviation (exact,
    /// case-insensitive) or name substring.
    pub fn current_standing(&self, league: League, team: &str) -> Result<Option<TeamStanding>> {
        let conn = self.conn.lock();
        let needle = team.to_lowercase();

        conn.query_row(
            "SELECT t.name, t.abbr, s.wins, s.losses, s.ties_or_ot, s.streak,
                    s.last_five, s.record_as_of, s.verified, s.notes, s.sources_json
             FROM teams t
             JOIN team_standings s ON s.team_id = t.id
             WHERE t.league = ?1
               AND (LOWER(t.abbr) = ?2 OR INSTR(LOWER(t.name), ?2) > 0)
             ORDER BY s.record_as_of DESC
             LIMIT 1",
            params![league.as_str(), needle],
            |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, u32>(2)?,
                    row.get::<_, u32>(3)?,
                    row.get::<_, Option<u32>>(4)?,
                    row.get::<_, String>(5)?,
                    row.get::<_, String>(6)?,
                    row.get::<_, String>(7)?,
                    row.get::<_, bool>(8)?,
                    row.get::<_, Option<String>>(9)?,
                    row.get::<_, String>(10)?,
                ))
            },
        )
        .optional()
        .context("Failed to query current standing")?
        .map(
            |(name, abbr, wins, losses, ties, streak, last_five, as_of, verified, notes, sources)| {
                let record_as_of: NaiveDate = as_of
                    .parse()
                    .context("Invalid record_as_of date in database")?;
                let sources: Vec<String> =
                    serde_json::from_str(&sources).context("Invalid sources_json in database")?;
                Ok(TeamStanding {
                    team: TeamIdentity { name, abbr, league },
                    record: Record {
                        wins,
                        losses,
                        ties_or_ot: ties,
                    },
                    streak,
                    last_five,
                    record_as_of,
                    verification: VerificationResult { verified, notes },
                    sources,
                })
            },
        )
        .transpose()
    }

    /// Number of history rows retained for a team.
    pub fn standing_history_len(&self, league: League, abbr: &str) -> Result<usize> {
        let conn = self.conn.lock();
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM team_standings s
             JOIN teams t ON t.id = s.team_id
             WHERE t.league = ?1 AND t.abbr = ?2",
            params![league.as_str(), abbr],
            |row| row.get(0),
        )?;
        Ok(count as usize)
    }

    // ===== Players =====

    pub fn find_player(&self, league: League, name: &str, team_abbr: &str) -> Result<Option<i64>> {
        let conn = self.conn.lock();
        conn.query_row(
            "SELECT id FROM players
             WHERE league = ?1 AND LOWER(name) = LOWER(?2) AND LOWER(team_abbr) = LOWER(?3)",
            params![league.as_str(), name, team_abbr],
            |row| row.get(0),
        )
        .optional()
        .context("Failed to query player")
    }

    /// Most recent `limit` game logs for a player, returned oldest to
    /// newest so callers can feed them straight into form/summary code.
    pub fn player_game_logs(&self, player_id: i64, limit: u32) -> Result<Vec<GameLogEntry>> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare(
            "SELECT game_date, opponent_abbr, home_away, stats_json
             FROM player_game_logs
             WHERE player_id = ?1
             ORDER BY game_date DESC
             LIMIT ?2",
        )?;

        let rows = stmt.query_map(params![player_id, limit], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, String>(3)?,
            ))
        })?;

        let mut logs = Vec::new();
        for row in rows {
            let (date, opponent, home_away, stats_json) = row?;
            logs.push(GameLogEntry {
                date: date.parse().context("Invalid game_date in database")?,
                opponent,
                home_away: HomeAway::parse(&home_away)
                    .with_context(|| format!("Invalid home_away marker '{}'", home_away))?,
                stats: serde_json::from_str(&stats_json)
                    .context("Invalid stats_json in database")?,
            });
        }

        // Stored newest-first; chronological order out.
        logs.reverse();
        Ok(logs)
    }

    pub fn insert_player(&self, league: League, name: &str, team_abbr: &str) -> Result<i64> {
        let conn = self.conn.lock();
        conn.execute(
            "INSERT OR IGNORE INTO players (league, name, team_abbr) VALUES (?1, ?2, ?3)",
            params![league.as_str(), name, team_abbr],
        )?;
        let id: i64 = conn.query_row(
            "SELECT id FROM players WHERE league = ?1 AND name = ?2 AND team_abbr = ?3",
            params![league.as_str(), name, team_abbr],
            |row| row.get(0),
        )?;
        Ok(id)
    }

    pub fn insert_game_log(&self, player_id: i64, log: &GameLogEntry) -> Result<()> {
        let stats_json = serde_json::to_string(&log.stats)?;
        let conn = self.conn.lock();
        conn.execute(
            "INSERT OR REPLACE INTO player_game_logs
                (player_id, game_date, opponent_abbr, home_away, stats_json)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                player_id,
                log.date.to_string(),
                log.opponent,
                log.home_away.as_str(),
                stats_json,
            ],
        )?;
        Ok(())
    }

    /// Seed a handful of demo players and game logs for mock mode so the
    /// player-trend endpoint has something to serve offline.
    pub fn seed_demo_players(&self) -> Result<()> {
        let lebron = self.insert_player(League::Nba, "LeBron James", "LAL")?;
        let lebron_games: &[(&str, &str, &str, f64, f64, f64)] = &[
            ("2023-03-15", "DAL", "H", 28.0, 8.0, 2.0),
            ("2023-03-17", "ORL", "A", 19.0, 11.0, 3.0),
            ("2023-03-19", "PHX", "H", 31.0, 7.0, 4.0),
            ("2023-03-22", "OKC", "A", 25.0, 9.0, 1.0),
            ("2023-03-24", "CHI", "H", 33.0, 10.0, 5.0),
            ("2023-03-26", "MIN", "A", 22.0, 6.0, 2.0),
            ("2023-03-29", "BOS", "H", 36.0, 12.0, 3.0),
            ("2023-03-31", "BKN", "A", 27.0, 8.0, 2.0),
            ("2023-04-02", "HOU", "H", 30.0, 9.0, 4.0),
            ("2023-04-04", "UTA", "A", 25.0, 7.0, 3.0),
        ];
        for (date, opp, ha, points, rebounds, threes) in lebron_games {
            self.insert_game_log(
                lebron,
                &GameLogEntry {
                    date: date.parse()?,
                    opponent: opp.to_string(),
                    home_away: HomeAway::parse(ha).context("Invalid home/away marker in seed data")?,
                    stats: serde_json::from_value(json!({
                        "points": points,
                        "rebounds": rebounds,
                        "threes": threes,
                    }))?,
                },
            )?;
        }

        let judge = self.insert_player(League::Mlb, "Aaron Judge", "NYY")?;
        let judge_games: &[(&str, &str, &str, f64, f64, f64)] = &[
            ("2023-05-01", "BOS", "H", 2.0, 1.0, 3.0),
            ("2023-05-02", "BOS", "H", 1.0, 0.0, 0.0),
            ("2023-05-04", "TB", "A", 3.0, 2.0, 4.0),
            ("2023-05-05", "TB", "A", 0.0, 0.0, 1.0),
            ("2023-05-07", "TOR", "H", 2.0, 1.0, 2.0),
        ];
        for (date, opp, ha, hits, hr, rbi) in judge_games {
            self.insert_game_log(
                judge,
                &GameLogEntry {
                    date: date.parse()?,
                    opponent: opp.to_string(),
                    home_away: HomeAway::parse(ha).context("Invalid home/away marker in seed data")?,
                    stats: serde_json::from_value(json!({
                        "hits": hits,
                        "hr": hr,
                        "rbi": rbi,
                    }))?,
                },
            )?;
        }

        info!("Seeded demo players and game logs");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn standing(abbr: &str, as_of: &str, wins: u32) -> TeamStanding {
        TeamStanding {
            team: TeamIdentity {
                name: format!("Team {}", abbr),
                abbr: abbr.to_string(),
                league: League::Nba,
            },
            record: Record::new(wins, 10),
            streak: "W2".to_string(),
            last_five: "WWLWW".to_string(),
            record_as_of: as_of.parse().unwrap(),
            verification: VerificationResult {
                verified: true,
                notes: None,
            },
            sources: vec!["https://sportsdata.io".to_string()],
        }
    }

    #[test]
    fn test_standing_roundtrip() {
        let storage = Storage::open_in_memory().unwrap();
        let original = standing("BOS", "2023-04-09", 57);
        storage.upsert_standing(&original).unwrap();

        let loaded = storage
            .current_standing(League::Nba, "bos")
            .unwrap()
            .unwrap();
        assert_eq!(loaded.record, original.record);
        assert_eq!(loaded.streak, "W2");
        assert_eq!(loaded.last_five, "WWLWW");
        assert_eq!(loaded.record_as_of, original.record_as_of);
        assert_eq!(loaded.sources, original.sources);
    }

    #[test]
    fn test_history_retained_and_current_is_latest() {
        let storage = Storage::open_in_memory().unwrap();
        storage.upsert_standing(&standing("BOS", "2023-04-08", 56)).unwrap();
        storage.upsert_standing(&standing("BOS", "2023-04-09", 57)).unwrap();

        assert_eq!(storage.standing_history_len(League::Nba, "BOS").unwrap(), 2);
        let current = storage
            .current_standing(League::Nba, "BOS")
            .unwrap()
            .unwrap();
        assert_eq!(current.record.wins, 57);
    }

    #[test]
    fn test_rerun_same_as_of_replaces_not_duplicates() {
        let storage = Storage::open_in_memory().unwrap();
        storage.upsert_standing(&standing("BOS", "2023-04-09", 56)).unwrap();
        storage.upsert_standing(&standing("BOS", "2023-04-09", 57)).unwrap();

        assert_eq!(storage.standing_history_len(League::Nba, "BOS").unwrap(), 1);
        let current = storage
            .current_standing(League::Nba, "BOS")
            .unwrap()
            .unwrap();
        assert_eq!(current.record.wins, 57);
    }

    #[test]
    fn test_lookup_by_name_substring() {
        let storage = Storage::open_in_memory().unwrap();
        let mut s = standing("BOS", "2023-04-09", 57);
        s.team.name = "Boston Celtics".to_string();
        storage.upsert_standing(&s).unwrap();

        let found = storage.current_standing(League::Nba, "celtics").unwrap();
        assert!(found.is_some());
        let missing = storage.current_standing(League::Nba, "lakers").unwrap();
        assert!(missing.is_none());
    }

    #[test]
    fn test_game_logs_come_back_chronological() {
        let storage = Storage::open_in_memory().unwrap();
        storage.seed_demo_players().unwrap();

        let id = storage
            .find_player(League::Nba, "lebron james", "lal")
            .unwrap()
            .unwrap();
        let logs = storage.player_game_logs(id, 5).unwrap();
        assert_eq!(logs.len(), 5);
        // Most recent 5, oldest first.
        assert_eq!(logs[0].date.to_string(), "2023-03-26");
        assert_eq!(logs[4].date.to_string(), "2023-04-04");
        assert!(logs.windows(2).all(|w| w[0].date < w[1].date));
    }

    #[test]
    fn test_file_backed_storage() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("statline.db");
        let storage = Storage::open(path.to_str().unwrap()).unwrap();
        storage.upsert_standing(&standing("MIA", "2023-04-09", 44)).unwrap();
        assert!(storage
            .current_standing(League::Nba, "MIA")
            .unwrap()
            .is_some());
    }
}

//! Stat extraction from per-game stat bags.

use crate::models::{GameLogEntry, League};

use super::error::CoreError;

pub const MLB_STATS: &[&str] = &["hits", "total_bases", "hr", "rbi", "runs", "bb", "so"];
pub const NBA_STATS: &[&str] = &["points", "rebounds", "assists", "threes"];
pub const NFL_STATS: &[&str] = &[
    "pass_yds",
    "rush_yds",
    "rec_yds",
    "receptions",
    "pass_td",
    "rush_td",
    "rec_td",
];

/// Vocabulary for a single league.
pub fn league_vocabulary(league: League) -> &'static [&'static str] {
    match league {
        League::Mlb => MLB_STATS,
        League::Nba => NBA_STATS,
        League::Nfl => NFL_STATS,
    }
}

/// True if the name appears in any league's vocabulary. Extraction accepts
/// the union across leagues; per-league strictness is a boundary concern.
pub fn is_known_stat(name: &str) -> bool {
    MLB_STATS.contains(&name) || NBA_STATS.contains(&name) || NFL_STATS.contains(&name)
}

/// Pull a named statistic out of one game log.
///
/// A log with no stats container at all yields 0: that is "no data yet",
/// not corruption. A recognized stat missing from this game's bag also
/// yields 0. A name outside every vocabulary is a hard error.
pub fn extract_stat(log: &GameLogEntry, stat_name: &str) -> Result<f64, CoreError> {
    let Some(stats) = &log.stats else {
        return Ok(0.0);
    };

    if !is_known_stat(stat_name) {
        return Err(CoreError::UnknownStat(stat_name.to_string()));
    }

    Ok(stats.get(stat_name).copied().unwrap_or(0.0))
}

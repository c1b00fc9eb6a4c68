//! Integration tests for the full standings pipeline: mock providers in,
//! reconciled standings out, persisted and readable back.

use std::sync::Arc;

use chrono::NaiveDate;

use statline_backend::core::reconciler;
use statline_backend::models::League;
use statline_backend::providers::{
    secondary::SecondaryFeed, sportsdataio::SportsDataIo, PrimarySource, SecondarySource,
};
use statline_backend::storage::Storage;

fn as_of() -> NaiveDate {
    NaiveDate::from_ymd_opt(2023, 4, 9).unwrap()
}

async fn run_league(league: League) -> Vec<statline_backend::models::TeamStanding> {
    let primary = SportsDataIo::new(None, true);
    let secondary = SecondaryFeed::new(true, None, None);

    let primary_teams = primary.fetch_standings(league).await.unwrap();
    let secondary_teams = secondary.fetch_standings(league).await.unwrap();

    let sources = vec![
        primary.source_id().to_string(),
        secondary.source_id(league).to_string(),
    ];

    reconciler::reconcile(league, as_of(), &sources, &primary_teams, &secondary_teams).unwrap()
}

#[tokio::test]
async fn nba_pipeline_produces_mixed_verdicts() {
    let standings = run_league(League::Nba).await;
    assert_eq!(standings.len(), 6);

    let by_abbr = |abbr: &str| standings.iter().find(|s| s.team.abbr == abbr).unwrap();

    // Corroborated by the secondary source.
    let celtics = by_abbr("BOS");
    assert!(celtics.verification.verified);
    assert_eq!(celtics.streak, "W2");
    assert_eq!(celtics.last_five, "WWLWW");

    // Secondary disagrees on the record.
    let heat = by_abbr("MIA");
    assert!(!heat.verification.verified);
    assert!(heat
        .verification
        .notes
        .as_deref()
        .unwrap()
        .contains("Record mismatch"));

    // Not present in the secondary source at all.
    let knicks = by_abbr("NYK");
    assert!(!knicks.verification.verified);
    assert!(knicks
        .verification
        .notes
        .as_deref()
        .unwrap()
        .contains("Missing data"));
}

#[tokio::test]
async fn mlb_pipeline_flattens_divisions_and_flags_mismatch() {
    let standings = run_league(League::Mlb).await;
    assert_eq!(standings.len(), 6);

    // Output follows primary input order, division by division.
    assert_eq!(standings[0].team.abbr, "NYY");
    assert!(standings[0].verification.verified);
    assert!(standings
        .iter()
        .all(|s| s.record.ties_or_ot.is_none()));

    let cubs = standings.iter().find(|s| s.team.abbr == "CHC").unwrap();
    assert!(!cubs.verification.verified);
    assert!(cubs
        .verification
        .notes
        .as_deref()
        .unwrap()
        .contains("Record mismatch"));

    let orioles = standings.iter().find(|s| s.team.abbr == "BAL").unwrap();
    assert!(orioles
        .verification
        .notes
        .as_deref()
        .unwrap()
        .contains("Missing data"));
}

#[tokio::test]
async fn nfl_pipeline_keeps_ties_out_of_the_verdict() {
    let standings = run_league(League::Nfl).await;

    let chiefs = standings.iter().find(|s| s.team.abbr == "KC").unwrap();
    assert!(chiefs.verification.verified);
    assert_eq!(chiefs.record.ties_or_ot, Some(0));
    assert_eq!(chiefs.streak, "W3");

    // The Bills tie shows up in the record and the form strings but never
    // in the verification verdict.
    let bills = standings.iter().find(|s| s.team.abbr == "BUF").unwrap();
    assert_eq!(bills.record.ties_or_ot, Some(1));
    assert_eq!(bills.last_five, "WWTWW");
    assert!(bills
        .verification
        .notes
        .as_deref()
        .unwrap()
        .contains("Missing data"));
}

#[tokio::test]
async fn pipeline_is_idempotent() {
    let a = run_league(League::Nba).await;
    let b = run_league(League::Nba).await;
    assert_eq!(a, b);
}

#[tokio::test]
async fn standings_persist_and_read_back() {
    let storage = Arc::new(Storage::open_in_memory().unwrap());
    let standings = run_league(League::Nba).await;

    storage.upsert_standings(&standings).unwrap();

    let celtics = storage
        .current_standing(League::Nba, "BOS")
        .unwrap()
        .unwrap();
    assert_eq!(celtics.team.name, "Boston Celtics");
    assert_eq!(celtics.record.wins, 57);
    assert_eq!(celtics.record_as_of, as_of());

    // A second run for the same as-of date replaces, never duplicates.
    storage.upsert_standings(&standings).unwrap();
    assert_eq!(
        storage.standing_history_len(League::Nba, "BOS").unwrap(),
        1
    );
}

#[tokio::test]
async fn player_trend_pipeline_over_seeded_logs() {
    let storage = Storage::open_in_memory().unwrap();
    storage.seed_demo_players().unwrap();

    let player_id = storage
        .find_player(League::Nba, "LeBron James", "LAL")
        .unwrap()
        .unwrap();
    let logs = storage.player_game_logs(player_id, 10).unwrap();
    assert_eq!(logs.len(), 10);

    let values: Vec<f64> = logs
        .iter()
        .map(|log| statline_backend::core::extractor::extract_stat(log, "points").unwrap())
        .collect();
    let summary = statline_backend::core::summary::summarize(&values);

    assert_eq!(summary.games, 10);
    assert_eq!(summary.min, 19.0);
    assert_eq!(summary.max, 36.0);
    assert_eq!(summary.avg, 27.6);
}

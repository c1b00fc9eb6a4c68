//! Per-league standings reconciliation.
//!
//! Merges primary-source team data with secondary-source lookups and emits
//! one normalized standing per primary team, in input order.

use chrono::NaiveDate;
use tracing::debug;

use crate::models::{League, PrimaryTeam, SecondaryTeam, TeamStanding};

use super::{error::CoreError, form, verifier};

/// Reconcile a league's full set of teams.
///
/// `as_of` and `sources` come from the caller, never from a clock in here:
/// identical inputs always produce identical output. A team without a
/// secondary match only degrades that team's verification; a structurally
/// invalid primary entry aborts the whole batch.
pub fn reconcile(
    league: League,
    as_of: NaiveDate,
    sources: &[String],
    primary: &[PrimaryTeam],
    secondary: &[SecondaryTeam],
) -> Result<Vec<TeamStanding>, CoreError> {
    let mut standings = Vec::with_capacity(primary.len());

    for team in primary {
        validate_primary(league, team)?;

        let matched = find_secondary(&team.identity.name, secondary);
        if matched.is_none() {
            debug!(
                league = %league,
                team = %team.identity.name,
                "no secondary match, verification degraded"
            );
        }

        let verification = verifier::verify_record(&team.record, matched.map(|s| &s.record));

        standings.push(TeamStanding {
            team: team.identity.clone(),
            record: team.record,
            streak: form::calculate_streak(&team.results),
            last_five: form::calculate_last_five(&team.results),
            record_as_of: as_of,
            verification,
            sources: sources.to_vec(),
        });
    }

    Ok(standings)
}

fn validate_primary(league: League, team: &PrimaryTeam) -> Result<(), CoreError> {
    if team.identity.name.trim().is_empty() || team.identity.abbr.trim().is_empty() {
        return Err(CoreError::MalformedInput(format!(
            "primary {} entry without a team identity",
            league
        )));
    }
    if team.identity.league != league {
        return Err(CoreError::MalformedInput(format!(
            "primary entry for {} in a {} batch",
            team.identity.league, league
        )));
    }
    Ok(())
}

/// Exact name match first, then containment of the primary name's last
/// token within the secondary name. First match wins.
fn find_secondary<'a>(name: &str, secondary: &'a [SecondaryTeam]) -> Option<&'a SecondaryTeam> {
    if let Some(hit) = secondary.iter().find(|s| s.name == name) {
        return Some(hit);
    }

    let last_token = name.split_whitespace().last()?;
    secondary.iter().find(|s| s.name.contains(last_token))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Record, ResultToken, TeamIdentity};

    fn identity(name: &str, abbr: &str, league: League) -> TeamIdentity {
        TeamIdentity {
            name: name.to_string(),
            abbr: abbr.to_string(),
            league,
        }
    }

    fn primary(name: &str, abbr: &str, wins: u32, losses: u32, letters: &str) -> PrimaryTeam {
        PrimaryTeam {
            identity: identity(name, abbr, League::Nba),
            record: Record::new(wins, losses),
            results: letters
                .chars()
                .map(|c| ResultToken::from_letter(c).unwrap())
                .collect(),
        }
    }

    fn secondary(name: &str, wins: u32, losses: u32) -> SecondaryTeam {
        SecondaryTeam {
            name: name.to_string(),
            record: Record::new(wins, losses),
        }
    }

    fn as_of() -> NaiveDate {
        NaiveDate::from_ymd_opt(2023, 4, 9).unwrap()
    }

    fn sources() -> Vec<String> {
        vec!["https://sportsdata.io".to_string()]
    }

    #[test]
    fn test_exact_name_match_verifies() {
        let primary = vec![primary("Boston Celtics", "BOS", 57, 25, "WWLWW")];
        let secondary = vec![secondary("Boston Celtics", 57, 25)];

        let out = reconcile(League::Nba, as_of(), &sources(), &primary, &secondary).unwrap();
        assert_eq!(out.len(), 1);
        assert!(out[0].verification.verified);
        assert_eq!(out[0].streak, "W2");
        assert_eq!(out[0].last_five, "WWLWW");
        assert_eq!(out[0].record_as_of, as_of());
    }

    #[test]
    fn test_last_token_fallback_match() {
        // Secondary source spells the team differently; the last name
        // token still lands inside it.
        let primary = vec![primary("Los Angeles Lakers", "LAL", 52, 30, "WLWWW")];
        let secondary = vec![secondary("L.A. Lakers", 52, 30)];

        let out = reconcile(League::Nba, as_of(), &sources(), &primary, &secondary).unwrap();
        assert!(out[0].verification.verified);
    }

    #[test]
    fn test_exact_match_preferred_over_fallback() {
        let primary = vec![primary("New York Knicks", "NYK", 47, 35, "WW")];
        // The fallback ("Knicks" containment) would hit the first row, but
        // the exact-name row must win.
        let secondary = vec![
            secondary("Knicks of New York", 0, 0),
            secondary("New York Knicks", 47, 35),
        ];

        let out = reconcile(League::Nba, as_of(), &sources(), &primary, &secondary).unwrap();
        assert!(out[0].verification.verified);
    }

    #[test]
    fn test_unmatched_team_degrades_not_aborts() {
        let primary = vec![
            primary("Boston Celtics", "BOS", 57, 25, "WWW"),
            primary("Miami Heat", "MIA", 44, 38, "LWL"),
        ];
        let secondary = vec![secondary("Boston Celtics", 57, 25)];

        let out = reconcile(League::Nba, as_of(), &sources(), &primary, &secondary).unwrap();
        assert_eq!(out.len(), 2);
        assert!(out[0].verification.verified);
        assert!(!out[1].verification.verified);
        assert!(out[1]
            .verification
            .notes
            .as_deref()
            .unwrap()
            .contains("Missing data"));
    }

    #[test]
    fn test_mismatch_recorded_in_notes() {
        let primary = vec![primary("Chicago Bulls", "CHI", 40, 42, "LL")];
        let secondary = vec![secondary("Chicago Bulls", 41, 41)];

        let out = reconcile(League::Nba, as_of(), &sources(), &primary, &secondary).unwrap();
        assert!(!out[0].verification.verified);
        assert!(out[0]
            .verification
            .notes
            .as_deref()
            .unwrap()
            .contains("Record mismatch"));
    }

    #[test]
    fn test_output_follows_input_order() {
        let primary = vec![
            primary("Miami Heat", "MIA", 44, 38, "W"),
            primary("Boston Celtics", "BOS", 57, 25, "W"),
            primary("Chicago Bulls", "CHI", 40, 42, "L"),
        ];

        let out = reconcile(League::Nba, as_of(), &sources(), &primary, &[]).unwrap();
        let abbrs: Vec<&str> = out.iter().map(|s| s.team.abbr.as_str()).collect();
        assert_eq!(abbrs, vec!["MIA", "BOS", "CHI"]);
    }

    #[test]
    fn test_empty_name_aborts_batch() {
        let primary = vec![
            primary("Boston Celtics", "BOS", 57, 25, "W"),
            primary("", "XXX", 1, 1, "W"),
        ];

        let err = reconcile(League::Nba, as_of(), &sources(), &primary, &[]).unwrap_err();
        assert!(matches!(err, CoreError::MalformedInput(_)));
    }

    #[test]
    fn test_league_mismatch_aborts_batch() {
        let team = PrimaryTeam {
            identity: identity("Kansas City Chiefs", "KC", League::Nfl),
            record: Record::with_ties(14, 3, 0),
            results: vec![ResultToken::Win],
        };

        let err = reconcile(League::Nba, as_of(), &sources(), &[team], &[]).unwrap_err();
        assert!(matches!(err, CoreError::MalformedInput(_)));
    }

    #[test]
    fn test_reconcile_is_idempotent() {
        let primary = vec![
            primary("Boston Celtics", "BOS", 57, 25, "WWLWW"),
            primary("Miami Heat", "MIA", 44, 38, "LWLWL"),
        ];
        let secondary = vec![secondary("Boston Celtics", 57, 25)];

        let a = reconcile(League::Nba, as_of(), &sources(), &primary, &secondary).unwrap();
        let b = reconcile(League::Nba, as_of(), &sources(), &primary, &secondary).unwrap();
        assert_eq!(a, b);
    }
}

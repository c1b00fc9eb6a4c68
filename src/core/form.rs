//! Streak and last-five derivation from chronological game outcomes.
//!
//! Both functions re-derive from the full sequence on every call; nothing
//! here is incremental or accumulated across reconciliation passes.

use crate::models::ResultToken;

/// Current streak as `<letter><count>`, e.g. "W3" or "L2".
///
/// The letter is the most recent result; the count is the maximal run of
/// that result ending at the end of the sequence. Empty input yields "".
pub fn calculate_streak(results: &[ResultToken]) -> String {
    let Some(&last) = results.last() else {
        return String::new();
    };

    let count = results.iter().rev().take_while(|&&r| r == last).count();
    format!("{}{}", last.letter(), count)
}

/// Up to the final five results in chronological order, e.g. "WLWLW".
/// Shorter sequences yield a shorter string, never padded.
pub fn calculate_last_five(results: &[ResultToken]) -> String {
    let start = results.len().saturating_sub(5);
    results[start..].iter().map(|r| r.letter()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seq(letters: &str) -> Vec<ResultToken> {
        letters
            .chars()
            .map(|c| ResultToken::from_letter(c).unwrap())
            .collect()
    }

    #[test]
    fn test_streak_empty() {
        assert_eq!(calculate_streak(&[]), "");
    }

    #[test]
    fn test_streak_broken_by_earlier_result() {
        assert_eq!(calculate_streak(&seq("WWWLW")), "W1");
    }

    #[test]
    fn test_streak_counts_trailing_run() {
        assert_eq!(calculate_streak(&seq("LLWWW")), "W3");
    }

    #[test]
    fn test_streak_whole_sequence() {
        assert_eq!(calculate_streak(&seq("LLLL")), "L4");
    }

    #[test]
    fn test_streak_tie() {
        assert_eq!(calculate_streak(&seq("WLTT")), "T2");
    }

    #[test]
    fn test_last_five_empty() {
        assert_eq!(calculate_last_five(&[]), "");
    }

    #[test]
    fn test_last_five_short_sequence() {
        assert_eq!(calculate_last_five(&seq("WLW")), "WLW");
    }

    #[test]
    fn test_last_five_takes_tail_in_order() {
        assert_eq!(calculate_last_five(&seq("WLWLWLW")), "WLWLW");
    }

    #[test]
    fn test_last_five_exactly_five() {
        assert_eq!(calculate_last_five(&seq("TWLWL")), "TWLWL");
    }
}

//! Reduction of a per-game value series into summary statistics.

use crate::models::StatSummary;

/// Reduce a series of per-game values to count/average/min/max.
///
/// The average is rounded to 2 decimal places. An empty series yields
/// all zeros rather than NaN. Inputs are finite game stats, so no
/// NaN/infinity handling is needed. Order of input does not matter.
pub fn summarize(values: &[f64]) -> StatSummary {
    if values.is_empty() {
        return StatSummary {
            games: 0,
            avg: 0.0,
            min: 0.0,
            max: 0.0,
        };
    }

    let sum: f64 = values.iter().sum();
    let mut min = values[0];
    let mut max = values[0];
    for &v in &values[1..] {
        if v < min {
            min = v;
        }
        if v > max {
            max = v;
        }
    }

    StatSummary {
        games: values.len() as u32,
        avg: round2(sum / values.len() as f64),
        min,
        max,
    }
}

fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

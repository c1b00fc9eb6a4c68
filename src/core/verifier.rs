//! Record corroboration against a secondary source.

use crate::models::{Record, VerificationResult};

/// Compare a primary-source record against a secondary-source record.
///
/// Absence of the secondary is a reportable condition, not an error, so
/// this always returns a verdict. Only wins and losses take part in the
/// equality check; ties_or_ot rides along in the record for display.
pub fn verify_record(primary: &Record, secondary: Option<&Record>) -> VerificationResult {
    let Some(secondary) = secondary else {
        return VerificationResult {
            verified: false,
            notes: Some("Missing data from secondary source".to_string()),
        };
    };

    if primary.wins == secondary.wins && primary.losses == secondary.losses {
        return VerificationResult {
            verified: true,
            notes: None,
        };
    }

    VerificationResult {
        verified: false,
        notes: Some(format!(
            "Record mismatch: Primary ({}-{}) vs Secondary ({}-{})",
            primary.wins, primary.losses, secondary.wins, secondary.losses
        )),
    }
}

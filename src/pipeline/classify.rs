//! Eligibility classification: (GPA, threshold) → verdict + summary sentence.
//!
//! The four verdicts partition `Option<f64> × f64`:
//!
//! | GPA                          | Verdict              |
//! |------------------------------|----------------------|
//! | absent                       | `GPA NOT FOUND`      |
//! | `gpa ≥ threshold`            | `ELIGIBLE`           |
//! | `threshold − 1 ≤ gpa < threshold` | `REVIEW RECOMMENDED` |
//! | otherwise                    | `NOT ELIGIBLE`       |
//!
//! Every numeric value in a summary is printed with two decimals.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Width of the manual-review band below the threshold.
const REVIEW_BAND: f64 = 1.0;

/// Three-way eligibility verdict, plus the "nothing to judge" case.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Eligibility {
    Eligible,
    ReviewRecommended,
    NotEligible,
    GpaNotFound,
}

impl Eligibility {
    /// Human-readable label, e.g. `REVIEW RECOMMENDED`.
    pub fn label(&self) -> &'static str {
        match self {
            Eligibility::Eligible => "ELIGIBLE",
            Eligibility::ReviewRecommended => "REVIEW RECOMMENDED",
            Eligibility::NotEligible => "NOT ELIGIBLE",
            Eligibility::GpaNotFound => "GPA NOT FOUND",
        }
    }
}

impl fmt::Display for Eligibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Classify a GPA against the threshold.
///
/// Never fails: out-of-range thresholds simply move the bands.
pub fn evaluate(gpa: Option<f64>, threshold: f64) -> (Eligibility, String) {
    let Some(gpa) = gpa else {
        return (
            Eligibility::GpaNotFound,
            "The system could not find a GPA in this transcript. Please verify manually."
                .to_string(),
        );
    };

    if gpa >= threshold {
        (
            Eligibility::Eligible,
            format!(
                "The student has a GPA of {:.2}, which is above the threshold of {:.2}.",
                gpa, threshold
            ),
        )
    } else if gpa >= threshold - REVIEW_BAND {
        (
            Eligibility::ReviewRecommended,
            format!(
                "The student has a GPA of {:.2}. This is slightly below the threshold of {:.2}. \
                 Manual review recommended.",
                gpa, threshold
            ),
        )
    } else {
        (
            Eligibility::NotEligible,
            format!(
                "The student has a GPA of {:.2}, which is below the threshold of {:.2}.",
                gpa, threshold
            ),
        )
    }
}

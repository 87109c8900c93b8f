//! Metrics Engine: averages over every stored response folded into a 0-100
//! wellbeing score.
//!
//! ```text
//! raw   = (10 - stress) * 0.4 + (10 - workload) * 0.2 + satisfaction * 0.4
//! score = round2(clamp(raw * 10, 0, 100))
//! ```
//!
//! The score is always computed from the unrounded averages; only the values
//! handed back to callers are rounded to two decimals.

use crate::error::WellbeingError;
use crate::models::MetricsSnapshot;
use crate::store::{FieldAverages, SurveyStore};

pub const STRESS_WEIGHT: f64 = 0.4;
pub const WORKLOAD_WEIGHT: f64 = 0.2;
pub const SATISFACTION_WEIGHT: f64 = 0.4;

const RATING_CEILING: f64 = 10.0;
const SCORE_SCALE: f64 = 10.0;
const SCORE_MIN: f64 = 0.0;
const SCORE_MAX: f64 = 100.0;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Averages {
    pub stress: f64,
    pub workload: f64,
    pub satisfaction: f64,
}

impl Averages {
    /// Empty tables average to 0.0 rather than failing.
    pub fn from_field_averages(raw: &FieldAverages) -> Self {
        Self {
            stress: raw.stress.unwrap_or(0.0),
            workload: raw.workload.unwrap_or(0.0),
            satisfaction: raw.satisfaction.unwrap_or(0.0),
        }
    }

    /// Weighted score on a 0-100 scale, rounded to two decimals.
    pub fn wellbeing_score(&self) -> f64 {
        let raw = (RATING_CEILING - self.stress) * STRESS_WEIGHT
            + (RATING_CEILING - self.workload) * WORKLOAD_WEIGHT
            + self.satisfaction * SATISFACTION_WEIGHT;
        round2((raw * SCORE_SCALE).clamp(SCORE_MIN, SCORE_MAX))
    }

    pub fn snapshot(&self, response_count: i64) -> MetricsSnapshot {
        MetricsSnapshot {
            avg_stress: round2(self.stress),
            avg_workload: round2(self.workload),
            avg_satisfaction: round2(self.satisfaction),
            wellbeing_score: self.wellbeing_score(),
            response_count,
        }
    }
}

/// Round half away from zero to two decimal places.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Averages and wellbeing score over the entire store.
pub async fn compute_metrics(store: &SurveyStore) -> Result<MetricsSnapshot, WellbeingError> {
    let raw = store.averages().await?;
    let averages = Averages::from_field_averages(&raw);
    Ok(averages.snapshot(raw.count))
}

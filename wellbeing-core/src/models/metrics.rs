use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    pub avg_stress: f64,
    pub avg_workload: f64,
    pub avg_satisfaction: f64,
    pub wellbeing_score: f64,
    pub response_count: i64,
}

use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdherenceReport {
    pub total_shifts: i64,
    pub covered_shifts: i64,
    pub adherence_rate: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClockedInReport {
    pub clocked_in: i64,
}

/// A shift whose ledger deviates from its scheduled window. Minutes are
/// fractional; `None` means the corresponding event never happened (or the
/// shift has no scheduled end).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShiftTimingIssue {
    pub shift_id: Uuid,
    pub user_id: Uuid,
    pub late_by_minutes: Option<f64>,
    pub left_early_by_minutes: Option<f64>,
}

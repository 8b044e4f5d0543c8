pub mod alerts;
pub mod history;
pub mod predict;

use serde::Serialize;

pub use alerts::{Alert, AlertLevel, LogNotifier, Notifier, PermissionState};
pub use history::{UsageHistory, UsageSnapshot};
pub use predict::{forecast, Forecast};

use crate::scanner::targets::DiskTotals;

/// Forecast plus the history it was derived from
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct ForecastSummary {
    #[serde(flatten)]
    pub forecast: Forecast,
    pub history_points: usize,
    pub history_span_days: i64,
}

pub fn summarize(history: &UsageHistory, totals: &DiskTotals) -> ForecastSummary {
    ForecastSummary {
        forecast: forecast(history.points(), totals.total_bytes, totals.used_bytes),
        history_points: history.len(),
        history_span_days: history.span_days(),
    }
}

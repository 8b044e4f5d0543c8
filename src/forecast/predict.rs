use serde::Serialize;

use super::history::UsageSnapshot;

/// Forecasts further out than this are not reported
pub const MAX_FORECAST_DAYS: f64 = 365.0;

/// Estimated time until the volume is full
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Forecast {
    /// `None` when unknown: too little history, flat or shrinking usage,
    /// or more than a year away
    pub days_until_full: Option<u32>,
    /// Growth in bytes per day; 0 when not growing
    pub daily_growth_bytes: f64,
}

/// Two-point linear extrapolation from the oldest and newest snapshot.
///
/// Needs at least two points spanning a full day.
pub fn forecast(history: &[UsageSnapshot], total_bytes: u64, used_bytes: u64) -> Forecast {
    let (first, last) = match (history.first(), history.last()) {
        (Some(f), Some(l)) if history.len() >= 2 => (f, l),
        _ => return Forecast::default(),
    };

    let span_days = (last.timestamp - first.timestamp) as f64 / 86_400.0;
    if span_days < 1.0 {
        return Forecast::default();
    }

    let rate = (last.used_bytes as f64 - first.used_bytes as f64) / span_days;
    if rate <= 0.0 {
        return Forecast::default();
    }

    let free = total_bytes.saturating_sub(used_bytes) as f64;
    let days_left = free / rate;
    let days_until_full = if days_left > MAX_FORECAST_DAYS {
        None
    } else {
        Some(days_left.floor().max(1.0) as u32)
    };

    Forecast {
        days_until_full,
        daily_growth_bytes: rate,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snap(timestamp: i64, used_bytes: u64) -> UsageSnapshot {
        UsageSnapshot {
            timestamp,
            used_bytes,
        }
    }

    #[test]
    fn test_needs_two_points() {
        assert_eq!(forecast(&[], 100, 50), Forecast::default());
        assert_eq!(forecast(&[snap(0, 10)], 100, 50), Forecast::default());
    }

    #[test]
    fn test_needs_a_full_day() {
        let h = [snap(0, 10), snap(86_399, 20)];
        assert_eq!(forecast(&h, 100, 50).days_until_full, None);
    }

    #[test]
    fn test_shrinking_usage_is_unknown() {
        let h = [snap(0, 50), snap(86_400 * 2, 40)];
        let f = forecast(&h, 100, 40);
        assert_eq!(f.days_until_full, None);
        assert_eq!(f.daily_growth_bytes, 0.0);
    }

    #[test]
    fn test_almost_full_reports_one_day() {
        let h = [snap(0, 0), snap(86_400, 1_000)];
        let f = forecast(&h, 1_000, 1_000);
        assert_eq!(f.days_until_full, Some(1));
    }
}

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::common::format;

pub const CRITICAL_PERCENT: u8 = 90;
pub const WARNING_PERCENT: u8 = 80;
/// Usage must fall below this to re-arm both thresholds
pub const RESET_PERCENT: u8 = 75;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertLevel {
    Warning,
    Critical,
}

/// A low-disk notification ready for delivery
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Alert {
    pub level: AlertLevel,
    pub title: String,
    pub body: String,
}

impl Alert {
    pub fn new(level: AlertLevel, used_percent: u8, safe_cleanable: u64) -> Self {
        let cleanable = format::format_size(safe_cleanable);
        let (title, body) = match level {
            AlertLevel::Critical => (
                "Disk Almost Full",
                format!(
                    "Disk {}% full. {} can be safely cleaned with reclaim.",
                    used_percent, cleanable
                ),
            ),
            AlertLevel::Warning => (
                "Disk Space Low",
                format!(
                    "Disk {}% full. {} of developer caches can be safely cleaned.",
                    used_percent, cleanable
                ),
            ),
        };
        Self {
            level,
            title: title.to_string(),
            body,
        }
    }
}

/// Hysteresis over the warning and critical thresholds.
///
/// Returns the new last-notified threshold and the alert to raise, if any.
pub fn evaluate(used_percent: u8, last_threshold: u8) -> (u8, Option<AlertLevel>) {
    let (mut threshold, level) = if used_percent >= CRITICAL_PERCENT && last_threshold < CRITICAL_PERCENT {
        (CRITICAL_PERCENT, Some(AlertLevel::Critical))
    } else if used_percent >= WARNING_PERCENT && last_threshold < WARNING_PERCENT {
        (WARNING_PERCENT, Some(AlertLevel::Warning))
    } else {
        (last_threshold, None)
    };

    if used_percent < RESET_PERCENT {
        threshold = 0;
    }
    (threshold, level)
}

/// Whether the host may show alerts
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PermissionState {
    #[default]
    Unknown,
    Granted,
    Denied,
}

/// Host-side alert delivery
pub trait Notifier: Send + Sync {
    fn permission(&self) -> PermissionState;
    fn deliver(&self, alert: &Alert);
}

/// Writes alerts to the log. Always permitted.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn permission(&self) -> PermissionState {
        PermissionState::Granted
    }

    fn deliver(&self, alert: &Alert) {
        match alert.level {
            AlertLevel::Critical => warn!(title = %alert.title, "{}", alert.body),
            AlertLevel::Warning => info!(title = %alert.title, "{}", alert.body),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reset_below_75_only() {
        assert_eq!(evaluate(78, 80), (80, None));
        assert_eq!(evaluate(74, 80), (0, None));
    }

    #[test]
    fn test_jump_straight_to_critical() {
        assert_eq!(evaluate(96, 0), (90, Some(AlertLevel::Critical)));
        assert_eq!(evaluate(96, 90), (90, None));
    }

    #[test]
    fn test_alert_text() {
        let a = Alert::new(AlertLevel::Critical, 93, 5 * 1024 * 1024 * 1024);
        assert_eq!(a.title, "Disk Almost Full");
        assert!(a.body.contains("93%"));
        assert!(a.body.contains("5.00 GB"));
    }
}

use serde::{Deserialize, Serialize};

use crate::common::errors::ReclaimError;
use crate::store::{self, KeyValueStore, USAGE_HISTORY_KEY};

const SECS_PER_DAY: i64 = 86_400;

/// One point in the disk-usage time series
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsageSnapshot {
    /// Unix seconds
    pub timestamp: i64,
    pub used_bytes: u64,
}

/// Rate-limited usage series, oldest first
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UsageHistory {
    points: Vec<UsageSnapshot>,
}

impl UsageHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read the persisted series. Anything undecodable yields an empty history.
    pub fn load(store: &dyn KeyValueStore) -> Self {
        let mut history: Self = store::load(store, USAGE_HISTORY_KEY).unwrap_or_default();
        history.points.sort_by_key(|p| p.timestamp);
        history
    }

    pub fn save(&self, store: &dyn KeyValueStore) -> Result<(), ReclaimError> {
        store::save(store, USAGE_HISTORY_KEY, self)
    }

    /// Append a snapshot unless the newest one is younger than
    /// `interval_secs`, then drop everything older than `retention_days`.
    ///
    /// Returns whether a point was appended.
    pub fn record(&mut self, used_bytes: u64, now: i64, interval_secs: i64, retention_days: i64) -> bool {
        let due = self
            .points
            .last()
            .map(|last| now - last.timestamp >= interval_secs)
            .unwrap_or(true);

        if due {
            self.points.push(UsageSnapshot {
                timestamp: now,
                used_bytes,
            });
        }
        self.prune(now, retention_days);
        due
    }

    pub fn prune(&mut self, now: i64, retention_days: i64) {
        let cutoff = now - retention_days * SECS_PER_DAY;
        self.points.retain(|p| p.timestamp >= cutoff);
    }

    pub fn points(&self) -> &[UsageSnapshot] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Whole days between the oldest and newest point
    pub fn span_days(&self) -> i64 {
        match (self.points.first(), self.points.last()) {
            (Some(first), Some(last)) => (last.timestamp - first.timestamp) / SECS_PER_DAY,
            _ => 0,
        }
    }
}

impl From<Vec<UsageSnapshot>> for UsageHistory {
    fn from(mut points: Vec<UsageSnapshot>) -> Self {
        points.sort_by_key(|p| p.timestamp);
        Self { points }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    #[test]
    fn test_clock_going_backwards_appends_nothing() {
        let mut h = UsageHistory::new();
        assert!(h.record(10, 10_000, 3600, 90));
        assert!(!h.record(20, 5_000, 3600, 90));
        assert_eq!(h.len(), 1);
    }

    #[test]
    fn test_serialized_as_plain_list() {
        let h = UsageHistory::from(vec![UsageSnapshot {
            timestamp: 1,
            used_bytes: 2,
        }]);
        let json = serde_json::to_string(&h).unwrap();
        assert_eq!(json, r#"[{"timestamp":1,"used_bytes":2}]"#);
    }

    #[test]
    fn test_corrupt_record_is_empty() {
        let store = MemoryStore::new();
        store
            .set(USAGE_HISTORY_KEY, serde_json::json!({"broken": true}))
            .unwrap();
        assert!(UsageHistory::load(&store).is_empty());
    }

    #[test]
    fn test_span_days() {
        let h = UsageHistory::from(vec![
            UsageSnapshot { timestamp: 0, used_bytes: 1 },
            UsageSnapshot { timestamp: 3 * SECS_PER_DAY + 10, used_bytes: 2 },
        ]);
        assert_eq!(h.span_days(), 3);
    }
}

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

use crate::common::errors::ReclaimError;
use crate::store::{self, KeyValueStore, TOTAL_SAVED_KEY};

/// Lifetime bytes recovered, as persisted
pub fn load_total(store: &dyn KeyValueStore) -> u64 {
    store::load(store, TOTAL_SAVED_KEY).unwrap_or(0)
}

/// Add `bytes` to the persisted lifetime total and return the new total
pub fn record(store: &dyn KeyValueStore, bytes: u64) -> Result<u64, ReclaimError> {
    let total = load_total(store).saturating_add(bytes);
    store::save(store, TOTAL_SAVED_KEY, &total)?;
    Ok(total)
}

/// The most recent cleanup, shown briefly after it completes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RecoveredBanner {
    pub bytes: u64,
    pub at: DateTime<Utc>,
}

impl RecoveredBanner {
    pub fn new(bytes: u64, at: DateTime<Utc>) -> Self {
        Self { bytes, at }
    }

    /// Visible for `visible_secs` after the cleanup, and only if it freed something
    pub fn is_visible(&self, now: DateTime<Utc>, visible_secs: i64) -> bool {
        self.bytes > 0 && now >= self.at && now - self.at < Duration::seconds(visible_secs)
    }
}

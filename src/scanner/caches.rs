use chrono::{DateTime, Utc};
use rayon::prelude::*;
use std::path::Path;
use tracing::debug;

use super::catalog::{CatalogEntry, CACHE_CATALOG};
use super::targets::{days_between, DevCache};
use super::walker;
use crate::common::format;
use crate::common::permissions;

const GIB: f64 = 1024.0 * 1024.0 * 1024.0;

/// Size every catalog entry, keeping those strictly larger than `min_bytes`
pub fn scan_dev_caches(home: &Path, min_bytes: u64, now: DateTime<Utc>) -> Vec<DevCache> {
    scan_entries(CACHE_CATALOG, home, min_bytes, now)
}

/// Same as [`scan_dev_caches`] over an explicit set of catalog rows
pub fn scan_entries(
    entries: &[CatalogEntry],
    home: &Path,
    min_bytes: u64,
    now: DateTime<Utc>,
) -> Vec<DevCache> {
    let mut caches: Vec<DevCache> = entries
        .par_iter()
        .filter_map(|entry| size_entry(entry, home, min_bytes, now))
        .collect();

    caches.sort_by(|a, b| b.size_bytes.cmp(&a.size_bytes));
    debug!(found = caches.len(), "dev cache scan finished");
    caches
}

fn size_entry(entry: &CatalogEntry, home: &Path, min_bytes: u64, now: DateTime<Utc>) -> Option<DevCache> {
    let path = entry.resolve(home);
    let size = walker::dir_size(&path);
    if size <= min_bytes {
        return None;
    }

    let last_modified: Option<DateTime<Utc>> = std::fs::metadata(&path)
        .and_then(|m| m.modified())
        .ok()
        .map(DateTime::from);
    let days = last_modified.map(|t| days_between(t, now));
    let detail = if entry.breakdown {
        breakdown(&path)
    } else {
        None
    };

    Some(DevCache {
        name: entry.name.to_string(),
        icon_key: entry.icon_key.to_string(),
        suggestion: suggestion(size, days),
        risk_tier: entry.tier,
        description: entry.tier.description().to_string(),
        last_modified,
        days_since_modified: days,
        size_bytes: size,
        path,
        detail,
    })
}

/// Cleanup hint based on how stale and how large a cache is
pub fn suggestion(size_bytes: u64, days_since_modified: Option<i64>) -> Option<String> {
    let days = days_since_modified?;
    let size_gb = size_bytes as f64 / GIB;

    if days > 90 && size_gb >= 1.0 {
        Some(format!(
            "Not used for {} days, {}: safe to clean",
            days,
            format::format_size(size_bytes)
        ))
    } else if days > 60 {
        Some(format!("Unused for {} days, consider cleaning", days))
    } else if days > 30 && size_gb >= 5.0 {
        Some(format!(
            "{} days old, large at {}",
            days,
            format::format_size(size_bytes)
        ))
    } else {
        None
    }
}

/// "Largest: App (1.20 GB), Other (300.00 MB)" for the three largest children
fn breakdown(path: &Path) -> Option<String> {
    let top = walker::largest_children(path, 3);
    if top.is_empty() {
        return None;
    }
    let parts: Vec<String> = top
        .iter()
        .map(|(name, size)| format!("{} ({})", display_name(name), format::format_size(*size)))
        .collect();
    Some(format!("Largest: {}", parts.join(", ")))
}

/// Strip a trailing build hash, e.g. `MyApp-bxyzqwertyuiopasdfghjkl` -> `MyApp`
pub fn display_name(name: &str) -> &str {
    match name.rsplit_once('-') {
        Some((head, hash))
            if !head.is_empty()
                && hash.len() >= 20
                && hash.chars().all(|c| c.is_ascii_alphanumeric()) =>
        {
            head
        }
        _ => name,
    }
}

/// Names of catalog entries whose path exists but cannot be read
pub fn inaccessible_entries(home: &Path) -> Vec<String> {
    CACHE_CATALOG
        .iter()
        .filter(|entry| permissions::is_inaccessible(&entry.resolve(home)))
        .map(|entry| entry.name.to_string())
        .collect()
}

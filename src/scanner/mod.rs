pub mod artifacts;
pub mod caches;
pub mod catalog;
pub mod disk;
pub mod targets;
pub mod walker;

use chrono::Utc;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};

use crate::common::config::Config;
use crate::common::permissions;
use artifacts::ArtifactQuery;
use disk::VolumeProbe;
use targets::{DiskTotals, ScanResult};

/// Home-relative roots searched for large files
pub const LARGE_FILE_ROOTS: &[&str] = &["Downloads", "Documents", "Desktop", "Movies"];

/// Everything one scan pass reads from
pub struct ScanContext<'a> {
    pub home: &'a Path,
    /// Absolute catalog and category paths resolve below this root
    pub system_root: &'a Path,
    pub config: &'a Config,
    pub volume: &'a dyn VolumeProbe,
    pub trash_dir: &'a Path,
}

/// Run one full scan pass.
///
/// Never fails: unreadable locations count as empty and problems are
/// collected into `ScanResult::errors`.
pub fn run_scan(ctx: &ScanContext) -> ScanResult {
    let start = Instant::now();
    let now = Utc::now();
    let cfg = ctx.config;

    let mut errors = Vec::new();
    if !ctx.home.is_dir() {
        errors.push(format!("Home directory '{}' does not exist", ctx.home.display()));
    }

    let large_roots: Vec<PathBuf> = LARGE_FILE_ROOTS.iter().map(|r| ctx.home.join(r)).collect();
    let query = ArtifactQuery {
        max_depth: cfg.artifact_max_depth,
        min_bytes: cfg.artifact_min_bytes,
        limit: cfg.artifact_limit,
        exclude: cfg.exclude_paths.clone(),
    };

    let mut totals = None;
    let mut categories = Vec::new();
    let mut dev_caches = Vec::new();
    let mut large_files = Vec::new();
    let mut found_artifacts = Vec::new();
    let mut trash_bytes = 0;
    let mut inaccessible_paths = Vec::new();

    rayon::scope(|s| {
        s.spawn(|_| totals = Some(ctx.volume.totals()));
        s.spawn(|_| categories = disk::scan_categories(ctx.home, ctx.system_root));
        s.spawn(|_| dev_caches = caches::scan_dev_caches(ctx.home, cfg.cache_min_bytes, now));
        s.spawn(|_| {
            large_files = walker::find_large_files(
                &large_roots,
                cfg.large_file_threshold_bytes,
                cfg.large_file_max_depth,
                cfg.large_file_limit,
                &cfg.exclude_paths,
            )
        });
        s.spawn(|_| found_artifacts = artifacts::scan_artifacts(ctx.home, &query, now));
        s.spawn(|_| trash_bytes = walker::dir_size(ctx.trash_dir));
        s.spawn(|_| inaccessible_paths = caches::inaccessible_entries(ctx.home));
    });

    let totals = match totals {
        Some(Ok(t)) => t,
        Some(Err(e)) => {
            warn!(error = %e, "volume capacity unavailable");
            errors.push(e.to_string());
            DiskTotals::default()
        }
        None => DiskTotals::default(),
    };

    if permissions::is_inaccessible(ctx.trash_dir) {
        inaccessible_paths.push("Trash".to_string());
    }

    let mut result = ScanResult {
        scanned_at: now,
        duration_secs: start.elapsed().as_secs_f64(),
        totals,
        categories,
        dev_caches,
        large_files,
        artifacts: found_artifacts,
        stale_after_days: ctx.config.stale_days,
        trash_bytes,
        cleanable: Default::default(),
        inaccessible_paths,
        errors,
    };
    result.recalculate();

    info!(
        duration_secs = result.duration_secs,
        caches = result.dev_caches.len(),
        artifacts = result.artifacts.len(),
        large_files = result.large_files.len(),
        cleanable = result.cleanable.total,
        "scan finished"
    );
    result
}

/// Admits at most one scan at a time
#[derive(Debug, Clone, Default)]
pub struct ScanOrchestrator {
    in_flight: Arc<AtomicBool>,
}

impl ScanOrchestrator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim the scan slot, or `None` if a scan is already running
    pub fn try_begin(&self) -> Option<ScanGuard> {
        self.in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| ScanGuard {
                flag: Arc::clone(&self.in_flight),
            })
    }

    pub fn is_scanning(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Run a pass if none is in flight
    pub fn run(&self, ctx: &ScanContext) -> Option<ScanResult> {
        let _guard = self.try_begin()?;
        Some(run_scan(ctx))
    }
}

/// Held for the lifetime of a scan; releases the slot on drop
#[derive(Debug)]
pub struct ScanGuard {
    flag: Arc<AtomicBool>,
}

impl Drop for ScanGuard {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}

use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use super::trash::TrashBin;
use crate::common::errors::ReclaimError;
use crate::common::safety;
use crate::scanner::targets::CleanTarget;
use crate::scanner::walker;

/// Outcome of one cleanup operation
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CleanReport {
    /// Size of the targeted set measured before anything moved
    pub intended_bytes: u64,
    /// Intended size less whatever failed to move
    pub recovered_bytes: u64,
    pub items_trashed: usize,
    pub items_failed: usize,
    pub dry_run: bool,
    pub errors: Vec<String>,
}

impl CleanReport {
    pub fn dry_run(targets: &[CleanTarget]) -> Self {
        let intended: u64 = targets.iter().map(|t| t.size_bytes()).sum();
        Self {
            intended_bytes: intended,
            recovered_bytes: intended,
            dry_run: true,
            ..Default::default()
        }
    }

    fn absorb(&mut self, other: ContentsOutcome) {
        self.items_trashed += other.trashed;
        self.items_failed += other.failed;
        self.errors.extend(other.errors);
    }
}

/// What happened to the children of one directory
#[derive(Debug, Default)]
pub struct ContentsOutcome {
    pub trashed: usize,
    pub failed: usize,
    pub failed_bytes: u64,
    pub errors: Vec<String>,
}

/// Move every immediate child of `dir` to the trash; `dir` itself stays.
///
/// Items that fail to move are skipped and left untouched.
pub fn trash_contents(dir: &Path, trash: &dyn TrashBin) -> ContentsOutcome {
    let mut outcome = ContentsOutcome::default();

    let children: Vec<PathBuf> = match std::fs::read_dir(dir) {
        Ok(rd) => rd.filter_map(|e| e.ok()).map(|e| e.path()).collect(),
        Err(e) => {
            warn!(path = %dir.display(), error = %e, "could not list directory for cleanup");
            outcome.errors.push(format!("Could not list '{}': {}", dir.display(), e));
            return outcome;
        }
    };

    for child in children {
        let size = walker::dir_size(&child);
        match trash.trash(&child) {
            Ok(_) => outcome.trashed += 1,
            Err(e) => {
                warn!(path = %child.display(), error = %e, "trash failed, item left in place");
                outcome.failed += 1;
                outcome.failed_bytes += size;
                outcome.errors.push(e.to_string());
            }
        }
    }

    outcome
}

/// Empty each target into the trash.
///
/// Protected paths are refused outright and count as failed.
pub fn clean_targets(targets: &[CleanTarget], home: &Path, trash: &dyn TrashBin) -> CleanReport {
    let mut report = CleanReport {
        intended_bytes: targets.iter().map(|t| t.size_bytes()).sum(),
        ..Default::default()
    };
    let mut failed_bytes = 0u64;

    for target in targets {
        let path = target.path();
        if safety::is_protected(path, home) || path.starts_with(trash.location()) {
            warn!(path = %path.display(), "refusing to clean protected path");
            report.items_failed += 1;
            report.errors.push(
                ReclaimError::Protected {
                    path: path.to_path_buf(),
                }
                .to_string(),
            );
            failed_bytes += target.size_bytes();
            continue;
        }

        let outcome = trash_contents(path, trash);
        failed_bytes += outcome.failed_bytes;
        report.absorb(outcome);
    }

    report.recovered_bytes = report.intended_bytes.saturating_sub(failed_bytes);
    info!(
        targets = targets.len(),
        trashed = report.items_trashed,
        failed = report.items_failed,
        recovered = report.recovered_bytes,
        "cleanup finished"
    );
    report
}

use std::ffi::OsStr;
use std::path::Path;
use tracing::{info, warn};

use super::engine::CleanReport;
use super::trash::remove_any;
use crate::common::safety;
use crate::scanner::walker;

/// Permanently remove every immediate child of the trash directory.
///
/// This is the only irreversible delete in reclaim. It never follows
/// symlinks out of the trash and never touches the trash directory itself.
pub fn empty_trash(trash_dir: &Path, home: &Path) -> CleanReport {
    let mut report = CleanReport::default();

    if safety::is_protected(trash_dir, home) {
        warn!(path = %trash_dir.display(), "trash location is a protected path, not emptying");
        report
            .errors
            .push(format!("Refusing to empty protected path: '{}'", trash_dir.display()));
        return report;
    }

    let entries = match std::fs::read_dir(trash_dir) {
        Ok(rd) => rd,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return report,
        Err(e) => {
            warn!(path = %trash_dir.display(), error = %e, "could not list trash");
            report.errors.push(format!("Could not list '{}': {}", trash_dir.display(), e));
            return report;
        }
    };

    let mut failed_bytes = 0u64;
    for entry in entries.filter_map(|e| e.ok()) {
        let path = entry.path();
        let size = walker::dir_size(&path);
        report.intended_bytes += size;

        match remove_any(&path) {
            Ok(()) => {
                report.items_trashed += 1;
                remove_trash_info(trash_dir, &entry.file_name());
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "could not remove trashed item");
                report.items_failed += 1;
                failed_bytes += size;
                report
                    .errors
                    .push(format!("Failed to remove '{}': {}", path.display(), e));
            }
        }
    }

    report.recovered_bytes = report.intended_bytes.saturating_sub(failed_bytes);
    info!(
        removed = report.items_trashed,
        failed = report.items_failed,
        freed = report.recovered_bytes,
        "trash emptied"
    );
    report
}

/// Drop the freedesktop `info/<name>.trashinfo` record kept next to a
/// `files` trash directory, if there is one
fn remove_trash_info(trash_dir: &Path, name: &OsStr) {
    if trash_dir.file_name() != Some(OsStr::new("files")) {
        return;
    }
    let Some(root) = trash_dir.parent() else {
        return;
    };
    let mut record = name.to_os_string();
    record.push(".trashinfo");
    let info = root.join("info").join(record);
    match std::fs::remove_file(&info) {
        Ok(()) => {}
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => warn!(path = %info.display(), error = %e, "could not remove trash record"),
    }
}

use std::path::Path;

/// Paths requiring Full Disk Access
const FDA_PATHS: &[&str] = &[
    "Library/Mail",
    "Library/Messages",
    "Library/Safari",
    "Library/Cookies",
    "Library/Containers",
    "Library/Metadata/CoreSpotlight",
];

/// Check if a path likely requires Full Disk Access
pub fn requires_full_disk_access(path: &Path) -> bool {
    let path_str = path.to_string_lossy();
    FDA_PATHS.iter().any(|p| path_str.contains(p))
}

/// Check if we can list a directory (or stat a file)
pub fn can_read(path: &Path) -> bool {
    match std::fs::metadata(path) {
        Ok(m) if m.is_dir() => std::fs::read_dir(path).is_ok(),
        Ok(_) => std::fs::File::open(path).is_ok(),
        Err(_) => false,
    }
}

/// A path is inaccessible when its parent exists, the path itself exists,
/// and the current user cannot read it. Missing paths are not inaccessible.
pub fn is_inaccessible(path: &Path) -> bool {
    let parent_exists = path.parent().map(|p| p.exists()).unwrap_or(false);
    if !parent_exists {
        return false;
    }
    match std::fs::symlink_metadata(path) {
        Ok(_) => !can_read(path),
        // The parent refuses lookups, so the path is hidden from us.
        Err(e) => e.kind() == std::io::ErrorKind::PermissionDenied,
    }
}

/// Get a helpful message for permission issues
pub fn permission_hint(path: &Path) -> String {
    if requires_full_disk_access(path) {
        "This path requires Full Disk Access. Grant it in System Settings > Privacy & Security > Full Disk Access."
            .to_string()
    } else {
        format!(
            "Check file permissions for '{}'. The current user cannot read it.",
            path.display()
        )
    }
}

use std::path::Path;

/// Paths that must NEVER be trashed or emptied under any circumstances.
/// A safety net against bugs in catalog rows or caller-supplied selections.
const PROTECTED_PATHS: &[&str] = &[
    "/",
    "/System",
    "/Applications",
    "/Users",
    "/Library",
    "/home",
    "/usr",
    "/bin",
    "/sbin",
    "/var",
    "/etc",
    "/opt",
    "/private",
    "/Volumes",
];

/// Paths under home that must never be cleaned out as a whole
const PROTECTED_HOME_DIRS: &[&str] = &[
    "", // home dir itself
    "Desktop",
    "Documents",
    "Downloads",
    "Pictures",
    "Music",
    "Movies",
    "Library",
    "Library/Caches",
    "Applications",
    "Developer",
    ".ssh",
    ".gnupg",
];

/// Check if a path is protected and must never be cleaned
pub fn is_protected(path: &Path, home: &Path) -> bool {
    if PROTECTED_PATHS.iter().any(|p| path == Path::new(p)) {
        return true;
    }

    PROTECTED_HOME_DIRS.iter().any(|dir| {
        if dir.is_empty() {
            path == home
        } else {
            path == home.join(dir)
        }
    })
}

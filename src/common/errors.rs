use std::path::PathBuf;

use thiserror::Error;

/// Typed errors for reclaim operations.
/// The CLI uses `anyhow` at the top level, but the engine seams
/// (trash, store, volume probe) report precise failures with these.
#[derive(Debug, Error)]
pub enum ReclaimError {
    /// File system operation failed
    #[error("I/O error at '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Permission denied accessing a path
    #[error("Permission denied: '{}'. {hint}", path.display())]
    PermissionDenied { path: PathBuf, hint: String },

    /// Path is on the protected list and will never be touched
    #[error("Refusing to touch protected path: '{}'", path.display())]
    Protected { path: PathBuf },

    /// Moving an item into the trash failed; the item was left in place
    #[error("Could not move '{}' to the trash: {message}", path.display())]
    TrashFailed { path: PathBuf, message: String },

    /// Trash lives on another device and the copy fallback failed
    #[error("Cross-device move of '{}' failed: {message}", path.display())]
    CrossDevice { path: PathBuf, message: String },

    /// Persisted state could not be encoded, decoded, or written
    #[error("State store error for key '{key}': {message}")]
    Store { key: String, message: String },

    /// Volume capacity lookup failed
    #[error("Could not read volume capacity for '{}': {message}", path.display())]
    Volume { path: PathBuf, message: String },

    /// No home directory could be determined for the current user
    #[error("Could not determine the home directory")]
    HomeNotFound,
}

impl ReclaimError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        if source.kind() == std::io::ErrorKind::PermissionDenied {
            let hint = crate::common::permissions::permission_hint(&path);
            return ReclaimError::PermissionDenied { path, hint };
        }
        ReclaimError::Io { path, source }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_permission_denied_is_classified() {
        let err = ReclaimError::io(
            "/tmp/locked",
            std::io::Error::from(std::io::ErrorKind::PermissionDenied),
        );
        assert!(matches!(err, ReclaimError::PermissionDenied { .. }));
        assert!(err.to_string().contains("/tmp/locked"));
    }

    #[test]
    fn test_other_io_keeps_source() {
        let err = ReclaimError::io("/tmp/x", std::io::Error::from(std::io::ErrorKind::NotFound));
        assert!(matches!(err, ReclaimError::Io { .. }));
        assert!(std::error::Error::source(&err).is_some());
    }
}

use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::common::errors::ReclaimError;

/// A recoverable destination for removed items
pub trait TrashBin: Send + Sync {
    /// Move `path` into the trash.
    ///
    /// On error the item must be left where it was.
    fn trash(&self, path: &Path) -> Result<(), ReclaimError>;

    /// Directory holding trashed items
    fn location(&self) -> &Path;
}

fn check_trashable(path: &Path, location: &Path) -> Result<(), ReclaimError> {
    path.symlink_metadata()
        .map_err(|e| ReclaimError::io(path, e))?;
    if path.starts_with(location) {
        return Err(ReclaimError::TrashFailed {
            path: path.to_path_buf(),
            message: "item is already in the trash".into(),
        });
    }
    Ok(())
}

// ─── Desktop trash ───────────────────────────────────────────────────────────

/// The platform trash: Finder on macOS, the freedesktop trash (with its
/// `.trashinfo` records) on Linux, the Recycle Bin on Windows.
///
/// `location` is only used for sizing and emptying; where an item lands is
/// decided by the platform.
#[derive(Debug, Clone)]
pub struct SystemTrash {
    location: PathBuf,
}

impl SystemTrash {
    pub fn new(location: impl Into<PathBuf>) -> Self {
        Self {
            location: location.into(),
        }
    }
}

impl TrashBin for SystemTrash {
    fn trash(&self, path: &Path) -> Result<(), ReclaimError> {
        check_trashable(path, &self.location)?;
        trash::delete(path).map_err(|e| ReclaimError::TrashFailed {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        debug!(path = %path.display(), "moved to system trash");
        Ok(())
    }

    fn location(&self) -> &Path {
        &self.location
    }
}

// ─── Plain directory trash ───────────────────────────────────────────────────

/// Claims beyond this many collisions for one name give up
const MAX_NAME_ATTEMPTS: u32 = 10_000;

/// A plain directory used as the trash, for headless hosts and tests.
///
/// Names are claimed with exclusive creates before anything moves, so
/// concurrent callers never land on the same destination.
#[derive(Debug, Clone)]
pub struct HomeTrash {
    dir: PathBuf,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EntryKind {
    File,
    Dir,
    Symlink,
}

impl HomeTrash {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Move `path` into the directory and return where it landed
    pub fn move_into(&self, path: &Path) -> Result<PathBuf, ReclaimError> {
        check_trashable(path, &self.dir)?;
        let meta = path.symlink_metadata().map_err(|e| ReclaimError::io(path, e))?;
        let kind = if meta.file_type().is_symlink() {
            EntryKind::Symlink
        } else if meta.is_dir() {
            EntryKind::Dir
        } else {
            EntryKind::File
        };

        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .ok_or_else(|| ReclaimError::TrashFailed {
                path: path.to_path_buf(),
                message: "path has no file name".into(),
            })?;

        std::fs::create_dir_all(&self.dir).map_err(|e| ReclaimError::io(&self.dir, e))?;
        let dest = self.claim(path, &name, kind)?;

        // The claimed placeholder is ours alone, so replacing it loses nothing.
        match std::fs::rename(path, &dest) {
            Ok(()) => {
                debug!(from = %path.display(), to = %dest.display(), "moved to trash");
                Ok(dest)
            }
            Err(e) if is_cross_device(&e) => {
                move_across_devices(path, &dest)?;
                debug!(from = %path.display(), to = %dest.display(), "copied to trash across devices");
                Ok(dest)
            }
            Err(e) => {
                let _ = remove_any(&dest);
                Err(ReclaimError::TrashFailed {
                    path: path.to_path_buf(),
                    message: e.to_string(),
                })
            }
        }
    }

    /// Exclusively create the first free name: `name`, `name 2`, `name 3`, ...
    fn claim(&self, src: &Path, name: &str, kind: EntryKind) -> Result<PathBuf, ReclaimError> {
        let (stem, ext) = split_extension(name);
        for n in 1..=MAX_NAME_ATTEMPTS {
            let candidate = if n == 1 {
                self.dir.join(name)
            } else {
                self.dir.join(format!("{} {}{}", stem, n, ext))
            };
            match create_placeholder(src, &candidate, kind) {
                Ok(()) => return Ok(candidate),
                Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => continue,
                Err(e) => return Err(ReclaimError::io(&candidate, e)),
            }
        }
        Err(ReclaimError::TrashFailed {
            path: src.to_path_buf(),
            message: format!("no free name for '{}' in the trash", name),
        })
    }
}

impl TrashBin for HomeTrash {
    fn trash(&self, path: &Path) -> Result<(), ReclaimError> {
        self.move_into(path).map(|_| ())
    }

    fn location(&self) -> &Path {
        &self.dir
    }
}

/// An empty directory for directories, a copy of the link for symlinks, and
/// an empty file otherwise. Fails with `AlreadyExists` if the name is taken.
fn create_placeholder(src: &Path, dest: &Path, kind: EntryKind) -> std::io::Result<()> {
    match kind {
        EntryKind::Dir => std::fs::create_dir(dest),
        EntryKind::Symlink => copy_symlink(src, dest),
        EntryKind::File => OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(dest)
            .map(|_| ()),
    }
}

fn split_extension(name: &str) -> (&str, &str) {
    match name.rfind('.') {
        Some(idx) if idx > 0 => name.split_at(idx),
        _ => (name, ""),
    }
}

#[cfg(unix)]
fn is_cross_device(err: &std::io::Error) -> bool {
    err.raw_os_error() == Some(libc::EXDEV)
}

#[cfg(not(unix))]
fn is_cross_device(_err: &std::io::Error) -> bool {
    false
}

/// Fill the claimed `dest` with a copy of `src`, then remove `src`. The
/// original is only touched once the copy is complete; a failed copy is
/// removed again.
fn move_across_devices(src: &Path, dest: &Path) -> Result<(), ReclaimError> {
    if let Err(e) = copy_into_claimed(src, dest) {
        let _ = remove_any(dest);
        return Err(ReclaimError::CrossDevice {
            path: src.to_path_buf(),
            message: e.to_string(),
        });
    }

    remove_any(src).map_err(|e| ReclaimError::CrossDevice {
        path: src.to_path_buf(),
        message: format!("copied to trash but the original could not be removed: {}", e),
    })
}

/// Top level of a copy whose destination placeholder already exists
fn copy_into_claimed(src: &Path, dest: &Path) -> std::io::Result<()> {
    let file_type = src.symlink_metadata()?.file_type();
    if file_type.is_symlink() {
        // The placeholder is already the copied link
        Ok(())
    } else if file_type.is_dir() {
        copy_children(src, dest)
    } else {
        std::fs::copy(src, dest).map(|_| ())
    }
}

fn copy_children(src: &Path, dest: &Path) -> std::io::Result<()> {
    for entry in std::fs::read_dir(src)? {
        let entry = entry?;
        copy_tree(&entry.path(), &dest.join(entry.file_name()))?;
    }
    Ok(())
}

fn copy_tree(src: &Path, dest: &Path) -> std::io::Result<()> {
    let file_type = src.symlink_metadata()?.file_type();

    if file_type.is_symlink() {
        copy_symlink(src, dest)
    } else if file_type.is_dir() {
        std::fs::create_dir(dest)?;
        copy_children(src, dest)
    } else {
        std::fs::copy(src, dest).map(|_| ())
    }
}

#[cfg(unix)]
fn copy_symlink(src: &Path, dest: &Path) -> std::io::Result<()> {
    let target = std::fs::read_link(src)?;
    std::os::unix::fs::symlink(target, dest)
}

#[cfg(not(unix))]
fn copy_symlink(_src: &Path, dest: &Path) -> std::io::Result<()> {
    OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(dest)
        .map(|_| ())
}

/// Remove a file, symlink, or directory tree
pub(crate) fn remove_any(path: &Path) -> std::io::Result<()> {
    let meta = path.symlink_metadata()?;
    if meta.is_dir() {
        std::fs::remove_dir_all(path)
    } else {
        std::fs::remove_file(path)
    }
}

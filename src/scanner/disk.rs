use rayon::prelude::*;
use std::path::{Path, PathBuf};

use super::catalog::resolve_template;
use super::targets::{DiskCategory, DiskTotals};
use super::walker;
use crate::common::errors::ReclaimError;

/// Source of volume capacity figures
pub trait VolumeProbe: Send + Sync {
    fn totals(&self) -> Result<DiskTotals, ReclaimError>;
}

/// Reads capacity of the volume holding `mount` with statvfs
#[derive(Debug, Clone)]
pub struct StatvfsProbe {
    pub mount: PathBuf,
}

impl Default for StatvfsProbe {
    fn default() -> Self {
        Self {
            mount: PathBuf::from("/"),
        }
    }
}

#[cfg(unix)]
impl VolumeProbe for StatvfsProbe {
    fn totals(&self) -> Result<DiskTotals, ReclaimError> {
        use std::ffi::CString;
        use std::mem::MaybeUninit;
        use std::os::unix::ffi::OsStrExt;

        let c_path = CString::new(self.mount.as_os_str().as_bytes()).map_err(|e| {
            ReclaimError::Volume {
                path: self.mount.clone(),
                message: e.to_string(),
            }
        })?;

        let mut stat = MaybeUninit::<libc::statvfs>::uninit();
        let ret = unsafe { libc::statvfs(c_path.as_ptr(), stat.as_mut_ptr()) };
        if ret != 0 {
            return Err(ReclaimError::Volume {
                path: self.mount.clone(),
                message: std::io::Error::last_os_error().to_string(),
            });
        }
        let stat = unsafe { stat.assume_init() };
        let block_size = stat.f_frsize as u64;
        let total = stat.f_blocks as u64 * block_size;
        let available = stat.f_bavail as u64 * block_size;
        Ok(DiskTotals::from_capacity(total, available))
    }
}

#[cfg(not(unix))]
impl VolumeProbe for StatvfsProbe {
    fn totals(&self) -> Result<DiskTotals, ReclaimError> {
        Err(ReclaimError::Volume {
            path: self.mount.clone(),
            message: "statvfs is not available on this platform".into(),
        })
    }
}

/// Fixed capacity figures, for hosts that measure elsewhere and for tests
#[derive(Debug, Clone, Copy)]
pub struct FixedVolume {
    pub total_bytes: u64,
    pub free_bytes: u64,
}

impl VolumeProbe for FixedVolume {
    fn totals(&self) -> Result<DiskTotals, ReclaimError> {
        Ok(DiskTotals::from_capacity(self.total_bytes, self.free_bytes))
    }
}

/// User-facing storage buckets: (name, icon key, path templates)
pub const CATEGORY_TABLE: &[(&str, &str, &[&str])] = &[
    ("Applications", "app.fill", &["/Applications", "~/Applications"]),
    ("Documents", "doc.fill", &["~/Documents"]),
    ("Downloads", "arrow.down.circle.fill", &["~/Downloads"]),
    ("Desktop", "menubar.dock.rectangle", &["~/Desktop"]),
    ("Developer", "hammer.fill", &["~/Library/Developer", "~/Developer"]),
    ("Caches", "internaldrive.fill", &["~/Library/Caches", "/Library/Caches"]),
    ("Mail", "envelope.fill", &["~/Library/Mail"]),
    ("Music", "music.note", &["~/Music"]),
    ("Movies", "film.fill", &["~/Movies"]),
    ("Photos", "photo.fill", &["~/Pictures"]),
];

/// Size every category; empty ones are dropped, largest first
pub fn scan_categories(home: &Path, system_root: &Path) -> Vec<DiskCategory> {
    let mut categories: Vec<DiskCategory> = CATEGORY_TABLE
        .par_iter()
        .map(|(name, icon, templates)| {
            let paths: Vec<PathBuf> = templates
                .iter()
                .map(|t| resolve_template(t, home, system_root))
                .collect();
            DiskCategory {
                name: name.to_string(),
                icon_key: icon.to_string(),
                size_bytes: walker::paths_size(&paths),
            }
        })
        .filter(|c| c.size_bytes > 0)
        .collect();

    categories.sort_by(|a, b| b.size_bytes.cmp(&a.size_bytes));
    categories
}

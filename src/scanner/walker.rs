use rayon::prelude::*;
use std::fs::Metadata;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use super::targets::LargeFile;

/// Bytes a file actually occupies on disk.
///
/// Sparse files (container disk images, VM bundles) report their allocated
/// blocks, not their logical length.
#[cfg(unix)]
pub fn allocated_size(metadata: &Metadata) -> u64 {
    use std::os::unix::fs::MetadataExt;
    metadata.blocks() * 512
}

#[cfg(not(unix))]
pub fn allocated_size(metadata: &Metadata) -> u64 {
    metadata.len()
}

/// Calculate total allocated size of every regular file under `path`,
/// hidden entries included. Missing or unreadable roots count as 0.
pub fn dir_size(path: &Path) -> u64 {
    WalkDir::new(path)
        .follow_links(false)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .map(|e| e.metadata().map(|m| allocated_size(&m)).unwrap_or(0))
        .sum()
}

/// Sum of `dir_size` over several paths
pub fn paths_size(paths: &[PathBuf]) -> u64 {
    paths.iter().map(|p| dir_size(p)).sum()
}

/// The `n` largest immediate children of a directory, by allocated size
pub fn largest_children(dir: &Path, n: usize) -> Vec<(String, u64)> {
    let entries: Vec<PathBuf> = match std::fs::read_dir(dir) {
        Ok(rd) => rd.filter_map(|e| e.ok()).map(|e| e.path()).collect(),
        Err(_) => return Vec::new(),
    };

    let mut sized: Vec<(String, u64)> = entries
        .par_iter()
        .map(|p| {
            let name = p
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_default();
            (name, dir_size(p))
        })
        .filter(|(_, size)| *size > 0)
        .collect();

    sized.sort_by(|a, b| b.1.cmp(&a.1));
    sized.truncate(n);
    sized
}

/// Find regular files of at least `threshold_bytes` below `roots`.
///
/// Looks at most `max_depth` directory levels deep (files directly inside a
/// root are level one), skips dot-prefixed entries and excluded paths, and
/// silently skips subtrees that cannot be listed. Returns at most `limit`
/// entries, largest first.
pub fn find_large_files(
    roots: &[PathBuf],
    threshold_bytes: u64,
    max_depth: usize,
    limit: usize,
    exclude: &[String],
) -> Vec<LargeFile> {
    let mut results: Vec<LargeFile> = roots
        .par_iter()
        .flat_map_iter(|root| large_files_under(root, threshold_bytes, max_depth, exclude))
        .collect();

    results.sort_by(|a, b| b.size_bytes.cmp(&a.size_bytes));
    results.truncate(limit);
    results
}

fn large_files_under(
    root: &Path,
    threshold_bytes: u64,
    max_depth: usize,
    exclude: &[String],
) -> Vec<LargeFile> {
    let mut results = Vec::new();

    if max_depth == 0 || !root.is_dir() {
        return results;
    }

    for entry in WalkDir::new(root)
        .follow_links(false)
        .min_depth(1)
        .max_depth(max_depth)
        .into_iter()
        .filter_entry(|e| {
            let name = e.file_name().to_string_lossy();
            !name.starts_with('.') && !is_excluded(e.path(), exclude)
        })
        .filter_map(|e| e.ok())
    {
        if !entry.file_type().is_file() {
            continue;
        }
        if let Ok(metadata) = entry.metadata() {
            let size = allocated_size(&metadata);
            if size >= threshold_bytes {
                results.push(LargeFile {
                    name: entry.file_name().to_string_lossy().to_string(),
                    path: entry.path().to_path_buf(),
                    size_bytes: size,
                });
            }
        }
    }

    results
}

pub(crate) fn is_excluded(path: &Path, exclude: &[String]) -> bool {
    if exclude.is_empty() {
        return false;
    }
    let path_str = path.to_string_lossy();
    exclude.iter().any(|p| path_str.contains(p.as_str()))
}

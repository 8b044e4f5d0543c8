use chrono::{DateTime, Utc};
use rayon::prelude::*;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::WalkDir;

use super::catalog::{self, ProjectSignature};
use super::targets::{days_between, ProjectArtifact};
use super::walker;

/// Home-relative directories searched for projects
pub const SEARCH_ROOTS: &[&str] = &[
    "Documents",
    "Developer",
    "Projects",
    "Code",
    "repos",
    "src",
    "workspace",
    "Desktop",
];

/// Artifact and vendor trees that are never descended into
pub const SKIP_DIRS: &[&str] = &[
    "node_modules",
    ".git",
    "target",
    "build",
    "dist",
    "vendor",
    "Pods",
    "__pycache__",
    "venv",
    ".venv",
    "env",
    "DerivedData",
    "Library",
    "_build",
];

/// The one dot-directory the search is allowed to enter
pub const ALLOWED_DOT_DIR: &str = ".build";

/// Limits for one artifact scan
#[derive(Debug, Clone)]
pub struct ArtifactQuery {
    pub max_depth: usize,
    pub min_bytes: u64,
    pub limit: usize,
    pub exclude: Vec<String>,
}

/// Find project build artifacts under the standard search roots in `home`
pub fn scan_artifacts(home: &Path, query: &ArtifactQuery, now: DateTime<Utc>) -> Vec<ProjectArtifact> {
    let roots: Vec<PathBuf> = SEARCH_ROOTS
        .iter()
        .map(|r| home.join(r))
        .filter(|p| p.is_dir())
        .collect();
    scan_roots(&roots, query, now)
}

/// Find project build artifacts under explicit roots.
///
/// Results larger than `min_bytes` are kept, largest first, capped at `limit`.
pub fn scan_roots(roots: &[PathBuf], query: &ArtifactQuery, now: DateTime<Utc>) -> Vec<ProjectArtifact> {
    let found: Vec<(PathBuf, &'static ProjectSignature)> = roots
        .par_iter()
        .flat_map_iter(|root| find_projects(root, query.max_depth, &query.exclude))
        .collect();

    // Search roots may overlap through nesting; keep the first sighting.
    let mut seen = HashSet::new();
    let unique: Vec<_> = found
        .into_iter()
        .filter(|(dir, sig)| seen.insert(dir.join(sig.artifact_dir)))
        .collect();

    let mut artifacts: Vec<ProjectArtifact> = unique
        .par_iter()
        .map(|(dir, sig)| build_artifact(dir, sig, now))
        .filter(|a| a.size_bytes > query.min_bytes)
        .collect();

    artifacts.sort_by(|a, b| b.size_bytes.cmp(&a.size_bytes));
    artifacts.truncate(query.limit);
    debug!(count = artifacts.len(), "artifact scan finished");
    artifacts
}

/// Depth-first search for project roots. A matched directory is a leaf.
pub fn find_projects(
    root: &Path,
    max_depth: usize,
    exclude: &[String],
) -> Vec<(PathBuf, &'static ProjectSignature)> {
    let mut projects = Vec::new();

    let mut it = WalkDir::new(root)
        .follow_links(false)
        .max_depth(max_depth)
        .into_iter()
        .filter_entry(|e| e.depth() == 0 || should_descend(e.file_name().to_string_lossy().as_ref()));

    loop {
        let entry = match it.next() {
            None => break,
            Some(Ok(entry)) => entry,
            Some(Err(_)) => continue,
        };

        if !entry.file_type().is_dir() {
            continue;
        }
        if walker::is_excluded(entry.path(), exclude) {
            it.skip_current_dir();
            continue;
        }

        if let Some(sig) = catalog::match_project(entry.path()) {
            projects.push((entry.path().to_path_buf(), sig));
            it.skip_current_dir();
        }
    }

    projects
}

fn should_descend(name: &str) -> bool {
    if SKIP_DIRS.contains(&name) {
        return false;
    }
    !name.starts_with('.') || name == ALLOWED_DOT_DIR
}

fn build_artifact(project_dir: &Path, sig: &ProjectSignature, now: DateTime<Utc>) -> ProjectArtifact {
    let artifact_path = project_dir.join(sig.artifact_dir);
    let last_modified: Option<DateTime<Utc>> = std::fs::metadata(&artifact_path)
        .and_then(|m| m.modified())
        .ok()
        .map(DateTime::from);

    ProjectArtifact {
        project_name: project_dir
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default(),
        project_path: project_dir.to_path_buf(),
        artifact_name: sig.artifact_dir.to_string(),
        project_type_label: sig.type_label.to_string(),
        size_bytes: walker::dir_size(&artifact_path),
        days_since_modified: last_modified.map(|t| days_between(t, now)),
        last_modified,
        artifact_path,
    }
}

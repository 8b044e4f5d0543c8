mod common;

use std::path::{Path, PathBuf};
use tempfile::TempDir;

use common::{is_empty_dir, write_noise};
use reclaim::cleaner::{self, HomeTrash, TrashBin};
use reclaim::common::errors::ReclaimError;
use reclaim::scanner::targets::{CleanTarget, DevCache, ProjectArtifact, RiskTier};
use reclaim::scanner::walker;

/// Refuses paths whose file name contains `needle`; delegates the rest
struct PickyTrash {
    inner: HomeTrash,
    needle: &'static str,
}

impl TrashBin for PickyTrash {
    fn trash(&self, path: &Path) -> Result<(), ReclaimError> {
        let name = path.file_name().unwrap().to_string_lossy();
        if name.contains(self.needle) {
            return Err(ReclaimError::TrashFailed {
                path: path.to_path_buf(),
                message: "refused".into(),
            });
        }
        self.inner.trash(path)
    }

    fn location(&self) -> &Path {
        self.inner.location()
    }
}

fn cache_target(path: &Path) -> CleanTarget {
    CleanTarget::Cache(DevCache {
        name: "pip Cache".into(),
        icon_key: "cube.fill".into(),
        path: path.to_path_buf(),
        size_bytes: walker::dir_size(path),
        last_modified: None,
        days_since_modified: None,
        suggestion: None,
        risk_tier: RiskTier::Safe,
        description: RiskTier::Safe.description().into(),
        detail: None,
    })
}

fn pip_cache(home: &Path) -> PathBuf {
    let cache = home.join("Library/Caches/pip");
    write_noise(&cache.join("http/a/b/entry"), 300_000);
    write_noise(&cache.join("wheels/keep-me.whl"), 200_000);
    write_noise(&cache.join("selfcheck.json"), 4_000);
    cache
}

#[test]
fn test_clean_moves_contents_to_trash() {
    let home = TempDir::new().unwrap();
    let cache = pip_cache(home.path());
    let trash = HomeTrash::new(home.path().join(".Trash"));
    let target = cache_target(&cache);
    let intended = target.size_bytes();

    let report = cleaner::clean_targets(&[target], home.path(), &trash);

    assert!(is_empty_dir(&cache));
    assert_eq!(report.items_trashed, 3);
    assert_eq!(report.items_failed, 0);
    assert_eq!(report.recovered_bytes, intended);
    assert_eq!(walker::dir_size(trash.location()), intended);
    assert!(trash.location().join("wheels/keep-me.whl").exists());
}

#[test]
fn test_failed_trash_never_deletes() {
    let home = TempDir::new().unwrap();
    let cache = pip_cache(home.path());
    let before = walker::dir_size(&cache);
    let trash = PickyTrash {
        inner: HomeTrash::new(home.path().join(".Trash")),
        needle: "",
    };

    let report = cleaner::clean_targets(&[cache_target(&cache)], home.path(), &trash);

    assert_eq!(report.items_trashed, 0);
    assert_eq!(report.items_failed, 3);
    assert_eq!(report.recovered_bytes, 0);
    assert_eq!(walker::dir_size(&cache), before);
    assert_eq!(walker::dir_size(trash.location()), 0);
}

#[test]
fn test_partial_failure_bounds_savings() {
    let home = TempDir::new().unwrap();
    let cache = pip_cache(home.path());
    let trash = PickyTrash {
        inner: HomeTrash::new(home.path().join(".Trash")),
        needle: "wheels",
    };
    let target = cache_target(&cache);
    let intended = target.size_bytes();
    let kept = walker::dir_size(&cache.join("wheels"));

    let report = cleaner::clean_targets(&[target], home.path(), &trash);

    assert_eq!(report.items_failed, 1);
    assert!(report.recovered_bytes <= intended);
    assert_eq!(report.recovered_bytes, intended - kept);
    assert!(cache.join("wheels/keep-me.whl").exists());
    assert!(!cache.join("http").exists());
}

#[test]
fn test_artifact_directory_is_kept_empty() {
    let home = TempDir::new().unwrap();
    let proj = home.path().join("Developer/site");
    std::fs::create_dir_all(&proj).unwrap();
    std::fs::write(proj.join("package.json"), "{}").unwrap();
    write_noise(&proj.join("node_modules/left-pad/index.js"), 20_000);

    let target = CleanTarget::Artifact(ProjectArtifact {
        project_name: "site".into(),
        project_path: proj.clone(),
        artifact_path: proj.join("node_modules"),
        artifact_name: "node_modules".into(),
        project_type_label: "Node.js".into(),
        size_bytes: walker::dir_size(&proj.join("node_modules")),
        last_modified: None,
        days_since_modified: None,
    });
    let trash = HomeTrash::new(home.path().join(".Trash"));
    let report = cleaner::clean_targets(&[target], home.path(), &trash);

    assert_eq!(report.items_trashed, 1);
    assert!(is_empty_dir(&proj.join("node_modules")));
    assert!(proj.join("package.json").exists());
}

#[test]
fn test_missing_target_is_harmless() {
    let home = TempDir::new().unwrap();
    let trash = HomeTrash::new(home.path().join(".Trash"));
    let report = cleaner::clean_targets(
        &[cache_target(&home.path().join("gone"))],
        home.path(),
        &trash,
    );
    assert_eq!(report.items_trashed, 0);
    assert_eq!(report.errors.len(), 1);
}

#[test]
fn test_empty_trash_only_touches_trash() {
    let home = TempDir::new().unwrap();
    let cache = pip_cache(home.path());
    let trash = HomeTrash::new(home.path().join(".Trash"));
    cleaner::clean_targets(&[cache_target(&cache)], home.path(), &trash);
    write_noise(&home.path().join("Documents/notes.txt"), 1_000);

    let report = cleaner::empty_trash(trash.location(), home.path());

    assert_eq!(report.items_trashed, 3);
    assert!(report.recovered_bytes > 0);
    assert!(is_empty_dir(trash.location()));
    assert!(cache.is_dir());
    assert!(home.path().join("Documents/notes.txt").exists());
}

#[test]
fn test_parallel_cleanups_keep_every_same_named_item() {
    let home = TempDir::new().unwrap();
    let trash = std::sync::Arc::new(HomeTrash::new(home.path().join(".Trash")));
    let caches: Vec<PathBuf> = (0..6)
        .map(|i| {
            let cache = home.path().join(format!("Library/Caches/tool{}", i));
            write_noise(&cache.join("index/data"), 4_096 + i);
            write_noise(&cache.join("lock"), 64 + i);
            cache
        })
        .collect();
    let barrier = std::sync::Arc::new(std::sync::Barrier::new(caches.len()));

    let handles: Vec<_> = caches
        .iter()
        .map(|cache| {
            let target = cache_target(cache);
            let home = home.path().to_path_buf();
            let trash = std::sync::Arc::clone(&trash);
            let barrier = std::sync::Arc::clone(&barrier);
            std::thread::spawn(move || {
                barrier.wait();
                cleaner::clean_targets(&[target], &home, &*trash)
            })
        })
        .collect();
    for handle in handles {
        assert_eq!(handle.join().unwrap().items_failed, 0);
    }

    let mut sizes: Vec<u64> = std::fs::read_dir(trash.location())
        .unwrap()
        .map(|e| e.unwrap().path())
        .filter(|p| p.is_dir())
        .map(|p| std::fs::metadata(p.join("data")).unwrap().len())
        .collect();
    assert_eq!(std::fs::read_dir(trash.location()).unwrap().count(), 12);
    sizes.sort();
    assert_eq!(sizes, (0..6).map(|i| 4_096 + i).collect::<Vec<u64>>());
}

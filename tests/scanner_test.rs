mod common;

use std::path::{Path, PathBuf};
use tempfile::TempDir;
use walkdir::WalkDir;

use common::{write_noise, MB};
use reclaim::common::config::Config;
use reclaim::common::format;
use reclaim::scanner::artifacts::{self, ArtifactQuery};
use reclaim::scanner::disk::FixedVolume;
use reclaim::scanner::targets::RiskTier;
use reclaim::scanner::{run_scan, walker, ScanContext};

fn allocated_sum(root: &Path) -> u64 {
    WalkDir::new(root)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .map(|e| walker::allocated_size(&e.metadata().unwrap()))
        .sum()
}

fn query() -> ArtifactQuery {
    ArtifactQuery {
        max_depth: 5,
        min_bytes: 0,
        limit: 50,
        exclude: Vec::new(),
    }
}

// ─── Format tests ─────────────────────────────────────────────────────────────

#[test]
fn test_format_size_boundaries() {
    assert_eq!(format::format_size(0), "0 B");
    assert_eq!(format::format_size(1023), "1023 B");
    assert_eq!(format::format_size(1024), "1.0 KB");
    assert_eq!(format::format_size(1024 * 1024), "1.00 MB");
    assert!(format::format_size(u64::MAX).contains("TB"));
}

#[test]
fn test_format_path_without_home() {
    let path = Path::new("/tmp/test.txt");
    assert_eq!(format::format_path(path), "/tmp/test.txt");
}

// ─── Size accounting ──────────────────────────────────────────────────────────

#[test]
fn test_dir_size_counts_hidden_files() {
    let dir = TempDir::new().unwrap();
    write_noise(&dir.path().join("visible.bin"), 40_000);
    write_noise(&dir.path().join(".hidden"), 70_000);
    write_noise(&dir.path().join(".cache/nested/blob"), 130_000);

    let size = walker::dir_size(dir.path());
    assert_eq!(size, allocated_sum(dir.path()));
    assert!(size >= 240_000);

    let without_hidden = walker::dir_size(&dir.path().join("visible.bin"));
    assert!(size > without_hidden);
}

#[test]
fn test_dir_size_missing_is_zero() {
    assert_eq!(walker::dir_size(Path::new("/nonexistent/reclaim/path")), 0);
}

#[cfg(unix)]
#[test]
fn test_sparse_file_reports_allocated_blocks() {
    let dir = TempDir::new().unwrap();
    let disk_image = dir.path().join("Docker.raw");
    let f = std::fs::File::create(&disk_image).unwrap();
    f.set_len(2 * 1024 * 1024 * 1024).unwrap();
    drop(f);

    let size = walker::dir_size(dir.path());
    assert!(size < MB as u64, "sparse file counted as {} bytes", size);
}

#[cfg(unix)]
#[test]
fn test_symlinks_are_not_followed() {
    let dir = TempDir::new().unwrap();
    let outside = TempDir::new().unwrap();
    write_noise(&outside.path().join("big"), 200_000);
    std::os::unix::fs::symlink(outside.path(), dir.path().join("link")).unwrap();
    assert_eq!(walker::dir_size(dir.path()), 0);
}

// ─── Large files ──────────────────────────────────────────────────────────────

fn large_file_tree() -> TempDir {
    let dir = TempDir::new().unwrap();
    let root = dir.path();
    write_noise(&root.join("a.mov"), 300_000);
    write_noise(&root.join("x/b.iso"), 200_000);
    write_noise(&root.join("x/y/c.zip"), 100_000);
    write_noise(&root.join("x/y/z/too-deep.dmg"), 400_000);
    write_noise(&root.join("small.txt"), 8_000);
    write_noise(&root.join(".hidden.bin"), 500_000);
    write_noise(&root.join(".secret/inside.bin"), 500_000);
    dir
}

#[test]
fn test_large_files_threshold_depth_and_order() {
    let dir = large_file_tree();
    let roots = vec![dir.path().to_path_buf()];

    let found = walker::find_large_files(&roots, 50_000, 3, 20, &[]);
    let names: Vec<_> = found.iter().map(|f| f.name.as_str()).collect();
    assert_eq!(names, vec!["a.mov", "b.iso", "c.zip"]);
    assert!(found.iter().all(|f| f.size_bytes >= 50_000));
}

#[test]
fn test_large_files_cap() {
    let dir = large_file_tree();
    let roots = vec![dir.path().to_path_buf()];
    let found = walker::find_large_files(&roots, 50_000, 3, 2, &[]);
    assert_eq!(found.len(), 2);
    assert_eq!(found[0].name, "a.mov");
}

#[test]
fn test_large_files_exclusions_and_missing_roots() {
    let dir = large_file_tree();
    let roots = vec![dir.path().to_path_buf(), PathBuf::from("/nonexistent/reclaim")];
    let found = walker::find_large_files(&roots, 50_000, 3, 20, &["/x".to_string()]);
    let names: Vec<_> = found.iter().map(|f| f.name.as_str()).collect();
    assert_eq!(names, vec!["a.mov"]);
}

// ─── Artifact detection ───────────────────────────────────────────────────────

#[test]
fn test_project_reported_once_and_not_entered() {
    let dir = TempDir::new().unwrap();
    let proj = dir.path().join("apps/server");
    std::fs::write(touch_dir(&proj).join("Cargo.toml"), "[package]").unwrap();
    write_noise(&proj.join("target/debug/server"), 120_000);

    // Nested projects below a project root are never visited
    let nested = proj.join("tools/gen");
    std::fs::write(touch_dir(&nested).join("package.json"), "{}").unwrap();
    write_noise(&nested.join("node_modules/x/index.js"), 50_000);

    let found = artifacts::scan_roots(&[dir.path().to_path_buf()], &query(), chrono::Utc::now());
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].project_name, "server");
    assert_eq!(found[0].artifact_name, "target");
    assert_eq!(found[0].project_type_label, "Rust");
    assert_eq!(found[0].size_bytes, walker::dir_size(&proj.join("target")));
}

#[test]
fn test_marker_only_keeps_recursing() {
    let dir = TempDir::new().unwrap();
    let workspace = dir.path().join("monorepo");
    std::fs::write(touch_dir(&workspace).join("package.json"), "{}").unwrap();

    let web = workspace.join("packages/web");
    std::fs::write(touch_dir(&web).join("package.json"), "{}").unwrap();
    write_noise(&web.join("node_modules/react/index.js"), 60_000);

    let found = artifacts::scan_roots(&[dir.path().to_path_buf()], &query(), chrono::Utc::now());
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].project_path, web);
    assert_eq!(found[0].project_type_label, "Node.js");
}

#[test]
fn test_denylisted_dirs_are_skipped() {
    let dir = TempDir::new().unwrap();
    let hidden = dir.path().join("node_modules/pkg");
    std::fs::write(touch_dir(&hidden).join("Cargo.toml"), "").unwrap();
    write_noise(&hidden.join("target/out"), 30_000);
    let dotted = dir.path().join(".config/tool");
    std::fs::write(touch_dir(&dotted).join("Cargo.toml"), "").unwrap();
    write_noise(&dotted.join("target/out"), 30_000);

    let found = artifacts::scan_roots(&[dir.path().to_path_buf()], &query(), chrono::Utc::now());
    assert!(found.is_empty());
}

#[test]
fn test_artifact_min_size_and_limit() {
    let dir = TempDir::new().unwrap();
    for (name, len) in [("one", 40_000), ("two", 90_000), ("three", 150_000)] {
        let proj = dir.path().join(name);
        std::fs::write(touch_dir(&proj).join("go.mod"), "module x").unwrap();
        write_noise(&proj.join("vendor/lib.go"), len);
    }
    let q = ArtifactQuery {
        min_bytes: 60_000,
        limit: 1,
        ..query()
    };
    let found = artifacts::scan_roots(&[dir.path().to_path_buf()], &q, chrono::Utc::now());
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].project_name, "three");
}

fn touch_dir(path: &Path) -> &Path {
    std::fs::create_dir_all(path).unwrap();
    path
}

// ─── Full pass ────────────────────────────────────────────────────────────────

#[test]
fn test_scan_pass_totals() {
    let home = TempDir::new().unwrap();
    write_noise(&home.path().join(".npm/_cacache/content/a"), 2 * MB);
    write_noise(&home.path().join(".colima/default/disk.img"), 3 * MB);
    write_noise(&home.path().join("Library/Caches/Yarn/v6/tiny"), MB / 2);
    let trash = home.path().join(".Trash");
    write_noise(&trash.join("old.zip"), MB);

    let config = Config::default();
    let volume = FixedVolume {
        total_bytes: 1000 * MB as u64,
        free_bytes: 250 * MB as u64,
    };
    let result = run_scan(&ScanContext {
        home: home.path(),
        system_root: home.path(),
        config: &config,
        volume: &volume,
        trash_dir: &trash,
    });

    let names: Vec<_> = result.dev_caches.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, vec!["Colima VMs", "npm Cache"]);

    let npm = walker::dir_size(&home.path().join(".npm/_cacache"));
    let colima = walker::dir_size(&home.path().join(".colima"));
    assert_eq!(result.trash_bytes, walker::dir_size(&trash));
    assert_eq!(result.cleanable.total, npm + colima + result.trash_bytes);
    assert_eq!(result.cleanable.safe, npm + result.trash_bytes);
    assert_eq!(result.cleanable.risky, colima);
    assert_eq!(result.dev_caches[0].risk_tier, RiskTier::Risky);
    assert_eq!(result.totals.used_percent, 75);
    assert!(result.inaccessible_paths.is_empty());
}

#[test]
fn test_scan_pass_uses_configured_staleness() {
    let home = TempDir::new().unwrap();
    let trash = home.path().join(".Trash");
    let volume = FixedVolume {
        total_bytes: 1000 * MB as u64,
        free_bytes: 250 * MB as u64,
    };
    for stale_days in [7, 90] {
        let config = Config {
            stale_days,
            ..Config::default()
        };
        let result = run_scan(&ScanContext {
            home: home.path(),
            system_root: home.path(),
            config: &config,
            volume: &volume,
            trash_dir: &trash,
        });
        assert_eq!(result.stale_after_days, stale_days);
    }
}

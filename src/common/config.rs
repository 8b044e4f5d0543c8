use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::scanner::targets::DEFAULT_STALE_DAYS;

/// Global reclaim configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Minimum allocated size for a file to count as large
    #[serde(default = "default_large_file_threshold")]
    pub large_file_threshold_bytes: u64,

    /// How many directory levels below each root the large-file search visits
    #[serde(default = "default_large_file_max_depth")]
    pub large_file_max_depth: usize,

    /// Maximum number of large files reported
    #[serde(default = "default_large_file_limit")]
    pub large_file_limit: usize,

    /// Dev caches at or below this size are not reported
    #[serde(default = "default_cache_min_bytes")]
    pub cache_min_bytes: u64,

    /// Project artifacts at or below this size are not reported
    #[serde(default = "default_artifact_min_bytes")]
    pub artifact_min_bytes: u64,

    /// Maximum number of project artifacts reported
    #[serde(default = "default_artifact_limit")]
    pub artifact_limit: usize,

    /// How deep the artifact scanner descends below each search root
    #[serde(default = "default_artifact_max_depth")]
    pub artifact_max_depth: usize,

    /// Artifacts untouched for longer than this are stale
    #[serde(default = "default_stale_days")]
    pub stale_days: u32,

    /// Minimum spacing between two recorded usage snapshots
    #[serde(default = "default_snapshot_interval")]
    pub snapshot_interval_secs: i64,

    /// Usage history older than this is pruned
    #[serde(default = "default_retention_days")]
    pub history_retention_days: i64,

    /// How long the "recovered" banner stays visible after a cleanup
    #[serde(default = "default_banner_secs")]
    pub recovered_banner_secs: i64,

    /// Override for the trash location
    #[serde(default)]
    pub trash_dir: Option<PathBuf>,

    /// Paths to exclude from the large-file and artifact scans
    #[serde(default)]
    pub exclude_paths: Vec<String>,

    /// Output format preference
    #[serde(default)]
    pub output_format: OutputFormat,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    #[default]
    Human,
    Json,
    Quiet,
}

fn default_large_file_threshold() -> u64 {
    100_000_000
}
fn default_large_file_max_depth() -> usize {
    3
}
fn default_large_file_limit() -> usize {
    20
}
fn default_cache_min_bytes() -> u64 {
    1024 * 1024
}
fn default_artifact_min_bytes() -> u64 {
    10 * 1024 * 1024
}
fn default_artifact_limit() -> usize {
    50
}
fn default_artifact_max_depth() -> usize {
    5
}
fn default_stale_days() -> u32 {
    DEFAULT_STALE_DAYS
}
fn default_snapshot_interval() -> i64 {
    3600
}
fn default_retention_days() -> i64 {
    90
}
fn default_banner_secs() -> i64 {
    5
}

impl Default for Config {
    fn default() -> Self {
        Self {
            large_file_threshold_bytes: default_large_file_threshold(),
            large_file_max_depth: default_large_file_max_depth(),
            large_file_limit: default_large_file_limit(),
            cache_min_bytes: default_cache_min_bytes(),
            artifact_min_bytes: default_artifact_min_bytes(),
            artifact_limit: default_artifact_limit(),
            artifact_max_depth: default_artifact_max_depth(),
            stale_days: default_stale_days(),
            snapshot_interval_secs: default_snapshot_interval(),
            history_retention_days: default_retention_days(),
            recovered_banner_secs: default_banner_secs(),
            trash_dir: None,
            exclude_paths: Vec::new(),
            output_format: OutputFormat::Human,
        }
    }
}

impl Config {
    /// Get the reclaim data directory (~/.reclaim)
    pub fn data_dir() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("/tmp"))
            .join(".reclaim")
    }

    /// Get the config file path
    pub fn config_path() -> PathBuf {
        Self::data_dir().join("config.toml")
    }

    /// Get the persisted state file (savings, history, onboarding)
    pub fn state_path() -> PathBuf {
        Self::data_dir().join("state.json")
    }

    /// Get the logs directory
    pub fn logs_dir() -> PathBuf {
        Self::data_dir().join("logs")
    }

    /// Load config from file, or use defaults if it does not exist
    pub fn load() -> Result<Self> {
        let path = Self::config_path();
        if path.exists() {
            let contents = std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read config: {}", path.display()))?;
            let config: Config = toml::from_str(&contents)
                .with_context(|| format!("Failed to parse config: {}", path.display()))?;
            Ok(config)
        } else {
            Ok(Config::default())
        }
    }

    /// Save config to file
    pub fn save(&self) -> Result<()> {
        let path = Self::config_path();
        let dir = Self::data_dir();
        std::fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create config dir: {}", dir.display()))?;
        let contents = toml::to_string_pretty(self).context("Failed to serialize config")?;
        std::fs::write(&path, contents)
            .with_context(|| format!("Failed to write config: {}", path.display()))?;
        Ok(())
    }

    /// Initialize all reclaim directories
    pub fn init_dirs() -> Result<()> {
        for dir in [Self::data_dir(), Self::logs_dir()] {
            std::fs::create_dir_all(&dir)
                .with_context(|| format!("Failed to create directory: {}", dir.display()))?;
        }
        Ok(())
    }

    /// Resolve the trash location for a given home directory
    pub fn trash_dir_for(&self, home: &Path) -> PathBuf {
        if let Some(dir) = &self.trash_dir {
            return dir.clone();
        }
        if cfg!(target_os = "macos") {
            return home.join(".Trash");
        }
        let data_home = std::env::var_os("XDG_DATA_HOME")
            .map(PathBuf::from)
            .filter(|p| p.is_absolute())
            .unwrap_or_else(|| home.join(".local/share"));
        data_home.join("Trash/files")
    }

    /// Check if a path should be excluded
    pub fn is_excluded(&self, path: &Path) -> bool {
        let path_str = path.display().to_string();
        self.exclude_paths.iter().any(|p| path_str.contains(p))
    }
}

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

// ─── Core types ───────────────────────────────────────────────────────────────

/// Risk of removing a cache, fixed per catalog row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskTier {
    /// Rebuildable with a standard tool command
    Safe,
    /// May require a large re-download
    Caution,
    /// May hold irreplaceable user data
    Risky,
}

impl RiskTier {
    pub fn description(self) -> &'static str {
        match self {
            RiskTier::Safe => "Safe: can be rebuilt with a command",
            RiskTier::Caution => "Caution: may need a large re-download",
            RiskTier::Risky => "Risky: may contain irreplaceable data",
        }
    }
}

impl std::fmt::Display for RiskTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RiskTier::Safe => write!(f, "safe"),
            RiskTier::Caution => write!(f, "caution"),
            RiskTier::Risky => write!(f, "risky"),
        }
    }
}

/// One user-facing storage bucket
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiskCategory {
    pub name: String,
    pub icon_key: String,
    pub size_bytes: u64,
}

/// A known tool cache that was found on disk
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DevCache {
    pub name: String,
    pub icon_key: String,
    pub path: PathBuf,
    pub size_bytes: u64,
    pub last_modified: Option<DateTime<Utc>>,
    pub days_since_modified: Option<i64>,
    pub suggestion: Option<String>,
    pub risk_tier: RiskTier,
    pub description: String,
    /// Secondary breakdown, e.g. the largest projects in a shared build cache
    pub detail: Option<String>,
}

impl DevCache {
    pub fn id(&self) -> ItemId {
        ItemId::cache(&self.path)
    }
}

/// A regular file above the large-file threshold
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LargeFile {
    pub name: String,
    pub path: PathBuf,
    pub size_bytes: u64,
}

/// Default age in days past which an untouched artifact is stale
pub const DEFAULT_STALE_DAYS: u32 = 30;

fn default_stale_days() -> u32 {
    DEFAULT_STALE_DAYS
}

/// A build-output directory belonging to a recognized project
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectArtifact {
    pub project_name: String,
    pub project_path: PathBuf,
    pub artifact_path: PathBuf,
    pub artifact_name: String,
    pub project_type_label: String,
    pub size_bytes: u64,
    pub last_modified: Option<DateTime<Utc>>,
    pub days_since_modified: Option<i64>,
}

impl ProjectArtifact {
    pub fn id(&self) -> ItemId {
        ItemId::artifact(&self.artifact_path)
    }

    /// Untouched for more than `stale_days` days
    pub fn is_stale(&self, stale_days: u32) -> bool {
        self.days_since_modified
            .map(|d| d > i64::from(stale_days))
            .unwrap_or(false)
    }
}

/// Stable handle for a cleanable item, valid across scans
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "path", rename_all = "snake_case")]
pub enum ItemId {
    Cache(PathBuf),
    Artifact(PathBuf),
}

impl ItemId {
    pub fn cache(path: &Path) -> Self {
        ItemId::Cache(path.to_path_buf())
    }

    pub fn artifact(path: &Path) -> Self {
        ItemId::Artifact(path.to_path_buf())
    }
}

/// Something the cleanup engine can empty into the trash
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CleanTarget {
    Cache(DevCache),
    Artifact(ProjectArtifact),
}

impl CleanTarget {
    pub fn path(&self) -> &Path {
        match self {
            CleanTarget::Cache(c) => &c.path,
            CleanTarget::Artifact(a) => &a.artifact_path,
        }
    }

    pub fn size_bytes(&self) -> u64 {
        match self {
            CleanTarget::Cache(c) => c.size_bytes,
            CleanTarget::Artifact(a) => a.size_bytes,
        }
    }

    pub fn label(&self) -> String {
        match self {
            CleanTarget::Cache(c) => c.name.clone(),
            CleanTarget::Artifact(a) => format!("{}/{}", a.project_name, a.artifact_name),
        }
    }
}

/// Capacity of the scanned volume
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiskTotals {
    pub total_bytes: u64,
    pub used_bytes: u64,
    pub free_bytes: u64,
    pub used_percent: u8,
}

impl DiskTotals {
    pub fn from_capacity(total_bytes: u64, free_bytes: u64) -> Self {
        let free_bytes = free_bytes.min(total_bytes);
        let used_bytes = total_bytes - free_bytes;
        let used_percent = if total_bytes > 0 {
            ((used_bytes as f64 / total_bytes as f64) * 100.0).floor() as u8
        } else {
            0
        };
        Self {
            total_bytes,
            used_bytes,
            free_bytes,
            used_percent,
        }
    }

    pub fn used_fraction(&self) -> f64 {
        if self.total_bytes == 0 {
            0.0
        } else {
            self.used_bytes as f64 / self.total_bytes as f64
        }
    }
}

/// Cleanable totals split by risk tier
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cleanable {
    /// All dev caches plus the trash
    pub total: u64,
    /// Non-risky dev caches plus the trash
    pub safe: u64,
    /// Risky dev caches only
    pub risky: u64,
    /// Detected project artifacts (not part of the totals above)
    pub artifacts: u64,
}

impl Cleanable {
    pub fn compute(caches: &[DevCache], artifacts: &[ProjectArtifact], trash_bytes: u64) -> Self {
        let dev_total: u64 = caches.iter().map(|c| c.size_bytes).sum();
        let risky: u64 = caches
            .iter()
            .filter(|c| c.risk_tier == RiskTier::Risky)
            .map(|c| c.size_bytes)
            .sum();
        Self {
            total: dev_total + trash_bytes,
            safe: dev_total - risky + trash_bytes,
            risky,
            artifacts: artifacts.iter().map(|a| a.size_bytes).sum(),
        }
    }
}

/// Complete result of one scan pass. Immutable once published.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanResult {
    /// When the scan completed
    pub scanned_at: DateTime<Utc>,

    /// How long the scan took in seconds
    pub duration_secs: f64,

    pub totals: DiskTotals,

    /// Sorted by size descending
    pub categories: Vec<DiskCategory>,

    /// Sorted by size descending
    pub dev_caches: Vec<DevCache>,

    /// Sorted by size descending, capped
    pub large_files: Vec<LargeFile>,

    /// Sorted by size descending, capped
    pub artifacts: Vec<ProjectArtifact>,

    /// Staleness cutoff the artifacts were judged against
    #[serde(default = "default_stale_days")]
    pub stale_after_days: u32,

    pub trash_bytes: u64,

    pub cleanable: Cleanable,

    /// Catalog entries whose path exists but cannot be read
    pub inaccessible_paths: Vec<String>,

    /// Non-fatal errors encountered during the scan
    pub errors: Vec<String>,
}

impl ScanResult {
    pub fn empty() -> Self {
        Self {
            scanned_at: Utc::now(),
            duration_secs: 0.0,
            totals: DiskTotals::default(),
            categories: Vec::new(),
            dev_caches: Vec::new(),
            large_files: Vec::new(),
            artifacts: Vec::new(),
            stale_after_days: DEFAULT_STALE_DAYS,
            trash_bytes: 0,
            cleanable: Cleanable::default(),
            inaccessible_paths: Vec::new(),
            errors: Vec::new(),
        }
    }

    /// Recalculate cleanable totals from the item lists
    pub fn recalculate(&mut self) {
        self.cleanable = Cleanable::compute(&self.dev_caches, &self.artifacts, self.trash_bytes);
    }

    /// Dev caches whose tier satisfies the predicate
    pub fn caches_where(&self, pred: impl Fn(RiskTier) -> bool) -> Vec<&DevCache> {
        self.dev_caches.iter().filter(|c| pred(c.risk_tier)).collect()
    }

    pub fn stale_artifacts(&self) -> Vec<&ProjectArtifact> {
        self.artifacts
            .iter()
            .filter(|a| a.is_stale(self.stale_after_days))
            .collect()
    }

    /// Resolve item ids against this result. Ids not present are ignored.
    pub fn resolve(&self, ids: &HashSet<ItemId>) -> Vec<CleanTarget> {
        let caches = self
            .dev_caches
            .iter()
            .filter(|c| ids.contains(&c.id()))
            .cloned()
            .map(CleanTarget::Cache);
        let artifacts = self
            .artifacts
            .iter()
            .filter(|a| ids.contains(&a.id()))
            .cloned()
            .map(CleanTarget::Artifact);
        caches.chain(artifacts).collect()
    }
}

/// Whole days between two instants, floored at zero
pub fn days_between(earlier: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    (now - earlier).num_days().max(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cache(name: &str, size: u64, tier: RiskTier) -> DevCache {
        DevCache {
            name: name.into(),
            icon_key: "box".into(),
            path: PathBuf::from(format!("/tmp/{}", name)),
            size_bytes: size,
            last_modified: None,
            days_since_modified: None,
            suggestion: None,
            risk_tier: tier,
            description: tier.description().into(),
            detail: None,
        }
    }

    #[test]
    fn test_cleanable_split() {
        let caches = vec![
            cache("a", 100, RiskTier::Safe),
            cache("b", 200, RiskTier::Caution),
            cache("c", 400, RiskTier::Risky),
        ];
        let c = Cleanable::compute(&caches, &[], 50);
        assert_eq!(c.total, 750);
        assert_eq!(c.safe, 350);
        assert_eq!(c.risky, 400);
    }

    #[test]
    fn test_disk_totals_percent_floors() {
        let t = DiskTotals::from_capacity(1000, 101);
        assert_eq!(t.used_bytes, 899);
        assert_eq!(t.used_percent, 89);
        assert_eq!(DiskTotals::from_capacity(0, 0).used_percent, 0);
    }

    #[test]
    fn test_resolve_ignores_unknown_ids() {
        let mut result = ScanResult::empty();
        result.dev_caches.push(cache("pip", 10, RiskTier::Safe));
        let mut ids = HashSet::new();
        ids.insert(ItemId::cache(Path::new("/tmp/pip")));
        ids.insert(ItemId::artifact(Path::new("/tmp/gone/target")));
        let targets = result.resolve(&ids);
        assert_eq!(targets.len(), 1);
        assert_eq!(targets[0].path(), Path::new("/tmp/pip"));
    }

    #[test]
    fn test_item_id_json_shape() {
        let id = ItemId::cache(Path::new("/tmp/pip"));
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, r#"{"kind":"cache","path":"/tmp/pip"}"#);
    }

    #[test]
    fn test_artifact_staleness() {
        let mut a = ProjectArtifact {
            project_name: "app".into(),
            project_path: PathBuf::from("/p/app"),
            artifact_path: PathBuf::from("/p/app/target"),
            artifact_name: "target".into(),
            project_type_label: "Rust".into(),
            size_bytes: 1,
            last_modified: None,
            days_since_modified: Some(30),
        };
        assert!(!a.is_stale(DEFAULT_STALE_DAYS));
        a.days_since_modified = Some(31);
        assert!(a.is_stale(DEFAULT_STALE_DAYS));
        assert!(!a.is_stale(60));
        a.days_since_modified = None;
        assert!(!a.is_stale(0));
    }

    #[test]
    fn test_stale_count_follows_result_cutoff() {
        let artifact = |days| ProjectArtifact {
            project_name: "app".into(),
            project_path: PathBuf::from("/p/app"),
            artifact_path: PathBuf::from(format!("/p/app/target-{}", days)),
            artifact_name: "target".into(),
            project_type_label: "Rust".into(),
            size_bytes: 1,
            last_modified: None,
            days_since_modified: Some(days),
        };
        let mut result = ScanResult::empty();
        result.artifacts = vec![artifact(3), artifact(10), artifact(45)];
        assert_eq!(result.stale_artifacts().len(), 1);
        result.stale_after_days = 7;
        assert_eq!(result.stale_artifacts().len(), 2);
    }

    #[test]
    fn test_older_results_default_the_cutoff() {
        let mut json = serde_json::to_value(ScanResult::empty()).unwrap();
        json.as_object_mut().unwrap().remove("stale_after_days");
        let result: ScanResult = serde_json::from_value(json).unwrap();
        assert_eq!(result.stale_after_days, DEFAULT_STALE_DAYS);
    }
}

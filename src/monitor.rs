//! The engine facade a host talks to.
//!
//! A [`Monitor`] owns the injected ports (store, trash, volume probe,
//! notifier), runs scans and cleanups on worker threads, and publishes an
//! immutable [`ScanResult`] plus derived state. Hosts either poll
//! [`Monitor::snapshot`] or drain the channel from [`Monitor::subscribe`].

use chrono::Utc;
use serde::Serialize;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::thread::{self, JoinHandle};
use tracing::{debug, info, warn};

use crate::cleaner::{
    self, savings, CleanReport, HomeTrash, RecoveredBanner, SystemTrash, TrashBin,
};
use crate::common::config::Config;
use crate::common::reveal;
use crate::forecast::{self, alerts, Alert, ForecastSummary, LogNotifier, Notifier, PermissionState, UsageHistory};
use crate::scanner::disk::{StatvfsProbe, VolumeProbe};
use crate::scanner::targets::{CleanTarget, DiskTotals, ItemId, RiskTier, ScanResult};
use crate::scanner::{self, ScanContext, ScanGuard, ScanOrchestrator};
use crate::store::{self, FileStore, KeyValueStore, ONBOARDING_KEY};

/// Something the host may want to react to
#[derive(Debug, Clone)]
pub enum MonitorEvent {
    ScanStarted,
    ScanFinished(Arc<ScanResult>),
    /// A cleanup finished and this many bytes were counted as recovered
    Recovered { bytes: u64 },
    Alert(Alert),
}

/// Everything a host renders, read in one consistent piece
#[derive(Debug, Clone, Serialize)]
pub struct MonitorSnapshot {
    pub scan: Option<ScanResult>,
    pub is_scanning: bool,
    pub forecast: ForecastSummary,
    pub total_saved: u64,
    pub last_cleaned: u64,
    pub show_recovered_banner: bool,
    pub is_first_launch: bool,
    pub notification_permission: PermissionState,
}

#[derive(Debug, Default)]
struct State {
    result: Option<Arc<ScanResult>>,
    forecast: ForecastSummary,
    total_saved: u64,
    banner: Option<RecoveredBanner>,
    last_threshold: u8,
    permission: PermissionState,
}

struct Inner {
    home: PathBuf,
    system_root: PathBuf,
    config: Config,
    store: Arc<dyn KeyValueStore>,
    trash: Arc<dyn TrashBin>,
    volume: Arc<dyn VolumeProbe>,
    notifier: Arc<dyn Notifier>,
    orchestrator: ScanOrchestrator,
    state: RwLock<State>,
    subscribers: Mutex<Vec<Sender<MonitorEvent>>>,
    /// Serializes read-modify-write of persisted savings and history
    persist: Mutex<()>,
    /// Held by a cleanup from its first move until its savings are recorded
    cleanup: Mutex<()>,
    /// A re-scan was asked for while another scan held the guard
    rescan_pending: AtomicBool,
}

/// Builder for [`Monitor`]; every port has a production default
pub struct MonitorBuilder {
    home: PathBuf,
    config: Option<Config>,
    system_root: Option<PathBuf>,
    store: Option<Arc<dyn KeyValueStore>>,
    trash: Option<Arc<dyn TrashBin>>,
    volume: Option<Arc<dyn VolumeProbe>>,
    notifier: Option<Arc<dyn Notifier>>,
}

impl MonitorBuilder {
    pub fn config(mut self, config: Config) -> Self {
        self.config = Some(config);
        self
    }

    /// Root that absolute category paths such as `/Applications` resolve under
    pub fn system_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.system_root = Some(root.into());
        self
    }

    pub fn store(mut self, store: Arc<dyn KeyValueStore>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn trash(mut self, trash: Arc<dyn TrashBin>) -> Self {
        self.trash = Some(trash);
        self
    }

    pub fn volume(mut self, volume: Arc<dyn VolumeProbe>) -> Self {
        self.volume = Some(volume);
        self
    }

    pub fn notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = Some(notifier);
        self
    }

    pub fn build(self) -> Monitor {
        let config = self.config.unwrap_or_default();
        let home = self.home;
        let store: Arc<dyn KeyValueStore> = match self.store {
            Some(store) => store,
            None => Arc::new(FileStore::open(home.join(".reclaim").join("state.json"))),
        };
        let trash: Arc<dyn TrashBin> = match (self.trash, &config.trash_dir) {
            (Some(trash), _) => trash,
            (None, Some(dir)) => Arc::new(HomeTrash::new(dir.clone())),
            (None, None) => Arc::new(SystemTrash::new(config.trash_dir_for(&home))),
        };
        let volume: Arc<dyn VolumeProbe> = match self.volume {
            Some(volume) => volume,
            None => Arc::new(StatvfsProbe::default()),
        };
        let notifier: Arc<dyn Notifier> = match self.notifier {
            Some(notifier) => notifier,
            None => Arc::new(LogNotifier),
        };

        let history = UsageHistory::load(&*store);
        let state = State {
            total_saved: savings::load_total(&*store),
            forecast: ForecastSummary {
                history_points: history.len(),
                history_span_days: history.span_days(),
                ..Default::default()
            },
            ..Default::default()
        };

        Monitor {
            inner: Arc::new(Inner {
                system_root: self.system_root.unwrap_or_else(|| PathBuf::from("/")),
                orchestrator: ScanOrchestrator::new(),
                state: RwLock::new(state),
                subscribers: Mutex::new(Vec::new()),
                persist: Mutex::new(()),
                cleanup: Mutex::new(()),
                rescan_pending: AtomicBool::new(false),
                home,
                config,
                store,
                trash,
                volume,
                notifier,
            }),
        }
    }
}

/// Host-facing engine. Cheap to clone; clones share all state.
#[derive(Clone)]
pub struct Monitor {
    inner: Arc<Inner>,
}

impl Monitor {
    pub fn builder(home: impl Into<PathBuf>) -> MonitorBuilder {
        MonitorBuilder {
            home: home.into(),
            config: None,
            system_root: None,
            store: None,
            trash: None,
            volume: None,
            notifier: None,
        }
    }

    pub fn home(&self) -> &Path {
        &self.inner.home
    }

    pub fn config(&self) -> &Config {
        &self.inner.config
    }

    pub fn trash_location(&self) -> &Path {
        self.inner.trash.location()
    }

    // ─── Scanning ────────────────────────────────────────────────────────

    /// Start a scan on a worker thread.
    ///
    /// Returns `None` when a scan is already running; the caller gets that
    /// scan's result through the normal publication path.
    pub fn scan(&self) -> Option<JoinHandle<Arc<ScanResult>>> {
        let guard = self.inner.orchestrator.try_begin()?;
        let inner = Arc::clone(&self.inner);
        Some(thread::spawn(move || inner.scan_and_publish(guard)))
    }

    /// Scan on the calling thread, or `None` if one is already running
    pub fn scan_blocking(&self) -> Option<Arc<ScanResult>> {
        let guard = self.inner.orchestrator.try_begin()?;
        Some(self.inner.scan_and_publish(guard))
    }

    pub fn is_scanning(&self) -> bool {
        self.inner.orchestrator.is_scanning()
    }

    /// The last published result
    pub fn latest(&self) -> Option<Arc<ScanResult>> {
        self.inner.read_state().result.clone()
    }

    // ─── Cleanup ─────────────────────────────────────────────────────────

    pub fn clean_one(&self, target: CleanTarget) -> JoinHandle<CleanReport> {
        self.spawn_cleanup(move |inner| {
            cleaner::clean_targets(&[target], &inner.home, &*inner.trash)
        })
    }

    /// Clean every dev cache in the last result, optionally skipping risky ones
    pub fn clean_by_risk_filter(&self, exclude_risky: bool) -> JoinHandle<CleanReport> {
        let targets = self.targets_by_risk(exclude_risky);
        self.spawn_cleanup(move |inner| {
            cleaner::clean_targets(&targets, &inner.home, &*inner.trash)
        })
    }

    /// Clean the items in `ids` that the last result still contains
    pub fn clean_selection(&self, ids: &HashSet<ItemId>) -> JoinHandle<CleanReport> {
        let targets = self.selection_targets(ids);
        self.spawn_cleanup(move |inner| {
            cleaner::clean_targets(&targets, &inner.home, &*inner.trash)
        })
    }

    /// Permanently remove everything in the trash
    pub fn empty_trash(&self) -> JoinHandle<CleanReport> {
        self.spawn_cleanup(|inner| cleaner::empty_trash(inner.trash.location(), &inner.home))
    }

    /// Dev caches a risk-filtered cleanup would touch
    pub fn targets_by_risk(&self, exclude_risky: bool) -> Vec<CleanTarget> {
        self.latest()
            .map(|result| {
                result
                    .caches_where(|tier| !(exclude_risky && tier == RiskTier::Risky))
                    .into_iter()
                    .cloned()
                    .map(CleanTarget::Cache)
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Items a selection cleanup would touch; ids not in the last result are dropped
    pub fn selection_targets(&self, ids: &HashSet<ItemId>) -> Vec<CleanTarget> {
        self.latest()
            .map(|result| result.resolve(ids))
            .unwrap_or_default()
    }

    /// Run `work` on a worker thread. Cleanups run one at a time; each is
    /// followed by a re-scan.
    fn spawn_cleanup<F>(&self, work: F) -> JoinHandle<CleanReport>
    where
        F: FnOnce(&Inner) -> CleanReport + Send + 'static,
    {
        let inner = Arc::clone(&self.inner);
        thread::spawn(move || {
            let report = {
                let _cleanup = inner.lock_cleanup();
                let report = work(&inner);
                inner.finish_cleanup(&report);
                report
            };
            inner.rescan();
            report
        })
    }

    // ─── Host actions ────────────────────────────────────────────────────

    pub fn reveal_in_file_browser(&self, path: &Path) -> bool {
        match reveal::reveal_in_file_browser(path) {
            Ok(()) => true,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "reveal failed");
                false
            }
        }
    }

    pub fn mark_onboarding_complete(&self) {
        if let Err(e) = store::save(&*self.inner.store, ONBOARDING_KEY, &true) {
            warn!(error = %e, "could not persist onboarding flag");
        }
    }

    pub fn is_first_launch(&self) -> bool {
        !store::load::<bool>(&*self.inner.store, ONBOARDING_KEY).unwrap_or(false)
    }

    // ─── Observation ─────────────────────────────────────────────────────

    pub fn snapshot(&self) -> MonitorSnapshot {
        let now = Utc::now();
        let banner_secs = self.inner.config.recovered_banner_secs;
        let state = self.inner.read_state();
        MonitorSnapshot {
            scan: state.result.as_deref().cloned(),
            is_scanning: self.is_scanning(),
            forecast: state.forecast,
            total_saved: state.total_saved,
            last_cleaned: state.banner.map(|b| b.bytes).unwrap_or(0),
            show_recovered_banner: state
                .banner
                .map(|b| b.is_visible(now, banner_secs))
                .unwrap_or(false),
            is_first_launch: self.is_first_launch(),
            notification_permission: state.permission,
        }
    }

    /// Receive every event published from now on
    pub fn subscribe(&self) -> Receiver<MonitorEvent> {
        let (tx, rx) = mpsc::channel();
        self.inner.lock_subscribers().push(tx);
        rx
    }
}

impl Inner {
    fn context(&self) -> ScanContext<'_> {
        ScanContext {
            home: &self.home,
            system_root: &self.system_root,
            config: &self.config,
            volume: &*self.volume,
            trash_dir: self.trash.location(),
        }
    }

    /// Scan and publish, then run any re-scan requested meanwhile
    fn scan_and_publish(&self, guard: ScanGuard) -> Arc<ScanResult> {
        let result = self.run_guarded(guard);
        self.drain_pending();
        result
    }

    /// The guard is released only after publication
    fn run_guarded(&self, _guard: ScanGuard) -> Arc<ScanResult> {
        self.emit(MonitorEvent::ScanStarted);
        let result = Arc::new(scanner::run_scan(&self.context()));
        self.publish(Arc::clone(&result));
        result
    }

    fn drain_pending(&self) {
        while self.rescan_pending.swap(false, Ordering::SeqCst) {
            match self.orchestrator.try_begin() {
                Some(guard) => {
                    debug!("running deferred re-scan");
                    self.run_guarded(guard);
                }
                None => {
                    self.rescan_pending.store(true, Ordering::SeqCst);
                    // A scan still holding the guard drains the flag when it ends
                    if self.orchestrator.is_scanning() {
                        return;
                    }
                }
            }
        }
    }

    /// Scan now if idle. Otherwise the result in flight may predate the
    /// change, so another scan is queued behind it.
    fn rescan(&self) {
        if let Some(guard) = self.orchestrator.try_begin() {
            self.scan_and_publish(guard);
            return;
        }
        self.rescan_pending.store(true, Ordering::SeqCst);
        // The scan may have finished between the two checks
        if let Some(guard) = self.orchestrator.try_begin() {
            self.rescan_pending.store(false, Ordering::SeqCst);
            self.scan_and_publish(guard);
        } else {
            debug!("re-scan queued behind the scan in flight");
        }
    }

    fn publish(&self, result: Arc<ScanResult>) {
        let totals = result.totals;
        let forecast = self.record_usage(&totals, Utc::now().timestamp());
        let permission = self.notifier.permission();

        let alert = {
            let mut state = self.write_state();
            let (threshold, level) = if totals.total_bytes > 0 {
                alerts::evaluate(totals.used_percent, state.last_threshold)
            } else {
                (state.last_threshold, None)
            };
            state.last_threshold = threshold;
            state.result = Some(Arc::clone(&result));
            state.forecast = forecast;
            state.permission = permission;
            level.map(|l| Alert::new(l, totals.used_percent, result.cleanable.safe))
        };

        if let Some(alert) = alert {
            if permission == PermissionState::Granted {
                self.notifier.deliver(&alert);
            } else {
                debug!(?permission, "alert not delivered, notifications not permitted");
            }
            self.emit(MonitorEvent::Alert(alert));
        }
        self.emit(MonitorEvent::ScanFinished(result));
    }

    fn record_usage(&self, totals: &DiskTotals, now: i64) -> ForecastSummary {
        let _lock = self.lock_persist();
        let mut history = UsageHistory::load(&*self.store);
        if totals.total_bytes > 0 {
            history.record(
                totals.used_bytes,
                now,
                self.config.snapshot_interval_secs,
                self.config.history_retention_days,
            );
        } else {
            history.prune(now, self.config.history_retention_days);
        }
        if let Err(e) = history.save(&*self.store) {
            warn!(error = %e, "could not persist usage history");
        }
        forecast::summarize(&history, totals)
    }

    fn finish_cleanup(&self, report: &CleanReport) {
        let bytes = report.recovered_bytes;
        let total = {
            let _lock = self.lock_persist();
            match savings::record(&*self.store, bytes) {
                Ok(total) => total,
                Err(e) => {
                    warn!(error = %e, "could not persist lifetime savings");
                    self.read_state().total_saved.saturating_add(bytes)
                }
            }
        };

        {
            let mut state = self.write_state();
            state.total_saved = total;
            state.banner = Some(RecoveredBanner::new(bytes, Utc::now()));
        }
        info!(recovered = bytes, lifetime = total, "cleanup recorded");
        self.emit(MonitorEvent::Recovered { bytes });
    }

    fn emit(&self, event: MonitorEvent) {
        self.lock_subscribers()
            .retain(|tx| tx.send(event.clone()).is_ok());
    }

    fn read_state(&self) -> RwLockReadGuard<'_, State> {
        self.state.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write_state(&self) -> RwLockWriteGuard<'_, State> {
        self.state.write().unwrap_or_else(|e| e.into_inner())
    }

    fn lock_subscribers(&self) -> MutexGuard<'_, Vec<Sender<MonitorEvent>>> {
        self.subscribers.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn lock_persist(&self) -> MutexGuard<'_, ()> {
        self.persist.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn lock_cleanup(&self) -> MutexGuard<'_, ()> {
        self.cleanup.lock().unwrap_or_else(|e| e.into_inner())
    }
}

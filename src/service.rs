use crate::collectors::diskstats::DiskStatsCollector;
use crate::collectors::storage::StorageCollector;
use crate::config::{Config, GeneralConfig};
use crate::error::{HealthError, HealthResult};
use crate::listeners::{ListenerHandle, ListenerId, ListenerRegistry};
use crate::models::battery::BatteryInfo;
use crate::models::disk::DiskReport;
use crate::models::snapshot::HealthSnapshot;
use crate::models::storage::StorageReport;
use crate::monitor::{BatteryMonitor, PeriodAdjuster};
use crate::util::report;
use parking_lot::Mutex;
use std::io::{self, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::RecvTimeoutError;
use std::sync::{Arc, Weak};
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tracing::{debug, info, warn};

const DEATH_POLL: Duration = Duration::from_millis(500);

/// Health telemetry service: owns the listener registry and runs the
/// refresh → snapshot → fan-out cycle.
///
/// Constructed once by the process entry point and shared by `Arc` with
/// whatever needs it.
pub struct HealthService {
    registry: ListenerRegistry,
    monitor:  Option<Mutex<Box<dyn BatteryMonitor>>>,
    period:   Option<Arc<dyn PeriodAdjuster>>,
    storage:  StorageCollector,
    disks:    DiskStatsCollector,
    general:  GeneralConfig,
    updating: AtomicBool,
}

impl HealthService {
    /// A service with collectors from `cfg` and no battery monitor. Until one
    /// is added with [`with_monitor`](Self::with_monitor), updates report
    /// [`HealthError::NotInitialized`].
    pub fn new(cfg: &Config) -> Self {
        Self {
            registry: ListenerRegistry::new(),
            monitor:  None,
            period:   None,
            storage:  StorageCollector::from_config(&cfg.storage),
            disks:    DiskStatsCollector::from_config(&cfg.storage),
            general:  cfg.general.clone(),
            updating: AtomicBool::new(false),
        }
    }

    pub fn with_monitor(mut self, mut monitor: Box<dyn BatteryMonitor>) -> Self {
        monitor.init(&self.general);
        self.monitor = Some(Mutex::new(monitor));
        self
    }

    pub fn with_period_adjuster(mut self, period: Arc<dyn PeriodAdjuster>) -> Self {
        self.period = Some(period);
        self
    }

    pub fn with_collectors(mut self, storage: StorageCollector, disks: DiskStatsCollector) -> Self {
        self.storage = storage;
        self.disks = disks;
        self
    }

    pub fn is_initialized(&self) -> bool {
        self.monitor.is_some()
    }

    pub fn registry(&self) -> &ListenerRegistry {
        &self.registry
    }

    // ── Subscriptions ─────────────────────────────────────────────────

    /// Register a listener and immediately run one update cycle so it gets
    /// a current snapshot. A null handle is accepted and does nothing.
    pub fn subscribe(&self, listener: Option<ListenerHandle>) -> HealthResult<()> {
        if listener.is_none() {
            return Ok(());
        }
        self.registry.register(listener);
        self.update()
    }

    pub fn unsubscribe(&self, id: ListenerId) -> HealthResult<()> {
        self.registry.unregister(id)
    }

    // ── Update / notify ───────────────────────────────────────────────

    /// Refresh battery state, adjust the poll period, and push a fresh
    /// snapshot to every listener. The result reflects only the refresh;
    /// listeners that fail delivery are dropped without failing the update.
    pub fn update(&self) -> HealthResult<()> {
        let Some(monitor) = &self.monitor else {
            warn!("update: battery monitor not initialized, skipping");
            return Err(HealthError::NotInitialized);
        };

        if self.updating.swap(true, Ordering::AcqRel) {
            debug!("update cycle overlaps one still in progress");
        }
        let result = self.run_cycle(monitor);
        self.updating.store(false, Ordering::Release);
        result
    }

    pub fn force_update(&self) -> HealthResult<()> {
        self.update()
    }

    fn run_cycle(&self, monitor: &Mutex<Box<dyn BatteryMonitor>>) -> HealthResult<()> {
        let (charger_online, battery) = {
            let mut m = monitor.lock();
            let online = m.refresh().map_err(|e| {
                warn!(error = %e, "battery refresh failed");
                HealthError::Refresh(e)
            })?;
            (online, m.battery_info())
        };

        if let Some(period) = &self.period {
            period.battery_updated(charger_online);
        }

        let snapshot = Arc::new(self.build_snapshot(battery));
        let delivered = self.notify(&snapshot);
        debug!(charger_online, delivered, storage = snapshot.storage.len(), "update cycle complete");
        Ok(())
    }

    /// Fan `snapshot` out to all live listeners. Returns deliveries made.
    pub fn notify(&self, snapshot: &Arc<HealthSnapshot>) -> usize {
        self.registry.notify(snapshot)
    }

    fn build_snapshot(&self, battery: BatteryInfo) -> HealthSnapshot {
        HealthSnapshot::new(battery, self.storage.collect(), self.disks.collect())
    }

    // ── Queries ───────────────────────────────────────────────────────

    /// Current state without notifying anyone. Battery fields come from the
    /// last refresh, storage and disk data are read now.
    pub fn snapshot(&self) -> HealthSnapshot {
        let battery = self.monitor.as_ref()
            .map(|m| m.lock().battery_info())
            .unwrap_or_default();
        self.build_snapshot(battery)
    }

    /// Empty when the platform has no storage telemetry.
    pub fn storage_report(&self) -> StorageReport {
        self.storage.collect()
    }

    pub fn disk_report(&self) -> DiskReport {
        self.disks.collect()
    }

    /// Write monitor state followed by the current snapshot to `out`.
    pub fn dump(&self, out: &mut dyn Write) -> io::Result<()> {
        match &self.monitor {
            Some(m) => m.lock().dump_state(out)?,
            None    => writeln!(out, "battery monitor: not initialized")?,
        }
        writeln!(out, "listeners: {}", self.registry.len())?;
        write!(out, "\nsnapshot -> ")?;
        out.write_all(report::render(&self.snapshot()).as_bytes())?;
        writeln!(out)?;
        out.flush()
    }

    // ── Death watching ────────────────────────────────────────────────

    /// Start a thread that removes listeners as their death notices arrive.
    /// Returns None if the death channel was already taken. The thread exits
    /// once the service is dropped.
    pub fn spawn_death_watcher(self: &Arc<Self>) -> Option<JoinHandle<()>> {
        let rx = self.registry.take_death_receiver()?;
        let service: Weak<Self> = Arc::downgrade(self);
        let spawned = thread::Builder::new()
            .name("death-watch".into())
            .spawn(move || loop {
                match rx.recv_timeout(DEATH_POLL) {
                    Ok(id) => match service.upgrade() {
                        Some(s) => s.registry.on_death(id),
                        None    => break,
                    },
                    Err(RecvTimeoutError::Timeout) => {
                        if service.strong_count() == 0 { break; }
                    }
                    Err(RecvTimeoutError::Disconnected) => break,
                }
            });
        match spawned {
            Ok(handle) => {
                info!("death watcher started");
                Some(handle)
            }
            Err(e) => {
                warn!(error = %e, "cannot start death watcher, deaths are pruned on delivery only");
                None
            }
        }
    }
}

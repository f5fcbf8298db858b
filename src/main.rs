use anyhow::Result;
use clap::Parser;
use healthmon::config::{Config, MonitorKind};
use healthmon::listeners::{DeliveryError, Listener, ListenerId};
use healthmon::monitor::{AcPowerMonitor, PollSchedule};
use healthmon::{HealthError, HealthService, HealthSnapshot};
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "healthmon", about = "Battery and storage-wear health telemetry", version = "0.1")]
struct Cli {
    /// Print a one-shot JSON snapshot and exit
    #[arg(long)]
    json: bool,

    /// Print the diagnostic dump (monitor state and snapshot) and exit
    #[arg(long)]
    report: bool,

    /// Print storage wear records only and exit
    #[arg(long)]
    storage: bool,

    /// Print config file path and current values, then exit
    #[arg(long)]
    config: bool,

    /// Run headless: refresh on the poll schedule and print every snapshot
    #[arg(long)]
    daemon: bool,

    /// Run without a battery monitor, as charger and recovery modes do
    #[arg(long)]
    restricted: bool,

    /// Override the storage host controller directory
    #[arg(long)]
    storage_root: Option<PathBuf>,

    /// Log more (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let mut cfg = Config::load();
    if let Some(root) = &cli.storage_root {
        cfg.storage.root = root.clone();
    }
    if cli.restricted {
        cfg.battery.monitor = MonitorKind::Disabled;
    }

    if cli.config {
        return run_print_config(&cfg);
    }

    let schedule = Arc::new(PollSchedule::new(&cfg.general));
    let service = Arc::new(build_service(&cfg, schedule.clone()));

    if cli.report {
        return run_report(&service);
    }
    if cli.json {
        return run_json_snapshot(&service);
    }
    if cli.storage {
        return run_storage(&service);
    }
    if cli.daemon {
        return run_daemon(service, schedule);
    }
    run_report(&service)
}

fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn build_service(cfg: &Config, schedule: Arc<PollSchedule>) -> HealthService {
    let service = HealthService::new(cfg).with_period_adjuster(schedule);
    match cfg.battery.monitor {
        MonitorKind::Ac       => service.with_monitor(Box::new(AcPowerMonitor::new())),
        MonitorKind::Disabled => service,
    }
}

fn run_json_snapshot(service: &HealthService) -> Result<()> {
    if let Err(e) = service.update() {
        warn!(error = %e, "refresh failed, reporting last known battery state");
    }
    let snapshot = service.snapshot();
    println!("{}", serde_json::to_string_pretty(&snapshot)?);
    Ok(())
}

fn run_report(service: &HealthService) -> Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    service.dump(&mut out)?;
    Ok(())
}

fn run_storage(service: &HealthService) -> Result<()> {
    let report = service.storage_report();
    if !report.is_supported() {
        println!("Storage info: not supported");
        return Ok(());
    }
    for rec in report.iter() {
        println!(
            "{:10} internal={} boot={} eol={} ({}) lifetime={}/{} rev={}",
            rec.attr.name, rec.attr.is_internal, rec.attr.is_boot_device,
            rec.eol, rec.eol_label(), rec.lifetime_a, rec.lifetime_b, rec.version,
        );
    }
    Ok(())
}

fn run_print_config(cfg: &Config) -> Result<()> {
    let path = Config::config_path()
        .map(|p| p.to_string_lossy().into_owned())
        .unwrap_or_else(|| "(unknown)".to_string());
    println!("Config: {}", path);
    println!();
    print!("{}", toml::to_string_pretty(cfg)?);
    Ok(())
}

// ── Daemon ────────────────────────────────────────────────────────────

/// Prints one line per snapshot. Dies when stdout goes away.
struct ConsoleListener {
    id: ListenerId,
}

impl Listener for ConsoleListener {
    fn id(&self) -> ListenerId { self.id }

    fn deliver(&self, s: &Arc<HealthSnapshot>) -> Result<(), DeliveryError> {
        let b = &s.battery;
        let mut out = io::stdout().lock();
        writeln!(
            out,
            "{} charger:{} status:{} health:{} storage:{} disks:{}",
            s.captured_at.format("%H:%M:%S"),
            if b.charger_online() { "online" } else { "offline" },
            b.battery_status.label(),
            b.battery_health.label(),
            if s.storage.is_supported() { s.storage.len().to_string() } else { "unsupported".into() },
            s.disks.len(),
        )
        .and_then(|_| out.flush())
        .map_err(|e| match e.kind() {
            io::ErrorKind::BrokenPipe => DeliveryError::Dead,
            _                         => DeliveryError::Failed(e.to_string()),
        })
    }
}

fn run_daemon(service: Arc<HealthService>, schedule: Arc<PollSchedule>) -> Result<()> {
    info!(
        monitor = service.is_initialized(),
        interval_ms = schedule.interval().as_millis() as u64,
        "healthmon daemon starting"
    );
    let _watcher = service.spawn_death_watcher();

    let console = Arc::new(ConsoleListener { id: ListenerId::next() });
    match service.subscribe(Some(console)) {
        Ok(()) | Err(HealthError::NotInitialized) => {}
        Err(e) => warn!(error = %e, "initial update failed"),
    }

    loop {
        std::thread::sleep(schedule.interval());
        match service.update() {
            Ok(()) | Err(HealthError::NotInitialized) => {}
            Err(e) => warn!(error = %e, "update failed"),
        }
    }
}

use crate::config::GeneralConfig;
use crate::models::battery::{BatteryHealth, BatteryInfo, BatteryStatus};
use anyhow::Result;
use std::io::{self, Write};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Duration;
use tracing::debug;

/// Source of charger and battery state.
pub trait BatteryMonitor: Send {
    fn init(&mut self, cfg: &GeneralConfig);

    /// Re-read the power supplies. Returns whether any charger is online.
    fn refresh(&mut self) -> Result<bool>;

    /// State as of the last refresh.
    fn battery_info(&self) -> BatteryInfo;

    fn dump_state(&self, out: &mut dyn Write) -> io::Result<()>;
}

/// Told about the charger state after every successful refresh, so polling
/// can slow down on battery.
pub trait PeriodAdjuster: Send + Sync {
    fn battery_updated(&self, charger_online: bool);
}

// ── AC power monitor ──────────────────────────────────────────────────

/// Monitor for boards that run from mains power and carry no battery.
#[derive(Debug)]
pub struct AcPowerMonitor {
    info:      BatteryInfo,
    intervals: Option<GeneralConfig>,
    refreshes: u64,
}

impl AcPowerMonitor {
    pub fn new() -> Self {
        Self {
            info: BatteryInfo {
                charger_ac_online:      true,
                max_charging_current:   5_000_000,
                max_charging_voltage:   12_000_000,
                battery_present:        false,
                battery_charge_counter: 1,
                battery_status:         BatteryStatus::Unknown,
                battery_health:         BatteryHealth::Unknown,
                battery_technology:     "AC Power".into(),
                ..BatteryInfo::default()
            },
            intervals: None,
            refreshes: 0,
        }
    }
}

impl Default for AcPowerMonitor {
    fn default() -> Self { Self::new() }
}

impl BatteryMonitor for AcPowerMonitor {
    fn init(&mut self, cfg: &GeneralConfig) {
        self.intervals = Some(cfg.clone());
    }

    fn refresh(&mut self) -> Result<bool> {
        self.refreshes += 1;
        Ok(self.info.charger_online())
    }

    fn battery_info(&self) -> BatteryInfo {
        self.info.clone()
    }

    fn dump_state(&self, out: &mut dyn Write) -> io::Result<()> {
        let i = &self.info;
        writeln!(out, "ac: {} usb: {} wireless: {} current_max: {} voltage_max: {}",
            i.charger_ac_online as u8, i.charger_usb_online as u8, i.charger_wireless_online as u8,
            i.max_charging_current, i.max_charging_voltage)?;
        writeln!(out, "status: {} health: {} present: {}",
            i.battery_status.label(), i.battery_health.label(), i.battery_present as u8)?;
        writeln!(out, "level: {} voltage: {} temp: {}",
            i.battery_level, i.battery_voltage, i.battery_temperature)?;
        writeln!(out, "current now: {} charge counter: {}",
            i.battery_current, i.battery_charge_counter)?;
        match &self.intervals {
            Some(g) => writeln!(out, "chores: fast {}s slow {}s, {} refreshes",
                g.fast_interval_sec, g.slow_interval_sec, self.refreshes)?,
            None    => writeln!(out, "chores: not initialized")?,
        }
        Ok(())
    }
}

// ── Poll schedule ─────────────────────────────────────────────────────

/// Refresh cadence: fast while a charger is online, slow on battery.
#[derive(Debug)]
pub struct PollSchedule {
    fast:           Duration,
    slow:           Option<Duration>,
    current_ms:     AtomicU64,
    charger_online: AtomicBool,
}

impl PollSchedule {
    pub fn new(cfg: &GeneralConfig) -> Self {
        let fast = cfg.fast_interval();
        Self {
            fast,
            slow:           cfg.slow_interval(),
            current_ms:     AtomicU64::new(fast.as_millis() as u64),
            charger_online: AtomicBool::new(true),
        }
    }

    /// Interval to wait before the next refresh.
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.current_ms.load(Ordering::Relaxed))
    }

    pub fn charger_online(&self) -> bool {
        self.charger_online.load(Ordering::Relaxed)
    }
}

impl PeriodAdjuster for PollSchedule {
    fn battery_updated(&self, charger_online: bool) {
        let next = match (charger_online, self.slow) {
            (false, Some(slow)) => slow,
            _                   => self.fast,
        };
        let prev = self.current_ms.swap(next.as_millis() as u64, Ordering::Relaxed);
        self.charger_online.store(charger_online, Ordering::Relaxed);
        if prev != next.as_millis() as u64 {
            debug!(charger_online, interval_ms = next.as_millis() as u64, "poll interval changed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ac_monitor_reports_charger_online() {
        let mut m = AcPowerMonitor::new();
        m.init(&GeneralConfig::default());
        assert!(m.refresh().unwrap());
        let info = m.battery_info();
        assert!(!info.battery_present);
        assert_eq!(info.battery_technology, "AC Power");
        assert_eq!(info.max_charging_voltage, 12_000_000);
    }

    #[test]
    fn ac_monitor_dump_mentions_refreshes() {
        let mut m = AcPowerMonitor::new();
        let mut out = Vec::new();
        m.dump_state(&mut out).unwrap();
        assert!(String::from_utf8_lossy(&out).contains("chores: not initialized"));

        m.init(&GeneralConfig::default());
        m.refresh().unwrap();
        let mut out = Vec::new();
        m.dump_state(&mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.starts_with("ac: 1 usb: 0 wireless: 0"));
        assert!(text.contains("fast 60s slow 600s, 1 refreshes"));
    }

    #[test]
    fn schedule_slows_down_on_battery() {
        let s = PollSchedule::new(&GeneralConfig { fast_interval_sec: 60, slow_interval_sec: 600 });
        assert_eq!(s.interval(), Duration::from_secs(60));

        s.battery_updated(false);
        assert_eq!(s.interval(), Duration::from_secs(600));
        assert!(!s.charger_online());

        s.battery_updated(true);
        assert_eq!(s.interval(), Duration::from_secs(60));
    }

    #[test]
    fn schedule_without_slow_interval_stays_fast() {
        let s = PollSchedule::new(&GeneralConfig { fast_interval_sec: 5, slow_interval_sec: 0 });
        s.battery_updated(false);
        assert_eq!(s.interval(), Duration::from_secs(5));
    }
}

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, warn};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub general: GeneralConfig,

    #[serde(default)]
    pub storage: StorageConfig,

    #[serde(default)]
    pub battery: BatteryConfig,
}

/// Periodic chore intervals, passed to the battery monitor on init and used
/// by the poll schedule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Refresh interval while a charger is online, in seconds
    pub fast_interval_sec: u64,
    /// Refresh interval on battery, in seconds. 0 = always use the fast interval.
    pub slow_interval_sec: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Directory holding one entry per storage host controller
    pub root:        PathBuf,
    /// Name prefix shared by controller and device entries
    pub prefix:      String,
    /// Block device directory used for disk activity counters
    pub block_root:  PathBuf,
    /// Name prefix of the disks whose counters are reported
    pub disk_prefix: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MonitorKind {
    /// Mains-powered board, no battery
    Ac,
    /// No battery monitor: updates report "not initialized"
    #[serde(rename = "none")]
    Disabled,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatteryConfig {
    pub monitor: MonitorKind,
}

// ── Defaults ─────────────────────────────────────────────────────────

impl Default for GeneralConfig {
    fn default() -> Self {
        Self { fast_interval_sec: 60, slow_interval_sec: 600 }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            root:        PathBuf::from("/sys/class/mmc_host"),
            prefix:      "mmc".into(),
            block_root:  PathBuf::from("/sys/block"),
            disk_prefix: "mmcblk".into(),
        }
    }
}

impl Default for BatteryConfig {
    fn default() -> Self {
        Self { monitor: MonitorKind::Ac }
    }
}

impl GeneralConfig {
    pub fn fast_interval(&self) -> Duration {
        Duration::from_secs(self.fast_interval_sec.max(1))
    }

    pub fn slow_interval(&self) -> Option<Duration> {
        match self.slow_interval_sec {
            0 => None,
            s => Some(Duration::from_secs(s)),
        }
    }
}

// ── Load / Save ───────────────────────────────────────────────────────

impl Config {
    pub fn load() -> Self {
        match try_load() {
            Ok(c)  => c,
            Err(e) => {
                debug!(error = %e, "using default config");
                // Write defaults on first run (best-effort)
                if let Err(e) = try_write_defaults() {
                    debug!(error = %e, "could not write default config");
                }
                Config::default()
            }
        }
    }

    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("healthmon").join("healthmon.toml"))
    }

    pub fn from_toml(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }
}

fn try_load() -> Result<Config> {
    let path = Config::config_path().ok_or_else(|| anyhow::anyhow!("no config dir"))?;
    let text = fs::read_to_string(&path)?;
    Config::from_toml(&text).map_err(|e| {
        warn!(path = %path.display(), error = %e, "invalid config");
        e
    })
}

fn try_write_defaults() -> Result<()> {
    let path = Config::config_path().ok_or_else(|| anyhow::anyhow!("no config dir"))?;
    if path.exists() {
        return Ok(());
    }
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let text = toml::to_string_pretty(&Config::default())?;
    fs::write(path, format!("# healthmon configuration\n# Generated on first run, edit freely\n\n{}", text))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_survive_toml_round_trip() {
        let text = toml::to_string_pretty(&Config::default()).unwrap();
        assert_eq!(Config::from_toml(&text).unwrap(), Config::default());
    }

    #[test]
    fn partial_file_fills_in_defaults() {
        let cfg = Config::from_toml(
            "[storage]\nroot = \"/tmp/mmc\"\nprefix = \"mmc\"\nblock_root = \"/sys/block\"\ndisk_prefix = \"mmcblk\"\n\n[battery]\nmonitor = \"none\"\n",
        ).unwrap();
        assert_eq!(cfg.storage.root, PathBuf::from("/tmp/mmc"));
        assert_eq!(cfg.battery.monitor, MonitorKind::Disabled);
        assert_eq!(cfg.general, GeneralConfig::default());
    }

    #[test]
    fn zero_slow_interval_disables_slow_polling() {
        let g = GeneralConfig { fast_interval_sec: 30, slow_interval_sec: 0 };
        assert_eq!(g.fast_interval(), Duration::from_secs(30));
        assert_eq!(g.slow_interval(), None);
    }
}

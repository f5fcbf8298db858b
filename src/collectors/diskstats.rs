use crate::collectors::attr::read_attr;
use crate::config::StorageConfig;
use crate::models::disk::{DiskReport, DiskStats};
use crate::models::storage::StorageAttribute;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Number of counters in a `/sys/block/<dev>/stat` line that we consume.
const STAT_FIELDS: usize = 11;

/// Reads block-layer I/O counters for disks under `/sys/block`.
#[derive(Debug, Clone)]
pub struct DiskStatsCollector {
    block_root: PathBuf,
    prefix:     String,
}

impl DiskStatsCollector {
    pub fn new(block_root: impl Into<PathBuf>, prefix: impl Into<String>) -> Self {
        Self { block_root: block_root.into(), prefix: prefix.into() }
    }

    pub fn from_config(cfg: &StorageConfig) -> Self {
        Self::new(&cfg.block_root, &cfg.disk_prefix)
    }

    /// Never fails; disks whose `stat` file is missing or short are skipped.
    pub fn collect(&self) -> DiskReport {
        let rd = match fs::read_dir(&self.block_root) {
            Ok(rd) => rd,
            Err(e) => {
                debug!(dir = %self.block_root.display(), error = %e, "cannot scan block devices");
                return DiskReport::default();
            }
        };

        let mut names: Vec<String> = rd
            .filter_map(|e| e.ok())
            .map(|e| e.file_name().to_string_lossy().into_owned())
            .filter(|n| n.starts_with(&self.prefix) && !is_hw_partition(n))
            .collect();
        names.sort();

        let disks: Vec<DiskStats> = names.iter()
            .filter_map(|name| read_disk(&self.block_root.join(name), name))
            .collect();
        DiskReport::new(disks)
    }
}

fn read_disk(dir: &Path, name: &str) -> Option<DiskStats> {
    let line = read_attr(&dir.join("stat"))?;
    let mut stats = match parse_stat(&line) {
        Some(s) => s,
        None    => {
            debug!(disk = name, "short stat line, skipping");
            return None;
        }
    };
    let internal = read_attr(&dir.join("removable")).as_deref() == Some("0");
    stats.attr = StorageAttribute {
        name:           name.to_string(),
        is_internal:    internal,
        is_boot_device: false,
    };
    Some(stats)
}

/// Parse the counters of one `stat` line. Malformed counters read as 0;
/// a line with fewer than eleven fields is rejected.
pub fn parse_stat(line: &str) -> Option<DiskStats> {
    let fields: Vec<&str> = line.split_whitespace().collect();
    if fields.len() < STAT_FIELDS { return None; }

    Some(DiskStats {
        attr:          StorageAttribute::default(),
        reads:         parse(fields[0]),
        read_merges:   parse(fields[1]),
        read_sectors:  parse(fields[2]),
        read_ticks:    parse(fields[3]),
        writes:        parse(fields[4]),
        write_merges:  parse(fields[5]),
        write_sectors: parse(fields[6]),
        write_ticks:   parse(fields[7]),
        io_in_flight:  parse(fields[8]),
        io_ticks:      parse(fields[9]),
        io_in_queue:   parse(fields[10]),
    })
}

fn parse(s: &str) -> u64 {
    s.parse().unwrap_or(0)
}

/// eMMC hardware partitions (`mmcblk0boot0`, `mmcblk0rpmb`) show up as
/// separate disks but share the user area's wear.
fn is_hw_partition(name: &str) -> bool {
    name.ends_with("rpmb") || name.rfind("boot").map_or(false, |i| {
        name[i + 4..].chars().all(|c| c.is_ascii_digit())
    })
}

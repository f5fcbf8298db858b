use crate::collectors::attr::{parse_hex, read_attr, read_hex_attr};
use crate::config::StorageConfig;
use crate::models::storage::{StorageAttribute, StorageRecord, StorageReport};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// `type` attribute value reported by eMMC devices.
const INTERNAL_TYPE: &str = "MMC";

const ATTR_NAME:     &str = "name";
const ATTR_TYPE:     &str = "type";
const ATTR_PRE_EOL:  &str = "pre_eol_info";
const ATTR_LIFETIME: &str = "life_time";
const ATTR_REV:      &str = "rev";

/// Collects wear records for storage devices below a host-controller directory
/// such as `/sys/class/mmc_host`.
#[derive(Debug, Clone)]
pub struct StorageCollector {
    root:   PathBuf,
    prefix: String,
}

impl StorageCollector {
    pub fn new(root: impl Into<PathBuf>, prefix: impl Into<String>) -> Self {
        Self { root: root.into(), prefix: prefix.into() }
    }

    pub fn from_config(cfg: &StorageConfig) -> Self {
        Self::new(&cfg.root, &cfg.prefix)
    }

    pub fn root(&self) -> &Path { &self.root }

    /// One record per controller that exposes a matching device. Never fails:
    /// unreadable entries degrade to default fields and an empty report means
    /// the platform has no storage telemetry.
    pub fn collect(&self) -> StorageReport {
        let records: Vec<StorageRecord> = scan_devices(&self.root, &self.prefix)
            .iter()
            .map(|path| read_record(path))
            .collect();
        debug!(root = %self.root.display(), devices = records.len(), "storage scan complete");
        StorageReport::new(records)
    }
}

/// Walk `root/<controller>/<device>` and return one device path per
/// controller: the first device entry (in name order) matching `prefix`.
/// Further devices under the same controller are not reported.
pub fn scan_devices(root: &Path, prefix: &str) -> Vec<PathBuf> {
    let mut devices = Vec::new();
    for controller in matching_entries(root, prefix) {
        if let Some(device) = matching_entries(&controller, prefix).into_iter().next() {
            devices.push(device);
        }
    }
    devices
}

/// Entries of `dir` whose file name starts with `prefix`, sorted by name.
/// An unreadable or missing directory has no entries.
fn matching_entries(dir: &Path, prefix: &str) -> Vec<PathBuf> {
    let rd = match fs::read_dir(dir) {
        Ok(rd) => rd,
        Err(e) => {
            debug!(dir = %dir.display(), error = %e, "cannot scan directory");
            return Vec::new();
        }
    };
    let mut entries: Vec<PathBuf> = rd
        .filter_map(|e| e.ok())
        .filter(|e| e.file_name().to_string_lossy().starts_with(prefix))
        .map(|e| e.path())
        .collect();
    entries.sort();
    entries
}

/// Assemble one record from the attribute files of a device directory.
pub fn read_record(device: &Path) -> StorageRecord {
    let name = read_attr(&device.join(ATTR_NAME)).unwrap_or_default();
    let internal = read_attr(&device.join(ATTR_TYPE)).as_deref() == Some(INTERNAL_TYPE);
    let (lifetime_a, lifetime_b) = read_attr(&device.join(ATTR_LIFETIME))
        .map(|s| parse_lifetime(&s))
        .unwrap_or((0, 0));

    StorageRecord {
        attr: StorageAttribute {
            name,
            is_internal:    internal,
            is_boot_device: internal,
        },
        eol: to_u16(read_hex_attr(&device.join(ATTR_PRE_EOL))),
        lifetime_a,
        lifetime_b,
        version: read_attr(&device.join(ATTR_REV)).unwrap_or_default(),
    }
}

/// Parse a `life_time` value such as `"0x01 0x02"` into its two estimates.
/// Each token that is missing or malformed reads as 0.
pub fn parse_lifetime(text: &str) -> (u16, u16) {
    let mut tokens = text.split_whitespace();
    let mut next = || tokens.next().and_then(parse_hex).map(to_u16).unwrap_or(0);
    let a = next();
    let b = next();
    (a, b)
}

fn to_u16(v: u64) -> u16 {
    u16::try_from(v).unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write_device(root: &Path, controller: &str, device: &str, attrs: &[(&str, &str)]) -> PathBuf {
        let dir = root.join(controller).join(device);
        fs::create_dir_all(&dir).unwrap();
        for (file, value) in attrs {
            fs::write(dir.join(file), format!("{}\n", value)).unwrap();
        }
        dir
    }

    #[test]
    fn missing_root_is_not_supported() {
        let dir = TempDir::new().unwrap();
        let report = StorageCollector::new(dir.path().join("absent"), "mmc").collect();
        assert!(report.is_empty());
        assert!(!report.is_supported());
    }

    #[test]
    fn controllers_without_matching_devices_are_skipped() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("mmc0").join("power")).unwrap();
        fs::create_dir_all(dir.path().join("usb1").join("mmc1:0001")).unwrap();
        let report = StorageCollector::new(dir.path(), "mmc").collect();
        assert!(report.is_empty());
    }

    #[test]
    fn one_record_per_controller_in_scan_order() {
        let dir = TempDir::new().unwrap();
        write_device(dir.path(), "mmc0", "mmc0:0001", &[("name", "DG4016")]);
        write_device(dir.path(), "mmc1", "mmc1:aaaa", &[("name", "SD32G")]);
        write_device(dir.path(), "mmc2", "mmc2:0001", &[("name", "SDIO")]);

        let report = StorageCollector::new(dir.path(), "mmc").collect();
        let names: Vec<&str> = report.iter().map(|r| r.attr.name.as_str()).collect();
        assert_eq!(names, vec!["DG4016", "SD32G", "SDIO"]);
    }

    #[test]
    fn only_first_device_of_a_controller_is_reported() {
        // Extra devices under one controller are dropped on purpose; this pins it.
        let dir = TempDir::new().unwrap();
        write_device(dir.path(), "mmc0", "mmc0:0001", &[("name", "first")]);
        write_device(dir.path(), "mmc0", "mmc0:0002", &[("name", "second")]);

        let report = StorageCollector::new(dir.path(), "mmc").collect();
        assert_eq!(report.len(), 1);
        assert_eq!(report.records[0].attr.name, "first");
    }

    #[test]
    fn full_record_is_assembled() {
        let dir = TempDir::new().unwrap();
        let dev = write_device(dir.path(), "mmc0", "mmc0:0001", &[
            ("name",         "DG4016"),
            ("type",         "MMC"),
            ("pre_eol_info", "0x01"),
            ("life_time",    "0a 0b"),
            ("rev",          "0x8"),
        ]);

        let rec = read_record(&dev);
        assert_eq!(rec.attr.name, "DG4016");
        assert!(rec.attr.is_internal);
        assert!(rec.attr.is_boot_device);
        assert_eq!(rec.eol, 1);
        assert_eq!(rec.eol_label(), "normal");
        assert_eq!((rec.lifetime_a, rec.lifetime_b), (10, 11));
        assert_eq!(rec.version, "0x8");
    }

    #[test]
    fn non_mmc_type_is_neither_internal_nor_boot() {
        let dir = TempDir::new().unwrap();
        let sd = write_device(dir.path(), "mmc1", "mmc1:aaaa", &[("type", "SD")]);
        let rec = read_record(&sd);
        assert!(!rec.attr.is_internal);
        assert!(!rec.attr.is_boot_device);

        let bare = write_device(dir.path(), "mmc2", "mmc2:0001", &[]);
        let rec = read_record(&bare);
        assert!(!rec.attr.is_internal);
        assert!(!rec.attr.is_boot_device);
    }

    #[test]
    fn missing_and_malformed_files_degrade_to_defaults() {
        let dir = TempDir::new().unwrap();
        let dev = write_device(dir.path(), "mmc0", "mmc0:0001", &[
            ("pre_eol_info", "garbage"),
            ("life_time",    ""),
        ]);

        let rec = read_record(&dev);
        assert_eq!(rec, StorageRecord::default());
    }

    #[test]
    fn lifetime_tokens_parse_independently() {
        assert_eq!(parse_lifetime("0a 0b"), (10, 11));
        assert_eq!(parse_lifetime("0x01 0x02"), (1, 2));
        assert_eq!(parse_lifetime("05"), (5, 0));
        assert_eq!(parse_lifetime("xx 03"), (0, 3));
        assert_eq!(parse_lifetime("fffff 01"), (0, 1));
    }
}

use crate::models::storage::StorageAttribute;
use serde::Serialize;

/// Block-layer I/O counters for one disk, in `/sys/block/<dev>/stat` order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DiskStats {
    pub attr:          StorageAttribute,
    pub reads:         u64,
    pub read_merges:   u64,
    pub read_sectors:  u64,
    pub read_ticks:    u64,   // ms
    pub writes:        u64,
    pub write_merges:  u64,
    pub write_sectors: u64,
    pub write_ticks:   u64,   // ms
    pub io_in_flight:  u64,
    pub io_ticks:      u64,   // ms the device had I/O queued
    pub io_in_queue:   u64,   // weighted ms
}

impl DiskStats {
    /// Bytes transferred in each direction, assuming 512-byte sectors.
    pub fn bytes_read(&self) -> u64    { self.read_sectors  * 512 }
    pub fn bytes_written(&self) -> u64 { self.write_sectors * 512 }
}

/// Disk activity for every monitored disk. Empty means not supported.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct DiskReport {
    pub disks: Vec<DiskStats>,
}

impl DiskReport {
    pub fn new(disks: Vec<DiskStats>) -> Self {
        Self { disks }
    }

    pub fn is_supported(&self) -> bool { !self.disks.is_empty() }
    pub fn len(&self) -> usize { self.disks.len() }
    pub fn is_empty(&self) -> bool { self.disks.is_empty() }

    pub fn iter(&self) -> std::slice::Iter<'_, DiskStats> {
        self.disks.iter()
    }
}

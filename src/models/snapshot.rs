use crate::models::battery::BatteryInfo;
use crate::models::disk::DiskReport;
use crate::models::storage::StorageReport;
use chrono::{DateTime, Local};
use serde::Serialize;

/// One fully assembled health reading. Built fresh on every update cycle
/// and handed to listeners behind an `Arc`, never mutated afterwards.
#[derive(Debug, Clone, Serialize)]
pub struct HealthSnapshot {
    pub captured_at: DateTime<Local>,
    pub battery:     BatteryInfo,
    pub storage:     StorageReport,
    pub disks:       DiskReport,
}

impl HealthSnapshot {
    pub fn new(battery: BatteryInfo, storage: StorageReport, disks: DiskReport) -> Self {
        Self { captured_at: Local::now(), battery, storage, disks }
    }
}

use serde::Serialize;

/// Identity and placement of one storage device.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StorageAttribute {
    pub name:           String,
    pub is_internal:    bool,
    pub is_boot_device: bool,
}

/// Wear and lifetime data for one physical storage device.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StorageRecord {
    pub attr:       StorageAttribute,
    /// Pre-end-of-life indicator. 0 = not reported.
    pub eol:        u16,
    /// Wear estimate for the first memory type (vendor buckets of 10%).
    pub lifetime_a: u16,
    /// Wear estimate for the second memory type.
    pub lifetime_b: u16,
    pub version:    String,
}

impl StorageRecord {
    /// Coarse wear label for the pre-EOL indicator (JEDEC eMMC 5.0 encoding).
    pub fn eol_label(&self) -> &'static str {
        match self.eol {
            0 => "undefined",
            1 => "normal",
            2 => "warning",
            3 => "urgent",
            _ => "reserved",
        }
    }
}

/// All storage devices found in one collection pass, in scan order.
/// An empty report means the platform does not expose storage telemetry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct StorageReport {
    pub records: Vec<StorageRecord>,
}

impl StorageReport {
    pub fn new(records: Vec<StorageRecord>) -> Self {
        Self { records }
    }

    pub fn is_supported(&self) -> bool { !self.records.is_empty() }
    pub fn len(&self) -> usize { self.records.len() }
    pub fn is_empty(&self) -> bool { self.records.is_empty() }

    pub fn iter(&self) -> std::slice::Iter<'_, StorageRecord> {
        self.records.iter()
    }
}

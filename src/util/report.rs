use crate::models::battery::BatteryInfo;
use crate::models::disk::DiskReport;
use crate::models::snapshot::HealthSnapshot;
use crate::models::storage::StorageReport;
use crate::util::human::{fmt_bytes, fmt_micro};

/// Render a snapshot as a human-readable report.
pub fn render(snapshot: &HealthSnapshot) -> String {
    let mut out = String::new();
    let ts = snapshot.captured_at.format("%Y-%m-%d %H:%M:%S");

    out.push_str("═══════════════════════════════════════════════\n");
    out.push_str(&format!("  Health Snapshot — {}\n", ts));
    out.push_str("═══════════════════════════════════════════════\n\n");

    render_battery(&mut out, &snapshot.battery);
    render_storage(&mut out, &snapshot.storage);
    render_disks(&mut out, &snapshot.disks);

    out.push_str("═══════════════════════════════════════════════\n");
    out
}

fn render_battery(out: &mut String, b: &BatteryInfo) {
    out.push_str("── Battery ────────────────────────────────────\n");
    let online = |on: bool| if on { "online" } else { "offline" };
    out.push_str(&format!(
        "  Charger   AC:{}  USB:{}  Wireless:{}\n",
        online(b.charger_ac_online), online(b.charger_usb_online), online(b.charger_wireless_online),
    ));
    out.push_str(&format!(
        "  Max charge: {} / {}\n",
        fmt_micro(b.max_charging_current, "A"), fmt_micro(b.max_charging_voltage, "V"),
    ));
    if b.battery_present {
        out.push_str(&format!(
            "  Level: {}%  Voltage: {} mV  Temp: {:.1}°C  Current: {} µA\n",
            b.battery_level, b.battery_voltage, b.battery_temperature as f64 / 10.0, b.battery_current,
        ));
        out.push_str(&format!(
            "  Cycles: {}  Full charge: {} µAh  Counter: {} µAh\n",
            b.battery_cycle_count, b.battery_full_charge, b.battery_charge_counter,
        ));
    } else {
        out.push_str("  Battery: not present\n");
    }
    out.push_str(&format!(
        "  Status: {}  Health: {}  Technology: {}\n\n",
        b.battery_status.label(), b.battery_health.label(),
        if b.battery_technology.is_empty() { "—" } else { b.battery_technology.as_str() },
    ));
}

fn render_storage(out: &mut String, report: &StorageReport) {
    out.push_str(&format!("── Storage ({}) ───────────────────────────────\n", report.len()));
    if !report.is_supported() {
        out.push_str("  not supported\n\n");
        return;
    }
    for rec in report.iter() {
        let name = if rec.attr.name.is_empty() { "?" } else { rec.attr.name.as_str() };
        out.push_str(&format!(
            "  {:10}  internal:{:5}  boot:{:5}  rev:{}\n",
            name, rec.attr.is_internal, rec.attr.is_boot_device,
            if rec.version.is_empty() { "—" } else { rec.version.as_str() },
        ));
        out.push_str(&format!(
            "  Pre-EOL: {} ({})  Lifetime A: {}  B: {}\n",
            rec.eol, rec.eol_label(), rec.lifetime_a, rec.lifetime_b,
        ));
    }
    out.push('\n');
}

fn render_disks(out: &mut String, report: &DiskReport) {
    out.push_str(&format!("── Disk Activity ({}) ─────────────────────────\n", report.len()));
    if !report.is_supported() {
        out.push_str("  not supported\n\n");
        return;
    }
    out.push_str(&format!(
        "  {:<12} {:>10} {:>10} {:>10} {:>10} {:>8}\n",
        "Disk", "Reads", "Read", "Writes", "Written", "In-flt"
    ));
    out.push_str(&format!("  {}\n", "─".repeat(65)));
    for d in report.iter() {
        out.push_str(&format!(
            "  {:<12} {:>10} {:>10} {:>10} {:>10} {:>8}\n",
            d.attr.name, d.reads, fmt_bytes(d.bytes_read()),
            d.writes, fmt_bytes(d.bytes_written()), d.io_in_flight,
        ));
    }
    out.push('\n');
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::disk::DiskStats;
    use crate::models::storage::{StorageAttribute, StorageRecord};

    #[test]
    fn empty_reports_render_as_not_supported() {
        let snap = HealthSnapshot::new(BatteryInfo::default(), StorageReport::default(), DiskReport::default());
        let text = render(&snap);
        assert!(text.contains("── Storage (0)"));
        assert_eq!(text.matches("not supported").count(), 2);
        assert!(text.contains("Battery: not present"));
    }

    #[test]
    fn records_are_listed() {
        let storage = StorageReport::new(vec![StorageRecord {
            attr: StorageAttribute { name: "DG4016".into(), is_internal: true, is_boot_device: true },
            eol: 2,
            lifetime_a: 3,
            lifetime_b: 4,
            version: "0x8".into(),
        }]);
        let disks = DiskReport::new(vec![DiskStats {
            attr: StorageAttribute { name: "mmcblk0".into(), ..Default::default() },
            writes: 7,
            write_sectors: 2048,
            ..Default::default()
        }]);
        let text = render(&HealthSnapshot::new(BatteryInfo::default(), storage, disks));
        assert!(text.contains("DG4016"));
        assert!(text.contains("Pre-EOL: 2 (warning)  Lifetime A: 3  B: 4"));
        assert!(text.contains("mmcblk0"));
        assert!(text.contains("1.0 MB"));
    }
}

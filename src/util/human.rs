/// Format a raw byte count into a human-readable string: "12.5 MB"
pub fn fmt_bytes(bytes: u64) -> String {
    let b = bytes as f64;
    const TB: f64 = 1_099_511_627_776.0;
    const GB: f64 = 1_073_741_824.0;
    const MB: f64 = 1_048_576.0;
    const KB: f64 = 1_024.0;
    if b >= TB      { format!("{:.1} TB", b / TB) }
    else if b >= GB { format!("{:.1} GB", b / GB) }
    else if b >= MB { format!("{:.1} MB", b / MB) }
    else if b >= KB { format!("{:.1} KB", b / KB) }
    else            { format!("{:.0} B",  b) }
}

/// Format a power_supply micro-unit value: 5000000 µA → "5.00 A"
pub fn fmt_micro(value: i32, unit: &str) -> String {
    format!("{:.2} {}", value as f64 / 1_000_000.0, unit)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_bytes_and_micro_units() {
        assert_eq!(fmt_bytes(512), "512 B");
        assert_eq!(fmt_bytes(3 * 1_048_576), "3.0 MB");
        assert_eq!(fmt_micro(5_000_000, "A"), "5.00 A");
        assert_eq!(fmt_micro(12_000_000, "V"), "12.00 V");
    }
}

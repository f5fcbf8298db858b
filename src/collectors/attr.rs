use std::fs;
use std::path::Path;
use tracing::trace;

/// Read a sysfs-style attribute file and return its first line, trimmed.
/// Returns None when the file is missing, unreadable, or blank.
pub fn read_attr(path: &Path) -> Option<String> {
    let text = match fs::read_to_string(path) {
        Ok(t)  => t,
        Err(e) => {
            trace!(path = %path.display(), error = %e, "attribute unavailable");
            return None;
        }
    };
    let line = text.lines().next()?.trim();
    if line.is_empty() {
        trace!(path = %path.display(), "attribute is empty");
        return None;
    }
    Some(line.to_string())
}

/// Parse one base-16 token, with or without a `0x` prefix.
pub fn parse_hex(token: &str) -> Option<u64> {
    let t = token.trim();
    let digits = t.strip_prefix("0x").or_else(|| t.strip_prefix("0X")).unwrap_or(t);
    u64::from_str_radix(digits, 16).ok()
}

/// Read an attribute file holding a single base-16 value. Missing or
/// malformed content yields 0.
pub fn read_hex_attr(path: &Path) -> u64 {
    let Some(text) = read_attr(path) else { return 0 };
    match parse_hex(&text) {
        Some(v) => v,
        None    => {
            trace!(path = %path.display(), value = %text, "malformed hex attribute");
            0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn reads_first_line_trimmed() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("name");
        fs::write(&path, "  MMC32G \nsecond line\n").unwrap();
        assert_eq!(read_attr(&path).as_deref(), Some("MMC32G"));
    }

    #[test]
    fn missing_and_blank_files_are_absent() {
        let dir = TempDir::new().unwrap();
        assert_eq!(read_attr(&dir.path().join("nope")), None);

        let blank = dir.path().join("blank");
        fs::write(&blank, "\n").unwrap();
        assert_eq!(read_attr(&blank), None);
    }

    #[test]
    fn hex_tokens_accept_optional_prefix() {
        assert_eq!(parse_hex("0a"), Some(10));
        assert_eq!(parse_hex("0x0B"), Some(11));
        assert_eq!(parse_hex("0X1f"), Some(31));
        assert_eq!(parse_hex("zz"), None);
        assert_eq!(parse_hex(""), None);
    }

    #[test]
    fn malformed_hex_attribute_degrades_to_zero() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("pre_eol_info");
        fs::write(&path, "not-a-number\n").unwrap();
        assert_eq!(read_hex_attr(&path), 0);
        fs::write(&path, "0x02\n").unwrap();
        assert_eq!(read_hex_attr(&path), 2);
    }
}

//! Byte-size formatting and parsing for the CLI boundary.

use humansize::{format_size, BINARY};

use crate::entry::{Entry, SizeState};

/// Human-readable byte count ("1.17 GiB")
pub fn human_size(bytes: u64) -> String {
    format_size(bytes, BINARY)
}

/// Display cell for an entry's size column
pub fn size_display(entry: &Entry) -> String {
    match entry.size {
        SizeState::Pending => "...".to_string(),
        SizeState::Failed => "error".to_string(),
        SizeState::Resolved { bytes, .. } => human_size(bytes),
    }
}

/// Compact age display from whole days
pub fn human_age(days: i64) -> String {
    match days {
        d if d < 30 => format!("{}d", d),
        d if d < 365 => format!("{}mo", d / 30),
        d => format!("{}y", d / 365),
    }
}

/// Parse a human-entered size string ("500mb", "1.5 GB") into bytes.
///
/// A decimal number followed by an optional unit in {b, kb, mb, gb, tb},
/// case-insensitive, whitespace-tolerant. Returns None for anything
/// unparseable instead of erroring.
pub fn parse_size(input: &str) -> Option<u64> {
    let trimmed = input.trim().to_lowercase();
    if trimmed.is_empty() {
        return None;
    }

    let unit_start = trimmed
        .find(|c: char| c.is_ascii_alphabetic())
        .unwrap_or(trimmed.len());
    let (number_part, unit_part) = trimmed.split_at(unit_start);

    let number: f64 = number_part.trim().parse().ok()?;
    if !number.is_finite() || number < 0.0 {
        return None;
    }

    let multiplier: u64 = match unit_part.trim() {
        "" | "b" => 1,
        "kb" => 1024,
        "mb" => 1024 * 1024,
        "gb" => 1024 * 1024 * 1024,
        "tb" => 1024u64.pow(4),
        _ => return None,
    };

    Some((number * multiplier as f64) as u64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_size_plain_bytes() {
        assert_eq!(parse_size("1024"), Some(1024));
        assert_eq!(parse_size("0"), Some(0));
        assert_eq!(parse_size("512b"), Some(512));
    }

    #[test]
    fn test_parse_size_units() {
        assert_eq!(parse_size("1kb"), Some(1024));
        assert_eq!(parse_size("500mb"), Some(500 * 1024 * 1024));
        assert_eq!(parse_size("1gb"), Some(1024 * 1024 * 1024));
        assert_eq!(parse_size("2tb"), Some(2 * 1024u64.pow(4)));
    }

    #[test]
    fn test_parse_size_decimal_and_whitespace() {
        assert_eq!(parse_size(" 1.5 gb "), Some((1.5 * 1024.0 * 1024.0 * 1024.0) as u64));
        assert_eq!(parse_size("0.5kb"), Some(512));
    }

    #[test]
    fn test_parse_size_case_insensitive() {
        assert_eq!(parse_size("500MB"), parse_size("500mb"));
        assert_eq!(parse_size("1Gb"), Some(1024 * 1024 * 1024));
    }

    #[test]
    fn test_parse_size_invalid() {
        assert_eq!(parse_size(""), None);
        assert_eq!(parse_size("abc"), None);
        assert_eq!(parse_size("10xb"), None);
        assert_eq!(parse_size("-5mb"), None);
        assert_eq!(parse_size("10 10mb"), None);
    }

    #[test]
    fn test_human_age() {
        assert_eq!(human_age(3), "3d");
        assert_eq!(human_age(65), "2mo");
        assert_eq!(human_age(800), "2y");
    }
}

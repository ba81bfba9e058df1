//! Byte counts with binary prefixes
//!
//! Page and buffer sizes are given as "8k", "1.5M" and the like, where each
//! prefix is a power of 1024.

use crate::error::{Error, Result};

const PREFIXES: [&str; 6] = ["", "k", "M", "G", "T", "P"];

fn prefix_multiplier(prefix: &str) -> Option<f64> {
    PREFIXES
        .iter()
        .position(|p| *p == prefix)
        .map(|exp| 1024f64.powi(exp as i32))
}

/// Parse a byte count such as `"512"`, `"8k"` or `"1.5M"`
///
/// Fractional values are scaled before truncation, so `"1.5k"` is 1536.
pub fn parse_byte_count(input: &str) -> Result<u64> {
    let invalid = || Error::InvalidByteCount(input.to_string());
    let trimmed = input.trim();

    let split = trimmed
        .find(|c: char| !(c.is_ascii_digit() || c == '.'))
        .unwrap_or(trimmed.len());
    let (number, prefix) = trimmed.split_at(split);

    if number.is_empty() {
        return Err(invalid());
    }
    let value: f64 = number.parse().map_err(|_| invalid())?;
    let multiplier = prefix_multiplier(prefix).ok_or_else(invalid)?;

    let bytes = value * multiplier;
    if !bytes.is_finite() || bytes > u64::MAX as f64 {
        return Err(invalid());
    }
    Ok(bytes as u64)
}

/// Render a byte count with three decimals and the largest fitting prefix
///
/// `suffix` is appended after the prefix, e.g. `"B"` gives `"1.500 kB"`.
pub fn format_byte_count(value: f64, suffix: &str) -> String {
    let mut scaled = value;
    let mut exp = 0;
    while scaled >= 1024.0 && exp < PREFIXES.len() - 1 {
        scaled /= 1024.0;
        exp += 1;
    }
    format!("{scaled:.3} {}{suffix}", PREFIXES[exp])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_plain_and_prefixed() {
        assert_eq!(parse_byte_count("0").unwrap(), 0);
        assert_eq!(parse_byte_count("512").unwrap(), 512);
        assert_eq!(parse_byte_count("8k").unwrap(), 8192);
        assert_eq!(parse_byte_count("1M").unwrap(), 1 << 20);
        assert_eq!(parse_byte_count("2G").unwrap(), 2 << 30);
        assert_eq!(parse_byte_count("1T").unwrap(), 1 << 40);
        assert_eq!(parse_byte_count("1P").unwrap(), 1 << 50);
        assert_eq!(parse_byte_count(" 64 ").unwrap(), 64);
    }

    #[test]
    fn test_parse_fractional() {
        assert_eq!(parse_byte_count("1.5M").unwrap(), 1_572_864);
        assert_eq!(parse_byte_count("0.5k").unwrap(), 512);
        assert_eq!(parse_byte_count("2.25").unwrap(), 2);
    }

    #[test]
    fn test_parse_rejects_garbage() {
        for input in ["", "k", "-1", "1.2.3", "8kB", "8K", "12 k", "abc", "1e3"] {
            assert!(
                matches!(parse_byte_count(input), Err(Error::InvalidByteCount(_))),
                "{input:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_format_byte_count() {
        assert_eq!(format_byte_count(0.0, "B"), "0.000 B");
        assert_eq!(format_byte_count(1000.0, "B"), "1000.000 B");
        assert_eq!(format_byte_count(1536.0, "B"), "1.500 kB");
        assert_eq!(format_byte_count(1024.0 * 1024.0, "B"), "1.000 MB");
        assert_eq!(format_byte_count(8192.0, "Bytes"), "8.000 kBytes");
        assert_eq!(format_byte_count(3.0 * 1024.0 * 1024.0, "B/s"), "3.000 MB/s");
        assert_eq!(format_byte_count(2048.0 * 1024f64.powi(5), ""), "2048.000 P");
    }
}

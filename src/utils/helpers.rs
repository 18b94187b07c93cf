/// Helper utilities for formatting the interface table

use chrono::{DateTime, Local};

/// Shorten device interface names for narrow columns
pub fn short_if_name(name: &str) -> String {
    name.replace("port-channel", "Po").replace("Ethernet", "Eth")
}

/// Keep at most `width` characters
pub fn truncate(text: &str, width: usize) -> String {
    text.chars().take(width).collect()
}

/// Format a number with thousands separators and a fixed number of decimals
pub fn format_grouped(value: f64, decimals: usize) -> String {
    let formatted = format!("{:.*}", decimals, value.abs());
    let (int_part, frac_part) = match formatted.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (formatted.as_str(), None),
    };

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, c) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }

    let negative = value < 0.0 && formatted.chars().any(|c| c.is_ascii_digit() && c != '0');
    let mut out = String::new();
    if negative {
        out.push('-');
    }
    out.push_str(&grouped);
    if let Some(frac) = frac_part {
        out.push('.');
        out.push_str(frac);
    }
    out
}

/// Rate cell text, e.g. `1,234.5`
pub fn format_rate(value: f64) -> String {
    format_grouped(value, 1)
}

/// Integer counter with separators, e.g. `12,345`
pub fn format_count(value: u64) -> String {
    format_grouped(value as f64, 0)
}

/// Wall-clock time as shown in the footer and the sample log
pub fn format_clock(time: &DateTime<Local>) -> String {
    time.format("%H:%M:%S").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_short_if_name() {
        assert_eq!(short_if_name("Ethernet1/1"), "Eth1/1");
        assert_eq!(short_if_name("Ethernet101/1/25"), "Eth101/1/25");
        assert_eq!(short_if_name("port-channel10"), "Po10");
        assert_eq!(short_if_name("mgmt0"), "mgmt0");
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("uplink to core switch one", 20), "uplink to core switc");
        assert_eq!(truncate("short", 20), "short");
        assert_eq!(truncate("", 4), "");
    }

    #[test]
    fn test_format_rate() {
        assert_eq!(format_rate(0.0), "0.0");
        assert_eq!(format_rate(0.004), "0.0");
        assert_eq!(format_rate(999.96), "1,000.0");
        assert_eq!(format_rate(1234567.89), "1,234,567.9");
        assert_eq!(format_rate(-1500.0), "-1,500.0");
    }

    #[test]
    fn test_format_count() {
        assert_eq!(format_count(0), "0");
        assert_eq!(format_count(999), "999");
        assert_eq!(format_count(1000), "1,000");
        assert_eq!(format_count(12345678), "12,345,678");
    }

    #[test]
    fn test_format_clock() {
        let time = Local.with_ymd_and_hms(2024, 7, 15, 9, 5, 3).unwrap();
        assert_eq!(format_clock(&time), "09:05:03");
    }
}

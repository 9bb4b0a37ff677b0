use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
    "%Y/%m/%d %H:%M:%S",
    "%Y/%m/%d %H:%M",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
];

const OFFSET_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f%z",
    "%Y-%m-%dT%H:%M:%S%.f%z",
    "%Y-%m-%d %H:%M:%S%.f %z",
];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y"];

/// Parses a transaction timestamp as wall-clock time.
///
/// Offsets are dropped rather than converted, so `2025-03-01T23:30:00+01:00`
/// and `2025-03-01 23:30:00+0100` both stay on March 1st. Date-only values land on
/// midnight. Slash dates without a leading year are month-first.
pub fn parse_txn_date(value: &str) -> Option<NaiveDateTime> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Ok(parsed) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(parsed.naive_local());
    }

    for format in OFFSET_DATETIME_FORMATS {
        if let Ok(parsed) = DateTime::parse_from_str(trimmed, format) {
            return Some(parsed.naive_local());
        }
    }

    for format in DATETIME_FORMATS {
        if let Ok(parsed) = NaiveDateTime::parse_from_str(trimmed, format) {
            return Some(parsed);
        }
    }

    for format in DATE_FORMATS {
        if let Ok(parsed) = NaiveDate::parse_from_str(trimmed, format) {
            return Some(parsed.and_time(NaiveTime::MIN));
        }
    }

    None
}

pub fn format_txn_date(value: &NaiveDateTime) -> String {
    value.format("%Y-%m-%d %H:%M:%S").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};

    #[test]
    fn parses_spreadsheet_and_iso_forms() {
        let iso = parse_txn_date("2025-01-05 14:03:22").unwrap();
        assert_eq!((iso.year(), iso.month(), iso.day()), (2025, 1, 5));
        assert_eq!(iso.hour(), 14);

        let fractional = parse_txn_date("2025-01-05T14:03:22.125").unwrap();
        assert_eq!(fractional.second(), 22);

        let us = parse_txn_date("03/04/2025 08:15").unwrap();
        assert_eq!((us.month(), us.day()), (3, 4));

        let date_only = parse_txn_date("2025-12-31").unwrap();
        assert_eq!(date_only.hour(), 0);
    }

    #[test]
    fn keeps_wall_clock_time_for_offsets() {
        let parsed = parse_txn_date("2025-03-01T23:30:00+01:00").unwrap();
        assert_eq!(parsed.day(), 1);
        assert_eq!(parsed.hour(), 23);

        let compact = parse_txn_date("2025-01-05 14:03:22+0100").unwrap();
        assert_eq!((compact.day(), compact.hour(), compact.minute()), (5, 14, 3));
        let t_compact = parse_txn_date("2025-01-05T23:59:59-0500").unwrap();
        assert_eq!((t_compact.day(), t_compact.hour()), (5, 23));
    }

    #[test]
    fn rejects_garbage() {
        assert!(parse_txn_date("").is_none());
        assert!(parse_txn_date("   ").is_none());
        assert!(parse_txn_date("yesterday").is_none());
        assert!(parse_txn_date("2025-13-01").is_none());
    }
}

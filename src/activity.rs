use crate::error::{ReportError, ReportResult};
use crate::models::TransactionRecord;
use chrono::{Duration, NaiveDateTime};
use std::collections::HashSet;

pub const DEFAULT_WINDOWS: &[i64] = &[30, 60, 90];

/// Latest transaction timestamp in the set; every trailing window ends here.
pub fn anchor_date(records: &[TransactionRecord]) -> ReportResult<NaiveDateTime> {
    records
        .iter()
        .map(|record| record.txn_date)
        .max()
        .ok_or(ReportError::EmptyInput {
            operation: "anchor date",
        })
}

pub fn validate_window(window_days: i64) -> ReportResult<()> {
    if window_days <= 0 {
        return Err(ReportError::InvalidArgument(format!(
            "window must be a positive number of days, got {window_days}"
        )));
    }
    Ok(())
}

/// Inclusive lower bound of a trailing window. Windows reaching past the
/// earliest representable date start at `NaiveDateTime::MIN`.
pub fn window_threshold(anchor: NaiveDateTime, window_days: i64) -> NaiveDateTime {
    Duration::try_days(window_days)
        .and_then(|span| anchor.checked_sub_signed(span))
        .unwrap_or(NaiveDateTime::MIN)
}

/// Distinct senders with a transaction on or after `anchor - window_days`.
///
/// Customers are deduplicated by name only, so one sender active at two
/// agencies counts once here but twice in the windowed detail tables.
pub fn active_customers(records: &[TransactionRecord], window_days: i64) -> ReportResult<usize> {
    validate_window(window_days)?;
    let anchor = anchor_date(records)?;
    let threshold = window_threshold(anchor, window_days);
    Ok(active_customers_since(records, threshold))
}

pub fn active_customers_since(records: &[TransactionRecord], threshold: NaiveDateTime) -> usize {
    records
        .iter()
        .filter(|record| record.txn_date >= threshold)
        .map(|record| record.sender_name.as_str())
        .collect::<HashSet<_>>()
        .len()
}

pub fn total_customers(records: &[TransactionRecord]) -> usize {
    records
        .iter()
        .map(|record| record.sender_name.as_str())
        .collect::<HashSet<_>>()
        .len()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dates::parse_txn_date;

    fn record(name: &str, agency: &str, date: &str) -> TransactionRecord {
        TransactionRecord::new(name, Some(agency), parse_txn_date(date).unwrap())
    }

    fn sample() -> Vec<TransactionRecord> {
        vec![
            record("A", "Br1", "2025-12-31 10:00:00"),
            record("A", "Br2", "2025-12-20"),
            record("B", "Br1", "2025-12-01 10:00:00"),
            record("C", "Br1", "2025-11-15"),
            record("D", "Br3", "2025-09-01"),
        ]
    }

    #[test]
    fn window_bound_is_inclusive() {
        let records = sample();
        // anchor 2025-12-31 10:00, 30 days back is 2025-12-01 10:00 exactly
        assert_eq!(active_customers(&records, 30).unwrap(), 2);
        assert_eq!(active_customers(&records, 60).unwrap(), 3);
        assert_eq!(active_customers(&records, 365).unwrap(), 4);
    }

    #[test]
    fn counts_names_not_name_agency_pairs() {
        let records = sample();
        assert_eq!(active_customers(&records, 15).unwrap(), 1);
        assert_eq!(total_customers(&records), 4);
    }

    #[test]
    fn non_decreasing_in_window() {
        let records = sample();
        let mut previous = 0;
        for days in 1..=400 {
            let current = active_customers(&records, days).unwrap();
            assert!(current >= previous);
            previous = current;
        }
    }

    #[test]
    fn rejects_empty_input_and_bad_windows() {
        assert!(matches!(
            active_customers(&[], 30),
            Err(ReportError::EmptyInput { .. })
        ));
        assert!(matches!(
            active_customers(&sample(), 0),
            Err(ReportError::InvalidArgument(_))
        ));
        assert!(matches!(
            active_customers(&sample(), -5),
            Err(ReportError::InvalidArgument(_))
        ));
    }

    #[test]
    fn oversized_window_covers_every_sender() {
        let records = sample();
        assert_eq!(active_customers(&records, 100_000_000).unwrap(), 4);
        assert_eq!(active_customers(&records, 5_000_000_000).unwrap(), 4);
        assert_eq!(active_customers(&records, i64::MAX).unwrap(), 4);
        assert_eq!(
            window_threshold(records[0].txn_date, i64::MAX),
            NaiveDateTime::MIN
        );
    }
}

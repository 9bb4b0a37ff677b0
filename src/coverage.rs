use crate::aggregation::{CustomerAggregate, CustomerKey, NullAgency};
use crate::models::TransactionRecord;
use chrono::Datelike;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet, HashMap};

pub const FULL_YEAR_MONTHS: usize = 12;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonthlyCoverage {
    pub sender_name: String,
    pub agency: Option<String>,
    pub months_active: usize,
}

/// A customer seen in every month of the reporting year. The count is `None`
/// when the aggregate table has no row for the same key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FullYearRegular {
    pub sender_name: String,
    pub agency: Option<String>,
    pub months_active: usize,
    pub transaction_count: Option<usize>,
}

/// Distinct (year, month) pairs per (sender, agency), in key order.
pub fn monthly_coverage(
    records: &[TransactionRecord],
    null_agency: NullAgency,
) -> Vec<MonthlyCoverage> {
    let mut months: BTreeMap<CustomerKey, BTreeSet<(i32, u32)>> = BTreeMap::new();
    for record in records {
        if let Some(key) = CustomerKey::for_record(record, null_agency) {
            months
                .entry(key)
                .or_default()
                .insert((record.txn_date.year(), record.txn_date.month()));
        }
    }

    months
        .into_iter()
        .map(|(key, seen)| MonthlyCoverage {
            sender_name: key.sender_name,
            agency: key.agency,
            months_active: seen.len(),
        })
        .collect()
}

/// Full-year rows left-joined with the unwindowed aggregate on (sender, agency).
pub fn full_year_regulars(
    coverage: &[MonthlyCoverage],
    aggregates: &[CustomerAggregate],
) -> Vec<FullYearRegular> {
    let counts: HashMap<(&str, Option<&str>), usize> = aggregates
        .iter()
        .map(|row| {
            (
                (row.sender_name.as_str(), row.agency.as_deref()),
                row.transaction_count,
            )
        })
        .collect();

    coverage
        .iter()
        .filter(|row| row.months_active == FULL_YEAR_MONTHS)
        .map(|row| FullYearRegular {
            sender_name: row.sender_name.clone(),
            agency: row.agency.clone(),
            months_active: row.months_active,
            transaction_count: counts
                .get(&(row.sender_name.as_str(), row.agency.as_deref()))
                .copied(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregation::aggregate;
    use crate::dates::parse_txn_date;

    fn record(name: &str, agency: Option<&str>, date: &str) -> TransactionRecord {
        TransactionRecord::new(name, agency, parse_txn_date(date).unwrap())
    }

    fn every_month(name: &str, agency: &str) -> Vec<TransactionRecord> {
        (1..=12)
            .map(|month| record(name, Some(agency), &format!("2025-{month:02}-10")))
            .collect()
    }

    #[test]
    fn counts_distinct_months_per_key() {
        let mut records = every_month("A", "Br1");
        records.push(record("A", Some("Br1"), "2025-03-28"));
        records.push(record("B", Some("Br1"), "2025-01-01"));
        records.push(record("B", Some("Br1"), "2025-01-31"));
        records.push(record("B", Some("Br2"), "2025-02-01"));

        let coverage = monthly_coverage(&records, NullAgency::Drop);
        assert_eq!(coverage.len(), 3);
        assert_eq!(coverage[0].sender_name, "A");
        assert_eq!(coverage[0].months_active, 12);
        assert_eq!(coverage[1].months_active, 1);
        assert_eq!(coverage[2].agency.as_deref(), Some("Br2"));
    }

    #[test]
    fn full_year_rows_carry_transaction_count() {
        let mut records = every_month("A", "Br1");
        records.push(record("A", Some("Br1"), "2025-03-28"));
        records.push(record("B", Some("Br1"), "2025-05-05"));

        let coverage = monthly_coverage(&records, NullAgency::Drop);
        let aggregates = aggregate(&records, None, NullAgency::Drop);
        let regulars = full_year_regulars(&coverage, &aggregates);
        assert_eq!(
            regulars,
            vec![FullYearRegular {
                sender_name: "A".to_string(),
                agency: Some("Br1".to_string()),
                months_active: 12,
                transaction_count: Some(13),
            }]
        );
    }

    #[test]
    fn join_is_left_not_inner() {
        let coverage = vec![MonthlyCoverage {
            sender_name: "Z".to_string(),
            agency: Some("Br9".to_string()),
            months_active: 12,
        }];
        let regulars = full_year_regulars(&coverage, &[]);
        assert_eq!(regulars.len(), 1);
        assert_eq!(regulars[0].transaction_count, None);
    }

    #[test]
    fn missing_agency_follows_policy() {
        let records: Vec<_> = (1..=12)
            .map(|month| record("C", None, &format!("2025-{month:02}-01")))
            .collect();
        assert!(monthly_coverage(&records, NullAgency::Drop).is_empty());
        let kept = monthly_coverage(&records, NullAgency::Keep);
        assert_eq!(kept[0].months_active, 12);
    }
}

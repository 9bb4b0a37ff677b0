use crate::models::TransactionRecord;
use chrono::Datelike;
use std::collections::BTreeSet;

pub const DEFAULT_REPORT_YEAR: i32 = 2025;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterConfig {
    pub year: i32,
    /// Empty means every agency is kept.
    pub agency_allowlist: BTreeSet<String>,
    pub excluded_senders: BTreeSet<String>,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            year: DEFAULT_REPORT_YEAR,
            agency_allowlist: BTreeSet::new(),
            excluded_senders: BTreeSet::new(),
        }
    }
}

pub fn in_year(record: &TransactionRecord, year: i32) -> bool {
    record.txn_date.year() == year
}

pub fn in_agencies(record: &TransactionRecord, allowlist: &BTreeSet<String>) -> bool {
    if allowlist.is_empty() {
        return true;
    }
    match record.agency.as_deref() {
        Some(agency) => allowlist.contains(agency),
        None => false,
    }
}

pub fn not_excluded(record: &TransactionRecord, excluded: &BTreeSet<String>) -> bool {
    !excluded.contains(&record.sender_name)
}

pub fn filter_records(records: &[TransactionRecord], config: &FilterConfig) -> Vec<TransactionRecord> {
    records
        .iter()
        .filter(|record| in_year(record, config.year))
        .filter(|record| in_agencies(record, &config.agency_allowlist))
        .filter(|record| not_excluded(record, &config.excluded_senders))
        .cloned()
        .collect()
}

use crate::models::TransactionRecord;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// How grouped views treat records that carry no agency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NullAgency {
    #[default]
    Drop,
    Keep,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CustomerKey {
    pub sender_name: String,
    pub agency: Option<String>,
}

impl CustomerKey {
    /// `None` when the record has no agency and those are being dropped.
    pub fn for_record(record: &TransactionRecord, null_agency: NullAgency) -> Option<Self> {
        if record.agency.is_none() && null_agency == NullAgency::Drop {
            return None;
        }
        Some(Self {
            sender_name: record.sender_name.clone(),
            agency: record.agency.clone(),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CustomerAggregate {
    pub sender_name: String,
    pub agency: Option<String>,
    pub transaction_count: usize,
}

pub fn count_by_customer(
    records: &[TransactionRecord],
    null_agency: NullAgency,
) -> BTreeMap<CustomerKey, usize> {
    let mut counts: BTreeMap<CustomerKey, usize> = BTreeMap::new();
    for record in records {
        if let Some(key) = CustomerKey::for_record(record, null_agency) {
            *counts.entry(key).or_insert(0) += 1;
        }
    }
    counts
}

/// Transaction counts per (sender, agency), busiest first.
///
/// Equal counts keep key order, so the output only depends on the set of
/// records and never on hash state.
pub fn aggregate(
    records: &[TransactionRecord],
    since: Option<NaiveDateTime>,
    null_agency: NullAgency,
) -> Vec<CustomerAggregate> {
    let counts = match since {
        Some(threshold) => {
            let recent: Vec<TransactionRecord> = records
                .iter()
                .filter(|record| record.txn_date >= threshold)
                .cloned()
                .collect();
            count_by_customer(&recent, null_agency)
        }
        None => count_by_customer(records, null_agency),
    };

    let mut rows: Vec<CustomerAggregate> = counts
        .into_iter()
        .map(|(key, transaction_count)| CustomerAggregate {
            sender_name: key.sender_name,
            agency: key.agency,
            transaction_count,
        })
        .collect();
    rows.sort_by(|a, b| b.transaction_count.cmp(&a.transaction_count));
    rows
}

use crate::aggregation::CustomerAggregate;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

pub const RARE_MIN_TRANSACTIONS: usize = 2;
pub const OCCASIONAL_MIN_TRANSACTIONS: usize = 4;
pub const REGULAR_MIN_TRANSACTIONS: usize = 12;

/// Frequency tier, ordered from least to most active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum Segment {
    #[serde(rename = "single transaction")]
    SingleTransaction,
    #[serde(rename = "rare")]
    Rare,
    #[serde(rename = "occasional")]
    Occasional,
    #[serde(rename = "regular")]
    Regular,
}

impl Segment {
    pub fn for_count(transaction_count: usize) -> Self {
        if transaction_count >= REGULAR_MIN_TRANSACTIONS {
            Segment::Regular
        } else if transaction_count >= OCCASIONAL_MIN_TRANSACTIONS {
            Segment::Occasional
        } else if transaction_count >= RARE_MIN_TRANSACTIONS {
            Segment::Rare
        } else {
            Segment::SingleTransaction
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Segment::SingleTransaction => "single transaction",
            Segment::Rare => "rare",
            Segment::Occasional => "occasional",
            Segment::Regular => "regular",
        }
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

pub fn segment(transaction_count: usize) -> Segment {
    Segment::for_count(transaction_count)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SegmentedCustomer {
    pub sender_name: String,
    pub agency: Option<String>,
    pub transaction_count: usize,
    pub segment: Segment,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SegmentCount {
    pub segment: Segment,
    pub customers: usize,
}

pub fn classify(aggregates: &[CustomerAggregate]) -> Vec<SegmentedCustomer> {
    aggregates
        .iter()
        .map(|row| SegmentedCustomer {
            sender_name: row.sender_name.clone(),
            agency: row.agency.clone(),
            transaction_count: row.transaction_count,
            segment: segment(row.transaction_count),
        })
        .collect()
}

/// Rows per segment. Segments with no customers are left out.
pub fn segment_distribution(customers: &[SegmentedCustomer]) -> Vec<SegmentCount> {
    let mut counts: BTreeMap<Segment, usize> = BTreeMap::new();
    for customer in customers {
        *counts.entry(customer.segment).or_insert(0) += 1;
    }
    counts
        .into_iter()
        .map(|(segment, customers)| SegmentCount { segment, customers })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn thresholds_at_boundaries() {
        assert_eq!(segment(1), Segment::SingleTransaction);
        assert_eq!(segment(2), Segment::Rare);
        assert_eq!(segment(3), Segment::Rare);
        assert_eq!(segment(4), Segment::Occasional);
        assert_eq!(segment(11), Segment::Occasional);
        assert_eq!(segment(12), Segment::Regular);
        assert_eq!(segment(10_000), Segment::Regular);
        assert_eq!(segment(REGULAR_MIN_TRANSACTIONS - 1), Segment::Occasional);
        assert_eq!(segment(OCCASIONAL_MIN_TRANSACTIONS - 1), Segment::Rare);
    }

    #[test]
    fn labels_match_report_wording() {
        assert_eq!(Segment::SingleTransaction.to_string(), "single transaction");
        assert_eq!(
            serde_json::to_string(&Segment::Occasional).unwrap(),
            "\"occasional\""
        );
    }

    #[test]
    fn distribution_skips_empty_tiers() {
        let aggregates = vec![
            CustomerAggregate {
                sender_name: "A".to_string(),
                agency: Some("Br1".to_string()),
                transaction_count: 2,
            },
            CustomerAggregate {
                sender_name: "B".to_string(),
                agency: Some("Br1".to_string()),
                transaction_count: 1,
            },
        ];
        let distribution = segment_distribution(&classify(&aggregates));
        assert_eq!(
            distribution,
            vec![
                SegmentCount {
                    segment: Segment::SingleTransaction,
                    customers: 1
                },
                SegmentCount {
                    segment: Segment::Rare,
                    customers: 1
                },
            ]
        );
    }
}

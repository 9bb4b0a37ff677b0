use crate::activity::{
    active_customers_since, anchor_date, total_customers, validate_window, window_threshold,
    DEFAULT_WINDOWS,
};
use crate::aggregation::{aggregate, CustomerAggregate, NullAgency};
use crate::coverage::{full_year_regulars, monthly_coverage, FullYearRegular};
use crate::error::ReportResult;
use crate::filter::{filter_records, FilterConfig, DEFAULT_REPORT_YEAR};
use crate::models::{parse, RawTransactionRow, TransactionRecord};
use crate::segment::{classify, segment_distribution, SegmentCount, SegmentedCustomer};
use chrono::NaiveDateTime;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportConfig {
    pub year: i32,
    pub agency_filter: BTreeSet<String>,
    pub excluded_senders: BTreeSet<String>,
    pub windows: Vec<i64>,
    pub null_agency: NullAgency,
    /// Caps `top_customers`; `None` keeps the whole ranking.
    pub top_limit: Option<usize>,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            year: DEFAULT_REPORT_YEAR,
            agency_filter: BTreeSet::new(),
            excluded_senders: BTreeSet::new(),
            windows: DEFAULT_WINDOWS.to_vec(),
            null_agency: NullAgency::default(),
            top_limit: None,
        }
    }
}

impl ReportConfig {
    pub fn filter_config(&self) -> FilterConfig {
        FilterConfig {
            year: self.year,
            agency_allowlist: self.agency_filter.clone(),
            excluded_senders: self.excluded_senders.clone(),
        }
    }

    /// Windows as validated day counts, ascending and without duplicates.
    pub fn window_days(&self) -> ReportResult<Vec<i64>> {
        let mut days = BTreeSet::new();
        for window in &self.windows {
            validate_window(*window)?;
            days.insert(*window);
        }
        Ok(days.into_iter().collect())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportBundle {
    pub year: i32,
    pub anchor_date: NaiveDateTime,
    pub record_count: usize,
    pub total_customers: usize,
    pub active_counts: BTreeMap<i64, usize>,
    pub top_customers: Vec<SegmentedCustomer>,
    pub windowed_tables: BTreeMap<i64, Vec<CustomerAggregate>>,
    pub segment_distribution: Vec<SegmentCount>,
    pub single_transaction_customers: Vec<CustomerAggregate>,
    pub full_year_regulars: Vec<FullYearRegular>,
}

/// Validates raw rows, then assembles the report.
pub fn build_report(rows: &[RawTransactionRow], config: &ReportConfig) -> ReportResult<ReportBundle> {
    let records = parse(rows)?;
    assemble_report(&records, config)
}

/// Runs every analysis over the filtered records. Nothing is returned unless
/// all of them succeed.
pub fn assemble_report(
    records: &[TransactionRecord],
    config: &ReportConfig,
) -> ReportResult<ReportBundle> {
    let windows = config.window_days()?;
    let filtered = filter_records(records, &config.filter_config());
    let anchor = anchor_date(&filtered)?;

    let mut active_counts = BTreeMap::new();
    let mut windowed_tables = BTreeMap::new();
    for days in windows {
        let threshold = window_threshold(anchor, days);
        active_counts.insert(days, active_customers_since(&filtered, threshold));
        windowed_tables.insert(
            days,
            aggregate(&filtered, Some(threshold), config.null_agency),
        );
    }

    let ranking = aggregate(&filtered, None, config.null_agency);
    let segmented = classify(&ranking);
    let distribution = segment_distribution(&segmented);
    let single_transaction_customers: Vec<CustomerAggregate> = ranking
        .iter()
        .filter(|row| row.transaction_count == 1)
        .cloned()
        .collect();

    let coverage = monthly_coverage(&filtered, config.null_agency);
    let regulars = full_year_regulars(&coverage, &ranking);

    let top_customers = match config.top_limit {
        Some(limit) => segmented.into_iter().take(limit).collect(),
        None => segmented,
    };

    Ok(ReportBundle {
        year: config.year,
        anchor_date: anchor,
        record_count: filtered.len(),
        total_customers: total_customers(&filtered),
        active_counts,
        top_customers,
        windowed_tables,
        segment_distribution: distribution,
        single_transaction_customers,
        full_year_regulars: regulars,
    })
}

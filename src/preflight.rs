use crate::dates::parse_txn_date;
use crate::error::ReportResult;
use crate::loader::read_raw_rows;
use crate::models::RawTransactionRow;
use crate::report::ReportConfig;
use chrono::Datelike;
use std::collections::BTreeSet;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IssueLevel {
    Error,
    Warning,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreflightIssue {
    pub level: IssueLevel,
    pub row: usize,
    pub message: String,
}

#[derive(Debug, Clone)]
pub struct PreflightReport {
    pub year: i32,
    pub total_rows: usize,
    pub rows_in_year: usize,
    pub distinct_senders: usize,
    pub agencies: BTreeSet<String>,
    pub issues: Vec<PreflightIssue>,
}

impl PreflightReport {
    pub fn error_count(&self) -> usize {
        self.issues
            .iter()
            .filter(|issue| issue.level == IssueLevel::Error)
            .count()
    }

    pub fn warning_count(&self) -> usize {
        self.issues
            .iter()
            .filter(|issue| issue.level == IssueLevel::Warning)
            .count()
    }
}

pub fn preflight_csv(path: &Path, config: &ReportConfig) -> ReportResult<PreflightReport> {
    let rows = read_raw_rows(path)?;
    Ok(preflight_rows(&rows, config))
}

/// Scans every row and reports all problems instead of stopping at the first.
pub fn preflight_rows(rows: &[RawTransactionRow], config: &ReportConfig) -> PreflightReport {
    let mut issues = Vec::new();
    let mut senders: BTreeSet<&str> = BTreeSet::new();
    let mut agencies: BTreeSet<String> = BTreeSet::new();
    let mut rows_in_year = 0usize;

    for (idx, raw) in rows.iter().enumerate() {
        let row = idx + 1;

        match present(raw.sender_name.as_deref()) {
            Some(name) => {
                senders.insert(name);
                if config.excluded_senders.contains(name) {
                    issues.push(issue(
                        IssueLevel::Warning,
                        row,
                        "sender is an internal account and will be excluded",
                    ));
                }
            }
            None => issues.push(issue(IssueLevel::Error, row, "sender name is required")),
        }

        match present(raw.agency.as_deref()) {
            Some(agency) => {
                agencies.insert(agency.to_string());
                if !config.agency_filter.is_empty() && !config.agency_filter.contains(agency) {
                    issues.push(issue(
                        IssueLevel::Warning,
                        row,
                        "agency is outside the selected agencies",
                    ));
                }
            }
            None => issues.push(issue(
                IssueLevel::Warning,
                row,
                "agency is missing; row is left out of per-agency tables",
            )),
        }

        match present(raw.txn_date.as_deref()) {
            Some(value) => match parse_txn_date(value) {
                Some(date) if date.year() == config.year => rows_in_year += 1,
                Some(_) => issues.push(issue(
                    IssueLevel::Warning,
                    row,
                    "transaction date is outside the reporting year",
                )),
                None => issues.push(issue(
                    IssueLevel::Error,
                    row,
                    "transaction date cannot be parsed",
                )),
            },
            None => issues.push(issue(
                IssueLevel::Error,
                row,
                "transaction date is required",
            )),
        }
    }

    PreflightReport {
        year: config.year,
        total_rows: rows.len(),
        rows_in_year,
        distinct_senders: senders.len(),
        agencies,
        issues,
    }
}

fn present(value: Option<&str>) -> Option<&str> {
    value.filter(|value| !value.trim().is_empty())
}

fn issue(level: IssueLevel, row: usize, message: &str) -> PreflightIssue {
    PreflightIssue {
        level,
        row,
        message: message.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collects_every_issue() {
        let rows = vec![
            RawTransactionRow::new("A", Some("Br1"), "2025-01-05"),
            RawTransactionRow::new("B", None, "2024-06-01"),
            RawTransactionRow::new("C", Some("Br2"), "soon"),
            RawTransactionRow {
                sender_name: Some(String::new()),
                agency: Some("Br1".to_string()),
                txn_date: None,
            },
        ];
        let config = ReportConfig {
            excluded_senders: ["A".to_string()].into_iter().collect(),
            ..ReportConfig::default()
        };
        let report = preflight_rows(&rows, &config);

        assert_eq!(report.total_rows, 4);
        assert_eq!(report.rows_in_year, 1);
        assert_eq!(report.distinct_senders, 3);
        assert_eq!(report.agencies.len(), 2);
        assert_eq!(report.error_count(), 3);
        assert_eq!(report.warning_count(), 3);
        assert!(report
            .issues
            .iter()
            .any(|issue| issue.row == 3 && issue.message == "transaction date cannot be parsed"));
    }

    #[test]
    fn clean_rows_have_no_issues() {
        let rows = vec![
            RawTransactionRow::new("A", Some("Br1"), "2025-01-05"),
            RawTransactionRow::new("B", Some("Br1"), "2025-03-05"),
        ];
        let report = preflight_rows(&rows, &ReportConfig::default());
        assert!(report.issues.is_empty());
        assert_eq!(report.rows_in_year, 2);
    }
}

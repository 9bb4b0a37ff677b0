use crate::dates::parse_txn_date;
use crate::error::DataError;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// One row as it arrives from a spreadsheet export. Columns other than these
/// three are passthrough and ignored.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawTransactionRow {
    #[serde(rename = "Sender Name", alias = "sender_name", default)]
    pub sender_name: Option<String>,
    #[serde(rename = "Agence", alias = "agency", default)]
    pub agency: Option<String>,
    #[serde(rename = "TxnDate", alias = "txn_date", default)]
    pub txn_date: Option<String>,
}

impl RawTransactionRow {
    pub fn new(sender_name: &str, agency: Option<&str>, txn_date: &str) -> Self {
        Self {
            sender_name: Some(sender_name.to_string()),
            agency: agency.map(str::to_string),
            txn_date: Some(txn_date.to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TransactionRecord {
    pub sender_name: String,
    pub agency: Option<String>,
    pub txn_date: NaiveDateTime,
}

impl TransactionRecord {
    pub fn new(sender_name: &str, agency: Option<&str>, txn_date: NaiveDateTime) -> Self {
        Self {
            sender_name: sender_name.to_string(),
            agency: agency.map(str::to_string),
            txn_date,
        }
    }
}

/// Validates raw rows into records. The first bad row aborts the load, so a
/// caller never sees a partial dataset.
pub fn parse(rows: &[RawTransactionRow]) -> Result<Vec<TransactionRecord>, DataError> {
    rows.iter()
        .enumerate()
        .map(|(idx, row)| parse_row(idx + 1, row))
        .collect()
}

pub fn parse_row(row: usize, raw: &RawTransactionRow) -> Result<TransactionRecord, DataError> {
    let sender_name = non_blank(raw.sender_name.as_deref()).ok_or(
        DataError::MissingRequiredField {
            row,
            field: "sender_name",
        },
    )?;
    let date_value = non_blank(raw.txn_date.as_deref()).ok_or(
        DataError::MissingRequiredField {
            row,
            field: "txn_date",
        },
    )?;
    let txn_date = parse_txn_date(date_value).ok_or_else(|| DataError::UnparseableDate {
        row,
        value: date_value.to_string(),
    })?;

    Ok(TransactionRecord {
        sender_name: sender_name.to_string(),
        agency: non_blank(raw.agency.as_deref()).map(str::to_string),
        txn_date,
    })
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|value| !value.trim().is_empty())
}

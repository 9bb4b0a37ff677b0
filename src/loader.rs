use crate::error::ReportResult;
use crate::models::{parse, RawTransactionRow, TransactionRecord};
use std::io::Read;
use std::path::Path;

pub fn read_raw_rows(path: &Path) -> ReportResult<Vec<RawTransactionRow>> {
    let reader = csv::Reader::from_path(path)?;
    let rows = collect_rows(reader)?;
    log::debug!("read {} rows from {}", rows.len(), path.display());
    Ok(rows)
}

pub fn read_raw_rows_from<R: Read>(input: R) -> ReportResult<Vec<RawTransactionRow>> {
    collect_rows(csv::Reader::from_reader(input))
}

pub fn load_csv(path: &Path) -> ReportResult<Vec<TransactionRecord>> {
    let rows = read_raw_rows(path)?;
    Ok(parse(&rows)?)
}

fn collect_rows<R: Read>(mut reader: csv::Reader<R>) -> ReportResult<Vec<RawTransactionRow>> {
    let mut rows = Vec::new();
    for result in reader.deserialize() {
        let row: RawTransactionRow = result?;
        rows.push(row);
    }
    Ok(rows)
}

/// Names from a plain-text list: one per line, blank lines and `#` comments
/// skipped. A missing file yields an empty list.
pub fn load_name_list(path: &Path) -> ReportResult<Vec<String>> {
    let contents = match std::fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(err) => return Err(err.into()),
    };

    let mut names = Vec::new();
    for line in contents.lines() {
        let name = line.trim();
        if name.is_empty() || name.starts_with('#') {
            continue;
        }
        names.push(name.to_string());
    }
    Ok(names)
}

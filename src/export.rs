use crate::error::ReportResult;
use crate::report::ReportBundle;
use serde::Serialize;
use std::fs::{create_dir_all, File};
use std::io::BufWriter;
use std::path::{Path, PathBuf};

#[derive(Debug, Serialize)]
struct ActiveCountRow {
    window_days: i64,
    active_customers: usize,
}

/// Writes each table of the bundle as CSV plus the whole bundle as
/// `report.json`. Returns the files written, in write order.
pub fn write_bundle(bundle: &ReportBundle, output_dir: &Path) -> ReportResult<Vec<PathBuf>> {
    create_dir_all(output_dir)?;
    let mut outputs = Vec::new();

    let active_rows: Vec<ActiveCountRow> = bundle
        .active_counts
        .iter()
        .map(|(window_days, active_customers)| ActiveCountRow {
            window_days: *window_days,
            active_customers: *active_customers,
        })
        .collect();
    outputs.push(write_table(
        output_dir,
        "active_counts.csv",
        ACTIVE_COUNT_HEADER,
        &active_rows,
    )?);
    outputs.push(write_table(
        output_dir,
        "top_customers.csv",
        SEGMENTED_HEADER,
        &bundle.top_customers,
    )?);
    for (days, table) in &bundle.windowed_tables {
        outputs.push(write_table(
            output_dir,
            &format!("active_{days}_days.csv"),
            AGGREGATE_HEADER,
            table,
        )?);
    }
    outputs.push(write_table(
        output_dir,
        "segment_distribution.csv",
        DISTRIBUTION_HEADER,
        &bundle.segment_distribution,
    )?);
    outputs.push(write_table(
        output_dir,
        "single_transaction_customers.csv",
        AGGREGATE_HEADER,
        &bundle.single_transaction_customers,
    )?);
    outputs.push(write_table(
        output_dir,
        "full_year_regulars.csv",
        FULL_YEAR_HEADER,
        &bundle.full_year_regulars,
    )?);

    let json_path = output_dir.join("report.json");
    let writer = BufWriter::new(File::create(&json_path)?);
    serde_json::to_writer_pretty(writer, bundle)?;
    outputs.push(json_path);

    log::debug!("wrote {} report files to {}", outputs.len(), output_dir.display());
    Ok(outputs)
}

const ACTIVE_COUNT_HEADER: &[&str] = &["window_days", "active_customers"];
const AGGREGATE_HEADER: &[&str] = &["sender_name", "agency", "transaction_count"];
const SEGMENTED_HEADER: &[&str] = &["sender_name", "agency", "transaction_count", "segment"];
const DISTRIBUTION_HEADER: &[&str] = &["segment", "customers"];
const FULL_YEAR_HEADER: &[&str] = &["sender_name", "agency", "months_active", "transaction_count"];

/// The header is written up front so an empty table still names its columns.
fn write_table<T: Serialize>(
    output_dir: &Path,
    name: &str,
    header: &[&str],
    rows: &[T],
) -> ReportResult<PathBuf> {
    let path = output_dir.join(name);
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_path(&path)?;
    writer.write_record(header)?;
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    Ok(path)
}

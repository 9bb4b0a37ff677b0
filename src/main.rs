mod logging;

use clap::{Args, Parser, Subcommand};
use customer_profiling::aggregation::NullAgency;
use customer_profiling::dates::format_txn_date;
use customer_profiling::export::write_bundle;
use customer_profiling::generator::{generate_records, GeneratedTransaction, GeneratorConfig};
use customer_profiling::loader::{load_csv, load_name_list};
use customer_profiling::preflight::{self, IssueLevel, PreflightIssue};
use customer_profiling::report::{assemble_report, ReportBundle, ReportConfig};
use rand::Rng;
use std::collections::BTreeSet;
use std::fs::create_dir_all;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Instant;

#[derive(Parser)]
#[command(name = "customer-profiling")]
#[command(about = "Mobile-money customer activity and segmentation reports", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    Generate(GenerateArgs),
    Report(ReportArgs),
    Preflight(PreflightArgs),
}

#[derive(Parser)]
struct GenerateArgs {
    #[arg(long, default_value_t = 1200)]
    customers: usize,
    #[arg(long, default_value_t = 6)]
    agencies: usize,
    #[arg(long, default_value_t = 2)]
    internal_accounts: usize,
    #[arg(long, default_value_t = 0.01)]
    null_agency_ratio: f64,
    #[arg(long, default_value_t = 0.10)]
    second_agency_ratio: f64,
    #[arg(long, default_value_t = 2025)]
    year: i32,
    #[arg(long)]
    seed: Option<u64>,
    #[arg(long, default_value = "data/synthetic/transactions.csv")]
    output: PathBuf,
    #[arg(long, default_value = "data/reference/internal_accounts.txt")]
    exclude_output: PathBuf,
}

#[derive(Args)]
struct FilterArgs {
    #[arg(long, default_value = "data/synthetic/transactions.csv")]
    input: PathBuf,
    #[arg(long, default_value_t = 2025)]
    year: i32,
    /// Comma-separated agencies to keep; all agencies when omitted.
    #[arg(long)]
    agencies: Option<String>,
    /// Sender to exclude; may be repeated.
    #[arg(long)]
    exclude: Vec<String>,
    #[arg(long, default_value = "data/reference/internal_accounts.txt")]
    exclude_file: PathBuf,
    #[arg(long, default_value = "30,60,90")]
    windows: String,
    #[arg(long, default_value_t = false)]
    keep_null_agency: bool,
}

#[derive(Parser)]
struct ReportArgs {
    #[command(flatten)]
    filters: FilterArgs,
    /// Rows in the top-customers table; 0 keeps the whole ranking.
    #[arg(long, default_value_t = 50)]
    top: usize,
    #[arg(long)]
    output_dir: Option<PathBuf>,
}

#[derive(Parser)]
struct PreflightArgs {
    #[command(flatten)]
    filters: FilterArgs,
}

fn main() {
    if let Err(err) = run() {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), String> {
    logging::init_logging("customer-profiling")?;
    let cli = Cli::parse();
    match cli.command {
        Command::Generate(args) => run_generate(args),
        Command::Report(args) => run_report(args),
        Command::Preflight(args) => run_preflight(args),
    }
}

fn run_generate(args: GenerateArgs) -> Result<(), String> {
    let seed = args.seed.unwrap_or_else(random_seed);
    let config = GeneratorConfig {
        customers: args.customers,
        agencies: args.agencies,
        internal_accounts: args.internal_accounts,
        null_agency_ratio: args.null_agency_ratio,
        second_agency_ratio: args.second_agency_ratio,
        year: args.year,
    };

    log::info!(
        "Generating {} customers across {} agencies for {} (seed {})",
        config.customers,
        config.agencies,
        config.year,
        seed
    );
    let gen_start = Instant::now();
    let dataset = generate_records(&config, seed)?;
    let gen_elapsed = gen_start.elapsed();
    write_csv(&args.output, &dataset.records)?;
    // an empty list still replaces the file
    write_name_list(&args.exclude_output, &dataset.internal_accounts)?;
    log::info!(
        "wrote {} internal accounts to {}",
        dataset.internal_accounts.len(),
        args.exclude_output.display()
    );

    log::info!(
        "generated {} transactions, seed {}, output {}",
        dataset.records.len(),
        seed,
        args.output.display()
    );
    emit_info_line(&format!("Generation time: {} ms", gen_elapsed.as_millis()));

    let report_start = Instant::now();
    let records = load_csv(&args.output).map_err(|err| err.to_string())?;
    let report_config = ReportConfig {
        year: args.year,
        excluded_senders: dataset.internal_accounts.into_iter().collect(),
        top_limit: Some(10),
        ..ReportConfig::default()
    };
    let bundle = assemble_report(&records, &report_config).map_err(|err| err.to_string())?;
    log_headline(&bundle);
    emit_info_line(&format!(
        "Report time: {} ms",
        report_start.elapsed().as_millis()
    ));
    Ok(())
}

fn run_report(args: ReportArgs) -> Result<(), String> {
    let mut config = build_config(&args.filters)?;
    config.top_limit = if args.top == 0 { None } else { Some(args.top) };

    let report_start = Instant::now();
    let records = load_csv(&args.filters.input).map_err(|err| err.to_string())?;
    log::debug!(
        "loaded {} transactions from {}",
        records.len(),
        args.filters.input.display()
    );
    let bundle = assemble_report(&records, &config).map_err(|err| err.to_string())?;
    let report_elapsed = report_start.elapsed();

    log_headline(&bundle);
    log_tables(&bundle);

    if let Some(output_dir) = args.output_dir {
        let outputs = write_bundle(&bundle, &output_dir).map_err(|err| err.to_string())?;
        emit_info_line(&format!(
            "Wrote {} file(s) to {}",
            outputs.len(),
            output_dir.display()
        ));
        for path in outputs {
            emit_info_line(&format!("Report output: {}", path.display()));
        }
    }

    emit_info_line(&format!("Report time: {} ms", report_elapsed.as_millis()));
    Ok(())
}

fn run_preflight(args: PreflightArgs) -> Result<(), String> {
    let config = build_config(&args.filters)?;
    let report =
        preflight::preflight_csv(&args.filters.input, &config).map_err(|err| err.to_string())?;

    emit_info_line(&format!(
        "Preflight ({}): rows={} rows_in_year={} senders={} agencies={}",
        report.year,
        report.total_rows,
        report.rows_in_year,
        report.distinct_senders,
        report.agencies.len()
    ));
    emit_info_line(&format!(
        "Preflight issues: errors={} warnings={}",
        report.error_count(),
        report.warning_count()
    ));

    emit_issue_summary("error", &report.issues, IssueLevel::Error);
    emit_issue_summary("warning", &report.issues, IssueLevel::Warning);

    if report.error_count() > 0 {
        return Err(format!(
            "preflight failed with {} error(s)",
            report.error_count()
        ));
    }

    Ok(())
}

fn build_config(args: &FilterArgs) -> Result<ReportConfig, String> {
    let mut excluded_senders: BTreeSet<String> = args.exclude.iter().cloned().collect();
    let from_file = load_name_list(&args.exclude_file).map_err(|err| err.to_string())?;
    if !from_file.is_empty() {
        log::info!(
            "excluding {} internal account(s) listed in {}",
            from_file.len(),
            args.exclude_file.display()
        );
    }
    excluded_senders.extend(from_file);

    let agency_filter = match args.agencies.as_deref() {
        Some(value) => parse_list(value).into_iter().collect(),
        None => BTreeSet::new(),
    };

    Ok(ReportConfig {
        year: args.year,
        agency_filter,
        excluded_senders,
        windows: parse_windows(&args.windows)?,
        null_agency: if args.keep_null_agency {
            NullAgency::Keep
        } else {
            NullAgency::Drop
        },
        top_limit: None,
    })
}

fn parse_list(input: &str) -> Vec<String> {
    let mut values: Vec<String> = Vec::new();
    for raw in input.split(',') {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            continue;
        }
        if !values.iter().any(|value| value == trimmed) {
            values.push(trimmed.to_string());
        }
    }
    values
}

fn parse_windows(input: &str) -> Result<Vec<i64>, String> {
    let windows = parse_list(input)
        .iter()
        .map(|value| {
            value
                .parse::<i64>()
                .map_err(|_| format!("invalid window in --windows: {value}"))
        })
        .collect::<Result<Vec<i64>, String>>()?;
    if windows.is_empty() {
        return Err("--windows needs at least one day count".to_string());
    }
    Ok(windows)
}

fn log_headline(report: &ReportBundle) {
    emit_info_line(&format!(
        "Customers {}: records={} customers={} latest_transaction={}",
        report.year,
        report.record_count,
        report.total_customers,
        format_txn_date(&report.anchor_date)
    ));
    for (days, count) in &report.active_counts {
        emit_info_line(&format!("Active customers ({days} days): {count}"));
    }
    for entry in &report.segment_distribution {
        emit_info_line(&format!(
            "Segment {}: {} customer(s)",
            entry.segment, entry.customers
        ));
    }
}

fn log_tables(report: &ReportBundle) {
    emit_info_line(&format!("Top customers ({} rows):", report.top_customers.len()));
    for (rank, row) in report.top_customers.iter().enumerate() {
        emit_info_line(&format!(
            "  {:>3}. {} | {} | {} | {}",
            rank + 1,
            row.sender_name,
            agency_label(row.agency.as_deref()),
            row.transaction_count,
            row.segment
        ));
    }
    for (days, table) in &report.windowed_tables {
        emit_info_line(&format!(
            "Active in last {days} days: {} customer/agency row(s)",
            table.len()
        ));
    }
    emit_info_line(&format!(
        "Active every month: {} customer(s)",
        report.full_year_regulars.len()
    ));
    for row in &report.full_year_regulars {
        let count = row
            .transaction_count
            .map(|count| count.to_string())
            .unwrap_or_else(|| "-".to_string());
        emit_info_line(&format!(
            "  {} | {} | {} months | {} transactions",
            row.sender_name,
            agency_label(row.agency.as_deref()),
            row.months_active,
            count
        ));
    }
    emit_info_line(&format!(
        "Single-transaction customers: {}",
        report.single_transaction_customers.len()
    ));
}

fn agency_label(agency: Option<&str>) -> &str {
    agency.unwrap_or("-")
}

fn emit_issue_summary(label: &str, issues: &[PreflightIssue], level: IssueLevel) {
    let mut counts = std::collections::HashMap::new();
    for issue in issues.iter().filter(|issue| issue.level == level) {
        let entry = counts
            .entry(issue.message.as_str())
            .or_insert((0usize, issue.row));
        entry.0 += 1;
    }
    if counts.is_empty() {
        return;
    }

    let mut items: Vec<(&str, (usize, usize))> = counts.into_iter().collect();
    items.sort_by(|a, b| b.1 .0.cmp(&a.1 .0).then_with(|| a.0.cmp(b.0)));

    let max_items = 5usize;
    for (message, (count, first_row)) in items.iter().take(max_items) {
        emit_info_line(&format!(
            "Preflight {label}s: {message} = {count} (first at row {first_row})"
        ));
    }
    if items.len() > max_items {
        emit_info_line(&format!(
            "Preflight {}s: {} additional issue types not shown",
            label,
            items.len() - max_items
        ));
    }
}

fn random_seed() -> u64 {
    let mut rng = rand::rngs::OsRng;
    rng.gen()
}

fn ensure_parent(path: &Path) -> Result<(), String> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            create_dir_all(parent).map_err(|err| err.to_string())?;
        }
    }
    Ok(())
}

fn write_csv(output: &Path, records: &[GeneratedTransaction]) -> Result<(), String> {
    ensure_parent(output)?;
    let mut writer = csv::Writer::from_path(output).map_err(|err| err.to_string())?;
    for record in records {
        writer.serialize(record).map_err(|err| err.to_string())?;
    }
    writer.flush().map_err(|err| err.to_string())
}

fn write_name_list(output: &Path, names: &[String]) -> Result<(), String> {
    ensure_parent(output)?;
    let mut file = std::fs::File::create(output).map_err(|err| err.to_string())?;
    writeln!(file, "# operator accounts left out of customer analytics")
        .map_err(|err| err.to_string())?;
    for name in names {
        writeln!(file, "{name}").map_err(|err| err.to_string())?;
    }
    Ok(())
}

fn emit_info_line(message: &str) {
    if log::log_enabled!(log::Level::Info) {
        log::info!("{}", message);
    } else {
        println!("{message}");
    }
}

pub mod activity;
pub mod aggregation;
pub mod coverage;
pub mod dates;
pub mod error;
pub mod export;
pub mod filter;
pub mod generator;
pub mod loader;
pub mod models;
pub mod preflight;
pub mod report;
pub mod segment;

pub use error::{DataError, ReportError, ReportResult};
pub use models::{parse, RawTransactionRow, TransactionRecord};
pub use report::{assemble_report, build_report, ReportBundle, ReportConfig};

use thiserror::Error;

/// Problems with the input rows themselves. Any one of these aborts the load.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DataError {
    #[error("row {row}: cannot parse transaction date '{value}'")]
    UnparseableDate { row: usize, value: String },

    #[error("row {row}: required field '{field}' is missing")]
    MissingRequiredField { row: usize, field: &'static str },
}

#[derive(Error, Debug)]
pub enum ReportError {
    #[error(transparent)]
    Data(#[from] DataError),

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("{operation} requires at least one transaction")]
    EmptyInput { operation: &'static str },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type ReportResult<T> = Result<T, ReportError>;

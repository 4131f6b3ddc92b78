use thiserror::Error;

#[derive(Error, Debug)]
pub enum FinanceError {
    #[error("Database error: {0}")]
    Db(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[cfg(feature = "xlsx")]
    #[error("Spreadsheet error: {0}")]
    Spreadsheet(#[from] calamine::Error),

    #[error("Unsupported file type: {0} (expected .ofx, .csv, .xlsx or .xls)")]
    UnsupportedFile(String),

    #[error("File too large: {size} bytes (limit {limit} bytes)")]
    FileTooLarge { size: u64, limit: u64 },

    #[error("Header row not found in {0}: expected a date column followed by a description column")]
    HeaderNotFound(String),

    #[error("Required columns not identified: {0}")]
    MissingColumns(String),

    #[error("Unknown card: {0}")]
    UnknownCard(String),

    #[error("Unknown rule: {0}")]
    UnknownRule(i64),

    #[error("Settings error: {0}")]
    Settings(String),

    #[error("{0}")]
    Invalid(String),
}

pub type Result<T> = std::result::Result<T, FinanceError>;

use thiserror::Error;

/// Errors raised at the edges of the tool: reading the source tables,
/// writing report files, and parsing period labels typed by a user.
///
/// The metric computations themselves never fail; degenerate inputs turn
/// into zero or undefined values instead.
#[derive(Debug, Error)]
pub enum ReportError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid period label '{0}', expected YYYY-MM")]
    InvalidPeriod(String),
}

pub type Result<T> = std::result::Result<T, ReportError>;

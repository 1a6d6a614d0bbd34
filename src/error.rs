//! Error types for the member-atlas pipelines.
//!
//! - `AppError`: domain errors raised by the spreadsheet, scraping and
//!   geocoding stages
//! - `Result<T>`: alias using `AppError`
//!
//! Per-row failures are logged and skipped by the pipelines; an `AppError`
//! reaching `main` ends the run.

use thiserror::Error;

// ============================================================================
// DOMAIN ERROR TYPE
// ============================================================================

#[derive(Debug, Error)]
pub enum AppError {
    /// Bad CLI input or an unusable file path
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// A column the pipeline depends on is absent from the header row
    #[error("Missing column '{0}' in spreadsheet")]
    MissingColumn(String),

    /// Workbook could not be read or written
    #[error("Spreadsheet error: {0}")]
    Spreadsheet(String),

    /// Network request failed
    #[error("Network error: {0}")]
    Network(String),

    /// Failed to parse a response body
    #[error("Parse error: {0}")]
    Parse(String),

    /// External service answered with an error status
    #[error("Service error ({service}): {message}")]
    Service {
        service: &'static str,
        message: String,
    },

    /// No usable geocoding key configured
    #[error("Google Maps API key is not configured")]
    MissingApiKey,

    /// Nothing could be placed on the map
    #[error("No geocoded locations to render")]
    NoLocations,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic error with context
    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

impl AppError {
    pub fn network(msg: impl Into<String>) -> Self {
        Self::Network(msg.into())
    }

    pub fn service(service: &'static str, msg: impl Into<String>) -> Self {
        Self::Service {
            service,
            message: msg.into(),
        }
    }

    pub fn spreadsheet(msg: impl Into<String>) -> Self {
        Self::Spreadsheet(msg.into())
    }
}

impl From<reqwest::Error> for AppError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_timeout() {
            Self::Network(format!("request timed out: {}", error))
        } else if error.is_decode() {
            Self::Parse(error.to_string())
        } else {
            Self::Network(error.to_string())
        }
    }
}

impl From<calamine::Error> for AppError {
    fn from(error: calamine::Error) -> Self {
        Self::Spreadsheet(error.to_string())
    }
}

impl From<rust_xlsxwriter::XlsxError> for AppError {
    fn from(error: rust_xlsxwriter::XlsxError) -> Self {
        Self::Spreadsheet(error.to_string())
    }
}

impl From<csv::Error> for AppError {
    fn from(error: csv::Error) -> Self {
        Self::Spreadsheet(error.to_string())
    }
}

pub type Result<T> = std::result::Result<T, AppError>;

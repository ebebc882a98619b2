use thiserror::Error;

use crate::column_normalizer::CanonicalColumn;

/// The input could not be read as a grid of rows and columns.
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("Failed to read workbook: {0}")]
    Workbook(String),

    #[error("The workbook does not contain any worksheet")]
    NoWorksheet,

    #[error("The spreadsheet is empty")]
    Empty,

    #[error("Input is neither a workbook nor delimited text: {0}")]
    NotTabular(String),

    #[error("Failed to read input file: {0}")]
    Io(#[from] std::io::Error),
}

/// Failure reported by a text-generation backend.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ServiceError {
    #[error("Request to text generation service failed: {0}")]
    Request(String),

    #[error("Text generation service returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Text generation service returned no completion text")]
    EmptyCompletion,
}

/// Reasons the expert ranking path could not produce a result.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ExpertError {
    #[error("No API credential is configured")]
    CredentialMissing,

    #[error("Text generation service unavailable: {0}")]
    ServiceUnavailable(String),

    #[error("Could not parse expert analysis: {0}")]
    Parse(String),
}

impl From<ServiceError> for ExpertError {
    fn from(err: ServiceError) -> Self {
        ExpertError::ServiceUnavailable(err.to_string())
    }
}

/// Non-fatal conditions raised while normalizing a sheet.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum NormalizationWarning {
    #[error("No source column found for '{field}', filled with empty values")]
    MappingAmbiguity { field: CanonicalColumn },

    #[error(
        "{invalid} of {total} rows have an invalid name; name filter skipped (likely a column mapping problem)"
    )]
    SanitizationAbort { invalid: usize, total: usize },
}

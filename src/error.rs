use thiserror::Error;

/// Errors surfaced to the caller of the grouping pipeline.
///
/// Per-row problems (malformed sections, geocoding failures) are never
/// reported here; they are recovered inside the pipeline.
#[derive(Error, Debug)]
pub enum GroupingError {
    #[error("Input file header is not valid: expected {expected:?}, found {found:?}")]
    HeaderInvalid {
        expected: Vec<String>,
        found: Vec<String>,
    },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Cannot read input '{path}': {reason}")]
    InputUnreadable { path: String, reason: String },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, GroupingError>;

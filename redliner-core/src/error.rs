//! Error types for redliner-core

use thiserror::Error;

/// Byte ceiling for uploaded contracts (10 MB).
pub const MAX_UPLOAD_BYTES: u64 = 10_485_760;

/// Main error type for the redliner-core library
#[derive(Error, Debug)]
pub enum Error {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parsing error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),

    /// Upload rejected locally: not a PDF
    #[error("only PDF files are supported: {0}")]
    InvalidFileType(String),

    /// Upload rejected locally: over the size ceiling
    #[error("file is {size} bytes, upload limit is {limit} bytes")]
    FileTooLarge { size: u64, limit: u64 },

    /// Analysis backend error (transport failure or non-success response)
    #[error("backend error: {0}")]
    Backend(String),

    /// Export requested before an analysis exists
    #[error("no analysis to export")]
    NothingToExport,
}

/// Result type alias for redliner-core
pub type Result<T> = std::result::Result<T, Error>;

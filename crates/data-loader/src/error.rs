//! Error types for the data-loader crate.
//!
//! Every fallible operation in this crate returns [`Result<T>`], so callers
//! can use `?` and match on the variant when they care about the cause.

use thiserror::Error;

/// Errors that can occur while fetching, parsing or batching rating data
#[derive(Error, Debug)]
pub enum DataLoadError {
    /// File could not be found or opened
    #[error("Failed to open file: {path}")]
    FileNotFound { path: String },

    /// I/O error occurred while reading file
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// A four-column line whose fields are not valid numbers
    ///
    /// Lines with the wrong number of columns are skipped, not reported.
    #[error("Parse error at line {line} in {file}: {reason}")]
    ParseError {
        file: String,
        line: usize,
        reason: String,
    },

    /// Batch size of zero would never yield a batch
    #[error("Batch size must be greater than zero")]
    InvalidBatchSize,

    /// The file parsed fine but contained no usable rating
    #[error("No ratings found in {file}")]
    EmptyDataset { file: String },

    /// Fetching the dataset archive failed
    #[error("Download of {url} failed: {reason}")]
    Download { url: String, reason: String },

    /// The downloaded archive could not be unpacked
    #[error("Failed to extract {path}: {reason}")]
    Archive { path: String, reason: String },
}

/// Instead of writing `Result<T, DataLoadError>` everywhere,
/// we can write `Result<T>`
pub type Result<T> = std::result::Result<T, DataLoadError>;

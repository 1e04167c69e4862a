//! Error types for the factorization crate.

use data_loader::DataLoadError;
use thiserror::Error;

/// Errors from computing an evaluation metric
#[derive(Error, Debug, PartialEq, Eq)]
pub enum MetricError {
    /// Nothing to average over
    #[error("Cannot compute {metric} of an empty input")]
    Empty { metric: &'static str },

    /// Labels and predictions must pair up one to one
    #[error("Length mismatch: {labels} labels but {preds} predictions")]
    LengthMismatch { labels: usize, preds: usize },
}

/// Errors that can occur while building, training or evaluating a model
#[derive(Error, Debug)]
pub enum FactorizationError {
    /// Failure inside a tensor operation
    #[error("Tensor error: {0}")]
    Candle(#[from] candle_core::Error),

    #[error(transparent)]
    Data(#[from] DataLoadError),

    #[error(transparent)]
    Metric(#[from] MetricError),

    /// An id does not fit inside its embedding table
    #[error("{field} id {id} is out of range (embedding has {bound} rows)")]
    IdOutOfRange {
        field: &'static str,
        id: u32,
        bound: usize,
    },

    /// A training setting is outside its allowed range
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// A config file is not valid JSON for [`crate::TrainConfig`]
    #[error("Failed to parse config: {0}")]
    ConfigFormat(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, FactorizationError>;

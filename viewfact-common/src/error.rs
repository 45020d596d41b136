//! Common error types for viewfact

use thiserror::Error;

/// Common result type for viewfact operations
pub type Result<T> = std::result::Result<T, Error>;

/// Environmental failures of the pipeline.
///
/// Data-quality problems in individual records are never reported through
/// this type; those become reject reasons on the record itself.
#[derive(Error, Debug)]
pub enum Error {
    /// Database operation error (wraps sqlx::Error)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV read or write error (wraps csv::Error, whose message already
    /// names CSV)
    #[error("{0}")]
    Csv(#[from] csv::Error),

    /// JSON serialization error (wraps serde_json::Error)
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Required input file or table not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Invalid caller-supplied parameter
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

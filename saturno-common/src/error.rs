//! Common error types for Saturno

use thiserror::Error;

/// Common result type for Saturno operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types shared by the store and configuration layers
#[derive(Error, Debug)]
pub enum Error {
    /// Document store operation error (wraps mongodb::error::Error)
    #[error("Database error: {0}")]
    Database(#[from] mongodb::error::Error),

    /// Failure converting a value into a BSON document
    #[error("Serialization error: {0}")]
    Serialization(#[from] bson::ser::Error),

    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Internal server error
    #[error("Internal error: {0}")]
    Internal(String),
}

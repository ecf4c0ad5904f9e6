//! Error types for the Kohonen SOM engine.

use thiserror::Error;

/// The main error type for SOM operations.
#[derive(Error, Debug)]
pub enum KohonenError {
    /// Invalid configuration. The lattice is never built from one.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Input data has the wrong dimensionality or width.
    #[error("Shape error: {0}")]
    Shape(String),

    /// Operation is not allowed in the current lattice state.
    #[error("Illegal state: {0}")]
    IllegalState(String),

    /// Numeric failure during training.
    #[error("Computation error: {0}")]
    Computation(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Invalid snapshot file.
    #[error("Invalid snapshot format: {0}")]
    InvalidSnapshot(String),
}

/// Result type alias for SOM operations.
pub type Result<T> = std::result::Result<T, KohonenError>;

impl From<bincode::Error> for KohonenError {
    fn from(err: bincode::Error) -> Self {
        KohonenError::Serialization(err.to_string())
    }
}

impl From<ndarray::ShapeError> for KohonenError {
    fn from(err: ndarray::ShapeError) -> Self {
        KohonenError::Shape(err.to_string())
    }
}

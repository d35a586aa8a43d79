//! Error types for the persona classifier

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for persona operations
pub type Result<T> = std::result::Result<T, PersonaError>;

/// Why the survey dataset could not be turned into training data
#[derive(Error, Debug)]
pub enum DatasetLoadError {
    #[error("dataset not found: {}", path.display())]
    NotFound { path: PathBuf },

    #[error("malformed dataset: {reason}")]
    Malformed { reason: String },
}

impl DatasetLoadError {
    /// Shorthand for a `Malformed` error
    pub fn malformed(reason: impl Into<String>) -> Self {
        DatasetLoadError::Malformed { reason: reason.into() }
    }
}

/// Main error type for the persona classifier
#[derive(Error, Debug)]
pub enum PersonaError {
    #[error("Dataset load error: {0}")]
    DatasetLoad(#[from] DatasetLoadError),

    #[error("Training error: {0}")]
    TrainingError(String),

    #[error("Inference error: {0}")]
    InferenceError(String),

    #[error("Invalid shape: expected {expected}, got {actual}")]
    ShapeError { expected: String, actual: String },

    #[error("Model not fitted")]
    ModelNotFitted,

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl PersonaError {
    /// True when the dataset file was absent
    pub fn is_dataset_not_found(&self) -> bool {
        matches!(self, PersonaError::DatasetLoad(DatasetLoadError::NotFound { .. }))
    }

    /// True for any dataset load failure (absent or malformed)
    pub fn is_dataset_error(&self) -> bool {
        matches!(self, PersonaError::DatasetLoad(_))
    }
}

impl From<polars::error::PolarsError> for PersonaError {
    fn from(err: polars::error::PolarsError) -> Self {
        PersonaError::DatasetLoad(DatasetLoadError::malformed(err.to_string()))
    }
}

impl From<serde_json::Error> for PersonaError {
    fn from(err: serde_json::Error) -> Self {
        PersonaError::SerializationError(err.to_string())
    }
}

impl From<ndarray::ShapeError> for PersonaError {
    fn from(err: ndarray::ShapeError) -> Self {
        PersonaError::ShapeError {
            expected: "valid shape".to_string(),
            actual: err.to_string(),
        }
    }
}

//! Error types for online kernel machines

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SVMError {
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("Ensemble prediction requires at least two models, got none")]
    EmptyEnsemble,

    #[error("Ensemble prediction requires at least two models, got one")]
    SingleModelEnsemble,

    #[error("Model has no support vectors")]
    EmptyModel,

    #[error("Numeric instability: {0}")]
    NumericInstability(String),

    #[error("Invalid label: expected -1 or +1, got {0}")]
    InvalidLabel(f64),

    #[error("Empty dataset")]
    EmptyDataset,

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

pub type Result<T> = std::result::Result<T, SVMError>;

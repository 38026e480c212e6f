use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum AnalysisError {
    #[error("Field not found: {0}")]
    FieldNotFound(String),

    #[error("Series {0} contains non-string elements")]
    InvalidElementType(String),

    #[error("Insufficient data: {0}")]
    InsufficientData(String),

    #[error("Invalid number: {0:?}")]
    InvalidNumber(String),

    #[error("Invalid data: {0}")]
    InvalidData(String),

    #[error("Store error: {0}")]
    StoreError(String),
}

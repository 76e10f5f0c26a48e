use crate::field::FieldErrors;
use netop_api::SchemeError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, CoreError>;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Invalid object: {0}")]
    Invalid(#[from] FieldErrors),

    #[error("Unexpected kind: expected {expected}, got {actual}")]
    UnexpectedKind { expected: String, actual: String },

    #[error("Scheme error: {0}")]
    SchemeError(#[from] SchemeError),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

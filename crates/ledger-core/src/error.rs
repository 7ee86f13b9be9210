use thiserror::Error;

#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("Invalid input: {field} — {reason}")]
    InvalidInput { field: String, reason: String },

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Business rule violation: {0}")]
    BusinessRule(String),

    #[error("Date error: {0}")]
    DateError(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl From<serde_json::Error> for LedgerError {
    fn from(e: serde_json::Error) -> Self {
        LedgerError::SerializationError(e.to_string())
    }
}

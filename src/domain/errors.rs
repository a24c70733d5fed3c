//! Domain errors. Used by ports and use cases.
//!
//! Adapters map infrastructure errors into these.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DomainError {
    /// Network failure, timeout or TLS error talking to the table store.
    #[error("Table store transport error: {0}")]
    Transport(String),

    /// Store answered with a non-success status (bad key, bad formula, missing table).
    #[error("Table store API error {status}: {body}")]
    Api { status: u16, body: String },

    #[error("Decode error: {0}")]
    Decode(String),

    #[error("Record not found: {0}")]
    NotFound(String),

    /// Caller-supplied value cannot be embedded in a filter formula.
    #[error("Invalid filter value: {0}")]
    InvalidFilter(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Snapshot export failed: {0}")]
    Export(String),

    #[error("Prompt failed: {0}")]
    Ui(String),
}

impl From<serde_json::Error> for DomainError {
    fn from(e: serde_json::Error) -> Self {
        DomainError::Decode(e.to_string())
    }
}

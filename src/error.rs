//! Crate-level error type
//!
//! Every stage fails loudly: errors propagate up to the CLI, which prints
//! them and exits non-zero. There is no retry or best-effort mode in this
//! layer; retries belong to the orchestrator that sequences the stages.

use thiserror::Error;

use crate::promote::PromoteError;
use crate::storage::StorageError;

/// Pipeline errors, grouped by the failure taxonomy the stages share
#[derive(Debug, Error)]
pub enum Error {
    /// Input is structurally wrong: missing required columns, malformed rows
    #[error("schema error: {0}")]
    Schema(String),

    /// A stage's precondition does not hold: empty split, too few classes,
    /// missing upstream artifact
    #[error("precondition failed: {0}")]
    Precondition(String),

    /// Artifact store read/write failure
    #[error(transparent)]
    Storage(#[from] StorageError),

    /// Promotion failure, including the distinct partial-copy case
    #[error(transparent)]
    Promotion(#[from] PromoteError),

    /// Artifact (de)serialization failure
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Invalid configuration
    #[error("config error: {0}")]
    Config(String),
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}

/// Result type for pipeline operations
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_error_display() {
        let e = Error::Schema("missing column 'species'".to_string());
        assert_eq!(e.to_string(), "schema error: missing column 'species'");
    }

    #[test]
    fn test_storage_error_converts() {
        let se = StorageError::NotFound("runs/a/model.json".to_string());
        let e: Error = se.into();
        assert!(matches!(e, Error::Storage(_)));
    }
}

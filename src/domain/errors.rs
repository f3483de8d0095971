//! Domain errors for the moldflow workflow engine.

use thiserror::Error;
use uuid::Uuid;

/// Domain-level errors surfaced by workflow operations.
///
/// All variants except `Database` and `Serialization` are client errors:
/// the caller sent something the current state of the world rejects.
/// `Conflict` is the only retryable one.
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Not found: {0}")]
    NotFound(Uuid),

    #[error("Operation {operation} is not valid while the request is {current}")]
    InvalidStateTransition { operation: String, current: String },

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Actor is not permitted to {operation}: {reason}")]
    Unauthorized { operation: String, reason: String },

    #[error("Concurrent modification: {entity} {id} changed between read and write")]
    Conflict { entity: String, id: Uuid },

    #[error("Database error: {0}")]
    Database(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

pub type DomainResult<T> = Result<T, DomainError>;

impl DomainError {
    /// Whether a caller may retry the failed operation as-is.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Conflict { .. })
    }
}

impl From<sqlx::Error> for DomainError {
    fn from(err: sqlx::Error) -> Self {
        DomainError::Database(err.to_string())
    }
}

impl From<serde_json::Error> for DomainError {
    fn from(err: serde_json::Error) -> Self {
        DomainError::Serialization(err.to_string())
    }
}

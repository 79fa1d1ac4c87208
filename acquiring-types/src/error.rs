//! Error types for the acquiring core.

/// Domain-level errors (business rule violations).
#[derive(Debug, thiserror::Error)]
pub enum DomainError {
    #[error("Amount cannot be negative")]
    NegativeAmount,

    #[error("Validation error: {0}")]
    ValidationError(String),
}

/// Repository-level errors (data access failures).
///
/// A missing entity is NOT an error: repository `get` returns `Ok(None)`
/// so callers can tell "not found" apart from a storage failure.
#[derive(Debug, thiserror::Error)]
pub enum RepoError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Transaction error: {0}")]
    Transaction(String),

    #[error("Session is closed")]
    SessionClosed,
}

/// Saga-level errors.
///
/// `InvalidUsage` is a wiring mistake and must reach the integrator as a
/// raised failure; it is never folded into an `OperationResponse`.
#[derive(Debug, thiserror::Error)]
pub enum SagaError {
    #[error("Step `{step}` does not resolve to an operation type")]
    InvalidUsage { step: String },

    #[error(transparent)]
    Repo(#[from] RepoError),
}

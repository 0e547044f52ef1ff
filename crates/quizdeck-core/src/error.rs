//! Domain error types.
//!
//! Store traits return `anyhow::Result`. A `QuizError` raised inside a store
//! transaction travels through `anyhow` and is recovered with
//! [`QuizError::from_store`], so callers classify failures without string
//! matching.

use thiserror::Error;

/// Errors surfaced by quizdeck operations.
#[derive(Debug, Error)]
pub enum QuizError {
    /// Input failed validation. The message is meant for the caller.
    #[error("{0}")]
    Validation(String),

    /// The requested record does not exist or is not visible to the caller.
    #[error("{0}")]
    NotFound(String),

    /// A uniqueness constraint would be violated.
    #[error("{0}")]
    Conflict(String),

    /// The operation needs an authenticated caller.
    #[error("authentication required")]
    Unauthorized,

    /// Login failed.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// The caller is authenticated but lacks the capability.
    #[error("{0}")]
    Forbidden(String),

    /// The backing store failed.
    #[error("storage failure: {0:#}")]
    Storage(anyhow::Error),
}

pub type QuizResult<T> = std::result::Result<T, QuizError>;

impl QuizError {
    /// Recover a domain error carried through a store call, treating
    /// anything else as a storage failure.
    pub fn from_store(err: anyhow::Error) -> Self {
        match err.downcast::<QuizError>() {
            Ok(domain) => domain,
            Err(other) => QuizError::Storage(other),
        }
    }

    /// Returns `true` for failures the caller caused.
    pub fn is_client_error(&self) -> bool {
        !matches!(self, QuizError::Storage(_))
    }
}

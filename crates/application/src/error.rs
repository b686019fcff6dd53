//! Application error types

use envshield_domain::DomainError;
use thiserror::Error;

use crate::use_cases::ResolveEnvironmentError;

/// Application-level errors.
#[derive(Debug, Error)]
pub enum ApplicationError {
    /// A domain validation error occurred.
    #[error("domain error: {0}")]
    Domain(#[from] DomainError),

    /// Resolving an environment failed.
    #[error("resolve error: {0}")]
    Resolve(#[from] ResolveEnvironmentError),

    /// Resolution found a reference cycle; the values must not be used.
    #[error("circular dependencies in: {0}")]
    Circular(String),
}

/// Result type alias for application operations.
pub type ApplicationResult<T> = Result<T, ApplicationError>;

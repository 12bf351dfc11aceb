//! Unified error handling for the domain services.

use thiserror::Error;

use crate::db::RepositoryError;

/// Service-level error type.
///
/// Everything a presentation layer needs to pick a response from: the
/// variants distinguish caller mistakes (`NotFound`, `InvalidArgument`,
/// `InvalidOperation`, `EmptyCart`), retryable contention (`Conflict`,
/// `Timeout`), and backend failures (`Persistence`).
#[derive(Debug, Error)]
pub enum DomainError {
    /// The requested entity does not exist or is not visible to the caller.
    #[error("not found: {0}")]
    NotFound(String),

    /// A request parameter failed validation.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The operation is not allowed in the entity's current state.
    #[error("invalid operation: {0}")]
    InvalidOperation(String),

    /// Checkout was attempted against an absent or empty cart.
    #[error("shopping cart is empty")]
    EmptyCart,

    /// The entity changed concurrently; retrying is the caller's choice.
    #[error("conflict: {0}")]
    Conflict(String),

    /// The store did not answer within the operation deadline.
    #[error("operation timed out")]
    Timeout,

    /// The persistence backend failed.
    #[error("persistence error: {0}")]
    Persistence(#[source] RepositoryError),
}

impl From<RepositoryError> for DomainError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound => Self::NotFound("entity not found".to_owned()),
            RepositoryError::Conflict(message) => Self::Conflict(message),
            RepositoryError::Timeout => Self::Timeout,
            other => Self::Persistence(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_domain_error_display() {
        let err = DomainError::NotFound("offer 12".to_owned());
        assert_eq!(err.to_string(), "not found: offer 12");

        let err = DomainError::InvalidOperation("already rejected".to_owned());
        assert_eq!(err.to_string(), "invalid operation: already rejected");

        assert_eq!(DomainError::EmptyCart.to_string(), "shopping cart is empty");
    }

    #[test]
    fn test_repository_error_mapping() {
        assert!(matches!(
            DomainError::from(RepositoryError::NotFound),
            DomainError::NotFound(_)
        ));
        assert!(matches!(
            DomainError::from(RepositoryError::Conflict("v2".to_owned())),
            DomainError::Conflict(_)
        ));
        assert!(matches!(
            DomainError::from(RepositoryError::Timeout),
            DomainError::Timeout
        ));
        assert!(matches!(
            DomainError::from(RepositoryError::DataCorruption("bad status".to_owned())),
            DomainError::Persistence(_)
        ));
    }
}

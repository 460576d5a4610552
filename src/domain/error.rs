//! Domain-level errors (no external dependencies)

use thiserror::Error;

use crate::domain::member::MemberId;

/// Domain errors represent violations of the hierarchy rules.
/// These are independent of import formats and I/O.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("no member found with id '{0}'")]
    MemberNotFound(MemberId),

    #[error("invalid operation: {0}")]
    InvalidOperation(String),

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("invalid state: {0}")]
    InvalidState(String),
}

/// Result type for domain operations.
pub type DomainResult<T> = Result<T, DomainError>;

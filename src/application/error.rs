//! Application-level errors (wraps domain errors)

use thiserror::Error;

use crate::application::validation::FieldErrors;
use crate::domain::DomainError;

/// Application errors wrap domain errors and add boundary-level context.
#[derive(Error, Debug)]
pub enum ApplicationError {
    #[error("{0}")]
    Domain(#[from] DomainError),

    #[error("incorrect team structure: {0}")]
    IncorrectStructure(FieldErrors),

    #[error("there is already a member with email '{0}'")]
    EmailInUse(String),

    #[error("invalid JSON: {0}")]
    InvalidJson(String),

    #[error("the file is empty")]
    EmptyImport,

    #[error("import of {size} bytes exceeds the limit of {limit} bytes")]
    ImportTooLarge { size: u64, limit: u64 },

    #[error("config error: {message}")]
    Config { message: String },

    #[error("operation failed: {context}")]
    OperationFailed {
        context: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl ApplicationError {
    /// The domain error underneath, if any.
    pub fn as_domain(&self) -> Option<&DomainError> {
        match self {
            ApplicationError::Domain(e) => Some(e),
            _ => None,
        }
    }
}

/// Result type for application layer operations.
pub type ApplicationResult<T> = Result<T, ApplicationError>;

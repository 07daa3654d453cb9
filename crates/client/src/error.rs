use thiserror::Error;
use validator::ValidationErrors;

use ceramerp_backend::BackendError;
use ceramerp_core::{DomainError, FieldErrors};

pub type ClientResult<T> = Result<T, ClientError>;

/// Failure of a hook call.
///
/// Validation errors are returned for inline display and never notified;
/// every other variant has been notified once by the time it is returned.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ClientError {
    #[error("invalid input: {0}")]
    Validation(FieldErrors),

    #[error(transparent)]
    Backend(#[from] BackendError),

    #[error(transparent)]
    Domain(DomainError),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("conflict: {0}")]
    Conflict(String),
}

impl ClientError {
    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound(what.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    /// Text shown in the error notification. Backend messages pass through
    /// verbatim.
    pub fn user_message(&self) -> String {
        match self {
            ClientError::Backend(e) => e.message(),
            ClientError::Domain(e) => e.to_string(),
            ClientError::NotFound(what) => format!("{what} not found"),
            ClientError::Conflict(msg) => msg.clone(),
            ClientError::Validation(errors) => errors.to_string(),
        }
    }
}

impl From<DomainError> for ClientError {
    fn from(value: DomainError) -> Self {
        match value {
            DomainError::NotFound(what) => Self::NotFound(what),
            DomainError::Conflict(msg) => Self::Conflict(msg),
            other => Self::Domain(other),
        }
    }
}

impl From<ValidationErrors> for ClientError {
    fn from(value: ValidationErrors) -> Self {
        Self::Validation(value.into())
    }
}

impl From<FieldErrors> for ClientError {
    fn from(value: FieldErrors) -> Self {
        Self::Validation(value)
    }
}

//! Business-rule failures shared by the domain crates.

use thiserror::Error;

pub type DomainResult<T> = Result<T, DomainError>;

/// Deterministic failure raised before or after talking to the backend.
///
/// Transport and backend failures live in `ceramerp-backend`; this type only
/// describes what the domain rules themselves reject.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Input rejected by a domain rule (negative quantity, empty order).
    #[error("validation failed: {0}")]
    Validation(String),

    /// Computed state broke a rule that should always hold.
    #[error("invariant violated: {0}")]
    InvariantViolation(String),

    #[error("invalid identifier: {0}")]
    InvalidId(String),

    #[error("not found: {0}")]
    NotFound(String),

    /// Stale stock snapshot, insufficient stock or a wrong order status.
    #[error("conflict: {0}")]
    Conflict(String),

    /// The current role lacks the permission for the action.
    #[error("forbidden: {0}")]
    Forbidden(String),
}

impl DomainError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn invariant(msg: impl Into<String>) -> Self {
        Self::InvariantViolation(msg.into())
    }

    pub fn invalid_id(msg: impl Into<String>) -> Self {
        Self::InvalidId(msg.into())
    }

    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound(what.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }

    pub fn forbidden(msg: impl Into<String>) -> Self {
        Self::Forbidden(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_carry_the_detail() {
        let err = DomainError::conflict("stock row changed");
        assert_eq!(err.to_string(), "conflict: stock row changed");
        assert_eq!(
            DomainError::not_found("item JAR-01").to_string(),
            "not found: item JAR-01"
        );
    }
}

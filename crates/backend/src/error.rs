use serde::Deserialize;
use thiserror::Error;

pub type BackendResult<T> = Result<T, BackendError>;

/// Postgres error code for unique constraint violations.
pub const UNIQUE_VIOLATION: &str = "23505";

/// Failure talking to the backend.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BackendError {
    /// The request never produced a response (connect, TLS, timeout).
    #[error("network error: {0}")]
    Network(String),

    /// The backend answered with a non-success status.
    #[error("backend error ({status}): {message}")]
    Api {
        status: u16,
        code: Option<String>,
        message: String,
        details: Option<String>,
    },

    /// Rows came back in a shape the client could not decode.
    #[error("failed to decode rows from '{table}': {message}")]
    Decode { table: String, message: String },

    /// A single row was expected but none matched.
    #[error("no rows returned from '{0}'")]
    Empty(String),

    /// The request could not be built (e.g. body not serializable).
    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

impl BackendError {
    pub fn api(status: u16, code: Option<String>, message: impl Into<String>) -> Self {
        Self::Api {
            status,
            code,
            message: message.into(),
            details: None,
        }
    }

    /// Message suitable for showing to the user.
    ///
    /// For API errors this is the backend-provided message verbatim.
    pub fn message(&self) -> String {
        match self {
            BackendError::Api { message, .. } => message.clone(),
            other => other.to_string(),
        }
    }

    pub fn code(&self) -> Option<&str> {
        match self {
            BackendError::Api { code, .. } => code.as_deref(),
            _ => None,
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            BackendError::Api { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_unique_violation(&self) -> bool {
        self.code() == Some(UNIQUE_VIOLATION)
    }
}

/// Error body returned by the REST layer.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct ErrorBody {
    #[serde(default)]
    pub code: Option<serde_json::Value>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub details: Option<String>,
    #[serde(default)]
    pub hint: Option<String>,
    // Auth service variants.
    #[serde(default)]
    pub msg: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub error_description: Option<String>,
    #[serde(default)]
    pub error_code: Option<String>,
}

impl ErrorBody {
    pub(crate) fn into_error(self, status: u16, raw: &str) -> BackendError {
        let code = self.error_code.or_else(|| match self.code {
            Some(serde_json::Value::String(s)) => Some(s),
            _ => self.error.clone(),
        });
        let message = self
            .message
            .or(self.error_description)
            .or(self.msg)
            .or(self.error)
            .unwrap_or_else(|| {
                if raw.trim().is_empty() {
                    format!("request failed with status {status}")
                } else {
                    raw.trim().to_string()
                }
            });
        let details = match (self.details, self.hint) {
            (Some(d), Some(h)) => Some(format!("{d} ({h})")),
            (d, h) => d.or(h),
        };
        BackendError::Api {
            status,
            code,
            message,
            details,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rest_error_body_keeps_backend_message() {
        let raw = r#"{"code":"23505","message":"duplicate key value","details":"Key exists","hint":null}"#;
        let body: ErrorBody = serde_json::from_str(raw).unwrap();
        let err = body.into_error(409, raw);
        assert!(err.is_unique_violation());
        assert_eq!(err.message(), "duplicate key value");
        assert_eq!(err.status(), Some(409));
    }

    #[test]
    fn auth_error_body_uses_description() {
        let raw = r#"{"error":"invalid_grant","error_description":"Invalid login credentials"}"#;
        let body: ErrorBody = serde_json::from_str(raw).unwrap();
        let err = body.into_error(400, raw);
        assert_eq!(err.code(), Some("invalid_grant"));
        assert_eq!(err.message(), "Invalid login credentials");
    }

    #[test]
    fn empty_body_falls_back_to_status() {
        let err = ErrorBody::default().into_error(502, "");
        assert_eq!(err.message(), "request failed with status 502");
    }
}

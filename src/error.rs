//! Structured error codes shared by the service and HTTP layers.
//!
//! DESIGN
//! ======
//! Every typed error exposes a grepable code and a retryable flag. Routes
//! turn any `ErrorCode` into the same `{code, message, retryable}` JSON body,
//! so clients never have to parse human-readable messages.

use serde::Serialize;

/// Grepable error code and retryable flag for structured error bodies.
pub trait ErrorCode: std::fmt::Display {
    fn error_code(&self) -> &'static str;

    fn retryable(&self) -> bool {
        false
    }
}

/// Serializable error payload returned by the HTTP layer.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ErrorBody {
    pub code: &'static str,
    pub message: String,
    pub retryable: bool,
}

impl ErrorBody {
    /// Build a body from any typed error.
    #[must_use]
    pub fn from_error(err: &(impl ErrorCode + ?Sized)) -> Self {
        Self { code: err.error_code(), message: err.to_string(), retryable: err.retryable() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, thiserror::Error)]
    #[error("panel gone")]
    struct Gone;

    impl ErrorCode for Gone {
        fn error_code(&self) -> &'static str {
            "E_GONE"
        }
    }

    #[test]
    fn body_from_typed_error() {
        let body = ErrorBody::from_error(&Gone);
        assert_eq!(body.code, "E_GONE");
        assert_eq!(body.message, "panel gone");
        assert!(!body.retryable);
    }

    #[test]
    fn body_serializes_with_stable_keys() {
        let value = serde_json::to_value(ErrorBody::from_error(&Gone)).unwrap();
        assert_eq!(value.get("code").and_then(|v| v.as_str()), Some("E_GONE"));
        assert_eq!(value.get("message").and_then(|v| v.as_str()), Some("panel gone"));
        assert_eq!(value.get("retryable").and_then(serde_json::Value::as_bool), Some(false));
    }
}

//! Domain-level error type.
//!
//! Transport agnostic: the HTTP adapter maps [`Error`] to status codes and a
//! JSON envelope. Services translate port failures into this taxonomy before
//! returning, so raw adapter errors never reach callers.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Stable machine-readable code describing the failure category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[non_exhaustive]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    /// The request is malformed or fails validation.
    InvalidRequest,
    /// No caller identity was presented.
    Unauthorized,
    /// Authenticated but not permitted to perform this action.
    Forbidden,
    /// The requested entity does not exist.
    NotFound,
    /// Unexpected failure inside the domain or a collaborator.
    InternalError,
}

/// Domain error payload carried to adapters.
///
/// ## Invariants
/// - `message` is non-empty once trimmed; constructors fall back to a
///   placeholder rather than emitting a blank message.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Error {
    code: ErrorCode,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<Value>,
}

impl Error {
    /// Create a new error with the given code and message.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        let message = message.into();
        let message = if message.trim().is_empty() {
            "unspecified error".to_owned()
        } else {
            message
        };
        Self {
            code,
            message,
            details: None,
        }
    }

    /// Stable machine-readable error code.
    pub fn code(&self) -> ErrorCode {
        self.code
    }

    /// Human-readable message returned to adapters.
    pub fn message(&self) -> &str {
        self.message.as_str()
    }

    /// Supplementary structured details for clients.
    pub fn details(&self) -> Option<&Value> {
        self.details.as_ref()
    }

    /// Attach structured details to the error.
    pub fn with_details(mut self, details: Value) -> Self {
        self.details = Some(details);
        self
    }

    /// Convenience constructor for [`ErrorCode::InvalidRequest`].
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidRequest, message)
    }

    /// Convenience constructor for [`ErrorCode::Unauthorized`].
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Unauthorized, message)
    }

    /// Convenience constructor for [`ErrorCode::Forbidden`].
    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Forbidden, message)
    }

    /// Convenience constructor for [`ErrorCode::NotFound`].
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::NotFound, message)
    }

    /// Convenience constructor for [`ErrorCode::InternalError`].
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InternalError, message)
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for Error {}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn constructors_set_the_expected_code() {
        assert_eq!(Error::not_found("gone").code(), ErrorCode::NotFound);
        assert_eq!(Error::forbidden("no").code(), ErrorCode::Forbidden);
        assert_eq!(
            Error::invalid_request("bad").code(),
            ErrorCode::InvalidRequest
        );
    }

    #[test]
    fn blank_messages_are_replaced() {
        let err = Error::internal("   ");
        assert_eq!(err.message(), "unspecified error");
    }

    #[test]
    fn details_round_trip_into_the_payload() {
        let err = Error::invalid_request("rating out of range")
            .with_details(json!({ "field": "rating" }));
        let payload = serde_json::to_value(&err).expect("serializable");
        assert_eq!(payload["code"], "invalid_request");
        assert_eq!(payload["details"]["field"], "rating");
    }

    #[test]
    fn error_codes_serialize_snake_case() {
        let raw = serde_json::to_string(&ErrorCode::InternalError).expect("serializable");
        assert_eq!(raw, "\"internal_error\"");
    }
}

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Retry metadata surfaced on transport/API errors when retries were attempted.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RetryMetadata {
    pub attempts: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_status: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_error: Option<String>,
}

/// Failure while converting between wire JSON and a typed value.
///
/// Every variant that can point at a location carries a `path` rooted at `$`
/// (for example `$.message.to.channel` or `$.elements[2]`).
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DecodeError {
    /// A required field was absent from the object.
    #[error("{path}: missing required field `{field}` on {container}")]
    MissingField {
        field: String,
        container: String,
        path: String,
    },

    /// A string did not match any value of a closed enum.
    #[error("{path}: invalid {enum_name} value {value:?}")]
    InvalidEnumValue {
        enum_name: String,
        value: String,
        path: String,
    },

    /// A tagged union had no (or an empty) discriminant field.
    #[error("{path}: missing discriminant `{field}` for {union}")]
    MissingDiscriminant {
        union: String,
        field: String,
        path: String,
    },

    /// A narrowing accessor was called against a different active variant.
    #[error("expected {expected} variant, found {actual}")]
    TypeMismatch { expected: String, actual: String },

    /// Input was not valid JSON, or had the wrong JSON type at `path`.
    #[error("{path}: {message}")]
    MalformedJson { message: String, path: String },

    /// No candidate shape of a tag-less union accepted the payload.
    #[error("{path}: payload does not match any {union} shape")]
    NoMatchingVariant { union: String, path: String },
}

impl DecodeError {
    /// Location of the failure, when the variant carries one.
    pub fn path(&self) -> Option<&str> {
        match self {
            DecodeError::MissingField { path, .. }
            | DecodeError::InvalidEnumValue { path, .. }
            | DecodeError::MissingDiscriminant { path, .. }
            | DecodeError::MalformedJson { path, .. }
            | DecodeError::NoMatchingVariant { path, .. } => Some(path),
            DecodeError::TypeMismatch { .. } => None,
        }
    }

    pub(crate) fn type_mismatch(expected: &str, actual: &str) -> Self {
        DecodeError::TypeMismatch {
            expected: expected.to_string(),
            actual: actual.to_string(),
        }
    }
}

/// Field-level validation error returned by the API.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FieldError {
    pub field: Option<String>,
    pub message: String,
}

/// Structured validation error raised by the SDK before a request is sent.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ValidationError {
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

impl ValidationError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            field: None,
        }
    }

    pub fn with_field(mut self, field: impl Into<String>) -> Self {
        self.field = Some(field.into());
        self
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(field) = &self.field {
            write!(f, "{}: {}", field, self.message)
        } else {
            write!(f, "{}", self.message)
        }
    }
}

impl std::error::Error for ValidationError {}

impl From<String> for ValidationError {
    fn from(message: String) -> Self {
        Self::new(message)
    }
}

impl From<&str> for ValidationError {
    fn from(message: &str) -> Self {
        Self::new(message)
    }
}

/// Error envelope returned by the Courier API for non-2xx responses.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct APIError {
    pub status: u16,
    /// Error type/code reported by the API (`type` or `code` in the body).
    pub code: Option<String>,
    pub message: String,
    pub request_id: Option<String>,
    #[serde(default)]
    pub fields: Vec<FieldError>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retries: Option<RetryMetadata>,
    /// Raw response body for debugging (when available).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw_body: Option<String>,
}

impl APIError {
    pub fn new(status: u16, message: impl Into<String>) -> Self {
        Self {
            status,
            code: None,
            message: message.into(),
            request_id: None,
            fields: Vec::new(),
            retries: None,
            raw_body: None,
        }
    }
}

impl fmt::Display for APIError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(code) = &self.code {
            write!(f, "{} ({}): {}", code, self.status, self.message)
        } else {
            write!(f, "{}: {}", self.status, self.message)
        }
    }
}

impl std::error::Error for APIError {}

/// Convenience alias for fallible SDK results.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Transport-level error (timeouts, DNS/TLS/connectivity).
#[derive(Debug, Error)]
#[error("{kind}: {message}")]
pub struct TransportError {
    pub kind: TransportErrorKind,
    pub message: String,
    #[source]
    pub source: Option<reqwest::Error>,
    pub retries: Option<RetryMetadata>,
}

/// Broad transport error kinds for classification.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum TransportErrorKind {
    Timeout,
    Connect,
    Request,
    Other,
}

impl fmt::Display for TransportErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            TransportErrorKind::Timeout => "timeout",
            TransportErrorKind::Connect => "connect",
            TransportErrorKind::Request => "request",
            TransportErrorKind::Other => "transport",
        };
        write!(f, "{label}")
    }
}

/// Unified error type surfaced by the SDK.
#[derive(Debug, Error)]
pub enum Error {
    #[error("decode error: {0}")]
    Decode(#[from] DecodeError),

    #[error("{0}")]
    Validation(#[from] ValidationError),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("{0}")]
    Api(#[from] APIError),

    #[error("{0}")]
    Transport(#[from] TransportError),

    #[error("config error: {0}")]
    Config(String),
}

impl Error {
    /// The decode failure, if this error came from the wire codec.
    pub fn as_decode(&self) -> Option<&DecodeError> {
        match self {
            Error::Decode(err) => Some(err),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_error_formats_with_field() {
        let err = ValidationError::new("is required").with_field("list_id");
        assert_eq!(err.to_string(), "list_id: is required");
    }

    #[test]
    fn api_error_keeps_status_and_body() {
        let api_err = APIError {
            status: 429,
            code: Some("rate_limit_error".into()),
            message: "too many requests".into(),
            request_id: Some("req_123".into()),
            fields: Vec::new(),
            retries: Some(RetryMetadata {
                attempts: 2,
                last_status: Some(429),
                last_error: None,
            }),
            raw_body: Some("{\"message\":\"too many requests\"}".into()),
        };

        assert_eq!(
            api_err.to_string(),
            "rate_limit_error (429): too many requests"
        );
        assert_eq!(api_err.status, 429);
        assert!(api_err.raw_body.is_some());
    }

    #[test]
    fn decode_error_messages_name_the_location() {
        let err = DecodeError::MissingField {
            field: "filters".into(),
            container: "AudienceFilterConfig".into(),
            path: "$.filter".into(),
        };
        assert_eq!(
            err.to_string(),
            "$.filter: missing required field `filters` on AudienceFilterConfig"
        );
        assert_eq!(err.path(), Some("$.filter"));

        let mismatch = DecodeError::type_mismatch("meta", "text");
        assert_eq!(mismatch.to_string(), "expected meta variant, found text");
        assert_eq!(mismatch.path(), None);
    }

    #[test]
    fn unified_error_exposes_decode_failures() {
        let err: Error = DecodeError::NoMatchingVariant {
            union: "SlackRecipient".into(),
            path: "$".into(),
        }
        .into();
        assert!(matches!(
            err.as_decode(),
            Some(DecodeError::NoMatchingVariant { .. })
        ));
        assert!(err.to_string().starts_with("decode error:"));
    }
}

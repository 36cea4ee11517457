//! Decode and encode errors.
//!
//! Mappers never recover: the first failure surfaces to the caller as a
//! single [`ResponseError`] annotated with the response-name path from the
//! root of the payload.

use crate::path::{PathSegment, ResponsePath};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Typed error codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[non_exhaustive]
pub enum ErrorCode {
    /// A non-optional field is absent or null.
    MissingRequiredField,
    /// The payload holds a value whose kind contradicts the descriptor.
    TypeMismatch,
    /// No adapter is registered for a custom scalar type id.
    UnknownCustomType,
    /// The underlying source ended mid-decode.
    ReaderExhausted,
    /// The payload bytes are not a structured document at all.
    InvalidPayload,
}

impl ErrorCode {
    /// Returns the string representation of the error code.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::MissingRequiredField => "MISSING_REQUIRED_FIELD",
            Self::TypeMismatch => "TYPE_MISMATCH",
            Self::UnknownCustomType => "UNKNOWN_CUSTOM_TYPE",
            Self::ReaderExhausted => "READER_EXHAUSTED",
            Self::InvalidPayload => "INVALID_PAYLOAD",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A decode or encode failure.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[error("[{code}] {message} (at {path})")]
pub struct ResponseError {
    /// Typed error code.
    pub code: ErrorCode,
    /// Human-readable error message.
    pub message: String,
    /// Path from the root of the payload to the failing field.
    pub path: ResponsePath,
}

impl ResponseError {
    /// Creates a new error at the root path.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            path: ResponsePath::root(),
        }
    }

    /// A non-optional field was absent.
    pub fn missing_field(response_name: &str) -> Self {
        Self::new(
            ErrorCode::MissingRequiredField,
            format!("missing value for non-optional field `{response_name}`"),
        )
        .at(response_name)
    }

    /// A payload value does not match the descriptor kind.
    pub fn type_mismatch(expected: impl fmt::Display, found: impl fmt::Display) -> Self {
        Self::new(
            ErrorCode::TypeMismatch,
            format!("expected {expected}, found {found}"),
        )
    }

    /// No adapter for a custom scalar.
    pub fn unknown_custom_type(type_id: impl fmt::Display) -> Self {
        Self::new(
            ErrorCode::UnknownCustomType,
            format!("no adapter registered for custom type `{type_id}`"),
        )
    }

    /// The source ended before the value was complete.
    pub fn exhausted(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ReaderExhausted, message)
    }

    /// Prefixes the path with an enclosing segment.
    #[must_use]
    pub fn at(mut self, segment: impl Into<PathSegment>) -> Self {
        self.path.push_front(segment);
        self
    }
}

/// Type alias for response results.
pub type ResponseResult<T> = std::result::Result<T, ResponseError>;

/// Extension for annotating results with the enclosing path segment.
pub trait ResultExt<T> {
    /// Prefixes the error path, if any, with `segment`.
    fn at(self, segment: impl Into<PathSegment>) -> ResponseResult<T>;
}

impl<T> ResultExt<T> for ResponseResult<T> {
    fn at(self, segment: impl Into<PathSegment>) -> ResponseResult<T> {
        self.map_err(|e| e.at(segment))
    }
}

/// Unwraps a value a reader was required to produce.
///
/// Readers already reject absent non-optional fields, so this only fails
/// for readers that do not honor that contract.
pub fn required<T>(response_name: &str, value: Option<T>) -> ResponseResult<T> {
    value.ok_or_else(|| ResponseError::missing_field(response_name))
}

/// Unwraps an element of a list whose items are non-null.
pub fn required_item<T>(value: Option<T>) -> ResponseResult<T> {
    value.ok_or_else(|| {
        ResponseError::new(
            ErrorCode::MissingRequiredField,
            "null element in a list of non-null items",
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_path_grows_outward() {
        let err = ResponseError::type_mismatch("String", "number")
            .at(1usize)
            .at("appearsIn")
            .at("hero");

        assert_eq!(err.code, ErrorCode::TypeMismatch);
        assert_eq!(err.path.to_string(), "hero.appearsIn[1]");
        assert_eq!(
            err.to_string(),
            "[TYPE_MISMATCH] expected String, found number (at hero.appearsIn[1])"
        );
    }

    #[test]
    fn test_error_serialization() {
        let err = ResponseError::missing_field("name").at("hero");
        let json = serde_json::to_value(&err).unwrap();
        assert_eq!(json["code"], "MISSING_REQUIRED_FIELD");
        assert_eq!(json["path"], serde_json::json!(["hero", "name"]));
    }

    #[test]
    fn test_required() {
        assert_eq!(required("name", Some(3)).unwrap(), 3);
        let err = required::<i32>("name", None).unwrap_err();
        assert_eq!(err.code, ErrorCode::MissingRequiredField);
    }
}

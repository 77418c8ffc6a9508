//! Error types for fieldlog-types.

use thiserror::Error;

/// Errors produced while decoding device payloads or parsing log records.
///
/// This enum is marked `#[non_exhaustive]` to allow adding new error variants
/// in future versions without breaking downstream code.
#[derive(Debug, Clone, PartialEq, Error)]
#[non_exhaustive]
pub enum ParseError {
    /// The characteristic payload was not valid base64.
    #[error("invalid payload encoding: {0}")]
    InvalidEncoding(String),

    /// The decoded payload was not UTF-8 text.
    #[error("payload is not UTF-8 text")]
    NotText,

    /// A value could not be parsed as a finite number.
    #[error("invalid number: {0:?}")]
    InvalidNumber(String),

    /// The timestamp field could not be parsed.
    #[error("invalid timestamp: {0:?}")]
    InvalidTimestamp(String),

    /// A record line had the wrong number of fields.
    #[error("wrong field count: expected {expected}, got {actual}")]
    FieldCount {
        /// Number of fields a record line must carry.
        expected: usize,
        /// Number of fields actually found.
        actual: usize,
    },

    /// A record field was not properly double-quoted.
    #[error("field {index} is not quoted")]
    UnquotedField {
        /// Zero-based index of the offending field.
        index: usize,
    },
}

/// Result type alias for parsing operations.
pub type ParseResult<T> = Result<T, ParseError>;

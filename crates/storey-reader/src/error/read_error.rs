//! The ReadError type.

use serde_json::Value;
use thiserror::Error;

use crate::error::ErrorCode;

/// Error returned when an input cannot be read at all.
#[derive(Debug, Error)]
pub enum ReadError {
    /// The input is not valid JSON.
    #[error("{message}")]
    Syntax {
        code: ErrorCode,
        message: String,
        line: usize,
        column: usize,
    },

    /// The input is valid JSON but its top level is not an object.
    #[error("expected {expected} to be a JSON object, found {found}")]
    NotAnObject {
        code: ErrorCode,
        expected: &'static str,
        found: &'static str,
    },
}

impl ReadError {
    pub(crate) fn syntax(err: serde_json::Error) -> Self {
        let code = if err.is_eof() {
            ErrorCode::E101
        } else {
            ErrorCode::E100
        };
        Self::Syntax {
            code,
            message: err.to_string(),
            line: err.line(),
            column: err.column(),
        }
    }

    pub(crate) fn not_an_object(code: ErrorCode, expected: &'static str, value: &Value) -> Self {
        Self::NotAnObject {
            code,
            expected,
            found: json_kind(value),
        }
    }

    /// Returns the [`ErrorCode`] of this error.
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::Syntax { code, .. } | Self::NotAnObject { code, .. } => *code,
        }
    }

    /// Returns the one-based `(line, column)` of a syntax error.
    pub fn location(&self) -> Option<(usize, usize)> {
        match self {
            Self::Syntax { line, column, .. } => Some((*line, *column)),
            Self::NotAnObject { .. } => None,
        }
    }

    /// Converts [`ReadError::location`] into a byte offset into `src`.
    ///
    /// The offset is clamped to the end of `src`.
    pub fn offset_in(&self, src: &str) -> Option<usize> {
        let (line, column) = self.location()?;
        let line_start: usize = src
            .split_inclusive('\n')
            .take(line.saturating_sub(1))
            .map(str::len)
            .sum();
        Some((line_start + column.saturating_sub(1)).min(src.len()))
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

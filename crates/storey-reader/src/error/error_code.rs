//! Error codes for the Storey reader.
//!
//! Error codes are organized by phase:
//! - `E1xx` - JSON syntax errors
//! - `E2xx` - Document shape errors

use std::fmt;

/// Error codes for categorizing read errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    // =========================================================================
    // Syntax Errors (E1xx)
    // =========================================================================
    /// Malformed JSON.
    ///
    /// The input is not syntactically valid JSON.
    E100,

    /// Incomplete input.
    ///
    /// The input ended before a complete JSON value was read.
    E101,

    // =========================================================================
    // Shape Errors (E2xx)
    // =========================================================================
    /// Floor-plan document is not an object.
    ///
    /// A floor-plan document (or the `scene` of a request envelope) must be
    /// a JSON object with a `layers` field.
    E200,

    /// Texture catalog is not an object.
    ///
    /// A texture catalog maps element types to texture names and must be a
    /// JSON object.
    E201,

    /// Request envelope is not an object.
    ///
    /// An export request must be a JSON object, either a bare floor-plan
    /// document or `{ "scene": ..., "texturesByType": ... }`.
    E202,
}

impl ErrorCode {
    /// Returns the code as a string (e.g., "E100").
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::E100 => "E100",
            ErrorCode::E101 => "E101",
            ErrorCode::E200 => "E200",
            ErrorCode::E201 => "E201",
            ErrorCode::E202 => "E202",
        }
    }

    /// Returns a short description of what this error code means.
    pub fn description(&self) -> &'static str {
        match self {
            ErrorCode::E100 => "malformed JSON",
            ErrorCode::E101 => "incomplete input",
            ErrorCode::E200 => "floor plan is not an object",
            ErrorCode::E201 => "texture catalog is not an object",
            ErrorCode::E202 => "request is not an object",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

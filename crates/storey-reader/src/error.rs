//! Errors produced while reading floor-plan documents and texture catalogs.
//!
//! Reading is lenient: malformed values inside a well-formed document fall
//! back to defaults and are never reported here. A [`ReadError`] is only
//! returned when the input cannot be used at all, either because it is not
//! valid JSON or because its top level has the wrong shape.
//!
//! Every error carries an [`ErrorCode`] for documentation and searchability.
//!
//! # Example
//!
//! ```
//! # use storey_reader::error::ErrorCode;
//! let err = storey_reader::read_catalog("[1, 2]").unwrap_err();
//! assert_eq!(err.code(), ErrorCode::E201);
//! ```

mod error_code;
mod read_error;

pub use error_code::ErrorCode;
pub use read_error::ReadError;

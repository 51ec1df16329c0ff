//! Error types for Storey operations.
//!
//! This module provides the main error type [`StoreyError`] which wraps the
//! error conditions of every pipeline stage.

use std::io;

use thiserror::Error;

use storey_reader::ReadError;

use crate::resolve::ResolveError;

/// The main error type for Storey operations.
///
/// # Diagnostic Variants
///
/// The `Read` variant carries the source text next to the [`ReadError`], so
/// callers can render the error with a source span.
#[derive(Debug, Error)]
pub enum StoreyError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("{err}")]
    Read { err: ReadError, src: String },

    #[error("Nothing to export: the plan has no visible geometry")]
    EmptyScene,

    #[error("Texture `{uri}` unavailable: {reason}")]
    TextureUnavailable { uri: String, reason: String },

    #[error("Export error: {0}")]
    Export(Box<dyn std::error::Error + Send + Sync>),
}

impl From<ResolveError> for StoreyError {
    fn from(error: ResolveError) -> Self {
        match error {
            ResolveError::Unavailable { uri, reason } => Self::TextureUnavailable {
                uri,
                reason: reason.to_string(),
            },
            ResolveError::MissingUri {
                element_type,
                texture,
            } => Self::TextureUnavailable {
                uri: format!("{element_type}/{texture}"),
                reason: "catalog entry has no uri".to_string(),
            },
        }
    }
}

impl From<crate::export::Error> for StoreyError {
    fn from(error: crate::export::Error) -> Self {
        match error {
            crate::export::Error::Resolve(error) => error.into(),
            error => Self::Export(Box::new(error)),
        }
    }
}

impl StoreyError {
    /// Create a new `Read` error with the associated source text.
    pub fn new_read_error(err: ReadError, src: impl Into<String>) -> Self {
        Self::Read {
            err,
            src: src.into(),
        }
    }
}

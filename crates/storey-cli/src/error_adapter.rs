//! Error adapter for converting StoreyError to miette diagnostics.
//!
//! This module provides the bridge between the library's standard error types
//! and miette's rich diagnostic formatting used in the CLI.
//!
//! Read errors carry the input text; syntax errors are labeled at the
//! offending position in it.

use std::fmt;

use miette::{Diagnostic as MietteDiagnostic, LabeledSpan, SourceSpan};

use storey::{ReadError, StoreyError};

/// Adapter for a [`ReadError`] and the text it was read from.
pub struct ReadAdapter<'a> {
    err: &'a ReadError,
    src: &'a str,
}

impl<'a> ReadAdapter<'a> {
    pub fn new(err: &'a ReadError, src: &'a str) -> Self {
        Self { err, src }
    }
}

impl fmt::Debug for ReadAdapter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReadAdapter")
            .field("err", &self.err)
            .finish()
    }
}

impl fmt::Display for ReadAdapter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self.err, f)
    }
}

impl std::error::Error for ReadAdapter<'_> {}

impl MietteDiagnostic for ReadAdapter<'_> {
    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        Some(Box::new(self.err.code()))
    }

    fn help<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        Some(Box::new(self.err.code().description()))
    }

    fn source_code(&self) -> Option<&dyn miette::SourceCode> {
        Some(&self.src as &dyn miette::SourceCode)
    }

    fn labels(&self) -> Option<Box<dyn Iterator<Item = LabeledSpan> + '_>> {
        let offset = self.err.offset_in(self.src)?;
        let span = SourceSpan::new(offset.into(), 0);
        Some(Box::new(std::iter::once(
            LabeledSpan::new_primary_with_span(Some("here".to_string()), span),
        )))
    }
}

/// Adapter for [`StoreyError`] variants without source text.
pub struct ErrorAdapter<'a>(pub &'a StoreyError);

impl fmt::Debug for ErrorAdapter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.0, f)
    }
}

impl fmt::Display for ErrorAdapter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl std::error::Error for ErrorAdapter<'_> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.0.source()
    }
}

impl MietteDiagnostic for ErrorAdapter<'_> {
    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        let code = match &self.0 {
            StoreyError::Io(_) => "storey::io",
            StoreyError::Read { .. } => "storey::read",
            StoreyError::EmptyScene => "storey::empty_scene",
            StoreyError::TextureUnavailable { .. } => "storey::texture",
            StoreyError::Export(_) => "storey::export",
        };
        Some(Box::new(code))
    }

    fn help<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        let help = match &self.0 {
            StoreyError::EmptyScene => {
                "check that at least one layer is visible and has walls, areas or items"
            }
            StoreyError::TextureUnavailable { .. } => {
                "fix the catalog entry or remove the texture selection from the element"
            }
            _ => return None,
        };
        Some(Box::new(help))
    }
}

/// A reportable error that can be rendered by miette.
#[derive(Debug)]
pub enum Reportable<'a> {
    /// A read error with source location information.
    Read(ReadAdapter<'a>),
    /// A simple error without source location.
    Error(ErrorAdapter<'a>),
}

impl fmt::Display for Reportable<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reportable::Read(r) => fmt::Display::fmt(r, f),
            Reportable::Error(e) => fmt::Display::fmt(e, f),
        }
    }
}

impl std::error::Error for Reportable<'_> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Reportable::Read(_) => None,
            Reportable::Error(e) => e.source(),
        }
    }
}

impl MietteDiagnostic for Reportable<'_> {
    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        match self {
            Reportable::Read(r) => r.code(),
            Reportable::Error(e) => e.code(),
        }
    }

    fn help<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        match self {
            Reportable::Read(r) => r.help(),
            Reportable::Error(e) => e.help(),
        }
    }

    fn source_code(&self) -> Option<&dyn miette::SourceCode> {
        match self {
            Reportable::Read(r) => r.source_code(),
            Reportable::Error(e) => e.source_code(),
        }
    }

    fn labels(&self) -> Option<Box<dyn Iterator<Item = LabeledSpan> + '_>> {
        match self {
            Reportable::Read(r) => r.labels(),
            Reportable::Error(e) => e.labels(),
        }
    }
}

/// Convert a [`StoreyError`] into a list of reportable errors.
pub fn to_reportables(err: &StoreyError) -> Vec<Reportable<'_>> {
    match err {
        StoreyError::Read { err, src } => vec![Reportable::Read(ReadAdapter::new(err, src))],
        _ => vec![Reportable::Error(ErrorAdapter(err))],
    }
}

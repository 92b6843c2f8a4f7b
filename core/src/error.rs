use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Broad classification of an [`Error`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Io,
    Format,
    Resource,
}

/// Main error type for index construction.
#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("file name {name:?} is not a valid document id")]
    InvalidDocumentId { name: String },

    #[error("{}:{line}: malformed index line: {reason}", .path.display())]
    MalformedLine {
        path: PathBuf,
        line: usize,
        reason: String,
    },

    #[error("invalid configuration: {0}")]
    Resource(String),

    #[error("document {name}: {source}")]
    Document {
        name: String,
        #[source]
        source: Box<Error>,
    },
}

/// Result type alias for index construction.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Error::Io { path: path.into(), source }
    }

    pub(crate) fn malformed(path: impl Into<PathBuf>, line: usize, reason: impl Into<String>) -> Self {
        Error::MalformedLine { path: path.into(), line, reason: reason.into() }
    }

    /// Attach the identity of the document being processed.
    pub fn for_document(self, name: impl Into<String>) -> Self {
        match self {
            already @ Error::Document { .. } => already,
            other => Error::Document { name: name.into(), source: Box::new(other) },
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Io { .. } => ErrorKind::Io,
            Error::InvalidDocumentId { .. } | Error::MalformedLine { .. } => ErrorKind::Format,
            Error::Resource(_) => ErrorKind::Resource,
            Error::Document { source, .. } => source.kind(),
        }
    }

    /// Name of the document this error belongs to, if any.
    pub fn document(&self) -> Option<&str> {
        match self {
            Error::Document { name, .. } => Some(name),
            _ => None,
        }
    }
}

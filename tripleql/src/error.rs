//! Errors raised by the codec, the compilers and the session facade.
//!
//! Every error is raised synchronously at the point of detection. Nothing
//! is retried here; retry policy belongs to the caller or the store.

use crate::store::StoreError;

/// Errors that can occur while encoding, compiling or decoding.
#[derive(Debug)]
pub enum Error {
    /// A value that has no wire representation in this position.
    UnsupportedValueKind(String),
    /// A filter operator received a payload of the wrong shape.
    InvalidFilterShape(String),
    /// A `$`-prefixed key or `@`-prefixed term outside the recognized set.
    UnknownOperator(String),
    /// The store refused a write, e.g. an integrity-constraint violation.
    StoreRejected {
        /// Human-readable context for the failed operation.
        message: String,
        /// The store's original error.
        cause: StoreError,
    },
    /// Any other store failure, passed through untouched.
    Store(StoreError),
    /// A query operation ran before any pattern was compiled.
    NoActiveQuery,
    /// A store or result payload did not have the expected JSON shape.
    MalformedResponse(String),
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnsupportedValueKind(message) => {
                write!(f, "unsupported value kind: {message}")
            }
            Self::InvalidFilterShape(message) => write!(f, "invalid filter shape: {message}"),
            Self::UnknownOperator(operator) => write!(f, "unknown operator: {operator}"),
            Self::StoreRejected { message, cause } => write!(f, "{message}: {cause}"),
            Self::Store(e) => write!(f, "store error: {e}"),
            Self::NoActiveQuery => write!(f, "no query has been defined"),
            Self::MalformedResponse(message) => write!(f, "malformed response: {message}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::StoreRejected { cause, .. } | Self::Store(cause) => Some(cause),
            _ => None,
        }
    }
}

impl From<StoreError> for Error {
    fn from(e: StoreError) -> Self {
        Self::Store(e)
    }
}

/// Result alias used across the crate.
pub type Result<T, E = Error> = std::result::Result<T, E>;

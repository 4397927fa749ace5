//! Error types for bookmark import and export
//!
//! Three things can go wrong on import, one on export. Malformed entries
//! inside a list are not errors; they are skipped.

use bookmark_dom::DomError;
use thiserror::Error;

/// The background job was cancelled before it produced a result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("operation was cancelled")]
pub struct Cancelled;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("no leading <DL> element found in bookmark document")]
    NoLeadingDl,

    #[error("nested bookmark document has no <body> element")]
    NoBody,

    #[error("bookmark parsing was cancelled")]
    Cancelled,

    #[error("document tree error: {0}")]
    Dom(#[from] DomError),
}

impl From<Cancelled> for ParseError {
    fn from(_: Cancelled) -> Self {
        ParseError::Cancelled
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SerializeError {
    #[error("bookmark serialization was cancelled")]
    Cancelled,
}

impl From<Cancelled> for SerializeError {
    fn from(_: Cancelled) -> Self {
        SerializeError::Cancelled
    }
}

//! Attribute path error types.

use thiserror::Error;

/// Errors raised while building an attribute path.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PathError {
    /// A segment was empty (e.g. `author//name`).
    #[error("empty segment in attribute path: {path}")]
    EmptySegment {
        /// The offending path text
        path: String,
    },

    /// A wildcard appeared somewhere other than the final segment.
    #[error("wildcard `{wildcard}` is only allowed as the last segment (position {position})")]
    MisplacedWildcard {
        /// The wildcard that was found
        wildcard: String,
        /// Zero-based position of the wildcard
        position: usize,
    },
}

/// Result type for attribute path construction.
pub type PathResult<T> = Result<T, PathError>;

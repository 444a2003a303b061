//! Presenter error types.
//!
//! Permission violations are never errors: an unpermitted path is simply
//! left out of the result.

use thiserror::Error;
use vitrine_permissions::PathError;

/// Errors that can occur while building or presenting.
#[derive(Debug, Error)]
pub enum PresentError {
    // Inference errors
    /// The object type behind a presenter type could not be determined
    #[error("could not infer a source type for {name}")]
    UninferrableSource {
        /// The presenter or collection type name
        name: String,
    },

    /// No presenter type could be determined for an object or association
    #[error("could not infer a presenter for {name}")]
    UninferrablePresenter {
        /// The model, association or presenter name that failed to resolve
        name: String,
    },

    // Argument errors
    /// Invalid options passed to a declaration or constructor
    #[error("invalid options for {context}: {message}")]
    InvalidOptions {
        /// Where the options were given
        context: String,
        /// What was wrong with them
        message: String,
    },

    // Dispatch errors
    /// No accessor with the given name
    #[error("undefined accessor `{name}` for {presenter}")]
    NoAccessor {
        /// Presenter type (or exposure owner) that was asked
        presenter: String,
        /// The missing accessor name
        name: String,
    },

    /// An explicit presenter type was given an object of another model type
    #[error("{presenter} presents {expected}, got {found}")]
    TypeMismatch {
        /// The presenter type name
        presenter: String,
        /// The model type it presents
        expected: String,
        /// The model type it was given
        found: String,
    },

    /// A field accessor failed
    #[error("accessor `{name}` failed: {message}")]
    Accessor {
        /// The accessor name
        name: String,
        /// Failure description
        message: String,
    },

    /// Invalid attribute path
    #[error(transparent)]
    Path(#[from] PathError),
}

impl PresentError {
    /// Build an accessor failure.
    pub fn accessor(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Accessor {
            name: name.into(),
            message: message.into(),
        }
    }

    /// Build an invalid-options error.
    pub fn invalid_options(context: impl Into<String>, message: impl ToString) -> Self {
        Self::InvalidOptions {
            context: context.into(),
            message: message.to_string(),
        }
    }
}

/// Result type for presenter operations.
pub type PresentResult<T> = Result<T, PresentError>;

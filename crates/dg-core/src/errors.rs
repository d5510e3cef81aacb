//! Error types for DG param extraction.

use thiserror::Error;

/// Why the DG params could not be derived from a contact's attributes.
///
/// [`InvalidAttributes`](Self::InvalidAttributes) and
/// [`MultipleCallbacks`](Self::MultipleCallbacks) come from caller input and
/// fail only the current request. [`Invariant`](Self::Invariant) means a
/// previously built value broke its own invariants, which is a defect in this
/// crate rather than bad input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParamsError {
    /// The attribute container is not a key-value mapping of strings.
    #[error("invalid contact attributes: {reason}")]
    InvalidAttributes {
        /// What was wrong with the container.
        reason: String,
    },

    /// `dg_callback` resolved to more than one URL.
    #[error("multiple callback URLs provided: {values:?}")]
    MultipleCallbacks {
        /// The callback values that were found.
        values: Vec<String>,
    },

    /// An internal consistency check failed.
    #[error("internal invariant violated: {0}")]
    Invariant(String),
}

impl ParamsError {
    /// Whether this error indicates a defect rather than bad input.
    pub fn is_internal(&self) -> bool {
        matches!(self, Self::Invariant(_))
    }

    /// Short machine-readable kind, used as a structured log field.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::InvalidAttributes { .. } => "invalid_attributes",
            Self::MultipleCallbacks { .. } => "multiple_callbacks",
            Self::Invariant(_) => "invariant",
        }
    }
}

/// Result type for param extraction.
pub type Result<T> = std::result::Result<T, ParamsError>;

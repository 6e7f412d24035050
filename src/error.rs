use thiserror::Error;

/// Errors reported by the checked accessors and by invariant validation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// A keyed accessor found no entry for the key.
    #[error("key not found")]
    KeyNotFound,

    /// The tree's structure breaks one of its invariants.
    #[error("tree invariant violated: {reason}")]
    Corrupt {
        /// Which invariant failed, and where.
        reason: String,
    },
}

impl Error {
    pub(crate) fn corrupt(reason: impl Into<String>) -> Self {
        Error::Corrupt {
            reason: reason.into(),
        }
    }
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

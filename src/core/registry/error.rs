//! core::registry::error
//!
//! Error taxonomy of the registry.
//!
//! Every failure reaches the caller as its own variant. Nothing is
//! retried here: [`RegistryError::ConcurrentModification`] is the only
//! transient kind and the caller decides whether to rerun the whole
//! transaction.

use thiserror::Error;

use crate::core::notes::IndexError;
use crate::core::types::GroupName;
use crate::store::StoreError;

/// Errors from registry operations.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// Persisted state, or the caller's claim about it, is inconsistent.
    ///
    /// Raised when a claimed old name does not exist, belongs to another
    /// group, or its note is corrupt. Never repaired automatically.
    #[error("group names are inconsistent: {message}")]
    ConfigInvalid {
        /// Description of the inconsistency
        message: String,
    },

    /// The requested name is already registered.
    #[error("name '{name}' is already used")]
    DuplicateName {
        /// The name that was requested
        name: GroupName,
    },

    /// The ref moved between load and commit.
    #[error("{refname} was modified concurrently")]
    ConcurrentModification {
        /// The ref that moved
        refname: String,
    },

    /// The registry could not be read in full.
    #[error("failed to read group names: {source}")]
    HardRead {
        /// The store failure or corrupt note encountered
        source: IndexError,
    },

    /// The store failed on the write path.
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl RegistryError {
    /// Whether rerunning the same request from a fresh load may succeed.
    ///
    /// # Example
    ///
    /// ```
    /// use groupnotes::core::registry::RegistryError;
    ///
    /// let err = RegistryError::ConcurrentModification {
    ///     refname: "refs/meta/group-names".into(),
    /// };
    /// assert!(err.is_retryable());
    ///
    /// let err = RegistryError::ConfigInvalid { message: "stale".into() };
    /// assert!(!err.is_retryable());
    /// ```
    pub fn is_retryable(&self) -> bool {
        matches!(self, RegistryError::ConcurrentModification { .. })
    }

    pub(crate) fn hard_read(source: impl Into<IndexError>) -> Self {
        RegistryError::HardRead {
            source: source.into(),
        }
    }
}

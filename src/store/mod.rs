//! store
//!
//! The object store contract the registry is built on.
//!
//! # Design
//!
//! The registry never talks to a concrete repository. It needs a handful
//! of operations from a versioned object store: resolve a ref, read the
//! notes tree of a commit, read and write blobs, write a notes tree,
//! create a commit, and advance a ref with compare-and-swap. Those are
//! the methods of [`ObjectStore`].
//!
//! Two implementations ship with the crate:
//!
//! - [`crate::git::Git`] - a real repository through `git2`
//! - [`memory::MemoryStore`] - a process-local store for tests and embedding
//!
//! # CAS Semantics
//!
//! [`ObjectStore::compare_and_swap_ref`] is the only synchronization
//! point between writers. It must atomically check that the ref still
//! points at `expected_old` (`None` meaning "does not exist") and move it
//! to `new`. Losing the race is reported as `Ok(false)`, not as an error.
//!
//! # Example
//!
//! ```
//! use groupnotes::core::types::RefName;
//! use groupnotes::store::{memory::MemoryStore, NoteMap, ObjectStore};
//!
//! let store = MemoryStore::new();
//! let refname = RefName::group_names();
//! assert!(store.resolve_ref(&refname).unwrap().is_none());
//!
//! let tree = store.write_note_tree(&NoteMap::new()).unwrap();
//! let rev = store.commit(None, &tree, "init").unwrap();
//! assert!(store.compare_and_swap_ref(&refname, None, &rev).unwrap());
//! assert!(!store.compare_and_swap_ref(&refname, None, &rev).unwrap());
//! ```

pub mod memory;
pub mod note_map;

pub use note_map::NoteMap;

use thiserror::Error;

use crate::core::types::{Oid, RefName, Revision};

/// Errors from object store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Object not found in the store.
    #[error("object not found: {oid}")]
    ObjectNotFound {
        /// The OID that was not found
        oid: String,
    },

    /// Object exists but has the wrong type.
    #[error("object {oid} is not a {expected}")]
    UnexpectedObject {
        /// The OID that was read
        oid: String,
        /// The object type the caller needed
        expected: &'static str,
    },

    /// The ref exists but cannot be used as a revision.
    #[error("invalid ref {refname}: {message}")]
    InvalidRef {
        /// The ref being resolved
        refname: String,
        /// Description of the problem
        message: String,
    },

    /// Any other failure of the underlying store.
    #[error("store error: {message}")]
    Backend {
        /// The error message
        message: String,
    },
}

/// A versioned object store holding a notes tree per commit.
///
/// Implementations must be thread-safe so independent transactions can
/// run concurrently against one store.
pub trait ObjectStore: Send + Sync {
    /// Resolve `refname` to the commit it points at.
    ///
    /// Returns `Ok(None)` if the ref does not exist.
    fn resolve_ref(&self, refname: &RefName) -> Result<Option<Revision>, StoreError>;

    /// Read the notes tree of `revision`.
    fn read_note_map(&self, revision: &Revision) -> Result<NoteMap, StoreError>;

    /// Read a blob's content.
    fn read_blob(&self, oid: &Oid) -> Result<Vec<u8>, StoreError>;

    /// Store `content` as a blob and return its id.
    fn write_blob(&self, content: &[u8]) -> Result<Oid, StoreError>;

    /// Store `notes` as a tree and return its id.
    fn write_note_tree(&self, notes: &NoteMap) -> Result<Oid, StoreError>;

    /// Create a commit of `tree` on top of `parent` (a root commit when
    /// `None`). No ref is moved.
    fn commit(
        &self,
        parent: Option<&Revision>,
        tree: &Oid,
        message: &str,
    ) -> Result<Revision, StoreError>;

    /// Atomically move `refname` from `expected_old` to `new`.
    ///
    /// Returns `Ok(false)` if the ref no longer matches `expected_old`.
    fn compare_and_swap_ref(
        &self,
        refname: &RefName,
        expected_old: Option<&Revision>,
        new: &Revision,
    ) -> Result<bool, StoreError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_error_display() {
        let err = StoreError::ObjectNotFound { oid: "abc".into() };
        assert!(err.to_string().contains("abc"));

        let err = StoreError::UnexpectedObject {
            oid: "abc".into(),
            expected: "tree",
        };
        assert!(err.to_string().contains("tree"));

        let err = StoreError::InvalidRef {
            refname: "refs/meta/group-names".into(),
            message: "points to a blob".into(),
        };
        assert!(err.to_string().contains("refs/meta/group-names"));
        assert!(err.to_string().contains("blob"));
    }
}

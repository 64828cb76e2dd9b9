//! core::notes::versioned
//!
//! Versioned notes over a single ref.
//!
//! # Architecture
//!
//! The ref points at a commit whose tree is the current note map. A write
//! is: load the tip, open a writer on it, stage note changes, commit a new
//! tree on top of the tip and advance the ref with compare-and-swap.
//! Nothing here knows about groups; the registry layers its semantics on
//! top.
//!
//! # CAS Semantics
//!
//! [`VersionedNotes::commit`] only moves the ref if it still points at the
//! revision the writer was opened on. Otherwise it fails with
//! [`CommitError::RefMoved`] and the objects it wrote stay unreferenced.
//!
//! # Example
//!
//! ```
//! use groupnotes::core::notes::key::NoteKey;
//! use groupnotes::core::notes::versioned::VersionedNotes;
//! use groupnotes::core::types::RefName;
//! use groupnotes::store::memory::MemoryStore;
//!
//! let store = MemoryStore::new();
//! let notes = VersionedNotes::new(&store, RefName::group_names());
//!
//! let tip = notes.load().unwrap();
//! let mut writer = notes.open(tip).unwrap();
//! writer.set(NoteKey::from_bytes([1; 20]), b"hello").unwrap();
//! let rev = notes.commit(writer, "add a note").unwrap();
//!
//! assert_eq!(notes.load().unwrap(), Some(rev));
//! ```

use thiserror::Error;
use tracing::{debug, warn};

use super::key::NoteKey;
use crate::core::types::{RefName, Revision};
use crate::store::{NoteMap, ObjectStore, StoreError};

/// Errors from committing staged notes.
#[derive(Debug, Error)]
pub enum CommitError {
    /// The ref moved after the writer was opened.
    #[error("{refname} moved since it was loaded")]
    RefMoved {
        /// The ref that lost the race
        refname: String,
    },

    /// The store failed while writing objects or the ref.
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Notes stored on commits of one ref.
pub struct VersionedNotes<'a, S: ?Sized> {
    store: &'a S,
    refname: RefName,
}

impl<'a, S: ObjectStore + ?Sized> VersionedNotes<'a, S> {
    pub fn new(store: &'a S, refname: RefName) -> Self {
        Self { store, refname }
    }

    pub fn refname(&self) -> &RefName {
        &self.refname
    }

    pub fn store(&self) -> &'a S {
        self.store
    }

    /// Resolve the ref's current tip; `None` if it does not exist yet.
    pub fn load(&self) -> Result<Option<Revision>, StoreError> {
        self.store.resolve_ref(&self.refname)
    }

    /// Open a writer on `base`, reading its note map.
    pub fn open(&self, base: Option<Revision>) -> Result<NotesWriter<'a, S>, StoreError> {
        let notes = match &base {
            Some(rev) => self.store.read_note_map(rev)?,
            None => NoteMap::new(),
        };
        Ok(self.open_with_notes(base, notes))
    }

    /// Open a writer on `base` with its already-loaded note map.
    pub fn open_with_notes(&self, base: Option<Revision>, notes: NoteMap) -> NotesWriter<'a, S> {
        NotesWriter {
            store: self.store,
            base,
            notes,
        }
    }

    /// Commit the writer's notes on top of its base and advance the ref.
    ///
    /// # Errors
    ///
    /// - [`CommitError::RefMoved`] if the ref is no longer at the base
    /// - [`CommitError::Store`] for store failures
    pub fn commit(&self, writer: NotesWriter<'a, S>, message: &str) -> Result<Revision, CommitError> {
        let tree = self.store.write_note_tree(&writer.notes)?;
        let revision = self.store.commit(writer.base.as_ref(), &tree, message)?;

        if !self
            .store
            .compare_and_swap_ref(&self.refname, writer.base.as_ref(), &revision)?
        {
            warn!(
                refname = %self.refname,
                base = ?writer.base.as_ref().map(|r| r.to_string()),
                "ref moved during commit"
            );
            return Err(CommitError::RefMoved {
                refname: self.refname.to_string(),
            });
        }

        debug!(
            refname = %self.refname,
            revision = %revision,
            notes = writer.notes.len(),
            "committed notes"
        );
        Ok(revision)
    }
}

/// Staged changes to a note map, opened on a base revision.
pub struct NotesWriter<'a, S: ?Sized> {
    store: &'a S,
    base: Option<Revision>,
    notes: NoteMap,
}

impl<'a, S: ObjectStore + ?Sized> NotesWriter<'a, S> {
    /// The revision the writer was opened on.
    pub fn base(&self) -> Option<&Revision> {
        self.base.as_ref()
    }

    /// The staged note map.
    pub fn notes(&self) -> &NoteMap {
        &self.notes
    }

    /// Store `content` and bind it to `key`.
    pub fn set(&mut self, key: NoteKey, content: &[u8]) -> Result<(), StoreError> {
        let blob = self.store.write_blob(content)?;
        self.notes.set(key, blob);
        Ok(())
    }

    /// Unset `key`. Returns whether a note was there; removing an absent
    /// key changes nothing.
    pub fn remove(&mut self, key: &NoteKey) -> bool {
        self.notes.remove(key).is_some()
    }
}

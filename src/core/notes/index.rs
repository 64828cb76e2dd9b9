//! core::notes::index
//!
//! Read model over the name notes of one revision.

use thiserror::Error;

use super::key::{DefaultKeyDeriver, KeyDeriver, NoteKey};
use super::record::{decode_record, DecodeError};
use crate::core::types::{GroupName, GroupReference, Oid, Revision};
use crate::store::{NoteMap, ObjectStore, StoreError};

/// Errors from reading through a [`NameIndex`].
#[derive(Debug, Error)]
pub enum IndexError {
    /// The store failed to produce an object.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// A note exists but its body does not decode.
    #[error("corrupt note {key}: {source}")]
    Corrupt {
        /// Key of the unreadable note
        key: NoteKey,
        /// Why decoding failed
        source: DecodeError,
    },
}

/// The name notes visible at one revision.
///
/// The index holds the revision's note map (key to blob id) and reads
/// blobs on demand. A note that fails to decode is always an error; it is
/// never skipped.
///
/// # Example
///
/// ```
/// use groupnotes::core::notes::index::NameIndex;
/// use groupnotes::core::types::GroupName;
/// use groupnotes::store::memory::MemoryStore;
///
/// let store = MemoryStore::new();
/// let index = NameIndex::load(&store, None).unwrap();
/// assert!(index.is_empty());
/// assert!(index.lookup_name(&GroupName::new("admins").unwrap()).unwrap().is_none());
/// ```
pub struct NameIndex<'a, S: ?Sized, D = DefaultKeyDeriver> {
    store: &'a S,
    revision: Option<Revision>,
    notes: NoteMap,
    deriver: D,
}

impl<'a, S: ObjectStore + ?Sized> NameIndex<'a, S, DefaultKeyDeriver> {
    /// Build the index for `revision`; `None` gives an empty index.
    pub fn load(store: &'a S, revision: Option<Revision>) -> Result<Self, StoreError> {
        Self::with_deriver(store, revision, DefaultKeyDeriver::default())
    }
}

impl<'a, S: ObjectStore + ?Sized, D: KeyDeriver> NameIndex<'a, S, D> {
    /// Build the index for `revision` using a specific key deriver.
    pub fn with_deriver(
        store: &'a S,
        revision: Option<Revision>,
        deriver: D,
    ) -> Result<Self, StoreError> {
        let notes = match &revision {
            Some(rev) => store.read_note_map(rev)?,
            None => NoteMap::new(),
        };
        Ok(Self {
            store,
            revision,
            notes,
            deriver,
        })
    }

    /// The revision this index reflects.
    pub fn revision(&self) -> Option<&Revision> {
        self.revision.as_ref()
    }

    pub fn note_map(&self) -> &NoteMap {
        &self.notes
    }

    /// Give up the index, keeping its revision and note map.
    pub fn into_parts(self) -> (Option<Revision>, NoteMap) {
        (self.revision, self.notes)
    }

    /// The key `name` is stored under.
    pub fn key_for(&self, name: &GroupName) -> NoteKey {
        self.deriver.derive(name)
    }

    /// Whether a note exists under `key`, without reading it.
    pub fn contains(&self, key: &NoteKey) -> bool {
        self.notes.contains(key)
    }

    pub fn contains_name(&self, name: &GroupName) -> bool {
        self.contains(&self.key_for(name))
    }

    /// Resolve `key` to the record stored under it.
    ///
    /// # Errors
    ///
    /// - [`IndexError::Store`] if the blob cannot be read
    /// - [`IndexError::Corrupt`] if the blob does not decode
    pub fn lookup(&self, key: &NoteKey) -> Result<Option<GroupReference>, IndexError> {
        match self.notes.get(key) {
            Some(blob) => self.read_record(key, blob).map(Some),
            None => Ok(None),
        }
    }

    pub fn lookup_name(&self, name: &GroupName) -> Result<Option<GroupReference>, IndexError> {
        self.lookup(&self.key_for(name))
    }

    /// Every record in the index.
    ///
    /// Each call starts a fresh pass. Order is unspecified; callers must
    /// only rely on completeness.
    pub fn entries(&self) -> impl Iterator<Item = Result<GroupReference, IndexError>> + '_ {
        self.notes
            .iter()
            .map(move |(key, blob)| self.read_record(key, blob))
    }

    pub fn len(&self) -> usize {
        self.notes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }

    fn read_record(&self, key: &NoteKey, blob: &Oid) -> Result<GroupReference, IndexError> {
        let bytes = self.store.read_blob(blob)?;
        decode_record(&bytes).map_err(|source| IndexError::Corrupt { key: *key, source })
    }
}

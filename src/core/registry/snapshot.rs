//! core::registry::snapshot
//!
//! The read path: a consistent view of every name at one revision.

use std::collections::BTreeSet;

use tracing::debug;

use super::error::RegistryError;
use crate::core::notes::{NameIndex, VersionedNotes};
use crate::core::types::{GroupName, GroupReference, RefName, Revision};
use crate::store::ObjectStore;

/// All names registered at one revision of the ref.
///
/// A snapshot never observes a half-applied change: it reads a single
/// commit, and every change is a single commit. Later writes are not
/// visible through it.
pub struct RegistrySnapshot<'a, S: ?Sized> {
    index: NameIndex<'a, S>,
}

impl<'a, S: ObjectStore + ?Sized> RegistrySnapshot<'a, S> {
    /// Read the ref's current tip.
    ///
    /// # Errors
    ///
    /// [`RegistryError::HardRead`] if the ref or its tree cannot be read.
    pub fn load(store: &'a S, refname: RefName) -> Result<Self, RegistryError> {
        let notes = VersionedNotes::new(store, refname);
        let revision = notes.load().map_err(RegistryError::hard_read)?;
        Self::at(store, revision)
    }

    /// Read a specific revision; `None` is the empty registry.
    pub fn at(store: &'a S, revision: Option<Revision>) -> Result<Self, RegistryError> {
        let index = NameIndex::load(store, revision).map_err(RegistryError::hard_read)?;
        Ok(Self { index })
    }

    pub fn revision(&self) -> Option<&Revision> {
        self.index.revision()
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// The group currently holding `name`.
    pub fn lookup(&self, name: &GroupName) -> Result<Option<GroupReference>, RegistryError> {
        self.index.lookup_name(name).map_err(RegistryError::hard_read)
    }

    /// Every registered name.
    ///
    /// # Errors
    ///
    /// [`RegistryError::HardRead`] on the first note that cannot be read or
    /// decoded. A partial listing is never returned.
    pub fn load_all(&self) -> Result<BTreeSet<GroupReference>, RegistryError> {
        let all = self
            .index
            .entries()
            .collect::<Result<BTreeSet<_>, _>>()
            .map_err(RegistryError::hard_read)?;
        debug!(
            revision = ?self.revision().map(|r| r.to_string()),
            names = all.len(),
            "listed group names"
        );
        Ok(all)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::notes::IndexError;
    use crate::core::registry::transaction::{GroupNameTransaction, NameChange};
    use crate::core::types::GroupId;
    use crate::store::memory::MemoryStore;
    use crate::store::NoteMap;

    fn create(store: &MemoryStore, id: &GroupId, name: &str) {
        GroupNameTransaction::new(
            store,
            RefName::group_names(),
            id.clone(),
            NameChange::create(GroupName::new(name).unwrap()),
        )
        .run()
        .unwrap();
    }

    #[test]
    fn empty_registry() {
        let store = MemoryStore::new();
        let snapshot = RegistrySnapshot::load(&store, RefName::group_names()).unwrap();
        assert!(snapshot.is_empty());
        assert!(snapshot.revision().is_none());
        assert!(snapshot.load_all().unwrap().is_empty());
    }

    #[test]
    fn lists_everything() {
        let store = MemoryStore::new();
        let a = GroupId::generate();
        let b = GroupId::generate();
        create(&store, &a, "alpha");
        create(&store, &b, "beta");

        let snapshot = RegistrySnapshot::load(&store, RefName::group_names()).unwrap();
        let all = snapshot.load_all().unwrap();
        assert_eq!(all.len(), 2);
        assert!(all.contains(&GroupReference::new(a, GroupName::new("alpha").unwrap())));
        assert!(all.contains(&GroupReference::new(b, GroupName::new("beta").unwrap())));
    }

    #[test]
    fn pinned_to_its_revision() {
        let store = MemoryStore::new();
        create(&store, &GroupId::generate(), "alpha");
        let snapshot = RegistrySnapshot::load(&store, RefName::group_names()).unwrap();

        create(&store, &GroupId::generate(), "beta");
        assert_eq!(snapshot.load_all().unwrap().len(), 1);
        assert!(snapshot
            .lookup(&GroupName::new("beta").unwrap())
            .unwrap()
            .is_none());
    }

    #[test]
    fn corrupt_note_aborts_listing() {
        let store = MemoryStore::new();
        let mut map = NoteMap::new();
        map.set(
            crate::core::notes::derive_key(&GroupName::new("bad").unwrap()),
            store.write_blob(b"not a config [").unwrap(),
        );
        let tree = store.write_note_tree(&map).unwrap();
        let rev = store.commit(None, &tree, "corrupt").unwrap();

        let snapshot = RegistrySnapshot::at(&store, Some(rev)).unwrap();
        let err = snapshot.load_all().unwrap_err();
        assert!(matches!(
            err,
            RegistryError::HardRead {
                source: IndexError::Corrupt { .. }
            }
        ));
    }
}

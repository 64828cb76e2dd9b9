//! store::memory
//!
//! In-memory object store.
//!
//! # Design
//!
//! Objects are content-addressed the way git addresses them: the id is
//! the SHA-1 of a type header followed by the object's bytes. Commits also
//! hash a per-store sequence number, standing in for git's timestamps, so
//! two identical commits made at different times get different ids.
//!
//! All state sits behind one mutex; the CAS on a ref is a check-and-set
//! under that lock.

use std::collections::HashMap;

use parking_lot::Mutex;
use sha1::{Digest, Sha1};

use super::{NoteMap, ObjectStore, StoreError};
use crate::core::types::{Oid, RefName, Revision};

#[derive(Debug, Clone)]
enum Object {
    Blob(Vec<u8>),
    Tree(NoteMap),
    Commit {
        parent: Option<Revision>,
        tree: Oid,
    },
}

#[derive(Debug, Default)]
struct State {
    objects: HashMap<Oid, Object>,
    refs: HashMap<RefName, Revision>,
    sequence: u64,
}

/// A process-local [`ObjectStore`].
///
/// # Example
///
/// ```
/// use groupnotes::core::types::{GroupId, GroupName};
/// use groupnotes::core::registry::GroupNameRegistry;
/// use groupnotes::store::memory::MemoryStore;
///
/// let store = MemoryStore::new();
/// let registry = GroupNameRegistry::new(&store);
///
/// let id = GroupId::generate();
/// registry.create_name(&id, &GroupName::new("admins").unwrap()).unwrap();
/// assert_eq!(registry.list_all().unwrap().len(), 1);
/// ```
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: Mutex<State>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of objects stored, reachable or not.
    pub fn object_count(&self) -> usize {
        self.state.lock().objects.len()
    }

    /// Commits reachable from `refname`, newest first.
    pub fn history(&self, refname: &RefName) -> Vec<Revision> {
        let state = self.state.lock();
        let mut out = Vec::new();
        let mut next = state.refs.get(refname).cloned();
        while let Some(rev) = next {
            next = match state.objects.get(rev.oid()) {
                Some(Object::Commit { parent, .. }) => parent.clone(),
                _ => None,
            };
            out.push(rev);
        }
        out
    }

    fn hash(kind: &str, content: &[u8]) -> Oid {
        let mut hasher = Sha1::new();
        hasher.update(format!("{} {}\0", kind, content.len()).as_bytes());
        hasher.update(content);
        Oid::from_sha1(hasher.finalize().into())
    }
}

impl ObjectStore for MemoryStore {
    fn resolve_ref(&self, refname: &RefName) -> Result<Option<Revision>, StoreError> {
        Ok(self.state.lock().refs.get(refname).cloned())
    }

    fn read_note_map(&self, revision: &Revision) -> Result<NoteMap, StoreError> {
        let state = self.state.lock();
        let tree = match state.objects.get(revision.oid()) {
            Some(Object::Commit { tree, .. }) => tree,
            Some(_) => {
                return Err(StoreError::UnexpectedObject {
                    oid: revision.to_string(),
                    expected: "commit",
                })
            }
            None => {
                return Err(StoreError::ObjectNotFound {
                    oid: revision.to_string(),
                })
            }
        };
        match state.objects.get(tree) {
            Some(Object::Tree(notes)) => Ok(notes.clone()),
            Some(_) => Err(StoreError::UnexpectedObject {
                oid: tree.to_string(),
                expected: "tree",
            }),
            None => Err(StoreError::ObjectNotFound {
                oid: tree.to_string(),
            }),
        }
    }

    fn read_blob(&self, oid: &Oid) -> Result<Vec<u8>, StoreError> {
        match self.state.lock().objects.get(oid) {
            Some(Object::Blob(content)) => Ok(content.clone()),
            Some(_) => Err(StoreError::UnexpectedObject {
                oid: oid.to_string(),
                expected: "blob",
            }),
            None => Err(StoreError::ObjectNotFound {
                oid: oid.to_string(),
            }),
        }
    }

    fn write_blob(&self, content: &[u8]) -> Result<Oid, StoreError> {
        let oid = Self::hash("blob", content);
        self.state
            .lock()
            .objects
            .insert(oid.clone(), Object::Blob(content.to_vec()));
        Ok(oid)
    }

    fn write_note_tree(&self, notes: &NoteMap) -> Result<Oid, StoreError> {
        let mut state = self.state.lock();
        let mut body = Vec::new();
        for (key, blob) in notes.iter() {
            if !matches!(state.objects.get(blob), Some(Object::Blob(_))) {
                return Err(StoreError::ObjectNotFound {
                    oid: blob.to_string(),
                });
            }
            body.extend_from_slice(format!("100644 {}\0{}\n", key, blob).as_bytes());
        }
        let oid = Self::hash("tree", &body);
        state.objects.insert(oid.clone(), Object::Tree(notes.clone()));
        Ok(oid)
    }

    fn commit(
        &self,
        parent: Option<&Revision>,
        tree: &Oid,
        message: &str,
    ) -> Result<Revision, StoreError> {
        let mut state = self.state.lock();
        if !matches!(state.objects.get(tree), Some(Object::Tree(_))) {
            return Err(StoreError::ObjectNotFound {
                oid: tree.to_string(),
            });
        }
        if let Some(parent) = parent {
            if !matches!(state.objects.get(parent.oid()), Some(Object::Commit { .. })) {
                return Err(StoreError::ObjectNotFound {
                    oid: parent.to_string(),
                });
            }
        }

        state.sequence += 1;
        let mut body = format!("tree {}\n", tree);
        if let Some(parent) = parent {
            body.push_str(&format!("parent {}\n", parent));
        }
        body.push_str(&format!("sequence {}\n\n{}", state.sequence, message));

        let oid = Self::hash("commit", body.as_bytes());
        state.objects.insert(
            oid.clone(),
            Object::Commit {
                parent: parent.cloned(),
                tree: tree.clone(),
            },
        );
        Ok(Revision::new(oid))
    }

    fn compare_and_swap_ref(
        &self,
        refname: &RefName,
        expected_old: Option<&Revision>,
        new: &Revision,
    ) -> Result<bool, StoreError> {
        let mut state = self.state.lock();
        if !matches!(state.objects.get(new.oid()), Some(Object::Commit { .. })) {
            return Err(StoreError::ObjectNotFound {
                oid: new.to_string(),
            });
        }
        if state.refs.get(refname) != expected_old {
            return Ok(false);
        }
        state.refs.insert(refname.clone(), new.clone());
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::notes::key::NoteKey;

    fn refname() -> RefName {
        RefName::group_names()
    }

    fn commit_notes(store: &MemoryStore, parent: Option<&Revision>, notes: &NoteMap) -> Revision {
        let tree = store.write_note_tree(notes).unwrap();
        store.commit(parent, &tree, "test").unwrap()
    }

    #[test]
    fn blobs_are_content_addressed() {
        let store = MemoryStore::new();
        let a = store.write_blob(b"hello").unwrap();
        let b = store.write_blob(b"hello").unwrap();
        assert_eq!(a, b);
        // matches `git hash-object` for "hello"
        assert_eq!(a.as_str(), "b6fc4c620b67d95f953a5c1c1230aaab5db5a1b0");
        assert_eq!(store.read_blob(&a).unwrap(), b"hello");
    }

    #[test]
    fn missing_ref_resolves_to_none() {
        let store = MemoryStore::new();
        assert!(store.resolve_ref(&refname()).unwrap().is_none());
    }

    #[test]
    fn note_map_survives_commit() {
        let store = MemoryStore::new();
        let blob = store.write_blob(b"record").unwrap();
        let mut notes = NoteMap::new();
        notes.set(NoteKey::from_bytes([7; 20]), blob.clone());

        let rev = commit_notes(&store, None, &notes);
        assert_eq!(store.read_note_map(&rev).unwrap(), notes);
    }

    #[test]
    fn tree_with_missing_blob_rejected() {
        let store = MemoryStore::new();
        let mut notes = NoteMap::new();
        notes.set(
            NoteKey::from_bytes([1; 20]),
            Oid::new("a".repeat(40)).unwrap(),
        );
        assert!(matches!(
            store.write_note_tree(&notes),
            Err(StoreError::ObjectNotFound { .. })
        ));
    }

    #[test]
    fn read_blob_of_tree_is_unexpected_object() {
        let store = MemoryStore::new();
        let tree = store.write_note_tree(&NoteMap::new()).unwrap();
        assert!(matches!(
            store.read_blob(&tree),
            Err(StoreError::UnexpectedObject { expected: "blob", .. })
        ));
    }

    #[test]
    fn identical_commits_get_distinct_ids() {
        let store = MemoryStore::new();
        let tree = store.write_note_tree(&NoteMap::new()).unwrap();
        let a = store.commit(None, &tree, "same").unwrap();
        let b = store.commit(None, &tree, "same").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn cas_create_only_when_absent() {
        let store = MemoryStore::new();
        let first = commit_notes(&store, None, &NoteMap::new());
        let second = commit_notes(&store, None, &NoteMap::new());

        assert!(store.compare_and_swap_ref(&refname(), None, &first).unwrap());
        assert!(!store.compare_and_swap_ref(&refname(), None, &second).unwrap());
        assert_eq!(store.resolve_ref(&refname()).unwrap(), Some(first));
    }

    #[test]
    fn cas_update_requires_expected_tip() {
        let store = MemoryStore::new();
        let base = commit_notes(&store, None, &NoteMap::new());
        store.compare_and_swap_ref(&refname(), None, &base).unwrap();

        let a = commit_notes(&store, Some(&base), &NoteMap::new());
        let b = commit_notes(&store, Some(&base), &NoteMap::new());

        assert!(store.compare_and_swap_ref(&refname(), Some(&base), &a).unwrap());
        assert!(!store.compare_and_swap_ref(&refname(), Some(&base), &b).unwrap());
        assert_eq!(store.resolve_ref(&refname()).unwrap(), Some(a));
    }

    #[test]
    fn history_walks_parents() {
        let store = MemoryStore::new();
        let first = commit_notes(&store, None, &NoteMap::new());
        store.compare_and_swap_ref(&refname(), None, &first).unwrap();
        let second = commit_notes(&store, Some(&first), &NoteMap::new());
        store
            .compare_and_swap_ref(&refname(), Some(&first), &second)
            .unwrap();

        assert_eq!(store.history(&refname()), vec![second, first]);
    }
}

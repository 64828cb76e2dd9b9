//! store::note_map
//!
//! In-memory form of one revision's notes tree.

use std::collections::BTreeMap;

use crate::core::notes::key::NoteKey;
use crate::core::types::Oid;

/// Note key to blob id associations at one revision.
///
/// A key holds at most one blob, so a name can only ever resolve to a
/// single record. Setting a key replaces its blob and removing an
/// absent key does nothing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NoteMap {
    notes: BTreeMap<NoteKey, Oid>,
}

impl NoteMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &NoteKey) -> Option<&Oid> {
        self.notes.get(key)
    }

    pub fn contains(&self, key: &NoteKey) -> bool {
        self.notes.contains_key(key)
    }

    /// Bind `key` to `blob`, returning the blob it replaced.
    pub fn set(&mut self, key: NoteKey, blob: Oid) -> Option<Oid> {
        self.notes.insert(key, blob)
    }

    /// Unset `key`, returning the blob it held.
    pub fn remove(&mut self, key: &NoteKey) -> Option<Oid> {
        self.notes.remove(key)
    }

    /// Iterate notes in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&NoteKey, &Oid)> + '_ {
        self.notes.iter()
    }

    pub fn len(&self) -> usize {
        self.notes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }
}

impl FromIterator<(NoteKey, Oid)> for NoteMap {
    fn from_iter<I: IntoIterator<Item = (NoteKey, Oid)>>(iter: I) -> Self {
        Self {
            notes: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(b: u8) -> NoteKey {
        NoteKey::from_bytes([b; 20])
    }

    fn oid(c: char) -> Oid {
        Oid::new(c.to_string().repeat(40)).unwrap()
    }

    #[test]
    fn set_replaces_existing() {
        let mut map = NoteMap::new();
        assert_eq!(map.set(key(1), oid('a')), None);
        assert_eq!(map.set(key(1), oid('b')), Some(oid('a')));
        assert_eq!(map.get(&key(1)), Some(&oid('b')));
        assert_eq!(map.len(), 1);
    }

    #[test]
    fn remove_absent_is_noop() {
        let mut map = NoteMap::new();
        map.set(key(1), oid('a'));
        assert_eq!(map.remove(&key(2)), None);
        assert_eq!(map.len(), 1);
        assert_eq!(map.remove(&key(1)), Some(oid('a')));
        assert!(map.is_empty());
    }

    #[test]
    fn iterates_in_key_order() {
        let map: NoteMap = [(key(3), oid('c')), (key(1), oid('a')), (key(2), oid('b'))]
            .into_iter()
            .collect();
        let keys: Vec<_> = map.iter().map(|(k, _)| *k).collect();
        assert_eq!(keys, vec![key(1), key(2), key(3)]);
    }
}

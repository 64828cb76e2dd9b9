//! core::notes::key
//!
//! Derivation of note keys from group names.
//!
//! A note key is the content address of a name: the note holding a
//! group's record lives at the path given by the key's hex form. Every
//! writer must derive keys the same way, so the algorithm is a versioned
//! constant of the deriver type rather than a runtime setting. Moving to a
//! different algorithm means rewriting every note under new keys.

use sha1::{Digest, Sha1};

use crate::core::types::GroupName;

/// A 20-byte note address derived from a group name.
///
/// # Example
///
/// ```
/// use groupnotes::core::notes::key::NoteKey;
///
/// let key = NoteKey::from_hex("a9993e364706816aba3e25717850c26c9cd0d89d").unwrap();
/// assert_eq!(key.to_string(), "a9993e364706816aba3e25717850c26c9cd0d89d");
/// assert!(NoteKey::from_hex("a9993e").is_none());
/// ```
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NoteKey([u8; NoteKey::LEN]);

impl NoteKey {
    /// Length of a key in bytes.
    pub const LEN: usize = 20;

    pub fn from_bytes(bytes: [u8; Self::LEN]) -> Self {
        Self(bytes)
    }

    /// Parse a key from its 40-character hex form (case-insensitive).
    ///
    /// Returns `None` for anything else, which is how tree entries that
    /// are not notes get skipped.
    pub fn from_hex(s: &str) -> Option<Self> {
        if s.len() != Self::LEN * 2 {
            return None;
        }
        let mut bytes = [0u8; Self::LEN];
        hex::decode_to_slice(s, &mut bytes).ok()?;
        Some(Self(bytes))
    }

    pub fn as_bytes(&self) -> &[u8; Self::LEN] {
        &self.0
    }

    /// Lowercase hex form, used as the note's path in a tree.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl std::fmt::Display for NoteKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl std::fmt::Debug for NoteKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "NoteKey({})", self.to_hex())
    }
}

/// Maps a group name to the key of its note.
///
/// Implementations must be pure and total.
pub trait KeyDeriver {
    /// Algorithm name, for diagnostics.
    const ALGORITHM: &'static str;

    /// Key format version. Two derivers with different versions must
    /// never write to the same registry.
    const VERSION: u32;

    fn derive(&self, name: &GroupName) -> NoteKey;
}

/// SHA-1 over the UTF-8 bytes of the name (key format v1).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Sha1KeyDeriver;

impl KeyDeriver for Sha1KeyDeriver {
    const ALGORITHM: &'static str = "sha1";
    const VERSION: u32 = 1;

    fn derive(&self, name: &GroupName) -> NoteKey {
        let digest = Sha1::digest(name.as_str().as_bytes());
        NoteKey(digest.into())
    }
}

/// The deriver every registry in this crate uses.
pub type DefaultKeyDeriver = Sha1KeyDeriver;

/// Derive a key with [`DefaultKeyDeriver`].
///
/// # Example
///
/// ```
/// use groupnotes::core::notes::key::derive_key;
/// use groupnotes::core::types::GroupName;
///
/// let key = derive_key(&GroupName::new("abc").unwrap());
/// assert_eq!(key.to_hex(), "a9993e364706816aba3e25717850c26c9cd0d89d");
/// ```
pub fn derive_key(name: &GroupName) -> NoteKey {
    DefaultKeyDeriver::default().derive(name)
}

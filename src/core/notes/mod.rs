//! core::notes
//!
//! Group name notes: keys, record encoding, and reading/writing the notes
//! tree of a ref.
//!
//! # Modules
//!
//! - [`key`] - Name to note key derivation
//! - [`config_text`] - The git-config text format of note bodies
//! - [`record`] - Note body encoding of an `(id, name)` pair
//! - [`index`] - Read model over one revision
//! - [`versioned`] - Load / open / commit over a ref with CAS
//!
//! # Architecture
//!
//! The ref `refs/meta/group-names` points at a commit whose tree holds one
//! blob per registered name. The blob's path is the hex SHA-1 of the name
//! and its content records the owning group id and the name itself.
//! Because a path can hold only one blob, a name can belong to at most one
//! group in any revision.

pub mod config_text;
pub mod index;
pub mod key;
pub mod record;
pub mod versioned;

// Re-export commonly used types
pub use index::{IndexError, NameIndex};
pub use key::{derive_key, DefaultKeyDeriver, KeyDeriver, NoteKey, Sha1KeyDeriver};
pub use record::{decode_record, encode_record, DecodeError};
pub use versioned::{CommitError, NotesWriter, VersionedNotes};

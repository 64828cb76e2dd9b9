//! git
//!
//! Single interface for all Git operations.
//!
//! # Architecture
//!
//! This module is the **ONLY doorway** to Git. All repository reads and
//! writes flow through this interface. No other module should import
//! `git2`, and nothing shells out to the git CLI.
//!
//! # Responsibilities
//!
//! - Repository discovery, opening and creation (bare or not)
//! - Ref resolution and compare-and-swap updates
//! - Blob, tree and commit objects
//! - The [`ObjectStore`](crate::store::ObjectStore) implementation the
//!   registry runs on
//!
//! # Invariants
//!
//! - All ref updates use CAS (compare-and-swap) semantics
//! - No other module calls git2 directly
//! - All operations return strong types (Oid, Revision, RefName)
//!
//! # Example
//!
//! ```ignore
//! use groupnotes::core::registry::GroupNameRegistry;
//! use groupnotes::git::Git;
//! use std::path::Path;
//!
//! let git = Git::open(Path::new("."))?;
//! let registry = GroupNameRegistry::new(&git);
//! for group in registry.list_all()? {
//!     println!("{} {}", group.id, group.name);
//! }
//! ```

mod interface;
mod store;

pub use interface::{
    CommitInfo, Git, GitError, Identity, DEFAULT_COMMITTER_EMAIL, DEFAULT_COMMITTER_NAME,
};

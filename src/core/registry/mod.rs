//! core::registry
//!
//! The group name registry: which group owns which name, versioned on a
//! git ref.
//!
//! # Modules
//!
//! - [`transaction`] - The write path (load, validate, commit)
//! - [`snapshot`] - The read path
//! - [`error`] - Registry errors
//!
//! # Guarantees
//!
//! - A name belongs to at most one group in any revision.
//! - Every accepted change is exactly one commit on the ref, parented on
//!   the revision it was validated against.
//! - A change validated against a stale revision is never committed; it
//!   fails with [`RegistryError::ConcurrentModification`].
//!
//! # Example
//!
//! ```
//! use groupnotes::core::registry::GroupNameRegistry;
//! use groupnotes::core::types::{GroupId, GroupName};
//! use groupnotes::store::memory::MemoryStore;
//!
//! let store = MemoryStore::new();
//! let registry = GroupNameRegistry::new(&store);
//!
//! let id = GroupId::generate();
//! let admins = GroupName::new("admins").unwrap();
//! let owners = GroupName::new("owners").unwrap();
//!
//! registry.create_name(&id, &admins).unwrap();
//! registry.rename_name(&id, &admins, &owners).unwrap();
//!
//! assert!(registry.lookup(&admins).unwrap().is_none());
//! assert_eq!(registry.lookup(&owners).unwrap().unwrap().id, id);
//! ```

pub mod error;
pub mod snapshot;
pub mod transaction;

use std::collections::BTreeSet;

use crate::core::types::{GroupId, GroupName, GroupReference, RefName};
use crate::store::ObjectStore;

pub use error::RegistryError;
pub use snapshot::RegistrySnapshot;
pub use transaction::{
    GroupNameTransaction, Initialized, Loaded, NameChange, TransactionOutcome, Validated,
};

/// Registry of group names on one ref of a store.
pub struct GroupNameRegistry<'a, S: ?Sized> {
    store: &'a S,
    refname: RefName,
}

impl<'a, S: ObjectStore + ?Sized> GroupNameRegistry<'a, S> {
    /// Registry on the default ref, `refs/meta/group-names`.
    pub fn new(store: &'a S) -> Self {
        Self::with_ref(store, RefName::group_names())
    }

    pub fn with_ref(store: &'a S, refname: RefName) -> Self {
        Self { store, refname }
    }

    pub fn refname(&self) -> &RefName {
        &self.refname
    }

    /// Start a transaction applying `change` to `group`.
    pub fn transaction(
        &self,
        group: &GroupId,
        change: NameChange,
    ) -> GroupNameTransaction<'a, S, Initialized> {
        GroupNameTransaction::new(self.store, self.refname.clone(), group.clone(), change)
    }

    /// Read the current tip.
    pub fn snapshot(&self) -> Result<RegistrySnapshot<'a, S>, RegistryError> {
        RegistrySnapshot::load(self.store, self.refname.clone())
    }

    /// Register `name` as the first name of `group`.
    pub fn create_name(
        &self,
        group: &GroupId,
        name: &GroupName,
    ) -> Result<TransactionOutcome, RegistryError> {
        self.transaction(group, NameChange::create(name.clone()))
            .run()
    }

    /// Move `group` from `old` to `new`.
    pub fn rename_name(
        &self,
        group: &GroupId,
        old: &GroupName,
        new: &GroupName,
    ) -> Result<TransactionOutcome, RegistryError> {
        self.transaction(group, NameChange::rename(old.clone(), new.clone()))
            .run()
    }

    /// Vacate `name`, which `group` must own.
    pub fn delete_name(
        &self,
        group: &GroupId,
        name: &GroupName,
    ) -> Result<TransactionOutcome, RegistryError> {
        self.transaction(group, NameChange::remove(name.clone()))
            .run()
    }

    pub fn lookup(&self, name: &GroupName) -> Result<Option<GroupReference>, RegistryError> {
        self.snapshot()?.lookup(name)
    }

    /// Every registered name at the current tip.
    pub fn list_all(&self) -> Result<BTreeSet<GroupReference>, RegistryError> {
        self.snapshot()?.load_all()
    }
}

//! core::registry::transaction
//!
//! The write path: one name change for one group, committed atomically.
//!
//! # Lifecycle
//!
//! ```text
//! Initialized --load--> Loaded --validate--> Validated --commit--> TransactionOutcome
//! ```
//!
//! Each step consumes the transaction, so a step cannot be skipped or
//! repeated. Any `Err` ends the transaction (rejected); the caller builds a
//! new one to try again.
//!
//! # Validation
//!
//! - The old name (rename, remove) must exist and belong to the group.
//! - The new name (create, rename) must not exist at all, even if it
//!   already belongs to the same group.
//!
//! Validation reads the loaded revision only. Writers that land between
//! load and commit are caught by the compare-and-swap at commit, which
//! fails with [`RegistryError::ConcurrentModification`].
//!
//! # Example
//!
//! ```
//! use groupnotes::core::registry::transaction::{GroupNameTransaction, NameChange};
//! use groupnotes::core::types::{GroupId, GroupName, RefName};
//! use groupnotes::store::memory::MemoryStore;
//!
//! let store = MemoryStore::new();
//! let id = GroupId::generate();
//! let change = NameChange::create(GroupName::new("admins").unwrap());
//!
//! let outcome = GroupNameTransaction::new(&store, RefName::group_names(), id, change)
//!     .load()
//!     .and_then(|tx| tx.validate())
//!     .and_then(|tx| tx.commit())
//!     .unwrap();
//! assert!(outcome.is_committed());
//! ```

use tracing::debug;

use super::error::RegistryError;
use crate::core::notes::{encode_record, CommitError, IndexError, NameIndex, VersionedNotes};
use crate::core::types::{GroupId, GroupName, GroupReference, RefName, Revision};
use crate::store::ObjectStore;

/// The name change a transaction applies to one group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NameChange {
    /// Register the first name of a new group.
    Create { name: GroupName },
    /// Move a group from `old` to `new`. A no-op when they are equal.
    Rename { old: GroupName, new: GroupName },
    /// Vacate a group's name without taking another.
    Remove { name: GroupName },
}

impl NameChange {
    pub fn create(name: GroupName) -> Self {
        NameChange::Create { name }
    }

    pub fn rename(old: GroupName, new: GroupName) -> Self {
        NameChange::Rename { old, new }
    }

    pub fn remove(name: GroupName) -> Self {
        NameChange::Remove { name }
    }

    /// Whether the change leaves the registry as it is.
    pub fn is_noop(&self) -> bool {
        matches!(self, NameChange::Rename { old, new } if old == new)
    }

    /// The name being vacated, if any.
    pub fn old_name(&self) -> Option<&GroupName> {
        match self {
            _ if self.is_noop() => None,
            NameChange::Create { .. } => None,
            NameChange::Rename { old, .. } => Some(old),
            NameChange::Remove { name } => Some(name),
        }
    }

    /// The name being claimed, if any.
    pub fn new_name(&self) -> Option<&GroupName> {
        match self {
            _ if self.is_noop() => None,
            NameChange::Create { name } => Some(name),
            NameChange::Rename { new, .. } => Some(new),
            NameChange::Remove { .. } => None,
        }
    }

    /// Commit message recorded for the change.
    pub fn commit_message(&self) -> String {
        match self {
            NameChange::Create { name } => format!("Create group name '{}'", name),
            NameChange::Rename { old, new } => {
                format!("Rename group name '{}' to '{}'", old, new)
            }
            NameChange::Remove { name } => format!("Delete group name '{}'", name),
        }
    }
}

/// Result of a successful transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransactionOutcome {
    /// A new commit was written and the ref now points at it.
    Committed(Revision),
    /// There was nothing to do; no objects were written.
    Unchanged,
}

impl TransactionOutcome {
    pub fn is_committed(&self) -> bool {
        matches!(self, TransactionOutcome::Committed(_))
    }

    /// The new revision, if one was committed.
    pub fn revision(&self) -> Option<&Revision> {
        match self {
            TransactionOutcome::Committed(rev) => Some(rev),
            TransactionOutcome::Unchanged => None,
        }
    }
}

/// State: constructed, nothing read yet.
pub struct Initialized;

/// State: tip loaded and indexed.
pub struct Loaded<'a, S: ?Sized> {
    index: NameIndex<'a, S>,
}

/// State: request checked against the loaded index.
pub struct Validated<'a, S: ?Sized> {
    index: NameIndex<'a, S>,
}

/// A name change for one group, moving through load, validate, commit.
pub struct GroupNameTransaction<'a, S: ?Sized, State> {
    notes: VersionedNotes<'a, S>,
    group: GroupId,
    change: NameChange,
    state: State,
}

impl<'a, S: ObjectStore + ?Sized, State> GroupNameTransaction<'a, S, State> {
    pub fn group(&self) -> &GroupId {
        &self.group
    }

    pub fn change(&self) -> &NameChange {
        &self.change
    }

    pub fn refname(&self) -> &RefName {
        self.notes.refname()
    }

    fn advance<Next>(self, state: Next) -> GroupNameTransaction<'a, S, Next> {
        GroupNameTransaction {
            notes: self.notes,
            group: self.group,
            change: self.change,
            state,
        }
    }
}

impl<'a, S: ObjectStore + ?Sized> GroupNameTransaction<'a, S, Initialized> {
    pub fn new(store: &'a S, refname: RefName, group: GroupId, change: NameChange) -> Self {
        Self {
            notes: VersionedNotes::new(store, refname),
            group,
            change,
            state: Initialized,
        }
    }

    /// Resolve the ref's tip and index its notes.
    ///
    /// # Errors
    ///
    /// [`RegistryError::Store`] if the store cannot be read.
    pub fn load(self) -> Result<GroupNameTransaction<'a, S, Loaded<'a, S>>, RegistryError> {
        let revision = self.notes.load()?;
        let index = NameIndex::load(self.notes.store(), revision)?;
        debug!(
            refname = %self.notes.refname(),
            revision = ?index.revision().map(|r| r.to_string()),
            names = index.len(),
            "loaded group names"
        );
        Ok(self.advance(Loaded { index }))
    }

    /// Load, validate and commit in one go.
    pub fn run(self) -> Result<TransactionOutcome, RegistryError> {
        self.load()?.validate()?.commit()
    }
}

impl<'a, S: ObjectStore + ?Sized> GroupNameTransaction<'a, S, Loaded<'a, S>> {
    /// The index the transaction will validate against.
    pub fn index(&self) -> &NameIndex<'a, S> {
        &self.state.index
    }

    /// Check the request against the loaded revision.
    ///
    /// # Errors
    ///
    /// - [`RegistryError::ConfigInvalid`] if the old name is absent, owned
    ///   by another group, or its note is corrupt
    /// - [`RegistryError::DuplicateName`] if the new name is taken
    /// - [`RegistryError::Store`] if a note cannot be read
    pub fn validate(self) -> Result<GroupNameTransaction<'a, S, Validated<'a, S>>, RegistryError> {
        let index = &self.state.index;

        if let Some(old) = self.change.old_name() {
            match index.lookup_name(old) {
                Ok(Some(found)) if found.id == self.group => {}
                Ok(Some(found)) => {
                    return Err(RegistryError::ConfigInvalid {
                        message: format!(
                            "name '{}' points to group '{}' and not to '{}'",
                            old, found.id, self.group
                        ),
                    })
                }
                Ok(None) => {
                    return Err(RegistryError::ConfigInvalid {
                        message: format!(
                            "group name '{}' doesn't exist in the list of all names",
                            old
                        ),
                    })
                }
                Err(IndexError::Corrupt { key, source }) => {
                    return Err(RegistryError::ConfigInvalid {
                        message: format!("note {} for name '{}' is corrupt: {}", key, old, source),
                    })
                }
                Err(IndexError::Store(e)) => return Err(RegistryError::Store(e)),
            }
        }

        if let Some(new) = self.change.new_name() {
            if index.contains_name(new) {
                return Err(RegistryError::DuplicateName { name: new.clone() });
            }
        }

        debug!(group = %self.group, change = ?self.change, "validated name change");
        let Loaded { index } = self.state;
        let state = Validated { index };
        Ok(GroupNameTransaction {
            notes: self.notes,
            group: self.group,
            change: self.change,
            state,
        })
    }
}

impl<'a, S: ObjectStore + ?Sized> GroupNameTransaction<'a, S, Validated<'a, S>> {
    /// Stage the delta on the loaded note map and commit it.
    ///
    /// # Errors
    ///
    /// - [`RegistryError::ConcurrentModification`] if the ref moved since load
    /// - [`RegistryError::Store`] if objects or the ref cannot be written
    pub fn commit(self) -> Result<TransactionOutcome, RegistryError> {
        if self.change.is_noop() {
            debug!(group = %self.group, "name unchanged, nothing to commit");
            return Ok(TransactionOutcome::Unchanged);
        }

        let index = self.state.index;
        let old_key = self.change.old_name().map(|name| index.key_for(name));
        let new_key = self.change.new_name().map(|name| index.key_for(name));
        let (base, notes) = index.into_parts();
        let mut writer = self.notes.open_with_notes(base, notes);

        if let Some(key) = old_key {
            writer.remove(&key);
        }
        if let (Some(key), Some(name)) = (new_key, self.change.new_name()) {
            let record = GroupReference::new(self.group.clone(), name.clone());
            writer.set(key, &encode_record(&record))?;
        }

        match self.notes.commit(writer, &self.change.commit_message()) {
            Ok(revision) => Ok(TransactionOutcome::Committed(revision)),
            Err(CommitError::RefMoved { refname }) => {
                Err(RegistryError::ConcurrentModification { refname })
            }
            Err(CommitError::Store(e)) => Err(RegistryError::Store(e)),
        }
    }
}

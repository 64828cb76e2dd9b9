//! git::store
//!
//! [`ObjectStore`] over a real repository.
//!
//! Notes are written as a flat tree, one blob per 40-hex key. Reading
//! also accepts fan-out trees written by other tools (`ab/cdef...`);
//! paths that do not spell a key are ignored.

use tracing::debug;

use super::interface::{Git, GitError};
use crate::core::notes::NoteKey;
use crate::core::types::{Oid, RefName, Revision};
use crate::store::{NoteMap, ObjectStore, StoreError};

impl From<GitError> for StoreError {
    fn from(err: GitError) -> Self {
        match err {
            GitError::ObjectNotFound { oid } => StoreError::ObjectNotFound { oid },
            GitError::UnexpectedObject { oid, expected } => {
                StoreError::UnexpectedObject { oid, expected }
            }
            other => StoreError::Backend {
                message: other.to_string(),
            },
        }
    }
}

impl ObjectStore for Git {
    fn resolve_ref(&self, refname: &RefName) -> Result<Option<Revision>, StoreError> {
        match self.try_resolve_ref(refname.as_str()) {
            Ok(oid) => Ok(oid.map(Revision::new)),
            Err(GitError::UnexpectedObject { oid, .. }) => Err(StoreError::InvalidRef {
                refname: refname.to_string(),
                message: format!("target {} is not a commit", oid),
            }),
            Err(GitError::UnsupportedRef { message, .. }) => Err(StoreError::InvalidRef {
                refname: refname.to_string(),
                message,
            }),
            Err(e) => Err(e.into()),
        }
    }

    fn read_note_map(&self, revision: &Revision) -> Result<NoteMap, StoreError> {
        let blobs = self.read_commit_blobs(revision.oid())?;
        let total = blobs.len();
        let notes: NoteMap = blobs
            .into_iter()
            .filter_map(|(path, blob)| NoteKey::from_hex(&path).map(|key| (key, blob)))
            .collect();
        if notes.len() != total {
            debug!(
                revision = %revision,
                ignored = total - notes.len(),
                "ignored tree entries that are not note keys"
            );
        }
        Ok(notes)
    }

    fn read_blob(&self, oid: &Oid) -> Result<Vec<u8>, StoreError> {
        Ok(Git::read_blob(self, oid)?)
    }

    fn write_blob(&self, content: &[u8]) -> Result<Oid, StoreError> {
        Ok(Git::write_blob(self, content)?)
    }

    fn write_note_tree(&self, notes: &NoteMap) -> Result<Oid, StoreError> {
        let names: Vec<(String, &Oid)> = notes.iter().map(|(k, v)| (k.to_hex(), v)).collect();
        Ok(self.write_flat_tree(names.iter().map(|(name, oid)| (name.as_str(), *oid)))?)
    }

    fn commit(
        &self,
        parent: Option<&Revision>,
        tree: &Oid,
        message: &str,
    ) -> Result<Revision, StoreError> {
        let oid = Git::commit(self, parent.map(Revision::oid), tree, message)?;
        Ok(Revision::new(oid))
    }

    fn compare_and_swap_ref(
        &self,
        refname: &RefName,
        expected_old: Option<&Revision>,
        new: &Revision,
    ) -> Result<bool, StoreError> {
        Ok(Git::compare_and_swap_ref(
            self,
            refname.as_str(),
            expected_old.map(Revision::oid),
            new.oid(),
            "groupnotes: update group names",
        )?)
    }
}

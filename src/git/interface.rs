//! git::interface
//!
//! Git interface implementation using git2.
//!
//! This module is the **single doorway** to all Git operations in
//! groupnotes. Every repository interaction flows through [`Git`], which
//! returns strong types and normalizes errors into typed failure
//! categories.
//!
//! # Error Handling
//!
//! Git errors are categorized into typed variants:
//! - [`GitError::NotARepo`]: Not inside a Git repository
//! - [`GitError::ObjectNotFound`]: Requested object does not exist
//! - [`GitError::UnexpectedObject`]: Object exists with the wrong type
//! - [`GitError::UnsupportedRef`]: Ref is symbolic instead of direct
//! - [`GitError::AccessError`]: Lock or filesystem failure
//!
//! A lost compare-and-swap is not an error: [`Git::compare_and_swap_ref`]
//! returns `Ok(false)`.
//!
//! # Example
//!
//! ```ignore
//! use groupnotes::git::Git;
//! use std::path::Path;
//!
//! let git = Git::open(Path::new("."))?;
//! if let Some(oid) = git.try_resolve_ref("refs/meta/group-names")? {
//!     println!("registry is at {}", oid.short(7));
//! }
//! ```

use std::path::{Path, PathBuf};

use parking_lot::Mutex;
use thiserror::Error;
use tracing::debug;

use crate::core::types::{Oid, TypeError};

/// Committer name used when neither config nor git provide one.
pub const DEFAULT_COMMITTER_NAME: &str = "groupnotes";

/// Committer email used when neither config nor git provide one.
pub const DEFAULT_COMMITTER_EMAIL: &str = "groupnotes@localhost";

/// File mode of note blobs in a notes tree.
const NOTE_FILE_MODE: i32 = 0o100644;

/// Errors from Git operations.
#[derive(Debug, Error)]
pub enum GitError {
    /// Not inside a Git repository.
    #[error("not a git repository: {path}")]
    NotARepo {
        /// The path that was searched
        path: PathBuf,
    },

    /// Object not found in repository.
    #[error("object not found: {oid}")]
    ObjectNotFound {
        /// The OID that was not found
        oid: String,
    },

    /// Object exists but has the wrong type.
    #[error("object {oid} is not a {expected}")]
    UnexpectedObject {
        /// The OID that was read
        oid: String,
        /// The type that was needed
        expected: &'static str,
    },

    /// Ref exists but is not a direct ref to a commit.
    #[error("ref {refname} {message}")]
    UnsupportedRef {
        /// The ref that was read
        refname: String,
        /// What the ref is instead
        message: String,
    },

    /// Invalid object id format.
    #[error("invalid object id: {oid}")]
    InvalidOid {
        /// The invalid OID string
        oid: String,
    },

    /// Invalid ref name format.
    #[error("invalid ref name: {message}")]
    InvalidRefName {
        /// Description of the problem
        message: String,
    },

    /// Permission or filesystem error.
    #[error("repository access error: {message}")]
    AccessError {
        /// Description of the error
        message: String,
    },

    /// Internal git2 error.
    #[error("git error: {message}")]
    Internal {
        /// The error message
        message: String,
    },
}

impl GitError {
    /// Create a GitError from a git2::Error with richer context.
    fn from_git2(err: git2::Error, context: &str) -> Self {
        match err.code() {
            git2::ErrorCode::NotFound => GitError::ObjectNotFound {
                oid: context.to_string(),
            },
            git2::ErrorCode::InvalidSpec => GitError::InvalidOid {
                oid: context.to_string(),
            },
            git2::ErrorCode::Locked => GitError::AccessError {
                message: format!("repository is locked: {}", err.message()),
            },
            _ => GitError::Internal {
                message: format!("{}: {}", context, err.message()),
            },
        }
    }
}

impl From<TypeError> for GitError {
    fn from(err: TypeError) -> Self {
        match err {
            TypeError::InvalidRefName(msg) => GitError::InvalidRefName { message: msg },
            other => GitError::InvalidOid {
                oid: other.to_string(),
            },
        }
    }
}

/// Committer identity override.
///
/// Fields left unset fall back to the repository's `user.name` /
/// `user.email`, then to [`DEFAULT_COMMITTER_NAME`] /
/// [`DEFAULT_COMMITTER_EMAIL`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Identity {
    pub name: Option<String>,
    pub email: Option<String>,
}

/// Information about a commit.
#[derive(Debug, Clone)]
pub struct CommitInfo {
    /// Commit OID
    pub oid: Oid,
    /// First line of the commit message
    pub summary: String,
    /// Full commit message
    pub message: String,
    /// Committer name
    pub committer_name: String,
    /// Committer email
    pub committer_email: String,
}

/// The Git interface.
///
/// Wraps a `git2::Repository` behind a mutex so one handle can be shared
/// between threads.
pub struct Git {
    repo: Mutex<git2::Repository>,
    git_dir: PathBuf,
    work_dir: Option<PathBuf>,
    identity: Identity,
}

impl std::fmt::Debug for Git {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Git")
            .field("path", &self.git_dir)
            .finish()
    }
}

fn to_git2(oid: &Oid) -> Result<git2::Oid, GitError> {
    git2::Oid::from_str(oid.as_str()).map_err(|e| GitError::from_git2(e, oid.as_str()))
}

fn from_git2_oid(oid: git2::Oid) -> Result<Oid, GitError> {
    Oid::new(oid.to_string()).map_err(GitError::from)
}

impl Git {
    // =========================================================================
    // Repository Opening and Info
    // =========================================================================

    /// Open a repository at the given path.
    ///
    /// Uses `git2::Repository::discover` to find the repository, so `path`
    /// can be any directory within it. Bare repositories are supported.
    ///
    /// # Errors
    ///
    /// - [`GitError::NotARepo`] if no repository is found
    pub fn open(path: &Path) -> Result<Self, GitError> {
        let repo = git2::Repository::discover(path).map_err(|_| GitError::NotARepo {
            path: path.to_path_buf(),
        })?;
        Ok(Self::from_repo(repo))
    }

    /// Create a new repository at `path`.
    pub fn init(path: &Path, bare: bool) -> Result<Self, GitError> {
        let repo = if bare {
            git2::Repository::init_bare(path)
        } else {
            git2::Repository::init(path)
        }
        .map_err(|e| GitError::AccessError {
            message: format!("cannot create repository at {}: {}", path.display(), e.message()),
        })?;
        Ok(Self::from_repo(repo))
    }

    fn from_repo(repo: git2::Repository) -> Self {
        let git_dir = repo.path().to_path_buf();
        let work_dir = repo.workdir().map(Path::to_path_buf);
        Self {
            repo: Mutex::new(repo),
            git_dir,
            work_dir,
            identity: Identity::default(),
        }
    }

    /// Use `identity` for the commits this handle writes.
    pub fn with_identity(mut self, identity: Identity) -> Self {
        self.identity = identity;
        self
    }

    /// Path of the git directory (`.git`, or the repository when bare).
    pub fn git_dir(&self) -> &Path {
        &self.git_dir
    }

    /// Path of the working tree; `None` for bare repositories.
    pub fn work_dir(&self) -> Option<&Path> {
        self.work_dir.as_deref()
    }

    pub fn is_bare(&self) -> bool {
        self.work_dir.is_none()
    }

    // =========================================================================
    // Ref Operations
    // =========================================================================

    /// Resolve a ref to the commit it points at, returning None if it
    /// doesn't exist.
    ///
    /// Only direct refs to a commit are accepted. The returned id is the
    /// ref's own target, so it can be handed back to
    /// [`Git::compare_and_swap_ref`] as the expected old value.
    ///
    /// # Errors
    ///
    /// - [`GitError::UnsupportedRef`] if the ref is symbolic
    /// - [`GitError::UnexpectedObject`] if the ref points at anything but a
    ///   commit, annotated tags included
    pub fn try_resolve_ref(&self, refname: &str) -> Result<Option<Oid>, GitError> {
        let repo = self.repo.lock();
        let reference = match repo.find_reference(refname) {
            Ok(r) => r,
            Err(e) if e.code() == git2::ErrorCode::NotFound => return Ok(None),
            Err(e) => return Err(GitError::from_git2(e, refname)),
        };

        let target = match reference.target() {
            Some(target) => target,
            None => {
                let to = reference.symbolic_target().unwrap_or("<non-utf8>");
                return Err(GitError::UnsupportedRef {
                    refname: refname.to_string(),
                    message: format!("is a symbolic ref to {}", to),
                });
            }
        };

        let object = repo
            .find_object(target, None)
            .map_err(|e| GitError::from_git2(e, &target.to_string()))?;
        if object.kind() != Some(git2::ObjectType::Commit) {
            return Err(GitError::UnexpectedObject {
                oid: target.to_string(),
                expected: "commit",
            });
        }

        from_git2_oid(target).map(Some)
    }

    /// Point `refname` at `new` only if it still points at `expected_old`.
    ///
    /// `expected_old = None` means the ref must not exist yet. The check
    /// and the update happen under libgit2's ref lock, so concurrent
    /// writers (threads or processes) cannot both win.
    ///
    /// Returns `Ok(false)` when the precondition does not hold or another
    /// writer holds the ref's lock.
    pub fn compare_and_swap_ref(
        &self,
        refname: &str,
        expected_old: Option<&Oid>,
        new: &Oid,
        message: &str,
    ) -> Result<bool, GitError> {
        let new_id = to_git2(new)?;
        let repo = self.repo.lock();

        let result = match expected_old {
            None => repo.reference(refname, new_id, false, message),
            Some(old) => repo.reference_matching(refname, new_id, true, to_git2(old)?, message),
        };

        match result {
            Ok(_) => Ok(true),
            Err(e)
                if matches!(
                    e.code(),
                    git2::ErrorCode::Exists
                        | git2::ErrorCode::Modified
                        | git2::ErrorCode::NotFound
                        | git2::ErrorCode::Locked
                ) =>
            {
                debug!(refname, code = ?e.code(), "compare-and-swap lost: {}", e.message());
                Ok(false)
            }
            Err(e) if e.class() == git2::ErrorClass::Reference => Err(GitError::InvalidRefName {
                message: format!("{}: {}", refname, e.message()),
            }),
            Err(e) => Err(GitError::from_git2(e, refname)),
        }
    }

    // =========================================================================
    // Blob Operations
    // =========================================================================

    /// Write content as a blob and return its OID.
    pub fn write_blob(&self, content: &[u8]) -> Result<Oid, GitError> {
        let oid = self
            .repo
            .lock()
            .blob(content)
            .map_err(|e| GitError::Internal {
                message: e.message().to_string(),
            })?;

        from_git2_oid(oid)
    }

    /// Read a blob by OID.
    ///
    /// # Errors
    ///
    /// - [`GitError::ObjectNotFound`] if the blob doesn't exist
    /// - [`GitError::UnexpectedObject`] if the object is not a blob
    pub fn read_blob(&self, oid: &Oid) -> Result<Vec<u8>, GitError> {
        let git_oid = to_git2(oid)?;
        let repo = self.repo.lock();

        let object = repo
            .find_object(git_oid, None)
            .map_err(|e| GitError::from_git2(e, oid.as_str()))?;
        let blob = object.as_blob().ok_or_else(|| GitError::UnexpectedObject {
            oid: oid.to_string(),
            expected: "blob",
        })?;

        Ok(blob.content().to_vec())
    }

    // =========================================================================
    // Tree Operations
    // =========================================================================

    /// List the blobs in the tree of `commit`, keyed by their full path
    /// with the `/` separators removed.
    ///
    /// A flat tree and a fan-out tree (`ab/cdef...`) of the same notes give
    /// the same listing.
    pub fn read_commit_blobs(&self, commit: &Oid) -> Result<Vec<(String, Oid)>, GitError> {
        let git_oid = to_git2(commit)?;
        let repo = self.repo.lock();

        let object = repo
            .find_object(git_oid, None)
            .map_err(|e| GitError::from_git2(e, commit.as_str()))?;
        let commit_obj = object
            .as_commit()
            .ok_or_else(|| GitError::UnexpectedObject {
                oid: commit.to_string(),
                expected: "commit",
            })?;
        let tree = commit_obj
            .tree()
            .map_err(|e| GitError::from_git2(e, commit.as_str()))?;

        let mut found = Vec::new();
        tree.walk(git2::TreeWalkMode::PreOrder, |root, entry| {
            if entry.kind() == Some(git2::ObjectType::Blob) {
                if let Some(name) = entry.name() {
                    let path: String = root
                        .chars()
                        .filter(|c| *c != '/')
                        .chain(name.chars())
                        .collect();
                    found.push((path, entry.id()));
                }
            }
            git2::TreeWalkResult::Ok
        })
        .map_err(|e| GitError::from_git2(e, commit.as_str()))?;

        found
            .into_iter()
            .map(|(path, id)| Ok((path, from_git2_oid(id)?)))
            .collect()
    }

    /// Write a flat tree of blobs and return its OID.
    pub fn write_flat_tree<'e>(
        &self,
        entries: impl IntoIterator<Item = (&'e str, &'e Oid)>,
    ) -> Result<Oid, GitError> {
        let repo = self.repo.lock();
        let mut builder = repo
            .treebuilder(None)
            .map_err(|e| GitError::from_git2(e, "treebuilder"))?;

        for (name, blob) in entries {
            builder
                .insert(name, to_git2(blob)?, NOTE_FILE_MODE)
                .map_err(|e| GitError::from_git2(e, name))?;
        }

        let oid = builder
            .write()
            .map_err(|e| GitError::from_git2(e, "tree"))?;
        from_git2_oid(oid)
    }

    // =========================================================================
    // Commit Operations
    // =========================================================================

    /// Create a commit of `tree` with an optional parent. No ref is moved.
    pub fn commit(&self, parent: Option<&Oid>, tree: &Oid, message: &str) -> Result<Oid, GitError> {
        let tree_id = to_git2(tree)?;
        let repo = self.repo.lock();

        let tree_obj = repo
            .find_tree(tree_id)
            .map_err(|e| GitError::from_git2(e, tree.as_str()))?;
        let parent_commit = match parent {
            Some(p) => Some(
                repo.find_commit(to_git2(p)?)
                    .map_err(|e| GitError::from_git2(e, p.as_str()))?,
            ),
            None => None,
        };
        let parents: Vec<&git2::Commit<'_>> = parent_commit.iter().collect();

        let signature = self.signature(&repo)?;
        let oid = repo
            .commit(None, &signature, &signature, message, &tree_obj, &parents)
            .map_err(|e| GitError::from_git2(e, "commit"))?;

        from_git2_oid(oid)
    }

    fn signature(&self, repo: &git2::Repository) -> Result<git2::Signature<'static>, GitError> {
        let fallback = repo.signature().ok();
        let name = self
            .identity
            .name
            .as_deref()
            .or_else(|| fallback.as_ref().and_then(|s| s.name()))
            .unwrap_or(DEFAULT_COMMITTER_NAME);
        let email = self
            .identity
            .email
            .as_deref()
            .or_else(|| fallback.as_ref().and_then(|s| s.email()))
            .unwrap_or(DEFAULT_COMMITTER_EMAIL);

        git2::Signature::now(name, email).map_err(|e| GitError::Internal {
            message: format!("invalid committer identity: {}", e.message()),
        })
    }

    /// Get information about a commit.
    pub fn commit_info(&self, oid: &Oid) -> Result<CommitInfo, GitError> {
        let git_oid = to_git2(oid)?;
        let repo = self.repo.lock();

        let commit = repo
            .find_commit(git_oid)
            .map_err(|e| GitError::from_git2(e, oid.as_str()))?;
        let committer = commit.committer();

        Ok(CommitInfo {
            oid: oid.clone(),
            summary: commit.summary().unwrap_or("").to_string(),
            message: commit.message().unwrap_or("").to_string(),
            committer_name: committer.name().unwrap_or("").to_string(),
            committer_email: committer.email().unwrap_or("").to_string(),
        })
    }

    /// Get the parent OIDs of a commit.
    ///
    /// Returns empty vec for root commits.
    pub fn commit_parents(&self, oid: &Oid) -> Result<Vec<Oid>, GitError> {
        let git_oid = to_git2(oid)?;
        let repo = self.repo.lock();

        let commit = repo
            .find_commit(git_oid)
            .map_err(|e| GitError::from_git2(e, oid.as_str()))?;

        commit.parent_ids().map(from_git2_oid).collect()
    }

    /// Point `refname` at an arbitrary object, bypassing any check.
    #[cfg(test)]
    pub(crate) fn force_ref(&self, refname: &str, target: &Oid) -> Result<(), GitError> {
        self.repo
            .lock()
            .reference(refname, to_git2(target)?, true, "test")
            .map(|_| ())
            .map_err(|e| GitError::from_git2(e, refname))
    }

    /// Run `f` against the raw repository.
    #[cfg(test)]
    pub(crate) fn with_repo<T>(&self, f: impl FnOnce(&git2::Repository) -> T) -> T {
        f(&self.repo.lock())
    }
}

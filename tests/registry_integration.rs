//! Integration tests for the registry on real repositories.
//!
//! These tests exercise GroupNameRegistry against git repositories created
//! with tempfile, and check what lands in the object database.

use std::collections::BTreeSet;

use tempfile::TempDir;

use groupnotes::core::notes::{derive_key, encode_record};
use groupnotes::core::registry::{GroupNameRegistry, RegistryError, TransactionOutcome};
use groupnotes::core::types::{GroupId, GroupName, GroupReference, RefName};
use groupnotes::git::{Git, Identity};
use groupnotes::store::{NoteMap, ObjectStore};

// =============================================================================
// Test Helpers
// =============================================================================

struct TestRepo {
    dir: TempDir,
    git: Git,
}

impl TestRepo {
    fn bare() -> Self {
        let dir = TempDir::new().expect("create temp dir");
        let git = Git::init(dir.path(), true)
            .expect("init repo")
            .with_identity(Identity {
                name: Some("Test User".into()),
                email: Some("test@example.com".into()),
            });
        Self { dir, git }
    }

    fn with_worktree() -> Self {
        let dir = TempDir::new().expect("create temp dir");
        let git = Git::init(dir.path(), false).expect("init repo");
        Self { dir, git }
    }

    fn registry(&self) -> GroupNameRegistry<'_, Git> {
        GroupNameRegistry::new(&self.git)
    }

    fn tip(&self) -> Option<groupnotes::core::types::Revision> {
        self.git.resolve_ref(&RefName::group_names()).unwrap()
    }

    /// Commit raw note bodies on top of the current tip, bypassing validation.
    fn commit_raw(&self, notes: &[(&str, &[u8])]) {
        let base = self.tip();
        let mut map = match &base {
            Some(rev) => self.git.read_note_map(rev).unwrap(),
            None => NoteMap::new(),
        };
        for (name, body) in notes {
            let blob = ObjectStore::write_blob(&self.git, body).unwrap();
            map.set(derive_key(&name_of(name)), blob);
        }
        let tree = self.git.write_note_tree(&map).unwrap();
        let rev = ObjectStore::commit(&self.git, base.as_ref(), &tree, "raw").unwrap();
        assert!(ObjectStore::compare_and_swap_ref(
            &self.git,
            &RefName::group_names(),
            base.as_ref(),
            &rev
        )
        .unwrap());
    }
}

fn name_of(s: &str) -> GroupName {
    GroupName::new(s).unwrap()
}

// =============================================================================
// Tests
// =============================================================================

#[test]
fn empty_registry_has_no_names() {
    let repo = TestRepo::bare();
    assert!(repo.tip().is_none());
    assert!(repo.registry().list_all().unwrap().is_empty());
}

#[test]
fn create_writes_one_commit_with_one_note() {
    let repo = TestRepo::bare();
    let id = GroupId::generate();
    let outcome = repo.registry().create_name(&id, &name_of("admins")).unwrap();

    let rev = outcome.revision().cloned().unwrap();
    assert_eq!(repo.tip(), Some(rev.clone()));
    assert!(repo.git.commit_parents(rev.oid()).unwrap().is_empty());

    let info = repo.git.commit_info(rev.oid()).unwrap();
    assert_eq!(info.summary, "Create group name 'admins'");
    assert_eq!(info.committer_email, "test@example.com");

    let listing = repo.git.read_commit_blobs(rev.oid()).unwrap();
    assert_eq!(listing.len(), 1);
    assert_eq!(listing[0].0, derive_key(&name_of("admins")).to_hex());
    let body = repo.git.read_blob(&listing[0].1).unwrap();
    assert_eq!(
        String::from_utf8(body).unwrap(),
        format!("[group]\n\tuuid = {}\n\tname = admins\n", id)
    );
}

#[test]
fn works_in_non_bare_repository() {
    let repo = TestRepo::with_worktree();
    let id = GroupId::generate();
    repo.registry().create_name(&id, &name_of("team")).unwrap();

    let reopened = Git::open(repo.dir.path()).unwrap();
    let registry = GroupNameRegistry::new(&reopened);
    assert_eq!(registry.lookup(&name_of("team")).unwrap().unwrap().id, id);
}

#[test]
fn rename_is_one_commit_parented_on_previous() {
    let repo = TestRepo::bare();
    let registry = repo.registry();
    let id = GroupId::generate();

    let first = registry.create_name(&id, &name_of("alpha")).unwrap();
    let second = registry
        .rename_name(&id, &name_of("alpha"), &name_of("beta"))
        .unwrap();

    let rev = second.revision().unwrap();
    assert_eq!(
        repo.git.commit_parents(rev.oid()).unwrap(),
        vec![first.revision().unwrap().oid().clone()]
    );
    assert_eq!(
        repo.git.commit_info(rev.oid()).unwrap().summary,
        "Rename group name 'alpha' to 'beta'"
    );

    let all = registry.list_all().unwrap();
    assert_eq!(
        all,
        BTreeSet::from([GroupReference::new(id, name_of("beta"))])
    );
}

#[test]
fn conflicting_create_changes_nothing() {
    let repo = TestRepo::bare();
    let registry = repo.registry();
    registry
        .create_name(&GroupId::generate(), &name_of("taken"))
        .unwrap();
    let tip = repo.tip();

    let err = registry
        .create_name(&GroupId::generate(), &name_of("taken"))
        .unwrap_err();
    assert!(matches!(err, RegistryError::DuplicateName { .. }));
    assert_eq!(repo.tip(), tip);
}

#[test]
fn stale_old_name_rejected() {
    let repo = TestRepo::bare();
    let registry = repo.registry();
    let a = GroupId::generate();
    let b = GroupId::generate();
    registry.create_name(&a, &name_of("x")).unwrap();

    let err = registry
        .rename_name(&b, &name_of("x"), &name_of("y"))
        .unwrap_err();
    assert!(matches!(err, RegistryError::ConfigInvalid { .. }));
    assert_eq!(registry.lookup(&name_of("x")).unwrap().unwrap().id, a);
}

#[test]
fn noop_rename_keeps_tip() {
    let repo = TestRepo::bare();
    let registry = repo.registry();
    let id = GroupId::generate();
    registry.create_name(&id, &name_of("same")).unwrap();
    let tip = repo.tip();

    let outcome = registry
        .rename_name(&id, &name_of("same"), &name_of("same"))
        .unwrap();
    assert_eq!(outcome, TransactionOutcome::Unchanged);
    assert_eq!(repo.tip(), tip);
}

#[test]
fn delete_commit_message_and_effect() {
    let repo = TestRepo::bare();
    let registry = repo.registry();
    let id = GroupId::generate();
    registry.create_name(&id, &name_of("gone")).unwrap();
    let outcome = registry.delete_name(&id, &name_of("gone")).unwrap();

    let rev = outcome.revision().unwrap();
    assert_eq!(
        repo.git.commit_info(rev.oid()).unwrap().summary,
        "Delete group name 'gone'"
    );
    assert!(registry.list_all().unwrap().is_empty());
}

#[test]
fn corrupt_note_fails_listing_and_rename() {
    let repo = TestRepo::bare();
    let registry = repo.registry();
    let good = GroupReference::new(GroupId::generate(), name_of("good"));
    repo.commit_raw(&[
        ("good", &encode_record(&good)[..]),
        ("broken", &b"[group]\n\tname = broken\n"[..]),
    ]);

    assert!(matches!(
        registry.list_all(),
        Err(RegistryError::HardRead { .. })
    ));
    assert!(matches!(
        registry.rename_name(&GroupId::generate(), &name_of("broken"), &name_of("fixed")),
        Err(RegistryError::ConfigInvalid { .. })
    ));

    // point reads of healthy notes still work
    assert_eq!(registry.lookup(&good.name).unwrap(), Some(good));
}

#[test]
fn custom_ref() {
    let repo = TestRepo::bare();
    let refname = RefName::new("refs/meta/team-names").unwrap();
    let registry = GroupNameRegistry::with_ref(&repo.git, refname.clone());
    registry
        .create_name(&GroupId::generate(), &name_of("ops"))
        .unwrap();

    assert!(repo.tip().is_none());
    assert!(repo.git.resolve_ref(&refname).unwrap().is_some());
}

#[test]
fn names_with_special_characters_roundtrip() {
    let repo = TestRepo::bare();
    let registry = repo.registry();
    let names = [
        " padded ",
        "has # hash",
        "semi;colon",
        "quote \" and \\ slash",
        "ünïcödé",
    ];

    let mut expected = BTreeSet::new();
    for name in names {
        let id = GroupId::generate();
        registry.create_name(&id, &name_of(name)).unwrap();
        expected.insert(GroupReference::new(id, name_of(name)));
    }

    assert_eq!(registry.list_all().unwrap(), expected);
}

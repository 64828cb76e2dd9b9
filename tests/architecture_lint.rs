//! Architecture enforcement tests.
//!
//! The crate is layered: `core` holds the registry logic over the
//! `ObjectStore` trait, `git` is the only place that talks to libgit2,
//! and `cli` drives the registry without touching storage directly.
//! These tests scan the source tree so violations are caught in CI.
//!
//! # Test Categories
//!
//! 1. **Backend Isolation** - Only `src/git/` may use `git2`
//! 2. **Layer Direction** - `core` and `store` must not depend on `cli`, `ui` or `git`
//! 3. **Write Path** - Commands must go through the registry to write

use std::fs;
use std::path::{Path, PathBuf};

/// Store calls that only the registry transaction may make.
const WRITE_PRIMITIVES: &[&str] = &[
    "compare_and_swap_ref",
    "write_note_tree",
    "open_with_notes",
    ".write_blob(",
];

/// Collect every `.rs` file under `dir`.
fn rust_files(dir: &Path) -> Vec<PathBuf> {
    let mut files = Vec::new();
    let mut pending = vec![dir.to_path_buf()];
    while let Some(dir) = pending.pop() {
        for entry in fs::read_dir(&dir).unwrap_or_else(|_| panic!("Failed to read {:?}", dir)) {
            let path = entry.expect("Failed to read entry").path();
            if path.is_dir() {
                pending.push(path);
            } else if path.extension().map(|e| e == "rs").unwrap_or(false) {
                files.push(path);
            }
        }
    }
    files.sort();
    files
}

/// Lines of `path` outside its `#[cfg(test)]` module.
fn non_test_source(path: &Path) -> String {
    let content =
        fs::read_to_string(path).unwrap_or_else(|_| panic!("Failed to read {:?}", path));
    match content.find("#[cfg(test)]") {
        Some(pos) => content[..pos].to_string(),
        None => content,
    }
}

fn report(violations: &[String], rule: &str) {
    if !violations.is_empty() {
        panic!(
            "\n\n{} violation(s) of rule: {}\n\n{}\n",
            violations.len(),
            rule,
            violations.join("\n")
        );
    }
}

// =============================================================================
// Backend Isolation
// =============================================================================

/// Verify that `git2` is used only by the git backend.
#[test]
fn only_git_module_uses_git2() {
    let git_dir = Path::new("src/git");
    let mut violations = Vec::new();

    for path in rust_files(Path::new("src")) {
        if path.starts_with(git_dir) {
            continue;
        }
        let content = fs::read_to_string(&path).expect("Failed to read source");
        if content.contains("git2::") || content.contains("use git2") {
            violations.push(format!("{}: uses git2 outside src/git", path.display()));
        }
    }

    report(&violations, "git2 is confined to src/git");
}

/// The git backend must actually be the one using it.
#[test]
fn git_module_uses_git2() {
    let content = fs::read_to_string("src/git/interface.rs").expect("Failed to read interface.rs");
    assert!(content.contains("git2::"));
}

// =============================================================================
// Layer Direction
// =============================================================================

/// Verify that the library core does not depend on the presentation layers.
#[test]
fn core_does_not_depend_on_cli_or_ui() {
    let mut violations = Vec::new();

    for dir in ["src/core", "src/store"] {
        for path in rust_files(Path::new(dir)) {
            let content = non_test_source(&path);
            for forbidden in ["use crate::cli", "use crate::ui", "use crate::git"] {
                if content.contains(forbidden) {
                    violations.push(format!("{}: references {}", path.display(), forbidden));
                }
            }
        }
    }

    report(&violations, "core and store are independent of cli, ui and git");
}

// =============================================================================
// Write Path
// =============================================================================

/// Verify that command handlers never write to the store directly.
///
/// All writes go through a registry transaction, which validates the
/// change and performs the compare-and-swap.
#[test]
fn commands_do_not_write_to_store() {
    let mut violations = Vec::new();

    for path in rust_files(Path::new("src/cli")) {
        let content = non_test_source(&path);
        for primitive in WRITE_PRIMITIVES {
            if content.contains(primitive) {
                violations.push(format!("{}: calls {}", path.display(), primitive));
            }
        }
    }

    report(&violations, "commands write only through the registry");
}

//! groupnotes - Globally unique group names stored as notes on a git ref
//!
//! Every group has an immutable id and a name that can change. The
//! registry maps names to ids so no two groups ever share a name. It lives
//! on a git ref (`refs/meta/group-names` by default): each commit's tree
//! holds one note per name, keyed by the SHA-1 of the name.
//!
//! # Architecture
//!
//! The codebase follows a strict layered architecture:
//!
//! - [`cli`] - Command-line interface layer (parses args, calls the registry)
//! - [`core`] - Domain types, note storage, registry, configuration
//! - [`store`] - The object store contract, plus an in-memory store
//! - [`git`] - Single interface for all Git operations
//! - [`ui`] - User interaction utilities
//!
//! # Correctness Invariants
//!
//! 1. A name belongs to at most one group in any revision
//! 2. Every change is one commit, validated against its parent
//! 3. The ref only moves by compare-and-swap; a stale change is rejected
//! 4. A corrupt note is reported, never skipped or repaired

pub mod cli;
pub mod core;
pub mod git;
pub mod store;
pub mod ui;

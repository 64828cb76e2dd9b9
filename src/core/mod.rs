//! core
//!
//! Core domain types, note storage, and the registry.
//!
//! # Modules
//!
//! - [`types`] - Strong types: GroupId, GroupName, Oid, RefName, etc.
//! - [`notes`] - Note keys, record encoding, versioned notes on a ref
//! - [`registry`] - Group name registry (transactions and snapshots)
//! - [`config`] - Configuration schema and loading
//!
//! # Design Principles
//!
//! - Strong typing prevents invalid states at compile time
//! - Note bodies are strict and self-describing
//! - The ref's compare-and-swap is the only synchronization point

pub mod config;
pub mod notes;
pub mod registry;
pub mod types;

//! ui
//!
//! User interaction utilities.
//!
//! # Modules
//!
//! - [`output`] - Output formatting and display
//!
//! # Design
//!
//! Text meant for the user goes through this module; diagnostics go
//! through `tracing` and are filtered separately.

pub mod output;

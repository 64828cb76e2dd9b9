//! cli::commands
//!
//! Command dispatch and handlers.
//!
//! # Architecture
//!
//! Each command handler:
//! 1. Validates command-specific arguments into strong types
//! 2. Calls the registry
//! 3. Formats and displays output
//!
//! Mutating handlers rerun the whole transaction when it loses a race
//! on the ref, up to the configured `max_retries` more times. Every other
//! error is reported once.

mod completion;
mod config_cmd;
mod create;
mod delete;
mod list;
mod lookup;
mod rename;
mod suggest;

// Re-export command functions for testing and direct invocation
pub use completion::completion;
pub use config_cmd::{get as config_get, list as config_list, set as config_set};
pub use create::create;
pub use delete::delete;
pub use list::list;
pub use lookup::lookup;
pub use rename::rename;
pub use suggest::{matching, suggest};

use anyhow::{anyhow, Context as _, Result};
use tracing::warn;

use crate::cli::args::{Command, ConfigAction};
use crate::cli::Context;
use crate::core::registry::RegistryError;
use crate::core::types::{GroupId, GroupName};

/// Dispatch a command to its handler.
pub fn dispatch(command: Command, ctx: &Context) -> Result<()> {
    match command {
        Command::Create { name, id } => create::create(ctx, &name, id.as_deref()),
        Command::Rename { id, old, new } => rename::rename(ctx, &id, &old, &new),
        Command::Delete { id, name } => delete::delete(ctx, &id, &name),
        Command::Lookup { name } => lookup::lookup(ctx, &name),
        Command::List { json } => list::list(ctx, json),
        Command::Suggest { prefix, limit } => suggest::suggest(ctx, &prefix, limit),
        Command::Config { action } => match action {
            ConfigAction::Get { key } => config_cmd::get(ctx, &key),
            ConfigAction::Set { key, value } => config_cmd::set(ctx, &key, &value),
            ConfigAction::List => config_cmd::list(ctx),
        },
        Command::Completion { shell } => completion::completion(shell),
    }
}

/// Run `op` until it succeeds or fails permanently, rerunning it at most
/// `max_retries` times after a lost race.
pub(crate) fn with_retries<T>(
    max_retries: u32,
    mut op: impl FnMut() -> Result<T, RegistryError>,
) -> Result<T, RegistryError> {
    let mut retries = 0;
    loop {
        match op() {
            Err(e) if e.is_retryable() && retries < max_retries => {
                retries += 1;
                warn!(retry = retries, max_retries, "{}, retrying", e);
            }
            other => return other,
        }
    }
}

/// Turn a registry error into the message shown to the user.
pub(crate) fn explain(err: RegistryError) -> anyhow::Error {
    match err {
        RegistryError::DuplicateName { name } => anyhow!("name already in use: '{}'", name),
        err @ (RegistryError::ConfigInvalid { .. } | RegistryError::HardRead { .. }) => {
            anyhow!("internal error: {}", err)
        }
        err @ RegistryError::ConcurrentModification { .. } => {
            anyhow!("{}; gave up after repeated conflicts", err)
        }
        err @ RegistryError::Store(_) => anyhow!(err),
    }
}

pub(crate) fn parse_id(id: &str) -> Result<GroupId> {
    GroupId::new(id).with_context(|| format!("Invalid group id '{}'", id))
}

pub(crate) fn parse_name(name: &str) -> Result<GroupName> {
    GroupName::new(name).with_context(|| format!("Invalid group name '{}'", name))
}

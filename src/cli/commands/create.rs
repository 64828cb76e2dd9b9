//! create command - Register the first name of a new group

use super::{explain, parse_id, parse_name, with_retries};
use crate::cli::Context;
use crate::core::types::GroupId;
use crate::ui::output;
use anyhow::Result;

/// Register `name` for a new group.
///
/// # Arguments
///
/// * `ctx` - Execution context
/// * `name` - Name to register
/// * `id` - Group id to use; a new one is generated when `None`
///
/// The group id is printed on stdout even in quiet mode.
pub fn create(ctx: &Context, name: &str, id: Option<&str>) -> Result<()> {
    let name = parse_name(name)?;
    let id = match id {
        Some(id) => parse_id(id)?,
        None => GroupId::generate(),
    };

    let session = ctx.open()?;
    let registry = session.registry();
    let outcome = with_retries(session.config.max_retries(), || {
        registry.create_name(&id, &name)
    })
    .map_err(explain)?;

    output::data(&id)?;
    if let Some(rev) = outcome.revision() {
        output::note(
            format!("Created group name '{}' ({})", name, rev.oid().short(7)),
            ctx.verbosity(),
        );
    }
    Ok(())
}

//! delete command - Vacate a group's name

use super::{explain, parse_id, parse_name, with_retries};
use crate::cli::Context;
use crate::ui::output;
use anyhow::Result;

/// Remove `name`, which group `id` must own.
pub fn delete(ctx: &Context, id: &str, name: &str) -> Result<()> {
    let id = parse_id(id)?;
    let name = parse_name(name)?;

    let session = ctx.open()?;
    let registry = session.registry();
    with_retries(session.config.max_retries(), || {
        registry.delete_name(&id, &name)
    })
    .map_err(explain)?;

    output::note(format!("Deleted group name '{}'", name), ctx.verbosity());
    Ok(())
}

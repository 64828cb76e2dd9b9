//! lookup command - Print the group id owning a name

use super::{explain, parse_name};
use crate::cli::Context;
use crate::ui::output;
use anyhow::{bail, Result};

/// Print the id of the group holding `name`; fails if nobody does.
pub fn lookup(ctx: &Context, name: &str) -> Result<()> {
    let name = parse_name(name)?;
    let session = ctx.open()?;

    match session.registry().lookup(&name).map_err(explain)? {
        Some(group) => Ok(output::data(&group.id)?),
        None => bail!("group name '{}' not found", name),
    }
}

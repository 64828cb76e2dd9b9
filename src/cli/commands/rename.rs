//! rename command - Move a group to a new name

use super::{explain, parse_id, parse_name, with_retries};
use crate::cli::Context;
use crate::core::registry::TransactionOutcome;
use crate::ui::output;
use anyhow::Result;

/// Move group `id` from `old` to `new`.
pub fn rename(ctx: &Context, id: &str, old: &str, new: &str) -> Result<()> {
    let id = parse_id(id)?;
    let old = parse_name(old)?;
    let new = parse_name(new)?;

    let session = ctx.open()?;
    let registry = session.registry();
    let outcome = with_retries(session.config.max_retries(), || {
        registry.rename_name(&id, &old, &new)
    })
    .map_err(explain)?;

    match outcome {
        TransactionOutcome::Committed(_) => output::note(
            format!("Renamed '{}' to '{}'", old, new),
            ctx.verbosity(),
        ),
        TransactionOutcome::Unchanged => {
            output::note(format!("'{}' unchanged", old), ctx.verbosity())
        }
    }
    Ok(())
}

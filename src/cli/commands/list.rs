//! list command - List all registered names

use super::explain;
use crate::cli::Context;
use crate::core::types::GroupReference;
use crate::ui::output;
use anyhow::{Context as _, Result};

/// Print every `(id, name)` pair, sorted by name.
pub fn list(ctx: &Context, json: bool) -> Result<()> {
    let session = ctx.open()?;
    let all: Vec<GroupReference> = session
        .registry()
        .list_all()
        .map_err(explain)?
        .into_iter()
        .collect();

    if json {
        let text = serde_json::to_string_pretty(&all).context("Failed to serialize names")?;
        output::data(text)?;
    } else {
        output::lines(&all)?;
    }
    Ok(())
}

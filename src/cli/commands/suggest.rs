//! suggest command - Complete a name prefix

use std::collections::BTreeSet;

use crate::cli::Context;
use crate::core::types::GroupReference;
use crate::ui::output;
use anyhow::Result;
use tracing::warn;

/// Print up to `limit` names starting with `prefix`, ignoring case.
///
/// Suggestions are best effort: when the registry cannot be read the
/// failure is logged and nothing is printed.
pub fn suggest(ctx: &Context, prefix: &str, limit: usize) -> Result<()> {
    let session = ctx.open()?;
    let all = match session.registry().list_all() {
        Ok(all) => all,
        Err(e) => {
            warn!(refname = %session.refname, "cannot list group names: {}", e);
            BTreeSet::new()
        }
    };

    output::lines(matching(&all, prefix).take(limit).map(|group| &group.name))?;
    Ok(())
}

/// Groups whose name starts with `prefix`, ignoring case, in name order.
pub fn matching<'a>(
    all: &'a BTreeSet<GroupReference>,
    prefix: &'a str,
) -> impl Iterator<Item = &'a GroupReference> + 'a {
    all.iter()
        .filter(move |group| group.name.starts_with_ignore_case(prefix))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::{GroupId, GroupName};

    fn set(names: &[&str]) -> BTreeSet<GroupReference> {
        names
            .iter()
            .map(|n| GroupReference::new(GroupId::generate(), GroupName::new(*n).unwrap()))
            .collect()
    }

    #[test]
    fn case_insensitive_prefix() {
        let all = set(&["Admins", "admin-ops", "users", "ADMIRALS"]);
        let found: Vec<_> = matching(&all, "adm").map(|g| g.name.as_str()).collect();
        assert_eq!(found, vec!["ADMIRALS", "Admins", "admin-ops"]);
    }

    #[test]
    fn empty_prefix_matches_all() {
        let all = set(&["a", "b"]);
        assert_eq!(matching(&all, "").count(), 2);
    }
}

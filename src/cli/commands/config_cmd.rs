//! config command - Get, set, or list configuration values

use crate::cli::Context;
use crate::core::config::{Config, IdentityConfig};
use crate::git::Git;
use crate::ui::output;
use anyhow::{bail, Context as _, Result};

/// Keys understood by `config get` and `config set`.
pub const KEYS: &[&str] = &["ref_name", "max_retries", "identity.name", "identity.email"];

fn load(ctx: &Context) -> Result<(Git, Config)> {
    let git = Git::open(&ctx.cwd()?).context("Failed to open repository")?;
    let config = Config::load(Some(git.git_dir())).context("Failed to load config")?;
    Ok((git, config))
}

fn effective(config: &Config, key: &str) -> Result<Option<String>> {
    Ok(match key {
        "ref_name" => Some(config.ref_name()?.to_string()),
        "max_retries" => Some(config.max_retries().to_string()),
        "identity.name" => config.identity_name().map(str::to_string),
        "identity.email" => config.identity_email().map(str::to_string),
        _ => bail!(
            "Unknown configuration key: {} (expected one of: {})",
            key,
            KEYS.join(", ")
        ),
    })
}

/// Get a configuration value.
///
/// Prints nothing when the key is valid but unset.
pub fn get(ctx: &Context, key: &str) -> Result<()> {
    let (_, config) = load(ctx)?;
    if let Some(value) = effective(&config, key)? {
        output::data(value)?;
    }
    Ok(())
}

/// Set a configuration value in the repository config.
pub fn set(ctx: &Context, key: &str, value: &str) -> Result<()> {
    let (git, config) = load(ctx)?;
    let mut repo = config.repo.unwrap_or_default();

    match key {
        "ref_name" => repo.ref_name = Some(value.to_string()),
        "max_retries" => {
            let n = value
                .parse::<u32>()
                .with_context(|| format!("Invalid max_retries '{}'", value))?;
            repo.max_retries = Some(n);
        }
        "identity.name" => {
            repo.identity
                .get_or_insert_with(IdentityConfig::default)
                .name = Some(value.to_string())
        }
        "identity.email" => {
            repo.identity
                .get_or_insert_with(IdentityConfig::default)
                .email = Some(value.to_string())
        }
        _ => bail!(
            "Unknown configuration key: {} (expected one of: {})",
            key,
            KEYS.join(", ")
        ),
    }

    Config::write_repo(git.git_dir(), &repo).context("Failed to write config")?;
    output::note(format!("Set {} = {}", key, value), ctx.verbosity());
    Ok(())
}

/// List all configuration values.
pub fn list(ctx: &Context) -> Result<()> {
    let (_, config) = load(ctx)?;

    let mut entries = Vec::with_capacity(KEYS.len());
    for key in KEYS {
        let value = effective(&config, key)?.unwrap_or_else(|| "(not set)".to_string());
        entries.push(format!("{} = {}", key, value));
    }
    output::lines(&entries)?;

    if let Some(path) = config.global_config_loaded_from() {
        output::note(format!("# global: {}", path.display()), ctx.verbosity());
    }
    if let Some(path) = config.repo_config_loaded_from() {
        output::note(format!("# repo: {}", path.display()), ctx.verbosity());
    }
    Ok(())
}

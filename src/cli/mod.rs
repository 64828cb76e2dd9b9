//! cli
//!
//! Command-line interface layer for groupnotes.
//!
//! # Responsibilities
//!
//! - Parse command-line arguments and global flags
//! - Set up logging
//! - Open the repository and its configuration
//! - Delegate to command handlers
//!
//! # Architecture
//!
//! The CLI layer is thin. Every registry change goes through
//! [`crate::core::registry`]; the CLI only adds retries for writes that
//! lost a race and turns errors into user-facing messages.

pub mod args;
pub mod commands;

pub use args::{Cli, Shell};

use std::path::PathBuf;

use anyhow::{Context as _, Result};
use tracing_subscriber::EnvFilter;

use crate::core::config::Config;
use crate::core::registry::GroupNameRegistry;
use crate::core::types::RefName;
use crate::git::{Git, Identity};
use crate::ui::output::Verbosity;

/// Environment variable holding a `tracing` filter directive.
pub const LOG_ENV: &str = "GROUPNOTES_LOG";

/// Global flags shared by every command.
#[derive(Debug, Clone, Default)]
pub struct Context {
    /// Directory to run in (defaults to the process's current directory)
    pub cwd: Option<PathBuf>,
    /// Ref override from `--ref`
    pub ref_name: Option<String>,
    /// Debug output enabled
    pub debug: bool,
    /// Minimal output
    pub quiet: bool,
}

impl Context {
    pub fn verbosity(&self) -> Verbosity {
        Verbosity::from_flags(self.quiet, self.debug)
    }

    /// The directory commands run in.
    pub fn cwd(&self) -> Result<PathBuf> {
        match &self.cwd {
            Some(path) => Ok(path.clone()),
            None => std::env::current_dir().context("Failed to determine current directory"),
        }
    }

    /// Open the repository around [`Context::cwd`] with its configuration.
    pub fn open(&self) -> Result<Session> {
        let cwd = self.cwd()?;
        let git = Git::open(&cwd).context("Failed to open repository")?;
        let config = Config::load(Some(git.git_dir())).context("Failed to load config")?;

        let refname = match &self.ref_name {
            Some(name) => RefName::new(name.as_str()).context("Invalid --ref")?,
            None => config.ref_name()?,
        };

        let git = git.with_identity(Identity {
            name: config.identity_name().map(str::to_string),
            email: config.identity_email().map(str::to_string),
        });

        tracing::debug!(
            git_dir = %git.git_dir().display(),
            refname = %refname,
            "opened repository"
        );

        Ok(Session {
            git,
            config,
            refname,
        })
    }
}

/// An opened repository with its effective configuration.
#[derive(Debug)]
pub struct Session {
    pub git: Git,
    pub config: Config,
    pub refname: RefName,
}

impl Session {
    pub fn registry(&self) -> GroupNameRegistry<'_, Git> {
        GroupNameRegistry::with_ref(&self.git, self.refname.clone())
    }
}

/// Install the stderr log subscriber.
///
/// `GROUPNOTES_LOG` takes a filter directive (e.g. `groupnotes=trace`);
/// otherwise `--debug` selects `debug` and the default is `warn`.
pub fn init_logging(debug: bool) {
    let default = if debug { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(default));

    // A subscriber may already be installed (e.g. by an embedding test).
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

/// Run the CLI application.
///
/// This is the main entry point called from `main.rs`.
pub fn run() -> Result<()> {
    let cli = Cli::parse_args();
    init_logging(cli.debug);

    let ctx = Context {
        cwd: cli.cwd.clone(),
        ref_name: cli.ref_name.clone(),
        debug: cli.debug,
        quiet: cli.quiet,
    };

    commands::dispatch(cli.command, &ctx)
}

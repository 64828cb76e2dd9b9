//! cli::args
//!
//! Command-line argument definitions using clap derive.
//!
//! # Global Flags
//!
//! These flags are available on all commands:
//! - `--help` / `-h`: Show help
//! - `--version`: Show version
//! - `--cwd <path>`: Run as if in that directory
//! - `--ref <ref>`: Use another ref than the configured one
//! - `--debug`: Enable debug logging
//! - `--quiet` / `-q`: Minimal output

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// groupnotes - Globally unique group names stored on a git ref
#[derive(Parser, Debug)]
#[command(name = "groupnotes")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Run as if groupnotes was started in this directory
    #[arg(long, global = true)]
    pub cwd: Option<PathBuf>,

    /// Ref holding the registry (overrides config)
    #[arg(long = "ref", global = true, value_name = "REF")]
    pub ref_name: Option<String>,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    /// Minimal output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Parser::parse()
    }
}

/// Available commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Register the first name of a new group
    #[command(
        name = "create",
        long_about = "Register the first name of a new group.\n\n\
            A fresh group id is generated unless --id is given. The id is \
            printed on success. Fails if the name is already registered.",
        after_help = "\
EXAMPLES:
    groupnotes create admins
    groupnotes create admins --id 0123456789abcdef0123456789abcdef01234567"
    )]
    Create {
        /// Name to register
        name: String,

        /// Use this group id (40 hex characters) instead of a new one
        #[arg(long)]
        id: Option<String>,
    },

    /// Move a group to a new name
    #[command(
        name = "rename",
        long_about = "Move a group to a new name.\n\n\
            The old name must currently belong to the group and the new name \
            must be free. Renaming to the same name does nothing."
    )]
    Rename {
        /// Group id
        id: String,
        /// Current name
        old: String,
        /// New name
        new: String,
    },

    /// Vacate a group's name
    #[command(name = "delete")]
    Delete {
        /// Group id
        id: String,
        /// Name to vacate
        name: String,
    },

    /// Print the group id owning a name
    #[command(name = "lookup")]
    Lookup {
        /// Name to look up
        name: String,
    },

    /// List all registered names
    #[command(name = "list")]
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Suggest names starting with a prefix
    #[command(
        name = "suggest",
        long_about = "Suggest names starting with a prefix, ignoring case.\n\n\
            If the registry cannot be read, a warning is logged and no \
            suggestions are printed."
    )]
    Suggest {
        /// Name prefix
        prefix: String,

        /// Maximum number of suggestions
        #[arg(long, default_value_t = 10)]
        limit: usize,
    },

    /// Get, set, or list configuration values
    #[command(
        name = "config",
        long_about = "Get, set, or list configuration values.\n\n\
            Values are written to the repository config at \
            <git dir>/groupnotes/config.toml. Keys: ref_name, max_retries, \
            identity.name, identity.email."
    )]
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Generate shell completion scripts
    #[command(
        name = "completion",
        after_help = "\
EXAMPLES:
    # Bash
    groupnotes completion bash > ~/.local/share/bash-completion/completions/groupnotes

    # Zsh
    groupnotes completion zsh > ~/.zfunc/_groupnotes"
    )]
    Completion {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Config subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum ConfigAction {
    /// Get a configuration value
    Get {
        /// Configuration key
        key: String,
    },
    /// Set a configuration value
    Set {
        /// Configuration key
        key: String,
        /// Value to set
        value: String,
    },
    /// List all configuration values
    List,
}

/// Supported shells for completion
#[derive(clap::ValueEnum, Debug, Clone, Copy)]
#[allow(clippy::enum_variant_names)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    PowerShell,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "groupnotes",
            "list",
            "--ref",
            "refs/meta/other",
            "--quiet",
        ])
        .unwrap();
        assert_eq!(cli.ref_name.as_deref(), Some("refs/meta/other"));
        assert!(cli.quiet);
        assert!(matches!(cli.command, Command::List { json: false }));
    }

    #[test]
    fn suggest_default_limit() {
        let cli = Cli::try_parse_from(["groupnotes", "suggest", "ad"]).unwrap();
        match cli.command {
            Command::Suggest { prefix, limit } => {
                assert_eq!(prefix, "ad");
                assert_eq!(limit, 10);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn rename_requires_three_args() {
        assert!(Cli::try_parse_from(["groupnotes", "rename", "id", "old"]).is_err());
    }
}

//! core::config
//!
//! Configuration schema and loading.
//!
//! # Overview
//!
//! groupnotes has two configuration scopes:
//! - **Global**: User-level settings
//! - **Repo**: Repository-level overrides
//!
//! # Precedence
//!
//! Configuration values are resolved in this order (later overrides earlier):
//! 1. Default values
//! 2. Global config file
//! 3. Repo config file
//! 4. CLI flags (not handled here)
//!
//! # Global Config Locations
//!
//! Searched in order:
//! 1. `$GROUPNOTES_CONFIG` if set
//! 2. `$XDG_CONFIG_HOME/groupnotes/config.toml`
//! 3. `~/.groupnotes/config.toml` (canonical write location)
//!
//! # Repo Config Location
//!
//! `<git dir>/groupnotes/config.toml`. The git dir is `.git` for a work
//! tree and the repository itself when bare.
//!
//! # Example
//!
//! ```no_run
//! use groupnotes::core::config::Config;
//! use std::path::Path;
//!
//! let config = Config::load(Some(Path::new("/path/to/repo/.git"))).unwrap();
//!
//! println!("Ref: {}", config.ref_name().unwrap());
//! println!("Retries: {}", config.max_retries());
//! ```

pub mod schema;

pub use schema::{GlobalConfig, IdentityConfig, RepoConfig};

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::core::types::RefName;

/// Default number of reruns for a write that loses a race.
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// Errors from configuration operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file '{path}': {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config file '{path}': {message}")]
    ParseError { path: PathBuf, message: String },

    #[error("failed to write config file '{path}': {source}")]
    WriteError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid config value: {0}")]
    InvalidValue(String),

    #[error("home directory not found")]
    NoHomeDir,
}

/// Merged configuration from all sources.
///
/// Accessors apply precedence: repo config overrides global config.
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// Global configuration
    pub global: GlobalConfig,
    /// Repository configuration (if in a repo)
    pub repo: Option<RepoConfig>,
    /// Path to the global config file (if loaded)
    global_path: Option<PathBuf>,
    /// Path to the repo config file (if loaded)
    repo_path: Option<PathBuf>,
}

impl Config {
    /// Load configuration from default locations.
    ///
    /// If `git_dir` is provided, also loads the repo config under it.
    ///
    /// # Errors
    ///
    /// Returns an error if config files exist but cannot be parsed or fail
    /// validation. Missing config files are not an error.
    pub fn load(git_dir: Option<&Path>) -> Result<Config, ConfigError> {
        let (global, global_path) = Self::load_global()?;

        let (repo, repo_path) = match git_dir {
            Some(dir) => Self::load_repo(dir)?,
            None => (None, None),
        };

        global.validate()?;
        if let Some(ref r) = repo {
            r.validate()?;
        }

        Ok(Config {
            global,
            repo,
            global_path,
            repo_path,
        })
    }

    fn load_global() -> Result<(GlobalConfig, Option<PathBuf>), ConfigError> {
        // 1. Check $GROUPNOTES_CONFIG
        if let Ok(path) = std::env::var("GROUPNOTES_CONFIG") {
            let path = PathBuf::from(path);
            if path.exists() {
                let config = Self::read_config(&path)?;
                return Ok((config, Some(path)));
            }
        }

        // 2. Check $XDG_CONFIG_HOME/groupnotes/config.toml
        if let Ok(xdg_home) = std::env::var("XDG_CONFIG_HOME") {
            let path = PathBuf::from(xdg_home).join("groupnotes/config.toml");
            if path.exists() {
                let config = Self::read_config(&path)?;
                return Ok((config, Some(path)));
            }
        }

        // 3. Check ~/.groupnotes/config.toml
        if let Some(home) = dirs::home_dir() {
            let path = home.join(".groupnotes/config.toml");
            if path.exists() {
                let config = Self::read_config(&path)?;
                return Ok((config, Some(path)));
            }
        }

        Ok((GlobalConfig::default(), None))
    }

    fn load_repo(git_dir: &Path) -> Result<(Option<RepoConfig>, Option<PathBuf>), ConfigError> {
        let path = Self::repo_config_path(git_dir);
        if !path.exists() {
            return Ok((None, None));
        }
        let config = Self::read_config(&path)?;
        Ok((Some(config), Some(path)))
    }

    fn read_config<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            source: e,
        })?;

        toml::from_str(&contents).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// Get the canonical path for global config.
    ///
    /// Returns `~/.groupnotes/config.toml`.
    pub fn global_config_path() -> Result<PathBuf, ConfigError> {
        let home = dirs::home_dir().ok_or(ConfigError::NoHomeDir)?;
        Ok(home.join(".groupnotes/config.toml"))
    }

    /// Get the path for repo config under `git_dir`.
    pub fn repo_config_path(git_dir: &Path) -> PathBuf {
        git_dir.join("groupnotes/config.toml")
    }

    /// Write repo config atomically.
    ///
    /// Creates parent directories if needed. The config is validated
    /// before anything is written.
    pub fn write_repo(git_dir: &Path, config: &RepoConfig) -> Result<PathBuf, ConfigError> {
        config.validate()?;
        let path = Self::repo_config_path(git_dir);
        Self::write_config_atomic(&path, config)?;
        Ok(path)
    }

    /// Write a config file atomically.
    fn write_config_atomic<T: serde::Serialize>(
        path: &Path,
        config: &T,
    ) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| ConfigError::WriteError {
                path: path.to_path_buf(),
                source: e,
            })?;
        }

        let contents =
            toml::to_string_pretty(config).map_err(|e| ConfigError::InvalidValue(e.to_string()))?;

        // Write to temp file in same directory (for atomic rename)
        let temp_path = path.with_extension("toml.tmp");
        let mut file = fs::File::create(&temp_path).map_err(|e| ConfigError::WriteError {
            path: temp_path.clone(),
            source: e,
        })?;

        file.write_all(contents.as_bytes())
            .map_err(|e| ConfigError::WriteError {
                path: temp_path.clone(),
                source: e,
            })?;

        file.sync_all().map_err(|e| ConfigError::WriteError {
            path: temp_path.clone(),
            source: e,
        })?;

        fs::rename(&temp_path, path).map_err(|e| ConfigError::WriteError {
            path: path.to_path_buf(),
            source: e,
        })?;

        Ok(())
    }

    // =========================================================================
    // Accessor methods with precedence
    // =========================================================================

    /// Get the ref holding the registry.
    ///
    /// Defaults to `refs/meta/group-names`. Values are validated on load,
    /// so this only fails for a config built by hand.
    pub fn ref_name(&self) -> Result<RefName, ConfigError> {
        match self.repo.as_ref().and_then(|r| r.ref_name.as_deref()) {
            Some(name) => RefName::new(name)
                .map_err(|e| ConfigError::InvalidValue(format!("invalid ref_name: {}", e))),
            None => Ok(RefName::group_names()),
        }
    }

    /// Get how many times a mutating command reruns after a lost race.
    ///
    /// Defaults to 3 if not configured.
    pub fn max_retries(&self) -> u32 {
        self.repo
            .as_ref()
            .and_then(|r| r.max_retries)
            .or(self.global.max_retries)
            .unwrap_or(DEFAULT_MAX_RETRIES)
    }

    /// Get the configured committer name, if any.
    pub fn identity_name(&self) -> Option<&str> {
        self.identity_field(|i| i.name.as_deref())
    }

    /// Get the configured committer email, if any.
    pub fn identity_email(&self) -> Option<&str> {
        self.identity_field(|i| i.email.as_deref())
    }

    fn identity_field<'s>(
        &'s self,
        field: impl Fn(&'s IdentityConfig) -> Option<&'s str>,
    ) -> Option<&'s str> {
        self.repo
            .as_ref()
            .and_then(|r| r.identity.as_ref())
            .and_then(&field)
            .or_else(|| self.global.identity.as_ref().and_then(&field))
    }

    /// Get the path to the loaded global config file.
    pub fn global_config_loaded_from(&self) -> Option<&Path> {
        self.global_path.as_deref()
    }

    /// Get the path to the loaded repo config file.
    pub fn repo_config_loaded_from(&self) -> Option<&Path> {
        self.repo_path.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn repo_config_loaded_from_git_dir() {
        let temp = TempDir::new().unwrap();
        let dir = temp.path().join("groupnotes");
        fs::create_dir_all(&dir).unwrap();
        fs::write(
            dir.join("config.toml"),
            r#"
            ref_name = "refs/meta/team-names"
            max_retries = 5
            "#,
        )
        .unwrap();

        let config = Config::load(Some(temp.path())).unwrap();
        assert_eq!(config.ref_name().unwrap().as_str(), "refs/meta/team-names");
        assert_eq!(config.max_retries(), 5);
        assert_eq!(
            config.repo_config_loaded_from(),
            Some(dir.join("config.toml").as_path())
        );
    }

    #[test]
    fn missing_repo_config_is_fine() {
        let temp = TempDir::new().unwrap();
        let config = Config::load(Some(temp.path())).unwrap();
        assert!(config.repo.is_none());
        assert!(config.repo_config_loaded_from().is_none());
    }

    #[test]
    fn invalid_ref_rejected() {
        let temp = TempDir::new().unwrap();
        let dir = temp.path().join("groupnotes");
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("config.toml"), "ref_name = \"heads/main\"").unwrap();

        assert!(matches!(
            Config::load(Some(temp.path())),
            Err(ConfigError::InvalidValue(_))
        ));
    }

    #[test]
    fn unknown_fields_rejected() {
        let temp = TempDir::new().unwrap();
        let dir = temp.path().join("groupnotes");
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("config.toml"), "retries = 3").unwrap();

        assert!(matches!(
            Config::load(Some(temp.path())),
            Err(ConfigError::ParseError { .. })
        ));
    }

    #[test]
    fn write_repo_config_atomic() {
        let temp = TempDir::new().unwrap();
        let config = RepoConfig {
            max_retries: Some(9),
            ..Default::default()
        };

        let path = Config::write_repo(temp.path(), &config).unwrap();
        assert!(path.exists());
        assert!(!path.with_extension("toml.tmp").exists());

        let loaded = Config::load(Some(temp.path())).unwrap();
        assert_eq!(loaded.max_retries(), 9);
    }

    #[test]
    fn write_rejects_invalid_config() {
        let temp = TempDir::new().unwrap();
        let config = RepoConfig {
            max_retries: Some(schema::MAX_RETRIES_LIMIT + 1),
            ..Default::default()
        };
        assert!(Config::write_repo(temp.path(), &config).is_err());
        assert!(!Config::repo_config_path(temp.path()).exists());
    }

    #[test]
    fn defaults_without_files() {
        let config = Config::default();
        assert_eq!(config.ref_name().unwrap(), RefName::group_names());
        assert_eq!(config.max_retries(), DEFAULT_MAX_RETRIES);
        assert!(config.identity_email().is_none());
    }

    #[test]
    fn precedence_repo_overrides_global() {
        let config = Config {
            global: GlobalConfig {
                max_retries: Some(2),
                identity: Some(IdentityConfig {
                    name: Some("Global".to_string()),
                    email: Some("global@example.com".to_string()),
                }),
            },
            repo: Some(RepoConfig {
                max_retries: Some(8),
                identity: Some(IdentityConfig {
                    name: None,
                    email: Some("repo@example.com".to_string()),
                }),
                ..Default::default()
            }),
            global_path: None,
            repo_path: None,
        };

        assert_eq!(config.max_retries(), 8);
        assert_eq!(config.identity_email(), Some("repo@example.com"));
        // fields missing from the repo identity fall back per field
        assert_eq!(config.identity_name(), Some("Global"));
    }
}

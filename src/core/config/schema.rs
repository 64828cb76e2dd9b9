//! core::config::schema
//!
//! Configuration schema types.
//!
//! # Global Config
//!
//! Located at (in order of precedence):
//! 1. `$GROUPNOTES_CONFIG` if set
//! 2. `$XDG_CONFIG_HOME/groupnotes/config.toml`
//! 3. `~/.groupnotes/config.toml` (canonical write location)
//!
//! # Repo Config
//!
//! Located at `<git dir>/groupnotes/config.toml`.
//!
//! # Validation
//!
//! Config values are validated after parsing to ensure they conform to
//! expected formats (e.g., the ref must be a valid ref under `refs/`).

use serde::{Deserialize, Serialize};

use super::ConfigError;
use crate::core::types::RefName;

/// Upper bound on `max_retries`.
pub const MAX_RETRIES_LIMIT: u32 = 100;

/// Global configuration (user scope).
///
/// # Example
///
/// ```toml
/// max_retries = 3
///
/// [identity]
/// name = "Registry Bot"
/// email = "registry@example.com"
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct GlobalConfig {
    /// Reruns of a write that loses a concurrent race
    pub max_retries: Option<u32>,

    /// Committer identity for registry commits
    pub identity: Option<IdentityConfig>,
}

impl GlobalConfig {
    /// Validate the configuration values.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if any value is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_retries(self.max_retries)?;
        if let Some(identity) = &self.identity {
            identity.validate()?;
        }
        Ok(())
    }
}

/// Repository configuration.
///
/// # Example
///
/// ```toml
/// ref_name = "refs/meta/group-names"
/// max_retries = 5
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct RepoConfig {
    /// Ref holding the registry (default: "refs/meta/group-names")
    pub ref_name: Option<String>,

    /// Reruns of a write that loses a concurrent race
    pub max_retries: Option<u32>,

    /// Committer identity for registry commits
    pub identity: Option<IdentityConfig>,
}

impl RepoConfig {
    /// Validate the configuration values.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if any value is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(ref_name) = &self.ref_name {
            RefName::new(ref_name.as_str())
                .map_err(|e| ConfigError::InvalidValue(format!("invalid ref_name: {}", e)))?;
        }

        validate_retries(self.max_retries)?;

        if let Some(identity) = &self.identity {
            identity.validate()?;
        }

        Ok(())
    }
}

/// Committer identity.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct IdentityConfig {
    pub name: Option<String>,
    pub email: Option<String>,
}

impl IdentityConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(name) = &self.name {
            if name.trim().is_empty() {
                return Err(ConfigError::InvalidValue(
                    "identity.name cannot be empty".to_string(),
                ));
            }
        }
        if let Some(email) = &self.email {
            if email.trim().is_empty() {
                return Err(ConfigError::InvalidValue(
                    "identity.email cannot be empty".to_string(),
                ));
            }
        }
        Ok(())
    }
}

fn validate_retries(max_retries: Option<u32>) -> Result<(), ConfigError> {
    match max_retries {
        Some(n) if n > MAX_RETRIES_LIMIT => Err(ConfigError::InvalidValue(format!(
            "max_retries must be at most {}, got {}",
            MAX_RETRIES_LIMIT, n
        ))),
        _ => Ok(()),
    }
}

//! core::types
//!
//! Strong types for core domain concepts.
//!
//! # Types
//!
//! - [`GroupId`] - Immutable 40-hex group identifier
//! - [`GroupName`] - Validated human-readable group name
//! - [`GroupReference`] - An `(id, name)` pair as stored in a note
//! - [`Oid`] - Object identifier in the backing store
//! - [`Revision`] - Commit that produced one snapshot of the name map
//! - [`RefName`] - Validated reference name
//!
//! # Validation
//!
//! These types enforce validity at construction time. Invalid values
//! cannot be represented, preventing entire classes of bugs.
//!
//! # Examples
//!
//! ```
//! use groupnotes::core::types::{GroupId, GroupName, RefName};
//!
//! let id = GroupId::new("ABC123DEF4567890ABC123DEF4567890ABC12345").unwrap();
//! assert_eq!(id.as_str(), "abc123def4567890abc123def4567890abc12345");
//!
//! let name = GroupName::new("Administrators").unwrap();
//! assert_eq!(name.as_str(), "Administrators");
//!
//! assert!(GroupName::new("").is_err());
//! assert!(RefName::new("refs/meta/group-names").is_ok());
//! ```

use serde::{Deserialize, Serialize};
use sha1::{Digest, Sha1};
use thiserror::Error;

/// Errors from type validation.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("invalid group id: {0}")]
    InvalidGroupId(String),

    #[error("invalid group name: {0}")]
    InvalidGroupName(String),

    #[error("invalid object id: {0}")]
    InvalidOid(String),

    #[error("invalid ref name: {0}")]
    InvalidRefName(String),
}

/// An immutable, globally unique group identifier.
///
/// Identifiers are 40 hexadecimal characters, normalized to lowercase.
/// They are assigned once when a group is created and never reused.
///
/// # Example
///
/// ```
/// use groupnotes::core::types::GroupId;
///
/// let id = GroupId::new("0123456789abcdef0123456789abcdef01234567").unwrap();
/// assert_eq!(id.short(8), "01234567");
///
/// assert!(GroupId::new("not-hex").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct GroupId(String);

impl GroupId {
    /// Length of a group id in hex characters.
    pub const LEN: usize = 40;

    /// Create a new validated group id.
    ///
    /// # Errors
    ///
    /// Returns `TypeError::InvalidGroupId` unless the input is exactly
    /// 40 hex characters.
    pub fn new(id: impl Into<String>) -> Result<Self, TypeError> {
        let id = id.into().to_ascii_lowercase();
        if id.len() != Self::LEN {
            return Err(TypeError::InvalidGroupId(format!(
                "expected {} hex characters, got {}",
                Self::LEN,
                id.len()
            )));
        }
        if !id.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(TypeError::InvalidGroupId(
                "group id must be hexadecimal".into(),
            ));
        }
        Ok(Self(id))
    }

    /// Mint a fresh identifier.
    ///
    /// The id is the SHA-1 of a random v4 UUID, so it has the same shape
    /// as identifiers assigned by other tools writing the same registry.
    pub fn generate() -> Self {
        let seed = uuid::Uuid::new_v4();
        let digest = Sha1::digest(seed.as_bytes());
        Self(hex::encode(digest))
    }

    /// Get an abbreviated form of the id.
    pub fn short(&self, len: usize) -> &str {
        let end = len.min(self.0.len());
        &self.0[..end]
    }

    /// Get the id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for GroupId {
    type Error = TypeError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl From<GroupId> for String {
    fn from(id: GroupId) -> Self {
        id.0
    }
}

impl AsRef<str> for GroupId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for GroupId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A validated group name.
///
/// Names are compared byte-wise (case-sensitive). A name must be
/// non-empty and must not contain ASCII control characters.
///
/// # Example
///
/// ```
/// use groupnotes::core::types::GroupName;
///
/// assert!(GroupName::new("Project Owners").is_ok());
/// assert!(GroupName::new("ldap/team #1; core").is_ok());
///
/// assert!(GroupName::new("").is_err());
/// assert!(GroupName::new("line\nbreak").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct GroupName(String);

impl GroupName {
    /// Create a new validated group name.
    ///
    /// # Errors
    ///
    /// Returns `TypeError::InvalidGroupName` if the name is empty or
    /// contains control characters.
    pub fn new(name: impl Into<String>) -> Result<Self, TypeError> {
        let name = name.into();
        if name.is_empty() {
            return Err(TypeError::InvalidGroupName(
                "group name cannot be empty".into(),
            ));
        }
        if name.chars().any(|c| c.is_control()) {
            return Err(TypeError::InvalidGroupName(
                "group name cannot contain control characters".into(),
            ));
        }
        Ok(Self(name))
    }

    /// Case-insensitive prefix match.
    ///
    /// # Example
    ///
    /// ```
    /// use groupnotes::core::types::GroupName;
    ///
    /// let name = GroupName::new("Administrators").unwrap();
    /// assert!(name.starts_with_ignore_case("admin"));
    /// assert!(!name.starts_with_ignore_case("users"));
    /// ```
    pub fn starts_with_ignore_case(&self, prefix: &str) -> bool {
        let mut name = self.0.chars().flat_map(char::to_lowercase);
        prefix
            .chars()
            .flat_map(char::to_lowercase)
            .all(|p| name.next() == Some(p))
    }

    /// Get the name as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for GroupName {
    type Error = TypeError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl From<GroupName> for String {
    fn from(name: GroupName) -> Self {
        name.0
    }
}

impl AsRef<str> for GroupName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for GroupName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A group's identifier together with its current name.
///
/// This is exactly the content of one note in the registry.
/// Ordering is by name first, which is the order listings use.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct GroupReference {
    pub name: GroupName,
    pub id: GroupId,
}

impl GroupReference {
    pub fn new(id: GroupId, name: GroupName) -> Self {
        Self { name, id }
    }
}

impl std::fmt::Display for GroupReference {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.id, self.name)
    }
}

/// An object identifier in the backing store (SHA-1 or SHA-256).
///
/// OIDs are normalized to lowercase for consistency.
///
/// # Example
///
/// ```
/// use groupnotes::core::types::Oid;
///
/// let oid = Oid::new("ABC123DEF4567890ABC123DEF4567890ABC12345").unwrap();
/// assert_eq!(oid.as_str(), "abc123def4567890abc123def4567890abc12345");
/// assert_eq!(oid.short(7), "abc123d");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Oid(String);

impl Oid {
    /// Create a new validated object id.
    ///
    /// # Errors
    ///
    /// Returns `TypeError::InvalidOid` if the string is not a valid hex OID.
    pub fn new(oid: impl Into<String>) -> Result<Self, TypeError> {
        let oid = oid.into().to_ascii_lowercase();
        // SHA-1 is 40 hex chars, SHA-256 is 64
        if oid.len() != 40 && oid.len() != 64 {
            return Err(TypeError::InvalidOid(format!(
                "expected 40 or 64 hex characters, got {}",
                oid.len()
            )));
        }
        if !oid.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(TypeError::InvalidOid(
                "object id must be hexadecimal".into(),
            ));
        }
        Ok(Self(oid))
    }

    /// Build an object id from a raw SHA-1 digest.
    pub fn from_sha1(digest: [u8; 20]) -> Self {
        Self(hex::encode(digest))
    }

    /// Get an abbreviated form of the OID.
    pub fn short(&self, len: usize) -> &str {
        let end = len.min(self.0.len());
        &self.0[..end]
    }

    /// Get the object id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for Oid {
    type Error = TypeError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl From<Oid> for String {
    fn from(oid: Oid) -> Self {
        oid.0
    }
}

impl AsRef<str> for Oid {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Oid {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One immutable snapshot of the name map, addressed by its commit.
///
/// `Option<Revision>` is used wherever the ref may not exist yet;
/// `None` means nothing has ever been registered.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Revision(Oid);

impl Revision {
    pub fn new(commit: Oid) -> Self {
        Self(commit)
    }

    /// The commit id backing this revision.
    pub fn oid(&self) -> &Oid {
        &self.0
    }
}

impl std::fmt::Display for Revision {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A validated reference name.
///
/// Reference names must conform to Git's refname rules (see
/// `git check-ref-format`) and live under `refs/`.
///
/// # Example
///
/// ```
/// use groupnotes::core::types::RefName;
///
/// let refname = RefName::group_names();
/// assert_eq!(refname.as_str(), "refs/meta/group-names");
///
/// assert!(RefName::new("refs/meta/has space").is_err());
/// assert!(RefName::new("HEAD").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RefName(String);

impl RefName {
    /// Default ref holding the group name notes.
    pub const GROUP_NAMES: &'static str = "refs/meta/group-names";

    /// Create a new validated ref name.
    ///
    /// # Errors
    ///
    /// Returns `TypeError::InvalidRefName` if the name violates Git's refname rules.
    pub fn new(name: impl Into<String>) -> Result<Self, TypeError> {
        let name = name.into();
        Self::validate(&name)?;
        Ok(Self(name))
    }

    /// The default group names ref (`refs/meta/group-names`).
    pub fn group_names() -> Self {
        Self(Self::GROUP_NAMES.to_string())
    }

    /// Validate a ref name against Git's refname rules.
    fn validate(name: &str) -> Result<(), TypeError> {
        if !name.starts_with("refs/") {
            return Err(TypeError::InvalidRefName(
                "ref name must start with 'refs/'".into(),
            ));
        }

        // Cannot end with "/" or ".lock"
        if name.ends_with('/') {
            return Err(TypeError::InvalidRefName(
                "ref name cannot end with '/'".into(),
            ));
        }
        if name.ends_with(".lock") {
            return Err(TypeError::InvalidRefName(
                "ref name cannot end with '.lock'".into(),
            ));
        }

        // Cannot contain "..", "@{", or "//"
        for bad in ["..", "@{", "//"] {
            if name.contains(bad) {
                return Err(TypeError::InvalidRefName(format!(
                    "ref name cannot contain '{bad}'"
                )));
            }
        }

        // Cannot contain certain special characters
        const INVALID_CHARS: [char; 8] = [' ', '~', '^', ':', '\\', '?', '*', '['];
        for c in INVALID_CHARS {
            if name.contains(c) {
                return Err(TypeError::InvalidRefName(format!(
                    "ref name cannot contain '{c}'"
                )));
            }
        }

        if name.chars().any(|c| c.is_ascii_control()) {
            return Err(TypeError::InvalidRefName(
                "ref name cannot contain control characters".into(),
            ));
        }

        for component in name.split('/') {
            if component.starts_with('.') {
                return Err(TypeError::InvalidRefName(
                    "path component cannot start with '.'".into(),
                ));
            }
            if component.ends_with(".lock") {
                return Err(TypeError::InvalidRefName(
                    "path component cannot end with '.lock'".into(),
                ));
            }
        }

        Ok(())
    }

    /// Get the ref name as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for RefName {
    fn default() -> Self {
        Self::group_names()
    }
}

impl TryFrom<String> for RefName {
    type Error = TypeError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl From<RefName> for String {
    fn from(name: RefName) -> Self {
        name.0
    }
}

impl AsRef<str> for RefName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for RefName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

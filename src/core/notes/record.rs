//! core::notes::record
//!
//! Encoding of the note stored under each name's key.
//!
//! # Format
//!
//! A note body is a git-config block with exactly two required fields:
//!
//! ```text
//! [group]
//! 	uuid = 0123456789abcdef0123456789abcdef01234567
//! 	name = Administrators
//! ```
//!
//! Decoding is strict: both fields must be present and must be a valid
//! [`GroupId`] and [`GroupName`]. Other sections and keys are ignored.
//!
//! # Example
//!
//! ```
//! use groupnotes::core::notes::record::{decode_record, encode_record};
//! use groupnotes::core::types::{GroupId, GroupName, GroupReference};
//!
//! let group = GroupReference::new(
//!     GroupId::new("0123456789abcdef0123456789abcdef01234567").unwrap(),
//!     GroupName::new("Administrators").unwrap(),
//! );
//! let bytes = encode_record(&group);
//! assert_eq!(decode_record(&bytes).unwrap(), group);
//! ```

use thiserror::Error;

use super::config_text::ConfigText;
use crate::core::types::{GroupId, GroupName, GroupReference};

const SECTION: &str = "group";
const UUID_KEY: &str = "uuid";
const NAME_KEY: &str = "name";

/// Errors from decoding a note body.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DecodeError {
    /// A required field is absent.
    #[error("note record is missing required field '{field}'")]
    MissingField {
        /// The config key that was missing, e.g. `group.uuid`
        field: &'static str,
    },

    /// The note body cannot be parsed or holds invalid values.
    #[error("malformed note record: {message}")]
    Malformed {
        /// Description of the problem
        message: String,
    },
}

/// Encode a group reference as a note body.
pub fn encode_record(group: &GroupReference) -> Vec<u8> {
    let mut text = ConfigText::new();
    text.set(SECTION, UUID_KEY, group.id.as_str());
    text.set(SECTION, NAME_KEY, group.name.as_str());
    text.to_text().into_bytes()
}

/// Decode a note body.
///
/// # Errors
///
/// - [`DecodeError::Malformed`] if the bytes are not UTF-8 git-config text,
///   or a field value is not a valid id or name
/// - [`DecodeError::MissingField`] if `group.uuid` or `group.name` is absent
pub fn decode_record(bytes: &[u8]) -> Result<GroupReference, DecodeError> {
    let text = std::str::from_utf8(bytes).map_err(|e| DecodeError::Malformed {
        message: format!("not UTF-8: {}", e),
    })?;
    let config = ConfigText::parse(text).map_err(|e| DecodeError::Malformed {
        message: e.to_string(),
    })?;

    let uuid = config
        .get(SECTION, UUID_KEY)
        .ok_or(DecodeError::MissingField {
            field: "group.uuid",
        })?;
    let name = config
        .get(SECTION, NAME_KEY)
        .ok_or(DecodeError::MissingField {
            field: "group.name",
        })?;

    let id = GroupId::new(uuid).map_err(|e| DecodeError::Malformed {
        message: e.to_string(),
    })?;
    let name = GroupName::new(name).map_err(|e| DecodeError::Malformed {
        message: e.to_string(),
    })?;

    Ok(GroupReference::new(id, name))
}

#[cfg(test)]
mod tests {
    use super::*;

    const ID: &str = "0123456789abcdef0123456789abcdef01234567";

    fn group(name: &str) -> GroupReference {
        GroupReference::new(GroupId::new(ID).unwrap(), GroupName::new(name).unwrap())
    }

    #[test]
    fn encoded_layout() {
        let bytes = encode_record(&group("Administrators"));
        assert_eq!(
            String::from_utf8(bytes).unwrap(),
            format!("[group]\n\tuuid = {}\n\tname = Administrators\n", ID)
        );
    }

    #[test]
    fn awkward_names_roundtrip() {
        for name in [" padded ", "a # b", "x;y", "q\"uote", "back\\slash", "ünï"] {
            let g = group(name);
            assert_eq!(decode_record(&encode_record(&g)).unwrap(), g, "{:?}", name);
        }
    }

    #[test]
    fn decodes_records_written_by_other_tools() {
        let text = format!("[group]\n  name = Registered Users\n  UUID = {}\n", ID.to_uppercase());
        let decoded = decode_record(text.as_bytes()).unwrap();
        assert_eq!(decoded, group("Registered Users"));
    }

    #[test]
    fn missing_uuid() {
        let err = decode_record(b"[group]\n\tname = x\n").unwrap_err();
        assert_eq!(err, DecodeError::MissingField { field: "group.uuid" });
    }

    #[test]
    fn missing_name() {
        let text = format!("[group]\n\tuuid = {}\n", ID);
        let err = decode_record(text.as_bytes()).unwrap_err();
        assert_eq!(err, DecodeError::MissingField { field: "group.name" });
    }

    #[test]
    fn fields_in_wrong_section_are_missing() {
        let text = format!("[other]\n\tuuid = {}\n\tname = x\n", ID);
        assert!(matches!(
            decode_record(text.as_bytes()),
            Err(DecodeError::MissingField { .. })
        ));
    }

    #[test]
    fn unparseable_text_is_malformed() {
        assert!(matches!(
            decode_record(b"not a config"),
            Err(DecodeError::Malformed { .. })
        ));
        assert!(matches!(
            decode_record(&[0xff, 0xfe, 0x00]),
            Err(DecodeError::Malformed { .. })
        ));
    }

    #[test]
    fn invalid_values_are_malformed() {
        let bad_id = "[group]\n\tuuid = nope\n\tname = x\n";
        assert!(matches!(
            decode_record(bad_id.as_bytes()),
            Err(DecodeError::Malformed { .. })
        ));

        let empty_name = format!("[group]\n\tuuid = {}\n\tname =\n", ID);
        assert!(matches!(
            decode_record(empty_name.as_bytes()),
            Err(DecodeError::Malformed { .. })
        ));
    }

    #[test]
    fn decode_error_display() {
        let err = DecodeError::MissingField { field: "group.name" };
        assert!(err.to_string().contains("group.name"));
        let err = DecodeError::Malformed {
            message: "line 2: bad".into(),
        };
        assert!(err.to_string().contains("line 2"));
    }
}

//! Artifact configuration handed to the page template.
//!
//! The template layer substitutes this JSON object into the generated page.
//! Decrypt mode reads the two fields it needs back out of such a page.

use serde::{Deserialize, Serialize};

use crate::error::{CodecError, Result};
use crate::salt::Salt;

/// JSON key of the wire message inside a generated page.
pub const ENCRYPTED_MSG_FIELD: &str = "pagelockEncryptedMsg";

/// JSON key of the salt inside a generated page.
pub const SALT_FIELD: &str = "pagelockSalt";

/// Everything the browser side needs to decrypt a page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArtifactConfig {
    #[serde(rename = "pagelockEncryptedMsg")]
    pub encrypted_msg: String,
    #[serde(rename = "pagelockSalt")]
    pub salt: Salt,
    pub is_remember_enabled: bool,
    /// 0 means remembered keys never expire.
    pub remember_duration_in_days: u32,
    /// Id of the derivation profile the page was produced with.
    pub profile_id: u8,
}

impl ArtifactConfig {
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Pull the wire message and salt back out of a generated page.
    pub fn extract(page: &str) -> Result<ExtractedArtifact> {
        let encrypted_msg = find_string_field(page, ENCRYPTED_MSG_FIELD)
            .ok_or(CodecError::ArtifactNotFound(ENCRYPTED_MSG_FIELD))?;
        let salt = find_string_field(page, SALT_FIELD).ok_or(CodecError::ArtifactNotFound(SALT_FIELD))?;
        Ok(ExtractedArtifact {
            encrypted_msg: encrypted_msg.to_string(),
            salt: Salt::validate(salt)?,
        })
    }
}

/// The decrypt-mode subset of an [`ArtifactConfig`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedArtifact {
    pub encrypted_msg: String,
    pub salt: Salt,
}

/// Find `"field": "value"` in `text` and return `value`. Values written by
/// this crate are hex or base64, so they never contain quotes or escapes.
fn find_string_field<'a>(text: &'a str, field: &str) -> Option<&'a str> {
    let needle = format!("\"{field}\"");
    let mut search_from = 0;
    while let Some(found) = text[search_from..].find(&needle) {
        let after_key = search_from + found + needle.len();
        let rest = text[after_key..].trim_start();
        if let Some(value) = rest
            .strip_prefix(':')
            .map(str::trim_start)
            .and_then(|v| v.strip_prefix('"'))
        {
            if let Some(end) = value.find('"') {
                return Some(&value[..end]);
            }
        }
        search_from = after_key;
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> ArtifactConfig {
        ArtifactConfig {
            encrypted_msg: "ab".repeat(80),
            salt: Salt::validate("00112233445566778899aabbccddeeff").unwrap(),
            is_remember_enabled: true,
            remember_duration_in_days: 30,
            profile_id: 3,
        }
    }

    #[test]
    fn test_json_field_names() {
        let json: serde_json::Value = serde_json::from_str(&config().to_json().unwrap()).unwrap();
        assert_eq!(json[SALT_FIELD], "00112233445566778899aabbccddeeff");
        assert_eq!(json["isRememberEnabled"], true);
        assert_eq!(json["rememberDurationInDays"], 30);
        assert_eq!(json["profileId"], 3);
        assert!(json[ENCRYPTED_MSG_FIELD].is_string());
    }

    #[test]
    fn test_extract_from_rendered_page() {
        let page = format!(
            "<html><script>const config = {};</script></html>",
            config().to_json().unwrap()
        );
        let extracted = ArtifactConfig::extract(&page).unwrap();
        assert_eq!(extracted.encrypted_msg, config().encrypted_msg);
        assert_eq!(extracted.salt, config().salt);
    }

    #[test]
    fn test_extract_tolerates_whitespace() {
        let page = r#"{ "pagelockEncryptedMsg" :  "abcd", "pagelockSalt":"00112233445566778899aabbccddeeff" }"#;
        assert_eq!(ArtifactConfig::extract(page).unwrap().encrypted_msg, "abcd");
    }

    #[test]
    fn test_extract_skips_mentions_that_are_not_fields() {
        let page = r#"// reads "pagelockSalt" below
            {"pagelockEncryptedMsg": "abcd", "pagelockSalt": "00112233445566778899aabbccddeeff"}"#;
        assert_eq!(
            ArtifactConfig::extract(page).unwrap().salt.as_str(),
            "00112233445566778899aabbccddeeff"
        );
    }

    #[test]
    fn test_missing_fields() {
        assert!(matches!(
            ArtifactConfig::extract("<html></html>"),
            Err(CodecError::ArtifactNotFound(ENCRYPTED_MSG_FIELD))
        ));
        assert!(matches!(
            ArtifactConfig::extract(r#"{"pagelockEncryptedMsg": "ab"}"#),
            Err(CodecError::ArtifactNotFound(SALT_FIELD))
        ));
    }
}

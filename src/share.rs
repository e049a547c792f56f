//! Autodecrypt share links.
//!
//! A share link carries the current derived key (never the password) in the
//! URL fragment, which browsers do not send to the server:
//!
//! ```text
//! https://example.com/page.html#pagelock_key=<64 hex>&remember_me
//! ```

use crate::error::Result;
use crate::keys::DerivedKey;

/// Fragment parameter holding the key.
pub const KEY_PARAM: &str = "pagelock_key";

/// Fragment flag asking the page to remember the key.
pub const REMEMBER_FLAG: &str = "remember_me";

/// Build a share link for `base_url`.
pub fn share_link(base_url: &str, key: &DerivedKey, remember: bool) -> String {
    let key_hex = key.to_hex();
    let mut url = format!("{base_url}#{KEY_PARAM}={}", key_hex.as_str());
    if remember {
        url.push('&');
        url.push_str(REMEMBER_FLAG);
    }
    url
}

/// The parts of a URL fragment the page cares about.
#[derive(Debug)]
pub struct ShareFragment {
    pub key: DerivedKey,
    pub remember: bool,
}

impl ShareFragment {
    /// Parse a fragment, with or without its leading `#`.
    ///
    /// Returns `Ok(None)` if no key parameter is present and an error if one
    /// is present but malformed.
    pub fn parse(fragment: &str) -> Result<Option<Self>> {
        let fragment = fragment.strip_prefix('#').unwrap_or(fragment);

        let mut key = None;
        let mut remember = false;
        for part in fragment.split('&').filter(|p| !p.is_empty()) {
            match part.split_once('=') {
                Some((KEY_PARAM, value)) => key = Some(DerivedKey::from_hex(value)?),
                None if part == REMEMBER_FLAG => remember = true,
                _ => {}
            }
        }
        Ok(key.map(|key| Self { key, remember }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::KEY_LEN;
    use crate::error::CodecError;

    #[test]
    fn test_link_roundtrip() {
        let key = DerivedKey::from_bytes([0x5a; KEY_LEN]);
        let link = share_link("https://example.com/p.html", &key, true);
        assert!(link.starts_with("https://example.com/p.html#pagelock_key=5a5a"));
        assert!(link.ends_with("&remember_me"));

        let (_, fragment) = link.split_once('#').unwrap();
        let parsed = ShareFragment::parse(fragment).unwrap().unwrap();
        assert_eq!(parsed.key.as_bytes(), key.as_bytes());
        assert!(parsed.remember);
    }

    #[test]
    fn test_without_remember_flag() {
        let key = DerivedKey::from_bytes([1; KEY_LEN]);
        let link = share_link("", &key, false);
        let parsed = ShareFragment::parse(&link).unwrap().unwrap();
        assert!(!parsed.remember);
    }

    #[test]
    fn test_fragment_without_key() {
        assert!(ShareFragment::parse("#section-2").unwrap().is_none());
        assert!(ShareFragment::parse("").unwrap().is_none());
    }

    #[test]
    fn test_malformed_key_is_an_error() {
        assert!(matches!(
            ShareFragment::parse("#pagelock_key=abc"),
            Err(CodecError::InvalidKey)
        ));
    }
}

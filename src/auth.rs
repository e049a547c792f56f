//! Message authentication.
//!
//! The tag is `HMAC-SHA256(key = hex(SHA-256(hex(derived_key))), msg)`. The
//! authenticator never sees the raw derived key, only a hash of it.

use ring::{digest, hmac};
use zeroize::Zeroizing;

use crate::crypto;
use crate::keys::DerivedKey;

/// Length of a tag's hex form.
pub const TAG_HEX_LEN: usize = 64;

fn signing_key(key: &DerivedKey) -> hmac::Key {
    let key_hex = key.to_hex();
    let hashed = digest::digest(&digest::SHA256, key_hex.as_bytes());
    let hashed_hex = Zeroizing::new(hex::encode(hashed.as_ref()));
    hmac::Key::new(hmac::HMAC_SHA256, hashed_hex.as_bytes())
}

/// Tag `message` under `key`, as 64 lowercase hex characters.
pub fn sign(key: &DerivedKey, message: &str) -> String {
    let tag = hmac::sign(&signing_key(key), message.as_bytes());
    hex::encode(tag.as_ref())
}

/// Check `claimed_tag` against `message`.
///
/// Anything other than 64 lowercase hex characters is rejected up front, so
/// `A` and `a` are not interchangeable. The tag comparison itself is
/// constant-time.
pub fn verify(key: &DerivedKey, message: &str, claimed_tag: &str) -> bool {
    if claimed_tag.len() != TAG_HEX_LEN || !crypto::is_lower_hex(claimed_tag) {
        return false;
    }
    let mut claimed = [0u8; TAG_HEX_LEN / 2];
    if hex::decode_to_slice(claimed_tag, &mut claimed).is_err() {
        return false;
    }
    hmac::verify(&signing_key(key), message.as_bytes(), &claimed).is_ok()
}

//! Password-based key derivation and key ownership.
//!
//! This module owns two responsibilities:
//! 1. Running PBKDF2 rounds along the [`ProfileChain`].
//! 2. Holding derived key material in a type that is non-cloneable and
//!    zeroised on drop.
//!
//! ## Derivation structure
//!
//! ```text
//! k1 = PBKDF2(prf1, password,  salt_hex, n1)
//! k2 = PBKDF2(prf2, hex(k1),   salt_hex, n2)
//! ...
//! current = hex(kN)
//! ```
//!
//! Each round after the first consumes the previous round's lowercase hex
//! text as its password. That is what lets a remember-me key issued under an
//! older profile be upgraded without the original password.

use std::fmt;

use ring::pbkdf2;
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

use crate::crypto::{self, KEY_LEN};
use crate::error::{CodecError, Result};
use crate::profile::{DerivationProfile, ProfileChain};
use crate::salt::Salt;

/// Length of a derived key's hex form.
pub const KEY_HEX_LEN: usize = KEY_LEN * 2;

/// A key produced by the derivation chain.
///
/// - Not `Clone`. Copies have to be made on purpose through hex.
/// - Zeroised on drop.
/// - `Debug` never prints the bytes.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct DerivedKey {
    bytes: [u8; KEY_LEN],
}

impl DerivedKey {
    pub fn from_bytes(bytes: [u8; KEY_LEN]) -> Self {
        Self { bytes }
    }

    /// Parse a key from 64 lowercase hex characters, as found in
    /// remember-me storage and share links.
    pub fn from_hex(text: &str) -> Result<Self> {
        if text.len() != KEY_HEX_LEN || !crypto::is_lower_hex(text) {
            return Err(CodecError::InvalidKey);
        }
        let mut bytes = [0u8; KEY_LEN];
        hex::decode_to_slice(text, &mut bytes).map_err(|_| CodecError::InvalidKey)?;
        Ok(Self { bytes })
    }

    /// Lowercase hex form. This is the form that feeds the next derivation
    /// round and the authenticator, and the form stored for remember-me.
    pub fn to_hex(&self) -> Zeroizing<String> {
        Zeroizing::new(hex::encode(self.bytes))
    }

    /// Borrow the raw key bytes for the cipher.
    pub(crate) fn as_bytes(&self) -> &[u8; KEY_LEN] {
        &self.bytes
    }

    pub(crate) fn duplicate(&self) -> Self {
        Self { bytes: self.bytes }
    }
}

impl fmt::Debug for DerivedKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("DerivedKey(..)")
    }
}

/// One PBKDF2 round of `profile` over `secret`.
pub(crate) fn derive_round(secret: &[u8], salt: &Salt, profile: &DerivationProfile) -> Result<DerivedKey> {
    tracing::debug!(
        profile = profile.name,
        iterations = profile.iterations,
        "running derivation round"
    );
    let mut bytes = [0u8; KEY_LEN];
    pbkdf2::derive(
        profile.hash.pbkdf2_algorithm(),
        profile.iteration_count()?,
        salt.as_kdf_bytes(),
        secret,
        &mut bytes,
    );
    let key = DerivedKey::from_bytes(bytes);
    bytes.zeroize();
    Ok(key)
}

/// Apply `profile` to a password.
pub fn derive_initial(password: &str, salt: &Salt, profile: &DerivationProfile) -> Result<DerivedKey> {
    derive_round(password.as_bytes(), salt, profile)
}

/// Apply `profile` on top of an existing key, using its hex text as the
/// password.
pub fn derive_next_round(previous: &DerivedKey, salt: &Salt, profile: &DerivationProfile) -> Result<DerivedKey> {
    derive_round(previous.to_hex().as_bytes(), salt, profile)
}

/// Apply each of `rounds` in order on top of `key`.
pub fn upgrade(key: &DerivedKey, salt: &Salt, rounds: &[DerivationProfile]) -> Result<DerivedKey> {
    let mut current = key.duplicate();
    for profile in rounds {
        current = derive_next_round(&current, salt, profile)?;
    }
    Ok(current)
}

/// Derive the key for the newest profile of `chain` from a password.
pub fn derive_current(password: &str, salt: &Salt, chain: &ProfileChain) -> Result<DerivedKey> {
    let (first, rest) = chain
        .profiles()
        .split_first()
        .ok_or(CodecError::InvalidProfile("empty chain"))?;
    let initial = derive_initial(password, salt, first)?;
    upgrade(&initial, salt, rest)
}

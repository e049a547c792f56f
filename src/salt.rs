//! Salt generation and validation.
//!
//! A salt is 16 random bytes carried everywhere as a 32-character lowercase
//! hex string. The hex *string* is what key derivation consumes, so two
//! spellings of the same bytes are not interchangeable: only the canonical
//! lowercase form is accepted.

use std::fmt;

use ring::rand::SecureRandom;
use serde::{Deserialize, Serialize};

use crate::crypto;
use crate::error::{CodecError, Result};

/// Number of random bytes in a salt.
pub const SALT_LEN: usize = 16;

/// Length of the canonical hex form.
pub const SALT_HEX_LEN: usize = SALT_LEN * 2;

/// A validated, canonical (lowercase hex) salt.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Salt(String);

impl Salt {
    /// Generate a fresh salt from `rng`.
    pub fn generate(rng: &dyn SecureRandom) -> Result<Self> {
        let bytes: [u8; SALT_LEN] = crypto::random_array(rng)?;
        Ok(Self(hex::encode(bytes)))
    }

    /// Validate an already-canonical salt string.
    ///
    /// Uppercase input is rejected here; callers holding user input should
    /// go through [`Salt::normalize`].
    pub fn validate(candidate: &str) -> Result<Self> {
        if candidate.len() != SALT_HEX_LEN {
            return Err(CodecError::InvalidSalt("expected 32 hex characters"));
        }
        if !candidate.bytes().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f')) {
            return Err(CodecError::InvalidSalt("expected lowercase hex characters"));
        }
        Ok(Self(candidate.to_string()))
    }

    /// Lowercase then validate. Used for salts typed by a user.
    pub fn normalize(candidate: &str) -> Result<Self> {
        Self::validate(&candidate.trim().to_ascii_lowercase())
    }

    /// Pick the salt for a run.
    ///
    /// An explicitly supplied salt wins and its errors propagate; it is never
    /// silently replaced. Otherwise a previously stored salt is reused so
    /// remember-me keys stay valid across re-encryptions. Failing both, a new
    /// salt is generated.
    pub fn resolve(
        explicit: Option<&str>,
        stored: Option<&str>,
        rng: &dyn SecureRandom,
    ) -> Result<Self> {
        if let Some(explicit) = explicit {
            return Self::normalize(explicit);
        }
        if let Some(stored) = stored {
            return Self::validate(stored);
        }
        Self::generate(rng)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The bytes fed to PBKDF2: the hex text itself, not the decoded bytes.
    pub(crate) fn as_kdf_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }
}

impl fmt::Display for Salt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for Salt {
    type Err = CodecError;

    fn from_str(s: &str) -> Result<Self> {
        Self::validate(s)
    }
}

impl TryFrom<String> for Salt {
    type Error = CodecError;

    fn try_from(value: String) -> Result<Self> {
        Self::validate(&value)
    }
}

impl From<Salt> for String {
    fn from(salt: Salt) -> Self {
        salt.0
    }
}

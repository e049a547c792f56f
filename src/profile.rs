//! Derivation profiles and the historical profile chain.
//!
//! Profiles are protocol constants. Each one after the first is applied on
//! top of the previous profile's hex output, so an old derived key can be
//! brought up to date without the password. Changing any count, hash or
//! order here breaks every artifact and remember-me link issued so far.

use std::num::NonZeroU32;

use ring::pbkdf2;

use crate::error::{CodecError, Result};

/// Key length produced by every profile, in bits.
pub const KEY_BITS: u32 = 256;

/// The PRF used inside PBKDF2.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HashAlgorithm {
    Sha1,
    Sha256,
}

impl HashAlgorithm {
    pub(crate) fn pbkdf2_algorithm(self) -> pbkdf2::Algorithm {
        match self {
            Self::Sha1 => pbkdf2::PBKDF2_HMAC_SHA1,
            Self::Sha256 => pbkdf2::PBKDF2_HMAC_SHA256,
        }
    }
}

/// One `{iterations, hash, key length}` configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DerivationProfile {
    /// Position-derived identifier, written into artifacts.
    pub id: u8,
    pub name: &'static str,
    pub hash: HashAlgorithm,
    pub iterations: u32,
    pub key_bits: u32,
}

impl DerivationProfile {
    pub const fn new(id: u8, name: &'static str, hash: HashAlgorithm, iterations: u32) -> Self {
        Self {
            id,
            name,
            hash,
            iterations,
            key_bits: KEY_BITS,
        }
    }

    pub(crate) fn iteration_count(&self) -> Result<NonZeroU32> {
        NonZeroU32::new(self.iterations).ok_or(CodecError::InvalidProfile("zero iterations"))
    }
}

/// The first profile ever shipped: 1k rounds of PBKDF2-HMAC-SHA1 over the
/// password.
pub const LEGACY: DerivationProfile = DerivationProfile::new(1, "legacy", HashAlgorithm::Sha1, 1_000);

/// Second profile: 14k rounds of PBKDF2-HMAC-SHA256 over the legacy hex.
pub const SECOND_ROUND: DerivationProfile =
    DerivationProfile::new(2, "second", HashAlgorithm::Sha256, 14_000);

/// Current profile: 585k rounds of PBKDF2-HMAC-SHA256 over the second hex.
pub const THIRD_ROUND: DerivationProfile =
    DerivationProfile::new(3, "third", HashAlgorithm::Sha256, 585_000);

/// A strictly ordered, non-empty list of profiles, oldest first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileChain {
    profiles: Vec<DerivationProfile>,
}

impl ProfileChain {
    /// Build a custom chain. Used for tests and for deployments that pin a
    /// different history.
    pub fn new(profiles: Vec<DerivationProfile>) -> Result<Self> {
        if profiles.is_empty() {
            return Err(CodecError::InvalidProfile("empty chain"));
        }
        for profile in &profiles {
            profile.iteration_count()?;
            if profile.key_bits != KEY_BITS {
                return Err(CodecError::InvalidProfile("unsupported key length"));
            }
        }
        if profiles.windows(2).any(|w| w[0].id >= w[1].id) {
            return Err(CodecError::InvalidProfile("profile ids must increase"));
        }
        Ok(Self { profiles })
    }

    /// The chain every artifact produced so far was built with.
    pub fn standard() -> Self {
        Self {
            profiles: vec![LEGACY, SECOND_ROUND, THIRD_ROUND],
        }
    }

    pub fn profiles(&self) -> &[DerivationProfile] {
        &self.profiles
    }

    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    /// Always false; kept for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }

    /// The newest profile.
    pub fn current(&self) -> &DerivationProfile {
        // Non-empty by construction.
        &self.profiles[self.profiles.len() - 1]
    }

    /// The last `count` profiles: the rounds needed to bring a key that is
    /// `count` profiles behind up to date.
    pub fn newest(&self, count: usize) -> &[DerivationProfile] {
        let start = self.profiles.len().saturating_sub(count);
        &self.profiles[start..]
    }
}

impl Default for ProfileChain {
    fn default() -> Self {
        Self::standard()
    }
}

//! # pagelock
//!
//! Password-protected, self-decrypting HTML pages.
//!
//! A page is encrypted under a key stretched from a password and salt, then
//! signed. The resulting wire message is embedded in a page that decrypts
//! itself in the browser with the same derivation, cipher and authenticator.
//!
//! ```text
//! encode: password ─► derive (profile chain) ─► encrypt ─► sign ─► tag‖iv‖ciphertext
//! decode: tag‖iv‖ciphertext ─► verify ─┬─► decrypt ─► plaintext
//!                                      └─► (mismatch) upgrade candidate, retry
//! ```
//!
//! Keys handed out for remember-me links may have been derived under an
//! older, weaker profile. Decoding upgrades such keys through the remaining
//! rounds of the chain instead of rejecting them; new output always uses the
//! newest profile.
//!
//! ## Public API
//!
//! [`Codec`] is the entry point. Salts come from [`Salt`]; keys are
//! [`DerivedKey`]s. The remaining modules are the seams to the page
//! generator: config persistence, share links, remember-me storage and the
//! artifact payload.

pub mod artifact;
pub mod auth;
pub mod codec;
pub mod config;
pub mod crypto;
pub mod error;
pub mod keys;
pub mod password;
pub mod profile;
pub mod remember;
pub mod resolver;
pub mod salt;
pub mod share;
pub mod wire;

#[cfg(feature = "tokio")]
pub mod task;

pub use codec::{Codec, Decoded};
pub use crypto::{AesCbcEngine, AesGcmEngine, CryptoEngine, CryptoJsEngine};
pub use error::{CodecError, Result};
pub use keys::DerivedKey;
pub use profile::{DerivationProfile, HashAlgorithm, ProfileChain};
pub use salt::Salt;

/// Generate a fresh salt from the system randomness source.
pub fn generate_salt() -> Result<Salt> {
    Salt::generate(&ring::rand::SystemRandom::new())
}

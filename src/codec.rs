//! Encode/decode orchestration.
//!
//! Encoding derives the current key, encrypts, and signs the IV and
//! ciphertext. Decoding verifies the tag first and only decrypts once
//! some key from the [`MigrationResolver`] has authenticated the message.

use ring::rand::SystemRandom;
use zeroize::Zeroizing;

use crate::crypto::{CryptoEngine, CryptoJsEngine};
use crate::error::{CodecError, Result};
use crate::keys::DerivedKey;
use crate::profile::{DerivationProfile, ProfileChain};
use crate::resolver::MigrationResolver;
use crate::salt::Salt;
use crate::wire::{self, WireMessage};

// ---------------------------------------------------------------------------
// Decode result
// ---------------------------------------------------------------------------

/// A successful decode.
pub struct Decoded {
    /// The recovered document.
    pub plaintext: String,
    key: DerivedKey,
    attempt: usize,
    migrated_from: Option<Zeroizing<String>>,
}

impl Decoded {
    /// The key that authenticated the message. After a migration this is
    /// the upgraded, current key.
    pub fn key(&self) -> &DerivedKey {
        &self.key
    }

    /// Which resolver attempt succeeded; 0 means no migration was needed.
    pub fn attempt(&self) -> usize {
        self.attempt
    }

    pub fn was_migrated(&self) -> bool {
        self.migrated_from.is_some()
    }

    /// Hex of the candidate the caller supplied, present only when it had to
    /// be upgraded. Remember-me storage compares against this before
    /// overwriting.
    pub fn migrated_from(&self) -> Option<&str> {
        self.migrated_from.as_deref().map(String::as_str)
    }

    pub fn into_plaintext(self) -> String {
        self.plaintext
    }
}

impl std::fmt::Debug for Decoded {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Decoded")
            .field("plaintext_len", &self.plaintext.len())
            .field("attempt", &self.attempt)
            .field("migrated", &self.migrated_from.is_some())
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Codec
// ---------------------------------------------------------------------------

/// The password-protected page codec.
///
/// Stateless apart from its configuration: every call is independent and a
/// shared `&Codec` may be used from many threads at once.
pub struct Codec<E: CryptoEngine = CryptoJsEngine> {
    engine: E,
    chain: ProfileChain,
    rng: SystemRandom,
}

impl Codec<CryptoJsEngine> {
    /// CryptoJS-format codec over the standard profile chain.
    pub fn new() -> Self {
        Self::with_engine(CryptoJsEngine)
    }
}

impl Default for Codec<CryptoJsEngine> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: CryptoEngine> Codec<E> {
    pub fn with_engine(engine: E) -> Self {
        Self {
            engine,
            chain: ProfileChain::standard(),
            rng: SystemRandom::new(),
        }
    }

    /// Replace the profile chain.
    pub fn with_chain(mut self, chain: ProfileChain) -> Self {
        self.chain = chain;
        self
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn chain(&self) -> &ProfileChain {
        &self.chain
    }

    /// The profile new artifacts are produced with.
    pub fn current_profile(&self) -> &DerivationProfile {
        self.chain.current()
    }

    /// The randomness source used for IVs; also suitable for
    /// [`Salt::generate`].
    pub fn rng(&self) -> &SystemRandom {
        &self.rng
    }

    /// Derive the current key for `password`.
    pub fn derive_key(&self, password: &str, salt: &Salt) -> Result<DerivedKey> {
        self.engine.derive_key(password, salt, &self.chain)
    }

    /// Encrypt and sign `plaintext` under `password`.
    pub fn encode(&self, plaintext: &str, password: &str, salt: &Salt) -> Result<String> {
        let key = self.derive_key(password, salt)?;
        self.encode_with_key(plaintext, &key)
    }

    /// Encrypt and sign with an already-derived key. Lets a caller derive
    /// once and protect many documents.
    pub fn encode_with_key(&self, plaintext: &str, key: &DerivedKey) -> Result<String> {
        let body = self.engine.encrypt(&self.rng, key, plaintext.as_bytes())?;
        let tag = self.engine.sign(key, &body);
        Ok(wire::assemble(&tag, &body))
    }

    /// Authenticate and decrypt `message` starting from `candidate`.
    ///
    /// If the candidate does not authenticate, it is retried through the
    /// migration resolver. No plaintext is returned unless a tag verified.
    pub fn decode(&self, message: &str, candidate: &DerivedKey, salt: &Salt) -> Result<Decoded> {
        let message = WireMessage::parse(message)?;

        let resolver = MigrationResolver::new(&self.engine, &self.chain, salt, candidate);
        let max_attempts = resolver.max_attempts();
        for attempt in resolver {
            let attempt = attempt?;
            if !self.engine.verify(&attempt.key, message.body(), message.tag()) {
                continue;
            }

            let bytes = self
                .engine
                .decrypt(&attempt.key, message.iv(), message.ciphertext())?;
            let plaintext = String::from_utf8(bytes).map_err(|_| CodecError::DecryptionFailure)?;

            let migrated_from = (attempt.index > 0).then(|| candidate.to_hex());
            if migrated_from.is_some() {
                tracing::info!(attempt = attempt.index, "decoded with upgraded legacy key");
            }
            return Ok(Decoded {
                plaintext,
                key: attempt.key,
                attempt: attempt.index,
                migrated_from,
            });
        }

        tracing::warn!(attempts = max_attempts, "signature mismatch after exhausting derivation chain");
        Err(CodecError::SignatureMismatch)
    }

    /// Derive the current key from `password` and decode.
    pub fn decode_with_password(&self, message: &str, password: &str, salt: &Salt) -> Result<Decoded> {
        let key = self.derive_key(password, salt)?;
        self.decode(message, &key, salt)
    }
}

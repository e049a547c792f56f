//! Error types for pagelock.
//!
//! Every error variant is a distinct failure mode of the codec. Messages are
//! intentionally minimal: they say *what* failed without revealing *why* in
//! ways that could act as a password or padding oracle.

use thiserror::Error;

/// Message shown to a user for any cryptographic failure during decode.
pub const USER_DECODE_FAILURE: &str = "wrong password or corrupted file";

/// The single error type for all pagelock operations.
#[derive(Debug, Error)]
pub enum CodecError {
    /// A salt string was not 32 lowercase hex characters.
    #[error("invalid salt: {0}")]
    InvalidSalt(&'static str),

    /// A derived key was malformed (wrong length, not hex).
    #[error("invalid key")]
    InvalidKey,

    /// A derivation profile or profile chain is unusable.
    #[error("invalid derivation profile: {0}")]
    InvalidProfile(&'static str),

    /// The wire message is structurally broken (too short, not ASCII).
    /// Distinct from a cryptographic failure.
    #[error("malformed message: {0}")]
    MalformedMessage(&'static str),

    /// Authentication failed after the whole migration chain was tried.
    #[error("signature mismatch")]
    SignatureMismatch,

    /// Cipher-level failure: bad padding, GCM tag failure, non-UTF-8 output.
    #[error("decryption failed")]
    DecryptionFailure,

    /// The cipher refused to encrypt.
    #[error("encryption failed")]
    EncryptionFailure,

    /// The system's random number generator failed to produce bytes.
    #[error("randomness source failed")]
    RandomnessFailure,

    /// The password is shorter than the policy minimum and the caller did
    /// not accept short passwords.
    #[error("password too short: {got} characters, at least {min} required")]
    PasswordTooShort { min: usize, got: usize },

    /// A generated page did not contain the expected artifact fields.
    #[error("artifact field not found: {0}")]
    ArtifactNotFound(&'static str),

    /// The config file could not be read or written.
    #[error("config file error: {0}")]
    Config(#[from] std::io::Error),

    /// JSON (de)serialization failed: a config file of the wrong shape, or
    /// an artifact payload that could not be written.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// A background derivation task panicked or was aborted.
    #[error("background task failed: {0}")]
    Background(String),
}

impl CodecError {
    /// Returns true for failures that mean "this key does not open this
    /// message". Callers must not distinguish between them when talking to a
    /// user.
    pub fn is_authentication_failure(&self) -> bool {
        matches!(self, Self::SignatureMismatch | Self::DecryptionFailure)
    }

    /// A message safe to show to an end user.
    pub fn user_message(&self) -> String {
        if self.is_authentication_failure() {
            USER_DECODE_FAILURE.to_string()
        } else {
            self.to_string()
        }
    }
}

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, CodecError>;

//! Symmetric cipher engines.
//!
//! This module and `keys` are the only places that touch cipher or PBKDF2
//! primitives directly. Everything above them goes through the
//! [`CryptoEngine`] capability interface, whose concrete engine is picked at
//! build time as a type parameter of [`crate::Codec`].
//!
//! Engines:
//! - [`CryptoJsEngine`] (default): the format produced by the CLI and its
//!   browser script. The derived key's hex text is an OpenSSL passphrase;
//!   AES-256-CBC key and IV come from `EVP_BytesToKey` (MD5, 8-byte salt)
//!   and the ciphertext is base64 `Salted__` text.
//! - [`AesGcmEngine`]: the WebCrypto build. AES-256-GCM keyed by the raw
//!   derived key, 128-bit nonce, hex ciphertext with the tag appended.
//! - [`AesCbcEngine`]: AES-256-CBC/PKCS#7 keyed by the raw derived key,
//!   hex ciphertext.
//!
//! Every engine writes a fresh 128-bit IV from the injected `SecureRandom`
//! as 32 lowercase hex characters in front of its ciphertext.

use aes::Aes256;
use aes_gcm::aead::consts::U16;
use aes_gcm::aead::{Aead, KeyInit};
use aes_gcm::{AesGcm, Nonce};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use cbc::cipher::block_padding::Pkcs7;
use cbc::cipher::{BlockDecryptMut, BlockEncryptMut, KeyIvInit};
use md5::{Digest, Md5};
use ring::rand::SecureRandom;
use zeroize::Zeroizing;

use crate::auth;
use crate::error::{CodecError, Result};
use crate::keys::{self, DerivedKey};
use crate::profile::{DerivationProfile, ProfileChain};
use crate::salt::Salt;

/// Size of the IV in bytes (128 bits).
pub const IV_LEN: usize = 16;

/// Size of a derived key in bytes (256 bits).
pub const KEY_LEN: usize = 32;

/// AES block size in bytes.
const BLOCK_LEN: usize = 16;

type Aes256CbcEnc = cbc::Encryptor<Aes256>;
type Aes256CbcDec = cbc::Decryptor<Aes256>;

/// AES-256-GCM with a 128-bit nonce, matching the browser's WebCrypto call.
type Aes256Gcm16 = AesGcm<Aes256, U16>;

/// Prefix of OpenSSL's salted ciphertext format.
const OPENSSL_MAGIC: &[u8] = b"Salted__";

/// Salt length of OpenSSL's salted ciphertext format.
const OPENSSL_SALT_LEN: usize = 8;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Fill a fixed-size array from `rng`.
pub(crate) fn random_array<const N: usize>(rng: &dyn SecureRandom) -> Result<[u8; N]> {
    let mut buf = [0u8; N];
    rng.fill(&mut buf).map_err(|_| CodecError::RandomnessFailure)?;
    Ok(buf)
}

/// True if `s` is non-empty and made only of `[0-9a-f]`.
pub(crate) fn is_lower_hex(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f'))
}

fn parse_iv(iv_hex: &str) -> Result<[u8; IV_LEN]> {
    if iv_hex.len() != IV_LEN * 2 || !is_lower_hex(iv_hex) {
        return Err(CodecError::DecryptionFailure);
    }
    let mut iv = [0u8; IV_LEN];
    hex::decode_to_slice(iv_hex, &mut iv).map_err(|_| CodecError::DecryptionFailure)?;
    Ok(iv)
}

fn parse_ciphertext(ciphertext_hex: &str) -> Result<Vec<u8>> {
    if !is_lower_hex(ciphertext_hex) {
        return Err(CodecError::DecryptionFailure);
    }
    hex::decode(ciphertext_hex).map_err(|_| CodecError::DecryptionFailure)
}

/// OpenSSL `EVP_BytesToKey` with MD5 and one iteration: AES-256 key
/// followed by the CBC IV.
fn evp_bytes_to_key(passphrase: &[u8], salt: &[u8; OPENSSL_SALT_LEN]) -> Zeroizing<[u8; KEY_LEN + IV_LEN]> {
    let mut material = Zeroizing::new([0u8; KEY_LEN + IV_LEN]);
    let mut filled = 0;
    let mut previous: Option<md5::digest::Output<Md5>> = None;
    while filled < material.len() {
        let mut hasher = Md5::new();
        if let Some(block) = &previous {
            hasher.update(block);
        }
        hasher.update(passphrase);
        hasher.update(salt);
        let block = hasher.finalize();

        let take = block.len().min(material.len() - filled);
        material[filled..filled + take].copy_from_slice(&block[..take]);
        filled += take;
        previous = Some(block);
    }
    material
}

// ---------------------------------------------------------------------------
// Engine interface
// ---------------------------------------------------------------------------

/// The operations a codec needs from a crypto backend.
///
/// Engines differ only in the cipher; key derivation and message
/// authentication must be bit-identical everywhere, so those are provided
/// methods and should not be overridden.
pub trait CryptoEngine: Send + Sync {
    /// Short identifier recorded in artifacts and logs.
    fn name(&self) -> &'static str;

    /// Encrypt `plaintext` under `key` with a fresh IV.
    ///
    /// # Layout of the returned text
    /// ```text
    /// [ iv (32 hex chars) ][ ciphertext (engine encoding) ]
    /// ```
    fn encrypt(&self, rng: &dyn SecureRandom, key: &DerivedKey, plaintext: &[u8]) -> Result<String>;

    /// Decrypt an IV and ciphertext in the engine's encoding. No partial
    /// plaintext is ever returned.
    fn decrypt(&self, key: &DerivedKey, iv_hex: &str, ciphertext_hex: &str) -> Result<Vec<u8>>;

    /// Derive the newest key of `chain` from a password.
    fn derive_key(&self, password: &str, salt: &Salt, chain: &ProfileChain) -> Result<DerivedKey> {
        keys::derive_current(password, salt, chain)
    }

    /// Apply `rounds` on top of an existing key.
    fn upgrade_key(&self, key: &DerivedKey, salt: &Salt, rounds: &[DerivationProfile]) -> Result<DerivedKey> {
        keys::upgrade(key, salt, rounds)
    }

    /// HMAC tag over `message`, as 64 lowercase hex characters.
    fn sign(&self, key: &DerivedKey, message: &str) -> String {
        auth::sign(key, message)
    }

    /// Constant-time tag check.
    fn verify(&self, key: &DerivedKey, message: &str, claimed_tag: &str) -> bool {
        auth::verify(key, message, claimed_tag)
    }
}

// ---------------------------------------------------------------------------
// Engines
// ---------------------------------------------------------------------------

/// CryptoJS passphrase mode: `CryptoJS.AES.encrypt(msg, keyHex)`.
///
/// The leading IV is random but unused on decrypt: the cipher IV comes
/// from the passphrase and the salt embedded in the base64 payload.
#[derive(Debug, Clone, Copy, Default)]
pub struct CryptoJsEngine;

impl CryptoJsEngine {
    fn cipher_material(key: &DerivedKey, salt: &[u8; OPENSSL_SALT_LEN]) -> Zeroizing<[u8; KEY_LEN + IV_LEN]> {
        let passphrase = key.to_hex();
        evp_bytes_to_key(passphrase.as_bytes(), salt)
    }
}

impl CryptoEngine for CryptoJsEngine {
    fn name(&self) -> &'static str {
        "cryptojs"
    }

    fn encrypt(&self, rng: &dyn SecureRandom, key: &DerivedKey, plaintext: &[u8]) -> Result<String> {
        let iv: [u8; IV_LEN] = random_array(rng)?;
        let salt: [u8; OPENSSL_SALT_LEN] = random_array(rng)?;

        let material = Self::cipher_material(key, &salt);
        let (cipher_key, cipher_iv) = material.split_at(KEY_LEN);
        let cipher = Aes256CbcEnc::new_from_slices(cipher_key, cipher_iv)
            .map_err(|_| CodecError::InvalidKey)?;
        let ciphertext = cipher.encrypt_padded_vec_mut::<Pkcs7>(plaintext);

        let mut payload = Vec::with_capacity(OPENSSL_MAGIC.len() + OPENSSL_SALT_LEN + ciphertext.len());
        payload.extend_from_slice(OPENSSL_MAGIC);
        payload.extend_from_slice(&salt);
        payload.extend_from_slice(&ciphertext);

        let mut output = hex::encode(iv);
        output.push_str(&BASE64.encode(payload));
        Ok(output)
    }

    fn decrypt(&self, key: &DerivedKey, iv_hex: &str, ciphertext_b64: &str) -> Result<Vec<u8>> {
        parse_iv(iv_hex)?;
        let payload = BASE64
            .decode(ciphertext_b64)
            .map_err(|_| CodecError::DecryptionFailure)?;
        let rest = payload
            .strip_prefix(OPENSSL_MAGIC)
            .ok_or(CodecError::DecryptionFailure)?;
        if rest.len() < OPENSSL_SALT_LEN + BLOCK_LEN {
            return Err(CodecError::DecryptionFailure);
        }
        let (salt, ciphertext) = rest.split_at(OPENSSL_SALT_LEN);
        if ciphertext.len() % BLOCK_LEN != 0 {
            return Err(CodecError::DecryptionFailure);
        }
        let salt: [u8; OPENSSL_SALT_LEN] = salt.try_into().map_err(|_| CodecError::DecryptionFailure)?;

        let material = Self::cipher_material(key, &salt);
        let (cipher_key, cipher_iv) = material.split_at(KEY_LEN);
        let cipher = Aes256CbcDec::new_from_slices(cipher_key, cipher_iv)
            .map_err(|_| CodecError::InvalidKey)?;
        cipher
            .decrypt_padded_vec_mut::<Pkcs7>(ciphertext)
            .map_err(|_| CodecError::DecryptionFailure)
    }
}

/// AES-256-CBC with PKCS#7 padding, keyed by the raw derived key.
#[derive(Debug, Clone, Copy, Default)]
pub struct AesCbcEngine;

impl CryptoEngine for AesCbcEngine {
    fn name(&self) -> &'static str {
        "aes-256-cbc"
    }

    fn encrypt(&self, rng: &dyn SecureRandom, key: &DerivedKey, plaintext: &[u8]) -> Result<String> {
        let iv: [u8; IV_LEN] = random_array(rng)?;
        let cipher = Aes256CbcEnc::new_from_slices(key.as_bytes(), &iv)
            .map_err(|_| CodecError::InvalidKey)?;
        let ciphertext = cipher.encrypt_padded_vec_mut::<Pkcs7>(plaintext);

        let mut output = String::with_capacity((IV_LEN + ciphertext.len()) * 2);
        output.push_str(&hex::encode(iv));
        output.push_str(&hex::encode(ciphertext));
        Ok(output)
    }

    fn decrypt(&self, key: &DerivedKey, iv_hex: &str, ciphertext_hex: &str) -> Result<Vec<u8>> {
        let iv = parse_iv(iv_hex)?;
        let ciphertext = parse_ciphertext(ciphertext_hex)?;
        if ciphertext.is_empty() || ciphertext.len() % BLOCK_LEN != 0 {
            return Err(CodecError::DecryptionFailure);
        }

        let cipher = Aes256CbcDec::new_from_slices(key.as_bytes(), &iv)
            .map_err(|_| CodecError::InvalidKey)?;
        cipher
            .decrypt_padded_vec_mut::<Pkcs7>(&ciphertext)
            .map_err(|_| CodecError::DecryptionFailure)
    }
}

/// AES-256-GCM with a 16-byte nonce and the 16-byte tag appended to the
/// ciphertext.
#[derive(Debug, Clone, Copy, Default)]
pub struct AesGcmEngine;

impl CryptoEngine for AesGcmEngine {
    fn name(&self) -> &'static str {
        "aes-256-gcm"
    }

    fn encrypt(&self, rng: &dyn SecureRandom, key: &DerivedKey, plaintext: &[u8]) -> Result<String> {
        let iv: [u8; IV_LEN] = random_array(rng)?;
        let cipher = Aes256Gcm16::new_from_slice(key.as_bytes()).map_err(|_| CodecError::InvalidKey)?;
        let ciphertext = cipher
            .encrypt(Nonce::<U16>::from_slice(&iv), plaintext)
            .map_err(|_| CodecError::EncryptionFailure)?;

        let mut output = String::with_capacity((IV_LEN + ciphertext.len()) * 2);
        output.push_str(&hex::encode(iv));
        output.push_str(&hex::encode(ciphertext));
        Ok(output)
    }

    fn decrypt(&self, key: &DerivedKey, iv_hex: &str, ciphertext_hex: &str) -> Result<Vec<u8>> {
        let iv = parse_iv(iv_hex)?;
        let ciphertext = parse_ciphertext(ciphertext_hex)?;

        let cipher = Aes256Gcm16::new_from_slice(key.as_bytes()).map_err(|_| CodecError::InvalidKey)?;
        cipher
            .decrypt(Nonce::<U16>::from_slice(&iv), ciphertext.as_slice())
            .map_err(|_| CodecError::DecryptionFailure)
    }
}

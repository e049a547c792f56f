//! Running derivation off the async executor.
//!
//! The current profile costs hundreds of thousands of PBKDF2 iterations. In
//! an async service that work belongs on the blocking pool. There is no
//! cancellation: a caller that stops waiting simply drops the result.

use std::sync::Arc;

use tokio::task;

use crate::codec::{Codec, Decoded};
use crate::crypto::{CryptoEngine, CryptoJsEngine};
use crate::error::{CodecError, Result};
use crate::keys::DerivedKey;
use crate::salt::Salt;

/// A shareable codec whose expensive calls run on `spawn_blocking`.
pub struct BackgroundCodec<E: CryptoEngine + 'static = CryptoJsEngine> {
    inner: Arc<Codec<E>>,
}

impl<E: CryptoEngine + 'static> Clone for BackgroundCodec<E> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<E: CryptoEngine + 'static> BackgroundCodec<E> {
    pub fn new(codec: Codec<E>) -> Self {
        Self {
            inner: Arc::new(codec),
        }
    }

    pub fn codec(&self) -> &Codec<E> {
        &self.inner
    }

    async fn run<T, F>(&self, f: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(&Codec<E>) -> Result<T> + Send + 'static,
    {
        let codec = Arc::clone(&self.inner);
        task::spawn_blocking(move || f(&codec))
            .await
            .map_err(|err| CodecError::Background(err.to_string()))?
    }

    pub async fn derive_key(&self, password: String, salt: Salt) -> Result<DerivedKey> {
        self.run(move |codec| codec.derive_key(&password, &salt)).await
    }

    pub async fn encode(&self, plaintext: String, password: String, salt: Salt) -> Result<String> {
        self.run(move |codec| codec.encode(&plaintext, &password, &salt)).await
    }

    pub async fn decode(&self, message: String, candidate: DerivedKey, salt: Salt) -> Result<Decoded> {
        self.run(move |codec| codec.decode(&message, &candidate, &salt)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::{DerivationProfile, HashAlgorithm, ProfileChain};

    fn codec() -> BackgroundCodec {
        let chain = ProfileChain::new(vec![
            DerivationProfile::new(1, "a", HashAlgorithm::Sha1, 2),
            DerivationProfile::new(2, "b", HashAlgorithm::Sha256, 2),
        ])
        .unwrap();
        BackgroundCodec::new(Codec::new().with_chain(chain))
    }

    fn salt() -> Salt {
        Salt::validate("00112233445566778899aabbccddeeff").unwrap()
    }

    #[tokio::test]
    async fn test_background_roundtrip() {
        let codec = codec();
        let wire = codec
            .encode("doc".into(), "pw".into(), salt())
            .await
            .unwrap();
        let key = codec.derive_key("pw".into(), salt()).await.unwrap();
        let decoded = codec.decode(wire, key, salt()).await.unwrap();
        assert_eq!(decoded.plaintext, "doc");
    }

    #[tokio::test]
    async fn test_concurrent_encodes_are_independent() {
        let codec = codec();
        let other = codec.clone();
        let a = codec.encode("same".into(), "pw".into(), salt());
        let b = other.encode("same".into(), "pw".into(), salt());
        let (a, b) = tokio::join!(a, b);
        assert_ne!(a.unwrap(), b.unwrap());
    }
}

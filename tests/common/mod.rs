//! Shared fixtures for integration tests.

use pagelock::{Codec, DerivationProfile, HashAlgorithm, ProfileChain, Salt};

pub const SALT: &str = "00112233445566778899aabbccddeeff";

pub fn salt() -> Salt {
    Salt::validate(SALT).unwrap()
}

/// Same shape as the standard chain with iteration counts small enough for
/// property tests.
pub fn cheap_chain() -> ProfileChain {
    ProfileChain::new(vec![
        DerivationProfile::new(1, "legacy", HashAlgorithm::Sha1, 2),
        DerivationProfile::new(2, "second", HashAlgorithm::Sha256, 3),
        DerivationProfile::new(3, "third", HashAlgorithm::Sha256, 5),
    ])
    .unwrap()
}

#[allow(dead_code)]
pub fn cheap_codec() -> Codec {
    Codec::new().with_chain(cheap_chain())
}

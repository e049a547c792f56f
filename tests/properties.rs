//! Property tests: round-trip, tamper detection, IV freshness.

mod common;

use pagelock::{AesGcmEngine, Codec, CodecError};
use proptest::prelude::*;

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn roundtrip_any_document(plaintext in any::<String>(), password in "[ -~]{1,40}") {
        let codec = common::cheap_codec();
        let salt = common::salt();
        let wire = codec.encode(&plaintext, &password, &salt).unwrap();
        let key = codec.derive_key(&password, &salt).unwrap();
        let decoded = codec.decode(&wire, &key, &salt).unwrap();
        prop_assert_eq!(decoded.plaintext, plaintext);
    }

    #[test]
    fn roundtrip_any_document_gcm(plaintext in any::<String>()) {
        let codec = Codec::with_engine(AesGcmEngine).with_chain(common::cheap_chain());
        let salt = common::salt();
        let wire = codec.encode(&plaintext, "pw", &salt).unwrap();
        let decoded = codec.decode_with_password(&wire, "pw", &salt).unwrap();
        prop_assert_eq!(decoded.plaintext, plaintext);
    }

    #[test]
    fn any_flipped_bit_is_rejected(
        plaintext in "[a-z<>/ ]{0,64}",
        position in any::<prop::sample::Index>(),
        bit in 0u8..7,
    ) {
        let codec = common::cheap_codec();
        let salt = common::salt();
        let wire = codec.encode(&plaintext, "pw", &salt).unwrap();

        // Flip one of the low seven bits so the text stays ASCII.
        let mut bytes = wire.into_bytes();
        let i = position.index(bytes.len());
        bytes[i] ^= 1 << bit;
        let tampered = String::from_utf8(bytes).unwrap();

        let key = codec.derive_key("pw", &salt).unwrap();
        let result = codec.decode(&tampered, &key, &salt);
        prop_assert!(result.is_err());
        prop_assert!(matches!(
            result,
            Err(CodecError::SignatureMismatch) | Err(CodecError::DecryptionFailure)
        ));
    }
}

#[test]
fn test_same_inputs_give_different_messages() {
    let codec = common::cheap_codec();
    let salt = common::salt();

    let a = codec.encode("<p>same</p>", "pw", &salt).unwrap();
    let b = codec.encode("<p>same</p>", "pw", &salt).unwrap();
    assert_ne!(&a[64..96], &b[64..96], "iv reused");
    assert_ne!(&a[96..], &b[96..]);

    for wire in [&a, &b] {
        assert_eq!(codec.decode_with_password(wire, "pw", &salt).unwrap().plaintext, "<p>same</p>");
    }
}

#[test]
fn test_truncated_message_is_structural() {
    let codec = common::cheap_codec();
    let salt = common::salt();
    let wire = codec.encode("doc", "pw", &salt).unwrap();
    let key = codec.derive_key("pw", &salt).unwrap();

    assert!(matches!(
        codec.decode(&wire[..90], &key, &salt),
        Err(CodecError::MalformedMessage(_))
    ));
}

//! Backward-compatible decode through the profile chain.

mod common;

use chrono::Utc;
use pagelock::keys;
use pagelock::remember::{self, MemoryRememberStore, RememberStore};
use pagelock::{CodecError, DerivedKey};

#[test]
fn test_every_historical_key_opens_current_output() {
    // Remember-me links issued under each past profile keep working.
    let codec = common::cheap_codec();
    let salt = common::salt();
    let wire = codec.encode("<html>doc</html>", "pw", &salt).unwrap();

    let chain = codec.chain().profiles();
    let k1 = keys::derive_initial("pw", &salt, &chain[0]).unwrap();
    let k2 = keys::derive_next_round(&k1, &salt, &chain[1]).unwrap();
    let k3 = keys::derive_next_round(&k2, &salt, &chain[2]).unwrap();

    for (key, expected_attempt) in [(&k3, 0), (&k2, 1), (&k1, 2)] {
        let decoded = codec.decode(&wire, key, &salt).unwrap();
        assert_eq!(decoded.plaintext, "<html>doc</html>");
        assert_eq!(decoded.attempt(), expected_attempt);
        assert_eq!(decoded.key().to_hex().as_str(), k3.to_hex().as_str());
    }
}

#[test]
fn test_message_sealed_with_older_key_opens_with_that_key() {
    let codec = common::cheap_codec();
    let salt = common::salt();
    let chain = codec.chain().profiles();

    let legacy = keys::derive_initial("pw", &salt, &chain[0]).unwrap();
    let wire = codec.encode_with_key("old page", &legacy).unwrap();

    let decoded = codec.decode(&wire, &legacy, &salt).unwrap();
    assert_eq!(decoded.plaintext, "old page");
    assert_eq!(decoded.attempt(), 0);
}

#[test]
fn test_resolver_does_not_over_accept() {
    // A current-profile candidate for a message sealed under the legacy key
    // must not be "upgraded" into acceptance.
    let codec = common::cheap_codec();
    let salt = common::salt();
    let chain = codec.chain().profiles();

    let legacy = keys::derive_initial("pw", &salt, &chain[0]).unwrap();
    let wire = codec.encode_with_key("old page", &legacy).unwrap();

    let current = codec.derive_key("pw", &salt).unwrap();
    assert!(matches!(
        codec.decode(&wire, &current, &salt),
        Err(CodecError::SignatureMismatch)
    ));
}

#[test]
fn test_migrated_decode_upgrades_matching_remembered_key() {
    let codec = common::cheap_codec();
    let salt = common::salt();
    let wire = codec.encode("doc", "pw", &salt).unwrap();
    let legacy = keys::derive_initial("pw", &salt, &codec.chain().profiles()[0]).unwrap();

    let mut store = MemoryRememberStore::new();
    let now = Utc::now();
    remember::remember(&mut store, &legacy, 30, now);
    let expiry = store.load().unwrap().expires_at();

    let decoded = codec.decode(&wire, &legacy, &salt).unwrap();
    assert!(remember::apply_migration(&mut store, &decoded));

    let stored = store.load().unwrap();
    assert_eq!(stored.key_hex(), codec.derive_key("pw", &salt).unwrap().to_hex().as_str());
    assert_eq!(stored.expires_at(), expiry);

    // Next visit needs no migration.
    let again = remember::recall(&mut store, now).unwrap();
    assert_eq!(codec.decode(&wire, &again, &salt).unwrap().attempt(), 0);
}

#[test]
fn test_migration_leaves_unrelated_remembered_key_alone() {
    let codec = common::cheap_codec();
    let salt = common::salt();
    let wire = codec.encode("doc", "pw", &salt).unwrap();
    let legacy = keys::derive_initial("pw", &salt, &codec.chain().profiles()[0]).unwrap();

    let mut store = MemoryRememberStore::new();
    let unrelated = DerivedKey::from_hex(&"ab".repeat(32)).unwrap();
    remember::remember(&mut store, &unrelated, 0, Utc::now());

    let decoded = codec.decode(&wire, &legacy, &salt).unwrap();
    assert!(!remember::apply_migration(&mut store, &decoded));
    assert_eq!(store.load().unwrap().key_hex(), "ab".repeat(32));
}

#[test]
fn test_migration_never_starts_remembering() {
    // A legacy key from a share link that was never stored must not end up
    // in storage as a side effect.
    let codec = common::cheap_codec();
    let salt = common::salt();
    let wire = codec.encode("doc", "pw", &salt).unwrap();
    let legacy = keys::derive_initial("pw", &salt, &codec.chain().profiles()[0]).unwrap();

    let mut store = MemoryRememberStore::new();
    let decoded = codec.decode(&wire, &legacy, &salt).unwrap();
    assert!(!remember::apply_migration(&mut store, &decoded));
    assert!(store.load().is_none());
}

#[test]
fn test_unmigrated_decode_writes_nothing() {
    let codec = common::cheap_codec();
    let salt = common::salt();
    let wire = codec.encode("doc", "pw", &salt).unwrap();
    let current = codec.derive_key("pw", &salt).unwrap();

    let mut store = MemoryRememberStore::new();
    remember::remember(&mut store, &current, 0, Utc::now());
    let decoded = codec.decode(&wire, &current, &salt).unwrap();
    assert!(!decoded.was_migrated());
    assert!(!remember::apply_migration(&mut store, &decoded));
}

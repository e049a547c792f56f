//! Remember-me key storage.
//!
//! A page that remembers its visitor keeps the *derived key* (never the
//! password) in some client-side store, optionally with an expiry. The store
//! itself is pluggable; the browser's localStorage is the main real one.
//!
//! After a decode that needed migration, [`apply_migration`] swaps the
//! stored legacy key for the current one so the upgrade is paid once. It only
//! does so when the stored value is exactly the candidate that was upgraded.

use std::fmt;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::codec::Decoded;
use crate::keys::DerivedKey;

/// A stored remember-me entry.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize, Zeroize, ZeroizeOnDrop)]
#[serde(rename_all = "camelCase")]
pub struct RememberedKey {
    key_hex: String,
    #[zeroize(skip)]
    expires_at: Option<DateTime<Utc>>,
}

impl RememberedKey {
    pub fn new(key: &DerivedKey, expires_at: Option<DateTime<Utc>>) -> Self {
        Self {
            key_hex: key.to_hex().as_str().to_owned(),
            expires_at,
        }
    }

    pub fn key_hex(&self) -> &str {
        &self.key_hex
    }

    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.expires_at
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|at| now >= at)
    }
}

impl fmt::Debug for RememberedKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RememberedKey")
            .field("expires_at", &self.expires_at)
            .finish_non_exhaustive()
    }
}

/// Where remembered keys live. Implement this over localStorage, a keyring,
/// a file, etc.
pub trait RememberStore {
    fn load(&self) -> Option<RememberedKey>;
    fn save(&mut self, entry: RememberedKey);
    fn clear(&mut self);
}

/// A store held in memory. Useful for tests and single-process tools.
#[derive(Debug, Default)]
pub struct MemoryRememberStore {
    entry: Option<RememberedKey>,
}

impl MemoryRememberStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl RememberStore for MemoryRememberStore {
    fn load(&self) -> Option<RememberedKey> {
        self.entry.clone()
    }

    fn save(&mut self, entry: RememberedKey) {
        self.entry = Some(entry);
    }

    fn clear(&mut self) {
        self.entry = None;
    }
}

/// Remember `key`. A duration of 0 days means no expiry, as does one that
/// lands past the last representable date.
pub fn remember<S: RememberStore + ?Sized>(
    store: &mut S,
    key: &DerivedKey,
    duration_days: u32,
    now: DateTime<Utc>,
) {
    let expires_at = if duration_days == 0 {
        None
    } else {
        Duration::try_days(i64::from(duration_days)).and_then(|ttl| now.checked_add_signed(ttl))
    };
    store.save(RememberedKey::new(key, expires_at));
}

/// Return the remembered key, clearing entries that have expired or no
/// longer parse.
pub fn recall<S: RememberStore + ?Sized>(store: &mut S, now: DateTime<Utc>) -> Option<DerivedKey> {
    let entry = store.load()?;
    if entry.is_expired(now) {
        tracing::debug!("remembered key expired");
        store.clear();
        return None;
    }
    match DerivedKey::from_hex(entry.key_hex()) {
        Ok(key) => Some(key),
        Err(_) => {
            tracing::warn!("discarding malformed remembered key");
            store.clear();
            None
        }
    }
}

/// After a migrated decode, replace the stored legacy key with the current
/// one. Returns whether the store was updated.
///
/// Nothing is written unless the stored key is exactly the candidate that
/// was upgraded: a different stored key may be newer, and a key that was
/// never stored must not start being remembered as a side effect.
pub fn apply_migration<S: RememberStore + ?Sized>(store: &mut S, decoded: &Decoded) -> bool {
    let Some(legacy) = decoded.migrated_from() else {
        return false;
    };
    let Some(entry) = store.load() else {
        return false;
    };
    if entry.key_hex() != legacy {
        return false;
    }

    store.save(RememberedKey::new(decoded.key(), entry.expires_at()));
    tracing::info!("upgraded remembered key to current profile");
    true
}

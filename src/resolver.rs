//! Decode migration resolver.
//!
//! A remember-me key embeds whatever profile was current when it was issued.
//! When authentication fails with the key as given, the resolver proposes the
//! same key upgraded as if it had been issued one profile earlier, then two,
//! and so on until the chain runs out.
//!
//! ```text
//! attempt 0: candidate
//! attempt 1: candidate + newest 1 round
//! attempt 2: candidate + newest 2 rounds
//! ...
//! attempt N-1, then exhausted
//! ```
//!
//! Every attempt starts from the original candidate, so a wrong key costs
//! at most `1 + 2 + ... + (N-1)` derivation rounds and never loops.

use crate::crypto::CryptoEngine;
use crate::error::Result;
use crate::keys::DerivedKey;
use crate::profile::ProfileChain;
use crate::salt::Salt;

/// One key proposed by the resolver.
#[derive(Debug)]
pub struct Attempt {
    /// 0 for the candidate as supplied, `k` for `k` upgrade rounds.
    pub index: usize,
    pub key: DerivedKey,
}

/// Lazily yields the keys to try, oldest assumption last. Upgrades are only
/// computed when the previous attempt has been rejected.
pub struct MigrationResolver<'a, E: CryptoEngine + ?Sized> {
    engine: &'a E,
    chain: &'a ProfileChain,
    salt: &'a Salt,
    candidate: &'a DerivedKey,
    next: usize,
}

impl<'a, E: CryptoEngine + ?Sized> MigrationResolver<'a, E> {
    pub fn new(engine: &'a E, chain: &'a ProfileChain, salt: &'a Salt, candidate: &'a DerivedKey) -> Self {
        Self {
            engine,
            chain,
            salt,
            candidate,
            next: 0,
        }
    }

    /// Total number of attempts this resolver will make.
    pub fn max_attempts(&self) -> usize {
        self.chain.len()
    }
}

impl<E: CryptoEngine + ?Sized> Iterator for MigrationResolver<'_, E> {
    type Item = Result<Attempt>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.next >= self.max_attempts() {
            return None;
        }
        let index = self.next;
        self.next += 1;

        let key = if index == 0 {
            Ok(self.candidate.duplicate())
        } else {
            tracing::debug!(attempt = index, "retrying with upgraded candidate");
            self.engine
                .upgrade_key(self.candidate, self.salt, self.chain.newest(index))
        };
        Some(key.map(|key| Attempt { index, key }))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.max_attempts() - self.next;
        (remaining, Some(remaining))
    }
}

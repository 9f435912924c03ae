//! Remote verdict cache
//!
//! In-memory cache keyed by a sha256 of the scanned subject, so repeated
//! shares of the same URL or file skip the network round trip. Bounded size
//! with oldest-first eviction and a TTL.

use std::collections::HashMap;

use once_cell::sync::Lazy;
use parking_lot::RwLock;
use sha2::{Digest, Sha256};

use crate::constants::{CACHE_MAX_SIZE, CACHE_TTL_HOURS};

use super::types::RemoteVerdict;

static CACHE: Lazy<RwLock<VerdictCache>> = Lazy::new(|| RwLock::new(VerdictCache::new()));

struct CachedEntry {
    verdict: RemoteVerdict,
    cached_at: i64,
}

struct VerdictCache {
    entries: HashMap<String, CachedEntry>,
}

impl VerdictCache {
    fn new() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    fn get(&mut self, key: &str) -> Option<RemoteVerdict> {
        let entry = self.entries.get(key)?;

        if Self::expired(entry) {
            // Expired entries are tombstones; reclaim the slot now instead
            // of waiting for size-based eviction
            self.entries.remove(key);
            return None;
        }

        let mut verdict = entry.verdict.clone();
        verdict.is_cached = true;
        Some(verdict)
    }

    fn expired(entry: &CachedEntry) -> bool {
        let age_hours = (chrono::Utc::now().timestamp() - entry.cached_at) / 3600;
        age_hours >= CACHE_TTL_HOURS
    }

    fn put(&mut self, key: String, verdict: RemoteVerdict) {
        // At capacity: sweep expired entries first, then evict oldest tenth
        if self.entries.len() >= CACHE_MAX_SIZE {
            self.entries.retain(|_, e| !Self::expired(e));
        }
        if self.entries.len() >= CACHE_MAX_SIZE {
            let mut by_age: Vec<_> = self
                .entries
                .iter()
                .map(|(k, v)| (k.clone(), v.cached_at))
                .collect();
            by_age.sort_by_key(|&(_, at)| at);

            for (key, _) in by_age.into_iter().take(CACHE_MAX_SIZE / 10) {
                self.entries.remove(&key);
            }
        }

        self.entries.insert(
            key,
            CachedEntry {
                verdict,
                cached_at: chrono::Utc::now().timestamp(),
            },
        );
    }
}

// ============================================================================
// PUBLIC API
// ============================================================================

pub fn get(key: &str) -> Option<RemoteVerdict> {
    CACHE.write().get(key)
}

pub fn put(key: String, verdict: RemoteVerdict) {
    CACHE.write().put(key, verdict);
}

pub fn clear() {
    CACHE.write().entries.clear();
}

/// (current size, max size)
pub fn stats() -> (usize, usize) {
    (CACHE.read().entries.len(), CACHE_MAX_SIZE)
}

/// Cache key for a URL subject
pub fn key_for_url(raw_url: &str) -> String {
    key_for_bytes(raw_url.as_bytes())
}

/// Cache key for a file/image subject
pub fn key_for_bytes(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}

// ============================================================================
// TESTS
// ============================================================================

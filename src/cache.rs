//! TTL verdict cache for the scam-radar server.
//!
//! Caches `Verdict` results keyed by a digest of the target address and the
//! exact input bytes, so repeated submissions of the same history skip the
//! extraction and scoring pipeline.

use std::sync::Arc;
use std::time::Duration;

use moka::sync::Cache;
use sha2::{Digest, Sha256};

use crate::verdict::Verdict;

/// Cache for analysis results.
#[derive(Clone)]
pub struct VerdictCache {
    inner: Arc<Cache<String, Verdict>>,
}

impl VerdictCache {
    /// Create a new verdict cache with the given TTL and max entries.
    pub fn new(ttl_seconds: u64, max_entries: u64) -> Self {
        let cache = Cache::builder()
            .max_capacity(max_entries)
            .time_to_live(Duration::from_secs(ttl_seconds))
            .build();

        Self {
            inner: Arc::new(cache),
        }
    }

    /// Build a cache key from the address and canonical input bytes.
    pub fn key(address: &str, input: &[u8]) -> String {
        let mut hasher = Sha256::new();
        hasher.update(address.to_lowercase().as_bytes());
        hasher.update([0u8]);
        hasher.update(input);
        hex::encode(hasher.finalize())
    }

    /// Get a cached verdict, counting the hit or miss.
    pub fn get(&self, key: &str) -> Option<Verdict> {
        let found = self.inner.get(key);
        if found.is_some() {
            crate::metrics::record_cache_hit();
        } else {
            crate::metrics::record_cache_miss();
        }
        found
    }

    /// Insert a verdict into the cache.
    pub fn insert(&self, key: String, verdict: Verdict) {
        self.inner.insert(key, verdict);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::FeatureSnapshot;

    #[test]
    fn test_key_folds_address_case() {
        assert_eq!(
            VerdictCache::key("0xABC", b"[]"),
            VerdictCache::key("0xabc", b"[]")
        );
        assert_ne!(
            VerdictCache::key("0xabc", b"[]"),
            VerdictCache::key("0xabc", b"[{}]")
        );
    }

    #[test]
    fn test_insert_then_get() {
        let cache = VerdictCache::new(60, 10);
        let key = VerdictCache::key("0xabc", b"input");
        assert!(cache.get(&key).is_none());

        let verdict =
            Verdict::from_prediction("0xabc".into(), 0.2, &[], FeatureSnapshot::zeros());
        cache.insert(key.clone(), verdict.clone());
        assert_eq!(cache.get(&key), Some(verdict));
    }
}

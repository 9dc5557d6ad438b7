//! Result cache
//!
//! Fingerprint-keyed cache of finished generation results. Eviction is
//! lazy: a stale entry is dropped when touched, and `evict_expired` sweeps
//! the rest opportunistically after successful generations.

use std::time::{Duration, Instant};

use dashmap::DashMap;
use tracing::debug;

use crate::coordinator::GenerationResult;

pub struct ResultCache {
    entries: DashMap<String, (GenerationResult, Instant)>,
    ttl: Duration,
}

impl ResultCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: DashMap::new(),
            ttl,
        }
    }

    /// Cached result for the fingerprint, dropping it first when stale
    pub fn get(&self, fingerprint: &str) -> Option<GenerationResult> {
        let stale = match self.entries.get(fingerprint) {
            Some(entry) => entry.value().1.elapsed() >= self.ttl,
            None => return None,
        };
        if stale {
            self.entries.remove(fingerprint);
            debug!(fingerprint, "evicted stale result");
            return None;
        }
        self.entries
            .get(fingerprint)
            .map(|entry| entry.value().0.clone())
    }

    pub fn put(&self, fingerprint: impl Into<String>, result: GenerationResult) {
        self.entries
            .insert(fingerprint.into(), (result, Instant::now()));
    }

    /// Sweep every expired entry
    pub fn evict_expired(&self) {
        self.entries
            .retain(|_, (_, stored)| stored.elapsed() < self.ttl);
    }

    pub fn clear(&self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result_with_timestamp(timestamp: u64) -> GenerationResult {
        GenerationResult {
            timestamp,
            ..GenerationResult::default()
        }
    }

    #[test]
    fn test_hit_returns_stored_result() {
        let cache = ResultCache::new(Duration::from_secs(10));
        cache.put("fp", result_with_timestamp(42));
        assert_eq!(cache.get("fp").unwrap().timestamp, 42);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_stale_entry_dropped_on_touch() {
        let cache = ResultCache::new(Duration::from_millis(0));
        cache.put("fp", result_with_timestamp(1));
        assert!(cache.get("fp").is_none());
        assert!(cache.is_empty());
    }

    #[test]
    fn test_evict_expired_sweeps_all() {
        let cache = ResultCache::new(Duration::from_millis(0));
        cache.put("a", result_with_timestamp(1));
        cache.put("b", result_with_timestamp(2));
        cache.evict_expired();
        assert!(cache.is_empty());
    }
}

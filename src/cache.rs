//! Time-boxed response cache shared by every client request
//!
//! Entries are keyed by endpoint plus sorted query parameters and hold the raw
//! JSON payload. An entry is only served while it is younger than the TTL;
//! expired entries stay in the map until overwritten or cleared.

use crate::constants::CACHE_TTL_SECS;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};
use std::time::Duration;
use tokio::time::Instant;

/// A single query parameter as sent to the provider
pub type QueryParam = (&'static str, String);

/// Function building the cache key for a request
pub type KeyFn = fn(&str, &[QueryParam]) -> CacheKey;

/// Canonical request identity: `endpoint?k1=v1&k2=v2` with keys sorted
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CacheKey(String);

impl CacheKey {
    /// Builds the key from the endpoint and its parameters sorted by name
    pub fn canonical(endpoint: &str, params: &[QueryParam]) -> Self {
        if params.is_empty() {
            return Self(endpoint.to_string());
        }

        let mut sorted: Vec<&QueryParam> = params.iter().collect();
        sorted.sort();
        let query = sorted
            .iter()
            .map(|(k, v)| format!("{}={}", k, v))
            .collect::<Vec<_>>()
            .join("&");

        Self(format!("{}?{}", endpoint, query))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for CacheKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Cache configuration
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// How long an entry stays valid
    pub ttl: Duration,
    /// Key builder
    pub key_fn: KeyFn,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl: Duration::from_secs(CACHE_TTL_SECS),
            key_fn: CacheKey::canonical,
        }
    }
}

#[derive(Debug, Clone)]
struct CacheEntry {
    payload: Value,
    captured_at: Instant,
}

/// Entry counts at a point in time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CacheStats {
    pub total_entries: usize,
    pub valid_entries: usize,
    pub expired_entries: usize,
}

/// Response cache
pub struct ResponseCache {
    config: CacheConfig,
    entries: RwLock<HashMap<CacheKey, CacheEntry>>,
}

impl ResponseCache {
    /// Creates an empty cache
    pub fn new(config: CacheConfig) -> Self {
        Self {
            config,
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// Creates an empty cache with the default key function and `ttl`
    pub fn with_ttl(ttl: Duration) -> Self {
        Self::new(CacheConfig {
            ttl,
            ..CacheConfig::default()
        })
    }

    pub fn ttl(&self) -> Duration {
        self.config.ttl
    }

    /// Key for a request, built with the configured key function
    pub fn key(&self, endpoint: &str, params: &[QueryParam]) -> CacheKey {
        (self.config.key_fn)(endpoint, params)
    }

    fn is_fresh(&self, entry: &CacheEntry, now: Instant) -> bool {
        now.saturating_duration_since(entry.captured_at) < self.config.ttl
    }

    /// Returns the payload if a non-expired entry exists
    pub fn get(&self, key: &CacheKey) -> Option<Value> {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        let entry = entries.get(key)?;
        if self.is_fresh(entry, Instant::now()) {
            Some(entry.payload.clone())
        } else {
            None
        }
    }

    /// Stores a payload, replacing any previous entry for the key
    pub fn insert(&self, key: CacheKey, payload: Value) {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        entries.insert(
            key,
            CacheEntry {
                payload,
                captured_at: Instant::now(),
            },
        );
    }

    /// Drops every entry
    pub fn clear(&self) {
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    pub fn stats(&self) -> CacheStats {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        let now = Instant::now();
        let valid_entries = entries.values().filter(|e| self.is_fresh(e, now)).count();

        CacheStats {
            total_entries: entries.len(),
            valid_entries,
            expired_entries: entries.len() - valid_entries,
        }
    }
}

impl Default for ResponseCache {
    fn default() -> Self {
        Self::new(CacheConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn params(pairs: &[(&'static str, &str)]) -> Vec<QueryParam> {
        pairs.iter().map(|(k, v)| (*k, v.to_string())).collect()
    }

    #[test]
    fn test_key_is_sorted_by_parameter_name() {
        let a = CacheKey::canonical("/coins/markets", &params(&[("page", "1"), ("order", "x")]));
        let b = CacheKey::canonical("/coins/markets", &params(&[("order", "x"), ("page", "1")]));
        assert_eq!(a, b);
        assert_eq!(a.as_str(), "/coins/markets?order=x&page=1");
        assert_eq!(CacheKey::canonical("/search/trending", &[]).as_str(), "/search/trending");
    }

    #[tokio::test(start_paused = true)]
    async fn test_entry_expires_after_ttl() {
        let cache = ResponseCache::with_ttl(Duration::from_secs(60));
        let key = cache.key("/search", &params(&[("query", "btc")]));
        cache.insert(key.clone(), json!({"coins": []}));

        tokio::time::advance(Duration::from_secs(59)).await;
        assert_eq!(cache.get(&key), Some(json!({"coins": []})));

        tokio::time::advance(Duration::from_secs(1)).await;
        assert_eq!(cache.get(&key), None);

        let stats = cache.stats();
        assert_eq!(stats.total_entries, 1);
        assert_eq!(stats.valid_entries, 0);
        assert_eq!(stats.expired_entries, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_insert_overwrites_and_refreshes_capture_time() {
        let cache = ResponseCache::with_ttl(Duration::from_secs(60));
        let key = CacheKey::canonical("/coins/bitcoin", &[]);
        cache.insert(key.clone(), json!(1));

        tokio::time::advance(Duration::from_secs(50)).await;
        cache.insert(key.clone(), json!(2));

        tokio::time::advance(Duration::from_secs(30)).await;
        assert_eq!(cache.get(&key), Some(json!(2)));
    }

    #[test]
    fn test_clear() {
        let cache = ResponseCache::default();
        cache.insert(CacheKey::canonical("/a", &[]), json!(1));
        cache.insert(CacheKey::canonical("/b", &[]), json!(2));
        assert_eq!(cache.stats().valid_entries, 2);

        cache.clear();
        assert_eq!(cache.stats(), CacheStats::default());
    }

    #[test]
    fn test_custom_key_function() {
        fn endpoint_only(endpoint: &str, _params: &[QueryParam]) -> CacheKey {
            CacheKey::canonical(endpoint, &[])
        }

        let cache = ResponseCache::new(CacheConfig {
            ttl: Duration::from_secs(60),
            key_fn: endpoint_only,
        });
        let a = cache.key("/search", &params(&[("query", "eth")]));
        let b = cache.key("/search", &params(&[("query", "btc")]));
        assert_eq!(a, b);
    }
}

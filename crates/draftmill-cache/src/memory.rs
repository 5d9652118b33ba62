// SPDX-FileCopyrightText: 2026 Draftmill Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Process-local L1 tier backed by a concurrent map.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use dashmap::DashMap;
use tracing::debug;

use draftmill_core::error::DraftmillError;
use draftmill_core::types::{CacheTier, ContentResponse};

use crate::layer::{CacheLayer, CachedEntry};

struct MemoryEntry {
    response: ContentResponse,
    expires_at: Instant,
}

/// Volatile in-process tier. Entries survive neither restarts nor
/// deploys, which is exactly what the short L1 TTL expects.
pub struct MemoryLayer {
    entries: DashMap<String, MemoryEntry>,
    max_entries: usize,
}

impl MemoryLayer {
    pub fn new(max_entries: usize) -> Self {
        Self {
            entries: DashMap::new(),
            max_entries,
        }
    }

    /// Number of stored entries, counting expired ones not yet swept.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Makes room for one more entry when the map is at capacity:
    /// expired entries go first, then the entry closest to expiry.
    fn evict_for_insert(&self) {
        if self.entries.len() < self.max_entries {
            return;
        }
        let now = Instant::now();
        self.entries.retain(|_, entry| entry.expires_at > now);
        while self.entries.len() >= self.max_entries {
            let victim = self
                .entries
                .iter()
                .min_by_key(|entry| entry.value().expires_at)
                .map(|entry| entry.key().clone());
            match victim {
                Some(key) => {
                    self.entries.remove(&key);
                    debug!(key = key.as_str(), "evicted entry closest to expiry");
                }
                None => break,
            }
        }
    }
}

#[async_trait]
impl CacheLayer for MemoryLayer {
    fn name(&self) -> &str {
        "memory"
    }

    fn tier(&self) -> CacheTier {
        CacheTier::L1
    }

    async fn get(&self, key: &str) -> Result<Option<CachedEntry>, DraftmillError> {
        let expired = {
            let Some(entry) = self.entries.get(key) else {
                return Ok(None);
            };
            let now = Instant::now();
            if entry.expires_at > now {
                return Ok(Some(CachedEntry {
                    response: entry.response.clone(),
                    remaining_ttl: entry.expires_at - now,
                }));
            }
            true
        };
        // Read lock released above; expired entries are dropped lazily.
        if expired {
            self.entries.remove(key);
        }
        Ok(None)
    }

    async fn set(
        &self,
        key: &str,
        response: &ContentResponse,
        ttl: Duration,
    ) -> Result<(), DraftmillError> {
        if !self.entries.contains_key(key) {
            self.evict_for_insert();
        }
        self.entries.insert(
            key.to_string(),
            MemoryEntry {
                response: response.clone(),
                expires_at: Instant::now() + ttl,
            },
        );
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), DraftmillError> {
        self.entries.remove(key);
        Ok(())
    }

    async fn purge_expired(&self) -> Result<u64, DraftmillError> {
        let now = Instant::now();
        let before = self.entries.len();
        self.entries.retain(|_, entry| entry.expires_at > now);
        Ok(before.saturating_sub(self.entries.len()) as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use draftmill_test_utils::fixtures::sample_response;

    #[tokio::test]
    async fn set_then_get_returns_value() {
        let layer = MemoryLayer::new(16);
        let response = sample_response("hello");

        layer
            .set("key-1", &response, Duration::from_secs(60))
            .await
            .unwrap();
        let entry = layer.get("key-1").await.unwrap().unwrap();
        assert_eq!(entry.response, response);
        assert!(entry.remaining_ttl <= Duration::from_secs(60));
        assert!(entry.remaining_ttl > Duration::from_secs(58));
    }

    #[tokio::test]
    async fn expired_entry_reads_as_miss() {
        let layer = MemoryLayer::new(16);
        layer
            .set("key-1", &sample_response("x"), Duration::from_millis(10))
            .await
            .unwrap();
        tokio::time::sleep(Duration::from_millis(30)).await;
        assert!(layer.get("key-1").await.unwrap().is_none());
        // Lazy expiry also dropped the entry.
        assert!(layer.is_empty());
    }

    #[tokio::test]
    async fn overwrite_supersedes_previous_value() {
        let layer = MemoryLayer::new(16);
        layer
            .set("key-1", &sample_response("old"), Duration::from_secs(60))
            .await
            .unwrap();
        layer
            .set("key-1", &sample_response("new"), Duration::from_secs(60))
            .await
            .unwrap();

        let entry = layer.get("key-1").await.unwrap().unwrap();
        assert!(entry.response.variants.short.contains("new"));
        assert_eq!(layer.len(), 1);
    }

    #[tokio::test]
    async fn purge_expired_counts_removed() {
        let layer = MemoryLayer::new(16);
        layer
            .set("stale", &sample_response("a"), Duration::from_millis(5))
            .await
            .unwrap();
        layer
            .set("fresh", &sample_response("b"), Duration::from_secs(60))
            .await
            .unwrap();
        tokio::time::sleep(Duration::from_millis(25)).await;

        let removed = layer.purge_expired().await.unwrap();
        assert_eq!(removed, 1);
        assert_eq!(layer.len(), 1);
        assert!(layer.get("fresh").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn capacity_evicts_entry_closest_to_expiry() {
        let layer = MemoryLayer::new(2);
        layer
            .set("soon", &sample_response("a"), Duration::from_secs(10))
            .await
            .unwrap();
        layer
            .set("later", &sample_response("b"), Duration::from_secs(100))
            .await
            .unwrap();
        layer
            .set("newest", &sample_response("c"), Duration::from_secs(50))
            .await
            .unwrap();

        assert_eq!(layer.len(), 2);
        assert!(layer.get("soon").await.unwrap().is_none());
        assert!(layer.get("later").await.unwrap().is_some());
        assert!(layer.get("newest").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn remove_drops_key() {
        let layer = MemoryLayer::new(16);
        layer
            .set("key-1", &sample_response("x"), Duration::from_secs(60))
            .await
            .unwrap();
        layer.remove("key-1").await.unwrap();
        assert!(layer.get("key-1").await.unwrap().is_none());
    }
}

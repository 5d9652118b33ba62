// SPDX-FileCopyrightText: 2026 Draftmill Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The tiered cache facade.
//!
//! Reads walk the layers fastest-first and promote hits forward; writes
//! land in exactly one tier chosen by [`crate::strategy::CacheStrategy`].
//! Read failures and timeouts degrade to misses so a broken tier slows
//! requests down instead of failing them.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, warn};

use draftmill_core::error::DraftmillError;
use draftmill_core::types::{CacheTier, ContentResponse};

use crate::layer::CacheLayer;

/// A successful cache lookup and the tier that answered it.
#[derive(Debug, Clone)]
pub struct CacheHit {
    pub response: ContentResponse,
    pub tier: CacheTier,
}

/// Multi-tier cache over an ordered list of layers, fastest first.
pub struct MultiLayerCache {
    layers: Vec<Arc<dyn CacheLayer>>,
    op_timeout: Duration,
}

impl MultiLayerCache {
    /// Builds the cache over `layers`, which must be ordered fastest
    /// first. Every layer operation is bounded by `op_timeout`.
    pub fn new(layers: Vec<Arc<dyn CacheLayer>>, op_timeout: Duration) -> Self {
        Self { layers, op_timeout }
    }

    /// Looks up `key` tier by tier.
    ///
    /// A hit in a slower tier is promoted into every faster tier with
    /// the entry's remaining TTL. Layer errors and timeouts read as
    /// misses for that layer only.
    pub async fn get(&self, key: &str) -> Option<CacheHit> {
        for (index, layer) in self.layers.iter().enumerate() {
            match tokio::time::timeout(self.op_timeout, layer.get(key)).await {
                Ok(Ok(Some(entry))) => {
                    if !entry.remaining_ttl.is_zero() {
                        self.promote(key, &entry.response, entry.remaining_ttl, index)
                            .await;
                    }
                    debug!(layer = layer.name(), "cache hit");
                    return Some(CacheHit {
                        response: entry.response,
                        tier: layer.tier(),
                    });
                }
                Ok(Ok(None)) => {}
                Ok(Err(e)) => {
                    warn!(layer = layer.name(), error = %e, "cache read failed, treating as miss");
                }
                Err(_) => {
                    warn!(
                        layer = layer.name(),
                        timeout_ms = self.op_timeout.as_millis() as u64,
                        "cache read timed out, treating as miss"
                    );
                }
            }
        }
        None
    }

    /// Copies a hit into every layer faster than the one that answered.
    async fn promote(&self, key: &str, response: &ContentResponse, ttl: Duration, hit_index: usize) {
        for faster in &self.layers[..hit_index] {
            match tokio::time::timeout(self.op_timeout, faster.set(key, response, ttl)).await {
                Ok(Ok(())) => {
                    debug!(layer = faster.name(), "promoted cache entry");
                }
                Ok(Err(e)) => {
                    warn!(layer = faster.name(), error = %e, "cache promotion failed");
                }
                Err(_) => {
                    warn!(layer = faster.name(), "cache promotion timed out");
                }
            }
        }
    }

    /// Writes a fresh value into the layer serving `tier` only.
    pub async fn set(
        &self,
        key: &str,
        response: &ContentResponse,
        ttl: Duration,
        tier: CacheTier,
    ) -> Result<(), DraftmillError> {
        let layer = self
            .layers
            .iter()
            .find(|layer| layer.tier() == tier)
            .ok_or_else(|| DraftmillError::Internal(format!("no cache layer serves tier {tier}")))?;
        tokio::time::timeout(self.op_timeout, layer.set(key, response, ttl))
            .await
            .map_err(|_| DraftmillError::Timeout {
                duration: self.op_timeout,
            })?
    }

    /// Drops `key` from every layer. All layers are attempted; the
    /// first failure is reported after the sweep completes.
    pub async fn remove(&self, key: &str) -> Result<(), DraftmillError> {
        let mut first_failure = None;
        for layer in &self.layers {
            let outcome = tokio::time::timeout(self.op_timeout, layer.remove(key))
                .await
                .unwrap_or(Err(DraftmillError::Timeout {
                    duration: self.op_timeout,
                }));
            if let Err(e) = outcome {
                warn!(layer = layer.name(), error = %e, "cache invalidation failed");
                first_failure.get_or_insert(e);
            }
        }
        match first_failure {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    /// Purges expired entries from every layer, returning the total
    /// removed. Layer failures are logged and skipped.
    pub async fn purge_expired(&self) -> u64 {
        let mut removed = 0;
        for layer in &self.layers {
            match tokio::time::timeout(self.op_timeout, layer.purge_expired()).await {
                Ok(Ok(count)) => removed += count,
                Ok(Err(e)) => {
                    warn!(layer = layer.name(), error = %e, "cache sweep failed for layer");
                }
                Err(_) => {
                    warn!(layer = layer.name(), "cache sweep timed out for layer");
                }
            }
        }
        removed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryLayer;
    use crate::sqlite::SqliteLayer;
    use draftmill_storage::Database;
    use draftmill_test_utils::fixtures::sample_response;

    const OP_TIMEOUT: Duration = Duration::from_secs(4);

    struct Tiers {
        cache: MultiLayerCache,
        l1: Arc<MemoryLayer>,
        l2: Arc<SqliteLayer>,
        l3: Arc<SqliteLayer>,
    }

    async fn three_tiers() -> Tiers {
        let db = Database::open_in_memory().await.unwrap();
        let conn = db.connection().clone();
        let l1 = Arc::new(MemoryLayer::new(64));
        let l2 = Arc::new(SqliteLayer::shared(conn.clone()));
        let l3 = Arc::new(SqliteLayer::durable(conn));
        let cache = MultiLayerCache::new(
            vec![l1.clone(), l2.clone(), l3.clone()],
            OP_TIMEOUT,
        );
        Tiers { cache, l1, l2, l3 }
    }

    #[tokio::test]
    async fn miss_everywhere_returns_none() {
        let tiers = three_tiers().await;
        assert!(tiers.cache.get("absent").await.is_none());
    }

    #[tokio::test]
    async fn set_writes_only_the_chosen_tier() {
        let tiers = three_tiers().await;
        let response = sample_response("l2-only");

        tiers
            .cache
            .set("key-1", &response, Duration::from_secs(600), CacheTier::L2)
            .await
            .unwrap();

        assert!(tiers.l1.get("key-1").await.unwrap().is_none());
        assert!(tiers.l2.get("key-1").await.unwrap().is_some());
        assert!(tiers.l3.get("key-1").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn durable_hit_promotes_into_faster_tiers() {
        let tiers = three_tiers().await;
        let response = sample_response("promoted");

        tiers
            .cache
            .set("key-1", &response, Duration::from_secs(600), CacheTier::L3)
            .await
            .unwrap();

        let hit = tiers.cache.get("key-1").await.unwrap();
        assert_eq!(hit.tier, CacheTier::L3);
        assert_eq!(hit.response, response);

        let l1_entry = tiers.l1.get("key-1").await.unwrap().unwrap();
        let l2_entry = tiers.l2.get("key-1").await.unwrap().unwrap();
        // Promotion carries the remaining TTL, not a fresh one.
        assert!(l1_entry.remaining_ttl <= Duration::from_secs(600));
        assert!(l2_entry.remaining_ttl <= Duration::from_secs(600));

        // The next read answers from the fastest tier.
        let second = tiers.cache.get("key-1").await.unwrap();
        assert_eq!(second.tier, CacheTier::L1);
    }

    #[tokio::test]
    async fn remove_clears_every_tier() {
        let tiers = three_tiers().await;
        let response = sample_response("gone");

        tiers
            .cache
            .set("key-1", &response, Duration::from_secs(600), CacheTier::L3)
            .await
            .unwrap();
        // Promote into all tiers first.
        tiers.cache.get("key-1").await.unwrap();

        tiers.cache.remove("key-1").await.unwrap();
        assert!(tiers.cache.get("key-1").await.is_none());
    }

    #[tokio::test]
    async fn purge_expired_sums_across_layers() {
        let tiers = three_tiers().await;
        tiers
            .cache
            .set("a", &sample_response("a"), Duration::from_millis(5), CacheTier::L1)
            .await
            .unwrap();
        tiers
            .cache
            .set("b", &sample_response("b"), Duration::from_millis(5), CacheTier::L2)
            .await
            .unwrap();
        tiers
            .cache
            .set("c", &sample_response("c"), Duration::from_secs(600), CacheTier::L3)
            .await
            .unwrap();
        tokio::time::sleep(Duration::from_millis(30)).await;

        assert_eq!(tiers.cache.purge_expired().await, 2);
        assert!(tiers.cache.get("c").await.is_some());
    }

    #[tokio::test]
    async fn set_to_unserved_tier_errors() {
        let l1: Arc<dyn CacheLayer> = Arc::new(MemoryLayer::new(4));
        let cache = MultiLayerCache::new(vec![l1], OP_TIMEOUT);
        let err = cache
            .set("k", &sample_response("x"), Duration::from_secs(1), CacheTier::L3)
            .await
            .unwrap_err();
        assert!(matches!(err, DraftmillError::Internal(_)));
    }
}

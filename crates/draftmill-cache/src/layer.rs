// SPDX-FileCopyrightText: 2026 Draftmill Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Cache layer abstraction shared by the memory and SQLite tiers.

use std::time::Duration;

use async_trait::async_trait;

use draftmill_core::error::DraftmillError;
use draftmill_core::types::{CacheTier, ContentResponse};

/// A value read back from a layer, with the lifetime it has left.
///
/// Promotions reuse `remaining_ttl` so a value never outlives its
/// original deadline by moving tiers.
#[derive(Debug, Clone)]
pub struct CachedEntry {
    pub response: ContentResponse,
    pub remaining_ttl: Duration,
}

/// One tier of the response cache.
#[async_trait]
pub trait CacheLayer: Send + Sync {
    /// Short identifier used in logs.
    fn name(&self) -> &str;

    /// The tier this layer serves.
    fn tier(&self) -> CacheTier;

    /// Looks up a key. Expired entries read as misses.
    async fn get(&self, key: &str) -> Result<Option<CachedEntry>, DraftmillError>;

    /// Stores a value under `key` for `ttl`, overwriting any previous
    /// entry for the key.
    async fn set(
        &self,
        key: &str,
        response: &ContentResponse,
        ttl: Duration,
    ) -> Result<(), DraftmillError>;

    /// Drops a key if present.
    async fn remove(&self, key: &str) -> Result<(), DraftmillError>;

    /// Deletes expired entries, returning how many were removed.
    async fn purge_expired(&self) -> Result<u64, DraftmillError>;
}

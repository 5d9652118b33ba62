// SPDX-FileCopyrightText: 2026 Draftmill Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite-backed cache tiers.
//!
//! The shared L2 table and the durable L3 table are the same layer code
//! pointed at different tables; the tier split is policy (TTL and what
//! gets written where), not mechanism.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rusqlite::OptionalExtension;
use tokio_rusqlite::Connection;

use draftmill_core::error::DraftmillError;
use draftmill_core::types::{CacheTier, ContentResponse};

use crate::layer::{CacheLayer, CachedEntry};

/// Timestamp layout stored in `expires_at`. Lexicographic order matches
/// chronological order, so SQL can compare strings directly.
const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3fZ";

fn storage_err(e: tokio_rusqlite::Error) -> DraftmillError {
    DraftmillError::Storage {
        source: Box::new(e),
    }
}

fn encode_err(e: serde_json::Error) -> DraftmillError {
    DraftmillError::Storage {
        source: Box::new(e),
    }
}

/// Absolute expiry timestamp for an entry stored now with `ttl` left.
fn expiry_timestamp(ttl: Duration) -> String {
    let millis = i64::try_from(ttl.as_millis()).unwrap_or(i64::MAX);
    let expires = Utc::now()
        .checked_add_signed(chrono::Duration::milliseconds(millis))
        .unwrap_or(DateTime::<Utc>::MAX_UTC);
    expires.format(TIMESTAMP_FORMAT).to_string()
}

/// Time left until `expires_at`; zero when already past or unparseable.
fn remaining_ttl(expires_at: &str) -> Duration {
    DateTime::parse_from_rfc3339(expires_at)
        .map(|expires| {
            (expires.with_timezone(&Utc) - Utc::now())
                .to_std()
                .unwrap_or(Duration::ZERO)
        })
        .unwrap_or(Duration::ZERO)
}

/// Cache tier persisted in a SQLite table.
///
/// Values are serialized responses; expired rows are filtered out on
/// read and deleted by the sweeper.
#[derive(Clone)]
pub struct SqliteLayer {
    conn: Connection,
    table: &'static str,
    tier: CacheTier,
    name: &'static str,
}

impl SqliteLayer {
    /// The shared L2 tier over the `cache_shared` table.
    pub fn shared(conn: Connection) -> Self {
        Self {
            conn,
            table: "cache_shared",
            tier: CacheTier::L2,
            name: "sqlite-shared",
        }
    }

    /// The durable L3 tier over the `cache_durable` table.
    pub fn durable(conn: Connection) -> Self {
        Self {
            conn,
            table: "cache_durable",
            tier: CacheTier::L3,
            name: "sqlite-durable",
        }
    }
}

#[async_trait]
impl CacheLayer for SqliteLayer {
    fn name(&self) -> &str {
        self.name
    }

    fn tier(&self) -> CacheTier {
        self.tier
    }

    async fn get(&self, key: &str) -> Result<Option<CachedEntry>, DraftmillError> {
        let key = key.to_string();
        let table = self.table;
        let row = self
            .conn
            .call(move |conn| -> Result<Option<(String, String)>, rusqlite::Error> {
                let mut stmt = conn.prepare(&format!(
                    "SELECT value, expires_at FROM {table} \
                     WHERE key = ?1 AND expires_at > strftime('%Y-%m-%dT%H:%M:%fZ', 'now')"
                ))?;
                stmt.query_row(rusqlite::params![key], |row| {
                    Ok((row.get(0)?, row.get(1)?))
                })
                .optional()
            })
            .await
            .map_err(storage_err)?;

        let Some((value, expires_at)) = row else {
            return Ok(None);
        };
        let response: ContentResponse = serde_json::from_str(&value).map_err(encode_err)?;
        Ok(Some(CachedEntry {
            response,
            remaining_ttl: remaining_ttl(&expires_at),
        }))
    }

    async fn set(
        &self,
        key: &str,
        response: &ContentResponse,
        ttl: Duration,
    ) -> Result<(), DraftmillError> {
        let key = key.to_string();
        let value = serde_json::to_string(response).map_err(encode_err)?;
        let expires_at = expiry_timestamp(ttl);
        let table = self.table;
        self.conn
            .call(move |conn| -> Result<(), rusqlite::Error> {
                conn.execute(
                    &format!(
                        "INSERT INTO {table} (key, value, expires_at) VALUES (?1, ?2, ?3) \
                         ON CONFLICT(key) DO UPDATE SET \
                           value = excluded.value, \
                           expires_at = excluded.expires_at, \
                           created_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')"
                    ),
                    rusqlite::params![key, value, expires_at],
                )?;
                Ok(())
            })
            .await
            .map_err(storage_err)
    }

    async fn remove(&self, key: &str) -> Result<(), DraftmillError> {
        let key = key.to_string();
        let table = self.table;
        self.conn
            .call(move |conn| -> Result<(), rusqlite::Error> {
                conn.execute(&format!("DELETE FROM {table} WHERE key = ?1"), [key])?;
                Ok(())
            })
            .await
            .map_err(storage_err)
    }

    async fn purge_expired(&self) -> Result<u64, DraftmillError> {
        let table = self.table;
        self.conn
            .call(move |conn| -> Result<u64, rusqlite::Error> {
                let removed = conn.execute(
                    &format!(
                        "DELETE FROM {table} \
                         WHERE expires_at <= strftime('%Y-%m-%dT%H:%M:%fZ', 'now')"
                    ),
                    [],
                )?;
                Ok(removed as u64)
            })
            .await
            .map_err(storage_err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use draftmill_storage::Database;
    use draftmill_test_utils::fixtures::sample_response;

    async fn test_layers() -> (SqliteLayer, SqliteLayer) {
        let db = Database::open_in_memory().await.unwrap();
        let conn = db.connection().clone();
        (SqliteLayer::shared(conn.clone()), SqliteLayer::durable(conn))
    }

    #[tokio::test]
    async fn set_then_get_round_trips_response() {
        let (shared, _) = test_layers().await;
        let response = sample_response("persisted");

        shared
            .set("key-1", &response, Duration::from_secs(3600))
            .await
            .unwrap();
        let entry = shared.get("key-1").await.unwrap().unwrap();
        assert_eq!(entry.response, response);
        assert!(entry.remaining_ttl > Duration::from_secs(3500));
    }

    #[tokio::test]
    async fn tables_are_independent() {
        let (shared, durable) = test_layers().await;
        shared
            .set("key-1", &sample_response("l2"), Duration::from_secs(60))
            .await
            .unwrap();

        assert!(shared.get("key-1").await.unwrap().is_some());
        assert!(durable.get("key-1").await.unwrap().is_none());
        assert_eq!(shared.tier(), CacheTier::L2);
        assert_eq!(durable.tier(), CacheTier::L3);
    }

    #[tokio::test]
    async fn expired_row_reads_as_miss() {
        let (shared, _) = test_layers().await;
        shared
            .set("key-1", &sample_response("x"), Duration::from_millis(5))
            .await
            .unwrap();
        tokio::time::sleep(Duration::from_millis(30)).await;
        assert!(shared.get("key-1").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn overwrite_supersedes_previous_value() {
        let (_, durable) = test_layers().await;
        durable
            .set("key-1", &sample_response("old"), Duration::from_secs(60))
            .await
            .unwrap();
        durable
            .set("key-1", &sample_response("new"), Duration::from_secs(60))
            .await
            .unwrap();

        let entry = durable.get("key-1").await.unwrap().unwrap();
        assert!(entry.response.variants.short.contains("new"));
    }

    #[tokio::test]
    async fn purge_expired_deletes_only_stale_rows() {
        let (shared, _) = test_layers().await;
        shared
            .set("stale", &sample_response("a"), Duration::from_millis(5))
            .await
            .unwrap();
        shared
            .set("fresh", &sample_response("b"), Duration::from_secs(3600))
            .await
            .unwrap();
        tokio::time::sleep(Duration::from_millis(30)).await;

        let removed = shared.purge_expired().await.unwrap();
        assert_eq!(removed, 1);
        assert!(shared.get("fresh").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn remove_drops_key() {
        let (shared, _) = test_layers().await;
        shared
            .set("key-1", &sample_response("x"), Duration::from_secs(60))
            .await
            .unwrap();
        shared.remove("key-1").await.unwrap();
        assert!(shared.get("key-1").await.unwrap().is_none());
    }

    #[test]
    fn expiry_timestamp_is_sortable_and_parseable() {
        let near = expiry_timestamp(Duration::from_secs(60));
        let far = expiry_timestamp(Duration::from_secs(3600));
        assert!(near < far, "string order must match time order");
        assert!(remaining_ttl(&far) > Duration::from_secs(3500));
    }

    #[test]
    fn remaining_ttl_is_zero_for_garbage() {
        assert_eq!(remaining_ttl("not a timestamp"), Duration::ZERO);
        assert_eq!(remaining_ttl("2020-01-01T00:00:00.000Z"), Duration::ZERO);
    }
}

// SPDX-FileCopyrightText: 2026 Draftmill Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Usage ledger persisting per-request cost records to SQLite.
//!
//! The broker accounts in tokens and latency, not currency: every cache
//! hit and every completed generation run lands as one row in the
//! `cost_ledger` table. Aggregation queries support per-user and per-day
//! reporting.

use async_trait::async_trait;
use draftmill_core::error::DraftmillError;
use draftmill_core::traits::{Collaborator, CostSink};
use draftmill_core::types::{Complexity, HealthStatus, ProcessingEvent, ProviderKind};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use tracing::{debug, info};

/// What kind of ledger row this is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, Serialize, Deserialize)]
#[strum(serialize_all = "kebab-case")]
#[serde(rename_all = "kebab-case")]
pub enum UsageEventKind {
    /// A request answered from cache; consumes no tokens.
    CacheHit,
    /// A completed generation run.
    Generation,
}

/// One ledger row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UsageRecord {
    /// Unique record identifier (UUID v4).
    pub id: String,
    pub user_id: String,
    pub event_kind: UsageEventKind,
    /// Provider that served the run; `None` for cache hits.
    pub provider: Option<ProviderKind>,
    /// Classified complexity of the run; `None` for cache hits.
    pub complexity: Option<Complexity>,
    pub tokens_used: u32,
    pub processing_ms: u64,
    /// ISO 8601 timestamp.
    pub created_at: String,
}

impl UsageRecord {
    /// A zero-token row for a request answered from cache.
    pub fn cache_hit(user_id: &str) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            event_kind: UsageEventKind::CacheHit,
            provider: None,
            complexity: None,
            tokens_used: 0,
            processing_ms: 0,
            created_at: now_timestamp(),
        }
    }

    /// A row for a completed generation run.
    pub fn generation(event: &ProcessingEvent) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            user_id: event.user_id.clone(),
            event_kind: UsageEventKind::Generation,
            provider: Some(event.provider),
            complexity: Some(event.complexity),
            tokens_used: event.tokens_used,
            processing_ms: event.processing_ms,
            created_at: now_timestamp(),
        }
    }
}

/// Aggregated usage over some slice of the ledger.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct UsageTotals {
    pub generations: u64,
    pub cache_hits: u64,
    pub tokens_used: u64,
    pub processing_ms: u64,
}

fn now_timestamp() -> String {
    chrono::Utc::now().format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string()
}

fn storage_err(e: tokio_rusqlite::Error) -> DraftmillError {
    DraftmillError::Storage {
        source: Box::new(e),
    }
}

const TOTALS_SELECT: &str = "COALESCE(SUM(CASE WHEN event_kind = 'generation' THEN 1 ELSE 0 END), 0), \
     COALESCE(SUM(CASE WHEN event_kind = 'cache-hit' THEN 1 ELSE 0 END), 0), \
     COALESCE(SUM(tokens_used), 0), \
     COALESCE(SUM(processing_ms), 0)";

/// Persistent usage ledger backed by the `cost_ledger` table.
///
/// All writes go through the single tokio-rusqlite background thread;
/// the gateway reports into the sink from spawned tasks, so a slow disk
/// never sits on the response path.
pub struct CostLedger {
    conn: tokio_rusqlite::Connection,
}

impl CostLedger {
    /// Wraps an existing connection. The `cost_ledger` table must
    /// already exist (storage migrations create it).
    pub fn new(conn: tokio_rusqlite::Connection) -> Self {
        Self { conn }
    }

    /// Inserts one ledger row.
    pub async fn record(&self, record: &UsageRecord) -> Result<(), DraftmillError> {
        let row = record.clone();
        self.conn
            .call(move |conn| -> Result<(), rusqlite::Error> {
                conn.execute(
                    "INSERT INTO cost_ledger \
                         (id, user_id, event_kind, provider, complexity, tokens_used, \
                          processing_ms, created_at) \
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                    rusqlite::params![
                        row.id,
                        row.user_id,
                        row.event_kind.to_string(),
                        row.provider.map(|p| p.to_string()),
                        row.complexity.map(|c| c.to_string()),
                        row.tokens_used,
                        row.processing_ms,
                        row.created_at,
                    ],
                )?;
                Ok(())
            })
            .await
            .map_err(storage_err)
    }

    /// Totals for one user across the whole ledger.
    pub async fn user_totals(&self, user_id: &str) -> Result<UsageTotals, DraftmillError> {
        let user_id = user_id.to_string();
        self.conn
            .call(move |conn| -> Result<UsageTotals, rusqlite::Error> {
                conn.query_row(
                    &format!("SELECT {TOTALS_SELECT} FROM cost_ledger WHERE user_id = ?1"),
                    rusqlite::params![user_id],
                    totals_row,
                )
            })
            .await
            .map_err(storage_err)
    }

    /// Totals for one user on one date (ISO 8601 date, e.g. "2026-08-25").
    pub async fn daily_totals(
        &self,
        user_id: &str,
        date: &str,
    ) -> Result<UsageTotals, DraftmillError> {
        let user_id = user_id.to_string();
        let date = date.to_string();
        self.conn
            .call(move |conn| -> Result<UsageTotals, rusqlite::Error> {
                conn.query_row(
                    &format!(
                        "SELECT {TOTALS_SELECT} FROM cost_ledger \
                         WHERE user_id = ?1 \
                           AND created_at >= ?2 AND created_at < date(?2, '+1 day')"
                    ),
                    rusqlite::params![user_id, date],
                    totals_row,
                )
            })
            .await
            .map_err(storage_err)
    }
}

fn totals_row(row: &rusqlite::Row<'_>) -> Result<UsageTotals, rusqlite::Error> {
    let generations: i64 = row.get(0)?;
    let cache_hits: i64 = row.get(1)?;
    let tokens_used: i64 = row.get(2)?;
    let processing_ms: i64 = row.get(3)?;
    Ok(UsageTotals {
        generations: generations.max(0) as u64,
        cache_hits: cache_hits.max(0) as u64,
        tokens_used: tokens_used.max(0) as u64,
        processing_ms: processing_ms.max(0) as u64,
    })
}

#[async_trait]
impl Collaborator for CostLedger {
    fn name(&self) -> &str {
        "cost-ledger"
    }

    async fn health_check(&self) -> Result<HealthStatus, DraftmillError> {
        let probe = self
            .conn
            .call(|conn| -> Result<i64, rusqlite::Error> {
                conn.query_row("SELECT 1", [], |row| row.get(0))
            })
            .await;
        match probe {
            Ok(_) => Ok(HealthStatus::Healthy),
            Err(e) => Ok(HealthStatus::Unhealthy(format!("ledger probe failed: {e}"))),
        }
    }
}

#[async_trait]
impl CostSink for CostLedger {
    async fn record_cache_hit(&self, user_id: &str) -> Result<(), DraftmillError> {
        let record = UsageRecord::cache_hit(user_id);
        self.record(&record).await?;
        debug!(user_id, "cache hit recorded");
        Ok(())
    }

    async fn record_processing(&self, event: ProcessingEvent) -> Result<(), DraftmillError> {
        let record = UsageRecord::generation(&event);
        self.record(&record).await?;
        info!(
            user_id = %event.user_id,
            provider = %event.provider,
            complexity = %event.complexity,
            tokens_used = event.tokens_used,
            processing_ms = event.processing_ms,
            "usage recorded"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use draftmill_storage::Database;

    async fn test_ledger() -> CostLedger {
        let db = Database::open_in_memory().await.unwrap();
        CostLedger::new(db.connection().clone())
    }

    fn processing_event(user_id: &str, tokens: u32) -> ProcessingEvent {
        ProcessingEvent {
            user_id: user_id.to_string(),
            tokens_used: tokens,
            processing_ms: 1_200,
            provider: ProviderKind::Anthropic,
            complexity: Complexity::Medium,
        }
    }

    #[tokio::test]
    async fn cache_hits_are_zero_token_rows() {
        let ledger = test_ledger().await;
        ledger.record_cache_hit("maya").await.unwrap();
        ledger.record_cache_hit("maya").await.unwrap();

        let totals = ledger.user_totals("maya").await.unwrap();
        assert_eq!(totals.cache_hits, 2);
        assert_eq!(totals.generations, 0);
        assert_eq!(totals.tokens_used, 0);
    }

    #[tokio::test]
    async fn processing_events_accumulate_tokens_and_latency() {
        let ledger = test_ledger().await;
        ledger
            .record_processing(processing_event("maya", 900))
            .await
            .unwrap();
        ledger
            .record_processing(processing_event("maya", 1_800))
            .await
            .unwrap();
        ledger.record_cache_hit("maya").await.unwrap();

        let totals = ledger.user_totals("maya").await.unwrap();
        assert_eq!(totals.generations, 2);
        assert_eq!(totals.cache_hits, 1);
        assert_eq!(totals.tokens_used, 2_700);
        assert_eq!(totals.processing_ms, 2_400);
    }

    #[tokio::test]
    async fn totals_are_scoped_per_user() {
        let ledger = test_ledger().await;
        ledger
            .record_processing(processing_event("maya", 500))
            .await
            .unwrap();
        ledger
            .record_processing(processing_event("liam", 900))
            .await
            .unwrap();

        let maya = ledger.user_totals("maya").await.unwrap();
        let liam = ledger.user_totals("liam").await.unwrap();
        assert_eq!(maya.tokens_used, 500);
        assert_eq!(liam.tokens_used, 900);
    }

    #[tokio::test]
    async fn daily_totals_window_on_the_given_date() {
        let ledger = test_ledger().await;
        // Rows written through the public API land with today's date.
        ledger
            .record_processing(processing_event("maya", 700))
            .await
            .unwrap();

        let today = chrono::Utc::now().format("%Y-%m-%d").to_string();
        let totals = ledger.daily_totals("maya", &today).await.unwrap();
        assert_eq!(totals.generations, 1);
        assert_eq!(totals.tokens_used, 700);

        let distant = ledger.daily_totals("maya", "2001-01-01").await.unwrap();
        assert_eq!(distant, UsageTotals::default());
    }

    #[tokio::test]
    async fn unknown_user_gets_empty_totals() {
        let ledger = test_ledger().await;
        let totals = ledger.user_totals("nobody").await.unwrap();
        assert_eq!(totals, UsageTotals::default());
    }

    #[test]
    fn event_kind_round_trips_through_strings() {
        use std::str::FromStr;
        assert_eq!(UsageEventKind::CacheHit.to_string(), "cache-hit");
        assert_eq!(
            UsageEventKind::from_str("generation").unwrap(),
            UsageEventKind::Generation
        );
    }

    #[test]
    fn generation_record_copies_event_fields() {
        let record = UsageRecord::generation(&processing_event("maya", 321));
        assert_eq!(record.event_kind, UsageEventKind::Generation);
        assert_eq!(record.provider, Some(ProviderKind::Anthropic));
        assert_eq!(record.complexity, Some(Complexity::Medium));
        assert_eq!(record.tokens_used, 321);
        assert!(!record.id.is_empty());
        assert!(!record.created_at.is_empty());
    }

    #[tokio::test]
    async fn health_check_probes_the_connection() {
        let ledger = test_ledger().await;
        assert_eq!(
            ledger.health_check().await.unwrap(),
            HealthStatus::Healthy
        );
    }
}

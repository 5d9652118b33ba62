// SPDX-FileCopyrightText: 2026 Draftmill Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite-backed persistence for learned patterns.
//!
//! Reads that feed the request path ([`PatternStore::list_for_user`],
//! [`PatternStore::top_by_confidence`]) degrade to an empty result on
//! storage failure or timeout instead of erroring: pattern retrieval is
//! an enhancement, and a slow or broken table must not take generation
//! down with it. Writes propagate their errors so callers can decide.
//!
//! A short-lived per-user read cache absorbs the burst of lookups a
//! single request makes. Any write for a user invalidates that user's
//! cached lists.

use std::time::{Duration, Instant};

use dashmap::DashMap;
use draftmill_core::error::DraftmillError;
use draftmill_core::types::PatternKind;
use rusqlite::{params, OptionalExtension};
use tokio_rusqlite::Connection;
use tracing::warn;

use crate::types::UserPattern;

const SELECT_COLUMNS: &str =
    "id, user_id, kind, data, confidence, sample_size, last_reinforced, created_at";

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

/// Maps a `patterns` row to a [`UserPattern`].
///
/// Payload and kind parsing are lenient: a corrupt JSON document or an
/// unrecognized kind degrades to defaults rather than poisoning the
/// whole result set.
fn row_to_pattern(row: &rusqlite::Row<'_>) -> Result<UserPattern, rusqlite::Error> {
    let kind_raw: String = row.get(2)?;
    let data_raw: String = row.get(3)?;
    let sample_size: i64 = row.get(5)?;
    Ok(UserPattern {
        id: row.get(0)?,
        user_id: row.get(1)?,
        kind: kind_raw.parse().unwrap_or(PatternKind::SuccessfulPost),
        data: serde_json::from_str(&data_raw).unwrap_or_default(),
        confidence: row.get(4)?,
        sample_size: sample_size.max(0) as u32,
        last_reinforced: row.get(6)?,
        created_at: row.get(7)?,
    })
}

struct CachedList {
    patterns: Vec<UserPattern>,
    cached_at: Instant,
}

/// Store for the `patterns` table.
pub struct PatternStore {
    conn: Connection,
    cache: DashMap<String, CachedList>,
    cache_ttl: Duration,
    op_timeout: Duration,
}

impl PatternStore {
    pub fn new(conn: Connection, cache_ttl: Duration, op_timeout: Duration) -> Self {
        Self {
            conn,
            cache: DashMap::new(),
            cache_ttl,
            op_timeout,
        }
    }

    /// Inserts a pattern, or updates its mutable fields if the id exists.
    /// Invalidates the user's cached lists.
    pub async fn upsert(&self, pattern: &UserPattern) -> Result<(), DraftmillError> {
        let encoded = serde_json::to_string(&pattern.data).map_err(encode_err)?;
        let row = pattern.clone();
        let call = self
            .conn
            .call(move |conn| -> Result<(), rusqlite::Error> {
                conn.execute(
                    "INSERT INTO patterns
                         (id, user_id, kind, data, confidence, sample_size, last_reinforced)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
                     ON CONFLICT(id) DO UPDATE SET
                         data = excluded.data,
                         confidence = excluded.confidence,
                         sample_size = excluded.sample_size,
                         last_reinforced = excluded.last_reinforced",
                    params![
                        row.id,
                        row.user_id,
                        row.kind.to_string(),
                        encoded,
                        row.confidence,
                        row.sample_size,
                        row.last_reinforced,
                    ],
                )?;
                Ok(())
            });
        tokio::time::timeout(self.op_timeout, call)
            .await
            .map_err(|_| DraftmillError::Timeout {
                duration: self.op_timeout,
            })?
            .map_err(storage_err)?;
        self.invalidate_user(&pattern.user_id);
        Ok(())
    }

    /// Point lookup by id.
    pub async fn get(&self, id: &str) -> Result<Option<UserPattern>, DraftmillError> {
        let id = id.to_string();
        let call = self
            .conn
            .call(move |conn| -> Result<Option<UserPattern>, rusqlite::Error> {
                conn.query_row(
                    &format!("SELECT {SELECT_COLUMNS} FROM patterns WHERE id = ?1"),
                    [&id],
                    row_to_pattern,
                )
                .optional()
            });
        tokio::time::timeout(self.op_timeout, call)
            .await
            .map_err(|_| DraftmillError::Timeout {
                duration: self.op_timeout,
            })?
            .map_err(storage_err)
    }

    /// Lists a user's patterns, strongest first, optionally filtered by
    /// kind and minimum confidence. Degrades to empty on failure.
    pub async fn list_for_user(
        &self,
        user_id: &str,
        kind: Option<PatternKind>,
        min_confidence: Option<f64>,
    ) -> Vec<UserPattern> {
        let key = cache_key(user_id, kind, min_confidence);
        if let Some(entry) = self.cache.get(&key) {
            if entry.cached_at.elapsed() < self.cache_ttl {
                return entry.patterns.clone();
            }
        }

        match tokio::time::timeout(self.op_timeout, self.query_list(user_id, kind, min_confidence))
            .await
        {
            Ok(Ok(patterns)) => {
                self.cache.insert(
                    key,
                    CachedList {
                        patterns: patterns.clone(),
                        cached_at: Instant::now(),
                    },
                );
                patterns
            }
            Ok(Err(e)) => {
                warn!(error = %e, user_id, "pattern query failed; returning no patterns");
                Vec::new()
            }
            Err(_) => {
                warn!(
                    user_id,
                    timeout_ms = self.op_timeout.as_millis() as u64,
                    "pattern query timed out; returning no patterns"
                );
                Vec::new()
            }
        }
    }

    /// The user's `limit` highest-confidence patterns of the given kind.
    /// Degrades to empty on failure.
    pub async fn top_by_confidence(
        &self,
        user_id: &str,
        kind: Option<PatternKind>,
        limit: usize,
    ) -> Vec<UserPattern> {
        let mut patterns = self.list_for_user(user_id, kind, None).await;
        patterns.truncate(limit);
        patterns
    }

    async fn query_list(
        &self,
        user_id: &str,
        kind: Option<PatternKind>,
        min_confidence: Option<f64>,
    ) -> Result<Vec<UserPattern>, DraftmillError> {
        let user_id = user_id.to_string();
        let kind = kind.map(|k| k.to_string());
        self.conn
            .call(move |conn| -> Result<Vec<UserPattern>, rusqlite::Error> {
                let mut stmt = conn.prepare(&format!(
                    "SELECT {SELECT_COLUMNS} FROM patterns
                     WHERE user_id = ?1
                       AND (?2 IS NULL OR kind = ?2)
                       AND (?3 IS NULL OR confidence >= ?3)
                     ORDER BY confidence DESC, sample_size DESC, id ASC"
                ))?;
                let rows = stmt
                    .query_map(params![user_id, kind, min_confidence], row_to_pattern)?
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(rows)
            })
            .await
            .map_err(storage_err)
    }

    fn invalidate_user(&self, user_id: &str) {
        let prefix = format!("{user_id}::");
        self.cache.retain(|key, _| !key.starts_with(&prefix));
    }
}

fn cache_key(user_id: &str, kind: Option<PatternKind>, min_confidence: Option<f64>) -> String {
    let kind_part = kind.map(|k| k.to_string()).unwrap_or_else(|| "*".into());
    let conf_part = min_confidence
        .map(|c| format!("{c:.4}"))
        .unwrap_or_else(|| "*".into());
    format!("{user_id}::{kind_part}::{conf_part}")
}

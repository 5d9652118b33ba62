// SPDX-FileCopyrightText: 2026 Draftmill Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Persistent embedding storage with cosine similarity search.
//!
//! Embeddings live in the `pattern_vectors` table as little-endian f32
//! blobs, one row per pattern. Search runs one of two paths: when the
//! sqlite-vec extension registered at database open, distance is computed
//! inside SQLite via `vec_distance_cosine`; otherwise candidate rows are
//! pulled and scored client-side. Both paths apply the same threshold
//! filter, descending-similarity order, and result cap, so callers see
//! the same ranking either way.

use std::cmp::Ordering;

use draftmill_core::error::DraftmillError;
use rusqlite::{params, OptionalExtension};
use tokio_rusqlite::Connection;

use crate::types::{blob_to_vec, cosine_similarity, vec_to_blob};

fn storage_err(e: tokio_rusqlite::Error) -> DraftmillError {
    DraftmillError::Storage {
        source: Box::new(e),
    }
}

/// One pattern's embedding, ready for persistence.
#[derive(Debug, Clone)]
pub struct VectorDocument {
    pub pattern_id: String,
    pub user_id: String,
    pub embedding: Vec<f32>,
}

/// Knobs for one similarity query.
#[derive(Debug, Clone)]
pub struct SearchOptions {
    /// Minimum cosine similarity for a row to be returned.
    pub threshold: f32,
    /// Maximum number of rows returned.
    pub top_k: usize,
    /// When set, only this user's vectors are searched.
    pub user_id: Option<String>,
}

/// A scored row from similarity search.
#[derive(Debug, Clone, PartialEq)]
pub struct VectorMatch {
    pub pattern_id: String,
    pub similarity: f32,
}

/// Store for pattern embeddings backed by the `pattern_vectors` table.
#[derive(Clone)]
pub struct VectorStore {
    conn: Connection,
    native: bool,
}

impl VectorStore {
    /// Wraps a database connection. `native` is whether the sqlite-vec
    /// extension is available on it (`Database::vec_available`).
    pub fn new(conn: Connection, native: bool) -> Self {
        Self { conn, native }
    }

    /// Whether search runs inside SQLite rather than client-side.
    pub fn native(&self) -> bool {
        self.native
    }

    /// Inserts or replaces embeddings, one transaction for the batch.
    pub async fn upsert(&self, docs: Vec<VectorDocument>) -> Result<(), DraftmillError> {
        if docs.is_empty() {
            return Ok(());
        }
        self.conn
            .call(move |conn| -> Result<(), rusqlite::Error> {
                let tx = conn.transaction()?;
                {
                    let mut stmt = tx.prepare(
                        "INSERT INTO pattern_vectors (pattern_id, user_id, embedding)
                         VALUES (?1, ?2, ?3)
                         ON CONFLICT(pattern_id) DO UPDATE SET
                             user_id = excluded.user_id,
                             embedding = excluded.embedding",
                    )?;
                    for doc in &docs {
                        stmt.execute(params![
                            doc.pattern_id,
                            doc.user_id,
                            vec_to_blob(&doc.embedding)
                        ])?;
                    }
                }
                tx.commit()?;
                Ok(())
            })
            .await
            .map_err(storage_err)
    }

    /// Deletes embeddings for the given pattern ids. Missing ids are not
    /// an error.
    pub async fn delete(&self, ids: Vec<String>) -> Result<(), DraftmillError> {
        if ids.is_empty() {
            return Ok(());
        }
        self.conn
            .call(move |conn| -> Result<(), rusqlite::Error> {
                let tx = conn.transaction()?;
                {
                    let mut stmt =
                        tx.prepare("DELETE FROM pattern_vectors WHERE pattern_id = ?1")?;
                    for id in &ids {
                        stmt.execute([id])?;
                    }
                }
                tx.commit()?;
                Ok(())
            })
            .await
            .map_err(storage_err)
    }

    /// Loads one pattern's stored embedding, if any.
    pub async fn embedding_for(
        &self,
        pattern_id: &str,
    ) -> Result<Option<Vec<f32>>, DraftmillError> {
        let pattern_id = pattern_id.to_string();
        let blob = self
            .conn
            .call(move |conn| -> Result<Option<Vec<u8>>, rusqlite::Error> {
                conn.query_row(
                    "SELECT embedding FROM pattern_vectors WHERE pattern_id = ?1",
                    [&pattern_id],
                    |row| row.get(0),
                )
                .optional()
            })
            .await
            .map_err(storage_err)?;
        Ok(blob.map(|b| blob_to_vec(&b)))
    }

    /// Loads every stored embedding for one user, keyed by pattern id.
    pub async fn embeddings_for_user(
        &self,
        user_id: &str,
    ) -> Result<Vec<(String, Vec<f32>)>, DraftmillError> {
        let user_id = user_id.to_string();
        let rows = self
            .conn
            .call(move |conn| -> Result<Vec<(String, Vec<u8>)>, rusqlite::Error> {
                let mut stmt = conn.prepare(
                    "SELECT pattern_id, embedding FROM pattern_vectors WHERE user_id = ?1",
                )?;
                let rows = stmt
                    .query_map([&user_id], |row| Ok((row.get(0)?, row.get(1)?)))?
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(rows)
            })
            .await
            .map_err(storage_err)?;
        Ok(rows
            .into_iter()
            .map(|(id, blob)| (id, blob_to_vec(&blob)))
            .collect())
    }

    /// Finds stored embeddings similar to `query`, best first.
    pub async fn search(
        &self,
        query: &[f32],
        options: &SearchOptions,
    ) -> Result<Vec<VectorMatch>, DraftmillError> {
        if self.native {
            self.search_native(query, options).await
        } else {
            self.search_fallback(query, options).await
        }
    }

    async fn search_native(
        &self,
        query: &[f32],
        options: &SearchOptions,
    ) -> Result<Vec<VectorMatch>, DraftmillError> {
        let blob = vec_to_blob(query);
        let user_id = options.user_id.clone();
        let threshold = f64::from(options.threshold);
        let limit = i64::try_from(options.top_k).unwrap_or(i64::MAX);
        let rows = self
            .conn
            .call(move |conn| -> Result<Vec<(String, f64)>, rusqlite::Error> {
                let mut stmt = conn.prepare(
                    "SELECT pattern_id, similarity
                     FROM (
                         SELECT pattern_id,
                                1.0 - vec_distance_cosine(embedding, ?1) AS similarity
                         FROM pattern_vectors
                         WHERE ?2 IS NULL OR user_id = ?2
                     )
                     WHERE similarity >= ?3
                     ORDER BY similarity DESC
                     LIMIT ?4",
                )?;
                let rows = stmt
                    .query_map(params![blob, user_id, threshold, limit], |row| {
                        Ok((row.get(0)?, row.get(1)?))
                    })?
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(rows)
            })
            .await
            .map_err(storage_err)?;
        Ok(rows
            .into_iter()
            .map(|(pattern_id, similarity)| VectorMatch {
                pattern_id,
                similarity: similarity as f32,
            })
            .collect())
    }

    async fn search_fallback(
        &self,
        query: &[f32],
        options: &SearchOptions,
    ) -> Result<Vec<VectorMatch>, DraftmillError> {
        let rows = match &options.user_id {
            Some(user) => self.embeddings_for_user(user).await?,
            None => self.all_embeddings().await?,
        };

        // Step 1: score every candidate whose dimensionality matches.
        // Step 2: drop rows below the threshold.
        // Step 3: rank best-first and cap at top_k.
        let mut matches: Vec<VectorMatch> = rows
            .into_iter()
            .filter(|(_, embedding)| embedding.len() == query.len())
            .map(|(pattern_id, embedding)| VectorMatch {
                similarity: cosine_similarity(query, &embedding),
                pattern_id,
            })
            .filter(|m| m.similarity >= options.threshold)
            .collect();
        matches.sort_by(|a, b| {
            b.similarity
                .partial_cmp(&a.similarity)
                .unwrap_or(Ordering::Equal)
        });
        matches.truncate(options.top_k);
        Ok(matches)
    }

    async fn all_embeddings(&self) -> Result<Vec<(String, Vec<f32>)>, DraftmillError> {
        let rows = self
            .conn
            .call(|conn| -> Result<Vec<(String, Vec<u8>)>, rusqlite::Error> {
                let mut stmt = conn.prepare("SELECT pattern_id, embedding FROM pattern_vectors")?;
                let rows = stmt
                    .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(rows)
            })
            .await
            .map_err(storage_err)?;
        Ok(rows
            .into_iter()
            .map(|(id, blob)| (id, blob_to_vec(&blob)))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use draftmill_storage::Database;

    async fn test_db() -> Database {
        Database::open_in_memory().await.unwrap()
    }

    /// Inserts a parent pattern row so vector rows satisfy the foreign key.
    async fn seed_pattern(conn: &Connection, id: &str, user: &str) {
        let id = id.to_string();
        let user = user.to_string();
        conn.call(move |conn| -> Result<(), rusqlite::Error> {
            conn.execute(
                "INSERT INTO patterns (id, user_id, kind, data) VALUES (?1, ?2, 'successful-post', '{}')",
                params![id, user],
            )?;
            Ok(())
        })
        .await
        .unwrap();
    }

    fn doc(id: &str, user: &str, embedding: Vec<f32>) -> VectorDocument {
        VectorDocument {
            pattern_id: id.into(),
            user_id: user.into(),
            embedding,
        }
    }

    #[tokio::test]
    async fn upsert_and_load_round_trip() {
        let db = test_db().await;
        let conn = db.connection().clone();
        seed_pattern(&conn, "p1", "maya").await;
        let store = VectorStore::new(conn, false);

        store
            .upsert(vec![doc("p1", "maya", vec![0.5, -0.25, 0.0, 1.0])])
            .await
            .unwrap();

        let loaded = store.embedding_for("p1").await.unwrap().unwrap();
        assert_eq!(loaded, vec![0.5, -0.25, 0.0, 1.0]);
        assert!(store.embedding_for("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn upsert_replaces_existing_embedding() {
        let db = test_db().await;
        let conn = db.connection().clone();
        seed_pattern(&conn, "p1", "maya").await;
        let store = VectorStore::new(conn, false);

        store.upsert(vec![doc("p1", "maya", vec![1.0, 0.0])]).await.unwrap();
        store.upsert(vec![doc("p1", "maya", vec![0.0, 1.0])]).await.unwrap();

        let loaded = store.embedding_for("p1").await.unwrap().unwrap();
        assert_eq!(loaded, vec![0.0, 1.0]);
    }

    #[tokio::test]
    async fn delete_removes_rows() {
        let db = test_db().await;
        let conn = db.connection().clone();
        seed_pattern(&conn, "p1", "maya").await;
        seed_pattern(&conn, "p2", "maya").await;
        let store = VectorStore::new(conn, false);

        store
            .upsert(vec![
                doc("p1", "maya", vec![1.0, 0.0]),
                doc("p2", "maya", vec![0.0, 1.0]),
            ])
            .await
            .unwrap();
        store.delete(vec!["p1".into()]).await.unwrap();

        assert!(store.embedding_for("p1").await.unwrap().is_none());
        assert!(store.embedding_for("p2").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn fallback_search_filters_ranks_and_caps() {
        let db = test_db().await;
        let conn = db.connection().clone();
        for id in ["p1", "p2", "p3", "p4"] {
            seed_pattern(&conn, id, "maya").await;
        }
        let store = VectorStore::new(conn, false);

        // Unit vectors with known cosine against the query [1, 0, 0, 0].
        store
            .upsert(vec![
                doc("p1", "maya", vec![1.0, 0.0, 0.0, 0.0]),
                doc("p2", "maya", vec![0.9, 0.435_889_9, 0.0, 0.0]),
                doc("p3", "maya", vec![0.6, 0.8, 0.0, 0.0]),
                doc("p4", "maya", vec![0.0, 1.0, 0.0, 0.0]),
            ])
            .await
            .unwrap();

        let options = SearchOptions {
            threshold: 0.75,
            top_k: 2,
            user_id: Some("maya".into()),
        };
        let matches = store.search(&[1.0, 0.0, 0.0, 0.0], &options).await.unwrap();

        // p3 (0.6) is below the threshold, p4 (0.0) far below; the cap
        // keeps the best two of what remains.
        assert_eq!(matches.len(), 2);
        assert_eq!(matches[0].pattern_id, "p1");
        assert!((matches[0].similarity - 1.0).abs() < 1e-5);
        assert_eq!(matches[1].pattern_id, "p2");
        assert!((matches[1].similarity - 0.9).abs() < 1e-5);
    }

    #[tokio::test]
    async fn search_respects_user_filter() {
        let db = test_db().await;
        let conn = db.connection().clone();
        seed_pattern(&conn, "p1", "maya").await;
        seed_pattern(&conn, "p2", "liam").await;
        let store = VectorStore::new(conn, false);

        store
            .upsert(vec![
                doc("p1", "maya", vec![1.0, 0.0]),
                doc("p2", "liam", vec![1.0, 0.0]),
            ])
            .await
            .unwrap();

        let options = SearchOptions {
            threshold: 0.5,
            top_k: 10,
            user_id: Some("liam".into()),
        };
        let matches = store.search(&[1.0, 0.0], &options).await.unwrap();
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].pattern_id, "p2");
    }

    #[tokio::test]
    async fn native_and_fallback_paths_rank_identically() {
        let db = test_db().await;
        if !db.vec_available() {
            // Extension did not register in this build; the fallback path
            // is covered by the other tests.
            return;
        }
        let conn = db.connection().clone();
        for id in ["p1", "p2", "p3"] {
            seed_pattern(&conn, id, "maya").await;
        }
        let native = VectorStore::new(conn.clone(), true);
        let fallback = VectorStore::new(conn, false);

        native
            .upsert(vec![
                doc("p1", "maya", vec![1.0, 0.0, 0.0, 0.0]),
                doc("p2", "maya", vec![0.9, 0.435_889_9, 0.0, 0.0]),
                doc("p3", "maya", vec![0.0, 0.6, 0.8, 0.0]),
            ])
            .await
            .unwrap();

        let options = SearchOptions {
            threshold: 0.1,
            top_k: 5,
            user_id: Some("maya".into()),
        };
        let query = [1.0, 0.0, 0.0, 0.0];
        let from_native = native.search(&query, &options).await.unwrap();
        let from_fallback = fallback.search(&query, &options).await.unwrap();

        let native_ids: Vec<_> = from_native.iter().map(|m| m.pattern_id.as_str()).collect();
        let fallback_ids: Vec<_> =
            from_fallback.iter().map(|m| m.pattern_id.as_str()).collect();
        assert_eq!(native_ids, fallback_ids);
        for (a, b) in from_native.iter().zip(from_fallback.iter()) {
            assert!(
                (a.similarity - b.similarity).abs() < 1e-4,
                "similarity diverged: {} vs {}",
                a.similarity,
                b.similarity
            );
        }
    }

    #[tokio::test]
    async fn embeddings_for_user_scopes_rows() {
        let db = test_db().await;
        let conn = db.connection().clone();
        seed_pattern(&conn, "p1", "maya").await;
        seed_pattern(&conn, "p2", "liam").await;
        let store = VectorStore::new(conn, false);

        store
            .upsert(vec![
                doc("p1", "maya", vec![1.0, 0.0]),
                doc("p2", "liam", vec![0.0, 1.0]),
            ])
            .await
            .unwrap();

        let rows = store.embeddings_for_user("maya").await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].0, "p1");
    }
}

// SPDX-FileCopyrightText: 2026 Draftmill Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock embedding adapter with programmable vectors.

use std::collections::HashMap;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use draftmill_core::error::DraftmillError;
use draftmill_core::traits::{Collaborator, EmbeddingAdapter};
use draftmill_core::types::HealthStatus;

/// A mock embedder that returns programmed vectors per input text.
///
/// Texts without a programmed vector fall back to a one-hot basis
/// vector chosen by hashing the text, so distinct texts are (almost
/// always) orthogonal and identical texts always match. Tests that
/// exercise similarity ranking program exact vectors instead.
pub struct MockEmbedder {
    dimension: usize,
    vectors: HashMap<String, Vec<f32>>,
    texts: Arc<Mutex<Vec<String>>>,
}

impl MockEmbedder {
    /// Create a mock embedder producing `dimension`-length vectors.
    pub fn new(dimension: usize) -> Self {
        Self {
            dimension,
            vectors: HashMap::new(),
            texts: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Program an exact vector for `text`.
    pub fn with_vector(mut self, text: &str, vector: Vec<f32>) -> Self {
        self.vectors.insert(text.to_string(), vector);
        self
    }

    /// Number of embed calls observed so far.
    pub async fn call_count(&self) -> usize {
        self.texts.lock().await.len()
    }

    /// Texts embedded, in call order.
    pub async fn embedded_texts(&self) -> Vec<String> {
        self.texts.lock().await.clone()
    }

    fn one_hot(&self, text: &str) -> Vec<f32> {
        let mut hasher = std::collections::hash_map::DefaultHasher::new();
        text.hash(&mut hasher);
        let index = (hasher.finish() as usize) % self.dimension.max(1);
        let mut vector = vec![0.0; self.dimension];
        vector[index] = 1.0;
        vector
    }
}

#[async_trait]
impl Collaborator for MockEmbedder {
    fn name(&self) -> &str {
        "mock-embedder"
    }

    async fn health_check(&self) -> Result<HealthStatus, DraftmillError> {
        Ok(HealthStatus::Healthy)
    }
}

#[async_trait]
impl EmbeddingAdapter for MockEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, DraftmillError> {
        self.texts.lock().await.push(text.to_string());
        match self.vectors.get(text) {
            Some(vector) => Ok(vector.clone()),
            None => Ok(self.one_hot(text)),
        }
    }

    fn dimension(&self) -> usize {
        self.dimension
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn identical_text_same_vector() {
        let embedder = MockEmbedder::new(8);
        let a = embedder.embed("same text").await.unwrap();
        let b = embedder.embed("same text").await.unwrap();
        assert_eq!(a, b);
        assert_eq!(a.len(), 8);
        assert_eq!(embedder.call_count().await, 2);
    }

    #[tokio::test]
    async fn programmed_vector_wins_over_fallback() {
        let embedder = MockEmbedder::new(4).with_vector("known", vec![0.5, 0.5, 0.5, 0.5]);
        let vector = embedder.embed("known").await.unwrap();
        assert_eq!(vector, vec![0.5, 0.5, 0.5, 0.5]);
    }

    #[tokio::test]
    async fn fallback_is_unit_one_hot() {
        let embedder = MockEmbedder::new(16);
        let vector = embedder.embed("anything").await.unwrap();
        let sum: f32 = vector.iter().sum();
        assert!((sum - 1.0).abs() < f32::EPSILON);
        assert_eq!(vector.iter().filter(|v| **v != 0.0).count(), 1);
    }
}

// SPDX-FileCopyrightText: 2026 Draftmill Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Embedding adapter trait for vector embedding generation.

use async_trait::async_trait;

use crate::error::DraftmillError;
use crate::traits::adapter::Collaborator;

/// Adapter for generating vector embeddings from text.
///
/// Embedding adapters power pattern similarity search by converting
/// request and pattern projections into vector representations. Vectors
/// are expected to be L2-normalized so cosine similarity reduces to a
/// dot product.
#[async_trait]
pub trait EmbeddingAdapter: Collaborator {
    /// Generates an embedding for the given text.
    async fn embed(&self, text: &str) -> Result<Vec<f32>, DraftmillError>;

    /// Dimensionality of the vectors this adapter produces.
    fn dimension(&self) -> usize;
}

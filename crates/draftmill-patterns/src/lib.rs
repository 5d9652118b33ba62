// SPDX-FileCopyrightText: 2026 Draftmill Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Pattern learning for the Draftmill broker.
//!
//! This crate provides:
//! - [`PatternLearningEngine`]: Similarity retrieval, success-driven
//!   learning with an engagement gate, and weighted smart defaults
//! - [`PatternStore`]: SQLite persistence with a short-lived per-user
//!   read cache and degrade-to-empty reads
//! - [`VectorStore`]: Embedding persistence and cosine search, native
//!   via sqlite-vec or client-side when the extension is unavailable
//! - [`EmbeddingService`]: Backend-selected embeddings (deterministic
//!   hash vectors or an OpenAI-compatible endpoint) with memoization
//! - [`extract_pattern_data`]: Distills a published post into the
//!   attributes patterns are matched and voted on
//!
//! Everything here is best-effort by contract: a broken patterns table
//! or unreachable embedding endpoint degrades retrieval to "no
//! patterns" and must never fail content generation.

pub mod embedding;
pub mod engine;
pub mod extractor;
pub mod store;
pub mod types;
pub mod vectors;

pub use embedding::{EmbeddingService, HashEmbedder, HttpEmbedder, EMBEDDING_DIM};
pub use engine::{FindOptions, PatternLearningEngine};
pub use extractor::extract_pattern_data;
pub use store::PatternStore;
pub use types::{
    LengthBucket, PartialRequest, PatternData, PatternEvent, SimilarityMatch, SmartDefaults,
    StructureTag, UserPattern,
};
pub use vectors::{SearchOptions, VectorDocument, VectorMatch, VectorStore};

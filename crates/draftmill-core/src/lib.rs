// SPDX-FileCopyrightText: 2026 Draftmill Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Draftmill content broker.
//!
//! This crate provides the foundational trait definitions, error types, and
//! domain types used throughout the Draftmill workspace. Pipeline
//! collaborators (generation, research, embedding, cost accounting)
//! implement traits defined here.

pub mod error;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::{DraftmillError, Result};
pub use types::{
    CacheTier, Complexity, ContentRequest, ContentResponse, ContentVariants, EngagementSignals,
    Format, GenerationOutput, HealthStatus, PatternKind, ProcessingEvent, ProviderKind, Purpose,
    ResearchOutput, ResearchSource, ResponseMetadata, RouteDecision, Tone, VariantLength,
};

// Re-export all collaborator traits at crate root.
pub use traits::{Collaborator, CostSink, EmbeddingAdapter, GenerationAdapter, ResearchAdapter};

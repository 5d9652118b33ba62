// SPDX-FileCopyrightText: 2026 Draftmill Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Collaborator trait definitions for the Draftmill pipeline.
//!
//! All collaborators extend the [`Collaborator`] base trait and use
//! `#[async_trait]` for dynamic dispatch compatibility.

pub mod adapter;
pub mod cost;
pub mod embedding;
pub mod generation;
pub mod research;

// Re-export all traits at the traits module level for convenience.
pub use adapter::Collaborator;
pub use cost::CostSink;
pub use embedding::EmbeddingAdapter;
pub use generation::GenerationAdapter;
pub use research::ResearchAdapter;

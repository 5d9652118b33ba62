// SPDX-FileCopyrightText: 2026 Draftmill Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for Draftmill tests.
//!
//! Provides mock adapters and fixtures for fast, deterministic,
//! CI-runnable tests without external services.
//!
//! # Components
//!
//! - [`MockGenerator`] - Mock generation backend with pre-configured outputs
//! - [`MockResearcher`] - Mock research backend
//! - [`MockEmbedder`] - Embedding adapter with programmable vectors
//! - [`RecordingCostSink`] - Cost sink that records instead of persisting
//! - [`fixtures`] - Pre-built domain values

pub mod fixtures;
pub mod mock_embedding;
pub mod mock_generation;
pub mod mock_research;
pub mod recording_cost;

pub use mock_embedding::MockEmbedder;
pub use mock_generation::{MockGenerator, RecordedGeneration};
pub use mock_research::MockResearcher;
pub use recording_cost::RecordingCostSink;

// SPDX-FileCopyrightText: 2026 Draftmill Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Draftmill content broker.

use thiserror::Error;

/// The primary error type used across all Draftmill adapter traits and core operations.
#[derive(Debug, Error)]
pub enum DraftmillError {
    /// Configuration errors (invalid TOML, missing required fields, type mismatches).
    #[error("configuration error: {0}")]
    Config(String),

    /// Storage backend errors (database connection, query failure, serialization).
    #[error("storage error: {source}")]
    Storage {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Generation provider errors (API failure, token limits, model not found).
    #[error("provider error: {message}")]
    Provider {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Research backend errors (fetch failure, malformed source data).
    #[error("research error: {message}")]
    Research {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// A request-pipeline stage failed; wraps the underlying cause.
    #[error("pipeline stage '{stage}' failed: {source}")]
    Pipeline {
        stage: &'static str,
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Operation timed out.
    #[error("operation timed out after {duration:?}")]
    Timeout { duration: std::time::Duration },

    /// Per-user request budget exhausted for the current window.
    #[error("rate limit exceeded for user {user_id}")]
    RateLimited { user_id: String },

    /// Internal or unexpected errors (invariant violations).
    #[error("internal error: {0}")]
    Internal(String),
}

/// Convenience alias used throughout the workspace.
pub type Result<T> = std::result::Result<T, DraftmillError>;

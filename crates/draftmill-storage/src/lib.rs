// SPDX-FileCopyrightText: 2026 Draftmill Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite persistence layer for the Draftmill content broker.
//!
//! Provides WAL-mode SQLite storage with embedded migrations, a single-writer
//! concurrency model via `tokio-rusqlite`, and a runtime probe for the
//! sqlite-vec extension used by native vector search.

pub mod database;
pub mod migrations;

pub use database::{register_vector_extension, Database};

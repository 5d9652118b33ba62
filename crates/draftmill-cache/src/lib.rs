// SPDX-FileCopyrightText: 2026 Draftmill Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Tiered response cache for the Draftmill broker.
//!
//! This crate provides:
//! - [`cache_key`]: Deterministic request identity (normalized fields,
//!   truncated URL fingerprint)
//! - [`CacheStrategy`]: Tier selection and TTL policy per request
//! - [`MemoryLayer`] / [`SqliteLayer`]: The L1 in-process tier and the
//!   SQLite-backed L2/L3 tiers behind one [`CacheLayer`] trait
//! - [`MultiLayerCache`]: Fastest-first reads with hit promotion,
//!   single-tier writes, degrade-to-miss error handling
//! - [`spawn_sweeper`]: Periodic expired-entry deletion
//!
//! Tier characteristics: L1 is volatile and per-process (minutes), L2
//! is shared across processes via SQLite (hours), L3 is the durable
//! tier for template-driven output (days).

pub mod key;
pub mod layer;
pub mod memory;
pub mod multi;
pub mod sqlite;
pub mod strategy;
pub mod sweeper;

pub use key::cache_key;
pub use layer::{CacheLayer, CachedEntry};
pub use memory::MemoryLayer;
pub use multi::{CacheHit, MultiLayerCache};
pub use sqlite::SqliteLayer;
pub use strategy::CacheStrategy;
pub use sweeper::spawn_sweeper;

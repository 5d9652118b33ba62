// SPDX-FileCopyrightText: 2026 Draftmill Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Usage accounting for the Draftmill content broker.
//!
//! This crate provides:
//! - **Usage ledger**: Persistent recording of every cache hit and
//!   generation run with token and latency totals
//! - **Aggregation**: Per-user and per-day rollups for reporting

pub mod ledger;

pub use ledger::{CostLedger, UsageEventKind, UsageRecord, UsageTotals};

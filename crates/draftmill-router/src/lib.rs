// SPDX-FileCopyrightText: 2026 Draftmill Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Request classification and provider routing for the Draftmill broker.
//!
//! This crate provides:
//! - [`RequestClassifier`]: Additive-score complexity classification
//!   (zero-cost, zero-latency, pure)
//! - [`ProviderRouter`]: Fixed-rule provider selection with per-request
//!   preferences and a global override
//!
//! The router runs on every cache miss, before the generation call,
//! pairing a complexity tier and token estimate with the provider best
//! suited to the request's purpose, tone, and format.

pub mod classifier;
pub mod router;

pub use classifier::{Classification, RequestClassifier};
pub use router::{ProviderChoice, ProviderRouter};

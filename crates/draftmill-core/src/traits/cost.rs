// SPDX-FileCopyrightText: 2026 Draftmill Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Cost sink trait for usage accounting.

use async_trait::async_trait;

use crate::error::DraftmillError;
use crate::traits::adapter::Collaborator;
use crate::types::ProcessingEvent;

/// Sink for per-request usage records.
///
/// The gateway reports into the sink off the response path (spawned
/// tasks), so implementations may block on I/O. Sink failures must never
/// affect request outcomes; callers log and move on.
#[async_trait]
pub trait CostSink: Collaborator {
    /// Records a cache hit for the given user. Hits consume no tokens.
    async fn record_cache_hit(&self, user_id: &str) -> Result<(), DraftmillError>;

    /// Records a completed generation run.
    async fn record_processing(&self, event: ProcessingEvent) -> Result<(), DraftmillError>;
}

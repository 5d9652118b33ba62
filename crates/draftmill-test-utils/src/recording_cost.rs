// SPDX-FileCopyrightText: 2026 Draftmill Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-memory cost sink that records instead of persisting.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use draftmill_core::error::DraftmillError;
use draftmill_core::traits::{Collaborator, CostSink};
use draftmill_core::types::{HealthStatus, ProcessingEvent};

/// A cost sink that keeps everything in memory.
///
/// Clones share the same buffers, so a test can hand one handle to the
/// gateway and keep another for assertions.
#[derive(Clone, Default)]
pub struct RecordingCostSink {
    hits: Arc<Mutex<Vec<String>>>,
    events: Arc<Mutex<Vec<ProcessingEvent>>>,
}

impl RecordingCostSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// User ids that reported cache hits, in order.
    pub async fn hits(&self) -> Vec<String> {
        self.hits.lock().await.clone()
    }

    pub async fn hit_count(&self) -> usize {
        self.hits.lock().await.len()
    }

    /// Processing events recorded, in order.
    pub async fn events(&self) -> Vec<ProcessingEvent> {
        self.events.lock().await.clone()
    }

    pub async fn event_count(&self) -> usize {
        self.events.lock().await.len()
    }
}

#[async_trait]
impl Collaborator for RecordingCostSink {
    fn name(&self) -> &str {
        "recording-cost-sink"
    }

    async fn health_check(&self) -> Result<HealthStatus, DraftmillError> {
        Ok(HealthStatus::Healthy)
    }
}

#[async_trait]
impl CostSink for RecordingCostSink {
    async fn record_cache_hit(&self, user_id: &str) -> Result<(), DraftmillError> {
        self.hits.lock().await.push(user_id.to_string());
        Ok(())
    }

    async fn record_processing(&self, event: ProcessingEvent) -> Result<(), DraftmillError> {
        self.events.lock().await.push(event);
        Ok(())
    }
}

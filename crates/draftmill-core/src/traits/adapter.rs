// SPDX-FileCopyrightText: 2026 Draftmill Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Base trait that all pipeline collaborators implement.

use async_trait::async_trait;

use crate::error::DraftmillError;
use crate::types::HealthStatus;

/// The base trait for all Draftmill pipeline collaborators.
///
/// Every collaborator (generation, research, embedding, cost) implements
/// this trait, which provides identity and health check capabilities. The
/// gateway aggregates collaborator health into its own status report.
#[async_trait]
pub trait Collaborator: Send + Sync + 'static {
    /// Returns the human-readable name of this collaborator instance.
    fn name(&self) -> &str;

    /// Performs a health check and returns the collaborator's current status.
    async fn health_check(&self) -> Result<HealthStatus, DraftmillError>;
}

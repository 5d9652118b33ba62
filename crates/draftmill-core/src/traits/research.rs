// SPDX-FileCopyrightText: 2026 Draftmill Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Research adapter trait for source-gathering backends.

use async_trait::async_trait;

use crate::error::DraftmillError;
use crate::traits::adapter::Collaborator;
use crate::types::{ContentRequest, ResearchOutput};

/// Adapter for research backends that gather sources and insights
/// ahead of generation.
#[async_trait]
pub trait ResearchAdapter: Collaborator {
    /// Gathers sources and insights relevant to the request's topic and,
    /// when present, its URL reference.
    async fn research(&self, request: &ContentRequest) -> Result<ResearchOutput, DraftmillError>;
}

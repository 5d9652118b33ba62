// SPDX-FileCopyrightText: 2026 Draftmill Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Generation adapter trait for content-producing backends.

use async_trait::async_trait;

use crate::error::DraftmillError;
use crate::traits::adapter::Collaborator;
use crate::types::{ContentRequest, GenerationOutput, ResearchOutput};

/// Adapter for content generation backends.
///
/// Implementations produce all three length variants in one call. Research
/// output, when present, is forwarded so the backend can ground the content
/// in the gathered sources.
#[async_trait]
pub trait GenerationAdapter: Collaborator {
    /// Generates content variants for the given request.
    async fn generate(
        &self,
        request: &ContentRequest,
        research: Option<&ResearchOutput>,
    ) -> Result<GenerationOutput, DraftmillError>;
}

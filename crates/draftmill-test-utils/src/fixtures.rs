// SPDX-FileCopyrightText: 2026 Draftmill Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Pre-built domain values for tests.
//!
//! Every builder takes a `marker` (or topic) so assertions can tell
//! apart values produced at different points in a test.

use draftmill_core::types::{
    ContentResponse, ContentVariants, GenerationOutput, ProviderKind, ResearchOutput,
    ResearchSource, ResponseMetadata, VariantLength,
};

/// Three length variants stamped with `marker`.
pub fn sample_variants(marker: &str) -> ContentVariants {
    ContentVariants {
        short: format!("Short draft for {marker}."),
        medium: format!("Medium draft for {marker}, with a little more room to develop the point."),
        long: format!(
            "Long draft for {marker}. It walks through the argument step by step, \
             gives an example, and closes with a takeaway, so length-sensitive \
             checks have something real to measure."
        ),
    }
}

/// A fully populated response, as the cache tiers would store it.
pub fn sample_response(marker: &str) -> ContentResponse {
    ContentResponse {
        variants: sample_variants(marker),
        selected: VariantLength::Medium,
        sources: Vec::new(),
        quality_score: 0.8,
        metadata: ResponseMetadata {
            processing_ms: 1200,
            tokens_used: 900,
            cache_hit: false,
            provider: ProviderKind::Anthropic,
            confidence: 0.9,
        },
    }
}

/// What a generation backend would return for `marker`.
pub fn sample_generation(marker: &str) -> GenerationOutput {
    GenerationOutput {
        variants: sample_variants(marker),
        tokens_used: 900,
        confidence: 0.9,
        provider: ProviderKind::Anthropic,
    }
}

/// A research result with one source and one insight about `topic`.
pub fn sample_research(topic: &str) -> ResearchOutput {
    ResearchOutput {
        sources: vec![ResearchSource {
            title: format!("Background on {topic}"),
            url: "https://example.com/background".to_string(),
            snippet: format!("Key context on {topic} gathered ahead of generation."),
        }],
        insights: vec![format!(
            "Practitioners care most about the operational side of {topic}."
        )],
        tokens_used: 150,
    }
}

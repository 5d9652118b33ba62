// SPDX-FileCopyrightText: 2026 Draftmill Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Heuristic request complexity classification.
//!
//! Classifies content requests into Simple/Medium/Complex tiers using
//! zero-cost additive scoring over the request's shape. No network, no
//! latency, no side effects.

use draftmill_core::types::{Complexity, ContentRequest, Purpose};

/// Score at or above which a request is Complex.
const COMPLEX_THRESHOLD: u32 = 5;
/// Score at or above which a request is Medium.
const MEDIUM_THRESHOLD: u32 = 2;

/// Topic length (chars) above which the long-topic score applies.
const LONG_TOPIC_CHARS: usize = 500;
/// Topic length (chars) above which the moderate-topic score applies.
const MODERATE_TOPIC_CHARS: usize = 200;

/// Per-tier base token estimate before surcharges.
const BASE_TOKENS_SIMPLE: u32 = 300;
const BASE_TOKENS_MEDIUM: u32 = 600;
const BASE_TOKENS_COMPLEX: u32 = 1000;

/// Flat token surcharge when the research stage runs.
const RESEARCH_TOKEN_SURCHARGE: u32 = 400;

/// Every generation produces three length variants.
const VARIANT_COUNT: u32 = 3;

/// Result of classifying a request's complexity.
#[derive(Debug, Clone)]
pub struct Classification {
    /// The classified complexity tier.
    pub complexity: Complexity,
    /// Estimated token cost for fulfilling the request.
    pub estimated_tokens: u32,
    /// The raw additive score, exposed for logging.
    pub score: u32,
    /// Human-readable reason for the classification.
    pub reason: &'static str,
}

/// Heuristic request classifier with zero cost and zero latency.
pub struct RequestClassifier;

impl RequestClassifier {
    pub fn new() -> Self {
        Self
    }

    /// Classify a request's complexity using additive scoring.
    ///
    /// Pure and deterministic: the same request always produces the same
    /// classification.
    pub fn classify(&self, request: &ContentRequest) -> Classification {
        let mut score: u32 = 0;

        // Signal 1: topic length
        let topic_chars = request.topic.chars().count();
        if topic_chars > LONG_TOPIC_CHARS {
            score += 2;
        } else if topic_chars > MODERATE_TOPIC_CHARS {
            score += 1;
        }

        // Signal 2: research stage requested
        if request.enable_research {
            score += 2;
        }

        // Signal 3: URL reference to ground against
        if request.url_reference.is_some() {
            score += 1;
        }

        // Signal 4: template-driven
        if request.template_id.is_some() {
            score += 1;
        }

        // Signal 5: prior patterns to honor
        if !request.pattern_hints.is_empty() {
            score += 1;
        }

        // Signal 6: thought leadership needs more depth
        if request.purpose == Purpose::ThoughtLeadership {
            score += 1;
        }

        let (complexity, reason) = Self::score_to_complexity(score);
        let estimated_tokens = Self::estimate_tokens(complexity, request.enable_research);

        Classification {
            complexity,
            estimated_tokens,
            score,
            reason,
        }
    }

    fn score_to_complexity(score: u32) -> (Complexity, &'static str) {
        if score >= COMPLEX_THRESHOLD {
            (Complexity::Complex, "complex request indicators")
        } else if score >= MEDIUM_THRESHOLD {
            (Complexity::Medium, "moderate request indicators")
        } else {
            (Complexity::Simple, "simple request")
        }
    }

    /// Per-tier base, plus the research surcharge, times three variants.
    fn estimate_tokens(complexity: Complexity, research: bool) -> u32 {
        let base = match complexity {
            Complexity::Simple => BASE_TOKENS_SIMPLE,
            Complexity::Medium => BASE_TOKENS_MEDIUM,
            Complexity::Complex => BASE_TOKENS_COMPLEX,
        };
        let per_variant = if research {
            base + RESEARCH_TOKEN_SURCHARGE
        } else {
            base
        };
        per_variant * VARIANT_COUNT
    }
}

impl Default for RequestClassifier {
    fn default() -> Self {
        Self::new()
    }
}

// SPDX-FileCopyrightText: 2026 Draftmill Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Tier selection and TTL policy.

use std::time::Duration;

use draftmill_config::CacheConfig;
use draftmill_core::types::{CacheTier, Complexity, ContentRequest};

/// Decides where a fresh response is written and for how long.
///
/// Tier rules are checked in a fixed order: research results age fast
/// and stay shareable (L2), template-driven output is the most stable
/// (L3), pattern-informed output is shareable (L2), and anything simple
/// stays in the short-lived local tier.
#[derive(Debug, Clone)]
pub struct CacheStrategy {
    config: CacheConfig,
}

impl CacheStrategy {
    pub fn new(config: CacheConfig) -> Self {
        Self { config }
    }

    /// Picks the write tier and TTL for a fresh response.
    pub fn choose(&self, request: &ContentRequest, complexity: Complexity) -> (CacheTier, Duration) {
        let tier = self.tier_for(request, complexity);
        (tier, self.ttl_for(tier, request))
    }

    fn tier_for(&self, request: &ContentRequest, complexity: Complexity) -> CacheTier {
        if request.enable_research {
            return CacheTier::L2;
        }
        if request.template_id.is_some() {
            return CacheTier::L3;
        }
        if !request.pattern_hints.is_empty() {
            return CacheTier::L2;
        }
        match complexity {
            Complexity::Simple => CacheTier::L1,
            Complexity::Medium | Complexity::Complex => CacheTier::L2,
        }
    }

    /// Base TTL for the tier, scaled by the request's multipliers.
    /// Multipliers stack when a request is both researched and templated.
    fn ttl_for(&self, tier: CacheTier, request: &ContentRequest) -> Duration {
        let base_secs = match tier {
            CacheTier::L1 => self.config.l1_ttl_secs,
            CacheTier::L2 => self.config.l2_ttl_secs,
            CacheTier::L3 => self.config.l3_ttl_secs,
        };
        let mut ttl = base_secs as f64;
        if request.enable_research {
            ttl *= self.config.research_ttl_multiplier;
        }
        if request.template_id.is_some() {
            ttl *= self.config.template_ttl_multiplier;
        }
        Duration::from_secs_f64(ttl.max(1.0))
    }
}

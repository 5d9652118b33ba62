// SPDX-FileCopyrightText: 2026 Draftmill Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Provider routing with per-request overrides and a fixed decision rule.
//!
//! Orchestrates provider selection: per-request preference > global
//! force_provider > heuristic rules keyed on complexity, purpose, tone,
//! and format.

use draftmill_config::RoutingConfig;
use draftmill_core::types::{Complexity, ContentRequest, Format, ProviderKind, Purpose, Tone};
use tracing::debug;

/// Provider selection outcome with the rule that produced it.
#[derive(Debug, Clone)]
pub struct ProviderChoice {
    /// The selected provider.
    pub provider: ProviderKind,
    /// Human-readable reason for the selection.
    pub reason: &'static str,
}

/// Selects the generation provider for a classified request.
pub struct ProviderRouter {
    config: RoutingConfig,
}

impl ProviderRouter {
    /// Create a new provider router with the given configuration.
    pub fn new(config: RoutingConfig) -> Self {
        Self { config }
    }

    /// Select a provider for the request.
    ///
    /// Priority order:
    /// 1. Explicit per-request preference
    /// 2. Global force_provider config
    /// 3. Heuristic rules: complex or thought-leadership requests go to
    ///    Anthropic; casual tone or story format go to OpenAI; everything
    ///    else uses the configured default.
    pub fn select(&self, request: &ContentRequest, complexity: Complexity) -> ProviderChoice {
        let choice = self.decide(request, complexity);
        debug!(
            provider = %choice.provider,
            complexity = %complexity,
            reason = choice.reason,
            "provider selected"
        );
        choice
    }

    fn decide(&self, request: &ContentRequest, complexity: Complexity) -> ProviderChoice {
        if let Some(preferred) = request.preferred_provider {
            return ProviderChoice {
                provider: preferred,
                reason: "per-request preference",
            };
        }

        if let Some(forced) = self.config.force_provider {
            return ProviderChoice {
                provider: forced,
                reason: "global force_provider config",
            };
        }

        if !self.config.enabled {
            return ProviderChoice {
                provider: self.config.default_provider,
                reason: "routing disabled",
            };
        }

        if complexity == Complexity::Complex || request.purpose == Purpose::ThoughtLeadership {
            return ProviderChoice {
                provider: ProviderKind::Anthropic,
                reason: "depth-weighted request",
            };
        }

        if request.tone == Tone::Casual || request.format == Format::Story {
            return ProviderChoice {
                provider: ProviderKind::Openai,
                reason: "conversational request",
            };
        }

        ProviderChoice {
            provider: self.config.default_provider,
            reason: "default provider",
        }
    }
}

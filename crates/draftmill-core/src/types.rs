// SPDX-FileCopyrightText: 2026 Draftmill Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Common types used across adapter traits and the Draftmill pipeline.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Why a piece of content is being created.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "kebab-case")]
#[serde(rename_all = "kebab-case")]
pub enum Purpose {
    ThoughtLeadership,
    Value,
    Engagement,
    Promotion,
    Announcement,
}

/// The structural shape of the requested post.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "kebab-case")]
#[serde(rename_all = "kebab-case")]
pub enum Format {
    Insight,
    Story,
    Listicle,
    Question,
    HowTo,
}

/// Voice the generated content should carry.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "kebab-case")]
#[serde(rename_all = "kebab-case")]
pub enum Tone {
    Professional,
    Casual,
    Bold,
    Friendly,
    Analytical,
}

/// Upstream generation provider families the router can choose between.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "kebab-case")]
#[serde(rename_all = "kebab-case")]
pub enum ProviderKind {
    Anthropic,
    Openai,
}

/// Complexity tier assigned by the request classifier. Ordered: more
/// complex compares greater.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Display, EnumString, Serialize,
    Deserialize,
)]
#[strum(serialize_all = "kebab-case")]
#[serde(rename_all = "kebab-case")]
pub enum Complexity {
    Simple,
    Medium,
    Complex,
}

/// Cache tiers, ordered fastest to most durable.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Display, EnumString, Serialize,
    Deserialize,
)]
#[strum(serialize_all = "kebab-case")]
#[serde(rename_all = "kebab-case")]
pub enum CacheTier {
    L1,
    L2,
    L3,
}

/// Which of the three generated variants a response surfaces by default.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "kebab-case")]
#[serde(rename_all = "kebab-case")]
pub enum VariantLength {
    Short,
    Medium,
    Long,
}

/// Kinds of learned user patterns.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "kebab-case")]
#[serde(rename_all = "kebab-case")]
pub enum PatternKind {
    SuccessfulPost,
    Template,
    StylePreference,
}

/// Health status reported by collaborator health checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthStatus {
    /// Collaborator is fully operational.
    Healthy,
    /// Collaborator is operational but experiencing issues.
    Degraded(String),
    /// Collaborator is not operational.
    Unhealthy(String),
}

/// A structured request for generated content.
///
/// Immutable once constructed; every downstream stage (classifier, cache
/// key, provider prompt) reads the same value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentRequest {
    /// Free-text subject the content should cover.
    pub topic: String,
    pub purpose: Purpose,
    pub format: Format,
    pub tone: Tone,
    /// Audience description, e.g. "engineering leaders".
    pub target_audience: String,
    /// When set, the pipeline runs the research stage before generation.
    pub enable_research: bool,
    /// Optional URL whose content should inform the post.
    pub url_reference: Option<String>,
    /// Optional template the content should be shaped by.
    pub template_id: Option<String>,
    pub user_id: String,
    pub session_id: Option<String>,
    /// Explicit provider override; wins over all routing rules.
    pub preferred_provider: Option<ProviderKind>,
    /// Ids of previously learned patterns the caller wants applied.
    pub pattern_hints: Vec<String>,
}

impl ContentRequest {
    /// Minimal well-formed request; tests and callers fill in the rest.
    pub fn new(topic: impl Into<String>, user_id: impl Into<String>) -> Self {
        Self {
            topic: topic.into(),
            purpose: Purpose::Value,
            format: Format::Insight,
            tone: Tone::Professional,
            target_audience: String::new(),
            enable_research: false,
            url_reference: None,
            template_id: None,
            user_id: user_id.into(),
            session_id: None,
            preferred_provider: None,
            pattern_hints: Vec::new(),
        }
    }
}

/// Three length variants produced for every generation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentVariants {
    pub short: String,
    pub medium: String,
    pub long: String,
}

impl ContentVariants {
    pub fn get(&self, length: VariantLength) -> &str {
        match length {
            VariantLength::Short => &self.short,
            VariantLength::Medium => &self.medium,
            VariantLength::Long => &self.long,
        }
    }
}

/// A single source surfaced by the research stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResearchSource {
    pub title: String,
    pub url: String,
    pub snippet: String,
}

/// Metadata attached to every response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseMetadata {
    /// Wall-clock milliseconds spent producing this response. Refreshed on
    /// cache hits so callers see the hit latency, not the original cost.
    pub processing_ms: u64,
    pub tokens_used: u32,
    pub cache_hit: bool,
    pub provider: ProviderKind,
    /// Provider-reported confidence in the generation, in `[0, 1]`.
    pub confidence: f64,
}

/// The broker's answer to a [`ContentRequest`]. This is also the value
/// serialized into the SQLite cache tiers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentResponse {
    pub variants: ContentVariants,
    pub selected: VariantLength,
    pub sources: Vec<ResearchSource>,
    /// Heuristic quality score in `[0, 1]`.
    pub quality_score: f64,
    pub metadata: ResponseMetadata,
}

/// Routing outcome for one request. Ephemeral; never persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct RouteDecision {
    pub cache_hit: bool,
    pub complexity: Complexity,
    pub estimated_tokens: u32,
    pub provider: ProviderKind,
    /// Tier a fresh generation will be cached into; `None` on cache hits.
    pub cache_tier: Option<CacheTier>,
}

/// What a generation adapter returns.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationOutput {
    pub variants: ContentVariants,
    pub tokens_used: u32,
    pub confidence: f64,
    pub provider: ProviderKind,
}

/// What a research adapter returns.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ResearchOutput {
    pub sources: Vec<ResearchSource>,
    pub insights: Vec<String>,
    pub tokens_used: u32,
}

/// Engagement counters reported back for a published post.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct EngagementSignals {
    pub likes: u64,
    pub comments: u64,
    pub shares: u64,
    pub impressions: u64,
}

impl EngagementSignals {
    /// Active-engagement total; impressions are deliberately excluded.
    pub fn total(&self) -> u64 {
        self.likes + self.comments + self.shares
    }
}

/// One completed (non-cached) pipeline run, reported to the cost sink.
#[derive(Debug, Clone, PartialEq)]
pub struct ProcessingEvent {
    pub user_id: String,
    pub tokens_used: u32,
    pub processing_ms: u64,
    pub provider: ProviderKind,
    pub complexity: Complexity,
}

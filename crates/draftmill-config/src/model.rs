// SPDX-FileCopyrightText: 2026 Draftmill Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the Draftmill content broker.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use draftmill_core::types::ProviderKind;
use serde::{Deserialize, Serialize};

/// Top-level Draftmill configuration.
///
/// Loaded from TOML files following XDG hierarchy, with environment variable overrides.
/// All sections are optional and default to sensible values.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct DraftmillConfig {
    /// Broker identity and request-handling settings.
    #[serde(default)]
    pub broker: BrokerConfig,

    /// Storage backend settings.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Multi-tier response cache settings.
    #[serde(default)]
    pub cache: CacheConfig,

    /// Provider routing settings.
    #[serde(default)]
    pub routing: RoutingConfig,

    /// Pattern learning settings.
    #[serde(default)]
    pub learning: LearningConfig,

    /// Embedding backend settings.
    #[serde(default)]
    pub embedding: EmbeddingConfig,

    /// Usage accounting settings.
    #[serde(default)]
    pub cost: CostConfig,
}

/// Broker identity and request-handling configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct BrokerConfig {
    /// Display name of the broker instance.
    #[serde(default = "default_broker_name")]
    pub name: String,

    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Per-user request budget per fixed one-minute window.
    #[serde(default = "default_rate_limit_per_minute")]
    pub rate_limit_per_minute: u32,
}

impl Default for BrokerConfig {
    fn default() -> Self {
        Self {
            name: default_broker_name(),
            log_level: default_log_level(),
            rate_limit_per_minute: default_rate_limit_per_minute(),
        }
    }
}

fn default_broker_name() -> String {
    "draftmill".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_rate_limit_per_minute() -> u32 {
    20
}

/// Storage backend configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_database_path")]
    pub database_path: String,

    /// Enable WAL (Write-Ahead Logging) mode for SQLite.
    #[serde(default = "default_wal_mode")]
    pub wal_mode: bool,

    /// SQLite busy handler timeout in milliseconds.
    #[serde(default = "default_busy_timeout_ms")]
    pub busy_timeout_ms: u64,

    /// Upper bound on any single cache or pattern query. Queries that
    /// exceed it degrade (cache read becomes a miss, pattern read becomes
    /// an empty set) rather than stalling the pipeline.
    #[serde(default = "default_query_timeout_secs")]
    pub query_timeout_secs: u64,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            wal_mode: default_wal_mode(),
            busy_timeout_ms: default_busy_timeout_ms(),
            query_timeout_secs: default_query_timeout_secs(),
        }
    }
}

fn default_database_path() -> String {
    dirs::data_dir()
        .map(|p| p.join("draftmill").join("draftmill.db"))
        .unwrap_or_else(|| std::path::PathBuf::from("draftmill.db"))
        .to_string_lossy()
        .into_owned()
}

fn default_wal_mode() -> bool {
    true
}

fn default_busy_timeout_ms() -> u64 {
    5000
}

fn default_query_timeout_secs() -> u64 {
    4
}

/// Multi-tier response cache configuration.
///
/// Base TTLs apply per tier; the research and template multipliers adjust
/// the chosen tier's TTL and stack when both apply.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct CacheConfig {
    /// Base TTL for the in-process L1 tier, in seconds.
    #[serde(default = "default_l1_ttl_secs")]
    pub l1_ttl_secs: u64,

    /// Base TTL for the shared SQLite L2 tier, in seconds.
    #[serde(default = "default_l2_ttl_secs")]
    pub l2_ttl_secs: u64,

    /// Base TTL for the durable SQLite L3 tier, in seconds.
    #[serde(default = "default_l3_ttl_secs")]
    pub l3_ttl_secs: u64,

    /// TTL factor applied when a request ran research (fresher sources
    /// age faster).
    #[serde(default = "default_research_ttl_multiplier")]
    pub research_ttl_multiplier: f64,

    /// TTL factor applied when a request is template-driven (templates
    /// stay valid longer).
    #[serde(default = "default_template_ttl_multiplier")]
    pub template_ttl_multiplier: f64,

    /// Interval between expired-entry sweeps, in seconds.
    #[serde(default = "default_sweep_interval_secs")]
    pub sweep_interval_secs: u64,

    /// Maximum number of entries held in the L1 tier.
    #[serde(default = "default_l1_max_entries")]
    pub l1_max_entries: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            l1_ttl_secs: default_l1_ttl_secs(),
            l2_ttl_secs: default_l2_ttl_secs(),
            l3_ttl_secs: default_l3_ttl_secs(),
            research_ttl_multiplier: default_research_ttl_multiplier(),
            template_ttl_multiplier: default_template_ttl_multiplier(),
            sweep_interval_secs: default_sweep_interval_secs(),
            l1_max_entries: default_l1_max_entries(),
        }
    }
}

fn default_l1_ttl_secs() -> u64 {
    300 // 5 minutes
}

fn default_l2_ttl_secs() -> u64 {
    86_400 // 24 hours
}

fn default_l3_ttl_secs() -> u64 {
    604_800 // 7 days
}

fn default_research_ttl_multiplier() -> f64 {
    0.5
}

fn default_template_ttl_multiplier() -> f64 {
    2.0
}

fn default_sweep_interval_secs() -> u64 {
    600 // 10 minutes
}

fn default_l1_max_entries() -> usize {
    10_000
}

/// Provider routing configuration.
///
/// When disabled, every request goes to `default_provider`. `force_provider`
/// bypasses classification entirely without touching caller preferences.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct RoutingConfig {
    /// Enable heuristic provider selection.
    #[serde(default = "default_routing_enabled")]
    pub enabled: bool,

    /// Force all requests to a specific provider, bypassing selection rules.
    #[serde(default)]
    pub force_provider: Option<ProviderKind>,

    /// Provider used when no rule matches or routing is disabled.
    #[serde(default = "default_provider")]
    pub default_provider: ProviderKind,
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self {
            enabled: default_routing_enabled(),
            force_provider: None,
            default_provider: default_provider(),
        }
    }
}

fn default_routing_enabled() -> bool {
    true
}

fn default_provider() -> ProviderKind {
    ProviderKind::Anthropic
}

/// Pattern learning configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct LearningConfig {
    /// Enable the pattern learning engine. When false, no patterns are
    /// learned or retrieved.
    #[serde(default = "default_learning_enabled")]
    pub enabled: bool,

    /// Minimum cosine similarity for a pattern to count as a match (0.0-1.0).
    #[serde(default = "default_similarity_threshold")]
    pub similarity_threshold: f64,

    /// Number of matches returned by similarity search. Hard-capped at 10.
    #[serde(default = "default_max_matches")]
    pub max_matches: usize,

    /// Minimum active engagement (likes + comments + shares) before a
    /// published post is considered successful and worth learning from.
    #[serde(default = "default_engagement_threshold")]
    pub engagement_threshold: u64,

    /// TTL for the short-lived per-user pattern read cache, in seconds.
    #[serde(default = "default_pattern_cache_ttl_secs")]
    pub pattern_cache_ttl_secs: u64,
}

impl Default for LearningConfig {
    fn default() -> Self {
        Self {
            enabled: default_learning_enabled(),
            similarity_threshold: default_similarity_threshold(),
            max_matches: default_max_matches(),
            engagement_threshold: default_engagement_threshold(),
            pattern_cache_ttl_secs: default_pattern_cache_ttl_secs(),
        }
    }
}

fn default_learning_enabled() -> bool {
    true
}

fn default_similarity_threshold() -> f64 {
    0.75
}

fn default_max_matches() -> usize {
    5
}

fn default_engagement_threshold() -> u64 {
    500
}

fn default_pattern_cache_ttl_secs() -> u64 {
    60
}

/// Which backend produces embeddings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum EmbeddingMode {
    /// Hash-seeded deterministic vectors; no network, always available.
    Deterministic,
    /// OpenAI-compatible `/embeddings` HTTP endpoint.
    Http,
}

impl Default for EmbeddingMode {
    fn default() -> Self {
        Self::Deterministic
    }
}

/// Embedding backend configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct EmbeddingConfig {
    /// Backend selection. The HTTP backend falls back to deterministic
    /// vectors on request failure.
    #[serde(default)]
    pub mode: EmbeddingMode,

    /// Dimensionality of produced vectors.
    #[serde(default = "default_embedding_dimension")]
    pub dimension: usize,

    /// Base URL of the OpenAI-compatible embeddings API (HTTP mode only).
    #[serde(default = "default_embedding_endpoint")]
    pub endpoint: String,

    /// API key for the embeddings endpoint. `None` requires environment
    /// variable or deterministic mode.
    #[serde(default)]
    pub api_key: Option<String>,

    /// Embedding model identifier sent to the HTTP endpoint.
    #[serde(default = "default_embedding_model")]
    pub model: String,

    /// Maximum number of memoized embeddings held in memory.
    #[serde(default = "default_memo_capacity")]
    pub memo_capacity: usize,

    /// HTTP request timeout in seconds (HTTP mode only).
    #[serde(default = "default_embedding_timeout_secs")]
    pub request_timeout_secs: u64,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            mode: EmbeddingMode::default(),
            dimension: default_embedding_dimension(),
            endpoint: default_embedding_endpoint(),
            api_key: None,
            model: default_embedding_model(),
            memo_capacity: default_memo_capacity(),
            request_timeout_secs: default_embedding_timeout_secs(),
        }
    }
}

fn default_embedding_dimension() -> usize {
    1536
}

fn default_embedding_endpoint() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_embedding_model() -> String {
    "text-embedding-3-small".to_string()
}

fn default_memo_capacity() -> usize {
    2048
}

fn default_embedding_timeout_secs() -> u64 {
    10
}

/// Usage accounting configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct CostConfig {
    /// Whether to record token usage per request.
    #[serde(default = "default_track_tokens")]
    pub track_tokens: bool,
}

impl Default for CostConfig {
    fn default() -> Self {
        Self {
            track_tokens: default_track_tokens(),
        }
    }
}

fn default_track_tokens() -> bool {
    true
}

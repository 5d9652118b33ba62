// SPDX-FileCopyrightText: 2026 Draftmill Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./draftmill.toml` > `~/.config/draftmill/draftmill.toml` > `/etc/draftmill/draftmill.toml`
//! with environment variable overrides via `DRAFTMILL_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::Path;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};

use crate::model::DraftmillConfig;

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/draftmill/draftmill.toml` (system-wide)
/// 3. `~/.config/draftmill/draftmill.toml` (user XDG config)
/// 4. `./draftmill.toml` (local directory)
/// 5. `DRAFTMILL_*` environment variables
pub fn load_config() -> Result<DraftmillConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(DraftmillConfig::default()))
        .merge(Toml::file("/etc/draftmill/draftmill.toml"))
        .merge(Toml::file(
            dirs::config_dir()
                .map(|d| d.join("draftmill/draftmill.toml"))
                .unwrap_or_default(),
        ))
        .merge(Toml::file("draftmill.toml"))
        .merge(env_provider())
        .extract()
}

/// Load configuration from a TOML string only (no XDG lookup, no env).
///
/// Used for testing and for callers that carry their own config text.
pub fn load_config_from_str(toml_content: &str) -> Result<DraftmillConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(DraftmillConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<DraftmillConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(DraftmillConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Create the environment variable provider using explicit `map()` for section-to-dot mapping.
///
/// Uses `Env::map()` NOT `Env::split("_")` to avoid ambiguity with
/// underscore-containing key names. For example,
/// `DRAFTMILL_CACHE_L1_TTL_SECS` must map to `cache.l1_ttl_secs`,
/// not `cache.l1.ttl.secs`.
fn env_provider() -> Env {
    Env::prefixed("DRAFTMILL_").map(|key| {
        // `key` is the lowercased env var name with prefix stripped.
        // Example: DRAFTMILL_STORAGE_DATABASE_PATH -> "storage_database_path"
        let key_str = key.as_str();
        let mapped = key_str
            .replacen("broker_", "broker.", 1)
            .replacen("storage_", "storage.", 1)
            .replacen("cache_", "cache.", 1)
            .replacen("routing_", "routing.", 1)
            .replacen("learning_", "learning.", 1)
            .replacen("embedding_", "embedding.", 1)
            .replacen("cost_", "cost.", 1);
        mapped.into()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use draftmill_core::types::ProviderKind;

    #[test]
    fn defaults_load_without_any_source() {
        let config = load_config_from_str("").unwrap();
        assert_eq!(config.broker.name, "draftmill");
        assert_eq!(config.cache.l1_ttl_secs, 300);
        assert_eq!(config.cache.l2_ttl_secs, 86_400);
        assert_eq!(config.cache.l3_ttl_secs, 604_800);
        assert_eq!(config.learning.similarity_threshold, 0.75);
        assert_eq!(config.embedding.dimension, 1536);
        assert_eq!(config.routing.default_provider, ProviderKind::Anthropic);
    }

    #[test]
    fn toml_overrides_defaults() {
        let config = load_config_from_str(
            r#"
[broker]
rate_limit_per_minute = 5

[cache]
l1_ttl_secs = 60

[learning]
engagement_threshold = 1000
"#,
        )
        .unwrap();
        assert_eq!(config.broker.rate_limit_per_minute, 5);
        assert_eq!(config.cache.l1_ttl_secs, 60);
        assert_eq!(config.learning.engagement_threshold, 1000);
        // Untouched sections keep their defaults.
        assert_eq!(config.cache.l2_ttl_secs, 86_400);
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let result = load_config_from_str(
            r#"
[cache]
l1_ttl_seconds = 60
"#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn embedding_mode_parses_kebab_case() {
        let config = load_config_from_str(
            r#"
[embedding]
mode = "http"
api_key = "sk-test"
"#,
        )
        .unwrap();
        assert_eq!(config.embedding.mode, crate::model::EmbeddingMode::Http);
        assert_eq!(config.embedding.api_key.as_deref(), Some("sk-test"));
    }

    #[test]
    fn force_provider_parses() {
        let config = load_config_from_str(
            r#"
[routing]
force_provider = "openai"
"#,
        )
        .unwrap();
        assert_eq!(config.routing.force_provider, Some(ProviderKind::Openai));
    }
}

// SPDX-FileCopyrightText: 2026 Draftmill Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Validates semantic constraints that cannot be expressed via serde
//! attributes, such as threshold ranges, non-zero TTLs, and non-empty paths.

use crate::diagnostic::ConfigError;
use crate::model::{DraftmillConfig, EmbeddingMode};

/// Hard upper bound on similarity matches regardless of configuration.
pub const MAX_SIMILARITY_MATCHES: usize = 10;

/// Validate a deserialized configuration for semantic correctness.
///
/// Returns `Ok(())` if all validations pass, or `Err(Vec<ConfigError>)` with
/// all collected validation errors (does not fail fast).
pub fn validate_config(config: &DraftmillConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    if config.broker.name.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "broker.name must not be empty".to_string(),
        });
    }

    if config.broker.rate_limit_per_minute == 0 {
        errors.push(ConfigError::Validation {
            message: "broker.rate_limit_per_minute must be at least 1".to_string(),
        });
    }

    if config.storage.database_path.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "storage.database_path must not be empty".to_string(),
        });
    }

    if config.storage.query_timeout_secs == 0 {
        errors.push(ConfigError::Validation {
            message: "storage.query_timeout_secs must be at least 1".to_string(),
        });
    }

    for (name, ttl) in [
        ("cache.l1_ttl_secs", config.cache.l1_ttl_secs),
        ("cache.l2_ttl_secs", config.cache.l2_ttl_secs),
        ("cache.l3_ttl_secs", config.cache.l3_ttl_secs),
    ] {
        if ttl == 0 {
            errors.push(ConfigError::Validation {
                message: format!("{name} must be at least 1 second"),
            });
        }
    }

    for (name, mult) in [
        (
            "cache.research_ttl_multiplier",
            config.cache.research_ttl_multiplier,
        ),
        (
            "cache.template_ttl_multiplier",
            config.cache.template_ttl_multiplier,
        ),
    ] {
        if !(mult > 0.0) {
            errors.push(ConfigError::Validation {
                message: format!("{name} must be positive, got {mult}"),
            });
        }
    }

    if config.cache.sweep_interval_secs < 60 {
        errors.push(ConfigError::Validation {
            message: format!(
                "cache.sweep_interval_secs must be at least 60, got {}",
                config.cache.sweep_interval_secs
            ),
        });
    }

    if config.cache.l1_max_entries == 0 {
        errors.push(ConfigError::Validation {
            message: "cache.l1_max_entries must be at least 1".to_string(),
        });
    }

    let threshold = config.learning.similarity_threshold;
    if !(0.0..=1.0).contains(&threshold) {
        errors.push(ConfigError::Validation {
            message: format!(
                "learning.similarity_threshold must be within 0.0..=1.0, got {threshold}"
            ),
        });
    }

    if config.learning.max_matches == 0 || config.learning.max_matches > MAX_SIMILARITY_MATCHES {
        errors.push(ConfigError::Validation {
            message: format!(
                "learning.max_matches must be within 1..={MAX_SIMILARITY_MATCHES}, got {}",
                config.learning.max_matches
            ),
        });
    }

    if config.learning.pattern_cache_ttl_secs == 0 {
        errors.push(ConfigError::Validation {
            message: "learning.pattern_cache_ttl_secs must be at least 1".to_string(),
        });
    }

    if config.embedding.dimension == 0 {
        errors.push(ConfigError::Validation {
            message: "embedding.dimension must be at least 1".to_string(),
        });
    }

    if config.embedding.memo_capacity == 0 {
        errors.push(ConfigError::Validation {
            message: "embedding.memo_capacity must be at least 1".to_string(),
        });
    }

    if config.embedding.mode == EmbeddingMode::Http
        && config.embedding.endpoint.trim().is_empty()
    {
        errors.push(ConfigError::Validation {
            message: "embedding.endpoint must not be empty in http mode".to_string(),
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_validates() {
        let config = DraftmillConfig::default();
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn empty_database_path_fails_validation() {
        let mut config = DraftmillConfig::default();
        config.storage.database_path = "".to_string();
        let errors = validate_config(&config).unwrap_err();
        assert!(errors
            .iter()
            .any(|e| matches!(e, ConfigError::Validation { message } if message.contains("database_path"))));
    }

    #[test]
    fn out_of_range_threshold_fails_validation() {
        let mut config = DraftmillConfig::default();
        config.learning.similarity_threshold = 1.5;
        let errors = validate_config(&config).unwrap_err();
        assert!(errors
            .iter()
            .any(|e| matches!(e, ConfigError::Validation { message } if message.contains("similarity_threshold"))));
    }

    #[test]
    fn zero_ttl_fails_validation() {
        let mut config = DraftmillConfig::default();
        config.cache.l2_ttl_secs = 0;
        let errors = validate_config(&config).unwrap_err();
        assert!(errors
            .iter()
            .any(|e| matches!(e, ConfigError::Validation { message } if message.contains("l2_ttl_secs"))));
    }

    #[test]
    fn max_matches_above_cap_fails_validation() {
        let mut config = DraftmillConfig::default();
        config.learning.max_matches = 25;
        let errors = validate_config(&config).unwrap_err();
        assert!(errors
            .iter()
            .any(|e| matches!(e, ConfigError::Validation { message } if message.contains("max_matches"))));
    }

    #[test]
    fn http_mode_requires_endpoint() {
        let mut config = DraftmillConfig::default();
        config.embedding.mode = EmbeddingMode::Http;
        config.embedding.endpoint = "  ".to_string();
        let errors = validate_config(&config).unwrap_err();
        assert!(errors
            .iter()
            .any(|e| matches!(e, ConfigError::Validation { message } if message.contains("embedding.endpoint"))));
    }

    #[test]
    fn multiple_errors_collected() {
        let mut config = DraftmillConfig::default();
        config.storage.database_path = "".to_string();
        config.cache.l1_ttl_secs = 0;
        config.learning.similarity_threshold = -0.1;
        let errors = validate_config(&config).unwrap_err();
        assert!(errors.len() >= 3);
    }

    #[test]
    fn valid_custom_config_passes() {
        let mut config = DraftmillConfig::default();
        config.storage.database_path = "/tmp/test.db".to_string();
        config.cache.sweep_interval_secs = 1800;
        config.learning.max_matches = 10;
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn partial_toml_fills_section_defaults() {
        let toml_str = r#"
[broker]
name = "staging-broker"

[cache]
l1_ttl_secs = 120
"#;
        let config: DraftmillConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.broker.name, "staging-broker");
        assert_eq!(config.broker.rate_limit_per_minute, 20);
        assert_eq!(config.cache.l1_ttl_secs, 120);
        assert_eq!(config.cache.l2_ttl_secs, 86_400);
        assert_eq!(config.learning.max_matches, 5);
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let toml_str = r#"
[cache]
l1_ttl_secs = 120
eviction_policy = "lru"
"#;
        let result = toml::from_str::<DraftmillConfig>(toml_str);
        assert!(result.is_err());
    }

    #[test]
    fn embedding_mode_and_provider_parse_kebab_case() {
        let toml_str = r#"
[embedding]
mode = "http"
endpoint = "https://embeddings.internal/v1"

[routing]
default_provider = "openai"
"#;
        let config: DraftmillConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.embedding.mode, EmbeddingMode::Http);
        assert_eq!(
            config.routing.default_provider,
            draftmill_core::types::ProviderKind::Openai
        );
        assert!(validate_config(&config).is_ok());
    }
}

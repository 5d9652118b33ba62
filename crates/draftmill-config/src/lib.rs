// SPDX-FileCopyrightText: 2026 Draftmill Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration system for the Draftmill content broker.
//!
//! Provides TOML configuration parsing with strict validation
//! (`deny_unknown_fields`), XDG file hierarchy lookup, environment variable
//! overrides, and diagnostic error rendering with typo suggestions.
//!
//! # Usage
//!
//! ```no_run
//! use draftmill_config::load_and_validate;
//!
//! let config = load_and_validate().expect("config errors");
//! println!("Broker name: {}", config.broker.name);
//! ```

pub mod diagnostic;
pub mod loader;
pub mod model;
pub mod validation;

pub use diagnostic::{render_errors, ConfigError};
pub use loader::{load_config, load_config_from_path, load_config_from_str};
pub use model::{
    BrokerConfig, CacheConfig, CostConfig, DraftmillConfig, EmbeddingConfig, EmbeddingMode,
    LearningConfig, RoutingConfig, StorageConfig,
};
pub use validation::MAX_SIMILARITY_MATCHES;

/// Load configuration from the XDG hierarchy and validate it.
///
/// This is the high-level entry point that:
/// 1. Loads config from TOML files + env vars via Figment
/// 2. On success: runs post-deserialization validation
/// 3. On Figment error: converts to diagnostics with typo suggestions
///
/// Returns either a valid `DraftmillConfig` or a list of diagnostic errors.
pub fn load_and_validate() -> Result<DraftmillConfig, Vec<ConfigError>> {
    match loader::load_config() {
        Ok(config) => {
            validation::validate_config(&config)?;
            Ok(config)
        }
        Err(err) => Err(diagnostic::figment_to_config_errors(err)),
    }
}

/// Load configuration from a specific TOML string and validate it.
///
/// Useful for testing and explicit configuration.
pub fn load_and_validate_str(toml_content: &str) -> Result<DraftmillConfig, Vec<ConfigError>> {
    match loader::load_config_from_str(toml_content) {
        Ok(config) => {
            validation::validate_config(&config)?;
            Ok(config)
        }
        Err(err) => Err(diagnostic::figment_to_config_errors(err)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_and_validate_str_accepts_defaults() {
        let config = load_and_validate_str("").expect("defaults should validate");
        assert_eq!(config.broker.name, "draftmill");
    }

    #[test]
    fn load_and_validate_str_reports_unknown_key() {
        let errors = load_and_validate_str(
            r#"
[learning]
similarity_treshold = 0.8
"#,
        )
        .unwrap_err();
        assert!(errors
            .iter()
            .any(|e| matches!(e, ConfigError::UnknownKey { key, .. } if key == "similarity_treshold")));
    }

    #[test]
    fn load_and_validate_str_reports_semantic_errors() {
        let errors = load_and_validate_str(
            r#"
[cache]
l3_ttl_secs = 0
"#,
        )
        .unwrap_err();
        assert!(errors
            .iter()
            .any(|e| matches!(e, ConfigError::Validation { message } if message.contains("l3_ttl_secs"))));
    }
}

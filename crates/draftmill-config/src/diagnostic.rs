// SPDX-FileCopyrightText: 2026 Draftmill Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Figment-to-diagnostic error bridge with fuzzy match suggestions.
//!
//! Converts Figment deserialization errors into `ConfigError`s with valid
//! key listings and "did you mean?" suggestions using Jaro-Winkler string
//! similarity.

use thiserror::Error;

/// Minimum Jaro-Winkler similarity score to suggest a correction.
/// 0.75 is chosen to catch common typos like `l1_ttl_sec` ->
/// `l1_ttl_secs` while filtering noise.
const SUGGESTION_THRESHOLD: f64 = 0.75;

/// A configuration error with enough context to render an actionable message.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// An unknown key was found in the configuration.
    #[error("unknown configuration key `{key}`")]
    UnknownKey {
        /// The unrecognized key name.
        key: String,
        /// Suggested correction via fuzzy matching, if any.
        suggestion: Option<String>,
        /// List of valid keys for the section.
        valid_keys: String,
    },

    /// A configuration value has the wrong type.
    #[error("invalid type for key `{key}`: {detail}")]
    InvalidType {
        /// The key with the wrong type.
        key: String,
        /// Description of the type mismatch.
        detail: String,
    },

    /// A required configuration key is missing.
    #[error("missing required key `{key}`")]
    MissingKey {
        /// The missing key name.
        key: String,
    },

    /// A validation error for a config value.
    #[error("validation error: {message}")]
    Validation {
        /// Description of the validation failure.
        message: String,
    },

    /// Catch-all for other configuration errors.
    #[error("configuration error: {0}")]
    Other(String),
}

/// Convert a `figment::Error` into a list of `ConfigError` diagnostics.
///
/// Iterates through all errors in the figment error (which may contain
/// multiple), converting each to an appropriate `ConfigError` variant with
/// fuzzy match suggestions for unknown field errors.
pub fn figment_to_config_errors(err: figment::Error) -> Vec<ConfigError> {
    use figment::error::Kind;

    let mut errors = Vec::new();

    for error in err {
        let config_error = match &error.kind {
            Kind::UnknownField(field, expected) => {
                let valid_keys: Vec<&str> = expected.to_vec();
                let suggestion = suggest_key(field, &valid_keys);
                ConfigError::UnknownKey {
                    key: field.clone(),
                    suggestion,
                    valid_keys: valid_keys.join(", "),
                }
            }
            Kind::MissingField(field) => ConfigError::MissingKey {
                key: field.clone().into_owned(),
            },
            Kind::InvalidType(actual, expected) => {
                let key = error
                    .path
                    .iter()
                    .map(|s| s.to_string())
                    .collect::<Vec<_>>()
                    .join(".");
                ConfigError::InvalidType {
                    key,
                    detail: format!("found {actual}, expected {expected}"),
                }
            }
            _ => ConfigError::Other(format!("{error}")),
        };

        errors.push(config_error);
    }

    errors
}

/// Suggest a similar key name using Jaro-Winkler string similarity.
///
/// Returns the best match above the similarity threshold, or `None` if
/// no valid key is close enough to the unknown key.
pub fn suggest_key(unknown: &str, valid_keys: &[&str]) -> Option<String> {
    let mut best_score = SUGGESTION_THRESHOLD;
    let mut best_match = None;

    for &key in valid_keys {
        let score = strsim::jaro_winkler(unknown, key);
        if score > best_score {
            best_score = score;
            best_match = Some(key.to_string());
        }
    }

    best_match
}

/// Render a list of `ConfigError`s to a multi-line string for logging.
pub fn render_errors(errors: &[ConfigError]) -> String {
    let mut out = String::new();
    for error in errors {
        out.push_str(&format!("{error}"));
        if let ConfigError::UnknownKey {
            suggestion,
            valid_keys,
            ..
        } = error
        {
            match suggestion {
                Some(s) => out.push_str(&format!("\n  did you mean `{s}`? Valid keys: {valid_keys}")),
                None => out.push_str(&format!("\n  valid keys: {valid_keys}")),
            }
        }
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn suggest_misspelled_ttl_key() {
        let valid = &["l1_ttl_secs", "l2_ttl_secs", "sweep_interval_secs"];
        assert_eq!(
            suggest_key("l1_ttl_sec", valid),
            Some("l1_ttl_secs".to_string())
        );
    }

    #[test]
    fn suggest_transposed_threshold() {
        let valid = &["similarity_threshold", "engagement_threshold"];
        assert_eq!(
            suggest_key("similarity_treshold", valid),
            Some("similarity_threshold".to_string())
        );
    }

    #[test]
    fn no_suggestion_for_distant_typo() {
        let valid = &["mode", "dimension", "endpoint"];
        assert_eq!(suggest_key("zzzzzz", valid), None);
    }

    #[test]
    fn unknown_key_renders_with_suggestion() {
        let errors = vec![ConfigError::UnknownKey {
            key: "l1_ttl_sec".into(),
            suggestion: Some("l1_ttl_secs".into()),
            valid_keys: "l1_ttl_secs, l2_ttl_secs".into(),
        }];
        let rendered = render_errors(&errors);
        assert!(rendered.contains("unknown configuration key `l1_ttl_sec`"));
        assert!(rendered.contains("did you mean `l1_ttl_secs`?"));
    }
}

// SPDX-FileCopyrightText: 2026 Draftmill Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Deterministic cache key derivation.
//!
//! Requests that differ only in field casing or surrounding whitespace
//! produce the same key, so near-duplicate submissions land on the same
//! cache entry. The template id is deliberately not part of the key;
//! templates shape TTL policy, not identity.

use draftmill_core::types::ContentRequest;
use sha2::{Digest, Sha256};

/// Separator between key components.
const KEY_DELIMITER: &str = "::";

/// Hex characters kept from the URL digest.
const URL_HASH_LEN: usize = 12;

/// Derives the cache key for a request.
///
/// Components, in order: topic, purpose, format, tone, audience,
/// research flag, URL fingerprint. Free-text fields are lower-cased and
/// trimmed; the URL contributes a truncated SHA-256 so long URLs keep
/// keys short.
pub fn cache_key(request: &ContentRequest) -> String {
    let url_part = request
        .url_reference
        .as_deref()
        .map(url_fingerprint)
        .unwrap_or_default();

    [
        normalize(&request.topic),
        request.purpose.to_string(),
        request.format.to_string(),
        request.tone.to_string(),
        normalize(&request.target_audience),
        request.enable_research.to_string(),
        url_part,
    ]
    .join(KEY_DELIMITER)
}

fn normalize(field: &str) -> String {
    field.trim().to_lowercase()
}

/// Truncated SHA-256 of the normalized URL.
fn url_fingerprint(url: &str) -> String {
    let digest = Sha256::digest(normalize(url).as_bytes());
    let mut hash = hex::encode(digest);
    hash.truncate(URL_HASH_LEN);
    hash
}

// SPDX-FileCopyrightText: 2026 Draftmill Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core types for the pattern learning engine.

use chrono::Utc;
use draftmill_core::types::{Format, PatternKind, Purpose, Tone};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Timestamp format stored in pattern rows: ISO-8601 UTC with millisecond
/// precision, matching SQLite's `strftime('%Y-%m-%dT%H:%M:%fZ', 'now')`.
const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3fZ";

/// Current UTC time in the stored timestamp format.
pub fn now_timestamp() -> String {
    Utc::now().format(TIMESTAMP_FORMAT).to_string()
}

/// A learned preference or habit for one user.
///
/// Patterns are created by observing published posts that cleared the
/// engagement gate, and reinforced each time a similar post succeeds
/// again. `confidence` grows with `sample_size` and is capped below
/// certainty; patterns are never hard-deleted, only superseded by
/// higher-confidence ones at retrieval time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserPattern {
    pub id: String,
    pub user_id: String,
    pub kind: PatternKind,
    pub data: PatternData,
    /// How reliable this pattern is, in `[0, 0.95]`.
    pub confidence: f64,
    /// Number of successful posts that contributed to this pattern.
    pub sample_size: u32,
    pub last_reinforced: String,
    pub created_at: String,
}

/// The structured payload of a pattern: what the successful content
/// looked like, distilled to attributes the engine can vote and match on.
///
/// Unknown fields survive a read-modify-write cycle via `extra`, so
/// payloads written by newer versions are not silently stripped.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PatternData {
    pub purpose: Option<Purpose>,
    pub format: Option<Format>,
    pub tone: Option<Tone>,
    pub target_audience: Option<String>,
    /// Running mean of active engagement across contributing posts.
    pub avg_engagement: f64,
    pub length_bucket: Option<LengthBucket>,
    pub structure: Vec<StructureTag>,
    pub language: String,
    /// Most frequent significant words of the selected variant.
    pub keywords: Vec<String>,
    /// UTC hour (0-23) the post was learned at.
    pub hour_of_day: u8,
    pub hashtag_count: u32,
    pub has_emoji: bool,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Coarse content length classification.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "kebab-case")]
#[serde(rename_all = "kebab-case")]
pub enum LengthBucket {
    Short,
    Medium,
    Long,
}

impl LengthBucket {
    /// Buckets a character count: short up to 500, medium up to 1500,
    /// long beyond that.
    pub fn from_chars(chars: usize) -> Self {
        if chars <= 500 {
            Self::Short
        } else if chars <= 1500 {
            Self::Medium
        } else {
            Self::Long
        }
    }
}

/// Structural features detected in successful content.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "kebab-case")]
#[serde(rename_all = "kebab-case")]
pub enum StructureTag {
    HasHook,
    HasList,
    HasQuestion,
    HasCallToAction,
}

/// One pattern judged relevant to an incoming request.
#[derive(Debug, Clone)]
pub struct SimilarityMatch {
    pub pattern: UserPattern,
    /// Cosine similarity between the request and pattern projections.
    pub similarity: f32,
    /// The matched pattern's own confidence, copied out for ranking.
    pub confidence: f64,
    /// Human-readable attribute overlaps, e.g. "matching tone (professional)".
    pub reasons: Vec<String>,
}

/// Request fields the caller already fixed; smart defaults never
/// override these.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PartialRequest {
    pub purpose: Option<Purpose>,
    pub format: Option<Format>,
    pub tone: Option<Tone>,
    pub target_audience: Option<String>,
}

/// Pre-filled request attributes voted from a user's strongest patterns.
///
/// A field is `None` when no loaded pattern carried a value for it.
/// `confidence` is 0.0 exactly when the user has no patterns at all.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SmartDefaults {
    pub purpose: Option<Purpose>,
    pub format: Option<Format>,
    pub tone: Option<Tone>,
    pub target_audience: Option<String>,
    pub confidence: f64,
    /// How many patterns participated in the vote.
    pub patterns_used: usize,
}

impl SmartDefaults {
    /// The empty result for users with no learned patterns.
    pub fn none() -> Self {
        Self {
            purpose: None,
            format: None,
            tone: None,
            target_audience: None,
            confidence: 0.0,
            patterns_used: 0,
        }
    }
}

/// Lifecycle notifications emitted by the learning engine.
#[derive(Debug, Clone)]
pub enum PatternEvent {
    /// A brand-new pattern was created from a successful post.
    Learned { pattern: UserPattern },
    /// An existing pattern absorbed another successful post.
    Reinforced { pattern: UserPattern },
}

/// Serializes an f32 vector to a little-endian byte blob for BLOB storage.
pub fn vec_to_blob(vec: &[f32]) -> Vec<u8> {
    vec.iter().flat_map(|f| f.to_le_bytes()).collect()
}

/// Deserializes a little-endian byte blob back to an f32 vector.
/// Trailing bytes that do not form a full f32 are dropped.
pub fn blob_to_vec(blob: &[u8]) -> Vec<f32> {
    blob.chunks_exact(4)
        .map(|chunk| f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
        .collect()
}

/// Dot product of two equal-length vectors.
///
/// Both inputs are expected to be L2-normalized, which makes the dot
/// product equal to cosine similarity.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    assert_eq!(a.len(), b.len(), "vector length mismatch");
    a.iter().zip(b.iter()).map(|(x, y)| x * y).sum()
}

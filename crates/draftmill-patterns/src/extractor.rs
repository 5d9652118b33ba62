// SPDX-FileCopyrightText: 2026 Draftmill Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Distills a published post into a [`PatternData`] payload.
//!
//! Extraction is pure: it looks only at the request, the selected
//! variant's text, and the engagement numbers handed in. The heuristics
//! are intentionally shallow (keyword frequency, punctuation, marker
//! words) since their job is to give the voting and matching layers
//! stable attributes, not to understand the content.

use std::collections::HashMap;

use draftmill_core::types::{ContentRequest, ContentResponse, EngagementSignals};

use crate::types::{LengthBucket, PatternData, StructureTag};

/// Number of keywords retained per pattern.
const MAX_KEYWORDS: usize = 5;

/// Phrases that mark a call to action when present anywhere in the text.
const CALL_TO_ACTION_CUES: &[&str] = &[
    "comment below",
    "share your",
    "let me know",
    "what do you think",
    "follow me",
    "follow for",
    "dm me",
    "sign up",
    "subscribe",
    "tag someone",
];

/// Common English function words used for coarse language detection.
const ENGLISH_MARKERS: &[&str] = &["the", "and", "to", "of", "is", "for", "with", "that"];

/// Builds the pattern payload for one successful post.
///
/// `hour_of_day` is the UTC hour the success was observed at; the caller
/// supplies it so extraction stays deterministic.
pub fn extract_pattern_data(
    request: &ContentRequest,
    response: &ContentResponse,
    engagement: &EngagementSignals,
    hour_of_day: u8,
) -> PatternData {
    let text = response.variants.get(response.selected);
    let audience = request.target_audience.trim();

    PatternData {
        purpose: Some(request.purpose),
        format: Some(request.format),
        tone: Some(request.tone),
        target_audience: (!audience.is_empty()).then(|| audience.to_string()),
        avg_engagement: engagement.total() as f64,
        length_bucket: Some(LengthBucket::from_chars(text.chars().count())),
        structure: structure_tags(text),
        language: detect_language(text),
        keywords: keywords(text),
        hour_of_day,
        hashtag_count: hashtag_count(text),
        has_emoji: contains_emoji(text),
        extra: serde_json::Map::new(),
    }
}

/// Most frequent words longer than four characters, lowercased, capped
/// at [`MAX_KEYWORDS`]. Frequency ties break alphabetically so output
/// is deterministic.
fn keywords(text: &str) -> Vec<String> {
    let mut counts: HashMap<String, usize> = HashMap::new();
    for word in text.split(|c: char| !c.is_alphanumeric()) {
        if word.chars().count() > 4 {
            *counts.entry(word.to_lowercase()).or_insert(0) += 1;
        }
    }
    let mut ranked: Vec<(String, usize)> = counts.into_iter().collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    ranked.truncate(MAX_KEYWORDS);
    ranked.into_iter().map(|(word, _)| word).collect()
}

fn structure_tags(text: &str) -> Vec<StructureTag> {
    let mut tags = Vec::new();

    if let Some(first_line) = text.lines().next() {
        let first = first_line.trim_end();
        if first.ends_with('?') || first.ends_with('!') {
            tags.push(StructureTag::HasHook);
        }
    }

    let has_list = text.lines().any(|line| {
        let trimmed = line.trim_start();
        trimmed.starts_with("- ")
            || trimmed.starts_with("* ")
            || trimmed.starts_with("\u{2022} ")
            || starts_with_ordinal(trimmed)
    });
    if has_list {
        tags.push(StructureTag::HasList);
    }

    if text.contains('?') {
        tags.push(StructureTag::HasQuestion);
    }

    let lower = text.to_lowercase();
    if CALL_TO_ACTION_CUES.iter().any(|cue| lower.contains(cue)) {
        tags.push(StructureTag::HasCallToAction);
    }

    tags
}

/// True for lines like "1. point" or "3) point".
fn starts_with_ordinal(line: &str) -> bool {
    let rest = line.trim_start_matches(|c: char| c.is_ascii_digit());
    rest.len() < line.len() && (rest.starts_with('.') || rest.starts_with(')'))
}

fn hashtag_count(text: &str) -> u32 {
    text.split_whitespace()
        .filter(|word| word.starts_with('#') && word.len() > 1)
        .count() as u32
}

/// Detects emoji by code-point range: the main emoji blocks plus the
/// miscellaneous symbols and dingbats blocks.
fn contains_emoji(text: &str) -> bool {
    text.chars().any(|c| {
        let cp = c as u32;
        (0x1F300..=0x1FAFF).contains(&cp) || (0x2600..=0x27BF).contains(&cp)
    })
}

/// "en" when enough English function words appear, otherwise "unknown".
fn detect_language(text: &str) -> String {
    let lower = text.to_lowercase();
    let hits = lower
        .split(|c: char| !c.is_alphanumeric())
        .filter(|word| ENGLISH_MARKERS.contains(word))
        .count();
    if hits >= 2 {
        "en".to_string()
    } else {
        "unknown".to_string()
    }
}

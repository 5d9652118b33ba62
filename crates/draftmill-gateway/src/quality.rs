// SPDX-FileCopyrightText: 2026 Draftmill Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Deterministic quality scoring for generated variants.
//!
//! Every response starts from a base score; each variant whose length
//! lands inside its target band earns a fixed bonus. The score never
//! exceeds 1.0 and never inspects the text itself, so scoring stays
//! reproducible across providers.

use std::ops::RangeInclusive;

use draftmill_core::types::ContentVariants;

/// Score every response starts from.
const BASE_SCORE: f64 = 0.7;

/// Bonus per variant whose length falls inside its band.
const BAND_BONUS: f64 = 0.1;

/// Target character bands per variant.
const SHORT_BAND: RangeInclusive<usize> = 300..=500;
const MEDIUM_BAND: RangeInclusive<usize> = 800..=1200;
const LONG_BAND: RangeInclusive<usize> = 1500..=2500;

/// Scores the three variants' fit against their length bands.
///
/// Returns a value in `[0.7, 1.0]`: all three bands hit caps the score
/// at exactly 1.0.
pub fn quality_score(variants: &ContentVariants) -> f64 {
    let mut score = BASE_SCORE;
    if SHORT_BAND.contains(&variants.short.chars().count()) {
        score += BAND_BONUS;
    }
    if MEDIUM_BAND.contains(&variants.medium.chars().count()) {
        score += BAND_BONUS;
    }
    if LONG_BAND.contains(&variants.long.chars().count()) {
        score += BAND_BONUS;
    }
    score.min(1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn variants_of_len(short: usize, medium: usize, long: usize) -> ContentVariants {
        ContentVariants {
            short: "s".repeat(short),
            medium: "m".repeat(medium),
            long: "l".repeat(long),
        }
    }

    #[test]
    fn all_bands_hit_scores_one() {
        let variants = variants_of_len(400, 1000, 2000);
        assert_eq!(quality_score(&variants), 1.0);
    }

    #[test]
    fn no_bands_hit_scores_base() {
        let variants = variants_of_len(10, 50, 100);
        assert!((quality_score(&variants) - 0.7).abs() < 1e-9);
    }

    #[test]
    fn each_band_adds_a_tenth() {
        let only_short = variants_of_len(400, 50, 100);
        assert!((quality_score(&only_short) - 0.8).abs() < 1e-9);

        let short_and_long = variants_of_len(400, 50, 1800);
        assert!((quality_score(&short_and_long) - 0.9).abs() < 1e-9);
    }

    #[test]
    fn band_edges_are_inclusive() {
        assert!((quality_score(&variants_of_len(300, 1, 1)) - 0.8).abs() < 1e-9);
        assert!((quality_score(&variants_of_len(500, 1, 1)) - 0.8).abs() < 1e-9);
        assert!((quality_score(&variants_of_len(501, 1, 1)) - 0.7).abs() < 1e-9);
        assert!((quality_score(&variants_of_len(1, 800, 2500)) - 0.9).abs() < 1e-9);
    }

    #[test]
    fn lengths_are_counted_in_chars_not_bytes() {
        // 300 multi-byte chars: in band by char count, far past it in bytes.
        let variants = ContentVariants {
            short: "é".repeat(300),
            medium: String::new(),
            long: String::new(),
        };
        assert!((quality_score(&variants) - 0.8).abs() < 1e-9);
    }
}

// SPDX-FileCopyrightText: 2026 Draftmill Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The pattern learning engine: similarity retrieval, success-driven
//! learning, and smart defaults.
//!
//! All three operations are best-effort. Retrieval and defaults degrade
//! to empty results when storage misbehaves, and learning swallows
//! persistence failures with a warning; none of them may fail a
//! generation request.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::Arc;

use chrono::{Timelike, Utc};
use draftmill_config::{LearningConfig, MAX_SIMILARITY_MATCHES};
use draftmill_core::types::{ContentRequest, ContentResponse, EngagementSignals, PatternKind};
use tokio::sync::broadcast;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::embedding::EmbeddingService;
use crate::extractor::extract_pattern_data;
use crate::store::PatternStore;
use crate::types::{
    cosine_similarity, now_timestamp, PartialRequest, PatternData, PatternEvent, SimilarityMatch,
    SmartDefaults, UserPattern,
};
use crate::vectors::{VectorDocument, VectorStore};

/// How many patterns participate in a smart-defaults vote.
const DEFAULTS_PATTERN_COUNT: usize = 3;

/// Buffered lifecycle events before slow subscribers start lagging.
const EVENT_CHANNEL_CAPACITY: usize = 64;

/// Optional filters for [`PatternLearningEngine::find_similar`].
#[derive(Debug, Clone, Default)]
pub struct FindOptions {
    pub kind: Option<PatternKind>,
    pub min_confidence: Option<f64>,
    /// Result cap; defaults to the configured match count and is always
    /// clamped to the hard maximum.
    pub limit: Option<usize>,
}

/// Learns from successful posts and retrieves what it learned.
pub struct PatternLearningEngine {
    store: Arc<PatternStore>,
    vectors: Arc<VectorStore>,
    embedding: Arc<EmbeddingService>,
    config: LearningConfig,
    events: broadcast::Sender<PatternEvent>,
}

impl PatternLearningEngine {
    pub fn new(
        store: Arc<PatternStore>,
        vectors: Arc<VectorStore>,
        embedding: Arc<EmbeddingService>,
        config: LearningConfig,
    ) -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            store,
            vectors,
            embedding,
            config,
            events,
        }
    }

    /// Subscribes to pattern lifecycle events.
    pub fn subscribe(&self) -> broadcast::Receiver<PatternEvent> {
        self.events.subscribe()
    }

    /// Finds the user's patterns most similar to an incoming request,
    /// ranked by similarity weighted by pattern confidence.
    ///
    /// Patterns without a stored embedding get one computed and
    /// persisted on the spot, so the first retrieval after a migration
    /// or restore warms the vector table.
    pub async fn find_similar(
        &self,
        request: &ContentRequest,
        user_id: &str,
        options: &FindOptions,
    ) -> Vec<SimilarityMatch> {
        if !self.config.enabled {
            return Vec::new();
        }

        let query = self.embedding.embed_text(&request_projection(request)).await;
        let patterns = self
            .store
            .list_for_user(user_id, options.kind, options.min_confidence)
            .await;
        if patterns.is_empty() {
            return Vec::new();
        }

        let stored: HashMap<String, Vec<f32>> =
            match self.vectors.embeddings_for_user(user_id).await {
                Ok(rows) => rows.into_iter().collect(),
                Err(e) => {
                    warn!(error = %e, user_id, "loading stored embeddings failed; recomputing");
                    HashMap::new()
                }
            };

        let threshold = self.config.similarity_threshold as f32;
        let mut matches = Vec::new();
        for pattern in patterns {
            let embedding = match stored.get(&pattern.id) {
                Some(vector) if vector.len() == query.len() => vector.clone(),
                _ => self.backfill_embedding(&pattern).await,
            };
            let similarity = cosine_similarity(&query, &embedding);
            if similarity < threshold {
                continue;
            }
            matches.push(SimilarityMatch {
                similarity,
                confidence: pattern.confidence,
                reasons: overlap_reasons(request, &pattern.data),
                pattern,
            });
        }

        matches.sort_by(|a, b| {
            (f64::from(b.similarity) * b.confidence)
                .partial_cmp(&(f64::from(a.similarity) * a.confidence))
                .unwrap_or(Ordering::Equal)
        });
        let cap = options
            .limit
            .unwrap_or(self.config.max_matches)
            .min(MAX_SIMILARITY_MATCHES);
        matches.truncate(cap);
        matches
    }

    /// Records a successful post, either reinforcing the matching
    /// pattern or creating a new one.
    ///
    /// Returns `None` when learning is disabled, the engagement gate is
    /// not cleared, or persistence fails. Active engagement must be
    /// strictly above the configured threshold; posts at or below it
    /// leave the store untouched.
    pub async fn learn_from_success(
        &self,
        user_id: &str,
        request: &ContentRequest,
        response: &ContentResponse,
        engagement: &EngagementSignals,
    ) -> Option<UserPattern> {
        if !self.config.enabled {
            return None;
        }
        let total = engagement.total();
        if total <= self.config.engagement_threshold {
            debug!(
                user_id,
                total,
                threshold = self.config.engagement_threshold,
                "engagement below learning gate; ignoring post"
            );
            return None;
        }

        let hour = Utc::now().hour() as u8;
        let data = extract_pattern_data(request, response, engagement, hour);

        let existing = self
            .store
            .list_for_user(user_id, Some(PatternKind::SuccessfulPost), None)
            .await
            .into_iter()
            .find(|p| {
                p.data.purpose == data.purpose
                    && p.data.format == data.format
                    && p.data.tone == data.tone
            });

        let (pattern, is_new) = match existing {
            Some(mut pattern) => {
                let previous = f64::from(pattern.sample_size);
                pattern.sample_size += 1;
                pattern.data.avg_engagement = (pattern.data.avg_engagement * previous
                    + total as f64)
                    / f64::from(pattern.sample_size);
                pattern.confidence = confidence_for(pattern.sample_size);
                pattern.last_reinforced = now_timestamp();
                (pattern, false)
            }
            None => {
                let now = now_timestamp();
                let pattern = UserPattern {
                    id: Uuid::new_v4().to_string(),
                    user_id: user_id.to_string(),
                    kind: PatternKind::SuccessfulPost,
                    data,
                    confidence: confidence_for(1),
                    sample_size: 1,
                    last_reinforced: now.clone(),
                    created_at: now,
                };
                (pattern, true)
            }
        };

        if let Err(e) = self.store.upsert(&pattern).await {
            warn!(error = %e, user_id, "failed to persist learned pattern");
            return None;
        }

        let embedding = self
            .embedding
            .embed_text(&pattern_projection(&pattern.data))
            .await;
        let document = VectorDocument {
            pattern_id: pattern.id.clone(),
            user_id: pattern.user_id.clone(),
            embedding,
        };
        if let Err(e) = self.vectors.upsert(vec![document]).await {
            warn!(error = %e, pattern_id = %pattern.id, "failed to persist pattern embedding");
        }

        let event = if is_new {
            debug!(user_id, pattern_id = %pattern.id, "learned new pattern");
            PatternEvent::Learned {
                pattern: pattern.clone(),
            }
        } else {
            debug!(
                user_id,
                pattern_id = %pattern.id,
                sample_size = pattern.sample_size,
                "reinforced pattern"
            );
            PatternEvent::Reinforced {
                pattern: pattern.clone(),
            }
        };
        let _ = self.events.send(event);

        Some(pattern)
    }

    /// Pre-fills request attributes by weighted-mode vote over the
    /// user's strongest successful-post patterns.
    ///
    /// Fields the caller already fixed in `partial` pass through
    /// unchanged. A user with no patterns gets the zero-confidence
    /// empty result.
    pub async fn smart_defaults(&self, user_id: &str, partial: &PartialRequest) -> SmartDefaults {
        if !self.config.enabled {
            return SmartDefaults::none();
        }
        let patterns = self
            .store
            .top_by_confidence(
                user_id,
                Some(PatternKind::SuccessfulPost),
                DEFAULTS_PATTERN_COUNT,
            )
            .await;
        if patterns.is_empty() {
            return SmartDefaults::none();
        }

        let total_weight: f64 = patterns.iter().map(pattern_weight).sum();
        let confidence = (total_weight / (patterns.len() as f64 * 10.0)).min(0.95);

        SmartDefaults {
            purpose: partial.purpose.or_else(|| vote(&patterns, |d| d.purpose)),
            format: partial.format.or_else(|| vote(&patterns, |d| d.format)),
            tone: partial.tone.or_else(|| vote(&patterns, |d| d.tone)),
            target_audience: partial
                .target_audience
                .clone()
                .or_else(|| vote(&patterns, |d| d.target_audience.clone())),
            confidence,
            patterns_used: patterns.len(),
        }
    }

    async fn backfill_embedding(&self, pattern: &UserPattern) -> Vec<f32> {
        let embedding = self
            .embedding
            .embed_text(&pattern_projection(&pattern.data))
            .await;
        let document = VectorDocument {
            pattern_id: pattern.id.clone(),
            user_id: pattern.user_id.clone(),
            embedding: embedding.clone(),
        };
        if let Err(e) = self.vectors.upsert(vec![document]).await {
            warn!(error = %e, pattern_id = %pattern.id, "failed to persist backfilled embedding");
        }
        embedding
    }
}

/// Confidence for a pattern with `sample_size` contributing posts.
fn confidence_for(sample_size: u32) -> f64 {
    (0.5 + f64::from(sample_size) * 0.1).min(0.95)
}

/// A pattern's voting weight: confidence scaled by evidence.
fn pattern_weight(pattern: &UserPattern) -> f64 {
    pattern.confidence * f64::from(pattern.sample_size)
}

/// Weighted-mode vote over one categorical field. Ties keep the value
/// seen first, and patterns arrive strongest-first, so ties resolve
/// toward higher confidence.
fn vote<T: PartialEq>(
    patterns: &[UserPattern],
    field: impl Fn(&PatternData) -> Option<T>,
) -> Option<T> {
    let mut tallies: Vec<(T, f64)> = Vec::new();
    for pattern in patterns {
        let Some(value) = field(&pattern.data) else {
            continue;
        };
        let weight = pattern_weight(pattern);
        match tallies.iter_mut().find(|(candidate, _)| *candidate == value) {
            Some((_, tally)) => *tally += weight,
            None => tallies.push((value, weight)),
        }
    }

    let mut best: Option<(T, f64)> = None;
    for (value, tally) in tallies {
        let replace = match &best {
            Some((_, best_tally)) => tally > *best_tally,
            None => true,
        };
        if replace {
            best = Some((value, tally));
        }
    }
    best.map(|(value, _)| value)
}

/// Text form of a request for embedding: the attributes similarity
/// should weigh, pipe-joined.
fn request_projection(request: &ContentRequest) -> String {
    format!(
        "{} | {} | {} | {} | {}",
        request.topic.trim(),
        request.purpose,
        request.format,
        request.tone,
        request.target_audience.trim(),
    )
}

/// Text form of a stored pattern, shaped like the request projection so
/// both embed into the same space. Keywords stand in for the topic.
fn pattern_projection(data: &PatternData) -> String {
    format!(
        "{} | {} | {} | {} | {}",
        data.keywords.join(" "),
        data.purpose.map(|p| p.to_string()).unwrap_or_default(),
        data.format.map(|f| f.to_string()).unwrap_or_default(),
        data.tone.map(|t| t.to_string()).unwrap_or_default(),
        data.target_audience.clone().unwrap_or_default(),
    )
}

/// Attribute overlaps between a request and a matched pattern, for
/// explaining why the match surfaced.
fn overlap_reasons(request: &ContentRequest, data: &PatternData) -> Vec<String> {
    let mut reasons = Vec::new();
    if data.purpose == Some(request.purpose) {
        reasons.push(format!("matching purpose ({})", request.purpose));
    }
    if data.format == Some(request.format) {
        reasons.push(format!("matching format ({})", request.format));
    }
    if data.tone == Some(request.tone) {
        reasons.push(format!("matching tone ({})", request.tone));
    }
    if let Some(audience) = &data.target_audience {
        if audience.eq_ignore_ascii_case(request.target_audience.trim()) {
            reasons.push(format!("matching audience ({audience})"));
        }
    }
    reasons
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use draftmill_core::traits::EmbeddingAdapter;
    use draftmill_core::types::{Format, Purpose, Tone, VariantLength};
    use draftmill_storage::Database;
    use draftmill_test_utils::fixtures::sample_response;
    use draftmill_test_utils::MockEmbedder;

    struct Fixture {
        engine: PatternLearningEngine,
        store: Arc<PatternStore>,
        vectors: Arc<VectorStore>,
    }

    async fn fixture_with(
        config: LearningConfig,
        backend: Option<Arc<MockEmbedder>>,
    ) -> Fixture {
        let db = Database::open_in_memory().await.unwrap();
        let conn = db.connection().clone();
        let store = Arc::new(PatternStore::new(
            conn.clone(),
            Duration::from_secs(60),
            Duration::from_secs(4),
        ));
        let vectors = Arc::new(VectorStore::new(conn, false));
        let backend = backend.map(|b| -> Arc<dyn EmbeddingAdapter> { b });
        let embedding = Arc::new(EmbeddingService::new(backend, 4, 128));
        let engine = PatternLearningEngine::new(
            Arc::clone(&store),
            Arc::clone(&vectors),
            embedding,
            config,
        );
        Fixture {
            engine,
            store,
            vectors,
        }
    }

    async fn fixture() -> Fixture {
        fixture_with(LearningConfig::default(), None).await
    }

    fn request() -> ContentRequest {
        let mut request = ContentRequest::new("scaling engineering teams", "maya");
        request.purpose = Purpose::ThoughtLeadership;
        request.format = Format::Listicle;
        request.tone = Tone::Bold;
        request.target_audience = "engineering leaders".into();
        request
    }

    fn response() -> ContentResponse {
        let mut response = sample_response("engine");
        response.variants.medium =
            "Scaling teams is brutal.\n1. Hire slow\n2. Onboard well\nWhat do you think?"
                .to_string();
        response.selected = VariantLength::Medium;
        response
    }

    fn engagement(total: u64) -> EngagementSignals {
        EngagementSignals {
            likes: total,
            comments: 0,
            shares: 0,
            impressions: 1_000_000,
        }
    }

    fn seeded(id: &str, user: &str, confidence: f64, sample_size: u32, data: PatternData) -> UserPattern {
        let now = now_timestamp();
        UserPattern {
            id: id.into(),
            user_id: user.into(),
            kind: PatternKind::SuccessfulPost,
            data,
            confidence,
            sample_size,
            last_reinforced: now.clone(),
            created_at: now,
        }
    }

    #[tokio::test]
    async fn engagement_at_threshold_is_not_learned() {
        let f = fixture().await;
        // Default gate is 500; impressions alone never qualify a post.
        let learned = f
            .engine
            .learn_from_success("maya", &request(), &response(), &engagement(500))
            .await;
        assert!(learned.is_none());
        assert!(f.store.list_for_user("maya", None, None).await.is_empty());
    }

    #[tokio::test]
    async fn first_success_creates_pattern_with_base_confidence() {
        let f = fixture().await;
        let learned = f
            .engine
            .learn_from_success("maya", &request(), &response(), &engagement(600))
            .await
            .unwrap();

        assert_eq!(learned.kind, PatternKind::SuccessfulPost);
        assert_eq!(learned.sample_size, 1);
        assert_eq!(learned.confidence, 0.6);
        assert_eq!(learned.data.avg_engagement, 600.0);
        assert_eq!(learned.data.purpose, Some(Purpose::ThoughtLeadership));

        // The embedding was persisted alongside the pattern.
        let stored = f.vectors.embedding_for(&learned.id).await.unwrap();
        assert!(stored.is_some());
    }

    #[tokio::test]
    async fn repeat_success_reinforces_instead_of_duplicating() {
        let f = fixture().await;
        let mut events = f.engine.subscribe();

        let first = f
            .engine
            .learn_from_success("maya", &request(), &response(), &engagement(600))
            .await
            .unwrap();
        let second = f
            .engine
            .learn_from_success("maya", &request(), &response(), &engagement(800))
            .await
            .unwrap();

        assert_eq!(first.id, second.id);
        assert_eq!(second.sample_size, 2);
        assert!((second.confidence - 0.7).abs() < 1e-9);
        // Running mean of 600 and 800.
        assert_eq!(second.data.avg_engagement, 700.0);
        assert_eq!(f.store.list_for_user("maya", None, None).await.len(), 1);

        match events.recv().await.unwrap() {
            PatternEvent::Learned { pattern } => assert_eq!(pattern.id, first.id),
            other => panic!("expected learned event, got {other:?}"),
        }
        match events.recv().await.unwrap() {
            PatternEvent::Reinforced { pattern } => assert_eq!(pattern.sample_size, 2),
            other => panic!("expected reinforced event, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn confidence_grows_monotonically_and_caps() {
        let f = fixture().await;
        let mut previous = 0.0;
        let mut last = 0.0;
        for _ in 0..8 {
            let learned = f
                .engine
                .learn_from_success("maya", &request(), &response(), &engagement(1_000))
                .await
                .unwrap();
            assert!(
                learned.confidence >= previous,
                "confidence regressed: {} < {previous}",
                learned.confidence
            );
            previous = learned.confidence;
            last = learned.confidence;
        }
        assert_eq!(last, 0.95);
    }

    #[tokio::test]
    async fn different_attribute_mix_creates_a_second_pattern() {
        let f = fixture().await;
        f.engine
            .learn_from_success("maya", &request(), &response(), &engagement(600))
            .await
            .unwrap();

        let mut other = request();
        other.purpose = Purpose::Promotion;
        f.engine
            .learn_from_success("maya", &other, &response(), &engagement(600))
            .await
            .unwrap();

        assert_eq!(f.store.list_for_user("maya", None, None).await.len(), 2);
    }

    #[tokio::test]
    async fn find_similar_filters_by_threshold_and_weights_by_confidence() {
        let request = request();
        let projection = request_projection(&request);
        let backend = Arc::new(
            MockEmbedder::new(4).with_vector(&projection, vec![1.0, 0.0, 0.0, 0.0]),
        );
        let f = fixture_with(LearningConfig::default(), Some(backend)).await;

        let shared_data = PatternData {
            purpose: Some(Purpose::ThoughtLeadership),
            format: Some(Format::Listicle),
            tone: Some(Tone::Bold),
            target_audience: Some("Engineering Leaders".into()),
            ..PatternData::default()
        };
        // close: cosine 0.80 at confidence 0.95 -> weighted 0.76
        // closer: cosine 0.90 at confidence 0.60 -> weighted 0.54
        // faint: cosine 0.50, below the 0.75 threshold
        for (id, conf, vector) in [
            ("close", 0.95, vec![0.8, 0.6, 0.0, 0.0]),
            ("closer", 0.60, vec![0.9, 0.435_889_9, 0.0, 0.0]),
            ("faint", 0.90, vec![0.5, 0.866_025_4, 0.0, 0.0]),
        ] {
            let pattern = seeded(id, "maya", conf, 1, shared_data.clone());
            f.store.upsert(&pattern).await.unwrap();
            f.vectors
                .upsert(vec![VectorDocument {
                    pattern_id: id.into(),
                    user_id: "maya".into(),
                    embedding: vector,
                }])
                .await
                .unwrap();
        }

        let matches = f
            .engine
            .find_similar(&request, "maya", &FindOptions::default())
            .await;

        assert_eq!(matches.len(), 2);
        assert_eq!(matches[0].pattern.id, "close");
        assert_eq!(matches[1].pattern.id, "closer");
        assert!(matches[0].reasons.iter().any(|r| r.contains("purpose")));
        assert!(matches[0]
            .reasons
            .iter()
            .any(|r| r.contains("audience")));

        let capped = f
            .engine
            .find_similar(
                &request,
                "maya",
                &FindOptions {
                    limit: Some(1),
                    ..FindOptions::default()
                },
            )
            .await;
        assert_eq!(capped.len(), 1);
        assert_eq!(capped[0].pattern.id, "close");
    }

    #[tokio::test]
    async fn find_similar_backfills_missing_embeddings() {
        let request = request();
        let data = PatternData {
            purpose: Some(Purpose::ThoughtLeadership),
            keywords: vec!["scaling".into(), "teams".into()],
            ..PatternData::default()
        };
        let pattern = seeded("p-bare", "maya", 0.8, 2, data.clone());

        let backend = Arc::new(
            MockEmbedder::new(4)
                .with_vector(&request_projection(&request), vec![1.0, 0.0, 0.0, 0.0])
                .with_vector(&pattern_projection(&data), vec![1.0, 0.0, 0.0, 0.0]),
        );
        let f = fixture_with(LearningConfig::default(), Some(backend)).await;
        f.store.upsert(&pattern).await.unwrap();
        assert!(f.vectors.embedding_for("p-bare").await.unwrap().is_none());

        let matches = f
            .engine
            .find_similar(&request, "maya", &FindOptions::default())
            .await;

        assert_eq!(matches.len(), 1);
        assert!((matches[0].similarity - 1.0).abs() < 1e-5);
        // The computed embedding is now persisted.
        assert!(f.vectors.embedding_for("p-bare").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn smart_defaults_weighted_vote_prefers_heavier_pattern() {
        let f = fixture().await;
        let strong = seeded(
            "p-strong",
            "maya",
            0.9,
            5,
            PatternData {
                purpose: Some(Purpose::ThoughtLeadership),
                format: Some(Format::Listicle),
                ..PatternData::default()
            },
        );
        let weak = seeded(
            "p-weak",
            "maya",
            0.6,
            1,
            PatternData {
                purpose: Some(Purpose::Value),
                ..PatternData::default()
            },
        );
        f.store.upsert(&strong).await.unwrap();
        f.store.upsert(&weak).await.unwrap();

        let defaults = f
            .engine
            .smart_defaults("maya", &PartialRequest::default())
            .await;

        // Weights: 0.9 * 5 = 4.5 beats 0.6 * 1 = 0.6.
        assert_eq!(defaults.purpose, Some(Purpose::ThoughtLeadership));
        // Only the strong pattern carries a format; it wins unopposed.
        assert_eq!(defaults.format, Some(Format::Listicle));
        assert_eq!(defaults.patterns_used, 2);
        // min(0.95, (4.5 + 0.6) / (2 * 10))
        assert!((defaults.confidence - 0.255).abs() < 1e-9);
    }

    #[tokio::test]
    async fn smart_defaults_without_patterns_is_zero_confidence() {
        let f = fixture().await;
        let defaults = f
            .engine
            .smart_defaults("nobody", &PartialRequest::default())
            .await;
        assert_eq!(defaults, SmartDefaults::none());
        assert_eq!(defaults.confidence, 0.0);
    }

    #[tokio::test]
    async fn smart_defaults_respects_caller_fixed_fields() {
        let f = fixture().await;
        let pattern = seeded(
            "p1",
            "maya",
            0.9,
            5,
            PatternData {
                purpose: Some(Purpose::ThoughtLeadership),
                tone: Some(Tone::Professional),
                ..PatternData::default()
            },
        );
        f.store.upsert(&pattern).await.unwrap();

        let partial = PartialRequest {
            purpose: Some(Purpose::Engagement),
            ..PartialRequest::default()
        };
        let defaults = f.engine.smart_defaults("maya", &partial).await;

        assert_eq!(defaults.purpose, Some(Purpose::Engagement));
        assert_eq!(defaults.tone, Some(Tone::Professional));
    }

    #[tokio::test]
    async fn smart_defaults_votes_over_top_three_only() {
        let f = fixture().await;
        for (id, conf) in [("p1", 0.9), ("p2", 0.8), ("p3", 0.7), ("p4", 0.65)] {
            let pattern = seeded(
                id,
                "maya",
                conf,
                1,
                PatternData {
                    purpose: Some(Purpose::Value),
                    ..PatternData::default()
                },
            );
            f.store.upsert(&pattern).await.unwrap();
        }

        let defaults = f
            .engine
            .smart_defaults("maya", &PartialRequest::default())
            .await;
        assert_eq!(defaults.patterns_used, 3);
    }

    #[tokio::test]
    async fn disabled_engine_is_inert() {
        let config = LearningConfig {
            enabled: false,
            ..LearningConfig::default()
        };
        let f = fixture_with(config, None).await;

        let learned = f
            .engine
            .learn_from_success("maya", &request(), &response(), &engagement(10_000))
            .await;
        assert!(learned.is_none());

        let matches = f
            .engine
            .find_similar(&request(), "maya", &FindOptions::default())
            .await;
        assert!(matches.is_empty());

        let defaults = f
            .engine
            .smart_defaults("maya", &PartialRequest::default())
            .await;
        assert_eq!(defaults, SmartDefaults::none());
    }
}

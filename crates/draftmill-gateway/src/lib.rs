// SPDX-FileCopyrightText: 2026 Draftmill Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Request pipeline facade for the Draftmill content broker.
//!
//! The [`ContentGateway`] is the central coordinator that:
//! - Checks the tiered cache before paying for generation
//! - Classifies requests and routes them to a provider
//! - Runs the research stage when a request asks for it
//! - Scores, caches, and returns assembled responses
//! - Reports usage to the cost sink off the response path
//!
//! Pattern learning runs out-of-band through the same facade:
//! [`ContentGateway::learn_from_success`] once engagement numbers come
//! in, and [`ContentGateway::smart_defaults`] when building a request.

pub mod builder;
pub mod limiter;
pub mod metrics;
pub mod quality;

use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use draftmill_cache::{cache_key, CacheHit, CacheStrategy, MultiLayerCache};
use draftmill_core::error::DraftmillError;
use draftmill_core::traits::{Collaborator, CostSink, GenerationAdapter, ResearchAdapter};
use draftmill_core::types::{
    ContentRequest, ContentResponse, EngagementSignals, HealthStatus, ProcessingEvent,
    ProviderKind, ResearchOutput, ResponseMetadata, RouteDecision, VariantLength,
};
use draftmill_patterns::types::{
    PartialRequest, PatternEvent, SimilarityMatch, SmartDefaults, UserPattern,
};
use draftmill_patterns::{EmbeddingService, FindOptions, PatternLearningEngine};
use draftmill_router::{ProviderRouter, RequestClassifier};

pub use builder::{init_tracing, GatewayBuilder};
pub use limiter::{spawn_limiter_sweeper, RateLimiter};
pub use metrics::register_metrics;
pub use quality::quality_score;

/// One collaborator's health, as reported by [`ContentGateway::health`].
#[derive(Debug, Clone)]
pub struct ComponentHealth {
    pub name: String,
    pub status: HealthStatus,
}

/// The request pipeline facade.
///
/// Holds every collaborator behind an `Arc`, so a gateway handle can be
/// cloned into spawned tasks cheaply. Construct one via
/// [`GatewayBuilder`] at process start and share it.
pub struct ContentGateway {
    pub(crate) classifier: RequestClassifier,
    pub(crate) router: ProviderRouter,
    pub(crate) strategy: CacheStrategy,
    pub(crate) cache: Arc<MultiLayerCache>,
    pub(crate) generators: Vec<(ProviderKind, Arc<dyn GenerationAdapter>)>,
    pub(crate) researcher: Option<Arc<dyn ResearchAdapter>>,
    pub(crate) cost: Arc<dyn CostSink>,
    pub(crate) engine: Arc<PatternLearningEngine>,
    pub(crate) embedding: Arc<EmbeddingService>,
    pub(crate) limiter: Arc<RateLimiter>,
    pub(crate) sweep_interval: Duration,
}

impl std::fmt::Debug for ContentGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContentGateway")
            .field("generators", &self.generators.len())
            .field("researcher", &self.researcher.is_some())
            .field("sweep_interval", &self.sweep_interval)
            .finish_non_exhaustive()
    }
}

impl ContentGateway {
    /// Fulfills one content request.
    ///
    /// The pipeline runs: rate check, cache lookup, then on a miss
    /// classify, route, research (when asked for), generate, score,
    /// cache, and report. Cache hits return the stored response with
    /// refreshed metadata and skip everything after the lookup.
    ///
    /// Collaborator failures surface as [`DraftmillError::Pipeline`];
    /// nothing is cached on failure. Cache write failures and cost sink
    /// failures are logged and do not affect the outcome.
    pub async fn process_request(
        &self,
        request: &ContentRequest,
    ) -> Result<ContentResponse, DraftmillError> {
        let started = Instant::now();

        if let Err(e) = self.limiter.check(&request.user_id) {
            metrics::record_request("rejected");
            return Err(e);
        }

        let key = cache_key(request);
        if let Some(hit) = self.cache.get(&key).await {
            return Ok(self.finish_hit(request, hit, started));
        }

        match self.generate_fresh(request, &key, started).await {
            Ok(response) => Ok(response),
            Err(e) => {
                metrics::record_request("failed");
                Err(e)
            }
        }
    }

    /// Annotates a cached response and reports the hit.
    fn finish_hit(
        &self,
        request: &ContentRequest,
        hit: CacheHit,
        started: Instant,
    ) -> ContentResponse {
        let mut response = hit.response;
        response.metadata.cache_hit = true;
        response.metadata.processing_ms = started.elapsed().as_millis() as u64;

        metrics::record_request("cache-hit");
        metrics::record_cache_hit(&hit.tier.to_string());
        metrics::record_latency(started.elapsed().as_secs_f64());

        let sink = Arc::clone(&self.cost);
        let user_id = request.user_id.clone();
        tokio::spawn(async move {
            if let Err(e) = sink.record_cache_hit(&user_id).await {
                warn!(error = %e, user_id, "failed to record cache hit");
            }
        });

        info!(
            user_id = %request.user_id,
            tier = %hit.tier,
            processing_ms = response.metadata.processing_ms,
            "request served from cache"
        );
        response
    }

    /// The cache-miss path: classify, route, research, generate, score,
    /// cache, report.
    async fn generate_fresh(
        &self,
        request: &ContentRequest,
        key: &str,
        started: Instant,
    ) -> Result<ContentResponse, DraftmillError> {
        // Step 1: classify and route.
        let decision = self.route(request);
        debug!(
            complexity = %decision.complexity,
            estimated_tokens = decision.estimated_tokens,
            provider = %decision.provider,
            cache_tier = ?decision.cache_tier,
            "route decided"
        );

        // Step 2: research when requested or grounded on a URL.
        let research = self.run_research(request).await?;

        // Step 3: generate all three variants.
        let generator = self.generator_for(decision.provider)?;
        let output = generator
            .generate(request, research.as_ref())
            .await
            .map_err(|e| DraftmillError::Pipeline {
                stage: "generation",
                source: Box::new(e),
            })?;
        let tokens_used = output.tokens_used;
        let provider = output.provider;
        let confidence = output.confidence;

        // Step 4: score and assemble.
        let quality = quality_score(&output.variants);
        let processing_ms = started.elapsed().as_millis() as u64;
        let response = ContentResponse {
            variants: output.variants,
            selected: VariantLength::Medium,
            sources: research.map(|r| r.sources).unwrap_or_default(),
            quality_score: quality,
            metadata: ResponseMetadata {
                processing_ms,
                tokens_used,
                cache_hit: false,
                provider,
                confidence,
            },
        };

        // Step 5: cache the assembled response. A failed write costs the
        // next caller a regeneration, not this caller their content.
        let (tier, ttl) = self.strategy.choose(request, decision.complexity);
        if let Err(e) = self.cache.set(key, &response, ttl, tier).await {
            warn!(error = %e, tier = %tier, "cache write failed; serving uncached");
        }

        // Step 6: report usage off the response path.
        let sink = Arc::clone(&self.cost);
        let event = ProcessingEvent {
            user_id: request.user_id.clone(),
            tokens_used,
            processing_ms,
            provider,
            complexity: decision.complexity,
        };
        tokio::spawn(async move {
            let user_id = event.user_id.clone();
            if let Err(e) = sink.record_processing(event).await {
                warn!(error = %e, user_id, "failed to record processing event");
            }
        });

        metrics::record_request("generated");
        metrics::record_tokens(&provider.to_string(), tokens_used);
        metrics::record_latency(started.elapsed().as_secs_f64());

        info!(
            user_id = %request.user_id,
            provider = %provider,
            complexity = %decision.complexity,
            tier = %tier,
            quality = response.quality_score,
            processing_ms,
            "request fulfilled"
        );
        Ok(response)
    }

    /// Previews how a request would be routed on a cache miss.
    ///
    /// Pure composition of the classifier, provider router, and cache
    /// strategy; the live pipeline consults the cache first, so
    /// `cache_hit` is always false here.
    pub fn route(&self, request: &ContentRequest) -> RouteDecision {
        let classification = self.classifier.classify(request);
        let choice = self.router.select(request, classification.complexity);
        let (tier, _) = self.strategy.choose(request, classification.complexity);
        RouteDecision {
            cache_hit: false,
            complexity: classification.complexity,
            estimated_tokens: classification.estimated_tokens,
            provider: choice.provider,
            cache_tier: Some(tier),
        }
    }

    /// Runs the research stage when the request calls for it.
    ///
    /// A request wants research when it says so or carries a URL to
    /// ground against. With no research backend configured the stage is
    /// skipped with a warning; the response then carries no sources.
    async fn run_research(
        &self,
        request: &ContentRequest,
    ) -> Result<Option<ResearchOutput>, DraftmillError> {
        let wanted = request.enable_research || request.url_reference.is_some();
        if !wanted {
            return Ok(None);
        }
        let Some(researcher) = &self.researcher else {
            warn!(
                user_id = %request.user_id,
                "research requested but no research backend is configured"
            );
            return Ok(None);
        };
        let output = researcher
            .research(request)
            .await
            .map_err(|e| DraftmillError::Pipeline {
                stage: "research",
                source: Box::new(e),
            })?;
        debug!(
            sources = output.sources.len(),
            insights = output.insights.len(),
            "research completed"
        );
        Ok(Some(output))
    }

    /// Resolves the generation adapter for the routed provider, falling
    /// back to the first registered adapter when that provider has none.
    fn generator_for(
        &self,
        provider: ProviderKind,
    ) -> Result<Arc<dyn GenerationAdapter>, DraftmillError> {
        if let Some((_, generator)) = self.generators.iter().find(|(kind, _)| *kind == provider) {
            return Ok(Arc::clone(generator));
        }
        match self.generators.first() {
            Some((kind, generator)) => {
                warn!(
                    wanted = %provider,
                    using = %kind,
                    "no generator registered for routed provider; substituting"
                );
                Ok(Arc::clone(generator))
            }
            None => Err(DraftmillError::Internal(
                "no generation adapters registered".to_string(),
            )),
        }
    }

    /// Learns from a published post once its engagement numbers arrive.
    ///
    /// Delegates to the pattern engine; learning never fails the caller.
    /// Returns the created or reinforced pattern, if any.
    pub async fn learn_from_success(
        &self,
        user_id: &str,
        request: &ContentRequest,
        response: &ContentResponse,
        engagement: &EngagementSignals,
    ) -> Option<UserPattern> {
        let learned = self
            .engine
            .learn_from_success(user_id, request, response, engagement)
            .await;
        if learned.is_some() {
            metrics::record_pattern_learned();
        }
        learned
    }

    /// Personalizes unset request fields from the user's top patterns.
    pub async fn smart_defaults(&self, user_id: &str, partial: &PartialRequest) -> SmartDefaults {
        self.engine.smart_defaults(user_id, partial).await
    }

    /// Finds the user's learned patterns most similar to a request.
    pub async fn find_similar(
        &self,
        request: &ContentRequest,
        user_id: &str,
        options: &FindOptions,
    ) -> Vec<SimilarityMatch> {
        self.engine.find_similar(request, user_id, options).await
    }

    /// Subscribes to pattern lifecycle events.
    pub fn pattern_events(&self) -> broadcast::Receiver<PatternEvent> {
        self.engine.subscribe()
    }

    /// Health of every injected collaborator.
    ///
    /// A failed health probe reads as unhealthy rather than erroring, so
    /// one broken collaborator cannot hide the rest of the report.
    pub async fn health(&self) -> Vec<ComponentHealth> {
        let mut report = Vec::new();
        for (_, generator) in &self.generators {
            report.push(ComponentHealth {
                name: generator.name().to_string(),
                status: health_outcome(generator.health_check().await),
            });
        }
        if let Some(researcher) = &self.researcher {
            report.push(ComponentHealth {
                name: researcher.name().to_string(),
                status: health_outcome(researcher.health_check().await),
            });
        }
        report.push(ComponentHealth {
            name: self.cost.name().to_string(),
            status: health_outcome(self.cost.health_check().await),
        });
        report.push(ComponentHealth {
            name: self.embedding.name().to_string(),
            status: health_outcome(self.embedding.health_check().await),
        });
        report
    }

    /// Spawns the background maintenance tasks: the cache sweep and the
    /// rate-counter sweep. Both stop when `cancel` fires.
    pub fn spawn_maintenance(&self, cancel: CancellationToken) -> Vec<tokio::task::JoinHandle<()>> {
        vec![
            draftmill_cache::spawn_sweeper(
                Arc::clone(&self.cache),
                self.sweep_interval,
                cancel.clone(),
            ),
            spawn_limiter_sweeper(Arc::clone(&self.limiter), self.sweep_interval, cancel),
        ]
    }
}

fn health_outcome(result: Result<HealthStatus, DraftmillError>) -> HealthStatus {
    result.unwrap_or_else(|e| HealthStatus::Unhealthy(e.to_string()))
}

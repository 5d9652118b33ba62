// SPDX-FileCopyrightText: 2026 Draftmill Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Composition root for the gateway.
//!
//! [`GatewayBuilder`] assembles the default stack from configuration
//! plus a storage handle: tiered cache over one SQLite database,
//! pattern engine, cost ledger, classifier, router, and rate limiter.
//! Generation and research backends are external collaborators and are
//! always injected; any other part can be swapped for a test double.

use std::sync::Arc;
use std::time::Duration;

use tracing::info;

use draftmill_cache::{CacheLayer, CacheStrategy, MemoryLayer, MultiLayerCache, SqliteLayer};
use draftmill_config::DraftmillConfig;
use draftmill_core::error::DraftmillError;
use draftmill_core::traits::{CostSink, GenerationAdapter, ResearchAdapter};
use draftmill_core::types::ProviderKind;
use draftmill_cost::CostLedger;
use draftmill_patterns::{EmbeddingService, PatternLearningEngine, PatternStore, VectorStore};
use draftmill_router::{ProviderRouter, RequestClassifier};
use draftmill_storage::Database;

use crate::limiter::RateLimiter;
use crate::ContentGateway;

/// Initializes the tracing subscriber for an embedding application.
///
/// `RUST_LOG` wins when set; otherwise the broker's own spans log at
/// `log_level` and everything else at warn.
pub fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("draftmill={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_names(false)
        .init();
}

/// Step-by-step assembly of a [`ContentGateway`].
pub struct GatewayBuilder {
    config: DraftmillConfig,
    database: Option<Database>,
    generators: Vec<(ProviderKind, Arc<dyn GenerationAdapter>)>,
    researcher: Option<Arc<dyn ResearchAdapter>>,
    cost: Option<Arc<dyn CostSink>>,
    embedding: Option<Arc<EmbeddingService>>,
}

impl GatewayBuilder {
    pub fn new(config: DraftmillConfig) -> Self {
        Self {
            config,
            database: None,
            generators: Vec::new(),
            researcher: None,
            cost: None,
            embedding: None,
        }
    }

    /// Uses an already-open database instead of opening the configured
    /// path. Tests pass an in-memory database here.
    pub fn with_database(mut self, database: Database) -> Self {
        self.database = Some(database);
        self
    }

    /// Registers the generation backend serving `kind`. Registering the
    /// same kind again replaces the earlier adapter.
    pub fn with_generator(
        mut self,
        kind: ProviderKind,
        adapter: Arc<dyn GenerationAdapter>,
    ) -> Self {
        self.generators.retain(|(existing, _)| *existing != kind);
        self.generators.push((kind, adapter));
        self
    }

    /// Registers the research backend. Without one, requests that ask
    /// for research proceed without sources.
    pub fn with_researcher(mut self, adapter: Arc<dyn ResearchAdapter>) -> Self {
        self.researcher = Some(adapter);
        self
    }

    /// Replaces the default SQLite cost ledger.
    pub fn with_cost_sink(mut self, sink: Arc<dyn CostSink>) -> Self {
        self.cost = Some(sink);
        self
    }

    /// Replaces the config-built embedding service.
    pub fn with_embedding(mut self, embedding: Arc<EmbeddingService>) -> Self {
        self.embedding = Some(embedding);
        self
    }

    /// Assembles the gateway.
    ///
    /// Opens the configured database when none was injected. Fails with
    /// a config error when no generation backend is registered.
    pub async fn build(self) -> Result<ContentGateway, DraftmillError> {
        if self.generators.is_empty() {
            return Err(DraftmillError::Config(
                "at least one generation backend must be registered".to_string(),
            ));
        }

        let database = match self.database {
            Some(db) => db,
            None => Database::open_with(&self.config.storage).await?,
        };
        let conn = database.connection().clone();
        let op_timeout = Duration::from_secs(self.config.storage.query_timeout_secs);

        let layers: Vec<Arc<dyn CacheLayer>> = vec![
            Arc::new(MemoryLayer::new(self.config.cache.l1_max_entries)),
            Arc::new(SqliteLayer::shared(conn.clone())),
            Arc::new(SqliteLayer::durable(conn.clone())),
        ];
        let cache = Arc::new(MultiLayerCache::new(layers, op_timeout));

        let embedding = match self.embedding {
            Some(service) => service,
            None => Arc::new(EmbeddingService::from_config(&self.config.embedding)?),
        };
        let vectors = Arc::new(VectorStore::new(conn.clone(), database.vec_available()));
        let store = Arc::new(PatternStore::new(
            conn.clone(),
            Duration::from_secs(self.config.learning.pattern_cache_ttl_secs),
            op_timeout,
        ));
        let engine = Arc::new(PatternLearningEngine::new(
            Arc::clone(&store),
            Arc::clone(&vectors),
            Arc::clone(&embedding),
            self.config.learning.clone(),
        ));

        let cost: Arc<dyn CostSink> = match self.cost {
            Some(sink) => sink,
            None => Arc::new(CostLedger::new(conn)),
        };

        info!(
            broker = %self.config.broker.name,
            generators = self.generators.len(),
            research = self.researcher.is_some(),
            vec_native = database.vec_available(),
            "gateway assembled"
        );

        Ok(ContentGateway {
            classifier: RequestClassifier::new(),
            router: ProviderRouter::new(self.config.routing.clone()),
            strategy: CacheStrategy::new(self.config.cache.clone()),
            cache,
            generators: self.generators,
            researcher: self.researcher,
            cost,
            engine,
            embedding,
            limiter: Arc::new(RateLimiter::new(self.config.broker.rate_limit_per_minute)),
            sweep_interval: Duration::from_secs(self.config.cache.sweep_interval_secs),
        })
    }
}

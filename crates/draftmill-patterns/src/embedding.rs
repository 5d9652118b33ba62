// SPDX-FileCopyrightText: 2026 Draftmill Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Embedding backends for pattern similarity search.
//!
//! Two backends produce L2-normalized vectors: [`HashEmbedder`] derives a
//! deterministic pseudo-random vector from a string hash (no network, always
//! available), and [`HttpEmbedder`] calls an OpenAI-compatible `/embeddings`
//! endpoint. [`EmbeddingService`] selects the backend from configuration,
//! memoizes results by content hash, and degrades HTTP failures to the
//! deterministic path so embedding never fails a request.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use dashmap::DashMap;
use draftmill_config::{EmbeddingConfig, EmbeddingMode};
use draftmill_core::error::DraftmillError;
use draftmill_core::traits::{Collaborator, EmbeddingAdapter};
use draftmill_core::types::HealthStatus;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::{debug, warn};

/// Dimensionality of pattern embeddings as stored on the wire and in
/// `pattern_vectors` blobs. Matches the common embedding-model default.
pub const EMBEDDING_DIM: usize = 1536;

/// Scales a vector to unit L2 norm. Vectors with a near-zero norm are
/// returned unchanged rather than divided by zero.
pub fn l2_normalize(vec: &[f32]) -> Vec<f32> {
    let norm = vec.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm < f32::EPSILON {
        return vec.to_vec();
    }
    vec.iter().map(|x| x / norm).collect()
}

/// Deterministic embedder: a 64-bit hash of the text seeds a per-index
/// value stream, which is then normalized to a unit vector.
///
/// The same text always yields the same vector, and distinct texts yield
/// near-orthogonal vectors at realistic dimensions, which is what
/// similarity search needs when no embedding model is reachable.
#[derive(Debug, Clone)]
pub struct HashEmbedder {
    dimension: usize,
}

impl HashEmbedder {
    pub fn new(dimension: usize) -> Self {
        Self { dimension }
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// Embeds `text` into a deterministic unit vector.
    pub fn embed_text(&self, text: &str) -> Vec<f32> {
        let seed = fnv1a(text);
        let raw: Vec<f32> = (0..self.dimension as u64)
            .map(|i| unit_interval(mix64(seed.wrapping_add(i))) - 0.5)
            .collect();
        l2_normalize(&raw)
    }
}

impl Default for HashEmbedder {
    fn default() -> Self {
        Self::new(EMBEDDING_DIM)
    }
}

/// 64-bit FNV-1a over the UTF-8 bytes of `text`.
fn fnv1a(text: &str) -> u64 {
    text.bytes().fold(0xcbf2_9ce4_8422_2325_u64, |hash, byte| {
        (hash ^ u64::from(byte)).wrapping_mul(0x0000_0100_0000_01b3)
    })
}

/// SplitMix64 finalizer. Decorrelates consecutive seeds so neighboring
/// vector components do not track each other.
fn mix64(mut value: u64) -> u64 {
    value = value.wrapping_add(0x9e37_79b9_7f4a_7c15);
    value = (value ^ (value >> 30)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
    value = (value ^ (value >> 27)).wrapping_mul(0x94d0_49bb_1331_11eb);
    value ^ (value >> 31)
}

/// Maps a u64 onto `[0, 1)`.
fn unit_interval(value: u64) -> f32 {
    ((value >> 11) as f64 / (1u64 << 53) as f64) as f32
}

/// HTTP embedder for OpenAI-compatible `/embeddings` endpoints.
#[derive(Debug, Clone)]
pub struct HttpEmbedder {
    client: reqwest::Client,
    endpoint: String,
    model: String,
    dimension: usize,
}

#[derive(Serialize)]
struct EmbeddingsRequest<'a> {
    model: &'a str,
    input: &'a str,
    dimensions: usize,
}

#[derive(Deserialize)]
struct EmbeddingsResponse {
    data: Vec<EmbeddingRow>,
}

#[derive(Deserialize)]
struct EmbeddingRow {
    embedding: Vec<f32>,
}

impl HttpEmbedder {
    /// Creates an HTTP embedder from configuration.
    ///
    /// The bearer token is attached as a default header when an API key
    /// is configured; some local inference servers accept anonymous calls.
    pub fn new(config: &EmbeddingConfig) -> Result<Self, DraftmillError> {
        let mut headers = HeaderMap::new();
        if let Some(key) = &config.api_key {
            headers.insert(
                AUTHORIZATION,
                HeaderValue::from_str(&format!("Bearer {key}")).map_err(|e| {
                    DraftmillError::Config(format!("invalid embedding API key header value: {e}"))
                })?,
            );
        }
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| DraftmillError::Provider {
                message: format!("failed to build embeddings HTTP client: {e}"),
                source: Some(Box::new(e)),
            })?;

        Ok(Self {
            client,
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            dimension: config.dimension,
        })
    }
}

#[async_trait]
impl Collaborator for HttpEmbedder {
    fn name(&self) -> &str {
        "http-embedder"
    }

    async fn health_check(&self) -> Result<HealthStatus, DraftmillError> {
        Ok(HealthStatus::Healthy)
    }
}

#[async_trait]
impl EmbeddingAdapter for HttpEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, DraftmillError> {
        let url = format!("{}/embeddings", self.endpoint);
        let body = EmbeddingsRequest {
            model: &self.model,
            input: text,
            dimensions: self.dimension,
        };

        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| DraftmillError::Provider {
                message: format!("embeddings request failed: {e}"),
                source: Some(Box::new(e)),
            })?;

        let status = response.status();
        debug!(status = %status, "embeddings response received");
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(DraftmillError::Provider {
                message: format!("embeddings API returned {status}: {body}"),
                source: None,
            });
        }

        let parsed: EmbeddingsResponse =
            response.json().await.map_err(|e| DraftmillError::Provider {
                message: format!("failed to parse embeddings response: {e}"),
                source: Some(Box::new(e)),
            })?;
        let row = parsed.data.into_iter().next().ok_or_else(|| DraftmillError::Provider {
            message: "embeddings response contained no vectors".into(),
            source: None,
        })?;

        Ok(l2_normalize(&row.embedding))
    }

    fn dimension(&self) -> usize {
        self.dimension
    }
}

/// Backend-selecting embedding front end used by the learning engine.
///
/// Memoizes vectors by SHA-256 of the input text so repeated projections
/// (the common case: one user's patterns re-embedded per request) cost
/// one backend call. The memo is capacity-bounded; at capacity it is
/// cleared wholesale, which is cheap and keeps memory flat.
pub struct EmbeddingService {
    backend: Option<Arc<dyn EmbeddingAdapter>>,
    fallback: HashEmbedder,
    memo: DashMap<String, Vec<f32>>,
    memo_capacity: usize,
}

impl EmbeddingService {
    /// Builds the service from configuration, constructing the HTTP
    /// backend when `mode = "http"`.
    pub fn from_config(config: &EmbeddingConfig) -> Result<Self, DraftmillError> {
        let backend: Option<Arc<dyn EmbeddingAdapter>> = match config.mode {
            EmbeddingMode::Deterministic => None,
            EmbeddingMode::Http => Some(Arc::new(HttpEmbedder::new(config)?)),
        };
        Ok(Self::new(backend, config.dimension, config.memo_capacity))
    }

    /// Builds the service around an explicit backend; `None` means
    /// deterministic-only.
    pub fn new(
        backend: Option<Arc<dyn EmbeddingAdapter>>,
        dimension: usize,
        memo_capacity: usize,
    ) -> Self {
        Self {
            backend,
            fallback: HashEmbedder::new(dimension),
            memo: DashMap::new(),
            memo_capacity: memo_capacity.max(1),
        }
    }

    /// Embeds `text` into a unit vector. Never fails: backend errors are
    /// logged and degrade to the deterministic embedder.
    pub async fn embed_text(&self, text: &str) -> Vec<f32> {
        let key = memo_key(text);
        if let Some(hit) = self.memo.get(&key) {
            return hit.clone();
        }

        let vector = match &self.backend {
            Some(backend) => match backend.embed(text).await {
                Ok(v) => l2_normalize(&v),
                Err(e) => {
                    warn!(error = %e, "embedding backend failed; using deterministic fallback");
                    self.fallback.embed_text(text)
                }
            },
            None => self.fallback.embed_text(text),
        };

        if self.memo.len() >= self.memo_capacity {
            debug!(capacity = self.memo_capacity, "embedding memo at capacity, clearing");
            self.memo.clear();
        }
        self.memo.insert(key, vector.clone());
        vector
    }

    /// Dimensionality of produced vectors.
    pub fn dimension(&self) -> usize {
        self.fallback.dimension()
    }

    /// Number of memoized vectors currently held.
    pub fn memo_len(&self) -> usize {
        self.memo.len()
    }
}

#[async_trait]
impl Collaborator for EmbeddingService {
    fn name(&self) -> &str {
        "embedding-service"
    }

    async fn health_check(&self) -> Result<HealthStatus, DraftmillError> {
        match &self.backend {
            Some(backend) => backend.health_check().await,
            None => Ok(HealthStatus::Healthy),
        }
    }
}

/// Memo key: hex SHA-256 of the input text.
fn memo_key(text: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(text.as_bytes());
    hex::encode(hasher.finalize())
}

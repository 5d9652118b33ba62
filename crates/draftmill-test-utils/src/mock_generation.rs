// SPDX-FileCopyrightText: 2026 Draftmill Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock generation adapter for deterministic testing.
//!
//! `MockGenerator` implements `GenerationAdapter` with pre-configured
//! outputs, enabling fast, CI-runnable pipeline tests without calling a
//! real provider.

use std::collections::VecDeque;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use draftmill_core::error::DraftmillError;
use draftmill_core::traits::{Collaborator, GenerationAdapter};
use draftmill_core::types::{
    ContentRequest, ContentVariants, GenerationOutput, HealthStatus, ProviderKind, ResearchOutput,
};

/// One observed call to [`MockGenerator::generate`].
#[derive(Debug, Clone)]
pub struct RecordedGeneration {
    pub request: ContentRequest,
    /// Whether research output was passed alongside the request.
    pub research_present: bool,
}

/// A mock generation backend that returns pre-configured outputs.
///
/// Outputs are popped from a FIFO queue. When the queue is empty, a
/// default output derived from the request topic is returned, so most
/// tests never need to enqueue anything. Every call is recorded and can
/// be inspected afterwards.
pub struct MockGenerator {
    kind: ProviderKind,
    outputs: Arc<Mutex<VecDeque<GenerationOutput>>>,
    calls: Arc<Mutex<Vec<RecordedGeneration>>>,
    fail_with: Option<String>,
}

impl MockGenerator {
    /// Create a mock generator with an empty output queue.
    pub fn new() -> Self {
        Self::for_provider(ProviderKind::Anthropic)
    }

    /// Create a mock generator whose default outputs claim `kind`.
    pub fn for_provider(kind: ProviderKind) -> Self {
        Self {
            kind,
            outputs: Arc::new(Mutex::new(VecDeque::new())),
            calls: Arc::new(Mutex::new(Vec::new())),
            fail_with: None,
        }
    }

    /// Create a mock generator pre-loaded with the given outputs.
    pub fn with_outputs(outputs: Vec<GenerationOutput>) -> Self {
        Self {
            kind: ProviderKind::Anthropic,
            outputs: Arc::new(Mutex::new(VecDeque::from(outputs))),
            calls: Arc::new(Mutex::new(Vec::new())),
            fail_with: None,
        }
    }

    /// Create a mock generator that fails every call with a provider error.
    pub fn failing(message: &str) -> Self {
        Self {
            kind: ProviderKind::Anthropic,
            outputs: Arc::new(Mutex::new(VecDeque::new())),
            calls: Arc::new(Mutex::new(Vec::new())),
            fail_with: Some(message.to_string()),
        }
    }

    /// Add an output to the end of the queue.
    pub async fn push_output(&self, output: GenerationOutput) {
        self.outputs.lock().await.push_back(output);
    }

    /// Number of generate calls observed so far.
    pub async fn call_count(&self) -> usize {
        self.calls.lock().await.len()
    }

    /// Snapshot of the observed calls, in order.
    pub async fn calls(&self) -> Vec<RecordedGeneration> {
        self.calls.lock().await.clone()
    }

    /// Pop the next queued output, or synthesize one from the request.
    async fn next_output(&self, request: &ContentRequest) -> GenerationOutput {
        if let Some(output) = self.outputs.lock().await.pop_front() {
            return output;
        }
        let topic = request.topic.as_str();
        GenerationOutput {
            variants: ContentVariants {
                short: format!("Quick take on {topic}."),
                medium: format!("A considered look at {topic}, in a few sentences."),
                long: format!(
                    "A full treatment of {topic}: the setup, the argument, and what to do next."
                ),
            },
            tokens_used: 900,
            confidence: 0.9,
            provider: self.kind,
        }
    }
}

impl Default for MockGenerator {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Collaborator for MockGenerator {
    fn name(&self) -> &str {
        "mock-generator"
    }

    async fn health_check(&self) -> Result<HealthStatus, DraftmillError> {
        Ok(HealthStatus::Healthy)
    }
}

#[async_trait]
impl GenerationAdapter for MockGenerator {
    async fn generate(
        &self,
        request: &ContentRequest,
        research: Option<&ResearchOutput>,
    ) -> Result<GenerationOutput, DraftmillError> {
        self.calls.lock().await.push(RecordedGeneration {
            request: request.clone(),
            research_present: research.is_some(),
        });
        if let Some(ref message) = self.fail_with {
            return Err(DraftmillError::Provider {
                message: message.clone(),
                source: None,
            });
        }
        Ok(self.next_output(request).await)
    }
}

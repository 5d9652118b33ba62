// SPDX-FileCopyrightText: 2026 Draftmill Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock research adapter for deterministic testing.

use std::collections::VecDeque;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use draftmill_core::error::DraftmillError;
use draftmill_core::traits::{Collaborator, ResearchAdapter};
use draftmill_core::types::{ContentRequest, HealthStatus, ResearchOutput, ResearchSource};

/// A mock research backend that returns pre-configured outputs.
///
/// Outputs are popped from a FIFO queue. When the queue is empty, a
/// default single-source output derived from the request topic is
/// returned. Researched topics are recorded for later inspection.
pub struct MockResearcher {
    outputs: Arc<Mutex<VecDeque<ResearchOutput>>>,
    topics: Arc<Mutex<Vec<String>>>,
    fail_with: Option<String>,
}

impl MockResearcher {
    /// Create a mock researcher with an empty output queue.
    pub fn new() -> Self {
        Self {
            outputs: Arc::new(Mutex::new(VecDeque::new())),
            topics: Arc::new(Mutex::new(Vec::new())),
            fail_with: None,
        }
    }

    /// Create a mock researcher pre-loaded with the given outputs.
    pub fn with_outputs(outputs: Vec<ResearchOutput>) -> Self {
        Self {
            outputs: Arc::new(Mutex::new(VecDeque::from(outputs))),
            topics: Arc::new(Mutex::new(Vec::new())),
            fail_with: None,
        }
    }

    /// Create a mock researcher that fails every call.
    pub fn failing(message: &str) -> Self {
        Self {
            outputs: Arc::new(Mutex::new(VecDeque::new())),
            topics: Arc::new(Mutex::new(Vec::new())),
            fail_with: Some(message.to_string()),
        }
    }

    /// Number of research calls observed so far.
    pub async fn call_count(&self) -> usize {
        self.topics.lock().await.len()
    }

    /// Topics researched, in call order.
    pub async fn topics(&self) -> Vec<String> {
        self.topics.lock().await.clone()
    }
}

impl Default for MockResearcher {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Collaborator for MockResearcher {
    fn name(&self) -> &str {
        "mock-researcher"
    }

    async fn health_check(&self) -> Result<HealthStatus, DraftmillError> {
        Ok(HealthStatus::Healthy)
    }
}

#[async_trait]
impl ResearchAdapter for MockResearcher {
    async fn research(&self, request: &ContentRequest) -> Result<ResearchOutput, DraftmillError> {
        self.topics.lock().await.push(request.topic.clone());
        if let Some(ref message) = self.fail_with {
            return Err(DraftmillError::Research {
                message: message.clone(),
                source: None,
            });
        }
        if let Some(output) = self.outputs.lock().await.pop_front() {
            return Ok(output);
        }
        let topic = request.topic.as_str();
        Ok(ResearchOutput {
            sources: vec![ResearchSource {
                title: format!("Primer on {topic}"),
                url: "https://example.com/primer".to_string(),
                snippet: format!("What readers should know about {topic}."),
            }],
            insights: vec![format!("Audiences respond to concrete examples of {topic}.")],
            tokens_used: 150,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn default_output_carries_topic() {
        let researcher = MockResearcher::new();
        let request = ContentRequest::new("zero-downtime deploys", "user-1");

        let output = researcher.research(&request).await.unwrap();
        assert_eq!(output.sources.len(), 1);
        assert!(output.sources[0].title.contains("zero-downtime deploys"));
        assert_eq!(researcher.topics().await, vec!["zero-downtime deploys"]);
    }

    #[tokio::test]
    async fn failing_researcher_errors() {
        let researcher = MockResearcher::failing("search unavailable");
        let request = ContentRequest::new("topic", "user-1");

        let err = researcher.research(&request).await.unwrap_err();
        assert!(matches!(err, DraftmillError::Research { .. }));
        assert_eq!(researcher.call_count().await, 1);
    }
}

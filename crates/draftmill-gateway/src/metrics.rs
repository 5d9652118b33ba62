// SPDX-FileCopyrightText: 2026 Draftmill Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Metric registration and recording helpers.
//!
//! Uses the metrics-rs facade so any recorder (Prometheus, statsd, etc.)
//! can collect these metrics.

use metrics::{describe_counter, describe_histogram};

/// Register all Draftmill metric descriptions.
///
/// Called once at startup after the recorder is installed.
pub fn register_metrics() {
    describe_counter!(
        "draftmill_requests_total",
        "Total content requests, labelled by outcome"
    );
    describe_counter!(
        "draftmill_cache_hits_total",
        "Requests answered from cache, labelled by tier"
    );
    describe_counter!(
        "draftmill_tokens_total",
        "Tokens consumed by generation runs, labelled by provider"
    );
    describe_counter!(
        "draftmill_patterns_learned_total",
        "Patterns created or reinforced from successful posts"
    );
    describe_histogram!(
        "draftmill_pipeline_latency_seconds",
        "End-to-end request latency in seconds"
    );
}

/// Record one processed request with its outcome
/// (`cache-hit`, `generated`, `rejected`, or `failed`).
pub fn record_request(outcome: &'static str) {
    metrics::counter!("draftmill_requests_total", "outcome" => outcome).increment(1);
}

/// Record a cache hit and the tier that answered it.
pub fn record_cache_hit(tier: &str) {
    metrics::counter!("draftmill_cache_hits_total", "tier" => tier.to_string()).increment(1);
}

/// Record token consumption for a generation run.
pub fn record_tokens(provider: &str, tokens: u32) {
    metrics::counter!("draftmill_tokens_total", "provider" => provider.to_string())
        .increment(u64::from(tokens));
}

/// Record a learned or reinforced pattern.
pub fn record_pattern_learned() {
    metrics::counter!("draftmill_patterns_learned_total").increment(1);
}

/// Record end-to-end pipeline latency.
pub fn record_latency(seconds: f64) {
    metrics::histogram!("draftmill_pipeline_latency_seconds").record(seconds);
}

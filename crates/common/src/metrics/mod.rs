//! Metrics and observability utilities
//!
//! Provides Prometheus metrics with standardized naming conventions for
//! the question-answering pipeline.

use metrics::{counter, describe_counter, describe_histogram, histogram, Unit};
use std::time::Instant;

/// Metrics prefix for all AskPDF metrics
pub const METRICS_PREFIX: &str = "askpdf";

/// Histogram buckets for oracle call latency (model inference is slow)
pub const ORACLE_BUCKETS: &[f64] = &[
    0.050, // 50ms
    0.100, // 100ms
    0.250, // 250ms
    0.500, // 500ms
    1.000, // 1s
    2.000, // 2s
    5.000, // 5s
    10.00, // 10s
    30.00, // 30s
];

/// Register all metric descriptions
pub fn register_metrics() {
    // Request metrics
    describe_counter!(
        format!("{}_requests_total", METRICS_PREFIX),
        Unit::Count,
        "Total number of HTTP requests"
    );

    describe_histogram!(
        format!("{}_request_duration_seconds", METRICS_PREFIX),
        Unit::Seconds,
        "HTTP request latency in seconds"
    );

    // Question metrics
    describe_counter!(
        format!("{}_questions_total", METRICS_PREFIX),
        Unit::Count,
        "Total questions answered, labeled by outcome"
    );

    describe_histogram!(
        format!("{}_question_duration_seconds", METRICS_PREFIX),
        Unit::Seconds,
        "End-to-end question latency in seconds"
    );

    // Scoring metrics
    describe_counter!(
        format!("{}_chunks_scored_total", METRICS_PREFIX),
        Unit::Count,
        "Total chunks submitted for scoring"
    );

    describe_counter!(
        format!("{}_scoring_failures_total", METRICS_PREFIX),
        Unit::Count,
        "Chunk scoring calls that failed or timed out"
    );

    describe_histogram!(
        format!("{}_oracle_duration_seconds", METRICS_PREFIX),
        Unit::Seconds,
        "Oracle call latency in seconds"
    );

    // Upload metrics
    describe_counter!(
        format!("{}_documents_uploaded_total", METRICS_PREFIX),
        Unit::Count,
        "Total documents uploaded"
    );

    describe_histogram!(
        format!("{}_document_size_bytes", METRICS_PREFIX),
        Unit::Bytes,
        "Uploaded document size in bytes"
    );

    tracing::info!("Metrics registered");
}

/// Helper to record request metrics
pub struct RequestMetrics {
    start: Instant,
    endpoint: String,
    method: String,
}

impl RequestMetrics {
    /// Start tracking a request
    pub fn start(method: &str, endpoint: &str) -> Self {
        Self {
            start: Instant::now(),
            endpoint: endpoint.to_string(),
            method: method.to_string(),
        }
    }

    /// Record request completion
    pub fn finish(self, status: u16) {
        let duration = self.start.elapsed().as_secs_f64();

        counter!(
            format!("{}_requests_total", METRICS_PREFIX),
            "method" => self.method.clone(),
            "endpoint" => self.endpoint.clone(),
            "status" => status.to_string()
        )
        .increment(1);

        histogram!(
            format!("{}_request_duration_seconds", METRICS_PREFIX),
            "method" => self.method,
            "endpoint" => self.endpoint
        )
        .record(duration);
    }
}

/// Helper to record question metrics
pub fn record_question(duration_secs: f64, outcome: &str, chunks_scored: usize) {
    counter!(
        format!("{}_questions_total", METRICS_PREFIX),
        "outcome" => outcome.to_string()
    )
    .increment(1);

    counter!(format!("{}_chunks_scored_total", METRICS_PREFIX)).increment(chunks_scored as u64);

    histogram!(
        format!("{}_question_duration_seconds", METRICS_PREFIX),
        "outcome" => outcome.to_string()
    )
    .record(duration_secs);
}

/// Helper to record an oracle call
pub fn record_oracle_call(duration_secs: f64, success: bool) {
    if success {
        histogram!(format!("{}_oracle_duration_seconds", METRICS_PREFIX)).record(duration_secs);
    } else {
        counter!(format!("{}_scoring_failures_total", METRICS_PREFIX)).increment(1);
    }
}

/// Helper to record a document upload
pub fn record_upload(size_bytes: usize) {
    counter!(format!("{}_documents_uploaded_total", METRICS_PREFIX)).increment(1);

    histogram!(format!("{}_document_size_bytes", METRICS_PREFIX)).record(size_bytes as f64);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_oracle_buckets_sorted() {
        let mut prev = 0.0;
        for &bucket in ORACLE_BUCKETS {
            assert!(bucket > prev);
            prev = bucket;
        }
    }

    #[test]
    fn test_request_metrics() {
        let metrics = RequestMetrics::start("POST", "/v1/questions");
        std::thread::sleep(std::time::Duration::from_millis(10));
        metrics.finish(200);
        // Just verify it runs without panic
    }
}

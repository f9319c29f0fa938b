// prometheus exporter setup

use std::time::Instant;

use axum::{
    body::Body,
    extract::{MatchedPath, Request},
    middleware::Next,
    response::IntoResponse,
};
use metrics::{counter, histogram};
use metrics_exporter_prometheus::{Matcher, PrometheusBuilder, PrometheusHandle};

pub const INGEST_PAYLOADS_RECEIVED_TOTAL: &str = "ingest_payloads_received_total";
pub const INGEST_PAYLOADS_DROPPED_TOTAL: &str = "ingest_payloads_dropped_total";
pub const INGEST_PAYLOADS_DECOMPRESSED_TOTAL: &str = "ingest_payloads_decompressed_total";
pub const INGEST_PAYLOAD_SIZE_BYTES: &str = "ingest_payload_size_bytes";
pub const INGEST_JOBS_ISSUED_TOTAL: &str = "ingest_jobs_issued_total";
pub const INGEST_JOBS_TRACKED: &str = "ingest_jobs_tracked";

const HTTP_REQUESTS_TOTAL: &str = "http_requests_total";
const HTTP_REQUESTS_DURATION_SECONDS: &str = "http_requests_duration_seconds";

pub fn report_dropped_payload(cause: &'static str) {
    counter!(INGEST_PAYLOADS_DROPPED_TOTAL, "cause" => cause).increment(1);
}

pub fn report_payload_size(stage: &'static str, bytes: usize) {
    histogram!(INGEST_PAYLOAD_SIZE_BYTES, "stage" => stage).record(bytes as f64);
}

pub fn setup_metrics_recorder() -> PrometheusHandle {
    const EXPONENTIAL_SECONDS: &[f64] = &[
        0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0, 60.0,
    ];
    // page snapshots are whole HTML documents, so skew towards large bodies
    const PAYLOAD_SIZES: &[f64] = &[
        1024.0,     // 1KB
        10240.0,    // 10KB
        102400.0,   // 100KB
        524288.0,   // 512KB
        1048576.0,  // 1MB
        5242880.0,  // 5MB
        10485760.0, // 10MB
        26214400.0, // 25MB, default body limit
    ];

    PrometheusBuilder::new()
        .set_buckets_for_metric(
            Matcher::Full(HTTP_REQUESTS_DURATION_SECONDS.to_string()),
            EXPONENTIAL_SECONDS,
        )
        .unwrap()
        .set_buckets_for_metric(
            Matcher::Full(INGEST_PAYLOAD_SIZE_BYTES.to_string()),
            PAYLOAD_SIZES,
        )
        .unwrap()
        .install_recorder()
        .unwrap()
}

/// Middleware to record some common HTTP metrics
/// Someday tower-http might provide a metrics middleware: https://github.com/tower-rs/tower-http/issues/57
pub async fn track_metrics(req: Request<Body>, next: Next) -> impl IntoResponse {
    let start = Instant::now();

    let path = if let Some(matched_path) = req.extensions().get::<MatchedPath>() {
        matched_path.as_str().to_owned()
    } else {
        req.uri().path().to_owned()
    };

    let method = req.method().clone();

    // Run the rest of the request handling first, so we can measure it and get response
    // codes.
    let response = next.run(req).await;

    let latency = start.elapsed().as_secs_f64();
    let status = response.status().as_u16().to_string();

    let labels = [
        ("method", method.to_string()),
        ("path", path),
        ("status", status),
    ];

    counter!(HTTP_REQUESTS_TOTAL, &labels).increment(1);
    histogram!(HTTP_REQUESTS_DURATION_SECONDS, &labels).record(latency);

    response
}

#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use time::OffsetDateTime;
use tower::ServiceExt;

use ingest::api::{IngestError, JobStatusResponse};
use ingest::jobs::{CannedRegistry, JobIdGenerator, JobRegistry, JobTicket, MemoryRegistry};
use ingest::payload::CapturePayload;
use ingest::router::router;
use ingest::time::TimeSource;

pub const MAX_BODY_SIZE: usize = 1_000_000;
pub const TRACK_URL_BASE: &str = "https://your-service.com";
pub const FIXED_UNIX_TIME: i64 = 1_700_000_000;

#[derive(Clone)]
pub struct FixedTime {
    pub time: OffsetDateTime,
}

impl Default for FixedTime {
    fn default() -> Self {
        FixedTime {
            time: OffsetDateTime::from_unix_timestamp(FIXED_UNIX_TIME).unwrap(),
        }
    }
}

impl TimeSource for FixedTime {
    fn now(&self) -> OffsetDateTime {
        self.time
    }
}

/// Records every payload it is handed, answers status like the canned registry.
#[derive(Clone)]
pub struct RecordingRegistry {
    inner: Arc<CannedRegistry>,
    payloads: Arc<Mutex<Vec<CapturePayload>>>,
}

impl Default for RecordingRegistry {
    fn default() -> Self {
        RecordingRegistry {
            inner: Arc::new(CannedRegistry::new(
                JobIdGenerator::new(Arc::new(FixedTime::default())),
                TRACK_URL_BASE.to_string(),
            )),
            payloads: Arc::new(Mutex::new(Vec::new())),
        }
    }
}

impl RecordingRegistry {
    pub fn payloads(&self) -> Vec<CapturePayload> {
        self.payloads.lock().unwrap().clone()
    }
}

#[async_trait]
impl JobRegistry for RecordingRegistry {
    async fn submit(&self, payload: CapturePayload) -> Result<JobTicket, IngestError> {
        self.payloads.lock().unwrap().push(payload.clone());
        self.inner.submit(payload).await
    }

    async fn status(&self, job_id: &str) -> Option<JobStatusResponse> {
        self.inner.status(job_id).await
    }
}

pub fn recording_app() -> (Router, RecordingRegistry) {
    let registry = RecordingRegistry::default();
    let app = router(Arc::new(registry.clone()), false, MAX_BODY_SIZE, None);
    (app, registry)
}

pub fn memory_app(max_jobs: usize) -> Router {
    let registry = MemoryRegistry::new(
        JobIdGenerator::new(Arc::new(FixedTime::default())),
        TRACK_URL_BASE.to_string(),
        max_jobs,
    );
    router(Arc::new(registry), false, MAX_BODY_SIZE, Some(8))
}

pub fn capture(encoding: &str) -> Value {
    json!({
        "page": {"url": "https://example.com/post/42", "title": "A post worth keeping"},
        "snapshot": {"html": "<!doctype html><html><body><article>Keep me, keep me</article></body></html>"},
        "transfer": {"encoding": encoding},
        "client": {"bookmarkletVersion": "1.4.0"}
    })
}

pub fn lz64(document: &Value) -> String {
    let utf16_bytes: Vec<u16> = document.to_string().encode_utf16().collect();
    lz_str::compress_to_base64(utf16_bytes)
}

pub fn post(uri: &str, body: impl Into<Body>) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "text/plain")
        .body(body.into())
        .unwrap()
}

pub fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

pub async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let body = response.into_body().collect().await.unwrap().to_bytes();
    let body = if body.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&body).unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&body).into_owned()))
    };
    (status, body)
}

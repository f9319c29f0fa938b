use std::collections::{HashMap, VecDeque};

use async_trait::async_trait;
use metrics::{counter, gauge};
use time::OffsetDateTime;
use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::api::{IngestError, JobStatus, JobStatusResponse, PROCESSING_MESSAGE};
use crate::jobs::{JobIdGenerator, JobRegistry, JobTicket};
use crate::payload::CapturePayload;
use crate::prometheus::{INGEST_JOBS_ISSUED_TOTAL, INGEST_JOBS_TRACKED};

#[derive(Debug, Clone)]
pub struct JobRecord {
    pub job_id: String,
    pub url: String,
    pub title: String,
    pub html_bytes: usize,
    pub client_version: String,
    pub created_at: OffsetDateTime,
    pub status: JobStatus,
}

#[derive(Default)]
struct JobTable {
    records: HashMap<String, JobRecord>,
    // insertion order, oldest first
    order: VecDeque<String>,
}

/// Keeps issued jobs in process memory, so unknown ids can be told apart
/// from issued ones. Nothing survives a restart, and once `max_jobs` is
/// reached the oldest job is forgotten.
pub struct MemoryRegistry {
    ids: JobIdGenerator,
    track_url_base: String,
    max_jobs: usize,
    jobs: RwLock<JobTable>,
}

impl MemoryRegistry {
    pub fn new(ids: JobIdGenerator, track_url_base: String, max_jobs: usize) -> Self {
        MemoryRegistry {
            ids,
            track_url_base,
            max_jobs: max_jobs.max(1),
            jobs: RwLock::new(JobTable::default()),
        }
    }

    pub async fn len(&self) -> usize {
        self.jobs.read().await.records.len()
    }

    pub async fn get(&self, job_id: &str) -> Option<JobRecord> {
        self.jobs.read().await.records.get(job_id).cloned()
    }
}

#[async_trait]
impl JobRegistry for MemoryRegistry {
    async fn submit(&self, payload: CapturePayload) -> Result<JobTicket, IngestError> {
        let mut jobs = self.jobs.write().await;

        let mut job_id = self.ids.next_id();
        while jobs.records.contains_key(&job_id) {
            job_id = self.ids.next_id();
        }

        while jobs.records.len() >= self.max_jobs {
            let Some(oldest) = jobs.order.pop_front() else {
                break;
            };
            if let Some(evicted) = jobs.records.remove(&oldest) {
                debug!(
                    title = %evicted.title,
                    created_at = %evicted.created_at,
                    "evicting job {}",
                    oldest
                );
            }
        }

        let record = JobRecord {
            job_id: job_id.clone(),
            url: payload.page.url,
            title: payload.page.title,
            html_bytes: payload.snapshot.html.len(),
            client_version: payload.client.bookmarklet_version,
            created_at: self.ids.now(),
            status: JobStatus::Processing,
        };
        jobs.records.insert(job_id.clone(), record);
        jobs.order.push_back(job_id.clone());

        info!("Storing job {} for processing...", job_id);
        counter!(INGEST_JOBS_ISSUED_TOTAL, "registry" => "memory").increment(1);
        gauge!(INGEST_JOBS_TRACKED).set(jobs.records.len() as f64);

        Ok(JobTicket::new(job_id, &self.track_url_base))
    }

    async fn status(&self, job_id: &str) -> Option<JobStatusResponse> {
        let jobs = self.jobs.read().await;
        jobs.records.get(job_id).map(|record| JobStatusResponse {
            job_id: record.job_id.clone(),
            status: record.status,
            message: PROCESSING_MESSAGE.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use time::macros::datetime;

    use super::*;
    use crate::time::{SystemTime, TimeSource};

    struct FixedTime(OffsetDateTime);

    impl TimeSource for FixedTime {
        fn now(&self) -> OffsetDateTime {
            self.0
        }
    }

    fn payload(url: &str) -> CapturePayload {
        serde_json::from_value(serde_json::json!({
            "page": {"url": url, "title": "T"},
            "snapshot": {"html": "<p>hi</p>"},
            "transfer": {"encoding": "identity"},
            "client": {"bookmarkletVersion": "1.0"}
        }))
        .unwrap()
    }

    fn registry(max_jobs: usize) -> MemoryRegistry {
        MemoryRegistry::new(
            JobIdGenerator::new(Arc::new(SystemTime {})),
            "http://localhost:5000".to_string(),
            max_jobs,
        )
    }

    #[tokio::test]
    async fn test_submit_then_status() {
        let registry = registry(10);

        let ticket = registry.submit(payload("https://e.com")).await.unwrap();
        let status = registry.status(&ticket.job_id).await.unwrap();
        assert_eq!(status.job_id, ticket.job_id);
        assert_eq!(status.status, JobStatus::Processing);

        let record = registry.get(&ticket.job_id).await.unwrap();
        assert_eq!(record.url, "https://e.com");
        assert_eq!(record.title, "T");
        assert_eq!(record.html_bytes, "<p>hi</p>".len());
        assert_eq!(record.client_version, "1.0");
    }

    #[tokio::test]
    async fn test_record_uses_registry_clock() {
        let registry = MemoryRegistry::new(
            JobIdGenerator::new(Arc::new(FixedTime(datetime!(2023-11-14 22:13:20 UTC)))),
            "http://localhost:5000".to_string(),
            10,
        );

        let ticket = registry.submit(payload("https://e.com")).await.unwrap();
        let record = registry.get(&ticket.job_id).await.unwrap();
        assert_eq!(record.created_at, datetime!(2023-11-14 22:13:20 UTC));
        assert!(ticket.job_id.starts_with("job_1700000000_"));
    }

    #[tokio::test]
    async fn test_unknown_job() {
        let registry = registry(10);
        assert!(registry.status("job_0_unknown0").await.is_none());
    }

    #[tokio::test]
    async fn test_oldest_job_is_evicted() {
        let registry = registry(2);

        let first = registry.submit(payload("https://a.com")).await.unwrap();
        let second = registry.submit(payload("https://b.com")).await.unwrap();
        let third = registry.submit(payload("https://c.com")).await.unwrap();

        assert_eq!(registry.len().await, 2);
        assert!(registry.status(&first.job_id).await.is_none());
        assert!(registry.status(&second.job_id).await.is_some());
        assert!(registry.status(&third.job_id).await.is_some());
    }
}

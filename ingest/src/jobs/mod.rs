use async_trait::async_trait;

use crate::api::{IngestError, JobStatusResponse};
use crate::payload::CapturePayload;

pub mod canned;
pub mod id;
pub mod memory;

pub use canned::CannedRegistry;
pub use id::JobIdGenerator;
pub use memory::MemoryRegistry;

/// Identifies an accepted capture and where its progress can be followed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobTicket {
    pub job_id: String,
    pub track_url: String,
}

impl JobTicket {
    pub fn new(job_id: String, track_url_base: &str) -> Self {
        let track_url = format!("{}/jobs/{}", track_url_base.trim_end_matches('/'), job_id);
        JobTicket { job_id, track_url }
    }
}

#[async_trait]
pub trait JobRegistry {
    async fn submit(&self, payload: CapturePayload) -> Result<JobTicket, IngestError>;
    async fn status(&self, job_id: &str) -> Option<JobStatusResponse>;
}

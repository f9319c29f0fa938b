use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::jobs::JobTicket;
use crate::payload::DecodeError;

pub const ACCEPTED_MESSAGE: &str = "Page capture received and queued for processing";
pub const PROCESSING_MESSAGE: &str = "Job is being processed...";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Accepted,
    Processing,
}

#[derive(Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IngestResponse {
    pub job_id: String,
    pub track_url: String,
    pub status: JobStatus,
    pub message: String,
}

impl IngestResponse {
    pub fn accepted(ticket: JobTicket) -> Self {
        IngestResponse {
            job_id: ticket.job_id,
            track_url: ticket.track_url,
            status: JobStatus::Accepted,
            message: ACCEPTED_MESSAGE.to_string(),
        }
    }
}

impl IntoResponse for IngestResponse {
    fn into_response(self) -> Response {
        (StatusCode::ACCEPTED, Json(self)).into_response()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JobStatusResponse {
    pub job_id: String,
    pub status: JobStatus,
    pub message: String,
}

impl JobStatusResponse {
    pub fn processing(job_id: &str) -> Self {
        JobStatusResponse {
            job_id: job_id.to_string(),
            status: JobStatus::Processing,
            message: PROCESSING_MESSAGE.to_string(),
        }
    }
}

impl IntoResponse for JobStatusResponse {
    fn into_response(self) -> Response {
        Json(self).into_response()
    }
}

#[derive(Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Error, Debug)]
pub enum IngestError {
    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error("job {0} not found")]
    JobNotFound(String),
}

impl IngestError {
    pub fn to_metric_tag(&self) -> &'static str {
        match self {
            IngestError::Decode(DecodeError::MalformedJson) => "malformed_json",
            IngestError::Decode(DecodeError::DecompressionFailed(_)) => "decompression_failed",
            IngestError::Decode(DecodeError::MissingField(_)) => "missing_field",
            IngestError::Decode(DecodeError::InvalidField(_)) => "invalid_field",
            IngestError::JobNotFound(_) => "job_not_found",
        }
    }
}

impl IntoResponse for IngestError {
    fn into_response(self) -> Response {
        let (status, error) = match self {
            IngestError::Decode(DecodeError::MalformedJson) => {
                (StatusCode::BAD_REQUEST, "Invalid JSON payload")
            }

            IngestError::Decode(DecodeError::DecompressionFailed(_))
            | IngestError::Decode(DecodeError::MissingField(_))
            | IngestError::Decode(DecodeError::InvalidField(_)) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "Failed to process payload")
            }

            IngestError::JobNotFound(_) => (StatusCode::NOT_FOUND, "Job not found"),
        };

        (
            status,
            Json(ErrorResponse {
                error: error.to_string(),
            }),
        )
            .into_response()
    }
}

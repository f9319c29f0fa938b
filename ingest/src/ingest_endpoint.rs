use axum::body::Bytes;
use axum::extract::{Path, Query, State};
use axum::debug_handler;
use axum::http::StatusCode;
use metrics::counter;
use tracing::{info, instrument, warn, Span};

use crate::{
    api::{IngestError, IngestResponse, JobStatusResponse},
    payload::{decode, IngestQuery},
    prometheus::{
        report_dropped_payload, report_payload_size, INGEST_PAYLOADS_DECOMPRESSED_TOTAL,
        INGEST_PAYLOADS_RECEIVED_TOTAL,
    },
    router,
};

#[instrument(skip_all, fields(compression, wire_bytes, job_id))]
#[debug_handler]
pub async fn ingest(
    state: State<router::State>,
    meta: Query<IngestQuery>,
    body: Bytes,
) -> Result<IngestResponse, IngestError> {
    let hint = meta.0.compression;
    if let Some(compression) = hint {
        Span::current().record("compression", compression.as_str());
    }
    Span::current().record("wire_bytes", body.len());

    counter!(INGEST_PAYLOADS_RECEIVED_TOTAL).increment(1);
    report_payload_size("wire", body.len());

    let decoded = decode(&body, hint).map_err(|err| {
        let err = IngestError::from(err);
        report_dropped_payload(err.to_metric_tag());
        warn!("ingest: rejected payload: {}", err);
        err
    })?;

    if let Some(compression) = decoded.compression {
        counter!(INGEST_PAYLOADS_DECOMPRESSED_TOTAL, "compression" => compression.as_str())
            .increment(1);
        info!(
            "Decompressed payload from {} to {} bytes",
            decoded.wire_bytes, decoded.decoded_bytes
        );
    }
    report_payload_size("decoded", decoded.decoded_bytes);

    let payload = decoded.payload;
    info!(
        url = %payload.page.url,
        title = %payload.page.title,
        html_bytes = payload.snapshot.html.len(),
        transfer_encoding = payload.transfer.encoding.as_str(),
        client_version = %payload.client.bookmarklet_version,
        "Received page capture"
    );

    let ticket = state.registry.submit(payload).await.map_err(|err| {
        report_dropped_payload(err.to_metric_tag());
        warn!("ingest: failed to register job: {}", err);
        err
    })?;
    Span::current().record("job_id", ticket.job_id.as_str());

    Ok(IngestResponse::accepted(ticket))
}

pub async fn options() -> StatusCode {
    StatusCode::OK
}

#[instrument(skip_all)]
pub async fn job_status(
    state: State<router::State>,
    Path(job_id): Path<String>,
) -> Result<JobStatusResponse, IngestError> {
    match state.registry.status(&job_id).await {
        Some(status) => Ok(status),
        None => Err(IngestError::JobNotFound(job_id)),
    }
}

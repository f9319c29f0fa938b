use std::convert::Infallible;
use std::future::ready;
use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::http::Method;
use axum::{
    routing::{get, post},
    Router,
};
use tower::limit::ConcurrencyLimitLayer;
use tower_http::cors::{AllowHeaders, AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::ingest_endpoint;
use crate::jobs::JobRegistry;
use crate::prometheus::{setup_metrics_recorder, track_metrics};

#[derive(Clone)]
pub struct State {
    pub registry: Arc<dyn JobRegistry + Send + Sync>,
}

async fn index() -> &'static str {
    "ingest"
}

pub fn router(
    registry: Arc<dyn JobRegistry + Send + Sync>,
    metrics: bool,
    max_body_size: usize,
    concurrency_limit: Option<usize>,
) -> Router {
    let state = State { registry };

    // The bookmarklet posts from whatever page the user is on,
    // so mirror back any origin and header it asks for.
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(AllowHeaders::mirror_request())
        .allow_credentials(true)
        .allow_origin(AllowOrigin::mirror_request());

    let ingest = post(ingest_endpoint::ingest).options(ingest_endpoint::options);
    let ingest = match concurrency_limit {
        Some(limit) => ingest.layer::<_, Infallible>(ConcurrencyLimitLayer::new(limit)),
        None => ingest,
    };
    let ingest = ingest.layer::<_, Infallible>(DefaultBodyLimit::max(max_body_size));

    let router = Router::new()
        // TODO: use NormalizePathLayer::trim_trailing_slash
        .route("/", get(index))
        .route("/_readiness", get(index))
        .route("/_liveness", get(index))
        .route("/ingest", ingest.clone())
        .route("/ingest/", ingest)
        .route("/jobs/:job_id", get(ingest_endpoint::job_status))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(axum::middleware::from_fn(track_metrics))
        .with_state(state);

    // Don't install metrics unless asked to
    // Installing a global recorder when ingest is used as a library (during tests etc)
    // does not work well.
    if metrics {
        let recorder_handle = setup_metrics_recorder();
        router.route("/metrics", get(move || ready(recorder_handle.render())))
    } else {
        router
    }
}

use std::future::Future;
use std::sync::Arc;

use tokio::net::TcpListener;

use crate::config::{Config, JobRegistryMode};
use crate::jobs::{CannedRegistry, JobIdGenerator, JobRegistry, MemoryRegistry};
use crate::router;
use crate::time::{SystemTime, TimeSource};

pub fn create_registry(
    config: &Config,
    timesource: Arc<dyn TimeSource + Send + Sync>,
) -> Arc<dyn JobRegistry + Send + Sync> {
    let ids = JobIdGenerator::new(timesource);

    match config.job_registry {
        JobRegistryMode::Canned => {
            Arc::new(CannedRegistry::new(ids, config.track_url_base.clone()))
        }
        JobRegistryMode::Memory => Arc::new(MemoryRegistry::new(
            ids,
            config.track_url_base.clone(),
            config.max_jobs,
        )),
    }
}

pub async fn serve<F>(config: Config, listener: TcpListener, shutdown: F) -> std::io::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let registry = create_registry(&config, Arc::new(SystemTime {}));

    let app = router::router(
        registry,
        config.export_prometheus,
        config.max_body_size,
        config.concurrency_limit,
    );

    tracing::info!("listening on {:?}", listener.local_addr()?);
    tracing::info!(
        "config: job_registry == {:?} ; track_url_base == {} ; log_level == {:?}",
        config.job_registry,
        config.track_url_base,
        config.log_level
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await
}

use std::net::SocketAddr;

use envconfig::Envconfig;
use tracing::Level;

#[derive(Debug, PartialEq, Clone, Copy)]
pub enum JobRegistryMode {
    /// Issue ids, answer every status query with "processing"
    Canned,
    /// Remember issued ids in process memory
    Memory,
}

impl std::str::FromStr for JobRegistryMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_ref() {
            "canned" => Ok(JobRegistryMode::Canned),
            "memory" => Ok(JobRegistryMode::Memory),
            _ => Err(format!("Unknown job registry: {s}")),
        }
    }
}

#[derive(Envconfig, Clone)]
pub struct Config {
    #[envconfig(default = "127.0.0.1:5000")]
    pub address: SocketAddr,

    // Used for integration tests
    #[envconfig(default = "true")]
    pub export_prometheus: bool,

    pub otel_url: Option<String>,

    #[envconfig(default = "1.0")]
    pub otel_sampling_rate: f64,

    #[envconfig(default = "ingest")]
    pub otel_service_name: String,

    #[envconfig(default = "info")]
    pub log_level: Level,

    #[envconfig(default = "https://your-service.com")]
    pub track_url_base: String,

    #[envconfig(default = "canned")]
    pub job_registry: JobRegistryMode,

    #[envconfig(default = "10000")]
    pub max_jobs: usize,

    #[envconfig(default = "26214400")] // 25MB, snapshots embed the whole page
    pub max_body_size: usize,

    pub concurrency_limit: Option<usize>,
}

pub mod api;
pub mod config;
pub mod ingest_endpoint;
pub mod jobs;
pub mod payload;
pub mod prometheus;
pub mod router;
pub mod server;
pub mod time;

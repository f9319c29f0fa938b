//! Payload handling for ingest requests
//!
//! This module contains the logic for decompressing, decoding and validating
//! the page captures posted to the ingest endpoint.

pub mod decoder;
pub mod decompression;
pub mod types;

// Re-export commonly used types
pub use decoder::{decode, DecodeError, Decoded};
pub use decompression::decompress_payload;
pub use types::{CapturePayload, Compression, IngestQuery, TransferEncoding};

//! Turns raw ingest request bodies into validated capture payloads.
//!
//! A body is either a plain JSON document or an LZ-string compression of one.
//! Compression is resolved in this order:
//!   - an explicit LZ hint from the request wins, the whole body is decompressed;
//!   - otherwise the body is parsed as JSON, and if that document carries the
//!     in-band `transfer.encoding: "lz"` flag the raw body is decompressed instead;
//!   - otherwise, if the body does not parse and looks like compressed text,
//!     it is sniffed for the LZ-string alphabet it uses.
//!
//! Decoding is a pure function of its input and never logs.

use serde_json::Value;
use thiserror::Error;

use crate::payload::decompression::decompress_payload;
use crate::payload::types::{CapturePayload, Compression, TransferEncoding};

/// Required string fields, in the order they are checked.
pub const REQUIRED_FIELDS: [&str; 5] = [
    "page.url",
    "page.title",
    "snapshot.html",
    "transfer.encoding",
    "client.bookmarkletVersion",
];

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    #[error("payload is not a valid JSON document")]
    MalformedJson,
    #[error("failed to decompress {0} payload")]
    DecompressionFailed(Compression),
    #[error("payload is missing required field {0}")]
    MissingField(&'static str),
    #[error("payload field {0} holds an invalid value")]
    InvalidField(&'static str),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Decoded {
    pub payload: CapturePayload,
    /// Compression that was undone, if any
    pub compression: Option<Compression>,
    pub wire_bytes: usize,
    pub decoded_bytes: usize,
}

pub fn decode(body: &[u8], hint: Option<Compression>) -> Result<Decoded, DecodeError> {
    let text = std::str::from_utf8(body).map_err(|_| DecodeError::MalformedJson)?;
    if text.trim().is_empty() {
        return Err(DecodeError::MalformedJson);
    }

    let (mut document, compression, decoded_bytes) = match hint {
        Some(compression) if compression.is_lz() => {
            let (document, decoded_bytes) = decompress_flagged(text, compression)?;
            (document, Some(compression), decoded_bytes)
        }
        _ => match serde_json::from_str::<Value>(text) {
            Ok(document) if is_flagged_lz(&document) => {
                let (document, decoded_bytes) = decompress_flagged(text, Compression::LZRaw)?;
                (document, Some(Compression::LZRaw), decoded_bytes)
            }
            Ok(document) => (document, None, text.len()),
            Err(_) if hint == Some(Compression::Identity) => {
                return Err(DecodeError::MalformedJson)
            }
            Err(_) => {
                let compression = sniff_compression(text).ok_or(DecodeError::MalformedJson)?;
                // The body never claimed to be compressed, so any failure here
                // means the client sent garbage rather than a broken LZ stream.
                let decompressed =
                    decompress_payload(text, compression).map_err(|_| DecodeError::MalformedJson)?;
                let document = serde_json::from_str::<Value>(&decompressed)
                    .map_err(|_| DecodeError::MalformedJson)?;
                (document, Some(compression), decompressed.len())
            }
        },
    };

    validate_fields(&document)?;

    if let Some(encoding) = document.pointer_mut("/transfer/encoding") {
        *encoding = Value::from(TransferEncoding::Identity.as_str());
    }
    let payload =
        serde_json::from_value::<CapturePayload>(document).map_err(|_| DecodeError::MalformedJson)?;

    Ok(Decoded {
        payload,
        compression,
        wire_bytes: body.len(),
        decoded_bytes,
    })
}

/// Decompress a body that was explicitly flagged as compressed: every
/// failure is a decompression failure.
fn decompress_flagged(text: &str, compression: Compression) -> Result<(Value, usize), DecodeError> {
    let decompressed = decompress_payload(text, compression)?;
    let document = serde_json::from_str::<Value>(&decompressed)
        .map_err(|_| DecodeError::DecompressionFailed(compression))?;
    Ok((document, decompressed.len()))
}

fn is_flagged_lz(document: &Value) -> bool {
    document.pointer("/transfer/encoding").and_then(Value::as_str)
        == Some(TransferEncoding::Lz.as_str())
}

/// Guess which LZ-string alphabet a non-JSON body is written in.
/// Returns None for bodies that look like (broken) JSON.
pub fn sniff_compression(text: &str) -> Option<Compression> {
    let trimmed = text.trim();
    if trimmed.is_empty() || trimmed.starts_with(['{', '[']) {
        return None;
    }

    if trimmed
        .bytes()
        .all(|b| b.is_ascii_alphanumeric() || matches!(b, b'+' | b'/' | b'='))
    {
        Some(Compression::LZString)
    } else if trimmed
        .bytes()
        .all(|b| b.is_ascii_alphanumeric() || matches!(b, b'+' | b'-' | b'$'))
    {
        Some(Compression::LZUri)
    } else {
        Some(Compression::LZUtf16)
    }
}

fn lookup<'a>(document: &'a Value, path: &str) -> Option<&'a Value> {
    path.split('.').try_fold(document, |node, key| node.get(key))
}

fn validate_fields(document: &Value) -> Result<(), DecodeError> {
    for path in REQUIRED_FIELDS {
        match lookup(document, path) {
            None => return Err(DecodeError::MissingField(path)),
            Some(Value::String(_)) => {}
            Some(_) => return Err(DecodeError::InvalidField(path)),
        }
    }

    let encoding = lookup(document, "transfer.encoding").and_then(Value::as_str);
    if encoding.and_then(TransferEncoding::parse).is_none() {
        return Err(DecodeError::InvalidField("transfer.encoding"));
    }

    Ok(())
}

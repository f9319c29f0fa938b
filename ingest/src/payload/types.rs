//! Types related to the ingest request payload

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use tracing::debug;

/// Compression applied to a request body, as announced by the client
/// through the `compression` query param or inferred from the body itself.
#[derive(Default, Clone, Copy, PartialEq, Eq, Debug)]
pub enum Compression {
    #[default]
    Unsupported,
    Identity,
    /// Raw LZ-string stream, as produced by `LZString.compress`
    LZRaw,
    /// Base64 alphabet, as produced by `LZString.compressToBase64`
    LZString,
    /// Printable UTF-16, as produced by `LZString.compressToUTF16`
    LZUtf16,
    /// URI-safe alphabet, as produced by `LZString.compressToEncodedURIComponent`
    LZUri,
}

impl Compression {
    pub fn is_lz(&self) -> bool {
        matches!(
            self,
            Compression::LZRaw | Compression::LZString | Compression::LZUtf16 | Compression::LZUri
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Compression::Unsupported => "unsupported",
            Compression::Identity => "identity",
            Compression::LZRaw => "lz",
            Compression::LZString => "lz64",
            Compression::LZUtf16 => "lz-utf16",
            Compression::LZUri => "lz-uri",
        }
    }
}

// implement Deserialize directly on the enum so
// Axum query parsing doesn't fail upstream
// of handler code
impl<'de> Deserialize<'de> for Compression {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value =
            String::deserialize(deserializer).unwrap_or("deserialization_error".to_string());

        let result = match value.to_lowercase().as_str() {
            "identity" | "none" => Compression::Identity,
            "lz" | "lz-raw" => Compression::LZRaw,
            "lz64" | "lz-string" | "lz-base64" => Compression::LZString,
            "lz-utf16" => Compression::LZUtf16,
            "lz-uri" => Compression::LZUri,
            "deserialization_error" => {
                debug!("compression value did not deserialize");
                Compression::Unsupported
            }
            _ => {
                debug!("unsupported compression value: {}", value);
                Compression::Unsupported
            }
        };

        Ok(result)
    }
}

impl std::fmt::Display for Compression {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Deserialize, Default)]
pub struct IngestQuery {
    pub compression: Option<Compression>,
}

/// Value of the in-band `transfer.encoding` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransferEncoding {
    Identity,
    Lz,
}

impl TransferEncoding {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "identity" => Some(TransferEncoding::Identity),
            "lz" => Some(TransferEncoding::Lz),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TransferEncoding::Identity => "identity",
            TransferEncoding::Lz => "lz",
        }
    }
}

/// A page capture as sent by the bookmarklet.
///
/// Only the fields the service reads are typed, everything else a client
/// sends is kept in the `extra` maps so the document survives decoding intact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CapturePayload {
    pub page: Page,
    pub snapshot: Snapshot,
    pub transfer: Transfer,
    pub client: Client,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page {
    pub url: String,
    pub title: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub html: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transfer {
    pub encoding: TransferEncoding,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Client {
    #[serde(rename = "bookmarkletVersion")]
    pub bookmarklet_version: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

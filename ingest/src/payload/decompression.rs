use crate::payload::decoder::DecodeError;
use crate::payload::types::Compression;

/// Undo the LZ-string compression of a request body.
///
/// Base64 and URI-safe bodies are trimmed first, since clients and proxies
/// happily append a trailing newline. Raw and UTF-16 streams are taken as-is:
/// whitespace is a valid code unit there.
pub fn decompress_payload(text: &str, compression: Compression) -> Result<String, DecodeError> {
    let decompressed = match compression {
        Compression::LZRaw => lz_str::decompress(wide(text)),
        Compression::LZString => lz_str::decompress_from_base64(text.trim()),
        Compression::LZUtf16 => lz_str::decompress_from_utf16(text),
        Compression::LZUri => lz_str::decompress_from_encoded_uri_component(text.trim()),
        Compression::Identity | Compression::Unsupported => return Ok(text.to_owned()),
    };

    let decompressed = decompressed.ok_or(DecodeError::DecompressionFailed(compression))?;
    String::from_utf16(&decompressed).map_err(|_| DecodeError::DecompressionFailed(compression))
}

fn wide(text: &str) -> Vec<u16> {
    text.encode_utf16().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOCUMENT: &str = r#"{"page":{"url":"https://e.com","title":"Été"}}"#;

    #[test]
    fn test_decompress_base64() {
        let compressed = lz_str::compress_to_base64(wide(DOCUMENT));
        let decompressed = decompress_payload(&compressed, Compression::LZString).unwrap();
        assert_eq!(decompressed, DOCUMENT);
    }

    #[test]
    fn test_decompress_base64_with_trailing_newline() {
        let compressed = format!("{}\n", lz_str::compress_to_base64(wide(DOCUMENT)));
        let decompressed = decompress_payload(&compressed, Compression::LZString).unwrap();
        assert_eq!(decompressed, DOCUMENT);
    }

    #[test]
    fn test_decompress_utf16() {
        let compressed = lz_str::compress_to_utf16(wide(DOCUMENT));
        let decompressed = decompress_payload(&compressed, Compression::LZUtf16).unwrap();
        assert_eq!(decompressed, DOCUMENT);
    }

    #[test]
    fn test_decompress_uri() {
        let compressed = lz_str::compress_to_encoded_uri_component(wide(DOCUMENT));
        let decompressed = decompress_payload(&compressed, Compression::LZUri).unwrap();
        assert_eq!(decompressed, DOCUMENT);
    }

    #[test]
    fn test_decompress_uri_with_surrounding_whitespace() {
        let compressed = format!(
            "  {}\r\n",
            lz_str::compress_to_encoded_uri_component(wide(DOCUMENT))
        );
        let decompressed = decompress_payload(&compressed, Compression::LZUri).unwrap();
        assert_eq!(decompressed, DOCUMENT);
    }

    #[test]
    fn test_garbage_never_panics() {
        let bodies = ["", "=", "@@@@", "\u{0}\u{ffff}", "{\"page\":", "\u{d7ff}\u{e000}"];
        for body in bodies {
            for compression in [
                Compression::LZRaw,
                Compression::LZString,
                Compression::LZUtf16,
                Compression::LZUri,
            ] {
                drop(decompress_payload(body, compression));
            }
        }
    }

    #[test]
    fn test_identity_is_passthrough() {
        let decompressed = decompress_payload(DOCUMENT, Compression::Identity).unwrap();
        assert_eq!(decompressed, DOCUMENT);
    }
}

use std::io::{Read, Write};

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use thiserror::Error;

const BUFFER_SIZE: usize = 4096;
const QUALITY: u32 = 9;
const LG_WINDOW_SIZE: u32 = 22;

/// An error resulting from encoding or decoding a compressed bucket.
#[derive(Debug, Error)]
pub enum CodecError {
    /// The stored string is not valid URL-safe base64.
    #[error("Invalid base64 string: {0}")]
    Base64(#[from] base64::DecodeError),

    /// The compressor failed to accept the input.
    #[error("Failed to compress value: {0}")]
    Compress(#[source] std::io::Error),

    /// The compressed stream is corrupt or truncated.
    #[error("Failed to decompress stored value: {0}")]
    Decompress(#[source] std::io::Error),

    /// The decompressed bytes are not UTF-8.
    #[error("Invalid UTF-8 string: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}

/// Compresses `text` with brotli and encodes the result as URL-safe base64, which survives
/// storage areas that only accept string-safe values.
pub fn compress(text: &str) -> Result<String, CodecError> {
    let mut compressed = Vec::new();
    {
        let mut writer =
            brotli::CompressorWriter::new(&mut compressed, BUFFER_SIZE, QUALITY, LG_WINDOW_SIZE);
        writer
            .write_all(text.as_bytes())
            .map_err(CodecError::Compress)?;
    }
    Ok(URL_SAFE_NO_PAD.encode(compressed))
}

/// Inverse of [compress].
pub fn decompress(encoded: &str) -> Result<String, CodecError> {
    let compressed = URL_SAFE_NO_PAD.decode(encoded)?;

    let mut decompressed = Vec::new();
    brotli::Decompressor::new(compressed.as_slice(), BUFFER_SIZE)
        .read_to_end(&mut decompressed)
        .map_err(CodecError::Decompress)?;

    Ok(String::from_utf8(decompressed)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compressed_output_is_url_safe() {
        let text = r#"{"color":"red","sound":true,"size":30}"#.repeat(20);
        let encoded = compress(&text).unwrap();

        assert!(encoded
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'));
        assert!(encoded.len() < text.len());
        assert_eq!(decompress(&encoded).unwrap(), text);
    }

    #[test]
    fn rejects_invalid_base64() {
        let result = decompress("not base64 %%%");
        assert!(matches!(result, Err(CodecError::Base64(_))));
    }

    #[test]
    fn compress_errors_are_not_reported_as_decompress() {
        let error = CodecError::Compress(std::io::Error::other("sink closed"));
        let message = error.to_string();

        assert!(message.starts_with("Failed to compress value"));
        assert!(!message.contains("decompress"));
    }
}

use crate::domain::ports::PayloadCodec;
use crate::error::CodecError;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use flate2::Compression;
use flate2::read::ZlibDecoder;
use flate2::write::ZlibEncoder;
use std::io::{Read, Write};

/// Largest document a payload may inflate to. Challenge documents are a few
/// kilobytes; anything far beyond that is refused before it is parsed.
pub const MAX_DOCUMENT_BYTES: u64 = 256 * 1024;

/// zlib compression of the challenge documents exchanged with the issuer.
#[derive(Debug, Clone, Copy)]
pub struct DeflateCodec {
    level: Compression,
    max_document_bytes: u64,
}

impl Default for DeflateCodec {
    fn default() -> Self {
        Self {
            level: Compression::default(),
            max_document_bytes: MAX_DOCUMENT_BYTES,
        }
    }
}

impl DeflateCodec {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_level(level: u32) -> Self {
        Self {
            level: Compression::new(level),
            ..Self::default()
        }
    }

    pub fn with_max_document_bytes(mut self, limit: u64) -> Self {
        self.max_document_bytes = limit;
        self
    }
}

impl PayloadCodec for DeflateCodec {
    fn compress(&self, document: &str) -> Result<Vec<u8>, CodecError> {
        let mut encoder = ZlibEncoder::new(Vec::new(), self.level);
        encoder.write_all(document.as_bytes())?;
        Ok(encoder.finish()?)
    }

    fn decompress(&self, bytes: &[u8]) -> Result<String, CodecError> {
        let limit = self.max_document_bytes;
        let mut out = Vec::new();
        ZlibDecoder::new(bytes)
            .take(limit.saturating_add(1))
            .read_to_end(&mut out)?;
        if out.len() as u64 > limit {
            return Err(CodecError::TooLarge { limit });
        }
        Ok(String::from_utf8(out)?)
    }
}

/// XML, then compression, then base64: the form the browser carries.
pub fn encode_payload(codec: &dyn PayloadCodec, document: &str) -> Result<String, CodecError> {
    Ok(STANDARD.encode(codec.compress(document)?))
}

/// Reverse of [`encode_payload`]. Line breaks and spaces inserted by form
/// posting are ignored.
pub fn decode_payload(codec: &dyn PayloadCodec, payload: &str) -> Result<String, CodecError> {
    let compact: String = payload.chars().filter(|c| !c.is_whitespace()).collect();
    let bytes = STANDARD.decode(compact)?;
    codec.decompress(&bytes)
}

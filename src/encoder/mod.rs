//! Binary-safe conversion between blobs and data URL payloads.
//!
//! The substrate only stores strings, so file content is kept as
//! `data:<mime>;base64,<payload>`. Base64 keeps arbitrary bytes (NULs,
//! invalid UTF-8) intact regardless of what the MIME label claims.

mod blob;

pub use blob::{Blob, FileBlob, MemoryBlob};

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use bytes::Bytes;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EncodeError {
    #[error("Failed to read {name}: {source}")]
    Read {
        name: String,
        #[source]
        source: std::io::Error,
    },
}

/// Malformed payloads. Only input that `encode` never produces can trigger these.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("Payload is not a data URL")]
    MissingScheme,
    #[error("Data URL has no ',' separator")]
    MissingSeparator,
    #[error("Data URL is not base64 encoded")]
    NotBase64,
    #[error("Invalid base64 content: {0}")]
    Base64(#[from] base64::DecodeError),
}

#[derive(Debug, Clone, PartialEq)]
pub struct DecodedPayload {
    pub mime_type: String,
    pub data: Bytes,
}

/// Read the blob to the end and encode it as a data URL.
pub async fn encode(blob: &dyn Blob) -> Result<String, EncodeError> {
    let data = blob.read().await.map_err(|source| EncodeError::Read {
        name: blob.name().to_string(),
        source,
    })?;
    Ok(to_data_url(blob.mime_type(), &data))
}

pub fn to_data_url(mime_type: &str, data: &[u8]) -> String {
    format!("data:{mime_type};base64,{}", STANDARD.encode(data))
}

pub fn decode(payload: &str) -> Result<DecodedPayload, DecodeError> {
    let rest = payload
        .strip_prefix("data:")
        .ok_or(DecodeError::MissingScheme)?;
    // Base64 has no commas, so the last one ends the header
    let (header, body) = rest.rsplit_once(',').ok_or(DecodeError::MissingSeparator)?;
    let mime_type = header
        .strip_suffix(";base64")
        .ok_or(DecodeError::NotBase64)?;
    let data = STANDARD.decode(body)?;

    Ok(DecodedPayload {
        mime_type: mime_type.to_string(),
        data: Bytes::from(data),
    })
}

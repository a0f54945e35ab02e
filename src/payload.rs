//! Upload payloads and the transport decoder.
//!
//! Browsers hand uploads over as data URLs: `data:<media-type>;base64,<body>`. The
//! [`UploadPayload`] keeps that string untouched (it is what gets persisted); the decoder
//! turns it into raw bytes on demand.

use std::fs;
use std::path::Path;

use base64::Engine as _;
use base64::prelude::BASE64_STANDARD;
use sha2::{Digest, Sha256};

use crate::error::{IngestionError, IngestionResult};

/// A single uploaded file, as received from the browser.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadPayload {
    /// Client-side file name; used as the format hint.
    pub filename: String,
    /// Transport-encoded content (`"<metadata>,<base64-body>"`).
    pub contents: String,
}

impl UploadPayload {
    /// Create a payload from an already-encoded data URL.
    pub fn new(filename: impl Into<String>, contents: impl Into<String>) -> Self {
        Self {
            filename: filename.into(),
            contents: contents.into(),
        }
    }

    /// Encode raw bytes the way a browser upload widget does.
    pub fn from_bytes(filename: impl Into<String>, media_type: &str, bytes: &[u8]) -> Self {
        let contents = format!("data:{media_type};base64,{}", BASE64_STANDARD.encode(bytes));
        Self::new(filename, contents)
    }

    /// Read a local file and encode it as an upload (media type guessed from the name).
    pub fn from_path(path: impl AsRef<Path>) -> IngestionResult<Self> {
        let path = path.as_ref();
        let bytes = fs::read(path)?;
        let filename = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let media_type = guess_media_type(&filename);
        Ok(Self::from_bytes(filename, media_type, &bytes))
    }

    /// Decode the transport encoding. See [`decode_contents`].
    pub fn decode(&self) -> IngestionResult<DecodedPayload> {
        decode_contents(&self.contents)
    }

    /// Hex SHA-256 over filename and encoded contents.
    ///
    /// Two payloads with the same fingerprint always extract to the same table.
    pub fn fingerprint(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.filename.as_bytes());
        hasher.update([0u8]);
        hasher.update(self.contents.as_bytes());
        hex::encode(hasher.finalize())
    }
}

/// Raw bytes of an upload plus the media type announced in its metadata prefix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedPayload {
    /// Media type from the `data:` prefix, if any (e.g. `text/csv`).
    pub media_type: Option<String>,
    /// Decoded body.
    pub bytes: Vec<u8>,
}

/// Split `encoded` on its first `,` and base64-decode the body.
///
/// The metadata prefix is only inspected for a media type; a prefix that is not a `data:`
/// URL is tolerated.
pub fn decode_contents(encoded: &str) -> IngestionResult<DecodedPayload> {
    let (metadata, body) = encoded
        .split_once(',')
        .ok_or_else(|| IngestionError::MalformedPayload {
            message: "expected '<metadata>,<body>' but found no ','".to_string(),
        })?;

    let bytes = BASE64_STANDARD.decode(body.trim())?;
    Ok(DecodedPayload {
        media_type: media_type_of(metadata),
        bytes,
    })
}

fn media_type_of(metadata: &str) -> Option<String> {
    let rest = metadata.strip_prefix("data:")?;
    let media_type = rest.split(';').next().unwrap_or("").trim();
    if media_type.is_empty() {
        None
    } else {
        Some(media_type.to_string())
    }
}

fn guess_media_type(filename: &str) -> &'static str {
    let lower = filename.to_ascii_lowercase();
    if lower.ends_with(".csv") {
        "text/csv"
    } else if lower.ends_with(".pdf") {
        "application/pdf"
    } else if lower.ends_with(".xlsx") {
        "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"
    } else if lower.ends_with(".xls") {
        "application/vnd.ms-excel"
    } else {
        "application/octet-stream"
    }
}

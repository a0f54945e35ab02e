//! Document-text (PDF) ingestion implementation.
//!
//! A document has no tabular structure, so the whole text becomes a single cell: the result
//! is always a one-column (`"Content"`), one-row [`DataSet`].

use lopdf::Document;
use serde::{Deserialize, Serialize};

use crate::error::{IngestionError, IngestionResult};
use crate::types::{DataSet, DataType, Field, Schema, Value};

/// Name of the single column produced by document extraction.
pub const CONTENT_COLUMN: &str = "Content";

/// Encodings whose text the PDF reader cannot decode. It emits `?<name> Unimplemented?` in
/// place of the page text.
const UNDECODABLE_ENCODINGS: &[&str] = &["Identity-H"];

/// Bounds applied to document extraction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DocumentLimits {
    /// Documents larger than this many bytes are rejected.
    pub max_bytes: usize,
    /// Pages past this count are not extracted.
    pub max_pages: usize,
}

impl Default for DocumentLimits {
    fn default() -> Self {
        Self {
            max_bytes: 32 * 1024 * 1024,
            max_pages: 500,
        }
    }
}

/// Extract the text of every page (in page order) and concatenate it into one cell.
pub fn ingest_document_from_bytes(bytes: &[u8], limits: &DocumentLimits) -> IngestionResult<DataSet> {
    let text = extract_document_text(bytes, limits)?;
    let schema = Schema::new(vec![Field::new(CONTENT_COLUMN, DataType::Utf8)]);
    DataSet::try_new(schema, vec![vec![Value::Utf8(text)]])
}

/// Concatenated text of the document's pages, in page order.
pub fn extract_document_text(bytes: &[u8], limits: &DocumentLimits) -> IngestionResult<String> {
    if bytes.len() > limits.max_bytes {
        return Err(IngestionError::DocumentTooLarge {
            bytes: bytes.len(),
            limit: limits.max_bytes,
        });
    }

    let document = Document::load_mem(bytes)?;
    let pages = document.get_pages();
    if pages.len() > limits.max_pages {
        log::warn!(
            "document has {} pages; extracting the first {}",
            pages.len(),
            limits.max_pages
        );
    }

    // `get_pages` is keyed by 1-based page number, so iteration is already in page order.
    let mut text = String::new();
    for &page_number in pages.keys().take(limits.max_pages) {
        let page_text = document.extract_text(&[page_number])?;
        if let Some(encoding) = undecodable_encoding(&page_text) {
            return Err(IngestionError::UndecodableText {
                page: page_number,
                encoding: encoding.to_string(),
            });
        }
        text.push_str(&page_text);
    }
    Ok(text)
}

fn undecodable_encoding(page_text: &str) -> Option<&'static str> {
    UNDECODABLE_ENCODINGS
        .iter()
        .copied()
        .find(|enc| page_text.contains(&format!("?{enc} Unimplemented?")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn oversized_documents_are_rejected_before_parsing() {
        let limits = DocumentLimits {
            max_bytes: 4,
            ..Default::default()
        };
        let err = extract_document_text(b"%PDF-1.5 not really", &limits).unwrap_err();
        assert!(matches!(err, IngestionError::DocumentTooLarge { limit: 4, .. }));
    }

    #[test]
    fn unimplemented_markers_are_detected() {
        assert_eq!(undecodable_encoding("?Identity-H Unimplemented?\n"), Some("Identity-H"));
        assert_eq!(undecodable_encoding("Identity-H is a CMap name"), None);
    }

    #[test]
    fn garbage_bytes_are_an_error() {
        let err = extract_document_text(b"definitely not a pdf", &DocumentLimits::default());
        assert!(err.is_err());
    }
}

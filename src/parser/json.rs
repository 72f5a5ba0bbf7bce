//! Reader for documents already laid out by an external layout engine.
//!
//! The input is the serde representation of [`Document`], which carries
//! tables, pictures, captions and page images that the text-only PDF
//! parser cannot recover.

use std::fs;
use std::path::Path;

use super::{source_stem, DocumentParser};
use crate::error::Result;
use crate::model::Document;

/// Parser for serialized [`Document`] JSON files.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonDocumentParser;

impl JsonDocumentParser {
    /// Create a JSON document parser.
    pub fn new() -> Self {
        Self
    }

    /// Parse a document from a JSON string.
    pub fn parse_str(&self, json: &str) -> Result<Document> {
        Ok(serde_json::from_str(json)?)
    }
}

impl DocumentParser for JsonDocumentParser {
    fn name(&self) -> &str {
        "json"
    }

    fn parse(&self, path: &Path) -> Result<Document> {
        let json = fs::read_to_string(path)?;
        let mut doc = self.parse_str(&json)?;
        if doc.name.is_empty() {
            doc.name = source_stem(path);
        }
        if doc.metadata.page_count == 0 {
            doc.metadata.page_count = doc.page_count();
        }
        Ok(doc)
    }
}

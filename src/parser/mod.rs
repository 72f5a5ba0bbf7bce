//! Document parsers.
//!
//! A [`DocumentParser`] turns a source file into a [`Document`]. The
//! exporters only ever see the document, so any layout engine can be plugged
//! in behind this trait.

mod detect;
mod json;
mod pdf;

pub use detect::{is_pdf_bytes, pdf_version_from_bytes, pdf_version_from_path};
pub use json::JsonDocumentParser;
pub use pdf::{LopdfParser, ParseOptions};

use crate::error::Result;
use crate::model::Document;
use std::path::Path;

/// Trait for document parsers.
pub trait DocumentParser: Send + Sync {
    /// Short name of the parser, used in logs.
    fn name(&self) -> &str;

    /// Parse the file at `path`.
    fn parse(&self, path: &Path) -> Result<Document>;
}

/// Pick a parser from the file extension.
///
/// `.json` files are read as serialized documents, everything else as PDF.
pub fn parser_for_path(path: &Path) -> Box<dyn DocumentParser> {
    let is_json = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("json"));
    if is_json {
        Box::new(JsonDocumentParser::new())
    } else {
        Box::new(LopdfParser::new())
    }
}

/// File stem used to name every artifact derived from `path`.
pub fn source_stem(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "document".to_string())
}

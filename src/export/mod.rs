//! Format exporters turning a document into per-page content.
//!
//! Each output format is implemented by a [`FormatExporter`]. The
//! [`ExporterRegistry`] maps format names to exporters and is the lookup
//! the conversion orchestrator goes through.
//!
//! # Example
//!
//! ```
//! use pagewise::export::{ExporterRegistry, OutputFormat};
//! use pagewise::model::{DocItem, Document, Page, TextItem};
//! use std::path::Path;
//!
//! fn main() -> pagewise::Result<()> {
//!     let mut doc = Document::new("report");
//!     doc.add_page(Page::new(1));
//!     doc.add_item(DocItem::on_page(1, TextItem::paragraph("Hello")));
//!
//!     let registry = ExporterRegistry::with_defaults();
//!     let exporter = registry.get("txt")?;
//!     let pages = exporter.convert_to_format(&doc, Path::new("report.pdf"), Path::new("out"))?;
//!     assert_eq!(exporter.format(), OutputFormat::Txt);
//!     assert!(pages[&1].as_text().unwrap().contains("Hello"));
//!     Ok(())
//! }
//! ```

mod content;
mod csv;
mod html;
mod json;
mod markdown;
mod records;
mod text;
mod xml;
mod yaml;

pub use self::csv::CsvExporter;
pub use content::{CsvRow, PageContent, PageContents};
pub use html::{extract_body_content, HtmlExporter};
pub use json::JsonExporter;
pub use markdown::MarkdownExporter;
pub use records::{page_record, ItemRecord, PageRecord, TABLE_NOT_EXTRACTABLE};
pub use text::TextExporter;
pub use xml::XmlExporter;
pub use yaml::YamlExporter;

use crate::error::{Error, Result};
use crate::model::Document;
use std::collections::HashMap;
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;

/// Supported output formats, in the order conversions run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum OutputFormat {
    /// Markdown
    Markdown,
    /// HTML body fragments
    Html,
    /// Plain text
    Txt,
    /// JSON page records
    Json,
    /// YAML page records
    Yaml,
    /// CSV rows
    Csv,
    /// XML page elements
    Xml,
}

impl OutputFormat {
    /// Every format in conversion order.
    pub const ALL: [OutputFormat; 7] = [
        OutputFormat::Markdown,
        OutputFormat::Html,
        OutputFormat::Txt,
        OutputFormat::Json,
        OutputFormat::Yaml,
        OutputFormat::Csv,
        OutputFormat::Xml,
    ];

    /// Name used in artifact file names (`{stem}.{name}.json`).
    pub fn name(&self) -> &'static str {
        match self {
            OutputFormat::Markdown => "markdown",
            OutputFormat::Html => "html",
            OutputFormat::Txt => "txt",
            OutputFormat::Json => "json",
            OutputFormat::Yaml => "yaml",
            OutputFormat::Csv => "csv",
            OutputFormat::Xml => "xml",
        }
    }

    /// Extension of the consolidated file (`{stem}.{ext}`).
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Markdown => "md",
            other => other.name(),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for OutputFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let lower = s.trim().to_lowercase();
        match lower.as_str() {
            "md" => return Ok(OutputFormat::Markdown),
            "text" => return Ok(OutputFormat::Txt),
            "yml" => return Ok(OutputFormat::Yaml),
            _ => {}
        }
        OutputFormat::ALL
            .into_iter()
            .find(|f| f.name() == lower)
            .ok_or_else(|| Error::UnsupportedFormat(s.to_string()))
    }
}

/// Trait for format exporters.
///
/// Implement this trait to add or replace the exporter for a format.
pub trait FormatExporter: Send + Sync {
    /// The format this exporter produces.
    fn format(&self) -> OutputFormat;

    /// Convert every page of `doc`, in ascending page order, into one entry each.
    fn convert_to_format(
        &self,
        doc: &Document,
        source: &Path,
        output_dir: &Path,
    ) -> Result<PageContents>;

    /// Render a single human-oriented file aggregating all pages.
    ///
    /// Returns `None` when the format has no consolidated rendering.
    fn render_consolidated(
        &self,
        _contents: &PageContents,
        _stem: &str,
        _doc: &Document,
    ) -> Result<Option<String>> {
        Ok(None)
    }
}

/// Registry of format exporters keyed by format.
pub struct ExporterRegistry {
    exporters: HashMap<OutputFormat, Arc<dyn FormatExporter>>,
}

impl ExporterRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self {
            exporters: HashMap::new(),
        }
    }

    /// Create a registry with all seven built-in exporters.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(MarkdownExporter::new()));
        registry.register(Arc::new(HtmlExporter::new()));
        registry.register(Arc::new(TextExporter::new()));
        registry.register(Arc::new(JsonExporter::new()));
        registry.register(Arc::new(YamlExporter::new()));
        registry.register(Arc::new(CsvExporter::new()));
        registry.register(Arc::new(XmlExporter::new()));
        registry
    }

    /// Register an exporter, replacing any exporter for the same format.
    pub fn register(&mut self, exporter: Arc<dyn FormatExporter>) {
        self.exporters.insert(exporter.format(), exporter);
    }

    /// Get the exporter for a format name.
    pub fn get(&self, name: &str) -> Result<Arc<dyn FormatExporter>> {
        let format: OutputFormat = name.parse()?;
        self.get_format(format)
            .ok_or_else(|| Error::UnsupportedFormat(name.to_string()))
    }

    /// Get the exporter for a format.
    pub fn get_format(&self, format: OutputFormat) -> Option<Arc<dyn FormatExporter>> {
        self.exporters.get(&format).cloned()
    }

    /// Registered formats in conversion order.
    pub fn formats(&self) -> Vec<OutputFormat> {
        OutputFormat::ALL
            .into_iter()
            .filter(|f| self.exporters.contains_key(f))
            .collect()
    }
}

impl Default for ExporterRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_names_and_extensions() {
        let names: Vec<&str> = OutputFormat::ALL.iter().map(|f| f.name()).collect();
        assert_eq!(names, vec!["markdown", "html", "txt", "json", "yaml", "csv", "xml"]);
        assert_eq!(OutputFormat::Markdown.extension(), "md");
        assert_eq!(OutputFormat::Xml.extension(), "xml");
    }

    #[test]
    fn test_format_from_str() {
        assert_eq!("Markdown".parse::<OutputFormat>().unwrap(), OutputFormat::Markdown);
        assert_eq!("md".parse::<OutputFormat>().unwrap(), OutputFormat::Markdown);
        assert_eq!("text".parse::<OutputFormat>().unwrap(), OutputFormat::Txt);
        assert!(matches!(
            "docx".parse::<OutputFormat>(),
            Err(Error::UnsupportedFormat(_))
        ));
    }

    #[test]
    fn test_registry_with_defaults() {
        let registry = ExporterRegistry::with_defaults();
        assert_eq!(registry.formats(), OutputFormat::ALL.to_vec());
        assert_eq!(registry.get("csv").unwrap().format(), OutputFormat::Csv);
    }

    #[test]
    fn test_registry_unknown_format() {
        let registry = ExporterRegistry::with_defaults();
        assert!(matches!(registry.get("pdf"), Err(Error::UnsupportedFormat(_))));
    }

    #[test]
    fn test_empty_registry_reports_unsupported() {
        let registry = ExporterRegistry::new();
        assert!(registry.formats().is_empty());
        assert!(matches!(registry.get("markdown"), Err(Error::UnsupportedFormat(_))));
    }
}

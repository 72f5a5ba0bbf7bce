//! # pagewise
//!
//! Page-wise PDF export with an on-disk page cache.
//!
//! A parsed [`Document`] is exported to seven formats (Markdown, HTML, plain
//! text, JSON, YAML, CSV and XML). Each format is stored per page in a JSON
//! artifact, so single pages or ordered page lists can be fetched again
//! without re-running the conversion.
//!
//! ## Quick Start
//!
//! ```no_run
//! use pagewise::{OutputFormat, PageRequest, Pagewise};
//!
//! fn main() -> pagewise::Result<()> {
//!     let converter = Pagewise::new().open("report.pdf", "report_output")?;
//!     let summary = converter.convert_all();
//!     println!("{} formats converted", summary.converted.len());
//!
//!     let pages = PageRequest::parse("1,2,4")?;
//!     if let Some(text) = converter.get_pages_content(OutputFormat::Txt, &pages) {
//!         println!("{}", text);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - **Seven output formats** behind one [`FormatExporter`] trait
//! - **Page cache**: `{stem}.{format}.json` artifacts, written once per format
//! - **Random access**: one page or an ordered list of pages as plain text
//! - **Consolidated files**: one human-oriented file per format
//! - **Parallel processing**: formats of one document run on Rayon

pub mod convert;
pub mod error;
pub mod export;
pub mod model;
pub mod parser;
pub mod render;
pub mod store;

// Re-export commonly used types
pub use convert::{
    convert_pdf, ConversionSummary, ConvertOptions, ConvertStatus, FormatSelection, PageConverter,
};
pub use error::{Error, Result};
pub use export::{ExporterRegistry, FormatExporter, OutputFormat, PageContent, PageContents};
pub use model::{Document, Page};
pub use parser::{parser_for_path, DocumentParser, JsonDocumentParser, LopdfParser, ParseOptions};
pub use render::RenderOptions;
pub use store::{PageRequest, PageStore};

use std::path::Path;

/// Parse a file with the parser matching its extension.
///
/// # Example
///
/// ```no_run
/// use pagewise::parse_file;
///
/// let doc = parse_file("document.pdf").unwrap();
/// println!("Pages: {}", doc.page_count());
/// ```
pub fn parse_file<P: AsRef<Path>>(path: P) -> Result<Document> {
    let path = path.as_ref();
    parser_for_path(path).parse(path)
}

/// Convert a file to every format with default options.
///
/// # Example
///
/// ```no_run
/// use pagewise::convert_file;
///
/// let summary = convert_file("document.pdf", "document_output").unwrap();
/// assert!(summary.is_success());
/// ```
pub fn convert_file<P: AsRef<Path>, Q: AsRef<Path>>(
    path: P,
    output_dir: Q,
) -> Result<ConversionSummary> {
    Pagewise::new().convert(path, output_dir)
}

/// Builder for parsing and converting documents.
///
/// # Example
///
/// ```no_run
/// use pagewise::{OutputFormat, Pagewise};
///
/// let summary = Pagewise::new()
///     .sequential()
///     .with_images(true)
///     .with_format(OutputFormat::Markdown)
///     .convert("document.pdf", "out")?;
/// # Ok::<(), pagewise::Error>(())
/// ```
pub struct Pagewise {
    options: ConvertOptions,
    selection: FormatSelection,
    parser: Option<Box<dyn DocumentParser>>,
}

impl Pagewise {
    /// Create a new builder.
    pub fn new() -> Self {
        Self {
            options: ConvertOptions::default(),
            selection: FormatSelection::All,
            parser: None,
        }
    }

    /// Convert formats one after another.
    pub fn sequential(mut self) -> Self {
        self.options = self.options.sequential();
        self
    }

    /// Enable image export.
    pub fn with_images(mut self, export: bool) -> Self {
        self.options = self.options.with_images(export);
        self
    }

    /// Enable or disable consolidated files.
    pub fn with_consolidated(mut self, consolidated: bool) -> Self {
        self.options = self.options.with_consolidated(consolidated);
        self
    }

    /// Produce a single format instead of all of them.
    pub fn with_format(mut self, format: OutputFormat) -> Self {
        self.selection = FormatSelection::One(format);
        self
    }

    /// Set the format selection.
    pub fn with_selection(mut self, selection: FormatSelection) -> Self {
        self.selection = selection;
        self
    }

    /// Use a specific parser instead of picking one by extension.
    pub fn with_parser(mut self, parser: Box<dyn DocumentParser>) -> Self {
        self.parser = Some(parser);
        self
    }

    /// Parse `path` and return a converter writing into `output_dir`.
    pub fn open<P: AsRef<Path>, Q: AsRef<Path>>(
        self,
        path: P,
        output_dir: Q,
    ) -> Result<PageConverter> {
        let path = path.as_ref();
        let store = PageStore::open_dir(output_dir.as_ref())?;
        let parser = self.parser.unwrap_or_else(|| parser_for_path(path));
        let document = parser.parse(path)?;
        PageConverter::new(document, path, store, self.options)
    }

    /// Parse `path` and convert it into `output_dir`.
    pub fn convert<P: AsRef<Path>, Q: AsRef<Path>>(
        self,
        path: P,
        output_dir: Q,
    ) -> Result<ConversionSummary> {
        let path = path.as_ref();
        let by_extension;
        let parser: &dyn DocumentParser = match &self.parser {
            Some(parser) => parser.as_ref(),
            None => {
                by_extension = parser_for_path(path);
                by_extension.as_ref()
            }
        };
        convert_pdf(path, output_dir.as_ref(), self.selection, parser, &self.options)
    }
}

impl Default for Pagewise {
    fn default() -> Self {
        Self::new()
    }
}

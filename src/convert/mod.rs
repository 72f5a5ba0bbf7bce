//! Conversion orchestration.
//!
//! [`PageConverter`] drives the exporters for one document and caches their
//! output through the [`PageStore`](crate::store::PageStore). [`convert_pdf`]
//! is the one-call entry point: parse, convert, and optionally export images.
//!
//! # Example
//!
//! ```no_run
//! use pagewise::convert::{convert_pdf, ConvertOptions, FormatSelection};
//! use pagewise::parser::LopdfParser;
//! use std::path::Path;
//!
//! fn main() -> pagewise::Result<()> {
//!     let summary = convert_pdf(
//!         Path::new("report.pdf"),
//!         Path::new("report_output"),
//!         FormatSelection::All,
//!         &LopdfParser::new(),
//!         &ConvertOptions::default(),
//!     )?;
//!     println!("{} converted, {} cached", summary.converted.len(), summary.cached.len());
//!     Ok(())
//! }
//! ```

mod converter;
mod images;

pub use converter::PageConverter;
pub use images::IMAGES_DIR;

use crate::error::{Error, Result};
use crate::export::OutputFormat;
use crate::parser::DocumentParser;
use crate::store::PageStore;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Options for document conversion.
#[derive(Debug, Clone)]
pub struct ConvertOptions {
    /// Run the formats of one document in parallel
    pub parallel: bool,

    /// Also write one consolidated file per format (`{stem}.{ext}`)
    pub consolidated: bool,

    /// Export page, table and picture images
    pub export_images: bool,
}

impl ConvertOptions {
    /// Create new conversion options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable or disable parallel conversion.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Convert formats one after another.
    pub fn sequential(mut self) -> Self {
        self.parallel = false;
        self
    }

    /// Enable or disable consolidated files.
    pub fn with_consolidated(mut self, consolidated: bool) -> Self {
        self.consolidated = consolidated;
        self
    }

    /// Enable or disable image export.
    pub fn with_images(mut self, export_images: bool) -> Self {
        self.export_images = export_images;
        self
    }
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self {
            parallel: true,
            consolidated: true,
            export_images: false,
        }
    }
}

/// Outcome of converting one format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConvertStatus {
    /// The store already held the artifact
    Cached,
    /// The exporter ran and the artifact was written
    Converted,
}

/// Per-format outcomes of a conversion run.
#[derive(Debug, Default)]
pub struct ConversionSummary {
    /// Formats converted in this run
    pub converted: Vec<OutputFormat>,

    /// Formats skipped because they were cached
    pub cached: Vec<OutputFormat>,

    /// Formats that failed, with their error
    pub failed: Vec<(OutputFormat, Error)>,

    /// Images written by the run
    pub images: Vec<PathBuf>,
}

impl ConversionSummary {
    /// Record the outcome for one format.
    pub fn record(&mut self, format: OutputFormat, outcome: Result<ConvertStatus>) {
        match outcome {
            Ok(ConvertStatus::Converted) => self.converted.push(format),
            Ok(ConvertStatus::Cached) => self.cached.push(format),
            Err(e) => self.failed.push((format, e)),
        }
    }

    /// Whether no format failed.
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }

    /// Number of formats recorded.
    pub fn total(&self) -> usize {
        self.converted.len() + self.cached.len() + self.failed.len()
    }
}

/// Which formats to produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FormatSelection {
    /// Every supported format
    #[default]
    All,
    /// A single format
    One(OutputFormat),
}

impl FromStr for FormatSelection {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        if s.trim().eq_ignore_ascii_case("all") {
            Ok(FormatSelection::All)
        } else {
            s.parse().map(FormatSelection::One)
        }
    }
}

impl fmt::Display for FormatSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FormatSelection::All => f.write_str("all"),
            FormatSelection::One(format) => write!(f, "{}", format),
        }
    }
}

/// Parse `source` and convert it into `output_dir`.
///
/// With [`FormatSelection::All`] failures of single formats are reported in
/// the summary; a single selected format returns its error directly.
pub fn convert_pdf(
    source: &Path,
    output_dir: &Path,
    selection: FormatSelection,
    parser: &dyn DocumentParser,
    options: &ConvertOptions,
) -> Result<ConversionSummary> {
    let store = PageStore::open_dir(output_dir)?;
    log::info!("Parsing {} with {}", source.display(), parser.name());
    let document = parser.parse(source)?;
    let converter = PageConverter::new(document, source, store, options.clone())?;

    let mut summary = match selection {
        FormatSelection::All => converter.convert_all(),
        FormatSelection::One(format) => {
            let status = converter.convert_format(format)?;
            let mut summary = ConversionSummary::default();
            summary.record(format, Ok(status));
            summary
        }
    };

    if options.export_images {
        summary.images = converter.export_images();
    }
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_convert_options_builder() {
        let options = ConvertOptions::new()
            .sequential()
            .with_consolidated(false)
            .with_images(true);
        assert!(!options.parallel);
        assert!(!options.consolidated);
        assert!(options.export_images);

        let defaults = ConvertOptions::default();
        assert!(defaults.parallel && defaults.consolidated && !defaults.export_images);
    }

    #[test]
    fn test_format_selection_from_str() {
        assert_eq!("ALL".parse::<FormatSelection>().unwrap(), FormatSelection::All);
        assert_eq!(
            "csv".parse::<FormatSelection>().unwrap(),
            FormatSelection::One(OutputFormat::Csv)
        );
        assert!(matches!(
            "pdf".parse::<FormatSelection>(),
            Err(Error::UnsupportedFormat(_))
        ));
    }

    #[test]
    fn test_summary_record() {
        let mut summary = ConversionSummary::default();
        summary.record(OutputFormat::Html, Ok(ConvertStatus::Converted));
        summary.record(OutputFormat::Txt, Ok(ConvertStatus::Cached));
        summary.record(OutputFormat::Csv, Err(Error::Other("boom".into())));
        assert_eq!(summary.total(), 3);
        assert!(!summary.is_success());
    }
}

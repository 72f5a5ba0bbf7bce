//! Per-document conversion orchestrator.

use std::path::{Path, PathBuf};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use super::images::{export_images, IMAGES_DIR};
use super::{ConversionSummary, ConvertOptions, ConvertStatus};
use crate::error::{Error, Result};
use crate::export::{ExporterRegistry, OutputFormat};
use crate::model::Document;
use crate::parser::source_stem;
use crate::store::{PageRequest, PageStore};

/// Converts one parsed document into every output format, caching the
/// per-page results in a [`PageStore`].
///
/// A (document, format) pair is either pending or done. It is done once the
/// store holds its artifact, so converting twice does no exporter work.
pub struct PageConverter {
    document: Document,
    source: PathBuf,
    stem: String,
    store: PageStore,
    registry: ExporterRegistry,
    options: ConvertOptions,
}

impl PageConverter {
    /// Create a converter for `document`, parsed from `source`.
    ///
    /// Creates the `images/` directory under the store's output directory.
    pub fn new(
        document: Document,
        source: impl AsRef<Path>,
        store: PageStore,
        options: ConvertOptions,
    ) -> Result<Self> {
        let source = source.as_ref().to_path_buf();
        store.create_subdir(IMAGES_DIR)?;
        Ok(Self {
            stem: source_stem(&source),
            document,
            source,
            store,
            registry: ExporterRegistry::with_defaults(),
            options,
        })
    }

    /// Replace the exporter registry.
    pub fn with_registry(mut self, registry: ExporterRegistry) -> Self {
        self.registry = registry;
        self
    }

    /// Stem naming every artifact of this document.
    pub fn stem(&self) -> &str {
        &self.stem
    }

    /// The document being converted.
    pub fn document(&self) -> &Document {
        &self.document
    }

    /// The backing page store.
    pub fn store(&self) -> &PageStore {
        &self.store
    }

    /// Conversion options.
    pub fn options(&self) -> &ConvertOptions {
        &self.options
    }

    /// Convert to the format named `name`.
    pub fn convert_one(&self, name: &str) -> Result<ConvertStatus> {
        let format: OutputFormat = name.parse()?;
        self.convert_format(format)
    }

    /// Convert to `format` unless the store already holds it.
    pub fn convert_format(&self, format: OutputFormat) -> Result<ConvertStatus> {
        if self.store.exists(&self.stem, format) {
            log::info!(
                "Content for {} already exists for {}, skipping conversion",
                format,
                self.stem
            );
            return Ok(ConvertStatus::Cached);
        }

        let exporter = self
            .registry
            .get_format(format)
            .ok_or_else(|| Error::UnsupportedFormat(format.to_string()))?;

        let contents =
            exporter.convert_to_format(&self.document, &self.source, self.store.output_dir())?;
        if let Some(missing) = self.document.page_numbers().find(|p| !contents.contains_key(p)) {
            return Err(Error::Render(format!(
                "{} export produced no content for page {}",
                format, missing
            )));
        }
        self.store.save(&self.stem, format, &contents)?;

        if self.options.consolidated {
            if let Some(rendered) =
                exporter.render_consolidated(&contents, &self.stem, &self.document)?
            {
                let name = format!("{}.{}", self.stem, format.extension());
                let path = self.store.write_file(&name, rendered.as_bytes())?;
                log::debug!("Wrote {}", path.display());
            }
        }

        log::info!("Converted {} to {} ({} pages)", self.stem, format, contents.len());
        Ok(ConvertStatus::Converted)
    }

    /// Convert to every format in conversion order.
    ///
    /// A failing format is logged and recorded; the others still run.
    pub fn convert_all(&self) -> ConversionSummary {
        let run = |format: &OutputFormat| (*format, self.convert_format(*format));

        #[cfg(feature = "parallel")]
        let outcomes: Vec<_> = if self.options.parallel {
            OutputFormat::ALL.par_iter().map(run).collect()
        } else {
            OutputFormat::ALL.iter().map(run).collect()
        };
        #[cfg(not(feature = "parallel"))]
        let outcomes: Vec<_> = OutputFormat::ALL.iter().map(run).collect();

        let mut summary = ConversionSummary::default();
        for (format, outcome) in outcomes {
            if let Err(e) = &outcome {
                log::warn!("Conversion of {} to {} failed: {}", self.stem, format, e);
            }
            summary.record(format, outcome);
        }
        summary
    }

    /// Stored content of one page, verbatim.
    pub fn get_page_content(&self, format: OutputFormat, page: u32) -> Option<String> {
        self.store
            .get_plain_text(&self.stem, format, &PageRequest::Single(page))
    }

    /// Stored content of several pages, concatenated in request order.
    pub fn get_pages_content(&self, format: OutputFormat, request: &PageRequest) -> Option<String> {
        self.store.get_plain_text(&self.stem, format, request)
    }

    /// Export page, table and picture images. Never fails.
    pub fn export_images(&self) -> Vec<PathBuf> {
        export_images(&self.document, &self.stem, &self.store)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::{FormatExporter, PageContents};
    use crate::model::{DocItem, Page, TextItem};
    use crate::store::MemoryBackend;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn sample_doc() -> Document {
        let mut doc = Document::new("sample");
        doc.add_page(Page::new(1));
        doc.add_page(Page::new(2));
        doc.add_item(DocItem::on_page(1, TextItem::paragraph("one")));
        doc.add_item(DocItem::on_page(2, TextItem::paragraph("two")));
        doc
    }

    fn converter(options: ConvertOptions) -> (PageConverter, Arc<MemoryBackend>) {
        let backend = Arc::new(MemoryBackend::new());
        let store = PageStore::open("out", backend.clone()).unwrap();
        let converter = PageConverter::new(sample_doc(), "in/sample.pdf", store, options).unwrap();
        (converter, backend)
    }

    struct CountingExporter {
        calls: Arc<AtomicUsize>,
    }

    impl FormatExporter for CountingExporter {
        fn format(&self) -> OutputFormat {
            OutputFormat::Txt
        }

        fn convert_to_format(&self, doc: &Document, _: &Path, _: &Path) -> Result<PageContents> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(doc.page_numbers().map(|p| (p, format!("page {}", p).into())).collect())
        }
    }

    struct IncompleteExporter;

    impl FormatExporter for IncompleteExporter {
        fn format(&self) -> OutputFormat {
            OutputFormat::Yaml
        }

        fn convert_to_format(&self, _: &Document, _: &Path, _: &Path) -> Result<PageContents> {
            Ok(PageContents::new())
        }
    }

    #[test]
    fn test_new_creates_images_dir() {
        let (converter, backend) = converter(ConvertOptions::default());
        assert_eq!(converter.stem(), "sample");
        assert!(backend.has_dir(Path::new("out/images")));
    }

    #[test]
    fn test_second_conversion_is_cached() {
        let calls = Arc::new(AtomicUsize::new(0));
        let mut registry = ExporterRegistry::new();
        registry.register(Arc::new(CountingExporter {
            calls: calls.clone(),
        }));
        let (converter, _) = converter(ConvertOptions::default());
        let converter = converter.with_registry(registry);

        assert_eq!(converter.convert_one("txt").unwrap(), ConvertStatus::Converted);
        assert_eq!(converter.convert_one("txt").unwrap(), ConvertStatus::Cached);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(
            converter.get_page_content(OutputFormat::Txt, 2),
            Some("page 2".to_string())
        );
    }

    #[test]
    fn test_unknown_format() {
        let (converter, _) = converter(ConvertOptions::default());
        assert!(matches!(
            converter.convert_one("docx"),
            Err(Error::UnsupportedFormat(_))
        ));
    }

    #[test]
    fn test_incomplete_export_is_not_saved() {
        let mut registry = ExporterRegistry::new();
        registry.register(Arc::new(IncompleteExporter));
        let (converter, _) = converter(ConvertOptions::default());
        let converter = converter.with_registry(registry);

        assert!(matches!(
            converter.convert_format(OutputFormat::Yaml),
            Err(Error::Render(_))
        ));
        assert!(!converter.store().exists("sample", OutputFormat::Yaml));
    }

    #[test]
    fn test_convert_all_writes_every_format() {
        let (converter, backend) = converter(ConvertOptions::default().sequential());
        let summary = converter.convert_all();
        assert!(summary.is_success());
        assert_eq!(summary.converted, OutputFormat::ALL.to_vec());

        let files = backend.files();
        for format in OutputFormat::ALL {
            assert!(files.contains(&PathBuf::from(format!("out/sample.{}.json", format.name()))));
            assert!(files.contains(&PathBuf::from(format!("out/sample.{}", format.extension()))));
        }

        let again = converter.convert_all();
        assert_eq!(again.cached, OutputFormat::ALL.to_vec());
        assert!(again.converted.is_empty());
    }

    #[test]
    fn test_consolidated_can_be_disabled() {
        let (converter, backend) = converter(ConvertOptions::default().with_consolidated(false));
        converter.convert_format(OutputFormat::Markdown).unwrap();
        assert_eq!(backend.files(), vec![PathBuf::from("out/sample.markdown.json")]);
    }

    #[test]
    fn test_failures_are_isolated() {
        let mut registry = ExporterRegistry::with_defaults();
        registry.register(Arc::new(IncompleteExporter));
        let (converter, _) = converter(ConvertOptions::default());
        let converter = converter.with_registry(registry);

        let summary = converter.convert_all();
        assert!(!summary.is_success());
        assert_eq!(summary.failed.len(), 1);
        assert_eq!(summary.failed[0].0, OutputFormat::Yaml);
        assert_eq!(summary.converted.len(), 6);
        assert_eq!(
            converter.get_pages_content(OutputFormat::Markdown, &PageRequest::Many(vec![2, 1])),
            Some("twoone".to_string())
        );
    }
}

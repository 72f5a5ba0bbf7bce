//! Markdown exporter.

use std::path::Path;

use super::{FormatExporter, OutputFormat, PageContent, PageContents};
use crate::error::Result;
use crate::model::Document;
use crate::render::{page_markdown, RenderOptions};

/// Exports each page as the document's Markdown rendering of that page.
#[derive(Debug, Clone, Default)]
pub struct MarkdownExporter {
    options: RenderOptions,
}

impl MarkdownExporter {
    /// Create a Markdown exporter with default render options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a Markdown exporter with custom render options.
    pub fn with_options(options: RenderOptions) -> Self {
        Self { options }
    }
}

impl FormatExporter for MarkdownExporter {
    fn format(&self) -> OutputFormat {
        OutputFormat::Markdown
    }

    fn convert_to_format(
        &self,
        doc: &Document,
        _source: &Path,
        _output_dir: &Path,
    ) -> Result<PageContents> {
        Ok(doc
            .page_numbers()
            .map(|page_no| {
                let content = page_markdown(doc, page_no, &self.options);
                (page_no, PageContent::Text(content))
            })
            .collect())
    }

    fn render_consolidated(
        &self,
        contents: &PageContents,
        _stem: &str,
        _doc: &Document,
    ) -> Result<Option<String>> {
        let mut output = String::new();
        for (page_no, content) in contents {
            output.push_str(&format!("## Page {}\n\n", page_no));
            output.push_str(&content.to_text()?);
            output.push_str("\n\n");
        }
        Ok(Some(output))
    }
}

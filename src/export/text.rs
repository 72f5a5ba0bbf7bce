//! Plain text exporter.

use std::path::Path;

use super::{FormatExporter, OutputFormat, PageContent, PageContents};
use crate::error::Result;
use crate::model::{ContentItem, Document};

/// Exports each page as a banner followed by one block per item.
#[derive(Debug, Clone, Copy, Default)]
pub struct TextExporter;

impl TextExporter {
    /// Create a text exporter.
    pub fn new() -> Self {
        Self
    }

    fn page_text(&self, doc: &Document, page_no: u32) -> String {
        let mut sections = vec![format!("\n===Page {}===\n", page_no)];

        for (item, _) in doc.iterate_items(Some(page_no)) {
            match &item.content {
                ContentItem::Text(t) => sections.push(t.text.clone()),
                ContentItem::Table(table) => match table.to_frame() {
                    Ok(frame) => sections.push(frame.to_text()),
                    Err(e) => log::warn!("Skipping table on page {}: {}", page_no, e),
                },
                ContentItem::Picture(picture) => match picture.caption_text() {
                    Some(caption) => sections.push(format!("[Image: {}]", caption)),
                    None => sections.push("[Image]".to_string()),
                },
            }
        }

        sections.join("\n")
    }
}

impl FormatExporter for TextExporter {
    fn format(&self) -> OutputFormat {
        OutputFormat::Txt
    }

    fn convert_to_format(
        &self,
        doc: &Document,
        _source: &Path,
        _output_dir: &Path,
    ) -> Result<PageContents> {
        Ok(doc
            .page_numbers()
            .map(|page_no| (page_no, PageContent::Text(self.page_text(doc, page_no))))
            .collect())
    }

    fn render_consolidated(
        &self,
        contents: &PageContents,
        _stem: &str,
        _doc: &Document,
    ) -> Result<Option<String>> {
        let rule = "=".repeat(80);
        let mut sections = Vec::with_capacity(contents.len() * 2);
        for (page_no, content) in contents {
            sections.push(format!("\n{}\nPage {}\n{}\n", rule, page_no, rule));
            sections.push(content.to_text()?);
        }
        Ok(Some(sections.join("\n")))
    }
}

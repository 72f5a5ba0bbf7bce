//! XML exporter.

use std::path::Path;

use quick_xml::escape::escape;
use quick_xml::events::Event;
use quick_xml::Reader;

use super::{FormatExporter, OutputFormat, PageContent, PageContents};
use crate::error::Result;
use crate::model::{ContentItem, Document};

/// Exports each page as a `<page number="N">` element.
#[derive(Debug, Clone, Copy, Default)]
pub struct XmlExporter;

impl XmlExporter {
    /// Create an XML exporter.
    pub fn new() -> Self {
        Self
    }

    fn page_xml(&self, doc: &Document, page_no: u32) -> String {
        let mut children = String::new();

        for (item, _) in doc.iterate_items(Some(page_no)) {
            match &item.content {
                ContentItem::Text(t) => {
                    children.push_str(&format!("<text>{}</text>", escape(t.text.as_str())));
                }
                ContentItem::Table(table) => {
                    let dump = match table.to_frame() {
                        Ok(frame) => frame.to_text(),
                        Err(e) => {
                            log::warn!("Table on page {} not extractable: {}", page_no, e);
                            "[Table content not extractable]".to_string()
                        }
                    };
                    children.push_str(&format!("<table>{}</table>", escape(dump.as_str())));
                }
                ContentItem::Picture(picture) => match picture.caption_text() {
                    Some(caption) => {
                        children.push_str(&format!("<image caption=\"{}\" />", escape(caption)));
                    }
                    None => children.push_str("<image />"),
                },
            }
        }

        if children.is_empty() {
            format!("<page number=\"{}\" />", page_no)
        } else {
            format!("<page number=\"{}\">{}</page>", page_no, children)
        }
    }
}

impl FormatExporter for XmlExporter {
    fn format(&self) -> OutputFormat {
        OutputFormat::Xml
    }

    fn convert_to_format(
        &self,
        doc: &Document,
        _source: &Path,
        _output_dir: &Path,
    ) -> Result<PageContents> {
        Ok(doc
            .page_numbers()
            .map(|page_no| (page_no, PageContent::Text(self.page_xml(doc, page_no))))
            .collect())
    }

    fn render_consolidated(
        &self,
        contents: &PageContents,
        stem: &str,
        _doc: &Document,
    ) -> Result<Option<String>> {
        let mut output = format!(
            "<?xml version='1.0' encoding='utf-8'?>\n<document name=\"{}\">",
            escape(stem)
        );
        for content in contents.values() {
            let page = content.to_text()?;
            ensure_well_formed(&page)?;
            output.push_str(&page);
        }
        output.push_str("</document>");
        Ok(Some(output))
    }
}

fn ensure_well_formed(xml: &str) -> Result<()> {
    let mut reader = Reader::from_str(xml);
    loop {
        if let Event::Eof = reader.read_event()? {
            return Ok(());
        }
    }
}

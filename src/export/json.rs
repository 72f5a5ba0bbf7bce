//! JSON exporter.

use std::path::Path;

use super::records::{page_record, ConsolidatedDocument, ConsolidatedPage};
use super::{FormatExporter, OutputFormat, PageContent, PageContents};
use crate::error::Result;
use crate::model::Document;

/// Exports each page as a compact JSON page record.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonExporter;

impl JsonExporter {
    /// Create a JSON exporter.
    pub fn new() -> Self {
        Self
    }
}

impl FormatExporter for JsonExporter {
    fn format(&self) -> OutputFormat {
        OutputFormat::Json
    }

    fn convert_to_format(
        &self,
        doc: &Document,
        _source: &Path,
        _output_dir: &Path,
    ) -> Result<PageContents> {
        doc.page_numbers()
            .map(|page_no| {
                let json = serde_json::to_string(&page_record(doc, page_no))?;
                Ok((page_no, PageContent::Text(json)))
            })
            .collect()
    }

    fn render_consolidated(
        &self,
        contents: &PageContents,
        stem: &str,
        _doc: &Document,
    ) -> Result<Option<String>> {
        let mut pages = Vec::with_capacity(contents.len());
        for (page_no, content) in contents {
            let value: serde_json::Value = serde_json::from_str(&content.to_text()?)?;
            pages.push(ConsolidatedPage {
                page_number: *page_no,
                content: value,
            });
        }

        let document = ConsolidatedDocument {
            document_name: stem.to_string(),
            pages,
        };
        Ok(Some(serde_json::to_string_pretty(&document)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{DocItem, Page, TableItem, TextItem};

    #[test]
    fn test_duplicate_columns_are_suffixed() {
        let mut doc = Document::new("dup");
        doc.add_page(Page::new(1));
        doc.add_item(DocItem::on_page(
            1,
            TableItem::from_rows(vec![vec!["A", "A", "B"], vec!["1", "2", "3"]]),
        ));

        let pages = JsonExporter::new()
            .convert_to_format(&doc, Path::new("dup.pdf"), Path::new("."))
            .unwrap();
        let value: serde_json::Value = serde_json::from_str(pages[&1].as_text().unwrap()).unwrap();
        let table_data = value["items"][0]["table_data"].as_object().unwrap();
        let keys: Vec<&str> = table_data.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["A", "A_2", "B"]);
        assert_eq!(value["items"][0]["type"], "TableItem");
    }

    #[test]
    fn test_page_record_is_compact() {
        let mut doc = Document::new("c");
        doc.add_page(Page::new(1));
        doc.add_item(DocItem::on_page(1, TextItem::paragraph("Hi")));

        let pages = JsonExporter::new()
            .convert_to_format(&doc, Path::new("c.pdf"), Path::new("."))
            .unwrap();
        assert_eq!(
            pages[&1].as_text(),
            Some(r#"{"page_number":1,"items":[{"type":"TextItem","text":"Hi"}]}"#)
        );
    }

    #[test]
    fn test_consolidated_embeds_records() {
        let mut contents = PageContents::new();
        contents.insert(2, r#"{"page_number":2,"items":[]}"#.into());
        let out = JsonExporter::new()
            .render_consolidated(&contents, "doc", &Document::new("doc"))
            .unwrap()
            .unwrap();
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(value["document_name"], "doc");
        assert_eq!(value["pages"][0]["page_number"], 2);
        assert_eq!(value["pages"][0]["content"]["items"], serde_json::json!([]));
    }
}

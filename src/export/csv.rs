//! CSV exporter.

use std::path::Path;

use super::{CsvRow, FormatExporter, OutputFormat, PageContent, PageContents};
use crate::error::{Error, Result};
use crate::model::{ContentItem, Document};

const HEADER: [&str; 4] = ["page_number", "element_type", "content", "additional_info"];

/// Exports each page as one CSV row per content item.
#[derive(Debug, Clone, Copy, Default)]
pub struct CsvExporter;

impl CsvExporter {
    /// Create a CSV exporter.
    pub fn new() -> Self {
        Self
    }

    fn page_rows(&self, doc: &Document, page_no: u32) -> Vec<CsvRow> {
        doc.iterate_items(Some(page_no))
            .map(|(item, _)| {
                let element_type = item.content.type_name();
                match &item.content {
                    ContentItem::Text(t) => CsvRow::new(page_no, element_type, t.text.as_str(), ""),
                    ContentItem::Table(table) => match table.to_frame() {
                        Ok(frame) => CsvRow::new(page_no, element_type, "Table", frame.to_text()),
                        Err(e) => {
                            log::warn!("Table on page {} not extractable: {}", page_no, e);
                            CsvRow::new(page_no, element_type, "Table (not extractable)", "")
                        }
                    },
                    ContentItem::Picture(picture) => CsvRow::new(
                        page_no,
                        element_type,
                        "Image",
                        picture.caption_text().unwrap_or_default(),
                    ),
                }
            })
            .collect()
    }
}

impl FormatExporter for CsvExporter {
    fn format(&self) -> OutputFormat {
        OutputFormat::Csv
    }

    fn convert_to_format(
        &self,
        doc: &Document,
        _source: &Path,
        _output_dir: &Path,
    ) -> Result<PageContents> {
        Ok(doc
            .page_numbers()
            .map(|page_no| (page_no, PageContent::Rows(self.page_rows(doc, page_no))))
            .collect())
    }

    fn render_consolidated(
        &self,
        contents: &PageContents,
        _stem: &str,
        _doc: &Document,
    ) -> Result<Option<String>> {
        let mut writer = ::csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(Vec::new());
        writer.write_record(HEADER)?;

        for (page_no, content) in contents {
            match content {
                PageContent::Rows(rows) => {
                    for row in rows {
                        writer.serialize(row)?;
                    }
                }
                PageContent::Text(_) => {
                    log::warn!("Page {} has no CSV rows, skipping", page_no);
                }
            }
        }

        let bytes = writer
            .into_inner()
            .map_err(|e| Error::Other(format!("CSV flush error: {}", e)))?;
        let text = String::from_utf8(bytes).map_err(|e| Error::Other(e.to_string()))?;
        Ok(Some(text))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{DocItem, Page, PictureItem, TableCell, TableItem, TextItem};

    #[test]
    fn test_text_and_table_rows() {
        let mut doc = Document::new("csv");
        doc.add_page(Page::new(1));
        doc.add_item(DocItem::on_page(1, TextItem::paragraph("Hello")));
        doc.add_item(DocItem::on_page(
            1,
            TableItem::from_rows(vec![vec!["k", "v"], vec!["a", "1"]]),
        ));

        let pages = CsvExporter::new()
            .convert_to_format(&doc, Path::new("csv.pdf"), Path::new("."))
            .unwrap();
        let rows = pages[&1].as_rows().unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0], CsvRow::new(1, "TextItem", "Hello", ""));
        assert_eq!(rows[1].element_type, "TableItem");
        assert_eq!(rows[1].content, "Table");
        assert!(!rows[1].additional_info.is_empty());
    }

    #[test]
    fn test_picture_and_broken_table_rows() {
        let mut broken = TableItem::new(1, 1);
        broken.add_cell(TableCell::new(2, 2, "x"));
        let mut doc = Document::new("csv");
        doc.add_page(Page::new(1));
        doc.add_item(DocItem::on_page(1, broken));
        doc.add_item(DocItem::on_page(1, PictureItem::new(Some("Chart"))));

        let pages = CsvExporter::new()
            .convert_to_format(&doc, Path::new("csv.pdf"), Path::new("."))
            .unwrap();
        let rows = pages[&1].as_rows().unwrap();
        assert_eq!(rows[0], CsvRow::new(1, "TableItem", "Table (not extractable)", ""));
        assert_eq!(rows[1], CsvRow::new(1, "PictureItem", "Image", "Chart"));
    }

    #[test]
    fn test_table_with_overflowing_cell_degrades_to_placeholder() {
        let mut table = TableItem::new(2, 2);
        table.add_cell(TableCell::new(u32::MAX, 0, "far"));
        let mut doc = Document::new("csv");
        doc.add_page(Page::new(1));
        doc.add_item(DocItem::on_page(1, table));
        doc.add_item(DocItem::on_page(1, TextItem::paragraph("after")));

        let pages = CsvExporter::new()
            .convert_to_format(&doc, Path::new("csv.pdf"), Path::new("."))
            .unwrap();
        let rows = pages[&1].as_rows().unwrap();
        assert_eq!(rows[0], CsvRow::new(1, "TableItem", "Table (not extractable)", ""));
        assert_eq!(rows[1], CsvRow::new(1, "TextItem", "after", ""));
    }

    #[test]
    fn test_consolidated_has_header() {
        let mut contents = PageContents::new();
        contents.insert(1, vec![CsvRow::new(1, "TextItem", "one", "")].into());
        contents.insert(2, vec![CsvRow::new(2, "PictureItem", "Image", "")].into());

        let out = CsvExporter::new()
            .render_consolidated(&contents, "csv", &Document::new("csv"))
            .unwrap()
            .unwrap();
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(
            lines,
            vec![
                "page_number,element_type,content,additional_info",
                "1,TextItem,one,",
                "2,PictureItem,Image,",
            ]
        );
    }
}

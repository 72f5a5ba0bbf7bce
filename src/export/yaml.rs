//! YAML exporter.

use std::path::Path;

use super::records::{page_record, ConsolidatedDocument, ConsolidatedPage};
use super::{FormatExporter, OutputFormat, PageContent, PageContents};
use crate::error::Result;
use crate::model::Document;

/// Exports each page as a block-style YAML page record.
///
/// Keys keep their insertion order.
#[derive(Debug, Clone, Copy, Default)]
pub struct YamlExporter;

impl YamlExporter {
    /// Create a YAML exporter.
    pub fn new() -> Self {
        Self
    }
}

impl FormatExporter for YamlExporter {
    fn format(&self) -> OutputFormat {
        OutputFormat::Yaml
    }

    fn convert_to_format(
        &self,
        doc: &Document,
        _source: &Path,
        _output_dir: &Path,
    ) -> Result<PageContents> {
        doc.page_numbers()
            .map(|page_no| {
                let yaml = serde_yaml::to_string(&page_record(doc, page_no))?;
                Ok((page_no, PageContent::Text(yaml)))
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
            let value: serde_yaml::Value = serde_yaml::from_str(&content.to_text()?)?;
            pages.push(ConsolidatedPage {
                page_number: *page_no,
                content: value,
            });
        }

        let document = ConsolidatedDocument {
            document_name: stem.to_string(),
            pages,
        };
        Ok(Some(serde_yaml::to_string(&document)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::TABLE_NOT_EXTRACTABLE;
    use crate::model::{DocItem, Page, TableCell, TableItem, TextItem};

    #[test]
    fn test_keys_keep_insertion_order() {
        let mut doc = Document::new("y");
        doc.add_page(Page::new(1));
        doc.add_item(DocItem::on_page(1, TextItem::paragraph("Hello")));

        let pages = YamlExporter::new()
            .convert_to_format(&doc, Path::new("y.pdf"), Path::new("."))
            .unwrap();
        let yaml = pages[&1].as_text().unwrap();
        let page_pos = yaml.find("page_number: 1").unwrap();
        let items_pos = yaml.find("items:").unwrap();
        let type_pos = yaml.find("type: TextItem").unwrap();
        let text_pos = yaml.find("text: Hello").unwrap();
        assert!(page_pos < items_pos && items_pos < type_pos && type_pos < text_pos);
    }

    #[test]
    fn test_duplicate_columns_are_suffixed() {
        let mut doc = Document::new("y");
        doc.add_page(Page::new(1));
        doc.add_item(DocItem::on_page(
            1,
            TableItem::from_rows(vec![vec!["A", "A", "B"], vec!["1", "2", "3"]]),
        ));

        let pages = YamlExporter::new()
            .convert_to_format(&doc, Path::new("y.pdf"), Path::new("."))
            .unwrap();
        let value: serde_yaml::Value = serde_yaml::from_str(pages[&1].as_text().unwrap()).unwrap();
        let table_data = value["items"][0]["table_data"].as_mapping().unwrap();
        let keys: Vec<&str> = table_data.keys().filter_map(|k| k.as_str()).collect();
        assert_eq!(keys, vec!["A", "A_2", "B"]);
    }

    #[test]
    fn test_unextractable_table_placeholder() {
        let mut table = TableItem::new(1, 1);
        table.add_cell(TableCell::new(0, 4, "x"));
        let mut doc = Document::new("y");
        doc.add_page(Page::new(1));
        doc.add_item(DocItem::on_page(1, table));

        let pages = YamlExporter::new()
            .convert_to_format(&doc, Path::new("y.pdf"), Path::new("."))
            .unwrap();
        let value: serde_yaml::Value = serde_yaml::from_str(pages[&1].as_text().unwrap()).unwrap();
        assert_eq!(
            value["items"][0]["table_data"].as_str(),
            Some(TABLE_NOT_EXTRACTABLE)
        );
    }

    #[test]
    fn test_consolidated_parses_pages() {
        let mut contents = PageContents::new();
        contents.insert(1, "page_number: 1\nitems: []\n".into());
        let out = YamlExporter::new()
            .render_consolidated(&contents, "doc", &Document::new("doc"))
            .unwrap()
            .unwrap();
        let value: serde_yaml::Value = serde_yaml::from_str(&out).unwrap();
        assert_eq!(value["document_name"].as_str(), Some("doc"));
        assert_eq!(value["pages"][0]["content"]["page_number"].as_u64(), Some(1));
    }
}

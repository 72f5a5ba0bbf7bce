//! Per-page content produced by exporters and persisted by the store.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Page number to rendered page content, iterated in ascending page order.
pub type PageContents = BTreeMap<u32, PageContent>;

/// Rendered content of one page in one format.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PageContent {
    /// Text-shaped formats (Markdown, HTML, text, JSON, YAML, XML)
    Text(String),
    /// CSV rows, one per content item
    Rows(Vec<CsvRow>),
}

impl PageContent {
    /// Borrow the text of a text-shaped page.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            PageContent::Text(s) => Some(s),
            PageContent::Rows(_) => None,
        }
    }

    /// Borrow the rows of a CSV page.
    pub fn as_rows(&self) -> Option<&[CsvRow]> {
        match self {
            PageContent::Rows(rows) => Some(rows),
            PageContent::Text(_) => None,
        }
    }

    /// Render the content as plain text.
    ///
    /// Rows are written as CSV records without a header line.
    pub fn to_text(&self) -> Result<String> {
        match self {
            PageContent::Text(s) => Ok(s.clone()),
            PageContent::Rows(rows) => {
                let mut writer = csv::WriterBuilder::new()
                    .has_headers(false)
                    .from_writer(Vec::new());
                for row in rows {
                    writer.serialize(row)?;
                }
                let bytes = writer
                    .into_inner()
                    .map_err(|e| Error::Other(format!("CSV flush error: {}", e)))?;
                String::from_utf8(bytes).map_err(|e| Error::Other(e.to_string()))
            }
        }
    }
}

impl From<String> for PageContent {
    fn from(s: String) -> Self {
        PageContent::Text(s)
    }
}

impl From<&str> for PageContent {
    fn from(s: &str) -> Self {
        PageContent::Text(s.to_string())
    }
}

impl From<Vec<CsvRow>> for PageContent {
    fn from(rows: Vec<CsvRow>) -> Self {
        PageContent::Rows(rows)
    }
}

/// One CSV record describing a content item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CsvRow {
    /// Page the item sits on
    pub page_number: u32,
    /// Item type tag ("TextItem", "TableItem", "PictureItem")
    pub element_type: String,
    /// Text, or "Table" / "Image" markers
    pub content: String,
    /// Table dump or picture caption
    pub additional_info: String,
}

impl CsvRow {
    /// Create a row.
    pub fn new(
        page_number: u32,
        element_type: impl Into<String>,
        content: impl Into<String>,
        additional_info: impl Into<String>,
    ) -> Self {
        Self {
            page_number,
            element_type: element_type.into(),
            content: content.into(),
            additional_info: additional_info.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_untagged_serialization() {
        let text = PageContent::from("hello");
        assert_eq!(serde_json::to_string(&text).unwrap(), "\"hello\"");

        let rows = PageContent::from(vec![CsvRow::new(1, "TextItem", "hi", "")]);
        let json = serde_json::to_string(&rows).unwrap();
        assert!(json.starts_with("[{\"page_number\":1"));

        let back: PageContent = serde_json::from_str(&json).unwrap();
        assert_eq!(back, rows);
    }

    #[test]
    fn test_rows_to_text() {
        let rows = PageContent::from(vec![
            CsvRow::new(2, "TextItem", "a, b", ""),
            CsvRow::new(2, "PictureItem", "Image", "cap"),
        ]);
        let text = rows.to_text().unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines, vec!["2,TextItem,\"a, b\",", "2,PictureItem,Image,cap"]);
    }
}

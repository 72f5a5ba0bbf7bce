//! Structured page records shared by the JSON and YAML exporters.

use crate::model::{ContentItem, Document};
use serde::{Deserialize, Serialize};

/// Placeholder stored in `table_data` when a table cannot be exported.
pub const TABLE_NOT_EXTRACTABLE: &str = "Table content not extractable";

/// All items of one page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageRecord {
    /// Page number (1-indexed)
    pub page_number: u32,
    /// Items in reading order
    pub items: Vec<ItemRecord>,
}

/// One item of a page record, tagged by item type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ItemRecord {
    /// Text item
    #[serde(rename = "TextItem")]
    Text {
        /// Raw text
        text: String,
    },
    /// Table item
    #[serde(rename = "TableItem")]
    Table {
        /// Column name to values, or the not-extractable placeholder
        table_data: serde_json::Value,
    },
    /// Picture item
    #[serde(rename = "PictureItem")]
    Picture {
        /// Caption, if any
        caption: Option<String>,
    },
}

/// Build the record for one page.
pub fn page_record(doc: &Document, page_no: u32) -> PageRecord {
    let items = doc
        .iterate_items(Some(page_no))
        .map(|(item, _)| match &item.content {
            ContentItem::Text(t) => ItemRecord::Text {
                text: t.text.clone(),
            },
            ContentItem::Table(table) => {
                let table_data = match table.to_frame() {
                    Ok(frame) => serde_json::Value::Object(frame.to_column_map()),
                    Err(e) => {
                        log::warn!("Table on page {} not extractable: {}", page_no, e);
                        serde_json::Value::String(TABLE_NOT_EXTRACTABLE.to_string())
                    }
                };
                ItemRecord::Table { table_data }
            }
            ContentItem::Picture(picture) => ItemRecord::Picture {
                caption: picture.caption_text().map(str::to_string),
            },
        })
        .collect();

    PageRecord {
        page_number: page_no,
        items,
    }
}

/// Whole-document wrapper used by the consolidated JSON and YAML files.
#[derive(Debug, Serialize)]
pub(crate) struct ConsolidatedDocument<T: Serialize> {
    pub document_name: String,
    pub pages: Vec<ConsolidatedPage<T>>,
}

#[derive(Debug, Serialize)]
pub(crate) struct ConsolidatedPage<T: Serialize> {
    pub page_number: u32,
    pub content: T,
}

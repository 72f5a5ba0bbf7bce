//! Content items and the groups that nest them.

use super::TableItem;
use serde::{Deserialize, Serialize};

/// Where an item sits in the source document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Provenance {
    /// Page number (1-indexed)
    pub page_no: u32,
}

/// A content item together with its provenance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocItem {
    /// Provenance entries; the first one decides the item's page
    #[serde(default)]
    pub prov: Vec<Provenance>,

    /// The item itself
    pub content: ContentItem,
}

impl DocItem {
    /// Create an item located on a single page.
    pub fn on_page(page_no: u32, content: impl Into<ContentItem>) -> Self {
        Self {
            prov: vec![Provenance { page_no }],
            content: content.into(),
        }
    }

    /// Page of the first provenance entry, if any.
    pub fn page_no(&self) -> Option<u32> {
        self.prov.first().map(|p| p.page_no)
    }

    /// Text payload when this is a text item.
    pub fn as_text(&self) -> Option<&TextItem> {
        match &self.content {
            ContentItem::Text(t) => Some(t),
            _ => None,
        }
    }
}

/// One atomic unit of document content.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ContentItem {
    /// A run of text
    #[serde(rename = "TextItem")]
    Text(TextItem),

    /// A table
    #[serde(rename = "TableItem")]
    Table(TableItem),

    /// A picture
    #[serde(rename = "PictureItem")]
    Picture(PictureItem),
}

impl ContentItem {
    /// Type tag used in exported records ("TextItem", "TableItem", "PictureItem").
    pub fn type_name(&self) -> &'static str {
        match self {
            ContentItem::Text(_) => "TextItem",
            ContentItem::Table(_) => "TableItem",
            ContentItem::Picture(_) => "PictureItem",
        }
    }
}

impl From<TextItem> for ContentItem {
    fn from(item: TextItem) -> Self {
        ContentItem::Text(item)
    }
}

impl From<TableItem> for ContentItem {
    fn from(item: TableItem) -> Self {
        ContentItem::Table(item)
    }
}

impl From<PictureItem> for ContentItem {
    fn from(item: PictureItem) -> Self {
        ContentItem::Picture(item)
    }
}

/// A text item.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TextItem {
    /// Semantic role of the text
    #[serde(default)]
    pub label: TextLabel,

    /// The text content
    pub text: String,
}

impl TextItem {
    /// Create a text item with an explicit label.
    pub fn new(label: TextLabel, text: impl Into<String>) -> Self {
        Self {
            label,
            text: text.into(),
        }
    }

    /// Create a body paragraph.
    pub fn paragraph(text: impl Into<String>) -> Self {
        Self::new(TextLabel::Paragraph, text)
    }

    /// Create a section heading (level clamped to 1-6).
    pub fn heading(text: impl Into<String>, level: u8) -> Self {
        Self::new(TextLabel::SectionHeader(level.clamp(1, 6)), text)
    }

    /// Create a list item.
    pub fn list_item(text: impl Into<String>) -> Self {
        Self::new(TextLabel::ListItem, text)
    }
}

/// Semantic role of a text item.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TextLabel {
    /// Document title
    Title,
    /// Section heading with level 1-6
    SectionHeader(u8),
    /// Body text
    #[default]
    Paragraph,
    /// List entry
    ListItem,
    /// Caption of a table or figure
    Caption,
    /// Footnote
    Footnote,
}

/// A picture item.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PictureItem {
    /// Caption text
    #[serde(default)]
    pub caption: Option<String>,

    /// Rendered picture, when available
    #[serde(default)]
    pub image: Option<ImageData>,
}

impl PictureItem {
    /// Create a picture with an optional caption.
    pub fn new(caption: Option<&str>) -> Self {
        Self {
            caption: caption.map(str::to_string),
            image: None,
        }
    }

    /// Caption text, treating empty captions as absent.
    pub fn caption_text(&self) -> Option<&str> {
        self.caption.as_deref().filter(|c| !c.is_empty())
    }
}

/// Encoded image bytes produced by the parser.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageData {
    /// MIME type (e.g., "image/png")
    pub mime_type: String,

    /// Raw encoded bytes
    #[serde(default)]
    pub data: Vec<u8>,
}

impl ImageData {
    /// Create a PNG image.
    pub fn png(data: Vec<u8>) -> Self {
        Self {
            mime_type: "image/png".to_string(),
            data,
        }
    }

    /// Check if the image carries any bytes.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// A group of nodes such as a list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Group {
    /// Kind of group
    pub label: GroupLabel,

    /// Children in reading order
    #[serde(default)]
    pub children: Vec<super::Node>,
}

impl Group {
    /// Create an empty group.
    pub fn new(label: GroupLabel) -> Self {
        Self {
            label,
            children: Vec::new(),
        }
    }

    /// Append an item.
    pub fn push(&mut self, item: DocItem) {
        self.children.push(super::Node::Item(item));
    }

    /// Append a nested group.
    pub fn push_group(&mut self, group: Group) {
        self.children.push(super::Node::Group(group));
    }

    /// Check if this group renders as a list.
    pub fn is_list(&self) -> bool {
        matches!(self.label, GroupLabel::List | GroupLabel::OrderedList)
    }
}

/// Kind of group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupLabel {
    /// Unordered list
    List,
    /// Ordered list
    OrderedList,
    /// Logical section
    Section,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_names() {
        assert_eq!(ContentItem::from(TextItem::paragraph("x")).type_name(), "TextItem");
        assert_eq!(ContentItem::from(PictureItem::new(None)).type_name(), "PictureItem");
    }

    #[test]
    fn test_caption_text_ignores_empty() {
        assert_eq!(PictureItem::new(Some("")).caption_text(), None);
        assert_eq!(PictureItem::new(Some("Fig. 1")).caption_text(), Some("Fig. 1"));
    }

    #[test]
    fn test_heading_level_clamped() {
        let h = TextItem::heading("Deep", 9);
        assert_eq!(h.label, TextLabel::SectionHeader(6));
    }

    #[test]
    fn test_item_without_prov_has_no_page() {
        let item = DocItem {
            prov: Vec::new(),
            content: TextItem::paragraph("floating").into(),
        };
        assert_eq!(item.page_no(), None);
    }
}

//! Document-level types.

use super::{ContentItem, DocItem, Group, Page};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A parsed document as handed over by a [`DocumentParser`](crate::parser::DocumentParser).
///
/// Pages are keyed by their 1-indexed page number; content lives in `body`
/// as a tree of items and groups, each item carrying page provenance.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Document {
    /// Source name (file stem) the document was parsed from
    pub name: String,

    /// Document metadata (title, author, etc.)
    #[serde(default)]
    pub metadata: Metadata,

    /// Pages in the document, keyed by page number
    pub pages: BTreeMap<u32, Page>,

    /// Content tree in reading order
    #[serde(default)]
    pub body: Vec<Node>,
}

impl Document {
    /// Create a new empty document.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Get the number of pages in the document.
    pub fn page_count(&self) -> u32 {
        self.pages.len() as u32
    }

    /// Page numbers in ascending order.
    pub fn page_numbers(&self) -> impl Iterator<Item = u32> + '_ {
        self.pages.keys().copied()
    }

    /// Get a page by number (1-indexed).
    pub fn get_page(&self, page_no: u32) -> Option<&Page> {
        self.pages.get(&page_no)
    }

    /// Add a page, replacing any page with the same number.
    pub fn add_page(&mut self, page: Page) {
        self.pages.insert(page.number, page);
    }

    /// Append a content item to the top level of the body.
    pub fn add_item(&mut self, item: DocItem) {
        self.body.push(Node::Item(item));
    }

    /// Append a group to the top level of the body.
    pub fn add_group(&mut self, group: Group) {
        self.body.push(Node::Group(group));
    }

    /// Check if the document has any pages.
    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    /// Iterate over content items in reading order together with their parent group.
    ///
    /// When `page_no` is given, only items whose first provenance entry lies on
    /// that page are yielded. Groups themselves are never yielded.
    pub fn iterate_items(&self, page_no: Option<u32>) -> ItemIter<'_> {
        ItemIter {
            stack: vec![(self.body.iter(), None)],
            page_no,
        }
    }

    /// Get plain text content of a single page.
    pub fn page_text(&self, page_no: u32) -> String {
        self.iterate_items(Some(page_no))
            .filter_map(|(item, _)| match &item.content {
                ContentItem::Text(t) => Some(t.text.clone()),
                _ => None,
            })
            .collect::<Vec<_>>()
            .join("\n\n")
    }
}

/// A node in the document body.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "node", rename_all = "snake_case")]
pub enum Node {
    /// A content item
    Item(DocItem),
    /// A group of nodes (list, section)
    Group(Group),
}

/// Depth-first iterator returned by [`Document::iterate_items`].
pub struct ItemIter<'a> {
    stack: Vec<(std::slice::Iter<'a, Node>, Option<&'a Group>)>,
    page_no: Option<u32>,
}

impl<'a> Iterator for ItemIter<'a> {
    type Item = (&'a DocItem, Option<&'a Group>);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let (iter, parent) = self.stack.last_mut()?;
            let parent = *parent;
            match iter.next() {
                Some(Node::Item(item)) => {
                    if self.page_no.map_or(true, |p| item.page_no() == Some(p)) {
                        return Some((item, parent));
                    }
                }
                Some(Node::Group(group)) => {
                    self.stack.push((group.children.iter(), Some(group)));
                }
                None => {
                    self.stack.pop();
                }
            }
        }
    }
}

/// Document metadata.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Metadata {
    /// Document title
    pub title: Option<String>,

    /// Document author
    pub author: Option<String>,

    /// PDF version (e.g., "1.7")
    pub pdf_version: Option<String>,

    /// Total number of pages in the source file
    pub page_count: u32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{GroupLabel, TextItem};

    fn sample() -> Document {
        let mut doc = Document::new("sample");
        doc.add_page(Page::new(1));
        doc.add_page(Page::new(2));
        doc.add_item(DocItem::on_page(1, TextItem::paragraph("first")));

        let mut list = Group::new(GroupLabel::List);
        list.push(DocItem::on_page(1, TextItem::list_item("bullet")));
        list.push(DocItem::on_page(2, TextItem::list_item("next page bullet")));
        doc.add_group(list);

        doc.add_item(DocItem::on_page(2, TextItem::paragraph("second")));
        doc
    }

    #[test]
    fn test_document_new() {
        let doc = Document::new("empty");
        assert!(doc.is_empty());
        assert_eq!(doc.page_count(), 0);
        assert_eq!(doc.name, "empty");
    }

    #[test]
    fn test_iterate_items_in_reading_order() {
        let doc = sample();
        let texts: Vec<String> = doc
            .iterate_items(None)
            .filter_map(|(item, _)| item.as_text().map(|t| t.text.clone()))
            .collect();
        assert_eq!(texts, vec!["first", "bullet", "next page bullet", "second"]);
    }

    #[test]
    fn test_iterate_items_filters_by_page() {
        let doc = sample();
        let page2: Vec<_> = doc.iterate_items(Some(2)).collect();
        assert_eq!(page2.len(), 2);
        assert!(page2[0].1.is_some_and(|g| g.label == GroupLabel::List));
        assert!(page2[1].1.is_none());
    }

    #[test]
    fn test_page_numbers_ascending() {
        let mut doc = Document::new("order");
        doc.add_page(Page::new(3));
        doc.add_page(Page::new(1));
        doc.add_page(Page::new(2));
        assert_eq!(doc.page_numbers().collect::<Vec<_>>(), vec![1, 2, 3]);
    }

    #[test]
    fn test_page_text() {
        let doc = sample();
        assert_eq!(doc.page_text(2), "next page bullet\n\nsecond");
    }
}

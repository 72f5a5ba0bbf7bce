//! Markdown rendering of a single document page.

use crate::model::{ContentItem, DocItem, Document, Group, GroupLabel, Node, TableItem, TextLabel};

use super::RenderOptions;

/// Render the content of one page as Markdown.
pub fn page_markdown(doc: &Document, page_no: u32, options: &RenderOptions) -> String {
    let mut renderer = MarkdownRenderer::new(options.clone());
    renderer.render_page(doc, page_no)
}

/// Markdown renderer.
pub struct MarkdownRenderer {
    options: RenderOptions,
    page_no: u32,
    output: String,
}

impl MarkdownRenderer {
    /// Create a new Markdown renderer.
    pub fn new(options: RenderOptions) -> Self {
        Self {
            options,
            page_no: 0,
            output: String::new(),
        }
    }

    /// Render the items of `page_no` in reading order.
    pub fn render_page(&mut self, doc: &Document, page_no: u32) -> String {
        self.page_no = page_no;
        self.output.clear();
        self.render_nodes(&doc.body, None, 0);
        self.output.trim().to_string()
    }

    fn render_nodes(&mut self, nodes: &[Node], list: Option<&Group>, depth: usize) {
        let mut ordinal = 0;
        for node in nodes {
            match node {
                Node::Item(item) => {
                    if item.page_no() != Some(self.page_no) {
                        continue;
                    }
                    match list {
                        Some(group) if group.is_list() => {
                            ordinal += 1;
                            self.render_list_item(item, group.label, ordinal, depth);
                        }
                        _ => self.render_item(item),
                    }
                }
                Node::Group(group) => {
                    if group.is_list() {
                        let nested = if list.is_some_and(Group::is_list) {
                            depth + 1
                        } else {
                            depth
                        };
                        self.render_nodes(&group.children, Some(group), nested);
                        if nested == 0 {
                            self.end_block();
                        }
                    } else {
                        self.render_nodes(&group.children, None, 0);
                    }
                }
            }
        }
    }

    fn render_item(&mut self, item: &DocItem) {
        match &item.content {
            ContentItem::Text(text) => {
                if text.text.trim().is_empty() {
                    return;
                }
                let escaped = self.escape(&text.text);
                match text.label {
                    TextLabel::Title => self.output.push_str(&format!("# {}", escaped)),
                    TextLabel::SectionHeader(level) => {
                        let level = level.min(self.options.max_heading_level).max(1);
                        self.output
                            .push_str(&format!("{} {}", "#".repeat(level as usize), escaped));
                    }
                    TextLabel::Caption | TextLabel::Footnote => {
                        self.output.push_str(&format!("*{}*", escaped))
                    }
                    TextLabel::Paragraph | TextLabel::ListItem => self.output.push_str(&escaped),
                }
                self.end_block();
            }
            ContentItem::Table(table) => self.render_table(table),
            ContentItem::Picture(picture) => {
                self.output.push_str(&self.options.image_placeholder);
                if let Some(caption) = picture.caption_text() {
                    self.output.push('\n');
                    self.output.push_str(&self.escape(caption));
                }
                self.end_block();
            }
        }
    }

    fn render_list_item(&mut self, item: &DocItem, label: GroupLabel, ordinal: u32, depth: usize) {
        let text = match &item.content {
            ContentItem::Text(t) => self.escape(&t.text),
            _ => {
                // Non-text items inside a list are rendered as standalone blocks.
                self.render_item(item);
                return;
            }
        };

        let marker = match label {
            GroupLabel::OrderedList => format!("{}.", ordinal),
            _ => self.options.list_marker.to_string(),
        };

        self.output.push_str(&"  ".repeat(depth));
        self.output.push_str(&marker);
        self.output.push(' ');
        self.output.push_str(&text);
        self.output.push('\n');
    }

    fn render_table(&mut self, table: &TableItem) {
        let frame = match table.to_frame() {
            Ok(frame) => frame,
            Err(e) => {
                log::warn!("Skipping table on page {}: {}", self.page_no, e);
                return;
            }
        };
        if frame.is_empty() {
            return;
        }

        let header = self.table_row(&frame.columns);
        self.output.push_str(&header);
        self.output.push('\n');
        self.output.push('|');
        for _ in &frame.columns {
            self.output.push_str(" --- |");
        }
        self.output.push('\n');
        for row in &frame.rows {
            let line = self.table_row(row);
            self.output.push_str(&line);
            self.output.push('\n');
        }
        if let Some(caption) = table.caption.as_deref().filter(|c| !c.is_empty()) {
            self.output.push('\n');
            self.output.push_str(&self.escape(caption));
        }
        self.end_block();
    }

    /// A table row; pipes inside cells are always escaped.
    fn table_row(&self, cells: &[String]) -> String {
        let mut line = String::from("|");
        for cell in cells {
            let text = self.escape(cell.replace('\n', " ").trim());
            let text = if self.options.escape_special_chars {
                text
            } else {
                text.replace('|', "\\|")
            };
            line.push_str(&format!(" {} |", text));
        }
        line
    }

    fn end_block(&mut self) {
        while !self.output.is_empty() && !self.output.ends_with("\n\n") {
            self.output.push('\n');
        }
    }

    fn escape(&self, text: &str) -> String {
        if self.options.escape_special_chars {
            escape_markdown(text)
        } else {
            text.to_string()
        }
    }
}

/// Escape special Markdown characters.
/// Only escape characters that could be misinterpreted as Markdown syntax.
fn escape_markdown(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '\\' | '`' | '*' | '_' | '[' | ']' | '|' => {
                result.push('\\');
                result.push(c);
            }
            _ => result.push(c),
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Page, PictureItem, TextItem};

    fn doc_with(items: Vec<Node>) -> Document {
        let mut doc = Document::new("md");
        doc.add_page(Page::new(1));
        doc.add_page(Page::new(2));
        doc.body = items;
        doc
    }

    #[test]
    fn test_escape_markdown() {
        assert_eq!(escape_markdown("Hello *world*"), "Hello \\*world\\*");
        assert_eq!(escape_markdown("[link]"), "\\[link\\]");
    }

    #[test]
    fn test_render_heading_and_paragraph() {
        let doc = doc_with(vec![
            Node::Item(DocItem::on_page(1, TextItem::heading("Chapter 1", 2))),
            Node::Item(DocItem::on_page(1, TextItem::paragraph("Hello, world!"))),
        ]);
        let md = page_markdown(&doc, 1, &RenderOptions::default());
        assert_eq!(md, "## Chapter 1\n\nHello, world!");
    }

    #[test]
    fn test_render_restricted_to_page() {
        let doc = doc_with(vec![
            Node::Item(DocItem::on_page(1, TextItem::paragraph("one"))),
            Node::Item(DocItem::on_page(2, TextItem::paragraph("two"))),
        ]);
        assert_eq!(page_markdown(&doc, 2, &RenderOptions::default()), "two");
    }

    #[test]
    fn test_render_nested_lists() {
        let mut inner = Group::new(GroupLabel::OrderedList);
        inner.push(DocItem::on_page(1, TextItem::list_item("a")));
        inner.push(DocItem::on_page(1, TextItem::list_item("b")));
        let mut outer = Group::new(GroupLabel::List);
        outer.push(DocItem::on_page(1, TextItem::list_item("top")));
        outer.push_group(inner);

        let doc = doc_with(vec![Node::Group(outer)]);
        let md = page_markdown(&doc, 1, &RenderOptions::default());
        assert_eq!(md, "- top\n  1. a\n  2. b");
    }

    #[test]
    fn test_render_table_and_picture() {
        let doc = doc_with(vec![
            Node::Item(DocItem::on_page(
                1,
                TableItem::from_rows([["A", "B"], ["1", "2"]]),
            )),
            Node::Item(DocItem::on_page(1, PictureItem::new(Some("Figure 1")))),
        ]);
        let md = page_markdown(&doc, 1, &RenderOptions::default());
        assert!(md.contains("| A | B |\n| --- | --- |\n| 1 | 2 |"));
        assert!(md.ends_with("<!-- image -->\nFigure 1"));
    }

    #[test]
    fn test_table_cells_escape_pipes() {
        let doc = doc_with(vec![Node::Item(DocItem::on_page(
            1,
            TableItem::from_rows([["Op", "Meaning"], ["a|b", "or"]]),
        ))]);
        let md = page_markdown(&doc, 1, &RenderOptions::default());
        assert!(md.contains("| a\\|b | or |"));

        let plain = page_markdown(&doc, 1, &RenderOptions::default().with_escaping(false));
        assert!(plain.contains("| a\\|b | or |"));
    }
}

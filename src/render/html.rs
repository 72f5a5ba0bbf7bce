//! HTML rendering of a single document page.
//!
//! The output is a complete XHTML document (`<html>`, `<head>`, `<body>`)
//! so that callers can re-parse it as XML. Lists whose items all sit on
//! other pages still render as empty list elements.

use quick_xml::escape::escape;

use crate::model::{ContentItem, DocItem, Document, GroupLabel, Node, TableItem, TextLabel};

use super::RenderOptions;

/// Render the content of one page as a full HTML document.
pub fn page_html(doc: &Document, page_no: u32, options: &RenderOptions) -> String {
    let mut body = String::new();
    render_nodes(&mut body, &doc.body, page_no, options);

    let title = if doc.name.is_empty() {
        "Document".to_string()
    } else {
        escape(doc.name.as_str()).into_owned()
    };

    format!(
        "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"UTF-8\"/>\n<title>{}</title>\n</head>\n<body>\n{}</body>\n</html>\n",
        title, body
    )
}

fn render_nodes(out: &mut String, nodes: &[Node], page_no: u32, options: &RenderOptions) {
    for node in nodes {
        match node {
            Node::Item(item) if item.page_no() == Some(page_no) => render_item(out, item, options),
            Node::Item(_) => {}
            Node::Group(group) => {
                let tag = match group.label {
                    GroupLabel::List => Some("ul"),
                    GroupLabel::OrderedList => Some("ol"),
                    GroupLabel::Section => None,
                };
                match tag {
                    Some(tag) => {
                        out.push_str(&format!("<{}>", tag));
                        render_nodes(out, &group.children, page_no, options);
                        out.push_str(&format!("</{}>\n", tag));
                    }
                    None => render_nodes(out, &group.children, page_no, options),
                }
            }
        }
    }
}

fn render_item(out: &mut String, item: &DocItem, options: &RenderOptions) {
    match &item.content {
        ContentItem::Text(text) => {
            let escaped = escape(text.text.as_str());
            match text.label {
                TextLabel::Title => out.push_str(&format!("<h1>{}</h1>\n", escaped)),
                TextLabel::SectionHeader(level) => {
                    let level = level.min(options.max_heading_level).max(1);
                    out.push_str(&format!("<h{0}>{1}</h{0}>\n", level, escaped));
                }
                TextLabel::ListItem => out.push_str(&format!("<li>{}</li>", escaped)),
                TextLabel::Caption => {
                    out.push_str(&format!("<p class=\"caption\">{}</p>\n", escaped))
                }
                TextLabel::Footnote => {
                    out.push_str(&format!("<p class=\"footnote\">{}</p>\n", escaped))
                }
                TextLabel::Paragraph => out.push_str(&format!("<p>{}</p>\n", escaped)),
            }
        }
        ContentItem::Table(table) => render_table(out, table, item.page_no().unwrap_or(0)),
        ContentItem::Picture(picture) => match picture.caption_text() {
            Some(caption) => out.push_str(&format!(
                "<figure><figcaption>{}</figcaption></figure>\n",
                escape(caption)
            )),
            None => out.push_str("<figure></figure>\n"),
        },
    }
}

fn render_table(out: &mut String, table: &TableItem, page_no: u32) {
    let frame = match table.to_frame() {
        Ok(frame) => frame,
        Err(e) => {
            log::warn!("Skipping table on page {}: {}", page_no, e);
            return;
        }
    };

    out.push_str("<table>");
    if let Some(caption) = table.caption.as_deref().filter(|c| !c.is_empty()) {
        out.push_str(&format!("<caption>{}</caption>", escape(caption)));
    }
    out.push_str("<thead><tr>");
    for column in &frame.columns {
        out.push_str(&format!("<th>{}</th>", escape(column.as_str())));
    }
    out.push_str("</tr></thead><tbody>");
    for row in &frame.rows {
        out.push_str("<tr>");
        for cell in row {
            out.push_str(&format!("<td>{}</td>", escape(cell.as_str())));
        }
        out.push_str("</tr>");
    }
    out.push_str("</tbody></table>\n");
}

//! HTML exporter.
//!
//! Pages keep only the inner markup of `<body>`, with empty nested lists
//! pruned. The page HTML is parsed as XML; anything that fails to parse is
//! kept verbatim.

use std::path::Path;

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use super::{FormatExporter, OutputFormat, PageContent, PageContents};
use crate::error::{Error, Result};
use crate::model::Document;
use crate::render::{page_html, RenderOptions};

const CONSOLIDATED_HEAD: &[&str] = &[
    "<!DOCTYPE html>",
    "<html>",
    "<head>",
    "<title>PDF Conversion</title>",
    "<style>",
    "body { max-width: 800px; margin: 0 auto; padding: 20px; font-family: Arial, sans-serif; box-sizing: border-box; }",
    "img { max-width: 100%; height: auto; }",
    ".page { margin-bottom: 40px; padding: 20px; border: 1px solid #ddd; box-sizing: border-box; }",
    "h2 { color: #333; }",
    ".page ul {",
    "    max-width: 100%;",
    "    box-sizing: border-box;",
    "    padding-left: 1px;",
    "}",
    ".page li {",
    "    word-wrap: break-word;",
    "    overflow-wrap: break-word;",
    "}",
    "</style>",
    "</head>",
    "<body>",
];

/// Exports each page as the inner markup of its HTML body.
#[derive(Debug, Clone, Default)]
pub struct HtmlExporter {
    options: RenderOptions,
}

impl HtmlExporter {
    /// Create an HTML exporter with default render options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an HTML exporter with custom render options.
    pub fn with_options(options: RenderOptions) -> Self {
        Self { options }
    }
}

impl FormatExporter for HtmlExporter {
    fn format(&self) -> OutputFormat {
        OutputFormat::Html
    }

    fn convert_to_format(
        &self,
        doc: &Document,
        _source: &Path,
        _output_dir: &Path,
    ) -> Result<PageContents> {
        Ok(doc
            .page_numbers()
            .map(|page_no| {
                let full = page_html(doc, page_no, &self.options);
                (page_no, PageContent::Text(extract_body_content(&full)))
            })
            .collect())
    }

    fn render_consolidated(
        &self,
        contents: &PageContents,
        _stem: &str,
        _doc: &Document,
    ) -> Result<Option<String>> {
        let mut lines: Vec<String> = CONSOLIDATED_HEAD.iter().map(|l| l.to_string()).collect();
        for (page_no, content) in contents {
            lines.push("<div class=\"page\">".to_string());
            lines.push(format!("<h2>Page {}</h2>", page_no));
            lines.push(content.to_text()?);
            lines.push("</div>".to_string());
        }
        lines.push("</body>".to_string());
        lines.push("</html>".to_string());
        Ok(Some(lines.join("\n")))
    }
}

/// Extract the inner markup of `<body>` and prune empty nested lists.
///
/// Markup without an `<html>` root is treated as body content. Returns the
/// input unchanged when it does not parse or an `<html>` root has no body.
pub fn extract_body_content(full_html: &str) -> String {
    let roots = match parse_nodes(full_html) {
        Ok(roots) => roots,
        Err(e) => {
            log::debug!("Keeping unparsed page HTML: {}", e);
            return full_html.to_string();
        }
    };

    let html_root = roots.iter().find_map(|node| match node {
        HtmlNode::Element(e) if e.name.eq_ignore_ascii_case("html") => Some(e),
        _ => None,
    });

    let mut content = match html_root {
        Some(html) => {
            let body = html.children.iter().find_map(|node| match node {
                HtmlNode::Element(e) if e.name.eq_ignore_ascii_case("body") => Some(e),
                _ => None,
            });
            match body {
                Some(body) => body.children.clone(),
                None => return full_html.to_string(),
            }
        }
        None => roots,
    };

    prune_empty_lists(&mut content);

    let mut output = String::new();
    write_nodes(&mut output, &content);
    output.trim().to_string()
}

#[derive(Debug, Clone)]
enum HtmlNode {
    Element(Element),
    /// Escaped text, kept as written
    Text(String),
    /// Comments and CDATA sections
    Raw(String),
}

#[derive(Debug, Clone)]
struct Element {
    name: String,
    attrs: String,
    children: Vec<HtmlNode>,
    self_closing: bool,
}

impl Element {
    fn from_start(start: &BytesStart<'_>, self_closing: bool) -> Self {
        let attrs = String::from_utf8_lossy(start.attributes_raw());
        Self {
            name: String::from_utf8_lossy(start.name().as_ref()).into_owned(),
            attrs: attrs.trim().trim_end_matches('/').trim_end().to_string(),
            children: Vec::new(),
            self_closing,
        }
    }

    fn is_list(&self) -> bool {
        matches!(self.name.to_ascii_lowercase().as_str(), "ul" | "ol")
    }

    fn is_list_element(&self) -> bool {
        self.is_list() || self.name.eq_ignore_ascii_case("li")
    }

    /// A list element with no text and only empty list elements below it.
    fn is_empty_list_element(&self) -> bool {
        self.is_list_element()
            && self.children.iter().all(|child| match child {
                HtmlNode::Text(text) => text.trim().is_empty(),
                HtmlNode::Element(e) => e.is_empty_list_element(),
                HtmlNode::Raw(_) => false,
            })
    }
}

fn parse_nodes(html: &str) -> Result<Vec<HtmlNode>> {
    let mut reader = Reader::from_str(html);
    let mut stack: Vec<Element> = Vec::new();
    let mut roots = Vec::new();

    loop {
        let node = match reader.read_event()? {
            Event::Start(e) => {
                stack.push(Element::from_start(&e, false));
                continue;
            }
            Event::Empty(e) => HtmlNode::Element(Element::from_start(&e, true)),
            Event::End(_) => {
                let element = stack
                    .pop()
                    .ok_or_else(|| Error::Xml("unexpected closing tag".to_string()))?;
                HtmlNode::Element(element)
            }
            Event::Text(e) => HtmlNode::Text(String::from_utf8_lossy(e.as_ref()).into_owned()),
            Event::GeneralRef(e) => {
                HtmlNode::Text(format!("&{};", String::from_utf8_lossy(e.as_ref())))
            }
            Event::CData(e) => HtmlNode::Raw(format!(
                "<![CDATA[{}]]>",
                String::from_utf8_lossy(e.as_ref())
            )),
            Event::Comment(e) => {
                HtmlNode::Raw(format!("<!--{}-->", String::from_utf8_lossy(e.as_ref())))
            }
            Event::Eof => break,
            _ => continue,
        };

        match stack.last_mut() {
            Some(parent) => push_node(&mut parent.children, node),
            None => push_node(&mut roots, node),
        }
    }

    if let Some(open) = stack.last() {
        return Err(Error::Xml(format!("unclosed element <{}>", open.name)));
    }
    Ok(roots)
}

/// Append `node`, merging text split around entity references.
fn push_node(nodes: &mut Vec<HtmlNode>, node: HtmlNode) {
    if let (Some(HtmlNode::Text(last)), HtmlNode::Text(text)) = (nodes.last_mut(), &node) {
        last.push_str(text);
        return;
    }
    nodes.push(node);
}

/// Remove empty `<ul>`/`<ol>` elements, deepest first.
///
/// A list followed by non-blank tail text is kept.
fn prune_empty_lists(nodes: &mut Vec<HtmlNode>) {
    for node in nodes.iter_mut() {
        if let HtmlNode::Element(e) = node {
            prune_empty_lists(&mut e.children);
        }
    }

    let mut i = 0;
    while i < nodes.len() {
        let remove = match &nodes[i] {
            HtmlNode::Element(e) if e.is_list() && e.is_empty_list_element() => {
                !matches!(nodes.get(i + 1), Some(HtmlNode::Text(tail)) if !tail.trim().is_empty())
            }
            _ => false,
        };
        if remove {
            nodes.remove(i);
        } else {
            i += 1;
        }
    }
}

fn write_nodes(out: &mut String, nodes: &[HtmlNode]) {
    for node in nodes {
        match node {
            HtmlNode::Text(text) | HtmlNode::Raw(text) => out.push_str(text),
            HtmlNode::Element(e) => {
                out.push('<');
                out.push_str(&e.name);
                if !e.attrs.is_empty() {
                    out.push(' ');
                    out.push_str(&e.attrs);
                }
                if e.self_closing && e.children.is_empty() {
                    out.push_str("/>");
                    continue;
                }
                out.push('>');
                write_nodes(out, &e.children);
                out.push_str("</");
                out.push_str(&e.name);
                out.push('>');
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{DocItem, Group, GroupLabel, Page, TextItem};

    #[test]
    fn test_extract_body_strips_wrapper() {
        let html = "<!DOCTYPE html>\n<html><head><title>t</title></head><body>\n<p class=\"x\">Hi &amp; bye</p>\n</body></html>";
        assert_eq!(extract_body_content(html), "<p class=\"x\">Hi &amp; bye</p>");
    }

    #[test]
    fn test_prunes_empty_nested_lists() {
        let html = "<html><body><ul><li></li><ul></ul></ul><p>kept</p></body></html>";
        let body = extract_body_content(html);
        assert!(!body.contains("<ul"));
        assert_eq!(body, "<p>kept</p>");
    }

    #[test]
    fn test_keeps_list_with_tail_text_after_entity() {
        let html = "<html><body><div><ul></ul> &amp; tail</div></body></html>";
        assert_eq!(extract_body_content(html), "<div><ul></ul> &amp; tail</div>");
    }

    #[test]
    fn test_prunes_bare_fragment() {
        assert_eq!(extract_body_content("<ul><li></li><ul></ul></ul>"), "");
    }

    #[test]
    fn test_keeps_lists_with_text() {
        let html = "<html><body><ul><li>a</li><ul><ol></ol></ul></ul></body></html>";
        assert_eq!(extract_body_content(html), "<ul><li>a</li></ul>");
    }

    #[test]
    fn test_keeps_list_with_tail_text() {
        let html = "<html><body><div><ul></ul>tail</div></body></html>";
        assert_eq!(extract_body_content(html), "<div><ul></ul>tail</div>");
    }

    #[test]
    fn test_parse_failure_returns_input() {
        let broken = "<html><body><p>unclosed</body></html>";
        assert_eq!(extract_body_content(broken), broken);
    }

    #[test]
    fn test_html_without_body_returns_input() {
        let html = "<html><head></head></html>";
        assert_eq!(extract_body_content(html), html);
    }

    #[test]
    fn test_self_closing_preserved() {
        let html = "<html><body><p>a<br/>b</p></body></html>";
        assert_eq!(extract_body_content(html), "<p>a<br/>b</p>");
    }

    #[test]
    fn test_exporter_prunes_lists_from_other_pages() {
        let mut doc = Document::new("lists");
        doc.add_page(Page::new(1));
        doc.add_page(Page::new(2));
        doc.add_item(DocItem::on_page(1, TextItem::paragraph("intro")));
        let mut list = Group::new(GroupLabel::List);
        list.push(DocItem::on_page(2, TextItem::list_item("later")));
        doc.add_group(list);

        let pages = HtmlExporter::new()
            .convert_to_format(&doc, Path::new("lists.pdf"), Path::new("."))
            .unwrap();
        assert_eq!(pages[&1].as_text(), Some("<p>intro</p>"));
        assert_eq!(pages[&2].as_text(), Some("<ul><li>later</li></ul>"));
    }

    #[test]
    fn test_consolidated_wrapper() {
        let mut contents = PageContents::new();
        contents.insert(1, "<p>one</p>".into());
        let out = HtmlExporter::new()
            .render_consolidated(&contents, "doc", &Document::new("doc"))
            .unwrap()
            .unwrap();
        assert!(out.starts_with("<!DOCTYPE html>\n<html>"));
        assert!(out.contains("<div class=\"page\">\n<h2>Page 1</h2>\n<p>one</p>\n</div>"));
        assert!(out.ends_with("</body>\n</html>"));
    }
}

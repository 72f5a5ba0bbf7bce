//! Text-only PDF parser built on lopdf.
//!
//! Recovers the page text of each page and splits it into paragraphs and
//! list items. Tables and pictures are not recognized; use a richer
//! document source for those.

use std::path::Path;

use lopdf::Document as LopdfDocument;
use regex::Regex;
use unicode_normalization::UnicodeNormalization;

use super::detect::pdf_version_from_path;
use super::{source_stem, DocumentParser};
use crate::error::{Error, Result};
use crate::model::{DocItem, Document, Group, GroupLabel, Metadata, Node, Page, TextItem};

/// Options for the lopdf parser.
#[derive(Debug, Clone)]
pub struct ParseOptions {
    /// Apply Unicode NFC normalization to extracted text
    pub normalize_unicode: bool,

    /// Replace typographic ligatures (ﬁ, ﬂ, ...) with plain letters
    pub fix_ligatures: bool,

    /// Skip pages whose text cannot be extracted instead of failing
    pub lenient: bool,
}

impl ParseOptions {
    /// Create new parse options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable or disable Unicode normalization.
    pub fn with_normalization(mut self, normalize: bool) -> Self {
        self.normalize_unicode = normalize;
        self
    }

    /// Enable or disable ligature replacement.
    pub fn with_ligature_fix(mut self, fix: bool) -> Self {
        self.fix_ligatures = fix;
        self
    }

    /// Skip unreadable pages.
    pub fn lenient(mut self) -> Self {
        self.lenient = true;
        self
    }
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            normalize_unicode: true,
            fix_ligatures: true,
            lenient: false,
        }
    }
}

/// PDF parser producing text items from each page's content stream.
#[derive(Debug, Clone, Default)]
pub struct LopdfParser {
    options: ParseOptions,
}

impl LopdfParser {
    /// Create a parser with default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a parser with custom options.
    pub fn with_options(options: ParseOptions) -> Self {
        Self { options }
    }
}

impl DocumentParser for LopdfParser {
    fn name(&self) -> &str {
        "lopdf"
    }

    fn parse(&self, path: &Path) -> Result<Document> {
        pdf_version_from_path(path)?;
        let pdf = LopdfDocument::load(path)?;
        let page_ids = pdf.get_pages();

        let mut doc = Document::new(source_stem(path));
        doc.metadata = extract_metadata(&pdf);
        doc.metadata.page_count = page_ids.len() as u32;

        let splitter = TextSplitter::new(&self.options)?;

        for (page_no, page_id) in page_ids {
            let (width, height) = media_box(&pdf, page_id);
            doc.add_page(Page::with_size(page_no, width, height));

            let text = match pdf.extract_text(&[page_no]) {
                Ok(text) => text,
                Err(e) if self.options.lenient => {
                    log::warn!("Failed to extract text from page {}: {}", page_no, e);
                    continue;
                }
                Err(e) => {
                    return Err(Error::PdfParse(format!("page {}: {}", page_no, e)));
                }
            };

            let nodes = splitter.page_nodes(page_no, &text);
            log::debug!("Page {}: {} blocks", page_no, nodes.len());
            doc.body.extend(nodes);
        }

        Ok(doc)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BlockKind {
    Paragraph,
    Bullet,
    Numbered,
}

/// Splits raw page text into paragraphs and list items.
struct TextSplitter {
    options: ParseOptions,
    bullet: Regex,
    numbered: Regex,
    hyphen_break: Regex,
    whitespace: Regex,
    ligatures: Vec<(&'static str, &'static str)>,
}

impl TextSplitter {
    fn new(options: &ParseOptions) -> Result<Self> {
        let compile = |pattern: &str| {
            Regex::new(pattern).map_err(|e| Error::Other(format!("invalid pattern: {}", e)))
        };
        Ok(Self {
            options: options.clone(),
            bullet: compile(r"^[•\-\*▪◦■]\s+")?,
            numbered: compile(r"^\d{1,3}[.)]\s+")?,
            hyphen_break: compile(r"([a-zA-Z])-\n([a-z])")?,
            whitespace: compile(r"\s+")?,
            ligatures: vec![
                ("\u{FB00}", "ff"),
                ("\u{FB01}", "fi"),
                ("\u{FB02}", "fl"),
                ("\u{FB03}", "ffi"),
                ("\u{FB04}", "ffl"),
            ],
        })
    }

    fn clean(&self, text: &str) -> String {
        let mut result: String = if self.options.normalize_unicode {
            text.nfc().collect()
        } else {
            text.to_string()
        };
        if self.options.fix_ligatures {
            for (ligature, replacement) in &self.ligatures {
                result = result.replace(ligature, replacement);
            }
        }
        result
    }

    /// Blocks end at blank lines, at lines closing a sentence, and before
    /// list markers.
    fn blocks(&self, text: &str) -> Vec<(BlockKind, String)> {
        let mut blocks = Vec::new();
        let mut lines: Vec<&str> = Vec::new();
        let mut kind = BlockKind::Paragraph;

        for line in text.lines().map(str::trim) {
            if line.is_empty() {
                self.flush(&mut blocks, &mut lines, kind);
                continue;
            }

            let marker = if self.bullet.is_match(line) {
                Some(BlockKind::Bullet)
            } else if self.numbered.is_match(line) {
                Some(BlockKind::Numbered)
            } else {
                None
            };
            if let Some(marker) = marker {
                self.flush(&mut blocks, &mut lines, kind);
                kind = marker;
            } else if lines.is_empty() {
                kind = BlockKind::Paragraph;
            }

            lines.push(line);
            if line.ends_with(['.', '!', '?', '。']) {
                self.flush(&mut blocks, &mut lines, kind);
            }
        }
        self.flush(&mut blocks, &mut lines, kind);
        blocks
    }

    fn flush(&self, blocks: &mut Vec<(BlockKind, String)>, lines: &mut Vec<&str>, kind: BlockKind) {
        if lines.is_empty() {
            return;
        }
        let joined = lines.join("\n");
        lines.clear();

        let joined = self.hyphen_break.replace_all(&joined, "$1$2");
        let text = match kind {
            BlockKind::Bullet => self.bullet.replace(&joined, "").into_owned(),
            BlockKind::Numbered => self.numbered.replace(&joined, "").into_owned(),
            BlockKind::Paragraph => joined.into_owned(),
        };
        let text = self.whitespace.replace_all(text.trim(), " ").into_owned();
        if !text.is_empty() {
            blocks.push((kind, text));
        }
    }

    /// Content nodes for one page; consecutive list items share a group.
    fn page_nodes(&self, page_no: u32, raw: &str) -> Vec<Node> {
        let cleaned = self.clean(raw);
        let mut nodes = Vec::new();
        let mut list: Option<(BlockKind, Group)> = None;

        for (kind, text) in self.blocks(&cleaned) {
            if kind == BlockKind::Paragraph {
                if let Some((_, group)) = list.take() {
                    nodes.push(Node::Group(group));
                }
                nodes.push(Node::Item(DocItem::on_page(page_no, TextItem::paragraph(text))));
                continue;
            }

            let item = DocItem::on_page(page_no, TextItem::list_item(text));
            match &mut list {
                Some((open_kind, group)) if *open_kind == kind => group.push(item),
                _ => {
                    if let Some((_, group)) = list.take() {
                        nodes.push(Node::Group(group));
                    }
                    let label = if kind == BlockKind::Numbered {
                        GroupLabel::OrderedList
                    } else {
                        GroupLabel::List
                    };
                    let mut group = Group::new(label);
                    group.push(item);
                    list = Some((kind, group));
                }
            }
        }

        if let Some((_, group)) = list {
            nodes.push(Node::Group(group));
        }
        nodes
    }
}

fn extract_metadata(pdf: &LopdfDocument) -> Metadata {
    let mut metadata = Metadata {
        pdf_version: Some(pdf.version.clone()),
        ..Default::default()
    };

    let info = pdf
        .trailer
        .get(b"Info")
        .and_then(|info| info.as_reference())
        .and_then(|id| pdf.get_dictionary(id));
    if let Ok(info) = info {
        metadata.title = dict_string(info, b"Title");
        metadata.author = dict_string(info, b"Author");
    }
    metadata
}

/// Page size from the MediaBox, inherited through the page tree.
fn media_box(pdf: &LopdfDocument, page_id: lopdf::ObjectId) -> (f32, f32) {
    let mut node = pdf.get_dictionary(page_id).ok();
    // Bounded walk; malformed files can contain Parent cycles.
    for _ in 0..32 {
        let Some(dict) = node else { break };
        if let Ok(array) = dict.get(b"MediaBox").and_then(|obj| obj.as_array()) {
            let coords: Vec<f32> = array.iter().filter_map(|o| o.as_float().ok()).collect();
            if coords.len() >= 4 {
                return ((coords[2] - coords[0]).abs(), (coords[3] - coords[1]).abs());
            }
        }
        node = dict
            .get(b"Parent")
            .and_then(|parent| parent.as_reference())
            .and_then(|id| pdf.get_dictionary(id))
            .ok();
    }
    // Letter
    (612.0, 792.0)
}

/// Read a text string from a PDF dictionary, handling UTF-16BE strings.
fn dict_string(dict: &lopdf::Dictionary, key: &[u8]) -> Option<String> {
    match dict.get(key).ok()? {
        lopdf::Object::String(bytes, _) => {
            if bytes.len() >= 2 && bytes[0] == 0xFE && bytes[1] == 0xFF {
                let utf16: Vec<u16> = bytes[2..]
                    .chunks_exact(2)
                    .map(|c| u16::from_be_bytes([c[0], c[1]]))
                    .collect();
                String::from_utf16(&utf16).ok()
            } else {
                Some(
                    String::from_utf8(bytes.clone())
                        .unwrap_or_else(|_| bytes.iter().map(|&b| b as char).collect()),
                )
            }
        }
        lopdf::Object::Name(bytes) => String::from_utf8(bytes.clone()).ok(),
        _ => None,
    }
}

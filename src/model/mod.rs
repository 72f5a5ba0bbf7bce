//! Document model types for parsed PDF content.
//!
//! This module defines the structure a parser hands to the exporters: an
//! ordered set of pages plus a content tree whose items carry page
//! provenance. Exporters only ever read it.

mod document;
mod item;
mod page;
mod table;

pub use document::{Document, ItemIter, Metadata, Node};
pub use item::{
    ContentItem, DocItem, Group, GroupLabel, ImageData, PictureItem, Provenance, TextItem,
    TextLabel,
};
pub use page::Page;
pub use table::{TableCell, TableFrame, TableItem, MAX_TABLE_CELLS};

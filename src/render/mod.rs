//! Native per-page renderings of a document.
//!
//! These play the role of the document's own Markdown and HTML export,
//! restricted to a single page. The Markdown and HTML exporters build on them.

mod html;
mod markdown;
mod options;

pub use html::page_html;
pub use markdown::{page_markdown, MarkdownRenderer};
pub use options::RenderOptions;

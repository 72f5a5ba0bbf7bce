//! On-disk cache of per-page conversion results.
//!
//! Every (document, format) pair is persisted as one JSON artifact,
//! `{output_dir}/{stem}.{format}.json`, holding an array of
//! `{"page": n, "content": ...}` entries. Pages can then be fetched back
//! one at a time or as an ordered list without re-running the conversion.

mod backend;
mod page_store;

pub use backend::{DiskBackend, MemoryBackend, StoreBackend};
pub use page_store::{PageRequest, PageStore};

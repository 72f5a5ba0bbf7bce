//! Per-page artifact persistence and retrieval.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::{DiskBackend, StoreBackend};
use crate::error::{Error, Result};
use crate::export::{OutputFormat, PageContent, PageContents};

/// One element of a stored artifact array.
#[derive(Debug, Serialize, Deserialize)]
struct ArtifactEntry {
    page: u32,
    content: PageContent,
}

/// Pages requested from the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageRequest {
    /// One page, returned verbatim
    Single(u32),
    /// Pages concatenated in the given order; duplicates repeat
    Many(Vec<u32>),
}

impl PageRequest {
    /// Parse `"4"` or `"1,2,4"`.
    ///
    /// Page numbers are 1-based; anything else is an invalid argument.
    pub fn parse(input: &str) -> Result<Self> {
        let input = input.trim();
        if input.is_empty() {
            return Err(Error::InvalidArgument("page request is empty".to_string()));
        }

        if !input.contains(',') {
            return parse_page(input).map(PageRequest::Single);
        }

        input
            .split(',')
            .map(parse_page)
            .collect::<Result<Vec<_>>>()
            .map(PageRequest::Many)
    }

    /// Requested page numbers in order.
    pub fn pages(&self) -> &[u32] {
        match self {
            PageRequest::Single(page) => std::slice::from_ref(page),
            PageRequest::Many(pages) => pages,
        }
    }
}

fn parse_page(token: &str) -> Result<u32> {
    let token = token.trim();
    match token.parse::<u32>() {
        Ok(0) => Err(Error::InvalidArgument(
            "page numbers start at 1".to_string(),
        )),
        Ok(page) => Ok(page),
        Err(_) => Err(Error::InvalidArgument(format!(
            "'{}' is not a page number",
            token
        ))),
    }
}

impl FromStr for PageRequest {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for PageRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let pages: Vec<String> = self.pages().iter().map(u32::to_string).collect();
        f.write_str(&pages.join(","))
    }
}

impl From<u32> for PageRequest {
    fn from(page: u32) -> Self {
        PageRequest::Single(page)
    }
}

impl From<Vec<u32>> for PageRequest {
    fn from(pages: Vec<u32>) -> Self {
        PageRequest::Many(pages)
    }
}

/// Stores per-page contents as `{stem}.{format}.json` artifacts.
///
/// An artifact is written once per (document, format) and its existence
/// means the conversion is complete.
#[derive(Clone)]
pub struct PageStore {
    output_dir: PathBuf,
    backend: Arc<dyn StoreBackend>,
}

impl PageStore {
    /// Open a store rooted at `output_dir`, creating the directory.
    pub fn open(output_dir: impl Into<PathBuf>, backend: Arc<dyn StoreBackend>) -> Result<Self> {
        let output_dir = output_dir.into();
        backend.create_dir_all(&output_dir)?;
        Ok(Self {
            output_dir,
            backend,
        })
    }

    /// Open a store on the local filesystem.
    pub fn open_dir(output_dir: impl Into<PathBuf>) -> Result<Self> {
        Self::open(output_dir, Arc::new(DiskBackend))
    }

    /// Directory holding artifacts and consolidated files.
    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Path of the artifact for `(stem, format)`.
    pub fn artifact_path(&self, stem: &str, format: OutputFormat) -> PathBuf {
        self.output_dir
            .join(format!("{}.{}.json", stem, format.name()))
    }

    /// Whether an artifact exists for `(stem, format)`.
    pub fn exists(&self, stem: &str, format: OutputFormat) -> bool {
        self.backend.exists(&self.artifact_path(stem, format))
    }

    /// Write the artifact for `(stem, format)`, replacing any previous one.
    pub fn save(&self, stem: &str, format: OutputFormat, contents: &PageContents) -> Result<()> {
        let entries: Vec<ArtifactEntry> = contents
            .iter()
            .map(|(page, content)| ArtifactEntry {
                page: *page,
                content: content.clone(),
            })
            .collect();
        let json = serde_json::to_string_pretty(&entries)?;
        let path = self.artifact_path(stem, format);
        self.backend.write(&path, json.as_bytes())?;
        log::debug!("Saved {} pages to {}", contents.len(), path.display());
        Ok(())
    }

    /// Load the artifact for `(stem, format)`.
    ///
    /// Returns `None` when it is absent, unreadable or malformed.
    pub fn load(&self, stem: &str, format: OutputFormat) -> Option<PageContents> {
        let path = self.artifact_path(stem, format);
        if !self.backend.exists(&path) {
            return None;
        }

        let data = match self.backend.read(&path) {
            Ok(data) => data,
            Err(e) => {
                log::warn!("Could not read {}: {}", path.display(), e);
                return None;
            }
        };

        match serde_json::from_slice::<Vec<ArtifactEntry>>(&data) {
            Ok(entries) => Some(
                entries
                    .into_iter()
                    .map(|entry| (entry.page, entry.content))
                    .collect(),
            ),
            Err(e) => {
                log::warn!(
                    "Could not decode JSON from {}, file might be corrupted: {}",
                    path.display(),
                    e
                );
                None
            }
        }
    }

    /// Retrieve stored pages as plain text.
    ///
    /// A single page is returned verbatim. Several pages are concatenated in
    /// request order and trimmed, and the whole request fails with `None` if
    /// any page is missing.
    pub fn get_plain_text(
        &self,
        stem: &str,
        format: OutputFormat,
        request: &PageRequest,
    ) -> Option<String> {
        let contents = self.load(stem, format).filter(|c| !c.is_empty())?;

        match request {
            PageRequest::Single(page) => page_text(&contents, *page),
            PageRequest::Many(pages) => {
                let mut joined = String::new();
                for page in pages {
                    joined.push_str(&page_text(&contents, *page)?);
                }
                Some(joined.trim().to_string())
            }
        }
    }

    /// Write a file directly under the output directory.
    pub fn write_file(&self, name: &str, data: &[u8]) -> Result<PathBuf> {
        let path = self.output_dir.join(name);
        self.backend.write(&path, data)?;
        Ok(path)
    }

    /// Create a subdirectory of the output directory.
    pub fn create_subdir(&self, name: &str) -> Result<PathBuf> {
        let path = self.output_dir.join(name);
        self.backend.create_dir_all(&path)?;
        Ok(path)
    }
}

impl fmt::Debug for PageStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PageStore")
            .field("output_dir", &self.output_dir)
            .finish_non_exhaustive()
    }
}

fn page_text(contents: &PageContents, page: u32) -> Option<String> {
    let content = contents.get(&page)?;
    match content.to_text() {
        Ok(text) => Some(text),
        Err(e) => {
            log::warn!("Page {} could not be rendered as text: {}", page, e);
            None
        }
    }
}

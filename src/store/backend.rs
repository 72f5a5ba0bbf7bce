//! Storage backend abstraction.
//!
//! The page store only needs whole-file reads and writes, so the backend
//! trait stays small. [`DiskBackend`] is used in production and
//! [`MemoryBackend`] keeps everything in process for tests and dry runs.

use std::collections::{HashMap, HashSet};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::error::{Error, Result};

/// Whole-file storage used by [`PageStore`](super::PageStore).
pub trait StoreBackend: Send + Sync {
    /// Whether a file exists at `path`.
    fn exists(&self, path: &Path) -> bool;

    /// Read the full contents of `path`.
    fn read(&self, path: &Path) -> Result<Vec<u8>>;

    /// Create or overwrite `path` with `data`.
    fn write(&self, path: &Path, data: &[u8]) -> Result<()>;

    /// Create `path` and all missing parents.
    fn create_dir_all(&self, path: &Path) -> Result<()>;
}

/// Backend writing to the local filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct DiskBackend;

impl StoreBackend for DiskBackend {
    fn exists(&self, path: &Path) -> bool {
        path.is_file()
    }

    fn read(&self, path: &Path) -> Result<Vec<u8>> {
        Ok(fs::read(path)?)
    }

    fn write(&self, path: &Path, data: &[u8]) -> Result<()> {
        Ok(fs::write(path, data)?)
    }

    fn create_dir_all(&self, path: &Path) -> Result<()> {
        Ok(fs::create_dir_all(path)?)
    }
}

/// In-process backend keeping files in a map.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    files: Mutex<HashMap<PathBuf, Vec<u8>>>,
    dirs: Mutex<HashSet<PathBuf>>,
}

impl MemoryBackend {
    /// Create an empty in-memory backend.
    pub fn new() -> Self {
        Self::default()
    }

    /// Paths of all stored files, sorted.
    pub fn files(&self) -> Vec<PathBuf> {
        let mut paths: Vec<PathBuf> = match self.files.lock() {
            Ok(files) => files.keys().cloned().collect(),
            Err(poisoned) => poisoned.into_inner().keys().cloned().collect(),
        };
        paths.sort();
        paths
    }

    /// Whether `path` was created as a directory.
    pub fn has_dir(&self, path: &Path) -> bool {
        match self.dirs.lock() {
            Ok(dirs) => dirs.contains(path),
            Err(poisoned) => poisoned.into_inner().contains(path),
        }
    }

    fn lock_files(&self) -> Result<std::sync::MutexGuard<'_, HashMap<PathBuf, Vec<u8>>>> {
        self.files
            .lock()
            .map_err(|_| Error::Other("memory backend lock poisoned".to_string()))
    }
}

impl StoreBackend for MemoryBackend {
    fn exists(&self, path: &Path) -> bool {
        self.lock_files()
            .map(|files| files.contains_key(path))
            .unwrap_or(false)
    }

    fn read(&self, path: &Path) -> Result<Vec<u8>> {
        self.lock_files()?.get(path).cloned().ok_or_else(|| {
            Error::Io(io::Error::new(
                io::ErrorKind::NotFound,
                format!("{} not found", path.display()),
            ))
        })
    }

    fn write(&self, path: &Path, data: &[u8]) -> Result<()> {
        self.lock_files()?.insert(path.to_path_buf(), data.to_vec());
        Ok(())
    }

    fn create_dir_all(&self, path: &Path) -> Result<()> {
        let mut dirs = self
            .dirs
            .lock()
            .map_err(|_| Error::Other("memory backend lock poisoned".to_string()))?;
        for ancestor in path.ancestors() {
            if !ancestor.as_os_str().is_empty() {
                dirs.insert(ancestor.to_path_buf());
            }
        }
        Ok(())
    }
}

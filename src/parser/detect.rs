//! PDF header sniffing.

use crate::error::{Error, Result};
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// PDF magic bytes: %PDF-
const PDF_MAGIC: &[u8] = b"%PDF-";
const VERSION_LEN: usize = 3; // e.g., "1.7"

/// Read the header of `path` and return the declared PDF version.
pub fn pdf_version_from_path<P: AsRef<Path>>(path: P) -> Result<String> {
    let mut header = Vec::with_capacity(16);
    File::open(path)?.take(16).read_to_end(&mut header)?;
    pdf_version_from_bytes(&header)
}

/// Return the PDF version declared by a `%PDF-x.y` header.
///
/// Fails with [`Error::UnknownFormat`] when the magic is missing and
/// [`Error::UnsupportedVersion`] when the version is malformed.
pub fn pdf_version_from_bytes(data: &[u8]) -> Result<String> {
    if data.len() < PDF_MAGIC.len() + VERSION_LEN || !data.starts_with(PDF_MAGIC) {
        return Err(Error::UnknownFormat);
    }

    let version_bytes = &data[PDF_MAGIC.len()..PDF_MAGIC.len() + VERSION_LEN];
    let version = String::from_utf8_lossy(version_bytes).to_string();
    if !is_valid_version(&version) {
        return Err(Error::UnsupportedVersion(version));
    }
    Ok(version)
}

/// Check whether bytes start with a PDF header.
pub fn is_pdf_bytes(data: &[u8]) -> bool {
    pdf_version_from_bytes(data).is_ok()
}

fn is_valid_version(version: &str) -> bool {
    let bytes = version.as_bytes();
    bytes.len() == 3 && bytes[0].is_ascii_digit() && bytes[1] == b'.' && bytes[2].is_ascii_digit()
}

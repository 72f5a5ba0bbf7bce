//! Error types for the pagewise library.

use std::io;
use thiserror::Error;

/// Result type alias for pagewise operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur while parsing, exporting or caching documents.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error when reading or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// JSON (de)serialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML serialization failed.
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// CSV writing failed.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// XML could not be read or written.
    #[error("XML error: {0}")]
    Xml(String),

    /// The file format is not recognized as PDF.
    #[error("Unknown file format: not a valid PDF")]
    UnknownFormat,

    /// The PDF version is not supported.
    #[error("Unsupported PDF version: {0}")]
    UnsupportedVersion(String),

    /// Error parsing PDF structure.
    #[error("PDF parsing error: {0}")]
    PdfParse(String),

    /// The PDF document is encrypted.
    #[error("Document is encrypted")]
    Encrypted,

    /// The requested output format has no registered exporter.
    #[error("Unsupported output format: {0}")]
    UnsupportedFormat(String),

    /// A caller passed an argument that cannot be interpreted.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// A table item could not be turned into tabular data.
    #[error("Table export error: {0}")]
    TableExport(String),

    /// Error while rendering a page.
    #[error("Rendering error: {0}")]
    Render(String),

    /// Generic error with message.
    #[error("{0}")]
    Other(String),
}

impl From<lopdf::Error> for Error {
    fn from(err: lopdf::Error) -> Self {
        match err {
            lopdf::Error::IO(e) => Error::Io(e),
            lopdf::Error::Decryption(_) => Error::Encrypted,
            _ => Error::PdfParse(err.to_string()),
        }
    }
}

impl From<quick_xml::Error> for Error {
    fn from(err: quick_xml::Error) -> Self {
        Error::Xml(err.to_string())
    }
}

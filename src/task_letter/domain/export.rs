//! Naming and addressing of exported task-letter documents.
//!
//! No document bytes are produced here. The types describe where a rendered
//! document will live once a generator exists.

use super::{ParseExportFormatError, RegisterNumber};
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

/// Default file-name prefix for exported letters.
pub const DEFAULT_FILENAME_PREFIX: &str = "surat-tugas-";

/// Default URL path under which exported letters are served.
pub const DEFAULT_URL_PREFIX: &str = "/exports";

/// Document format requested for an export.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExportFormat {
    /// Portable Document Format.
    Pdf,
    /// Office Open XML word-processing document.
    Docx,
}

impl ExportFormat {
    /// Returns the file extension and wire name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pdf => "pdf",
            Self::Docx => "docx",
        }
    }
}

impl TryFrom<&str> for ExportFormat {
    type Error = ParseExportFormatError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let normalized = value.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "pdf" => Ok(Self::Pdf),
            "docx" => Ok(Self::Docx),
            _ => Err(ParseExportFormatError(value.to_owned())),
        }
    }
}

impl FromStr for ExportFormat {
    type Err = ParseExportFormatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::try_from(s)
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Address of an exported document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportedDocument {
    /// Path the document is served from.
    pub file_url: String,
    /// File name of the document.
    pub filename: String,
}

/// Deterministic naming scheme for exported documents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportNaming {
    url_prefix: String,
    filename_prefix: String,
}

impl ExportNaming {
    /// Creates a naming scheme.
    ///
    /// Trailing slashes on `url_prefix` are dropped so the joined URL never
    /// contains `//`.
    #[must_use]
    pub fn new(url_prefix: impl Into<String>, filename_prefix: impl Into<String>) -> Self {
        let raw_url_prefix = url_prefix.into();
        Self {
            url_prefix: raw_url_prefix.trim_end_matches('/').to_owned(),
            filename_prefix: filename_prefix.into(),
        }
    }

    /// Returns the URL prefix without a trailing slash.
    #[must_use]
    pub fn url_prefix(&self) -> &str {
        &self.url_prefix
    }

    /// Returns the file-name prefix.
    #[must_use]
    pub fn filename_prefix(&self) -> &str {
        &self.filename_prefix
    }

    /// Derives the file name for a letter in the given format.
    #[must_use]
    pub fn filename(&self, register_number: &RegisterNumber, format: ExportFormat) -> String {
        format!(
            "{}{}.{}",
            self.filename_prefix,
            register_number.sanitized(),
            format.as_str()
        )
    }

    /// Derives the full document address for a letter.
    #[must_use]
    pub fn locate(&self, register_number: &RegisterNumber, format: ExportFormat) -> ExportedDocument {
        let filename = self.filename(register_number, format);
        ExportedDocument {
            file_url: format!("{}/{}", self.url_prefix, filename),
            filename,
        }
    }
}

impl Default for ExportNaming {
    fn default() -> Self {
        Self::new(DEFAULT_URL_PREFIX, DEFAULT_FILENAME_PREFIX)
    }
}

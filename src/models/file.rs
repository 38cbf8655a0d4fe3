//! Downloadable file records.

use serde::{Deserialize, Serialize};

/// How a file's bytes should be transferred.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum TransportHint {
    /// Same-origin link; fetch with the session cookies attached.
    Authenticated,

    /// External link; plain unauthenticated fetch.
    Direct,

    /// Navigate the browser to the link and collect the file from the
    /// scratch download directory.
    Browser,
}

/// A downloadable file discovered in a course section.
///
/// On-disk identity is (category, subfolder, sanitized name); an existing
/// destination path means the file is skipped, never overwritten.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FileRecord {
    /// Display filename (unsanitized, as shown on the portal)
    pub name: String,

    /// Absolute download URL
    pub download_url: String,

    /// Category the file belongs to (separator text or a sentinel default)
    pub category: String,

    /// Optional grouping subfolder (e.g. the PDF name of a PDF+ZIP pair)
    pub subfolder: Option<String>,

    /// Human-readable size label from the listing ("1.2 MB")
    pub size_label: String,

    /// Transfer mechanism for this link
    pub transport: TransportHint,
}

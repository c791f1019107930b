//! References to source documents

use std::path::{Path, PathBuf};

/// Where the extractor should read a document from.
///
/// Extraction only ever reads through this reference; it never moves or
/// rewrites the underlying file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocumentRef {
    /// A file on disk
    Path(PathBuf),

    /// Document content already in memory (e.g. an upload)
    Bytes {
        /// Client-supplied file name, if any
        name: Option<String>,
        /// Raw document bytes
        data: Vec<u8>,
    },
}

impl DocumentRef {
    /// Reference a file on disk
    pub fn path(path: impl AsRef<Path>) -> Self {
        DocumentRef::Path(path.as_ref().to_path_buf())
    }

    /// Reference in-memory content
    pub fn bytes(name: Option<String>, data: impl Into<Vec<u8>>) -> Self {
        DocumentRef::Bytes {
            name,
            data: data.into(),
        }
    }

    /// File name to show in provenance and logs
    pub fn display_name(&self) -> Option<String> {
        match self {
            DocumentRef::Path(path) => path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned()),
            DocumentRef::Bytes { name, .. } => name.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_name_from_path() {
        let doc = DocumentRef::path("/tmp/filings/healthinc.pdf");
        assert_eq!(doc.display_name().as_deref(), Some("healthinc.pdf"));
    }

    #[test]
    fn test_display_name_from_bytes() {
        let doc = DocumentRef::bytes(Some("upload.pdf".to_string()), b"%PDF-1.4".to_vec());
        assert_eq!(doc.display_name().as_deref(), Some("upload.pdf"));

        let anonymous = DocumentRef::bytes(None, Vec::new());
        assert_eq!(anonymous.display_name(), None);
    }
}

use std::fs;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::error::{Error, Result};
use crate::index::DocId;

/// One source document ready for tokenization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    pub id: DocId,
    /// Human-readable identity used in error reports.
    pub name: String,
    pub text: String,
    /// Bytes read from the source, counted against the block byte ceiling.
    pub size_bytes: u64,
}

impl Document {
    pub fn new(id: DocId, text: impl Into<String>) -> Self {
        let text = text.into();
        Self { id, name: id.to_string(), size_bytes: text.len() as u64, text }
    }
}

/// Parse a document file name as its id.
pub fn parse_doc_id(name: &str) -> Result<DocId> {
    name.trim().parse().map_err(|_| Error::InvalidDocumentId { name: name.to_string() })
}

/// Documents stored one per file directly inside a directory, named by id.
///
/// Files are visited in file-name order. Every failure is reported for the
/// file it concerns and iteration continues with the next file.
pub struct DirectorySource {
    files: std::vec::IntoIter<PathBuf>,
}

impl DirectorySource {
    pub fn open<P: AsRef<Path>>(dir: P) -> Result<Self> {
        let dir = dir.as_ref();
        let mut files = Vec::new();
        for entry in WalkDir::new(dir).min_depth(1).max_depth(1).sort_by_file_name() {
            let entry = entry.map_err(|e| {
                let path = e.path().unwrap_or(dir).to_path_buf();
                Error::io(path, e.into())
            })?;
            if entry.file_type().is_file() {
                files.push(entry.into_path());
            }
        }
        tracing::debug!(dir = %dir.display(), documents = files.len(), "enumerated documents");
        Ok(Self { files: files.into_iter() })
    }
}

fn load(path: &Path) -> Result<Document> {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let id = parse_doc_id(&name).map_err(|e| e.for_document(&name))?;
    let bytes = fs::read(path).map_err(|e| Error::io(path, e).for_document(&name))?;
    Ok(Document {
        id,
        name,
        size_bytes: bytes.len() as u64,
        text: String::from_utf8_lossy(&bytes).into_owned(),
    })
}

impl Iterator for DirectorySource {
    type Item = Result<Document>;

    fn next(&mut self) -> Option<Self::Item> {
        let path = self.files.next()?;
        Some(load(&path))
    }

    fn size_hint(&self) -> (usize, Option<usize>) { self.files.size_hint() }
}

use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

pub const DEFAULT_MAX_TERMS_PER_BLOCK: usize = 10_000;
pub const DEFAULT_MAX_BLOCK_BYTES: u64 = 400_000;

/// How sub-indexes are combined into the final index.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MergeStrategy {
    /// External k-way merge; holds one line per sub-index in memory.
    #[default]
    Streaming,
    /// Accumulate every term of every sub-index before writing.
    InMemory,
}

/// What to do when a single document cannot be indexed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DocumentErrorPolicy {
    #[default]
    Abort,
    Skip,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IndexerConfig {
    /// Flush once a block holds this many distinct terms.
    pub max_terms_per_block: usize,
    /// Flush once a block has consumed this many source bytes.
    pub max_block_bytes: u64,
    /// Directory receiving the transient sub-index files.
    pub work_dir: PathBuf,
    /// Final index file.
    pub output: PathBuf,
    pub merge_strategy: MergeStrategy,
    pub on_document_error: DocumentErrorPolicy,
}

impl Default for IndexerConfig {
    fn default() -> Self {
        Self {
            max_terms_per_block: DEFAULT_MAX_TERMS_PER_BLOCK,
            max_block_bytes: DEFAULT_MAX_BLOCK_BYTES,
            work_dir: PathBuf::from("."),
            output: PathBuf::from("invIndex.csv"),
            merge_strategy: MergeStrategy::default(),
            on_document_error: DocumentErrorPolicy::default(),
        }
    }
}

impl IndexerConfig {
    /// Load a JSON config; missing fields keep their defaults.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let f = File::open(path).map_err(|e| Error::io(path, e))?;
        serde_json::from_reader(BufReader::new(f))
            .map_err(|e| Error::Resource(format!("{}: {e}", path.display())))
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_terms_per_block == 0 {
            return Err(Error::Resource("max_terms_per_block must be positive".into()));
        }
        if self.max_block_bytes == 0 {
            return Err(Error::Resource("max_block_bytes must be positive".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use std::io::Write;

    #[test]
    fn defaults_match_reference_ceilings() {
        let cfg = IndexerConfig::default();
        assert_eq!(cfg.max_terms_per_block, 10_000);
        assert_eq!(cfg.max_block_bytes, 400_000);
        assert_eq!(cfg.merge_strategy, MergeStrategy::Streaming);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn zero_ceilings_are_resource_errors() {
        let cfg = IndexerConfig { max_terms_per_block: 0, ..Default::default() };
        assert_eq!(cfg.validate().unwrap_err().kind(), ErrorKind::Resource);
        let cfg = IndexerConfig { max_block_bytes: 0, ..Default::default() };
        assert_eq!(cfg.validate().unwrap_err().kind(), ErrorKind::Resource);
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        write!(f, r#"{{"max_terms_per_block": 2, "merge_strategy": "in-memory"}}"#).unwrap();
        let cfg = IndexerConfig::from_json_file(f.path()).unwrap();
        assert_eq!(cfg.max_terms_per_block, 2);
        assert_eq!(cfg.max_block_bytes, DEFAULT_MAX_BLOCK_BYTES);
        assert_eq!(cfg.merge_strategy, MergeStrategy::InMemory);
        assert_eq!(cfg.on_document_error, DocumentErrorPolicy::Abort);
    }
}

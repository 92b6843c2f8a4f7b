use std::fs;
use std::path::{Path, PathBuf};

use crate::config::IndexerConfig;
use crate::error::Result;
use crate::index::Dictionary;
use crate::persist::{write_dictionary, IndexPaths};

/// Why a block was written out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlushReason {
    TermCeiling,
    ByteCeiling,
    EndOfInput,
}

/// Owns the open block and decides when it becomes a sub-index.
///
/// Ceilings are checked only between documents, so one document can push the
/// dictionary past `max_terms` before it is flushed.
pub struct BlockAccumulator {
    paths: IndexPaths,
    max_terms: usize,
    max_bytes: u64,
    dictionary: Dictionary,
    bytes: u64,
    next_block: u32,
    sub_indexes: Vec<PathBuf>,
}

impl BlockAccumulator {
    pub fn new(config: &IndexerConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            paths: IndexPaths::new(&config.work_dir),
            max_terms: config.max_terms_per_block,
            max_bytes: config.max_block_bytes,
            dictionary: Dictionary::new(),
            bytes: 0,
            next_block: 1,
            sub_indexes: Vec::new(),
        })
    }

    /// Fold one document's terms into the open block, flushing if a ceiling
    /// was reached. Returns the sub-index written, if any.
    pub fn accept(&mut self, document: Dictionary, size_bytes: u64) -> Result<Option<PathBuf>> {
        self.dictionary.merge(document);
        self.bytes = self.bytes.saturating_add(size_bytes);

        if self.dictionary.len() >= self.max_terms {
            return self.flush(FlushReason::TermCeiling).map(Some);
        }
        if self.bytes >= self.max_bytes && !self.dictionary.is_empty() {
            return self.flush(FlushReason::ByteCeiling).map(Some);
        }
        Ok(None)
    }

    /// Flush the final partial block and hand over every sub-index in block order.
    pub fn finish(mut self) -> Result<Vec<PathBuf>> {
        if !self.dictionary.is_empty() {
            if let Err(e) = self.flush(FlushReason::EndOfInput) {
                self.discard();
                return Err(e);
            }
        }
        Ok(self.sub_indexes)
    }

    /// Remove every sub-index written so far.
    pub fn discard(mut self) {
        for path in self.sub_indexes.drain(..) {
            if let Err(e) = fs::remove_file(&path) {
                tracing::warn!(path = %path.display(), error = %e, "could not remove sub-index");
            }
        }
    }

    fn flush(&mut self, reason: FlushReason) -> Result<PathBuf> {
        let block = self.next_block;
        let path = write_dictionary(self.paths.sub_index(block), &self.dictionary)?;
        tracing::info!(block, terms = self.dictionary.len(), bytes = self.bytes, ?reason, path = %path.display(), "flushed block");

        self.next_block += 1;
        self.bytes = 0;
        self.dictionary = Dictionary::new();
        self.sub_indexes.push(path.clone());
        Ok(path)
    }

    pub fn term_count(&self) -> usize { self.dictionary.len() }

    pub fn byte_count(&self) -> u64 { self.bytes }

    pub fn sub_indexes(&self) -> &[PathBuf] { &self.sub_indexes }
}

use serde::Serialize;
use std::path::PathBuf;

use crate::block::BlockAccumulator;
use crate::config::{DocumentErrorPolicy, IndexerConfig};
use crate::error::Result;
use crate::merge::merge;
use crate::source::Document;
use crate::tokenizer::tokenize;

/// Summary of one indexing run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BuildStats {
    pub documents: usize,
    pub skipped: usize,
    /// Names of the documents left out under the skip policy.
    pub skipped_documents: Vec<String>,
    pub bytes: u64,
    pub blocks: usize,
    pub terms: usize,
    pub output: PathBuf,
    pub stale_sub_indexes: Vec<PathBuf>,
}

/// Drives documents through tokenization, block accumulation and the final merge.
pub struct IndexBuilder {
    config: IndexerConfig,
}

impl IndexBuilder {
    pub fn new(config: IndexerConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Index every document, strictly in delivery order, and merge the blocks
    /// into the configured output file.
    pub fn build<I>(&self, documents: I) -> Result<BuildStats>
    where
        I: IntoIterator<Item = Result<Document>>,
    {
        let mut blocks = BlockAccumulator::new(&self.config)?;
        let mut indexed = 0usize;
        let mut skipped_documents = Vec::new();
        let mut bytes = 0u64;

        for document in documents {
            let document = match document {
                Ok(doc) => doc,
                Err(e) if self.config.on_document_error == DocumentErrorPolicy::Skip => {
                    let name = e.document().map_or_else(|| e.to_string(), str::to_string);
                    tracing::warn!(document = %name, error = %e, "skipping document");
                    skipped_documents.push(name);
                    continue;
                }
                Err(e) => {
                    tracing::error!(error = %e, "aborting build");
                    blocks.discard();
                    return Err(e);
                }
            };

            let terms = tokenize(&document.text, document.id);
            tracing::debug!(doc_id = document.id, terms = terms.len(), bytes = document.size_bytes, "tokenized document");
            if let Err(e) = blocks.accept(terms, document.size_bytes) {
                blocks.discard();
                return Err(e.for_document(document.name));
            }
            indexed += 1;
            bytes += document.size_bytes;
        }

        let sub_indexes = blocks.finish()?;
        let outcome = merge(&sub_indexes, &self.config.output, self.config.merge_strategy)?;
        tracing::info!(documents = indexed, skipped = skipped_documents.len(), blocks = sub_indexes.len(), terms = outcome.terms, "index build complete");

        Ok(BuildStats {
            documents: indexed,
            skipped: skipped_documents.len(),
            skipped_documents,
            bytes,
            blocks: sub_indexes.len(),
            terms: outcome.terms,
            output: outcome.output,
            stale_sub_indexes: outcome.stale,
        })
    }
}

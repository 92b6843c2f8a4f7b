//! Union-merge of sorted sub-indexes into the final index.
//!
//! A term can occur in several sub-indexes, so every strategy unions the
//! posting sets of equal terms instead of assuming disjoint keys.

use std::cmp::Ordering;
use std::collections::{BTreeSet, BinaryHeap};
use std::fs;
use std::path::{Path, PathBuf};

use crate::config::MergeStrategy;
use crate::error::{Error, Result};
use crate::index::{DocId, Dictionary};
use crate::persist::{IndexEntry, IndexReader, IndexWriter};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeOutcome {
    pub output: PathBuf,
    /// Distinct terms written.
    pub terms: usize,
    /// Sub-indexes that were merged but could not be deleted.
    pub stale: Vec<PathBuf>,
}

/// Merge `sub_indexes` into `output`, then delete them.
///
/// The output only appears once every input has been merged completely. On
/// error the inputs are left untouched.
pub fn merge<P: AsRef<Path>>(sub_indexes: &[PathBuf], output: P, strategy: MergeStrategy) -> Result<MergeOutcome> {
    let output = output.as_ref();
    if let Some(clash) = sub_indexes.iter().find(|p| same_file(p.as_path(), output)) {
        return Err(Error::Resource(format!(
            "merge output {} is also one of the inputs",
            clash.display()
        )));
    }
    let merged = match strategy {
        MergeStrategy::Streaming => merge_streaming(sub_indexes, output),
        MergeStrategy::InMemory => merge_in_memory(sub_indexes, output),
    };
    let (output, terms) = match merged {
        Ok(done) => done,
        Err(e) => {
            tracing::error!(output = %output.display(), inputs = sub_indexes.len(), error = %e, "merge failed");
            return Err(e);
        }
    };

    let mut stale = Vec::new();
    for path in sub_indexes {
        if let Err(e) = fs::remove_file(path) {
            tracing::warn!(path = %path.display(), error = %e, "merged sub-index could not be removed");
            stale.push(path.clone());
        }
    }
    tracing::info!(output = %output.display(), terms, inputs = sub_indexes.len(), ?strategy, "merge complete");
    Ok(MergeOutcome { output, terms, stale })
}

fn same_file(a: &Path, b: &Path) -> bool {
    if a == b {
        return true;
    }
    match (fs::canonicalize(a), fs::canonicalize(b)) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

/// Head line of one sub-index. Ordered so that `BinaryHeap` pops the smallest
/// term first, ties broken by input position.
struct Head {
    entry: IndexEntry,
    source: usize,
}

impl PartialEq for Head {
    fn eq(&self, other: &Self) -> bool { self.cmp(other) == Ordering::Equal }
}

impl Eq for Head {}

impl PartialOrd for Head {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> { Some(self.cmp(other)) }
}

impl Ord for Head {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .entry
            .term
            .cmp(&self.entry.term)
            .then_with(|| other.source.cmp(&self.source))
    }
}

fn advance(readers: &mut [IndexReader], source: usize, heap: &mut BinaryHeap<Head>) -> Result<()> {
    if let Some(entry) = readers[source].next().transpose()? {
        heap.push(Head { entry, source });
    }
    Ok(())
}

fn merge_streaming(sub_indexes: &[PathBuf], output: &Path) -> Result<(PathBuf, usize)> {
    let mut readers = sub_indexes.iter().map(IndexReader::open).collect::<Result<Vec<_>>>()?;
    let mut heap = BinaryHeap::with_capacity(readers.len());
    for source in 0..readers.len() {
        advance(&mut readers, source, &mut heap)?;
    }

    let mut writer = IndexWriter::create(output)?;
    while let Some(Head { entry, source }) = heap.pop() {
        let term = entry.term;
        let mut postings: BTreeSet<DocId> = entry.postings.into_iter().collect();
        advance(&mut readers, source, &mut heap)?;

        while heap.peek().is_some_and(|head| head.entry.term == term) {
            let Some(Head { entry, source }) = heap.pop() else {
                break;
            };
            postings.extend(entry.postings);
            advance(&mut readers, source, &mut heap)?;
        }
        writer.write_entry(&term, postings.iter().copied())?;
    }
    let terms = writer.entries();
    Ok((writer.commit()?, terms))
}

fn merge_in_memory(sub_indexes: &[PathBuf], output: &Path) -> Result<(PathBuf, usize)> {
    let mut index = Dictionary::new();
    for path in sub_indexes {
        for entry in IndexReader::open(path)? {
            let IndexEntry { term, postings } = entry?;
            let mut block = Dictionary::new();
            for id in postings {
                block.insert(term.clone(), id);
            }
            index.merge(block);
        }
    }

    let mut writer = IndexWriter::create(output)?;
    for (term, postings) in index.iter() {
        writer.write_entry(term, postings.iter().copied())?;
    }
    Ok((writer.commit()?, index.len()))
}

//! Blocked (SPIMI) construction of a term-to-document inverted index.
//!
//! Documents are tokenized into per-document dictionaries, accumulated into
//! size-bounded blocks, flushed to sorted sub-index files and finally merged
//! into one sorted index file.

pub mod block;
pub mod builder;
pub mod config;
pub mod error;
pub mod index;
pub mod merge;
pub mod persist;
pub mod source;
pub mod tokenizer;

pub use block::BlockAccumulator;
pub use builder::{BuildStats, IndexBuilder};
pub use config::{DocumentErrorPolicy, IndexerConfig, MergeStrategy};
pub use error::{Error, ErrorKind, Result};
pub use index::{DocId, Dictionary};
pub use merge::{merge, MergeOutcome};
pub use source::{DirectorySource, Document};

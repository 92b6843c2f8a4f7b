//! Textual index files.
//!
//! Sub-indexes and the final index share one layout, a line per term in
//! ascending term order:
//!
//! ```text
//! term, posting_count, id_1, id_2, ..., id_n
//! ```
//!
//! Posting ids within a line are ascending and unique.

use std::ffi::OsString;
use std::fs::{self, File};
use std::io::{BufRead, BufReader, BufWriter, Lines, Write};
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::index::{DocId, Dictionary};

const DELIMITER: &str = ", ";

pub struct IndexPaths {
    pub work_dir: PathBuf,
}

impl IndexPaths {
    pub fn new<P: AsRef<Path>>(work_dir: P) -> Self {
        Self { work_dir: work_dir.as_ref().to_path_buf() }
    }

    pub fn sub_index(&self, block: u32) -> PathBuf { self.work_dir.join(format!("subIndex_{block}.csv")) }
}

/// Sibling path used while a file is being written.
pub fn staging_path(path: &Path) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(".tmp");
    PathBuf::from(name)
}

fn write_line<W, I>(out: &mut W, term: &str, postings: I) -> std::io::Result<()>
where
    W: Write,
    I: ExactSizeIterator<Item = DocId>,
{
    write!(out, "{term}{DELIMITER}{}", postings.len())?;
    for id in postings {
        write!(out, "{DELIMITER}{id}")?;
    }
    writeln!(out)
}

/// Removes the staging file unless disarmed by a successful commit.
struct Staging {
    path: PathBuf,
    armed: bool,
}

impl Drop for Staging {
    fn drop(&mut self) {
        if self.armed {
            let _ = fs::remove_file(&self.path);
        }
    }
}

/// Writes an index file under a staging name and moves it into place on
/// [`IndexWriter::commit`]. Dropping an uncommitted writer removes the
/// staging file, so readers never observe a partial index.
pub struct IndexWriter {
    path: PathBuf,
    // closed before `staging` removes the file
    out: BufWriter<File>,
    staging: Staging,
    entries: usize,
}

impl IndexWriter {
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let staging = staging_path(&path);
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
        }
        let f = File::create(&staging).map_err(|e| Error::io(&staging, e))?;
        Ok(Self {
            path,
            out: BufWriter::new(f),
            staging: Staging { path: staging, armed: true },
            entries: 0,
        })
    }

    /// Append one term line. Callers supply terms in ascending order and ids
    /// ascending and unique.
    pub fn write_entry<I>(&mut self, term: &str, postings: I) -> Result<()>
    where
        I: ExactSizeIterator<Item = DocId>,
    {
        write_line(&mut self.out, term, postings).map_err(|e| Error::io(&self.staging.path, e))?;
        self.entries += 1;
        Ok(())
    }

    /// Flush, sync and atomically rename into the final path.
    pub fn commit(self) -> Result<PathBuf> {
        let Self { path, out, mut staging, entries } = self;
        let f = out.into_inner().map_err(|e| Error::io(&staging.path, e.into_error()))?;
        f.sync_all().map_err(|e| Error::io(&staging.path, e))?;
        drop(f);
        fs::rename(&staging.path, &path).map_err(|e| Error::io(&path, e))?;
        staging.armed = false;
        tracing::debug!(path = %path.display(), entries, "index file committed");
        Ok(path)
    }

    pub fn entries(&self) -> usize { self.entries }
}

/// Serialize a whole dictionary, sorted by term.
pub fn write_dictionary<P: AsRef<Path>>(path: P, dictionary: &Dictionary) -> Result<PathBuf> {
    let mut writer = IndexWriter::create(path)?;
    for (term, postings) in dictionary.iter() {
        writer.write_entry(term, postings.iter().copied())?;
    }
    writer.commit()
}

/// One parsed index line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexEntry {
    pub term: String,
    pub postings: Vec<DocId>,
}

fn parse_line(line: &str) -> std::result::Result<IndexEntry, String> {
    let mut fields = line.split(DELIMITER);
    let term = fields.next().unwrap_or_default();
    if term.is_empty() {
        return Err("missing term".into());
    }
    let count = fields
        .next()
        .ok_or_else(|| format!("missing delimiter after term {term:?}"))?;
    let count: usize = count.parse().map_err(|_| format!("invalid posting count {count:?}"))?;
    if count == 0 {
        return Err(format!("empty posting list for {term:?}"));
    }

    let mut postings = Vec::with_capacity(count);
    for field in fields {
        let id: DocId = field.parse().map_err(|_| format!("invalid posting id {field:?}"))?;
        if postings.last().is_some_and(|&prev| prev >= id) {
            return Err(format!("posting ids for {term:?} are not strictly ascending"));
        }
        postings.push(id);
    }
    if postings.len() != count {
        return Err(format!("{term:?} declares {count} postings but lists {}", postings.len()));
    }
    Ok(IndexEntry { term: term.to_string(), postings })
}

/// Streams validated entries from an index file.
pub struct IndexReader {
    path: PathBuf,
    lines: Lines<BufReader<File>>,
    line_no: usize,
    last_term: Option<String>,
}

impl IndexReader {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let f = File::open(&path).map_err(|e| Error::io(&path, e))?;
        Ok(Self { lines: BufReader::new(f).lines(), path, line_no: 0, last_term: None })
    }

    fn read_entry(&mut self, line: std::io::Result<String>) -> Result<IndexEntry> {
        self.line_no += 1;
        let line = line.map_err(|e| Error::io(&self.path, e))?;
        let entry = parse_line(&line).map_err(|reason| Error::malformed(&self.path, self.line_no, reason))?;
        if let Some(prev) = &self.last_term {
            if prev.as_str() >= entry.term.as_str() {
                return Err(Error::malformed(
                    &self.path,
                    self.line_no,
                    format!("term {:?} is not after {prev:?}", entry.term),
                ));
            }
        }
        self.last_term = Some(entry.term.clone());
        Ok(entry)
    }
}

impl Iterator for IndexReader {
    type Item = Result<IndexEntry>;

    fn next(&mut self) -> Option<Self::Item> {
        let line = self.lines.next()?;
        Some(self.read_entry(line))
    }
}

/// Read a whole index file back into memory.
pub fn read_dictionary<P: AsRef<Path>>(path: P) -> Result<Dictionary> {
    let mut dictionary = Dictionary::new();
    for entry in IndexReader::open(path)? {
        let entry = entry?;
        for id in entry.postings {
            dictionary.insert(entry.term.clone(), id);
        }
    }
    Ok(dictionary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use tempfile::tempdir;

    #[test]
    fn writes_reference_layout() {
        let dir = tempdir().unwrap();
        let mut d = Dictionary::new();
        d.insert("run".into(), 2);
        d.insert("run".into(), 1);
        d.insert("jog".into(), 2);
        let path = write_dictionary(dir.path().join("subIndex_1.csv"), &d).unwrap();

        let text = fs::read_to_string(&path).unwrap();
        assert_eq!(text, "jog, 1, 2\nrun, 2, 1, 2\n");
        assert!(!staging_path(&path).exists());
        assert_eq!(read_dictionary(&path).unwrap(), d);
    }

    #[test]
    fn dropped_writer_leaves_no_files() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("subIndex_9.csv");
        {
            let mut w = IndexWriter::create(&path).unwrap();
            w.write_entry("abc", [1u32].into_iter()).unwrap();
        }
        assert!(!path.exists());
        assert!(!staging_path(&path).exists());
    }

    #[test]
    fn failed_commit_removes_staging_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("invIndex.csv");
        let mut w = IndexWriter::create(&path).unwrap();
        w.write_entry("abc", [1u32, 4].into_iter()).unwrap();
        w.write_entry("run", [2u32].into_iter()).unwrap();
        assert_eq!(w.entries(), 2);

        // renaming a file over a non-empty directory fails
        fs::create_dir(&path).unwrap();
        fs::write(path.join("keep"), "").unwrap();
        let err = w.commit().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Io);
        assert!(!staging_path(&path).exists());
        assert!(path.join("keep").exists());
    }

    #[test]
    fn parse_rejects_malformed_lines() {
        assert!(parse_line("run").unwrap_err().contains("missing delimiter"));
        assert!(parse_line("run, x, 1").unwrap_err().contains("posting count"));
        assert!(parse_line("run, 1, one").unwrap_err().contains("posting id"));
        assert!(parse_line("run, 2, 1").unwrap_err().contains("declares 2"));
        assert!(parse_line("run, 2, 2, 1").unwrap_err().contains("ascending"));
        assert!(parse_line("run, 0").unwrap_err().contains("empty posting list"));
        assert!(parse_line(", 1, 1").unwrap_err().contains("missing term"));
        assert_eq!(
            parse_line("run, 2, 1, 2").unwrap(),
            IndexEntry { term: "run".into(), postings: vec![1, 2] }
        );
    }

    #[test]
    fn reader_reports_line_numbers_and_order() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("bad.csv");
        fs::write(&path, "run, 1, 1\nabc, 1, 3\n").unwrap();
        let results: Vec<_> = IndexReader::open(&path).unwrap().collect();
        assert!(results[0].is_ok());
        let err = results[1].as_ref().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Format);
        assert!(err.to_string().contains(":2:"));
    }

    #[test]
    fn sub_index_names_follow_block_number() {
        let paths = IndexPaths::new("/data/work");
        assert_eq!(paths.sub_index(3), PathBuf::from("/data/work/subIndex_3.csv"));
    }
}

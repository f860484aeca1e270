//! External sort: bounded-memory chunked sort with k-way merge of spilled runs.
//!
//! `Sort(keys)` has to tolerate an input larger than memory. The strategy is
//! the textbook one: read the input in bounded chunks, stable-sort each chunk
//! in memory by its composite key, and if more than one chunk was produced,
//! spill each sorted chunk ("run") to a temporary file and lazily k-way merge
//! them back together with a min-heap. A single-chunk input never touches
//! disk at all.

use crate::error::{GraphError, Result};
use crate::kernel::RowStream;
use crate::metrics::MetricsCollector;
use crate::value::{Row, Value};
use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;
use std::io::{BufReader, BufWriter, Read, Seek, SeekFrom, Write};
use tempfile::NamedTempFile;

/// Default number of rows buffered in memory per chunk before spilling.
pub const DEFAULT_CHUNK_ROWS: usize = 65_536;

/// Sorts a row stream ascending by a composite key, spilling to disk when the
/// input doesn't fit in one chunk.
///
/// Equal-key rows keep their relative input order (the sort is stable), and
/// an empty key list degenerates to a stable pass-through.
#[derive(Clone, Debug)]
pub struct ExternalSort {
    keys: Vec<String>,
    chunk_rows: usize,
}

impl ExternalSort {
    /// Build a sort over `keys` using the default chunk size.
    #[must_use]
    pub fn new(keys: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self::with_chunk_rows(keys, DEFAULT_CHUNK_ROWS)
    }

    /// Build a sort over `keys`, spilling every `chunk_rows` rows.
    #[must_use]
    pub fn with_chunk_rows(keys: impl IntoIterator<Item = impl Into<String>>, chunk_rows: usize) -> Self {
        Self {
            keys: keys.into_iter().map(Into::into).collect(),
            chunk_rows: chunk_rows.max(1),
        }
    }

    /// Sort `input`, returning a lazy stream of sorted rows.
    ///
    /// # Errors
    /// Returns an error if a row is missing a sort-key column, or if reading
    /// the input or spilling a run to disk fails.
    pub fn run(&self, input: RowStream) -> Result<RowStream> {
        self.run_with_metrics(input, None)
    }

    /// Like [`Self::run`], additionally incrementing `sort_runs_spilled` on `metrics` per spilled run.
    ///
    /// # Errors
    /// Same as [`Self::run`].
    pub fn run_with_metrics(&self, mut input: RowStream, metrics: Option<MetricsCollector>) -> Result<RowStream> {
        let mut runs: Vec<Run> = Vec::new();
        loop {
            let mut chunk = Vec::with_capacity(self.chunk_rows.min(4096));
            let mut exhausted = false;
            while chunk.len() < self.chunk_rows {
                match input.next() {
                    Some(Ok(row)) => chunk.push(row),
                    Some(Err(e)) => return Err(e),
                    None => {
                        exhausted = true;
                        break;
                    }
                }
            }
            if chunk.is_empty() {
                break;
            }
            let keyed = Self::keyed(&self.keys, chunk)?;
            let sorted = Self::stable_sort(keyed);
            if exhausted && runs.is_empty() {
                // Everything fit in one chunk: no spilling needed at all.
                let rows: Vec<Row> = sorted.into_iter().map(|(_, row)| row).collect();
                return Ok(Box::new(rows.into_iter().map(Ok)));
            }
            runs.push(Run::spill(sorted)?);
            if let Some(m) = &metrics {
                m.increment_counter("sort_runs_spilled", 1);
            }
            if exhausted {
                break;
            }
        }
        if runs.is_empty() {
            return Ok(Box::new(std::iter::empty()));
        }
        Ok(Box::new(RunMerge::new(runs, self.keys.clone())?))
    }

    fn keyed(keys: &[String], rows: Vec<Row>) -> Result<Vec<(Vec<Value>, Row)>> {
        rows.into_iter()
            .map(|row| {
                let key = row.composite_key(keys)?;
                Ok((key, row))
            })
            .collect()
    }

    fn stable_sort(mut keyed: Vec<(Vec<Value>, Row)>) -> Vec<(Vec<Value>, Row)> {
        keyed.sort_by(|a, b| a.0.cmp(&b.0));
        keyed
    }
}

/// One sorted, spilled chunk of rows, framed as length-prefixed `postcard` records.
struct Run {
    // Kept alive purely for its `Drop` impl, which deletes the backing file.
    _tmp: NamedTempFile,
    reader: BufReader<std::fs::File>,
}

impl Run {
    fn spill(sorted: Vec<(Vec<Value>, Row)>) -> Result<Self> {
        let tmp = NamedTempFile::new()?;
        {
            let mut writer = BufWriter::new(tmp.as_file());
            for (_, row) in &sorted {
                let bytes = postcard::to_stdvec(row)
                    .map_err(|e| GraphError::Io(std::io::Error::other(e.to_string())))?;
                writer.write_all(&(bytes.len() as u32).to_le_bytes())?;
                writer.write_all(&bytes)?;
            }
            writer.flush()?;
        }
        let mut file = tmp.reopen()?;
        file.seek(SeekFrom::Start(0))?;
        Ok(Self {
            _tmp: tmp,
            reader: BufReader::new(file),
        })
    }

    fn next_row(&mut self) -> Result<Option<Row>> {
        let mut len_buf = [0u8; 4];
        match self.reader.read_exact(&mut len_buf) {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => return Ok(None),
            Err(e) => return Err(e.into()),
        }
        let len = u32::from_le_bytes(len_buf) as usize;
        let mut buf = vec![0u8; len];
        self.reader.read_exact(&mut buf)?;
        let row: Row =
            postcard::from_bytes(&buf).map_err(|e| GraphError::Io(std::io::Error::other(e.to_string())))?;
        Ok(Some(row))
    }
}

struct HeapEntry {
    key: Vec<Value>,
    run: usize,
    row: Row,
}

impl PartialEq for HeapEntry {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key && self.run == other.run
    }
}
impl Eq for HeapEntry {}

impl PartialOrd for HeapEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for HeapEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        self.key.cmp(&other.key).then(self.run.cmp(&other.run))
    }
}

/// Lazily merges the sorted runs into one ascending stream, preserving stability by
/// breaking ties in favor of the earlier (lower-indexed) run.
///
/// Spilled rows carry no sort key of their own -- the composite key is
/// re-derived from each row's columns as it's read back, which keeps the
/// spill format to just the row itself.
struct RunMerge {
    runs: Vec<Run>,
    heap: BinaryHeap<Reverse<HeapEntry>>,
    keys: Vec<String>,
}

impl RunMerge {
    fn new(mut runs: Vec<Run>, keys: Vec<String>) -> Result<Self> {
        let mut heap = BinaryHeap::with_capacity(runs.len());
        for (i, run) in runs.iter_mut().enumerate() {
            if let Some(row) = run.next_row()? {
                let key = row.composite_key(&keys)?;
                heap.push(Reverse(HeapEntry { key, run: i, row }));
            }
        }
        Ok(Self { runs, heap, keys })
    }
}

impl Iterator for RunMerge {
    type Item = Result<Row>;

    fn next(&mut self) -> Option<Self::Item> {
        let Reverse(entry) = self.heap.pop()?;
        match self.runs[entry.run].next_row() {
            Ok(Some(next_row)) => {
                let key = match next_row.composite_key(&self.keys) {
                    Ok(k) => k,
                    Err(e) => return Some(Err(e)),
                };
                self.heap.push(Reverse(HeapEntry {
                    key,
                    run: entry.run,
                    row: next_row,
                }));
            }
            Ok(None) => {}
            Err(e) => return Some(Err(e)),
        }
        Some(Ok(entry.row))
    }
}

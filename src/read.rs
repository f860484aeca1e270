//! Source operators: [`ReadIter`] (named input factories) and [`Read`] (files).

use crate::error::{GraphError, Result};
use crate::kernel::RowStream;
use crate::value::Row;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// A zero-argument producer of a fresh row stream, supplied by the caller of [`crate::graph::Graph::run`].
pub type InputFactory = Arc<dyn Fn() -> RowStream + Send + Sync>;

/// The name-to-factory mapping passed to [`crate::graph::Graph::run`].
///
/// Every [`crate::graph::Operator::ReadIter`] node in the graph looks itself
/// up in this map at run time; a name with no entry is a
/// [`GraphError::MissingInput`].
pub type Inputs = std::collections::HashMap<String, InputFactory>;

/// Looks `name` up in `inputs` and invokes its factory.
///
/// # Errors
/// Returns [`GraphError::MissingInput`] if `name` has no entry in `inputs`.
pub fn read_iter(inputs: &Inputs, name: &str) -> Result<RowStream> {
    let factory = inputs
        .get(name)
        .ok_or_else(|| GraphError::MissingInput(name.to_string()))?;
    Ok(factory())
}

/// Opens `filename` and parses one row per line with `parser`.
///
/// The file is closed when the stream is exhausted or dropped early, since
/// the returned iterator owns the buffered reader directly.
///
/// # Errors
/// Returns [`GraphError::Io`] immediately if the file cannot be opened.
pub fn read_file(
    filename: impl AsRef<Path>,
    parser: Arc<dyn Fn(&str) -> Result<Row> + Send + Sync>,
) -> Result<RowStream> {
    let filename: PathBuf = filename.as_ref().to_path_buf();
    let file = std::fs::File::open(&filename)?;
    let lines = BufReader::new(file).lines();
    Ok(Box::new(FileRows { lines, parser }))
}

struct FileRows {
    lines: std::io::Lines<BufReader<std::fs::File>>,
    parser: Arc<dyn Fn(&str) -> Result<Row> + Send + Sync>,
}

impl Iterator for FileRows {
    type Item = Result<Row>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.lines.next()? {
            Ok(line) => Some((self.parser)(&line)),
            Err(e) => Some(Err(e.into())),
        }
    }
}

//! Newline-delimited JSON parsing and writing for [`Row`].
//!
//! The core graph engine is format-agnostic -- [`crate::read::Read`] takes any
//! `&str → Row` parser. This module is the parser the bundled demos (and most
//! real users) actually reach for: each line is one JSON object, each field
//! converted to a [`Value`] the obvious way (numbers, strings, bools, arrays,
//! `null`), with no type tags cluttering the file on disk.

use crate::error::{GraphError, Result};
use crate::kernel::RowStream;
use crate::utils::OrdF64;
use crate::value::{Row, Value};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

/// Parse one NDJSON line into a [`Row`].
///
/// # Errors
/// Returns [`GraphError::Parse`] if the line is not a JSON object, or holds a
/// value shape this crate's [`Value`] can't represent (e.g. a nested object).
pub fn parse_row(line: &str) -> Result<Row> {
    let parsed: serde_json::Value =
        serde_json::from_str(line).map_err(|e| GraphError::Parse(e.to_string()))?;
    let serde_json::Value::Object(fields) = parsed else {
        return Err(GraphError::Parse("NDJSON line must be a JSON object".to_string()));
    };
    fields
        .into_iter()
        .map(|(k, v)| Ok((k, json_to_value(v)?)))
        .collect::<Result<_>>()
        .map(Row)
}

/// Serialize a [`Row`] as one NDJSON line (no trailing newline).
///
/// # Errors
/// Returns [`GraphError::Parse`] if serialization fails.
pub fn write_row(row: &Row) -> Result<String> {
    let mut object = serde_json::Map::with_capacity(row.0.len());
    for (k, v) in &row.0 {
        object.insert(k.clone(), value_to_json(v));
    }
    serde_json::to_string(&serde_json::Value::Object(object)).map_err(|e| GraphError::Parse(e.to_string()))
}

fn json_to_value(v: serde_json::Value) -> Result<Value> {
    use serde_json::Value as J;
    Ok(match v {
        J::Null => Value::Null,
        J::Bool(b) => Value::Bool(b),
        J::Number(n) => {
            if let Some(i) = n.as_i64() {
                Value::Int(i)
            } else {
                Value::Float(OrdF64(n.as_f64().ok_or_else(|| {
                    GraphError::Parse(format!("unrepresentable number: {n}"))
                })?))
            }
        }
        J::String(s) => Value::Str(s),
        J::Array(items) => Value::Tuple(items.into_iter().map(json_to_value).collect::<Result<_>>()?),
        J::Object(_) => return Err(GraphError::Parse("nested JSON objects are not supported".to_string())),
    })
}

fn value_to_json(v: &Value) -> serde_json::Value {
    use serde_json::Value as J;
    match v {
        Value::Null => J::Null,
        Value::Bool(b) => J::Bool(*b),
        Value::Int(i) => J::Number((*i).into()),
        Value::Float(f) => serde_json::Number::from_f64(f.0).map_or(J::Null, J::Number),
        Value::Str(s) => J::String(s.clone()),
        Value::Timestamp(t) => J::String(t.to_rfc3339()),
        Value::Tuple(items) => J::Array(items.iter().map(value_to_json).collect()),
    }
}

/// Open `path` and parse it line by line as NDJSON.
///
/// # Errors
/// Returns [`GraphError::Io`] if the file cannot be opened.
pub fn read_ndjson_file(path: impl AsRef<Path>) -> Result<RowStream> {
    let file = std::fs::File::open(path)?;
    let lines = BufReader::new(file).lines();
    Ok(Box::new(lines.map(|line: std::io::Result<String>| -> Result<Row> {
        let line = line?;
        parse_row(&line)
    })))
}

/// Like [`read_ndjson_file`], but suited to an [`crate::read::InputFactory`]
/// closure, which cannot itself return a `Result`.
///
/// A file-open failure is deferred onto the stream itself as its first (and
/// only) element, rather than panicking the factory, so it surfaces to the
/// consumer at the same point every other row-level error does.
#[must_use]
pub fn open_rows(path: impl AsRef<Path>) -> RowStream {
    match read_ndjson_file(path) {
        Ok(stream) => stream,
        Err(e) => Box::new(std::iter::once(Err(e))),
    }
}

/// Drain `rows` to `path`, one JSON object per line.
///
/// # Errors
/// Returns an error from the first row the stream fails on, or an I/O error
/// creating/writing the file.
pub fn write_ndjson_file(path: impl AsRef<Path>, rows: RowStream) -> Result<usize> {
    let file = std::fs::File::create(path)?;
    let mut writer = BufWriter::new(file);
    let mut count = 0usize;
    for row in rows {
        let row = row?;
        writer.write_all(write_row(&row)?.as_bytes())?;
        writer.write_all(b"\n")?;
        count += 1;
    }
    writer.flush()?;
    Ok(count)
}

//! The dynamically typed [`Value`] and the open, schema-less [`Row`] record
//! built from it.
//!
//! Rows carry no schema: columns appear and disappear across operators, and
//! the same column name may hold different variants in different rows. What
//! the engine does require is a *total order* over whatever values actually
//! show up in a column used as a sort or group key -- see [`Value`]'s `Ord`
//! impl, which orders first by variant and then by payload.

use crate::error::{GraphError, Result};
use crate::utils::OrdF64;
use chrono::{DateTime, Utc};
use std::collections::HashMap;

/// A single dynamically typed cell value.
///
/// Mirrors the handful of shapes the bundled operators actually produce and
/// consume: integers, floats, text, booleans, UTC timestamps (`StringToDateTime`),
/// and fixed-length tuples (coordinate pairs for `HaversineDist`).
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize)]
pub enum Value {
    Null,
    Int(i64),
    Float(OrdF64),
    Str(String),
    Bool(bool),
    Timestamp(DateTime<Utc>),
    Tuple(Vec<Value>),
}

impl Value {
    /// Borrow the value as an `f64`, promoting an integer if needed.
    ///
    /// # Errors
    /// Returns [`GraphError::Type`] if the value is neither [`Value::Float`] nor [`Value::Int`].
    pub fn as_f64(&self, column: &str) -> Result<f64> {
        match self {
            Value::Float(f) => Ok(f.0),
            Value::Int(i) => Ok(*i as f64),
            other => Err(type_error(column, "number", other)),
        }
    }

    /// Borrow the value as an `i64`.
    ///
    /// # Errors
    /// Returns [`GraphError::Type`] if the value is not [`Value::Int`].
    pub fn as_i64(&self, column: &str) -> Result<i64> {
        match self {
            Value::Int(i) => Ok(*i),
            other => Err(type_error(column, "int", other)),
        }
    }

    /// Borrow the value as a string slice.
    ///
    /// # Errors
    /// Returns [`GraphError::Type`] if the value is not [`Value::Str`].
    pub fn as_str(&self, column: &str) -> Result<&str> {
        match self {
            Value::Str(s) => Ok(s.as_str()),
            other => Err(type_error(column, "string", other)),
        }
    }

    /// Borrow the value as a UTC timestamp.
    ///
    /// # Errors
    /// Returns [`GraphError::Type`] if the value is not [`Value::Timestamp`].
    pub fn as_timestamp(&self, column: &str) -> Result<DateTime<Utc>> {
        match self {
            Value::Timestamp(t) => Ok(*t),
            other => Err(type_error(column, "timestamp", other)),
        }
    }

    /// Borrow the value as a tuple of values (e.g. a `(lng, lat)` coordinate pair).
    ///
    /// # Errors
    /// Returns [`GraphError::Type`] if the value is not [`Value::Tuple`].
    pub fn as_tuple(&self, column: &str) -> Result<&[Value]> {
        match self {
            Value::Tuple(t) => Ok(t.as_slice()),
            other => Err(type_error(column, "tuple", other)),
        }
    }

    fn kind(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Str(_) => "string",
            Value::Bool(_) => "bool",
            Value::Timestamp(_) => "timestamp",
            Value::Tuple(_) => "tuple",
        }
    }
}

fn type_error(column: &str, expected: &str, got: &Value) -> GraphError {
    GraphError::Type {
        column: column.to_string(),
        message: format!("expected {expected}, found {}", got.kind()),
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(OrdF64(v))
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Str(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Str(v.to_string())
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(v: DateTime<Utc>) -> Self {
        Value::Timestamp(v)
    }
}

/// An open, unordered key/value record -- the unit of data flowing through a graph.
///
/// `Row` carries no schema: two rows flowing through the same operator may
/// have entirely different sets of keys. Cloning a `Row` is a deep clone of
/// its map, which is what mapper/reducer/joiner kernels rely on for their
/// "treat input as read-only, copy to mutate" policy (see [`crate::kernel::Mapper`]).
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Row(pub HashMap<String, Value>);

impl Row {
    /// An empty row.
    #[must_use]
    pub fn new() -> Self {
        Self(HashMap::new())
    }

    /// Look up a column, failing with [`GraphError::Key`] if it is absent.
    ///
    /// # Errors
    /// Returns [`GraphError::Key`] if `column` is not present in this row.
    pub fn get(&self, column: &str) -> Result<&Value> {
        self.0
            .get(column)
            .ok_or_else(|| GraphError::Key(column.to_string()))
    }

    /// Insert or overwrite a column.
    pub fn set(&mut self, column: impl Into<String>, value: impl Into<Value>) {
        self.0.insert(column.into(), value.into());
    }

    /// True if `column` is present.
    #[must_use]
    pub fn contains(&self, column: &str) -> bool {
        self.0.contains_key(column)
    }

    /// Remove and return a column's value, if present.
    pub fn remove(&mut self, column: &str) -> Option<Value> {
        self.0.remove(column)
    }

    /// Build the composite key `(row[k] for k in keys)` used for sorting, grouping, and joining.
    ///
    /// Missing key columns surface as [`GraphError::Key`] -- callers are
    /// required to sort/group by keys that are present on every row (see the
    /// Reduce/Join invariants in the graph module).
    ///
    /// # Errors
    /// Returns [`GraphError::Key`] if any of `keys` is missing from this row.
    pub fn composite_key(&self, keys: &[String]) -> Result<Vec<Value>> {
        keys.iter().map(|k| self.get(k).cloned()).collect()
    }
}

impl FromIterator<(String, Value)> for Row {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

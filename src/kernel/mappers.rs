//! Concrete [`Mapper`] kernels.

use super::Mapper;
use crate::error::{GraphError, Result};
use crate::utils::OrdF64;
use crate::value::{Row, Value};
use chrono::{NaiveDateTime, TimeZone, Utc};
use regex::Regex;
use std::sync::{Arc, OnceLock};

/// Passes every row through unchanged.
#[derive(Clone, Copy, Debug, Default)]
pub struct Identity;

impl Mapper for Identity {
    fn apply(&self, row: Row) -> Result<Vec<Row>> {
        Ok(vec![row])
    }
}

/// ASCII punctuation, matching Python's `string.punctuation`.
const PUNCTUATION: &str = "!\"#$%&'()*+,-./:;<=>?@[\\]^_`{|}~";

/// Strips ASCII punctuation out of a text column.
#[derive(Clone, Debug)]
pub struct FilterPunctuation {
    pub column: String,
}

impl FilterPunctuation {
    #[must_use]
    pub fn new(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
        }
    }
}

impl Mapper for FilterPunctuation {
    fn apply(&self, mut row: Row) -> Result<Vec<Row>> {
        let text = row.get(&self.column)?.as_str(&self.column)?;
        let cleaned: String = text.chars().filter(|c| !PUNCTUATION.contains(*c)).collect();
        row.set(self.column.clone(), cleaned);
        Ok(vec![row])
    }
}

/// Lower-cases a text column.
#[derive(Clone, Debug)]
pub struct LowerCase {
    pub column: String,
}

impl LowerCase {
    #[must_use]
    pub fn new(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
        }
    }
}

impl Mapper for LowerCase {
    fn apply(&self, mut row: Row) -> Result<Vec<Row>> {
        let lowered = row.get(&self.column)?.as_str(&self.column)?.to_lowercase();
        row.set(self.column.clone(), lowered);
        Ok(vec![row])
    }
}

fn default_split_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[\s+]").expect("static regex is valid"))
}

/// Splits a text column into one row per token, copying the rest of the row onto each.
///
/// Uses a custom separator regex if given, otherwise splits on runs of whitespace.
#[derive(Clone, Debug)]
pub struct Split {
    pub column: String,
    separator: Option<Regex>,
}

impl Split {
    #[must_use]
    pub fn new(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            separator: None,
        }
    }

    /// Use a custom separator regex instead of the default `[\s+]`.
    ///
    /// # Errors
    /// Returns an error if `separator` is not a valid regular expression.
    pub fn with_separator(column: impl Into<String>, separator: &str) -> Result<Self> {
        let re = Regex::new(separator)
            .map_err(|e| GraphError::Parse(format!("invalid Split separator: {e}")))?;
        Ok(Self {
            column: column.into(),
            separator: Some(re),
        })
    }

    fn regex(&self) -> &Regex {
        self.separator.as_ref().unwrap_or_else(|| default_split_regex())
    }
}

impl Mapper for Split {
    fn apply(&self, row: Row) -> Result<Vec<Row>> {
        let text = row.get(&self.column)?.as_str(&self.column)?.to_string();
        let mut out = Vec::new();
        let mut prev = 0usize;
        for m in self.regex().find_iter(&text) {
            let mut next = row.clone();
            next.set(self.column.clone(), text[prev..m.start()].to_string());
            out.push(next);
            prev = m.end();
        }
        if text.len() != prev {
            let mut last = row.clone();
            last.set(self.column.clone(), text[prev..].to_string());
            out.push(last);
        }
        Ok(out)
    }
}

/// Multiplies a set of numeric columns together into a new column.
///
/// Stays an integer product if every input column is an integer; promotes to
/// float as soon as any input column is a float.
#[derive(Clone, Debug)]
pub struct Product {
    pub columns: Vec<String>,
    pub result_column: String,
}

impl Product {
    #[must_use]
    pub fn new(columns: impl IntoIterator<Item = impl Into<String>>, result_column: impl Into<String>) -> Self {
        Self {
            columns: columns.into_iter().map(Into::into).collect(),
            result_column: result_column.into(),
        }
    }
}

impl Mapper for Product {
    fn apply(&self, mut row: Row) -> Result<Vec<Row>> {
        let mut int_product: i64 = 1;
        let mut float_product: f64 = 1.0;
        let mut all_int = true;
        for column in &self.columns {
            match row.get(column)? {
                Value::Int(n) => {
                    int_product *= n;
                    float_product *= *n as f64;
                }
                Value::Float(f) => {
                    all_int = false;
                    float_product *= f.0;
                }
                other => {
                    return Err(GraphError::Type {
                        column: column.clone(),
                        message: format!("expected number, found {other:?}"),
                    });
                }
            }
        }
        let result = if all_int {
            Value::Int(int_product)
        } else {
            Value::Float(OrdF64(float_product))
        };
        row.set(self.result_column.clone(), result);
        Ok(vec![row])
    }
}

/// Drops rows that don't satisfy a predicate.
pub struct Filter {
    condition: Arc<dyn Fn(&Row) -> bool + Send + Sync>,
}

impl Filter {
    pub fn new(condition: impl Fn(&Row) -> bool + Send + Sync + 'static) -> Self {
        Self {
            condition: Arc::new(condition),
        }
    }
}

impl Mapper for Filter {
    fn apply(&self, row: Row) -> Result<Vec<Row>> {
        if (self.condition)(&row) {
            Ok(vec![row])
        } else {
            Ok(Vec::new())
        }
    }
}

/// Keeps only the named columns.
#[derive(Clone, Debug)]
pub struct Project {
    pub columns: Vec<String>,
}

impl Project {
    #[must_use]
    pub fn new(columns: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            columns: columns.into_iter().map(Into::into).collect(),
        }
    }
}

impl Mapper for Project {
    fn apply(&self, row: Row) -> Result<Vec<Row>> {
        let mut out = Row::new();
        for column in &self.columns {
            out.set(column.clone(), row.get(column)?.clone());
        }
        Ok(vec![out])
    }
}

/// Drops the named columns, keeping everything else.
#[derive(Clone, Debug)]
pub struct Remove {
    pub columns: Vec<String>,
}

impl Remove {
    #[must_use]
    pub fn new(columns: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            columns: columns.into_iter().map(Into::into).collect(),
        }
    }
}

impl Mapper for Remove {
    fn apply(&self, mut row: Row) -> Result<Vec<Row>> {
        for column in &self.columns {
            row.remove(column);
        }
        Ok(vec![row])
    }
}

/// Applies an arbitrary function of several columns into a new column.
pub struct Apply {
    columns: Vec<String>,
    result_column: String,
    func: Arc<dyn Fn(&[Value]) -> Result<Value> + Send + Sync>,
}

impl Apply {
    pub fn new(
        columns: impl IntoIterator<Item = impl Into<String>>,
        result_column: impl Into<String>,
        func: impl Fn(&[Value]) -> Result<Value> + Send + Sync + 'static,
    ) -> Self {
        Self {
            columns: columns.into_iter().map(Into::into).collect(),
            result_column: result_column.into(),
            func: Arc::new(func),
        }
    }
}

impl Mapper for Apply {
    fn apply(&self, mut row: Row) -> Result<Vec<Row>> {
        let args: Vec<Value> = self
            .columns
            .iter()
            .map(|c| row.get(c).cloned())
            .collect::<Result<_>>()?;
        let result = (self.func)(&args)?;
        row.set(self.result_column.clone(), result);
        Ok(vec![row])
    }
}

/// Parses UTC timestamp columns out of strings shaped like `20240101T120000.000000`.
///
/// Tries `%Y%m%dT%H%M%S%.f` first, then falls back to `%Y%m%dT%H%M%S` for
/// timestamps with no fractional seconds.
#[derive(Clone, Debug)]
pub struct StringToDateTime {
    pub columns: Vec<String>,
}

impl StringToDateTime {
    #[must_use]
    pub fn new(columns: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            columns: columns.into_iter().map(Into::into).collect(),
        }
    }

    fn parse(column: &str, s: &str) -> Result<Value> {
        let naive = NaiveDateTime::parse_from_str(s, "%Y%m%dT%H%M%S%.f")
            .or_else(|_| NaiveDateTime::parse_from_str(s, "%Y%m%dT%H%M%S"))
            .map_err(|e| GraphError::Parse(format!("column `{column}`: {e}")))?;
        Ok(Value::Timestamp(Utc.from_utc_datetime(&naive)))
    }
}

impl Mapper for StringToDateTime {
    fn apply(&self, mut row: Row) -> Result<Vec<Row>> {
        for column in &self.columns {
            let s = row.get(column)?.as_str(column)?.to_string();
            let parsed = Self::parse(column, &s)?;
            row.set(column.clone(), parsed);
        }
        Ok(vec![row])
    }
}

const EARTH_RADIUS_KM: f64 = 6373.0;

/// Computes the great-circle distance in kilometers between two `(lng, lat)` points.
#[derive(Clone, Debug)]
pub struct HaversineDist {
    pub start: String,
    pub end: String,
    pub column: String,
}

impl HaversineDist {
    #[must_use]
    pub fn new(start: impl Into<String>, end: impl Into<String>, column: impl Into<String>) -> Self {
        Self {
            start: start.into(),
            end: end.into(),
            column: column.into(),
        }
    }

    fn coords(column: &str, value: &Value) -> Result<(f64, f64)> {
        let tuple = value.as_tuple(column)?;
        if tuple.len() != 2 {
            return Err(GraphError::Type {
                column: column.to_string(),
                message: format!("expected a 2-element (lng, lat) tuple, found {} elements", tuple.len()),
            });
        }
        Ok((tuple[0].as_f64(column)?, tuple[1].as_f64(column)?))
    }

    fn haversine(lng1: f64, lat1: f64, lng2: f64, lat2: f64) -> f64 {
        let (lat1, lng1, lat2, lng2) = (lat1.to_radians(), lng1.to_radians(), lat2.to_radians(), lng2.to_radians());
        let lat = lat2 - lat1;
        let lng = lng2 - lng1;
        let d = (lat * 0.5).sin().powi(2) + lat1.cos() * lat2.cos() * (lng * 0.5).sin().powi(2);
        2.0 * EARTH_RADIUS_KM * d.sqrt().asin()
    }
}

impl Mapper for HaversineDist {
    fn apply(&self, mut row: Row) -> Result<Vec<Row>> {
        let (lng1, lat1) = Self::coords(&self.start, row.get(&self.start)?)?;
        let (lng2, lat2) = Self::coords(&self.end, row.get(&self.end)?)?;
        let dist = Self::haversine(lng1, lat1, lng2, lat2);
        row.set(self.column.clone(), dist);
        Ok(vec![row])
    }
}

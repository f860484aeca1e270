//! Concrete [`Joiner`] kernels and the cartesian-product helper they share.

use super::Joiner;
use crate::error::Result;
use crate::value::Row;
use std::collections::HashSet;

/// Default suffix appended to a colliding non-key column from the left group.
pub const DEFAULT_SUFFIX_A: &str = "_1";
/// Default suffix appended to a colliding non-key column from the right group.
pub const DEFAULT_SUFFIX_B: &str = "_2";

/// The column-collision suffixes a [`Joiner`] tags non-key columns with when
/// the same name appears in both the left and right group.
#[derive(Clone, Debug)]
pub struct Suffixes {
    pub a: String,
    pub b: String,
}

impl Default for Suffixes {
    fn default() -> Self {
        Self {
            a: DEFAULT_SUFFIX_A.to_string(),
            b: DEFAULT_SUFFIX_B.to_string(),
        }
    }
}

impl Suffixes {
    #[must_use]
    pub fn new(a: impl Into<String>, b: impl Into<String>) -> Self {
        Self { a: a.into(), b: b.into() }
    }
}

/// The cartesian product of two row groups sharing the same join key.
///
/// Key columns are copied once from the left row. Columns that appear on
/// both sides but are not join keys are disambiguated with `suffixes.a`/`suffixes.b`;
/// columns unique to one side pass through verbatim. An empty right-hand
/// group produces no rows at all -- callers that want an empty-side
/// passthrough (left/right/outer joins) add it themselves.
#[must_use]
pub fn product_rows(keys: &[String], rows_a: &[Row], rows_b: &[Row], suffixes: &Suffixes) -> Vec<Row> {
    if rows_b.is_empty() {
        return Vec::new();
    }
    let key_set: HashSet<&str> = keys.iter().map(String::as_str).collect();
    let mut out = Vec::with_capacity(rows_a.len() * rows_b.len());
    for a in rows_a {
        let a_keys: HashSet<&str> = a.0.keys().map(String::as_str).collect();
        for b in rows_b {
            let b_keys: HashSet<&str> = b.0.keys().map(String::as_str).collect();
            let inter: HashSet<&str> = a_keys.intersection(&b_keys).copied().collect();

            let mut row = Row::new();
            for k in keys {
                if let Some(v) = a.0.get(k) {
                    row.set(k.clone(), v.clone());
                }
            }
            for k in inter.iter().filter(|k| !key_set.contains(*k)) {
                row.set(format!("{k}{}", suffixes.a), a.0[*k].clone());
                row.set(format!("{k}{}", suffixes.b), b.0[*k].clone());
            }
            for k in a_keys.difference(&inter) {
                row.set((*k).to_string(), a.0[*k].clone());
            }
            for k in b_keys.difference(&inter) {
                row.set((*k).to_string(), b.0[*k].clone());
            }
            out.push(row);
        }
    }
    out
}

/// Keeps only keys present on both sides.
#[derive(Clone, Debug, Default)]
pub struct InnerJoiner {
    suffixes: Suffixes,
}

impl InnerJoiner {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Use custom column-collision suffixes instead of `_1`/`_2`.
    #[must_use]
    pub fn with_suffixes(suffix_a: impl Into<String>, suffix_b: impl Into<String>) -> Self {
        Self {
            suffixes: Suffixes::new(suffix_a, suffix_b),
        }
    }
}

impl Joiner for InnerJoiner {
    fn join(&self, keys: &[String], left: Vec<Row>, right: Vec<Row>) -> Result<Vec<Row>> {
        Ok(product_rows(keys, &left, &right, &self.suffixes))
    }
}

/// Keeps every key, filling the missing side's columns with nothing (row passthrough).
#[derive(Clone, Debug, Default)]
pub struct OuterJoiner {
    suffixes: Suffixes,
}

impl OuterJoiner {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Use custom column-collision suffixes instead of `_1`/`_2`.
    #[must_use]
    pub fn with_suffixes(suffix_a: impl Into<String>, suffix_b: impl Into<String>) -> Self {
        Self {
            suffixes: Suffixes::new(suffix_a, suffix_b),
        }
    }
}

impl Joiner for OuterJoiner {
    fn join(&self, keys: &[String], left: Vec<Row>, right: Vec<Row>) -> Result<Vec<Row>> {
        let mut out = product_rows(keys, &left, &right, &self.suffixes);
        if left.is_empty() {
            out.extend(right);
        }
        if right.is_empty() {
            out.extend(left);
        }
        Ok(out)
    }
}

/// Keeps every left-hand key, dropping unmatched right-hand keys.
#[derive(Clone, Debug, Default)]
pub struct LeftJoiner {
    suffixes: Suffixes,
}

impl LeftJoiner {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Use custom column-collision suffixes instead of `_1`/`_2`.
    #[must_use]
    pub fn with_suffixes(suffix_a: impl Into<String>, suffix_b: impl Into<String>) -> Self {
        Self {
            suffixes: Suffixes::new(suffix_a, suffix_b),
        }
    }
}

impl Joiner for LeftJoiner {
    fn join(&self, keys: &[String], left: Vec<Row>, right: Vec<Row>) -> Result<Vec<Row>> {
        let mut out = product_rows(keys, &left, &right, &self.suffixes);
        if right.is_empty() {
            out.extend(left);
        }
        Ok(out)
    }
}

/// Keeps every right-hand key, dropping unmatched left-hand keys.
#[derive(Clone, Debug, Default)]
pub struct RightJoiner {
    suffixes: Suffixes,
}

impl RightJoiner {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Use custom column-collision suffixes instead of `_1`/`_2`.
    #[must_use]
    pub fn with_suffixes(suffix_a: impl Into<String>, suffix_b: impl Into<String>) -> Self {
        Self {
            suffixes: Suffixes::new(suffix_a, suffix_b),
        }
    }
}

impl Joiner for RightJoiner {
    fn join(&self, keys: &[String], left: Vec<Row>, right: Vec<Row>) -> Result<Vec<Row>> {
        let mut out = product_rows(keys, &left, &right, &self.suffixes);
        if left.is_empty() {
            out.extend(right);
        }
        Ok(out)
    }
}

//! Small utility types shared across the crate.

use std::cmp::Ordering;
use std::hash::{Hash, Hasher};

/// A wrapper around `f64` that implements `Eq`, `Ord`, and `Hash` by using
/// `total_cmp`/its bit pattern.
///
/// Rows carry dynamically typed values, and sort/group keys built from those
/// values need a total order even when a column holds floating-point numbers.
/// `f64` only implements `PartialOrd`, so every place the engine needs to
/// compare, hash, or heap-order a float goes through this wrapper instead.
///
/// # Examples
///
/// ```
/// use compgraph::utils::OrdF64;
/// use std::collections::BinaryHeap;
///
/// let mut heap = BinaryHeap::new();
/// heap.push(OrdF64(3.14));
/// heap.push(OrdF64(2.71));
/// heap.push(OrdF64(1.41));
///
/// assert_eq!(heap.pop().unwrap().0, 3.14);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct OrdF64(pub f64);

impl Eq for OrdF64 {}

impl PartialOrd for OrdF64 {
    #[inline]
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for OrdF64 {
    #[inline]
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

impl Hash for OrdF64 {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.to_bits().hash(state);
    }
}

impl From<f64> for OrdF64 {
    fn from(value: f64) -> Self {
        Self(value)
    }
}

impl From<OrdF64> for f64 {
    fn from(value: OrdF64) -> Self {
        value.0
    }
}

impl std::fmt::Display for OrdF64 {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

//! Kernel traits shared by every `Map`, `Reduce`, and `Join` operator.
//!
//! A kernel is the row-shaped logic an operator runs; the operator itself
//! (see [`crate::graph::Operator`]) owns the plumbing -- pulling from the
//! upstream stream, grouping, driving a sort-merge walk -- and hands rows to
//! the kernel one row or one group at a time.

pub mod joiners;
pub mod mappers;
pub mod reducers;

use crate::error::Result;
use crate::value::Row;

/// A lazily pulled, fallible stream of rows -- the currency every operator speaks.
pub type RowStream = Box<dyn Iterator<Item = Result<Row>>>;

/// Transforms a single row into zero or more rows.
///
/// Implementations that only ever emit at most one row (`Filter`, `Project`,
/// `LowerCase`, ...) just return a one- or zero-element `Vec`; `Split` is the
/// one bundled mapper that fans a row out into several.
pub trait Mapper: Send + Sync {
    /// Apply this mapper to one input row.
    ///
    /// # Errors
    /// Returns an error if the row is missing a column this mapper needs, or
    /// holds a column of the wrong type.
    fn apply(&self, row: Row) -> Result<Vec<Row>>;
}

/// Aggregates one group of rows that share a common key into zero or more output rows.
///
/// The graph runner groups a pre-sorted stream by key (see
/// [`crate::graph::Operator::Reduce`]) and calls `reduce` once per contiguous
/// group, so the whole group -- but never the whole stream -- is resident in
/// memory at once.
pub trait Reducer: Send + Sync {
    /// Aggregate one group of rows sharing `keys`.
    ///
    /// `keys` is the list of column names the group was formed on; `group` is
    /// every row in that group, in input order.
    ///
    /// # Errors
    /// Returns an error if a row in the group is missing a column this
    /// reducer needs, or holds a column of the wrong type.
    fn reduce(&self, keys: &[String], group: Vec<Row>) -> Result<Vec<Row>>;
}

/// Combines one group of left-hand rows with the matching group of right-hand rows.
///
/// The graph runner drives a sort-merge walk over two pre-sorted streams (see
/// [`crate::graph::Operator::Join`]) and calls `join` once per distinct key,
/// passing an empty `Vec` for whichever side has no rows at that key.
pub trait Joiner: Send + Sync {
    /// Combine the left and right groups for one join key.
    ///
    /// # Errors
    /// Returns an error if a row is missing a column this joiner needs.
    fn join(&self, keys: &[String], left: Vec<Row>, right: Vec<Row>) -> Result<Vec<Row>>;
}

//! Structured error kinds for graph construction and execution.
//!
//! The engine distinguishes a handful of error kinds so callers can match on
//! *why* a run failed rather than parse a message string: a malformed graph,
//! a source name missing from the inputs passed to [`crate::graph::Graph::run`],
//! a parser callback failing, a row missing a column an operator needs, a
//! column holding a value of the wrong type, or an I/O failure while reading
//! a source file or spilling a sort run.
//!
//! All of these surface to the consumer of the output stream at the point of
//! the offending row; nothing is retried or silently skipped.

use thiserror::Error;

/// Every way a graph can fail to build or run.
#[derive(Debug, Error)]
pub enum GraphError {
    /// `run` was invoked without a factory for a name a [`Read`](crate::graph::Operator::ReadIter) node requires.
    #[error("missing input stream `{0}`")]
    MissingInput(String),

    /// The graph is malformed at run time (e.g. a join node missing its right-hand side).
    #[error("graph structure error: {0}")]
    GraphStructure(String),

    /// A user-supplied parser, or a built-in parser such as `StringToDateTime`, failed.
    #[error("parse error: {0}")]
    Parse(String),

    /// An operator looked up a column that the row does not carry.
    #[error("row missing key `{0}`")]
    Key(String),

    /// An operator received a value of an unexpected variant for a column.
    #[error("unexpected type for column `{column}`: {message}")]
    Type { column: String, message: String },

    /// Opening, reading, or spilling to a file failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// The `Result` alias used throughout the crate's public API.
pub type Result<T> = std::result::Result<T, GraphError>;

//! # compgraph
//!
//! A **computational-graph library** for declarative, single-process batch
//! row dataflows. A [`Graph`] is an immutable description of how named row
//! streams get mapped, grouped, sorted, and joined; nothing runs until you
//! call [`Graph::run`], and the same graph can be run any number of times
//! against any number of input bindings.
//!
//! ## Key Features
//!
//! - **Purely functional graph construction** - every builder method returns
//!   a new [`Graph`], sharing structure with an `Arc` rather than mutating in
//!   place
//! - **Lazy, pull-based execution** - rows flow one at a time through the
//!   operator chain; nothing is buffered beyond what a single `Reduce`/`Join`
//!   group or `Sort` chunk requires
//! - **Schema-less rows** - [`Row`] is an open `String → Value` map; columns
//!   appear and disappear as they pass through operators
//! - **Sort-merge grouping and joining** - [`Reduce`](Operator::Reduce) and
//!   [`Join`](Operator::Join) both assume pre-sorted input and share the same
//!   grouping primitive
//! - **External sort** - [`ExternalSort`] tolerates inputs larger than memory,
//!   spilling to temp files and merging lazily
//! - **Bundled domain graphs** - [`recipes`] ships ready-made graphs for word
//!   counting, TF-IDF, PMI, and mean-speed-by-time-window
//!
//! ## Quick Start
//!
//! ```
//! use compgraph::graph::{self, Graph};
//! use compgraph::kernel::mappers::{FilterPunctuation, LowerCase, Split};
//! use compgraph::kernel::reducers::Count;
//! use compgraph::read::Inputs;
//! use compgraph::value::Row;
//!
//! # fn main() -> anyhow::Result<()> {
//! let graph = Graph::from_iter("lines")
//!     .map(FilterPunctuation::new("text"))
//!     .map(LowerCase::new("text"))
//!     .map(Split::new("text"))
//!     .sort(["text"])
//!     .reduce(Count::new("count"), ["text"]);
//!
//! fn lines() -> compgraph::kernel::RowStream {
//!     let rows: Vec<_> = ["hello world", "hello rust"]
//!         .iter()
//!         .map(|line| {
//!             let mut row = Row::new();
//!             row.set("text", *line);
//!             Ok(row)
//!         })
//!         .collect();
//!     Box::new(rows.into_iter())
//! }
//!
//! let mut inputs = Inputs::new();
//! inputs.insert("lines".to_string(), graph::input(lines));
//!
//! let counted: Vec<_> = graph.run(&inputs)?.collect::<Result<_, _>>()?;
//! assert_eq!(counted.len(), 3);
//! # Ok(())
//! # }
//! ```
//!
//! ## Core Concepts
//!
//! ### `Row` and `Value`
//!
//! A [`Row`] is a `HashMap<String, Value>` with no fixed schema. A [`Value`]
//! is one of a handful of dynamically typed variants (integers, floats,
//! strings, booleans, UTC timestamps, and tuples), ordered and hashable so
//! that any column can serve as a sort or group key.
//!
//! ### `Graph`
//!
//! A [`Graph`] is an immutable linked structure of [`Operator`] nodes. Source
//! nodes ([`Operator::ReadIter`], [`Operator::Read`]) have no upstream;
//! [`Operator::Map`], [`Operator::Reduce`], and [`Operator::Sort`] have one
//! upstream (`prev`); [`Operator::Join`] has two (`prev` and `side`). Building
//! a graph never executes anything -- only [`Graph::run`] does, by resolving
//! the tree into a lazy [`kernel::RowStream`].
//!
//! ### Kernels
//!
//! The actual row-transforming logic lives behind three small traits in
//! [`kernel`]: [`kernel::Mapper`], [`kernel::Reducer`], and [`kernel::Joiner`].
//! Concrete implementations of each live in [`kernel::mappers`],
//! [`kernel::reducers`], and [`kernel::joiners`] respectively, and custom ones
//! are just another type implementing the trait.
//!
//! ### Sort-merge grouping and joining
//!
//! [`Operator::Reduce`] and [`Operator::Join`] both require their inputs to
//! already be sorted ascending by the group/join keys -- the graph never
//! inserts an implicit sort. Use [`Graph::sort`] (backed by [`ExternalSort`])
//! to establish that ordering.
//!
//! ## Error Handling
//!
//! Every fallible operation in this crate returns [`error::Result`], built on
//! [`error::GraphError`] via [`thiserror`]. A [`GraphError::MissingInput`]
//! means a [`Graph::run`] call referenced a [`Graph::from_iter`] name with no
//! matching entry in the [`read::Inputs`] map; [`GraphError::GraphStructure`]
//! means the graph itself is malformed (a join missing a side, say);
//! [`GraphError::Type`] and [`GraphError::Key`] surface from the row-level
//! kernels when a column is absent or holds the wrong variant; [`GraphError::Io`]
//! wraps file and temp-storage failures. Errors halt the stream at the
//! offending row -- there is no retry or silent-skip policy anywhere in this
//! crate.
//!
//! ## Metrics
//!
//! [`Graph::run_with_metrics`] accepts a [`metrics::MetricsCollector`] that
//! accumulates execution counters (`sort_runs_spilled`, `groups_reduced`,
//! `join_groups`) as the graph runs.
//!
//! ## Module Overview
//!
//! - [`value`] - [`Value`] and [`Row`], the data model every operator speaks
//! - [`error`] - [`error::GraphError`] and the crate's [`error::Result`] alias
//! - [`graph`] - [`Graph`], [`Operator`], and the runner that resolves a graph
//!   into a row stream
//! - [`kernel`] - the [`kernel::Mapper`]/[`kernel::Reducer`]/[`kernel::Joiner`]
//!   traits and their bundled implementations
//! - [`sort`] - [`ExternalSort`], the bounded-memory chunk-and-merge sort
//! - [`read`] - source operators: named input factories and line-oriented file reads
//! - [`ndjson`] - newline-delimited JSON parsing/writing at the crate's example boundary
//! - [`recipes`] - ready-made domain graphs (word count, TF-IDF, PMI, mean speed)
//! - [`metrics`] - execution counters, gauges, and histograms

pub mod error;
pub mod graph;
pub mod kernel;
pub mod metrics;
pub mod ndjson;
pub mod node_id;
pub mod read;
pub mod recipes;
pub mod sort;
pub mod utils;
pub mod value;

pub use error::{GraphError, Result};
pub use graph::{input, Graph, GraphNode, Operator};
pub use kernel::{Joiner, Mapper, Reducer, RowStream};
pub use node_id::NodeId;
pub use read::Inputs;
pub use sort::ExternalSort;
pub use utils::OrdF64;
pub use value::{Row, Value};

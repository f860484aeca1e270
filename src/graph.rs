//! The graph: an immutable linked structure of operators, plus the runner
//! that resolves it into a lazy row stream.
//!
//! A [`Graph`] is built purely functionally -- every combinator
//! ([`Graph::map`], [`Graph::reduce`], [`Graph::sort`], [`Graph::join`])
//! returns a brand-new `Graph` wrapping the receiver; nothing is ever mutated
//! in place, and nothing is executed until [`Graph::run`] is called. This is
//! what lets the same `Graph` be run multiple times, or shared between two
//! downstream graphs (its only owner is an `Arc`).

use crate::error::{GraphError, Result};
use crate::kernel::{Joiner, Mapper, Reducer, RowStream};
use crate::metrics::MetricsCollector;
use crate::node_id::NodeId;
use crate::read::{self, InputFactory, Inputs};
use crate::sort::ExternalSort;
use crate::value::{Row, Value};
use std::collections::VecDeque;
use std::path::PathBuf;
use std::sync::Arc;

/// The operator a [`GraphNode`] wraps.
///
/// See the module invariants on [`GraphNode`]: `Read`/`ReadIter` never carry
/// `prev`/`side`, `Map`/`Reduce`/`Sort` carry only `prev`, and `Join` carries both.
pub enum Operator {
    /// Looks `name` up in the inputs map supplied to [`Graph::run`].
    ReadIter(String),
    /// Reads and parses a file line by line.
    Read {
        filename: PathBuf,
        parser: Arc<dyn Fn(&str) -> Result<Row> + Send + Sync>,
    },
    /// Flattens a [`Mapper`] over every upstream row.
    Map(Arc<dyn Mapper>),
    /// Groups the upstream stream by `keys` and folds each group with a [`Reducer`].
    Reduce { reducer: Arc<dyn Reducer>, keys: Vec<String> },
    /// Externally sorts the upstream stream ascending by `keys`.
    Sort { keys: Vec<String> },
    /// Sort-merge joins `prev` (left) with `side` (right) on `keys`.
    Join { joiner: Arc<dyn Joiner>, keys: Vec<String> },
}

/// One immutable node in a graph: an operator plus its upstream node(s).
pub struct GraphNode {
    id: NodeId,
    op: Operator,
    prev: Option<Graph>,
    side: Option<Graph>,
}

impl GraphNode {
    /// The node's debug identity.
    #[must_use]
    pub fn id(&self) -> NodeId {
        self.id
    }

    /// This node's operator.
    #[must_use]
    pub fn operator(&self) -> &Operator {
        &self.op
    }
}

/// A handle to an immutable graph of operators.
///
/// Cloning a `Graph` is cheap (an `Arc` bump): clones share the same
/// underlying node, which is exactly what lets one graph feed two different
/// downstream joins.
#[derive(Clone)]
pub struct Graph(Arc<GraphNode>);

impl Graph {
    fn wrap(op: Operator, prev: Option<Graph>, side: Option<Graph>) -> Self {
        Self(Arc::new(GraphNode {
            id: NodeId::next(),
            op,
            prev,
            side,
        }))
    }

    /// A source node that, at run time, looks `name` up in the inputs map
    /// passed to [`Graph::run`].
    #[must_use]
    pub fn from_iter(name: impl Into<String>) -> Self {
        Self::wrap(Operator::ReadIter(name.into()), None, None)
    }

    /// A source node that reads `filename` line by line, applying `parser` to each line.
    #[must_use]
    pub fn from_file(
        filename: impl Into<PathBuf>,
        parser: impl Fn(&str) -> Result<Row> + Send + Sync + 'static,
    ) -> Self {
        Self::wrap(
            Operator::Read {
                filename: filename.into(),
                parser: Arc::new(parser),
            },
            None,
            None,
        )
    }

    /// Appends a `Map` node applying `mapper` to every row.
    #[must_use]
    pub fn map(&self, mapper: impl Mapper + 'static) -> Self {
        Self::wrap(Operator::Map(Arc::new(mapper)), Some(self.clone()), None)
    }

    /// Appends a `Reduce` node grouping by `keys` and folding each group with `reducer`.
    ///
    /// The upstream stream must already be sorted by `keys` -- see [`Graph::sort`].
    #[must_use]
    pub fn reduce(&self, reducer: impl Reducer + 'static, keys: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self::wrap(
            Operator::Reduce {
                reducer: Arc::new(reducer),
                keys: keys.into_iter().map(Into::into).collect(),
            },
            Some(self.clone()),
            None,
        )
    }

    /// Appends a `Sort` node ordering ascending by the composite key `keys`.
    #[must_use]
    pub fn sort(&self, keys: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self::wrap(
            Operator::Sort {
                keys: keys.into_iter().map(Into::into).collect(),
            },
            Some(self.clone()),
            None,
        )
    }

    /// Appends a `Join` node combining this graph (left) with `other` (right) on `keys`.
    ///
    /// Both sides must already be sorted ascending by `keys` -- see [`Graph::sort`].
    #[must_use]
    pub fn join(&self, joiner: impl Joiner + 'static, other: &Graph, keys: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self::wrap(
            Operator::Join {
                joiner: Arc::new(joiner),
                keys: keys.into_iter().map(Into::into).collect(),
            },
            Some(self.clone()),
            Some(other.clone()),
        )
    }

    /// The root node of this graph.
    #[must_use]
    pub fn node(&self) -> &GraphNode {
        &self.0
    }

    /// Resolves the graph into a lazy row stream, given the named input factories it references.
    ///
    /// # Errors
    /// Returns [`GraphError::MissingInput`] if a `ReadIter` node names a
    /// source absent from `inputs`; [`GraphError::GraphStructure`] if the
    /// graph is malformed (a unary op missing `prev`, or a join missing
    /// `prev`/`side`); any error an upstream operator or kernel raises while
    /// materializing rows propagates unchanged.
    pub fn run(&self, inputs: &Inputs) -> Result<RowStream> {
        self.run_with_metrics(inputs, None)
    }

    /// Like [`Graph::run`], additionally recording ambient execution counters on `metrics`.
    ///
    /// # Errors
    /// Same as [`Graph::run`].
    pub fn run_with_metrics(&self, inputs: &Inputs, metrics: Option<MetricsCollector>) -> Result<RowStream> {
        run_node(&self.0, inputs, &metrics)
    }
}

fn require_prev<'a>(node: &'a GraphNode, what: &str) -> Result<&'a Graph> {
    node.prev
        .as_ref()
        .ok_or_else(|| GraphError::GraphStructure(format!("{what} node missing its upstream graph")))
}

fn run_node(node: &GraphNode, inputs: &Inputs, metrics: &Option<MetricsCollector>) -> Result<RowStream> {
    match &node.op {
        Operator::ReadIter(name) => read::read_iter(inputs, name),
        Operator::Read { filename, parser } => read::read_file(filename, parser.clone()),
        Operator::Map(mapper) => {
            let prev = require_prev(node, "Map")?;
            let upstream = run_node(&prev.0, inputs, metrics)?;
            Ok(map_stream(upstream, mapper.clone()))
        }
        Operator::Reduce { reducer, keys } => {
            let prev = require_prev(node, "Reduce")?;
            let upstream = run_node(&prev.0, inputs, metrics)?;
            Ok(reduce_stream(upstream, reducer.clone(), keys.clone(), metrics.clone()))
        }
        Operator::Sort { keys } => {
            let prev = require_prev(node, "Sort")?;
            let upstream = run_node(&prev.0, inputs, metrics)?;
            ExternalSort::new(keys.clone()).run_with_metrics(upstream, metrics.clone())
        }
        Operator::Join { joiner, keys } => {
            let prev = require_prev(node, "Join")?;
            let side = node
                .side
                .as_ref()
                .ok_or_else(|| GraphError::GraphStructure("Join node missing its right-hand graph".to_string()))?;
            let left = run_node(&prev.0, inputs, metrics)?;
            let right = run_node(&side.0, inputs, metrics)?;
            Ok(join_stream(left, right, joiner.clone(), keys.clone(), metrics.clone()))
        }
    }
}

/// Registers `name` so `ReadIter(name)` nodes resolve to `factory` at run time.
#[must_use]
pub fn input(factory: impl Fn() -> RowStream + Send + Sync + 'static) -> InputFactory {
    Arc::new(factory)
}

// ---- Map ----

struct MapStream {
    inner: RowStream,
    mapper: Arc<dyn Mapper>,
    buffer: VecDeque<Row>,
    done: bool,
}

impl Iterator for MapStream {
    type Item = Result<Row>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(row) = self.buffer.pop_front() {
                return Some(Ok(row));
            }
            if self.done {
                return None;
            }
            match self.inner.next() {
                None => {
                    self.done = true;
                    return None;
                }
                Some(Err(e)) => {
                    self.done = true;
                    return Some(Err(e));
                }
                Some(Ok(row)) => match self.mapper.apply(row) {
                    Ok(rows) => self.buffer.extend(rows),
                    Err(e) => {
                        self.done = true;
                        return Some(Err(e));
                    }
                },
            }
        }
    }
}

fn map_stream(inner: RowStream, mapper: Arc<dyn Mapper>) -> RowStream {
    Box::new(MapStream {
        inner,
        mapper,
        buffer: VecDeque::new(),
        done: false,
    })
}

// ---- Sort-merge grouping, shared by Reduce and Join ----

/// Groups a stream already sorted by `keys` into contiguous `(key, rows)` runs.
///
/// If `keys` is empty every row shares the single composite key `[]`, so the
/// whole stream becomes one group.
struct GroupedRows {
    inner: std::iter::Peekable<RowStream>,
    keys: Vec<String>,
    failed: bool,
}

impl GroupedRows {
    fn new(inner: RowStream, keys: Vec<String>) -> Self {
        Self {
            inner: inner.peekable(),
            keys,
            failed: false,
        }
    }
}

impl Iterator for GroupedRows {
    type Item = Result<(Vec<Value>, Vec<Row>)>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        let first = match self.inner.next()? {
            Ok(row) => row,
            Err(e) => {
                self.failed = true;
                return Some(Err(e));
            }
        };
        let key = match first.composite_key(&self.keys) {
            Ok(k) => k,
            Err(e) => {
                self.failed = true;
                return Some(Err(e));
            }
        };
        let mut group = vec![first];
        loop {
            match self.inner.peek() {
                None => break,
                Some(Err(_)) => {
                    let e = self.inner.next().unwrap().unwrap_err();
                    self.failed = true;
                    return Some(Err(e));
                }
                Some(Ok(row)) => {
                    let next_key = match row.composite_key(&self.keys) {
                        Ok(k) => k,
                        Err(e) => {
                            self.failed = true;
                            return Some(Err(e));
                        }
                    };
                    if next_key != key {
                        break;
                    }
                }
            }
            group.push(self.inner.next().unwrap().unwrap());
        }
        Some(Ok((key, group)))
    }
}

// ---- Reduce ----

struct ReduceStream {
    groups: GroupedRows,
    reducer: Arc<dyn Reducer>,
    keys: Vec<String>,
    buffer: VecDeque<Row>,
    done: bool,
    metrics: Option<MetricsCollector>,
}

impl Iterator for ReduceStream {
    type Item = Result<Row>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(row) = self.buffer.pop_front() {
                return Some(Ok(row));
            }
            if self.done {
                return None;
            }
            match self.groups.next() {
                None => {
                    self.done = true;
                    return None;
                }
                Some(Err(e)) => {
                    self.done = true;
                    return Some(Err(e));
                }
                Some(Ok((_, group))) => {
                    if let Some(m) = &self.metrics {
                        m.increment_counter("groups_reduced", 1);
                    }
                    match self.reducer.reduce(&self.keys, group) {
                        Ok(rows) => self.buffer.extend(rows),
                        Err(e) => {
                            self.done = true;
                            return Some(Err(e));
                        }
                    }
                }
            }
        }
    }
}

fn reduce_stream(
    inner: RowStream,
    reducer: Arc<dyn Reducer>,
    keys: Vec<String>,
    metrics: Option<MetricsCollector>,
) -> RowStream {
    Box::new(ReduceStream {
        groups: GroupedRows::new(inner, keys.clone()),
        reducer,
        keys,
        buffer: VecDeque::new(),
        done: false,
        metrics,
    })
}

// ---- Join (sort-merge driver) ----

struct JoinStream {
    left: std::iter::Peekable<GroupedRows>,
    right: std::iter::Peekable<GroupedRows>,
    joiner: Arc<dyn Joiner>,
    keys: Vec<String>,
    buffer: VecDeque<Row>,
    done: bool,
    metrics: Option<MetricsCollector>,
}

impl JoinStream {
    fn emit(&mut self, left: Vec<Row>, right: Vec<Row>) -> Result<()> {
        if let Some(m) = &self.metrics {
            m.increment_counter("join_groups", 1);
        }
        let rows = self.joiner.join(&self.keys, left, right)?;
        self.buffer.extend(rows);
        Ok(())
    }
}

impl Iterator for JoinStream {
    type Item = Result<Row>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(row) = self.buffer.pop_front() {
                return Some(Ok(row));
            }
            if self.done {
                return None;
            }

            let left_key = match self.left.peek() {
                Some(Ok((k, _))) => Some(k.clone()),
                Some(Err(_)) => {
                    let Some(Err(e)) = self.left.next() else { unreachable!() };
                    self.done = true;
                    return Some(Err(e));
                }
                None => None,
            };
            let right_key = match self.right.peek() {
                Some(Ok((k, _))) => Some(k.clone()),
                Some(Err(_)) => {
                    let Some(Err(e)) = self.right.next() else { unreachable!() };
                    self.done = true;
                    return Some(Err(e));
                }
                None => None,
            };

            let step = match (left_key, right_key) {
                (None, None) => {
                    self.done = true;
                    return None;
                }
                (Some(_), None) => {
                    let (_, group) = self.left.next().unwrap().unwrap();
                    self.emit(group, Vec::new())
                }
                (None, Some(_)) => {
                    let (_, group) = self.right.next().unwrap().unwrap();
                    self.emit(Vec::new(), group)
                }
                (Some(lk), Some(rk)) => match lk.cmp(&rk) {
                    std::cmp::Ordering::Less => {
                        let (_, group) = self.left.next().unwrap().unwrap();
                        self.emit(group, Vec::new())
                    }
                    std::cmp::Ordering::Greater => {
                        let (_, group) = self.right.next().unwrap().unwrap();
                        self.emit(Vec::new(), group)
                    }
                    std::cmp::Ordering::Equal => {
                        let (_, lgroup) = self.left.next().unwrap().unwrap();
                        let (_, rgroup) = self.right.next().unwrap().unwrap();
                        self.emit(lgroup, rgroup)
                    }
                },
            };
            if let Err(e) = step {
                self.done = true;
                return Some(Err(e));
            }
        }
    }
}

fn join_stream(
    left: RowStream,
    right: RowStream,
    joiner: Arc<dyn Joiner>,
    keys: Vec<String>,
    metrics: Option<MetricsCollector>,
) -> RowStream {
    Box::new(JoinStream {
        left: GroupedRows::new(left, keys.clone()).peekable(),
        right: GroupedRows::new(right, keys.clone()).peekable(),
        joiner,
        keys,
        buffer: VecDeque::new(),
        done: false,
        metrics,
    })
}

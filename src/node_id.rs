//! Lightweight unique identifier for nodes within a [`Graph`](crate::graph::Graph).
//!
//! Each [`GraphNode`](crate::graph::GraphNode) is assigned a sequential `NodeId`
//! when constructed. The graph itself never inspects these ids -- they exist
//! purely so `Debug` output and diagnostics can refer to "node 7" instead of
//! an address, and so tests can assert a graph was built with the expected
//! number of operators.

use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_ID: AtomicU64 = AtomicU64::new(0);

/// Unique numeric identifier for a node in a graph.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct NodeId(u64);

impl NodeId {
    /// Allocate the next `NodeId` in process-global sequence.
    pub(crate) fn next() -> Self {
        Self(NEXT_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// Return the underlying numeric value.
    ///
    /// Useful mainly for debugging or logging.
    #[must_use]
    pub fn raw(&self) -> u64 {
        self.0
    }
}

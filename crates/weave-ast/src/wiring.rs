//! Wiring graph - the resolved connections of a configuration.
//!
//! Uses `petgraph::DiGraph` with:
//! - Nodes: [`Endpoint`] (an interface/function pair)
//! - Edges: caller → callee wiring, no payload
//!
//! Nodes are looked up by structural endpoint equality through a side
//! index, never by the identity of the declarations involved.

use petgraph::Direction;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use rustc_hash::FxHashMap;
use weave_core::DeclId;

/// One wireable port.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Endpoint {
    /// The interface reference, or `None` for a bare command/event.
    pub interface: Option<DeclId>,
    /// The command/event, or `None` when a whole interface is wired.
    pub function: Option<DeclId>,
}

impl Endpoint {
    /// A single command or event of an interface.
    pub fn new(interface: Option<DeclId>, function: Option<DeclId>) -> Self {
        Self {
            interface,
            function,
        }
    }

    /// A whole interface.
    pub fn interface(interface: DeclId) -> Self {
        Self::new(Some(interface), None)
    }

    /// A bare command or event.
    pub fn function(function: DeclId) -> Self {
        Self::new(None, Some(function))
    }
}

/// Directed graph over endpoints.
#[derive(Debug, Clone, Default)]
pub struct WiringGraph {
    graph: DiGraph<Endpoint, ()>,
    index: FxHashMap<Endpoint, NodeIndex>,
}

impl WiringGraph {
    /// Create an empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Find the node for an endpoint.
    pub fn find(&self, endpoint: &Endpoint) -> Option<NodeIndex> {
        self.index.get(endpoint).copied()
    }

    /// Get the node for an endpoint, creating it if needed.
    pub fn endpoint_lookup(&mut self, endpoint: Endpoint) -> NodeIndex {
        if let Some(node) = self.find(&endpoint) {
            return node;
        }
        let node = self.graph.add_node(endpoint);
        self.index.insert(endpoint, node);
        node
    }

    /// The endpoint stored at a node.
    pub fn endpoint(&self, node: NodeIndex) -> Option<&Endpoint> {
        self.graph.node_weight(node)
    }

    /// Add a caller → callee edge between two nodes.
    ///
    /// An edge between the same pair is stored once.
    pub fn add_edge(&mut self, from: NodeIndex, to: NodeIndex) {
        self.graph.update_edge(from, to, ());
    }

    /// Wire two endpoints, creating their nodes as needed.
    pub fn connect(&mut self, from: Endpoint, to: Endpoint) {
        let from = self.endpoint_lookup(from);
        let to = self.endpoint_lookup(to);
        self.add_edge(from, to);
    }

    /// Whether an edge exists between two endpoints.
    pub fn is_connected(&self, from: &Endpoint, to: &Endpoint) -> bool {
        match (self.find(from), self.find(to)) {
            (Some(from), Some(to)) => self.graph.contains_edge(from, to),
            _ => false,
        }
    }

    /// All node indices.
    pub fn nodes(&self) -> impl Iterator<Item = NodeIndex> + '_ {
        self.graph.node_indices()
    }

    /// Callee nodes of a node.
    pub fn successors(&self, node: NodeIndex) -> impl Iterator<Item = NodeIndex> + '_ {
        self.graph
            .edges_directed(node, Direction::Outgoing)
            .map(|edge| edge.target())
    }

    /// Every edge as an endpoint pair.
    pub fn edges(&self) -> impl Iterator<Item = (Endpoint, Endpoint)> + '_ {
        self.graph
            .edge_references()
            .map(|edge| (self.graph[edge.source()], self.graph[edge.target()]))
    }

    /// Number of endpoint nodes.
    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Number of edges.
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Whether the graph has no nodes.
    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }
}

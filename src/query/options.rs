//! Per-algorithm option structs produced by translation

use super::filter::{FilterOptions, StmtTypeFilter};
use crate::graph::{InteractionGraph, NodeKey, WeightKey};
use crate::results::Node;
use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

type EdgeFn<T> = dyn Fn(&InteractionGraph, &NodeKey, &NodeKey) -> T + Send + Sync;

/// Edge admissibility predicate handed to a traversal engine
#[derive(Clone)]
pub struct EdgePredicate(Arc<EdgeFn<bool>>);

impl EdgePredicate {
    pub fn new(f: impl Fn(&InteractionGraph, &NodeKey, &NodeKey) -> bool + Send + Sync + 'static) -> Self {
        Self(Arc::new(f))
    }

    pub fn admits(&self, graph: &InteractionGraph, u: &NodeKey, v: &NodeKey) -> bool {
        (self.0)(graph, u, v)
    }
}

impl fmt::Debug for EdgePredicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("EdgePredicate(..)")
    }
}

/// Edge scoring callback: `(matching reference count, total references)`
#[derive(Clone)]
pub struct RefCountsFn(Arc<EdgeFn<(u64, u64)>>);

impl RefCountsFn {
    pub fn new(
        f: impl Fn(&InteractionGraph, &NodeKey, &NodeKey) -> (u64, u64) + Send + Sync + 'static,
    ) -> Self {
        Self(Arc::new(f))
    }

    pub fn counts(&self, graph: &InteractionGraph, u: &NodeKey, v: &NodeKey) -> (u64, u64) {
        (self.0)(graph, u, v)
    }
}

impl fmt::Debug for RefCountsFn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("RefCountsFn(..)")
    }
}

/// Point-to-point shortest simple paths
#[derive(Debug, Clone)]
pub struct ShortestSimplePathOptions {
    pub source: NodeKey,
    pub target: NodeKey,
    pub weight: Option<WeightKey>,
    pub ignore_nodes: HashSet<NodeKey>,
    pub ignore_edges: HashSet<(NodeKey, NodeKey)>,
    /// Statement hashes with context support
    pub hashes: Option<HashSet<i64>>,
    pub ref_counts_function: Option<RefCountsFn>,
    /// Only traverse edges supported by `hashes`
    pub strict_mesh_id_filtering: bool,
    pub const_c: u32,
    pub const_tk: u32,
}

impl ShortestSimplePathOptions {
    pub fn between(source: NodeKey, target: NodeKey) -> Self {
        Self {
            source,
            target,
            weight: None,
            ignore_nodes: HashSet::new(),
            ignore_edges: HashSet::new(),
            hashes: None,
            ref_counts_function: None,
            strict_mesh_id_filtering: false,
            const_c: 1,
            const_tk: 10,
        }
    }
}

/// Open breadth-first search
#[derive(Debug, Clone)]
pub struct BreadthFirstSearchOptions {
    pub source_node: NodeKey,
    pub reverse: bool,
    pub depth_limit: usize,
    pub path_limit: Option<usize>,
    pub max_per_node: usize,
    /// Lowercased namespaces nodes must belong to
    pub node_filter: Vec<String>,
    pub node_blacklist: HashSet<NodeKey>,
    pub terminal_ns: Vec<String>,
    pub sign: Option<u8>,
    /// Cap on queued partial paths
    pub max_memory: usize,
    pub hashes: Option<HashSet<i64>>,
    pub allow_edge: Option<EdgePredicate>,
    pub edge_filter: Option<EdgePredicate>,
    pub strict_mesh_id_filtering: bool,
}

impl BreadthFirstSearchOptions {
    pub fn from_node(source_node: NodeKey) -> Self {
        Self {
            source_node,
            reverse: false,
            depth_limit: 2,
            path_limit: None,
            max_per_node: 5,
            node_filter: Vec::new(),
            node_blacklist: HashSet::new(),
            terminal_ns: Vec::new(),
            sign: None,
            max_memory: 1 << 29,
            hashes: None,
            allow_edge: None,
            edge_filter: None,
            strict_mesh_id_filtering: false,
        }
    }
}

/// Open weighted search
#[derive(Debug, Clone)]
pub struct DijkstraOptions {
    pub start: NodeKey,
    pub reverse: bool,
    pub path_limit: Option<usize>,
    pub hashes: Option<HashSet<i64>>,
    pub ignore_nodes: HashSet<NodeKey>,
    pub ignore_edges: HashSet<(NodeKey, NodeKey)>,
    pub terminal_ns: Vec<String>,
    pub weight: Option<WeightKey>,
    pub ref_counts_function: Option<RefCountsFn>,
    pub const_c: u32,
    pub const_tk: u32,
}

impl DijkstraOptions {
    pub fn from_node(start: NodeKey) -> Self {
        Self {
            start,
            reverse: false,
            path_limit: None,
            hashes: None,
            ignore_nodes: HashSet::new(),
            ignore_edges: HashSet::new(),
            terminal_ns: Vec::new(),
            weight: None,
            ref_counts_function: None,
            const_c: 1,
            const_tk: 10,
        }
    }
}

/// Neighbor filters shared by shared-interactor and multi-interactor search,
/// applied in field order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NeighborFilters {
    pub node_blacklist: HashSet<NodeKey>,
    /// Lowercased namespaces
    pub allowed_ns: Vec<String>,
    pub stmt_types: StmtTypeFilter,
    pub curated_db_only: bool,
    pub hash_blacklist: HashSet<i64>,
    pub belief_cutoff: f64,
    /// Lowercased evidence sources
    pub source_filter: Vec<String>,
}

impl NeighborFilters {
    /// Statement-level part of these filters, for materializing the
    /// statements on edges that passed the neighbor search
    pub fn statement_options(&self) -> FilterOptions {
        FilterOptions {
            stmt_types: self.stmt_types.clone(),
            belief_cutoff: self.belief_cutoff,
            curated_db_only: self.curated_db_only,
            ..FilterOptions::default()
        }
    }
}

/// Shared targets or shared regulators of two entities
#[derive(Debug, Clone)]
pub struct SharedInteractorsOptions {
    pub source: NodeKey,
    pub target: NodeKey,
    pub max_results: usize,
    pub regulators: bool,
    pub sign: Option<u8>,
    pub filters: NeighborFilters,
}

/// Common ontology ancestors of two grounded entities
#[derive(Debug, Clone, PartialEq)]
pub struct OntologyOptions {
    pub source_ns: String,
    pub source_id: String,
    pub target_ns: String,
    pub target_id: String,
    pub max_paths: usize,
    pub immediate_only: bool,
    /// Relations to follow; `None` follows all
    pub is_a_part_of: Option<HashSet<String>>,
}

/// Entities available in the graph for an induced subgraph
#[derive(Debug, Clone, PartialEq)]
pub struct SubgraphOptions {
    pub nodes: Vec<Node>,
}

/// Common neighbors of every entity in a list
#[derive(Debug, Clone)]
pub struct MultiInteractorsOptions {
    pub nodes: Vec<NodeKey>,
    pub downstream: bool,
    pub max_results: usize,
    pub filters: NeighborFilters,
}

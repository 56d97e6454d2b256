//! Read-only directed interaction graph

use super::edge::{EdgeAttrs, WeightKey};
use super::node::{NodeAttrs, NodeKey};
use std::collections::HashMap;

const NO_NEIGHBORS: &[NodeKey] = &[];

/// A directed graph of entities connected by statement-supported edges.
///
/// Successor and predecessor lists keep insertion order, so every
/// neighbor iteration is deterministic. The graph is built once and then
/// shared read-only between searches.
#[derive(Debug, Clone, Default)]
pub struct InteractionGraph {
    signed: bool,
    node_attrs: HashMap<NodeKey, NodeAttrs>,
    node_order: Vec<NodeKey>,
    succ: HashMap<NodeKey, Vec<NodeKey>>,
    pred: HashMap<NodeKey, Vec<NodeKey>>,
    edges: HashMap<NodeKey, HashMap<NodeKey, EdgeAttrs>>,
    node_by_ns_id: HashMap<(String, String), String>,
    edge_by_hash: HashMap<i64, (NodeKey, NodeKey)>,
}

impl InteractionGraph {
    /// Create an empty unsigned graph
    pub fn unsigned() -> Self {
        Self::default()
    }

    /// Create an empty signed-node graph
    pub fn signed() -> Self {
        Self {
            signed: true,
            ..Self::default()
        }
    }

    pub fn is_signed(&self) -> bool {
        self.signed
    }

    /// Add (or re-annotate) a node
    pub fn add_node(&mut self, key: NodeKey, attrs: NodeAttrs) {
        self.node_by_ns_id
            .insert((attrs.ns.clone(), attrs.id.clone()), key.name.clone());
        self.touch(&key);
        self.node_attrs.insert(key, attrs);
    }

    /// Add a directed edge, replacing the attributes of an existing one.
    ///
    /// Endpoints missing from the graph are added without grounding
    /// attributes.
    pub fn add_edge(&mut self, source: NodeKey, target: NodeKey, attrs: EdgeAttrs) {
        self.touch(&source);
        self.touch(&target);
        for stmt in &attrs.statements {
            self.edge_by_hash
                .insert(stmt.stmt_hash, (source.clone(), target.clone()));
        }
        let out = self.edges.entry(source.clone()).or_default();
        if out.insert(target.clone(), attrs).is_none() {
            self.succ.entry(source.clone()).or_default().push(target.clone());
            self.pred.entry(target).or_default().push(source);
        }
    }

    fn touch(&mut self, key: &NodeKey) {
        if !self.succ.contains_key(key) {
            self.succ.insert(key.clone(), Vec::new());
            self.pred.insert(key.clone(), Vec::new());
            self.node_order.push(key.clone());
        }
    }

    pub fn contains_node(&self, key: &NodeKey) -> bool {
        self.succ.contains_key(key)
    }

    /// Namespace and identifier of a node, if it is grounded
    pub fn node_attrs(&self, key: &NodeKey) -> Option<&NodeAttrs> {
        self.node_attrs.get(key)
    }

    /// Graph name of the entity with the given namespace and identifier
    pub fn name_by_ns_id(&self, ns: &str, id: &str) -> Option<&str> {
        self.node_by_ns_id
            .get(&(ns.to_string(), id.to_string()))
            .map(String::as_str)
    }

    pub fn successors(&self, key: &NodeKey) -> &[NodeKey] {
        self.succ.get(key).map(Vec::as_slice).unwrap_or(NO_NEIGHBORS)
    }

    pub fn predecessors(&self, key: &NodeKey) -> &[NodeKey] {
        self.pred.get(key).map(Vec::as_slice).unwrap_or(NO_NEIGHBORS)
    }

    /// Successors when `reverse` is false, predecessors otherwise
    pub fn neighbors(&self, key: &NodeKey, reverse: bool) -> &[NodeKey] {
        if reverse {
            self.predecessors(key)
        } else {
            self.successors(key)
        }
    }

    pub fn edge(&self, source: &NodeKey, target: &NodeKey) -> Option<&EdgeAttrs> {
        self.edges.get(source)?.get(target)
    }

    pub fn has_edge(&self, source: &NodeKey, target: &NodeKey) -> bool {
        self.edge(source, target).is_some()
    }

    /// The edge a statement hash supports
    pub fn edge_by_hash(&self, hash: i64) -> Option<&(NodeKey, NodeKey)> {
        self.edge_by_hash.get(&hash)
    }

    /// Total degree of a node: in plus out, summing the weight attribute
    /// when a key is given (edges lacking the attribute count 1)
    pub fn degree(&self, key: &NodeKey, weight: Option<WeightKey>) -> f64 {
        let edge_value = |attrs: &EdgeAttrs| match weight {
            Some(w) => attrs.attr(w).unwrap_or(1.0),
            None => 1.0,
        };
        let out: f64 = self
            .successors(key)
            .iter()
            .filter_map(|t| self.edge(key, t))
            .map(edge_value)
            .sum();
        let inc: f64 = self
            .predecessors(key)
            .iter()
            .filter_map(|s| self.edge(s, key))
            .map(edge_value)
            .sum();
        out + inc
    }

    /// Nodes in insertion order
    pub fn nodes(&self) -> impl Iterator<Item = &NodeKey> {
        self.node_order.iter()
    }

    /// Edges in adjacency order
    pub fn edges(&self) -> impl Iterator<Item = (&NodeKey, &NodeKey, &EdgeAttrs)> {
        self.node_order.iter().flat_map(move |s| {
            self.successors(s)
                .iter()
                .filter_map(move |t| self.edge(s, t).map(|attrs| (s, t, attrs)))
        })
    }

    pub fn node_count(&self) -> usize {
        self.node_order.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.values().map(HashMap::len).sum()
    }
}

//! Induced subgraph extraction

use crate::graph::{InteractionGraph, NodeKey};
use std::collections::HashSet;

/// Edges with both endpoints among `nodes`, in adjacency order of the
/// input nodes
pub fn induced_subgraph_edges(graph: &InteractionGraph, nodes: &[NodeKey]) -> Vec<(NodeKey, NodeKey)> {
    let members: HashSet<&NodeKey> = nodes.iter().collect();
    let mut seen: HashSet<&NodeKey> = HashSet::new();
    let mut edges = Vec::new();
    for node in nodes {
        if !seen.insert(node) {
            continue;
        }
        for succ in graph.successors(node) {
            if members.contains(succ) {
                edges.push((node.clone(), succ.clone()));
            }
        }
    }
    edges
}

//! Shortest simple paths between two nodes, cheapest first

use super::cost::EdgeCost;
use super::{path_is_clear, CullFeedback, PathStream};
use crate::graph::{InteractionGraph, NodeKey};
use crate::query::ShortestSimplePathOptions;
use std::cmp::{Ordering, Reverse};
use std::collections::{BinaryHeap, HashSet};
use tracing::warn;

#[derive(Debug)]
struct Candidate {
    cost: f64,
    seq: u64,
    path: Vec<NodeKey>,
}

impl PartialEq for Candidate {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Candidate {}

impl PartialOrd for Candidate {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Candidate {
    fn cmp(&self, other: &Self) -> Ordering {
        self.cost
            .total_cmp(&other.cost)
            .then(self.seq.cmp(&other.seq))
    }
}

/// Best-first enumeration of simple paths from source to target.
///
/// Partial paths are expanded in cost order, so complete paths come out
/// cheapest first; ties keep discovery order. Culled nodes and edges take
/// effect on every candidate popped afterwards.
pub struct SimplePaths<'g> {
    graph: &'g InteractionGraph,
    target: NodeKey,
    cost: EdgeCost,
    allowed_hashes: Option<HashSet<i64>>,
    ignore_nodes: HashSet<NodeKey>,
    ignore_edges: HashSet<(NodeKey, NodeKey)>,
    frontier: BinaryHeap<Reverse<Candidate>>,
    max_frontier: usize,
    seq: u64,
    capped: bool,
}

impl<'g> SimplePaths<'g> {
    pub fn new(graph: &'g InteractionGraph, options: &ShortestSimplePathOptions, max_frontier: usize) -> Self {
        let allowed_hashes = if options.strict_mesh_id_filtering {
            options.hashes.clone()
        } else {
            None
        };
        let mut frontier = BinaryHeap::new();
        if graph.contains_node(&options.source) && graph.contains_node(&options.target) {
            frontier.push(Reverse(Candidate {
                cost: 0.0,
                seq: 0,
                path: vec![options.source.clone()],
            }));
        }
        Self {
            graph,
            target: options.target.clone(),
            cost: EdgeCost::new(
                options.weight,
                options.ref_counts_function.as_ref(),
                options.const_c,
                options.const_tk,
            ),
            allowed_hashes,
            ignore_nodes: options.ignore_nodes.clone(),
            ignore_edges: options.ignore_edges.clone(),
            frontier,
            max_frontier,
            seq: 1,
            capped: false,
        }
    }

    fn edge_allowed(&self, u: &NodeKey, v: &NodeKey) -> bool {
        if self.ignore_nodes.contains(v) || self.ignore_edges.contains(&(u.clone(), v.clone())) {
            return false;
        }
        match &self.allowed_hashes {
            Some(hashes) => self
                .graph
                .edge(u, v)
                .map_or(false, |attrs| attrs.statements.iter().any(|s| hashes.contains(&s.stmt_hash))),
            None => true,
        }
    }

    fn expand(&mut self, candidate: &Candidate) {
        let Some(last) = candidate.path.last() else {
            return;
        };
        for next in self.graph.successors(last) {
            if candidate.path.contains(next) || !self.edge_allowed(last, next) {
                continue;
            }
            if self.frontier.len() >= self.max_frontier {
                if !self.capped {
                    warn!(max_frontier = self.max_frontier, "shortest paths frontier is full");
                    self.capped = true;
                }
                return;
            }
            let mut path = candidate.path.clone();
            path.push(next.clone());
            self.frontier.push(Reverse(Candidate {
                cost: candidate.cost + self.cost.of(self.graph, last, next),
                seq: self.seq,
                path,
            }));
            self.seq += 1;
        }
    }
}

impl PathStream for SimplePaths<'_> {
    fn truncated(&self) -> bool {
        self.capped
    }

    fn next_path(&mut self) -> Option<Vec<NodeKey>> {
        while let Some(Reverse(candidate)) = self.frontier.pop() {
            if !path_is_clear(&candidate.path, &self.ignore_nodes, &self.ignore_edges) {
                continue;
            }
            if candidate.path.last() == Some(&self.target) {
                return Some(candidate.path);
            }
            self.expand(&candidate);
        }
        None
    }

    fn resume_with(&mut self, feedback: CullFeedback) -> Option<Vec<NodeKey>> {
        self.ignore_nodes.extend(feedback.ignore_nodes);
        self.ignore_edges.extend(feedback.ignore_edges);
        self.next_path()
    }
}

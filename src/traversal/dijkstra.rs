//! Open weighted search from a single node

use super::cost::EdgeCost;
use super::{path_is_clear, CullFeedback, PathStream};
use crate::graph::{InteractionGraph, NodeKey};
use crate::query::DijkstraOptions;
use std::cmp::{Ordering, Reverse};
use std::collections::{BinaryHeap, HashMap, HashSet};

#[derive(Debug)]
struct Frontier {
    cost: f64,
    seq: u64,
    node: NodeKey,
}

impl PartialEq for Frontier {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Frontier {}

impl PartialOrd for Frontier {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Frontier {
    fn cmp(&self, other: &Self) -> Ordering {
        self.cost
            .total_cmp(&other.cost)
            .then(self.seq.cmp(&other.seq))
    }
}

/// Dijkstra from a start node, yielding the cheapest path to each node as
/// it is settled.
///
/// Paths start at the start node. With `reverse`, predecessors are
/// followed and each path runs against edge direction.
pub struct OpenDijkstraPaths<'g> {
    graph: &'g InteractionGraph,
    start: NodeKey,
    reverse: bool,
    path_limit: Option<usize>,
    terminal_ns: Vec<String>,
    cost: EdgeCost,
    ignore_nodes: HashSet<NodeKey>,
    ignore_edges: HashSet<(NodeKey, NodeKey)>,
    dist: HashMap<NodeKey, f64>,
    pred: HashMap<NodeKey, NodeKey>,
    settled: HashSet<NodeKey>,
    heap: BinaryHeap<Reverse<Frontier>>,
    seq: u64,
    yielded: usize,
}

impl<'g> OpenDijkstraPaths<'g> {
    pub fn new(graph: &'g InteractionGraph, options: &DijkstraOptions) -> Self {
        let mut heap = BinaryHeap::new();
        let mut dist = HashMap::new();
        if graph.contains_node(&options.start) {
            dist.insert(options.start.clone(), 0.0);
            heap.push(Reverse(Frontier {
                cost: 0.0,
                seq: 0,
                node: options.start.clone(),
            }));
        }
        Self {
            graph,
            start: options.start.clone(),
            reverse: options.reverse,
            path_limit: options.path_limit,
            terminal_ns: options.terminal_ns.iter().map(|ns| ns.to_lowercase()).collect(),
            cost: EdgeCost::new(
                options.weight,
                options.ref_counts_function.as_ref(),
                options.const_c,
                options.const_tk,
            ),
            ignore_nodes: options.ignore_nodes.clone(),
            ignore_edges: options.ignore_edges.clone(),
            dist,
            pred: HashMap::new(),
            settled: HashSet::new(),
            heap,
            seq: 1,
            yielded: 0,
        }
    }

    fn is_terminal(&self, key: &NodeKey) -> bool {
        !self.terminal_ns.is_empty()
            && self
                .graph
                .node_attrs(key)
                .map_or(false, |a| self.terminal_ns.contains(&a.ns.to_lowercase()))
    }

    fn path_to(&self, node: &NodeKey) -> Vec<NodeKey> {
        let mut path = vec![node.clone()];
        let mut current = node;
        while let Some(prev) = self.pred.get(current) {
            path.push(prev.clone());
            current = prev;
        }
        path.reverse();
        path
    }

    fn relax(&mut self, node: &NodeKey, base: f64) {
        for next in self.graph.neighbors(node, self.reverse) {
            if self.settled.contains(next) || self.ignore_nodes.contains(next) {
                continue;
            }
            let (u, v) = if self.reverse { (next, node) } else { (node, next) };
            if self.ignore_edges.contains(&(u.clone(), v.clone())) {
                continue;
            }
            let candidate = base + self.cost.of(self.graph, u, v);
            if self.dist.get(next).map_or(true, |d| candidate < *d) {
                self.dist.insert(next.clone(), candidate);
                self.pred.insert(next.clone(), node.clone());
                self.heap.push(Reverse(Frontier {
                    cost: candidate,
                    seq: self.seq,
                    node: next.clone(),
                }));
                self.seq += 1;
            }
        }
    }
}

impl PathStream for OpenDijkstraPaths<'_> {
    fn next_path(&mut self) -> Option<Vec<NodeKey>> {
        if self.path_limit.map_or(false, |limit| self.yielded >= limit) {
            return None;
        }
        while let Some(Reverse(item)) = self.heap.pop() {
            if self.settled.contains(&item.node) {
                continue;
            }
            if item.node != self.start && self.ignore_nodes.contains(&item.node) {
                continue;
            }
            let path = self.path_to(&item.node);
            if !path_is_clear(&path, &self.ignore_nodes, &self.ignore_edges) {
                continue;
            }
            self.settled.insert(item.node.clone());
            let is_start = item.node == self.start;
            let terminal = !is_start && self.is_terminal(&item.node);
            if !terminal {
                self.relax(&item.node, item.cost);
            }
            if is_start || (!self.terminal_ns.is_empty() && !terminal) {
                continue;
            }
            self.yielded += 1;
            return Some(path);
        }
        None
    }

    fn resume_with(&mut self, feedback: CullFeedback) -> Option<Vec<NodeKey>> {
        self.ignore_nodes.extend(feedback.ignore_nodes);
        self.ignore_edges.extend(feedback.ignore_edges);
        self.next_path()
    }
}

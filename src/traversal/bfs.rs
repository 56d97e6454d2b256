//! Open breadth-first path search

use super::{path_is_clear, CullFeedback, PathStream};
use crate::graph::{InteractionGraph, NodeKey, INT_PLUS};
use crate::query::{BreadthFirstSearchOptions, EdgePredicate};
use std::collections::{HashSet, VecDeque};
use tracing::warn;

/// Breadth-first enumeration of simple paths leaving (or, reversed,
/// entering) a start node.
///
/// Paths are yielded in order of length. With `reverse`, each path starts
/// at the start node and walks predecessors.
pub struct BreadthFirstPaths<'g> {
    graph: &'g InteractionGraph,
    reverse: bool,
    depth_limit: usize,
    path_limit: Option<usize>,
    max_per_node: usize,
    node_filter: Vec<String>,
    node_blacklist: HashSet<NodeKey>,
    terminal_ns: Vec<String>,
    sign: Option<u8>,
    max_memory: usize,
    allowed_hashes: Option<HashSet<i64>>,
    allow_edge: Option<EdgePredicate>,
    edge_filter: Option<EdgePredicate>,
    ignore_nodes: HashSet<NodeKey>,
    ignore_edges: HashSet<(NodeKey, NodeKey)>,
    queue: VecDeque<Vec<NodeKey>>,
    yielded: usize,
    capped: bool,
}

impl<'g> BreadthFirstPaths<'g> {
    pub fn new(graph: &'g InteractionGraph, options: &BreadthFirstSearchOptions) -> Self {
        let mut queue = VecDeque::new();
        if graph.contains_node(&options.source_node) {
            queue.push_back(vec![options.source_node.clone()]);
        }
        let allowed_hashes = if options.strict_mesh_id_filtering {
            options.hashes.clone()
        } else {
            None
        };
        Self {
            graph,
            reverse: options.reverse,
            depth_limit: options.depth_limit,
            path_limit: options.path_limit,
            max_per_node: options.max_per_node,
            node_filter: options.node_filter.iter().map(|ns| ns.to_lowercase()).collect(),
            node_blacklist: options.node_blacklist.clone(),
            terminal_ns: options.terminal_ns.iter().map(|ns| ns.to_lowercase()).collect(),
            sign: options.sign,
            max_memory: options.max_memory,
            allowed_hashes,
            allow_edge: options.allow_edge.clone(),
            edge_filter: options.edge_filter.clone(),
            ignore_nodes: HashSet::new(),
            ignore_edges: HashSet::new(),
            queue,
            yielded: 0,
            capped: false,
        }
    }

    fn ns_of(&self, key: &NodeKey) -> Option<String> {
        self.graph.node_attrs(key).map(|a| a.ns.to_lowercase())
    }

    fn is_terminal(&self, key: &NodeKey) -> bool {
        !self.terminal_ns.is_empty()
            && self
                .ns_of(key)
                .map_or(false, |ns| self.terminal_ns.contains(&ns))
    }

    fn admits_child(&self, path: &[NodeKey], last: &NodeKey, child: &NodeKey) -> bool {
        if path.contains(child) || self.node_blacklist.contains(child) || self.ignore_nodes.contains(child) {
            return false;
        }
        if !self.node_filter.is_empty()
            && !self
                .ns_of(child)
                .map_or(false, |ns| self.node_filter.contains(&ns))
        {
            return false;
        }
        let (u, v) = if self.reverse { (child, last) } else { (last, child) };
        if self.ignore_edges.contains(&(u.clone(), v.clone())) {
            return false;
        }
        if let Some(hashes) = &self.allowed_hashes {
            let supported = self
                .graph
                .edge(u, v)
                .map_or(false, |attrs| attrs.statements.iter().any(|s| hashes.contains(&s.stmt_hash)));
            if !supported {
                return false;
            }
        }
        self.allow_edge.as_ref().map_or(true, |p| p.admits(self.graph, u, v))
            && self.edge_filter.as_ref().map_or(true, |p| p.admits(self.graph, u, v))
    }

    /// Queue at most `max_per_node` extensions of `path`. The budget is per
    /// path prefix, so a node reached along two prefixes is expanded under
    /// each.
    fn expand(&mut self, path: &[NodeKey]) {
        let Some(last) = path.last() else {
            return;
        };
        let mut count = 0;
        for child in self.graph.neighbors(last, self.reverse) {
            if !self.admits_child(path, last, child) {
                continue;
            }
            if count >= self.max_per_node {
                break;
            }
            if self.queue.len() >= self.max_memory {
                if !self.capped {
                    warn!(max_memory = self.max_memory, "breadth-first queue is full");
                    self.capped = true;
                }
                return;
            }
            count += 1;
            let mut next = path.to_vec();
            next.push(child.clone());
            self.queue.push_back(next);
        }
    }

    fn yieldable(&self, leaf: &NodeKey) -> bool {
        if !self.terminal_ns.is_empty() && !self.is_terminal(leaf) {
            return false;
        }
        match self.sign {
            // upstream leaves are sources, which must act positively
            Some(_) if self.reverse => leaf.sign == Some(INT_PLUS),
            Some(sign) => leaf.sign == Some(sign),
            None => true,
        }
    }
}

impl PathStream for BreadthFirstPaths<'_> {
    fn truncated(&self) -> bool {
        self.capped
    }

    fn next_path(&mut self) -> Option<Vec<NodeKey>> {
        loop {
            if self.path_limit.map_or(false, |limit| self.yielded >= limit) {
                return None;
            }
            let path = self.queue.pop_front()?;
            if !path_is_clear(&path, &self.ignore_nodes, &self.ignore_edges) {
                continue;
            }
            let depth = path.len() - 1;
            let Some(leaf) = path.last().cloned() else {
                continue;
            };
            let terminal = depth > 0 && self.is_terminal(&leaf);
            if depth < self.depth_limit && !terminal {
                self.expand(&path);
            }
            if depth > 0 && self.yieldable(&leaf) {
                self.yielded += 1;
                return Some(path);
            }
        }
    }

    fn resume_with(&mut self, feedback: CullFeedback) -> Option<Vec<NodeKey>> {
        self.ignore_nodes.extend(feedback.ignore_nodes);
        self.ignore_edges.extend(feedback.ignore_edges);
        self.next_path()
    }
}

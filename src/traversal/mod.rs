//! Path traversal engines
//!
//! Engines produce lazy path sequences. The consumer pulls one path at a
//! time and may send [`CullFeedback`] with a pull; feedback always applies
//! to the path returned by that same pull.

mod bfs;
mod cost;
mod dijkstra;
mod simple_paths;

use crate::graph::{InteractionGraph, NodeKey};
use crate::query::{BreadthFirstSearchOptions, DijkstraOptions, ShortestSimplePathOptions};
use std::collections::{HashSet, VecDeque};

pub use bfs::BreadthFirstPaths;
pub use dijkstra::OpenDijkstraPaths;
pub use simple_paths::SimplePaths;

/// Nodes and edges to exclude from the rest of a traversal
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CullFeedback {
    pub ignore_nodes: HashSet<NodeKey>,
    pub ignore_edges: HashSet<(NodeKey, NodeKey)>,
}

impl CullFeedback {
    pub fn nodes(ignore_nodes: HashSet<NodeKey>) -> Self {
        Self {
            ignore_nodes,
            ignore_edges: HashSet::new(),
        }
    }
}

/// A lazy, pull-based sequence of paths
pub trait PathStream {
    /// Next path, or `None` when exhausted
    fn next_path(&mut self) -> Option<Vec<NodeKey>>;

    /// Apply feedback, then produce the next path
    fn resume_with(&mut self, feedback: CullFeedback) -> Option<Vec<NodeKey>>;

    /// Whether partial paths were dropped at a memory cap, so the sequence
    /// may be missing paths
    fn truncated(&self) -> bool {
        false
    }
}

/// Paths from a fixed list; feedback is recorded but has no effect
#[derive(Debug, Clone, Default)]
pub struct FixedPaths {
    paths: VecDeque<Vec<NodeKey>>,
    feedback: Vec<CullFeedback>,
}

impl FixedPaths {
    pub fn new(paths: impl IntoIterator<Item = Vec<NodeKey>>) -> Self {
        Self {
            paths: paths.into_iter().collect(),
            feedback: Vec::new(),
        }
    }

    /// Feedback received so far, one entry per resumed pull
    pub fn feedback(&self) -> &[CullFeedback] {
        &self.feedback
    }
}

impl PathStream for FixedPaths {
    fn next_path(&mut self) -> Option<Vec<NodeKey>> {
        self.paths.pop_front()
    }

    fn resume_with(&mut self, feedback: CullFeedback) -> Option<Vec<NodeKey>> {
        self.feedback.push(feedback);
        self.next_path()
    }
}

/// Path search algorithms the orchestrator runs
pub trait TraversalEngine: Send + Sync {
    fn shortest_simple_paths<'g>(
        &self,
        graph: &'g InteractionGraph,
        options: &ShortestSimplePathOptions,
    ) -> Box<dyn PathStream + 'g>;

    fn bfs_search<'g>(
        &self,
        graph: &'g InteractionGraph,
        options: &BreadthFirstSearchOptions,
    ) -> Box<dyn PathStream + 'g>;

    fn open_dijkstra_search<'g>(
        &self,
        graph: &'g InteractionGraph,
        options: &DijkstraOptions,
    ) -> Box<dyn PathStream + 'g>;
}

/// In-process engine backed by the algorithms in this module
#[derive(Debug, Clone, Copy)]
pub struct ReferenceEngine {
    /// Cap on partial paths held by the shortest-paths frontier
    pub max_frontier: usize,
}

impl Default for ReferenceEngine {
    fn default() -> Self {
        Self {
            max_frontier: 1 << 22,
        }
    }
}

impl TraversalEngine for ReferenceEngine {
    fn shortest_simple_paths<'g>(
        &self,
        graph: &'g InteractionGraph,
        options: &ShortestSimplePathOptions,
    ) -> Box<dyn PathStream + 'g> {
        Box::new(SimplePaths::new(graph, options, self.max_frontier))
    }

    fn bfs_search<'g>(
        &self,
        graph: &'g InteractionGraph,
        options: &BreadthFirstSearchOptions,
    ) -> Box<dyn PathStream + 'g> {
        Box::new(BreadthFirstPaths::new(graph, options))
    }

    fn open_dijkstra_search<'g>(
        &self,
        graph: &'g InteractionGraph,
        options: &DijkstraOptions,
    ) -> Box<dyn PathStream + 'g> {
        Box::new(OpenDijkstraPaths::new(graph, options))
    }
}

/// Whether a partial path avoids every ignored node (past the start) and
/// ignored edge
pub(crate) fn path_is_clear(
    path: &[NodeKey],
    ignore_nodes: &HashSet<NodeKey>,
    ignore_edges: &HashSet<(NodeKey, NodeKey)>,
) -> bool {
    if path.iter().skip(1).any(|n| ignore_nodes.contains(n)) {
        return false;
    }
    ignore_edges.is_empty()
        || !path
            .windows(2)
            .any(|w| ignore_edges.contains(&(w[0].clone(), w[1].clone())))
}

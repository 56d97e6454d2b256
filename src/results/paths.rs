//! Aggregation of path search output

use super::deadline::Deadline;
use super::materialize::Materializer;
use super::types::{Node, Path, PathResultData};
use crate::error::{SearchError, SearchResult};
use crate::graph::{InteractionGraph, NodeKey, WeightKey};
use crate::links::LinkTemplates;
use crate::query::{FilterField, FilterOptions, PathResultOptions};
use crate::traversal::{CullFeedback, PathStream};
use std::collections::{BTreeMap, HashSet};
use tracing::{debug, info, warn};

/// The path algorithm whose output is being aggregated
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathSearchKind {
    ShortestSimplePaths,
    BreadthFirst,
    Dijkstra,
}

impl PathSearchKind {
    /// Filters the traversal itself already enforces
    pub fn enforced_filters(self) -> &'static [FilterField] {
        match self {
            PathSearchKind::ShortestSimplePaths => &[FilterField::NodeBlacklist],
            PathSearchKind::BreadthFirst => &[
                FilterField::AllowedNs,
                FilterField::NodeBlacklist,
                FilterField::StmtTypes,
                FilterField::BeliefCutoff,
                FilterField::CuratedDbOnly,
            ],
            PathSearchKind::Dijkstra => &[FilterField::NodeBlacklist, FilterField::CullBestNode],
        }
    }

    /// Filters left for the aggregator to apply
    pub fn residual_filters(self, options: &FilterOptions) -> FilterOptions {
        options.without(self.enforced_filters())
    }

    fn check_endpoints(self, source: Option<&NodeKey>, target: Option<&NodeKey>) -> SearchResult<()> {
        match (self, source, target) {
            (PathSearchKind::ShortestSimplePaths, Some(_), Some(_)) => Ok(()),
            (PathSearchKind::ShortestSimplePaths, _, _) => {
                Err(SearchError::missing("source and target are both required"))
            }
            (_, Some(_), Some(_)) => Err(SearchError::invalid(
                "open search takes either a source or a target, not both",
            )),
            (_, None, None) => Err(SearchError::missing("either source or target must be set")),
            _ => Ok(()),
        }
    }
}

/// Pulls paths from a traversal, materializes them and buckets them by
/// node count.
///
/// With a cull threshold `k`, every `k`th accepted path nominates its
/// highest degree internal node, which is sent back to the traversal with
/// the next pull. The culled set is cumulative.
pub struct PathAggregator<'g> {
    kind: PathSearchKind,
    materializer: Materializer<'g>,
    source: Option<Node>,
    target: Option<Node>,
    reverse: bool,
    deadline: Deadline,
    timed_out: bool,
    culled: HashSet<NodeKey>,
}

impl<'g> PathAggregator<'g> {
    pub fn new(
        kind: PathSearchKind,
        graph: &'g InteractionGraph,
        options: &PathResultOptions,
        links: LinkTemplates,
    ) -> SearchResult<Self> {
        kind.check_endpoints(options.source.as_ref(), options.target.as_ref())?;
        let mut materializer = Materializer::new(
            graph,
            kind.residual_filters(&options.filter_options),
            &options.hash_blacklist,
            links,
        );
        let source = options.source.as_ref().and_then(|k| materializer.node(k, false));
        let target = options.target.as_ref().and_then(|k| materializer.node(k, false));
        for node in source.iter().chain(target.iter()) {
            materializer.add_input_node(node.clone());
        }
        Ok(Self {
            kind,
            materializer,
            source,
            target,
            reverse: options.reverse,
            deadline: Deadline::new(options.timeout),
            timed_out: false,
            culled: HashSet::new(),
        })
    }

    pub fn kind(&self) -> PathSearchKind {
        self.kind
    }

    pub fn timed_out(&self) -> bool {
        self.timed_out
    }

    /// Nodes sent back to the traversal so far
    pub fn culled_nodes(&self) -> &HashSet<NodeKey> {
        &self.culled
    }

    fn cull_weight(&self) -> Option<WeightKey> {
        let options = self.materializer.filter_options();
        if options.context_weighted {
            Some(WeightKey::ContextWeight)
        } else if options.weighted.is_some() {
            Some(WeightKey::Weight)
        } else {
            None
        }
    }

    /// Highest degree internal node of `prev` when `accepted` is a positive
    /// multiple of `k`; ties go to the earliest node
    fn cull_candidate(&self, k: usize, accepted: usize, prev: &[NodeKey]) -> Option<NodeKey> {
        if k == 0 || accepted < k || accepted % k != 0 || prev.len() < 3 {
            return None;
        }
        let graph = self.materializer.graph();
        let weight = self.cull_weight();
        let mut best: Option<(&NodeKey, f64)> = None;
        for node in &prev[1..prev.len() - 1] {
            let degree = graph.degree(node, weight);
            if best.map_or(true, |(_, d)| degree > d) {
                best = Some((node, degree));
            }
        }
        best.map(|(node, _)| node.clone())
    }

    /// Materialize one path; any missing node or emptied edge drops it
    fn build_path(&self, path: &[NodeKey]) -> Option<Path> {
        let mut nodes = Vec::with_capacity(path.len());
        let mut edge_data = Vec::with_capacity(path.len().saturating_sub(1));
        for pair in path.windows(2) {
            let edge = self.materializer.edge_data(&pair[0], &pair[1])?;
            if edge.is_empty() {
                return None;
            }
            nodes.push(edge.edge[0].clone());
            edge_data.push(edge);
        }
        nodes.push(edge_data.last()?.edge[1].clone());
        Some(Path {
            path: nodes,
            edge_data,
        })
    }

    /// Consume the stream until it ends, the path limit is reached, the
    /// length filter is exhausted or the deadline passes
    pub fn run(&mut self, stream: &mut dyn PathStream) -> PathResultData {
        let options = self.materializer.filter_options().clone();
        let length_filter = options.path_length.filter(|_| !options.overall_weighted);
        let mut paths: BTreeMap<usize, Vec<Path>> = BTreeMap::new();
        let mut accepted = 0usize;
        let mut prev_path: Option<Vec<NodeKey>> = None;
        self.deadline.start();

        loop {
            if self.deadline.expired() {
                info!(
                    algorithm = ?self.kind,
                    elapsed_ms = self.deadline.elapsed().as_millis() as u64,
                    "timeout reached, breaking results loop"
                );
                self.timed_out = true;
                break;
            }
            if accepted >= options.max_paths {
                info!(max_paths = options.max_paths, "found all requested paths");
                break;
            }

            let pulled = match (options.cull_best_node, prev_path.as_deref()) {
                (Some(k), Some(prev)) => {
                    if let Some(node) = self.cull_candidate(k, accepted, prev) {
                        if self.culled.insert(node.clone()) {
                            debug!(%node, accepted, "culling highest degree node");
                        }
                    }
                    stream.resume_with(CullFeedback::nodes(self.culled.clone()))
                }
                _ => stream.next_path(),
            };
            let Some(mut path) = pulled else {
                debug!(algorithm = ?self.kind, "path stream exhausted");
                break;
            };
            if self.reverse {
                path.reverse();
            }

            if let Some(length) = length_filter {
                if path.len() < length {
                    continue;
                }
                if path.len() > length {
                    info!(path_length = length, "found all paths of requested length");
                    break;
                }
            }

            let Some(built) = self.build_path(&path) else {
                continue;
            };
            paths.entry(path.len()).or_default().push(built);
            accepted += 1;
            prev_path = Some(path);
        }

        let truncated = stream.truncated();
        if truncated {
            warn!(algorithm = ?self.kind, "path traversal was truncated, results may be incomplete");
        }
        PathResultData {
            source: self.source.clone(),
            target: self.target.clone(),
            paths,
            truncated,
        }
    }
}

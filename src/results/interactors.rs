//! Aggregation of neighbor search output: shared interactors, ontology
//! parents, induced subgraphs and multi-node interactors

use super::deadline::Deadline;
use super::materialize::Materializer;
use super::types::{
    EdgeData, EdgeDataByHash, MultiInteractorsResults, Node, OntologyResults,
    SharedInteractorsResults, SubgraphResults,
};
use crate::error::{SearchError, SearchResult};
use crate::graph::{InteractionGraph, NodeKey};
use crate::links::{identifiers_url, LinkTemplates};
use crate::query::{
    FilterField, FilterOptions, InteractorResultOptions, MultiInteractorsOptions, OntologyResultOptions,
    SubgraphPlan,
};
use crate::search::{EdgePair, OntologyParent};
use std::collections::{HashMap, HashSet};
use tracing::info;

fn log_timeout(deadline: &Deadline, what: &str) {
    info!(
        search = what,
        elapsed_ms = deadline.elapsed().as_millis() as u64,
        "timeout reached, breaking results loop"
    );
}

/// Shared targets or shared regulators. Node filters already ran inside
/// the search; statement filters are applied again here since an edge
/// passes the search when any one of its statements does.
pub struct SharedInteractorsAggregator<'g> {
    materializer: Materializer<'g>,
    downstream: bool,
    deadline: Deadline,
    timed_out: bool,
}

impl<'g> SharedInteractorsAggregator<'g> {
    pub fn new(graph: &'g InteractionGraph, options: &InteractorResultOptions, links: LinkTemplates) -> Self {
        let filter_options = options.filter_options.without(&[
            FilterField::AllowedNs,
            FilterField::NodeBlacklist,
            FilterField::PathLength,
            FilterField::CullBestNode,
        ]);
        let mut materializer = Materializer::new(graph, filter_options, &options.hash_blacklist, links);
        for key in [&options.source, &options.target] {
            if let Some(node) = materializer.node(key, false) {
                materializer.add_input_node(node);
            }
        }
        Self {
            materializer,
            downstream: options.downstream,
            deadline: Deadline::new(options.timeout),
            timed_out: false,
        }
    }

    pub fn timed_out(&self) -> bool {
        self.timed_out
    }

    /// Pairs whose source or target edge cannot be materialized are
    /// dropped together, keeping both lists index-aligned
    pub fn run(&mut self, pairs: impl IntoIterator<Item = EdgePair>) -> SharedInteractorsResults {
        let mut source_data: Vec<EdgeData> = Vec::new();
        let mut target_data: Vec<EdgeData> = Vec::new();
        self.deadline.start();
        for ([s1, s2], [t1, t2]) in pairs {
            if self.deadline.expired() {
                log_timeout(&self.deadline, "shared interactors");
                self.timed_out = true;
                break;
            }
            let source_edge = self.materializer.edge_data(&s1, &s2);
            let target_edge = self.materializer.edge_data(&t1, &t2);
            if let (Some(s), Some(t)) = (source_edge, target_edge) {
                source_data.push(s);
                target_data.push(t);
            }
        }
        SharedInteractorsResults {
            source_data,
            target_data,
            downstream: self.downstream,
        }
    }
}

/// Shared ontology parents
pub struct OntologyAggregator {
    source: Node,
    target: Node,
    deadline: Deadline,
    timed_out: bool,
}

impl OntologyAggregator {
    pub fn new(graph: &InteractionGraph, options: &OntologyResultOptions) -> SearchResult<Self> {
        let materializer = Materializer::new(
            graph,
            FilterOptions::default(),
            &HashSet::new(),
            LinkTemplates::default(),
        );
        let grounded = |key: &NodeKey| {
            materializer
                .node(key, false)
                .ok_or_else(|| SearchError::invalid(format!("{} has no grounding in the graph", key)))
        };
        Ok(Self {
            source: grounded(&options.source)?,
            target: grounded(&options.target)?,
            deadline: Deadline::new(options.timeout),
            timed_out: false,
        })
    }

    pub fn timed_out(&self) -> bool {
        self.timed_out
    }

    pub fn run(&mut self, parents: impl IntoIterator<Item = OntologyParent>) -> OntologyResults {
        let mut nodes = Vec::new();
        self.deadline.start();
        for parent in parents {
            if self.deadline.expired() {
                log_timeout(&self.deadline, "shared parents");
                self.timed_out = true;
                break;
            }
            nodes.push(Node::new(parent.name, parent.ns, parent.id).with_lookup(parent.url));
        }
        OntologyResults {
            source: self.source.clone(),
            target: self.target.clone(),
            parents: nodes,
        }
    }
}

/// Induced subgraph edges keyed by statement hash. Family membership
/// statements are always left out.
pub struct SubgraphAggregator<'g> {
    materializer: Materializer<'g>,
    input_nodes: Vec<Node>,
    not_in_graph: Vec<Node>,
    available: Vec<Node>,
    by_name: HashMap<String, usize>,
    deadline: Deadline,
    timed_out: bool,
}

impl<'g> SubgraphAggregator<'g> {
    pub fn new(graph: &'g InteractionGraph, plan: &SubgraphPlan, links: LinkTemplates) -> Self {
        let materializer = Materializer::new(graph, FilterOptions::excluding_types(["fplx"]), &HashSet::new(), links)
            .with_input_nodes(plan.input_nodes.clone());
        let mut available: Vec<Node> = Vec::new();
        let mut by_name = HashMap::new();
        for node in &plan.options.nodes {
            let Some(name) = node.name.clone() else {
                continue;
            };
            let mut node = node.clone();
            if node.lookup.is_none() {
                node.lookup = identifiers_url(&node.namespace, &node.identifier);
            }
            match by_name.get(&name) {
                Some(&i) => available[i] = node,
                None => {
                    by_name.insert(name, available.len());
                    available.push(node);
                }
            }
        }
        Self {
            materializer,
            input_nodes: plan.input_nodes.clone(),
            not_in_graph: plan.not_in_graph.clone(),
            available,
            by_name,
            deadline: Deadline::new(plan.timeout),
            timed_out: false,
        }
    }

    pub fn timed_out(&self) -> bool {
        self.timed_out
    }

    /// Graph keys of the nodes available for the subgraph
    pub fn available_keys(&self) -> Vec<NodeKey> {
        self.available.iter().filter_map(Node::key).collect()
    }

    fn endpoint(&self, key: &NodeKey) -> Option<Node> {
        match self.by_name.get(&key.name) {
            Some(&i) => Some(self.available[i].clone()),
            None => self.materializer.node(key, true),
        }
    }

    pub fn run(&mut self, edges: impl IntoIterator<Item = (NodeKey, NodeKey)>) -> SubgraphResults {
        let mut seen: HashSet<(NodeKey, NodeKey)> = HashSet::new();
        let mut out: Vec<EdgeDataByHash> = Vec::new();
        if !self.available.is_empty() {
            info!(nodes = self.available.len(), "building subgraph output");
            self.deadline.start();
            for (a, b) in edges {
                if self.deadline.expired() {
                    log_timeout(&self.deadline, "subgraph");
                    self.timed_out = true;
                    break;
                }
                if seen.contains(&(a.clone(), b.clone())) {
                    continue;
                }
                let (Some(a_node), Some(b_node)) = (self.endpoint(&a), self.endpoint(&b)) else {
                    continue;
                };
                if let Some(edge) = self.materializer.edge_data_by_hash(a_node, b_node, &a, &b) {
                    out.push(edge);
                    seen.insert((a, b));
                }
            }
        }
        SubgraphResults {
            input_nodes: self.input_nodes.clone(),
            not_in_graph: self.not_in_graph.clone(),
            available_nodes: self.available.clone(),
            edges: out,
        }
    }
}

/// Common neighbors of a node list, with the edge data from every input
/// node to every neighbor
pub struct MultiInteractorsAggregator<'g> {
    materializer: Materializer<'g>,
    inputs: Vec<(Node, NodeKey)>,
    downstream: bool,
    deadline: Deadline,
    timed_out: bool,
}

impl<'g> MultiInteractorsAggregator<'g> {
    pub fn new(
        graph: &'g InteractionGraph,
        options: &MultiInteractorsOptions,
        timeout: Option<f64>,
        links: LinkTemplates,
    ) -> Self {
        let mut materializer = Materializer::new(
            graph,
            options.filters.statement_options(),
            &options.filters.hash_blacklist,
            links,
        );
        let inputs: Vec<(Node, NodeKey)> = options
            .nodes
            .iter()
            .filter_map(|key| materializer.node(key, false).map(|node| (node, key.clone())))
            .collect();
        for (node, _) in &inputs {
            materializer.add_input_node(node.clone());
        }
        Self {
            materializer,
            inputs,
            downstream: options.downstream,
            deadline: Deadline::new(timeout),
            timed_out: false,
        }
    }

    pub fn timed_out(&self) -> bool {
        self.timed_out
    }

    pub fn run(&mut self, neighbors: impl IntoIterator<Item = NodeKey>) -> MultiInteractorsResults {
        let mut found: Vec<(Node, NodeKey)> = Vec::new();
        self.deadline.start();
        for key in neighbors {
            if self.deadline.expired() {
                log_timeout(&self.deadline, "multi interactors");
                self.timed_out = true;
                break;
            }
            if let Some(node) = self.materializer.node(&key, false) {
                found.push((node, key));
            }
        }

        let mut edge_data = Vec::new();
        for (input, input_key) in &self.inputs {
            for (neighbor, neighbor_key) in &found {
                let edge = if self.downstream {
                    self.materializer
                        .edge_data_for(input.clone(), neighbor.clone(), input_key, neighbor_key)
                } else {
                    self.materializer
                        .edge_data_for(neighbor.clone(), input.clone(), neighbor_key, input_key)
                };
                edge_data.extend(edge);
            }
        }
        if edge_data.is_empty() {
            info!("no edge data found for multi interactors");
        } else {
            info!(edges = edge_data.len(), "added multi interactor edge data");
        }

        let inputs: Vec<Node> = self.inputs.iter().map(|(n, _)| n.clone()).collect();
        let neighbors: Vec<Node> = found.into_iter().map(|(n, _)| n).collect();
        let (regulators, targets) = if self.downstream {
            (inputs, neighbors)
        } else {
            (neighbors, inputs)
        };
        MultiInteractorsResults {
            targets,
            regulators,
            edge_data,
        }
    }
}

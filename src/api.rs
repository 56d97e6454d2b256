//! Transport-independent search API.
//!
//! `NetworkSearchApi` is the single entry point for all searches. The CLI
//! (or any other transport) builds one with its graphs and collaborators
//! and calls `handle_*` methods; nothing below it is reached directly.

use std::collections::HashSet;
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::config::SearchConfig;
use crate::error::{SearchError, SearchResult};
use crate::graph::InteractionGraph;
use crate::query::{
    multi_interactors, AlgorithmQuery, ContextWeighting, MultiInteractorsRequest, NetworkSearchQuery,
    PathResultOptions, QueryPlan, RefCountLookup, SubgraphPlan, SubgraphRequest,
};
use crate::results::{
    MultiInteractorsAggregator, OntologyAggregator, PathAggregator, PathResultData, PathSearchKind,
    Results, SharedInteractorsAggregator, SubgraphAggregator, SubgraphResults,
    MultiInteractorsResults,
};
use crate::search::{
    direct_multi_interactors, induced_subgraph_edges, shared_interactors, shared_parents,
    OntologyLookup,
};
use crate::traversal::{PathStream, ReferenceEngine, TraversalEngine};

/// Where a path search's output lands in the envelope
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PathSlot {
    Forward,
    Reverse,
}

/// Runs network, subgraph and multi-interactor searches over process-wide
/// graphs and collaborators injected at construction.
#[derive(Clone)]
pub struct NetworkSearchApi {
    unsigned_graph: Arc<InteractionGraph>,
    signed_graph: Arc<InteractionGraph>,
    hash_blacklist: Arc<HashSet<i64>>,
    engine: Arc<dyn TraversalEngine>,
    ref_counts: Option<Arc<dyn RefCountLookup>>,
    ontology: Option<Arc<dyn OntologyLookup>>,
    config: SearchConfig,
}

impl NetworkSearchApi {
    /// API over the two graph views with the reference engine, default
    /// configuration and no external lookups
    pub fn new(unsigned_graph: Arc<InteractionGraph>, signed_graph: Arc<InteractionGraph>) -> Self {
        Self {
            unsigned_graph,
            signed_graph,
            hash_blacklist: Arc::new(HashSet::new()),
            engine: Arc::new(ReferenceEngine::default()),
            ref_counts: None,
            ontology: None,
            config: SearchConfig::default(),
        }
    }

    /// Statement hashes excluded from every result
    pub fn with_hash_blacklist(mut self, hash_blacklist: HashSet<i64>) -> Self {
        self.hash_blacklist = Arc::new(hash_blacklist);
        self
    }

    pub fn with_engine(mut self, engine: Arc<dyn TraversalEngine>) -> Self {
        self.engine = engine;
        self
    }

    pub fn with_ref_counts(mut self, lookup: Arc<dyn RefCountLookup>) -> Self {
        self.ref_counts = Some(lookup);
        self
    }

    pub fn with_ontology(mut self, lookup: Arc<dyn OntologyLookup>) -> Self {
        self.ontology = Some(lookup);
        self
    }

    pub fn with_config(mut self, config: SearchConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    fn graph(&self, signed: bool) -> &InteractionGraph {
        if signed {
            &self.signed_graph
        } else {
            &self.unsigned_graph
        }
    }

    // --- Network search ---

    /// Run every search a query asks for and merge the results.
    ///
    /// Auxiliary searches run first, then the path search, then the
    /// reverse path search. Once one of them times out the rest are
    /// skipped and the envelope is flagged.
    pub fn handle_query(&self, query: &NetworkSearchQuery) -> SearchResult<Results> {
        let mut query = query.clone();
        query.user_timeout = self.config.clamp_timeout(query.user_timeout);
        if query.k_shortest == 0 {
            query.k_shortest = self.config.default_max_paths;
        }

        let signed = query.int_sign()?.is_some();
        let graph = self.graph(signed);
        let context = self.fetch_context(&query)?;
        let plan = QueryPlan::build(
            &query,
            graph,
            &self.hash_blacklist,
            context.as_ref(),
            self.config.bfs_max_memory,
        )?;
        info!(
            query_hash = %plan.query_hash,
            algorithm = plan.primary.name(),
            signed,
            auxiliary = plan.auxiliary.len(),
            "running network search"
        );

        let mut results = Results::new(plan.query_hash.clone(), plan.timeout);
        results.hashes = plan.related_hashes.iter().map(i64::to_string).collect();

        for search in &plan.auxiliary {
            if self.run_search(graph, search, PathSlot::Forward, &mut results)? {
                results.timed_out = true;
                break;
            }
        }
        if !results.timed_out && self.run_search(graph, &plan.primary, PathSlot::Forward, &mut results)? {
            results.timed_out = true;
        }
        if !results.timed_out {
            if let Some(reverse) = &plan.reverse {
                if self.run_search(graph, reverse, PathSlot::Reverse, &mut results)? {
                    results.timed_out = true;
                }
            }
        }
        if results.timed_out {
            warn!(query_hash = %results.query_hash, "network search timed out, returning partial results");
        }
        Ok(results)
    }

    fn fetch_context(&self, query: &NetworkSearchQuery) -> SearchResult<Option<ContextWeighting>> {
        if query.mesh_ids.is_empty() {
            return Ok(None);
        }
        let lookup = self.ref_counts.as_deref().ok_or_else(|| {
            SearchError::invalid("context ids given but no reference count lookup is configured")
        })?;
        Ok(Some(ContextWeighting::fetch(lookup, &query.mesh_ids)?))
    }

    /// Run one search and commit its output; returns whether it timed out
    fn run_search(
        &self,
        graph: &InteractionGraph,
        search: &AlgorithmQuery,
        slot: PathSlot,
        results: &mut Results,
    ) -> SearchResult<bool> {
        debug!(algorithm = search.name(), "starting search");
        match search {
            AlgorithmQuery::ShortestSimplePaths(options, result) => {
                let mut stream = self.engine.shortest_simple_paths(graph, options);
                let (data, timed_out) =
                    self.aggregate_paths(PathSearchKind::ShortestSimplePaths, graph, stream.as_mut(), result)?;
                commit_paths(results, slot, data);
                Ok(timed_out)
            }
            AlgorithmQuery::BreadthFirstSearch(options, result) => {
                let mut stream = self.engine.bfs_search(graph, options);
                let (data, timed_out) =
                    self.aggregate_paths(PathSearchKind::BreadthFirst, graph, stream.as_mut(), result)?;
                commit_paths(results, slot, data);
                Ok(timed_out)
            }
            AlgorithmQuery::Dijkstra(options, result) => {
                let mut stream = self.engine.open_dijkstra_search(graph, options);
                let (data, timed_out) =
                    self.aggregate_paths(PathSearchKind::Dijkstra, graph, stream.as_mut(), result)?;
                commit_paths(results, slot, data);
                Ok(timed_out)
            }
            AlgorithmQuery::SharedTargets(options, result)
            | AlgorithmQuery::SharedRegulators(options, result) => {
                let pairs = shared_interactors(graph, options)?;
                let mut aggregator =
                    SharedInteractorsAggregator::new(graph, result, self.config.link_templates());
                let data = aggregator.run(pairs);
                if options.regulators {
                    results.shared_regulators_results = Some(data);
                } else {
                    results.shared_target_results = Some(data);
                }
                Ok(aggregator.timed_out())
            }
            AlgorithmQuery::SharedParents(options, result) => {
                let Some(lookup) = self.ontology.as_deref() else {
                    debug!("no ontology lookup configured, skipping shared parents");
                    return Ok(false);
                };
                let parents = shared_parents(lookup, options)?;
                let mut aggregator = OntologyAggregator::new(graph, result)?;
                results.ontology_results = Some(aggregator.run(parents));
                Ok(aggregator.timed_out())
            }
        }
    }

    fn aggregate_paths(
        &self,
        kind: PathSearchKind,
        graph: &InteractionGraph,
        stream: &mut dyn PathStream,
        result: &PathResultOptions,
    ) -> SearchResult<(PathResultData, bool)> {
        let mut aggregator = PathAggregator::new(kind, graph, result, self.config.link_templates())?;
        let data = aggregator.run(stream);
        info!(
            algorithm = ?kind,
            paths = data.path_count(),
            culled = aggregator.culled_nodes().len(),
            "path search finished"
        );
        Ok((data, aggregator.timed_out()))
    }

    // --- Subgraph ---

    /// Edges among the requested entities that resolve in the graph
    pub fn handle_subgraph_query(&self, request: &SubgraphRequest) -> SearchResult<SubgraphResults> {
        let graph = self.graph(false);
        let mut plan = SubgraphPlan::build(request, graph);
        plan.timeout = self
            .config
            .clamp_timeout(plan.timeout.or(Some(self.config.default_timeout)));
        info!(
            requested = request.nodes.len(),
            missing = plan.not_in_graph.len(),
            "running subgraph search"
        );
        let mut aggregator = SubgraphAggregator::new(graph, &plan, self.config.link_templates());
        let edges = induced_subgraph_edges(graph, &aggregator.available_keys());
        let results = aggregator.run(edges);
        if aggregator.timed_out() {
            warn!("subgraph search timed out, returning partial results");
        }
        Ok(results)
    }

    // --- Multi-interactors ---

    /// Common neighbors of every requested entity
    pub fn handle_multi_interactors_query(
        &self,
        request: &MultiInteractorsRequest,
    ) -> SearchResult<MultiInteractorsResults> {
        let graph = self.graph(false);
        let options = multi_interactors(request, &self.hash_blacklist);
        let neighbors = direct_multi_interactors(graph, &options)?;
        info!(
            inputs = options.nodes.len(),
            neighbors = neighbors.len(),
            downstream = options.downstream,
            "running multi interactors search"
        );
        let mut aggregator = MultiInteractorsAggregator::new(
            graph,
            &options,
            self.config.clamp_timeout(request.timeout),
            self.config.link_templates(),
        );
        let results = aggregator.run(neighbors);
        if aggregator.timed_out() {
            warn!("multi interactors search timed out, returning partial results");
        }
        Ok(results)
    }
}

fn commit_paths(results: &mut Results, slot: PathSlot, data: PathResultData) {
    match slot {
        PathSlot::Forward => results.path_results = Some(data),
        PathSlot::Reverse => results.reverse_path_results = Some(data),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{EdgeAttrs, NodeAttrs, NodeKey, RawStatement, INT_MINUS, INT_PLUS};
    use crate::query::InMemoryRefCounts;
    use crate::search::{InMemoryOntology, OntologyTerm};

    fn create_test_graph() -> InteractionGraph {
        // A -> B -> C, A -> Z, C -> Z
        let mut g = InteractionGraph::unsigned();
        for (name, id) in [("A", "1"), ("B", "2"), ("C", "3"), ("Z", "4")] {
            g.add_node(name.into(), NodeAttrs::new("HGNC", id));
        }
        for (i, (s, t)) in [("A", "B"), ("B", "C"), ("A", "Z"), ("C", "Z")].iter().enumerate() {
            g.add_edge(
                (*s).into(),
                (*t).into(),
                EdgeAttrs::from_statements(vec![RawStatement::new("Activation", i as i64 + 1, 0.9)]),
            );
        }
        g
    }

    fn create_signed_graph() -> InteractionGraph {
        let mut g = InteractionGraph::signed();
        for (name, id) in [("A", "1"), ("B", "2")] {
            for sign in [INT_PLUS, INT_MINUS] {
                g.add_node(NodeKey::signed(name, sign), NodeAttrs::new("HGNC", id));
            }
        }
        g.add_edge(
            NodeKey::signed("A", INT_PLUS),
            NodeKey::signed("B", INT_MINUS),
            EdgeAttrs::from_statements(vec![RawStatement::new("Inhibition", 7, 0.8)]),
        );
        g
    }

    fn api() -> NetworkSearchApi {
        NetworkSearchApi::new(Arc::new(create_test_graph()), Arc::new(create_signed_graph()))
    }

    #[test]
    fn point_to_point_query_fills_paths_and_shared_targets() {
        let results = api().handle_query(&NetworkSearchQuery::between("A", "C")).unwrap();
        let paths = results.path_results.unwrap();
        assert_eq!(paths.path_count(), 1);
        assert_eq!(paths.paths[&3][0].edge_data.len(), 2);
        let shared = results.shared_target_results.unwrap();
        assert_eq!(shared.source_data.len(), 1);
        assert_eq!(shared.source_data[0].edge[1].name.as_deref(), Some("Z"));
        assert!(results.ontology_results.is_none());
        assert!(!results.timed_out);
    }

    #[test]
    fn two_way_query_fills_reverse_slot() {
        let mut query = NetworkSearchQuery::between("A", "C");
        query.two_way = true;
        let results = api().handle_query(&query).unwrap();
        assert!(results.reverse_path_results.unwrap().is_empty());
    }

    #[test]
    fn open_query_runs_breadth_first() {
        let results = api().handle_query(&NetworkSearchQuery::downstream_of("A")).unwrap();
        let paths = results.path_results.unwrap();
        assert!(paths.target.is_none());
        assert_eq!(paths.paths[&2].len(), 2);
        assert!(results.shared_target_results.is_none());
    }

    #[test]
    fn weighted_open_query_runs_dijkstra() {
        let mut query = NetworkSearchQuery::upstream_of("Z");
        query.weighted = crate::query::Weighting::Belief;
        let results = api().handle_query(&query).unwrap();
        let paths = results.path_results.unwrap();
        // predecessors of Z in cost order: A, C, then B via C
        let firsts: Vec<_> = paths
            .paths
            .values()
            .flatten()
            .map(|p| p.path[0].name.clone().unwrap_or_default())
            .collect();
        assert_eq!(firsts.len(), 3);
        assert!(paths.paths.values().flatten().all(|p| p.path.last().and_then(|n| n.name.as_deref()) == Some("Z")));
    }

    #[test]
    fn signed_query_uses_signed_graph() {
        let mut query = NetworkSearchQuery::between("A", "B");
        query.sign = Some(INT_MINUS);
        let results = api().handle_query(&query).unwrap();
        let paths = results.path_results.unwrap();
        assert_eq!(paths.path_count(), 1);
        assert_eq!(paths.paths[&2][0].edge_data[0].sign, Some(1));
    }

    #[test]
    fn missing_endpoints_abort() {
        let err = api().handle_query(&NetworkSearchQuery::default()).unwrap_err();
        assert!(matches!(err, SearchError::MissingParameters(_)));
    }

    #[test]
    fn zero_timeout_flags_envelope() {
        let mut query = NetworkSearchQuery::between("A", "C");
        query.user_timeout = Some(0.0);
        let results = api().handle_query(&query).unwrap();
        assert!(results.timed_out);
        // shared targets timed out first, so the path search never ran
        assert!(results.path_results.is_none());
    }

    #[test]
    fn context_ids_need_a_lookup() {
        let mut query = NetworkSearchQuery::between("A", "C");
        query.mesh_ids = vec!["D000001".into()];
        assert!(matches!(
            api().handle_query(&query),
            Err(SearchError::InvalidParameters(_))
        ));

        let counts = InMemoryRefCounts::new().with_count("D000001", 1, 3).with_total(1, 4);
        let results = api()
            .with_ref_counts(Arc::new(counts))
            .handle_query(&query)
            .unwrap();
        assert_eq!(results.hashes, vec!["1".to_string()]);
    }

    #[test]
    fn ontology_lookup_fills_parents() {
        let ontology = InMemoryOntology::new()
            .with_parent(OntologyTerm::new("HGNC", "1"), OntologyTerm::new("FPLX", "FAM"), "isa")
            .with_parent(OntologyTerm::new("HGNC", "3"), OntologyTerm::new("FPLX", "FAM"), "isa");
        let results = api()
            .with_ontology(Arc::new(ontology))
            .handle_query(&NetworkSearchQuery::between("A", "C"))
            .unwrap();
        let parents = results.ontology_results.unwrap().parents;
        assert_eq!(parents.len(), 1);
        assert_eq!(parents[0].identifier, "FAM");
    }

    #[test]
    fn subgraph_and_multi_interactors() {
        let api = api();
        let request = SubgraphRequest {
            nodes: vec![
                crate::results::Node::new("A", "HGNC", "1"),
                crate::results::Node::new("B", "HGNC", "2"),
            ],
            timeout: None,
        };
        let subgraph = api.handle_subgraph_query(&request).unwrap();
        assert_eq!(subgraph.edges.len(), 1);

        let request = MultiInteractorsRequest::new(vec!["A".into(), "C".into()], true);
        let multi = api.handle_multi_interactors_query(&request).unwrap();
        assert_eq!(multi.targets.len(), 1);
        assert_eq!(multi.edge_data.len(), 2);

        let empty = MultiInteractorsRequest::new(Vec::new(), true);
        assert!(api.handle_multi_interactors_query(&empty).is_err());
    }
}

//! Translation of requests into algorithm options and result options

use super::context::ContextWeighting;
use super::filter::{FilterOptions, StmtFilter, StmtTypeFilter};
use super::options::{
    BreadthFirstSearchOptions, DijkstraOptions, EdgePredicate, MultiInteractorsOptions,
    NeighborFilters, OntologyOptions, ShortestSimplePathOptions, SharedInteractorsOptions,
    SubgraphOptions,
};
use super::request::{lowercase, MultiInteractorsRequest, NetworkSearchQuery, SubgraphRequest};
use crate::error::{SearchError, SearchResult};
use crate::graph::{InteractionGraph, NodeKey, INT_MINUS, INT_PLUS};
use crate::results::Node;
use std::collections::HashSet;
use tracing::{debug, warn};

/// Start node of an open search.
///
/// A downstream search always starts from the positive node; the requested
/// sign then applies to the leaf. An upstream search starts from the node
/// with the requested sign.
pub fn open_signed_node(name: &str, reverse: bool, sign: Option<u8>) -> NodeKey {
    match sign {
        None => NodeKey::unsigned(name),
        Some(sign) if reverse => NodeKey::signed(name, sign),
        Some(_) => NodeKey::signed(name, INT_PLUS),
    }
}

/// Node blacklist over the graph view in use; with a sign, every name is
/// blacklisted under both signs
pub fn expand_node_blacklist(names: &[String], sign: Option<u8>) -> HashSet<NodeKey> {
    match sign {
        None => names.iter().map(|n| NodeKey::unsigned(n.as_str())).collect(),
        Some(_) => names
            .iter()
            .flat_map(|n| [NodeKey::signed(n.as_str(), INT_PLUS), NodeKey::signed(n.as_str(), INT_MINUS)])
            .collect(),
    }
}

/// Endpoints of a point-to-point search
pub fn source_target(query: &NetworkSearchQuery) -> SearchResult<(NodeKey, NodeKey)> {
    let (source, target) = (query.source.trim(), query.target.trim());
    Ok(match query.int_sign()? {
        None => (NodeKey::unsigned(source), NodeKey::unsigned(target)),
        Some(INT_PLUS) => (NodeKey::signed(source, INT_PLUS), NodeKey::signed(target, INT_PLUS)),
        Some(_) => (NodeKey::signed(source, INT_PLUS), NodeKey::signed(target, INT_MINUS)),
    })
}

/// Start node and direction of an open search
pub fn start_node(query: &NetworkSearchQuery) -> SearchResult<(NodeKey, bool)> {
    let (start, reverse) = match (query.has_source(), query.has_target()) {
        (true, false) => (query.source.trim(), false),
        (false, true) => (query.target.trim(), true),
        (true, true) => {
            return Err(SearchError::invalid(
                "open search cannot have both source and target set",
            ))
        }
        (false, false) => return Err(SearchError::missing("either source or target must be set")),
    };
    Ok((open_signed_node(start, reverse, query.int_sign()?), reverse))
}

/// Settings for aggregating path results
#[derive(Debug, Clone)]
pub struct PathResultOptions {
    pub filter_options: FilterOptions,
    pub source: Option<NodeKey>,
    pub target: Option<NodeKey>,
    /// Paths arrive end-first and are reversed before use
    pub reverse: bool,
    pub timeout: Option<f64>,
    pub hash_blacklist: HashSet<i64>,
}

/// Settings for aggregating shared interactor results
#[derive(Debug, Clone)]
pub struct InteractorResultOptions {
    pub filter_options: FilterOptions,
    pub hash_blacklist: HashSet<i64>,
    pub source: NodeKey,
    pub target: NodeKey,
    pub downstream: bool,
    pub timeout: Option<f64>,
}

/// Settings for aggregating shared ontology parents
#[derive(Debug, Clone)]
pub struct OntologyResultOptions {
    pub source: NodeKey,
    pub target: NodeKey,
    pub timeout: Option<f64>,
}

/// One runnable search: algorithm options plus the result options its
/// aggregator needs
#[derive(Debug, Clone)]
pub enum AlgorithmQuery {
    ShortestSimplePaths(ShortestSimplePathOptions, PathResultOptions),
    BreadthFirstSearch(BreadthFirstSearchOptions, PathResultOptions),
    Dijkstra(DijkstraOptions, PathResultOptions),
    SharedTargets(SharedInteractorsOptions, InteractorResultOptions),
    SharedRegulators(SharedInteractorsOptions, InteractorResultOptions),
    SharedParents(OntologyOptions, OntologyResultOptions),
}

impl AlgorithmQuery {
    pub fn name(&self) -> &'static str {
        match self {
            AlgorithmQuery::ShortestSimplePaths(..) => "shortest_simple_paths",
            AlgorithmQuery::BreadthFirstSearch(..) => "bfs_search",
            AlgorithmQuery::Dijkstra(..) => "open_dijkstra_search",
            AlgorithmQuery::SharedTargets(..) => "shared_targets",
            AlgorithmQuery::SharedRegulators(..) => "shared_regulators",
            AlgorithmQuery::SharedParents(..) => "shared_parents",
        }
    }
}

/// Translates one network search query against one graph view
pub struct Translator<'a> {
    query: &'a NetworkSearchQuery,
    graph: &'a InteractionGraph,
    hash_blacklist: &'a HashSet<i64>,
    context: Option<&'a ContextWeighting>,
    bfs_max_memory: usize,
}

impl<'a> Translator<'a> {
    pub fn new(
        query: &'a NetworkSearchQuery,
        graph: &'a InteractionGraph,
        hash_blacklist: &'a HashSet<i64>,
    ) -> Self {
        Self {
            query,
            graph,
            hash_blacklist,
            context: None,
            bfs_max_memory: 1 << 29,
        }
    }

    /// Reference counts for queries with context ids
    pub fn with_context(mut self, context: Option<&'a ContextWeighting>) -> Self {
        self.context = context;
        self
    }

    pub fn with_bfs_max_memory(mut self, max_memory: usize) -> Self {
        self.bfs_max_memory = max_memory;
        self
    }

    fn node_blacklist(&self) -> SearchResult<HashSet<NodeKey>> {
        Ok(expand_node_blacklist(&self.query.node_blacklist, self.query.int_sign()?))
    }

    fn context(&self) -> SearchResult<Option<&'a ContextWeighting>> {
        if self.query.mesh_ids.is_empty() {
            return Ok(None);
        }
        self.context.map(Some).ok_or_else(|| {
            SearchError::invalid("context ids given but no reference counts were fetched")
        })
    }

    fn path_result_options(&self, with_hash_blacklist: bool) -> SearchResult<PathResultOptions> {
        let (source, target, reverse) = if self.query.has_source() && self.query.has_target() {
            let (s, t) = source_target(self.query)?;
            (Some(s), Some(t), false)
        } else {
            let (start, reverse) = start_node(self.query)?;
            if reverse {
                (None, Some(start), true)
            } else {
                (Some(start), None, false)
            }
        };
        Ok(PathResultOptions {
            filter_options: self.query.filter_options(),
            source,
            target,
            reverse,
            timeout: self.query.user_timeout,
            hash_blacklist: if with_hash_blacklist {
                self.hash_blacklist.clone()
            } else {
                HashSet::new()
            },
        })
    }

    pub fn shortest_simple_paths(&self) -> SearchResult<AlgorithmQuery> {
        let (source, target) = source_target(self.query)?;
        let mut options = ShortestSimplePathOptions::between(source, target);
        options.ignore_nodes = self.node_blacklist()?;
        options.weight = self.query.weighted.weight_key();
        options.strict_mesh_id_filtering = self.query.strict_mesh_id_filtering;
        options.const_c = self.query.const_c;
        options.const_tk = self.query.const_tk;
        if let Some(context) = self.context()? {
            options.hashes = Some(context.related_hashes());
            options.ref_counts_function = Some(context.edge_scorer());
        }
        Ok(AlgorithmQuery::ShortestSimplePaths(options, self.path_result_options(true)?))
    }

    /// Admissibility predicate from the statement filters, `None` when no
    /// filter is set
    fn bfs_edge_filter(&self) -> Option<EdgePredicate> {
        let filter = StmtFilter {
            stmt_types: StmtTypeFilter::exclude(self.query.stmt_filter.iter()),
            hash_blacklist: self.hash_blacklist.clone(),
            curated_db_only: self.query.curated_db_only,
            belief_cutoff: self.query.belief_cutoff,
        };
        if filter.is_open() {
            return None;
        }
        Some(EdgePredicate::new(move |g, u, v| {
            g.edge(u, v)
                .map(|attrs| attrs.statements.iter().any(|s| filter.passes(s)))
                .unwrap_or(false)
        }))
    }

    pub fn breadth_first_search(&self) -> SearchResult<AlgorithmQuery> {
        let (start, reverse) = start_node(self.query)?;
        let depth_limit = match self.query.path_length {
            Some(len) if len > self.query.depth_limit + 1 => {
                warn!(
                    from = self.query.depth_limit,
                    to = len - 1,
                    "resetting depth limit to match requested path length"
                );
                len - 1
            }
            _ => self.query.depth_limit,
        };
        let mut options = BreadthFirstSearchOptions::from_node(start);
        options.reverse = reverse;
        options.depth_limit = depth_limit;
        options.max_per_node = if self.query.max_per_node == 0 {
            5
        } else {
            self.query.max_per_node
        };
        options.node_filter = lowercase(&self.query.allowed_ns);
        options.node_blacklist = self.node_blacklist()?;
        options.terminal_ns = lowercase(&self.query.terminal_ns);
        options.sign = self.query.int_sign()?;
        options.max_memory = self.bfs_max_memory;
        options.edge_filter = self.bfs_edge_filter();
        options.strict_mesh_id_filtering = self.query.strict_mesh_id_filtering;
        if let Some(context) = self.context()? {
            let hashes = context.related_hashes();
            let allowed: HashSet<(NodeKey, NodeKey)> = hashes
                .iter()
                .filter_map(|h| self.graph.edge_by_hash(*h).cloned())
                .collect();
            debug!(edges = allowed.len(), "restricting search to context edges");
            options.allow_edge = Some(EdgePredicate::new(move |_, u, v| {
                allowed.contains(&(u.clone(), v.clone()))
            }));
            options.hashes = Some(hashes);
        }
        Ok(AlgorithmQuery::BreadthFirstSearch(options, self.path_result_options(false)?))
    }

    pub fn dijkstra(&self) -> SearchResult<AlgorithmQuery> {
        let (start, reverse) = start_node(self.query)?;
        let mut options = DijkstraOptions::from_node(start);
        options.reverse = reverse;
        options.ignore_nodes = self.node_blacklist()?;
        options.terminal_ns = lowercase(&self.query.terminal_ns);
        options.weight = self.query.weighted.weight_key();
        options.const_c = self.query.const_c;
        options.const_tk = self.query.const_tk;
        if let Some(context) = self.context()? {
            options.hashes = Some(context.related_hashes());
            options.ref_counts_function = Some(context.edge_scorer());
        }
        Ok(AlgorithmQuery::Dijkstra(options, self.path_result_options(true)?))
    }

    pub fn shared_interactors(&self, regulators: bool) -> SearchResult<AlgorithmQuery> {
        let sign = self.query.int_sign()?;
        let source = open_signed_node(self.query.source.trim(), regulators, sign);
        let target = open_signed_node(self.query.target.trim(), regulators, sign);
        let options = SharedInteractorsOptions {
            source: source.clone(),
            target: target.clone(),
            max_results: self.query.k_shortest,
            regulators,
            sign,
            filters: NeighborFilters {
                node_blacklist: self.node_blacklist()?,
                allowed_ns: lowercase(&self.query.allowed_ns),
                stmt_types: StmtTypeFilter::exclude(self.query.stmt_filter.iter()),
                curated_db_only: self.query.curated_db_only,
                hash_blacklist: self.hash_blacklist.clone(),
                belief_cutoff: self.query.belief_cutoff,
                source_filter: Vec::new(),
            },
        };
        let result = InteractorResultOptions {
            filter_options: self.query.filter_options(),
            hash_blacklist: self.hash_blacklist.clone(),
            source,
            target,
            downstream: !regulators,
            timeout: self.query.user_timeout,
        };
        Ok(if regulators {
            AlgorithmQuery::SharedRegulators(options, result)
        } else {
            AlgorithmQuery::SharedTargets(options, result)
        })
    }

    /// Shared ontology parents; `None` when an endpoint lacks grounding
    pub fn shared_parents(&self) -> SearchResult<Option<AlgorithmQuery>> {
        let (source, target) = source_target(self.query)?;
        let grounding = |key: &NodeKey| self.graph.node_attrs(key).cloned();
        let (Some(s), Some(t)) = (grounding(&source), grounding(&target)) else {
            debug!(%source, %target, "skipping ontology search for ungrounded endpoint");
            return Ok(None);
        };
        let options = OntologyOptions {
            source_ns: s.ns,
            source_id: s.id,
            target_ns: t.ns,
            target_id: t.id,
            max_paths: self.query.k_shortest,
            immediate_only: false,
            is_a_part_of: None,
        };
        let result = OntologyResultOptions {
            source,
            target,
            timeout: self.query.user_timeout,
        };
        Ok(Some(AlgorithmQuery::SharedParents(options, result)))
    }
}

/// Every search a network search query asks for
#[derive(Debug, Clone)]
pub struct QueryPlan {
    pub query_hash: String,
    pub timeout: Option<f64>,
    /// Search over the signed graph view
    pub signed: bool,
    /// Run before the primary search, in this order
    pub auxiliary: Vec<AlgorithmQuery>,
    pub primary: AlgorithmQuery,
    /// Mirrored search with source and target swapped
    pub reverse: Option<AlgorithmQuery>,
    /// Hashes with context support, reported back to the client
    pub related_hashes: Vec<i64>,
}

impl QueryPlan {
    /// Plan a query against the graph view matching its sign.
    ///
    /// Both endpoints give a shortest-simple-paths search with shared
    /// targets and ontology parents (plus shared regulators and a reverse
    /// search when asked). One endpoint gives Dijkstra for weighted queries
    /// and breadth-first search otherwise.
    pub fn build(
        query: &NetworkSearchQuery,
        graph: &InteractionGraph,
        hash_blacklist: &HashSet<i64>,
        context: Option<&ContextWeighting>,
        bfs_max_memory: usize,
    ) -> SearchResult<Self> {
        let translator = Translator::new(query, graph, hash_blacklist)
            .with_context(context)
            .with_bfs_max_memory(bfs_max_memory);
        let signed = query.int_sign()?.is_some();

        let mut auxiliary = Vec::new();
        let mut reverse = None;
        let primary = match (query.has_source(), query.has_target()) {
            (true, true) => {
                auxiliary.push(translator.shared_interactors(false)?);
                if query.shared_regulators {
                    auxiliary.push(translator.shared_interactors(true)?);
                }
                if let Some(ontology) = translator.shared_parents()? {
                    auxiliary.push(ontology);
                }
                if query.two_way {
                    let reversed = query.reverse_search();
                    let reverse_translator = Translator::new(&reversed, graph, hash_blacklist)
                        .with_context(context)
                        .with_bfs_max_memory(bfs_max_memory);
                    reverse = Some(reverse_translator.shortest_simple_paths()?);
                }
                translator.shortest_simple_paths()?
            }
            (true, false) | (false, true) => {
                if query.is_overall_weighted() {
                    translator.dijkstra()?
                } else {
                    translator.breadth_first_search()?
                }
            }
            (false, false) => {
                return Err(SearchError::missing("either source or target must be set"))
            }
        };

        let mut related_hashes: Vec<i64> = context
            .map(|c| c.related_hashes().into_iter().collect())
            .unwrap_or_default();
        related_hashes.sort_unstable();

        Ok(Self {
            query_hash: query.query_hash()?,
            timeout: query.user_timeout,
            signed,
            auxiliary,
            primary,
            reverse,
            related_hashes,
        })
    }
}

/// A subgraph request resolved against the graph
#[derive(Debug, Clone)]
pub struct SubgraphPlan {
    pub options: SubgraphOptions,
    pub input_nodes: Vec<Node>,
    pub not_in_graph: Vec<Node>,
    pub timeout: Option<f64>,
}

impl SubgraphPlan {
    /// Resolve each requested node by namespace and identifier, then by
    /// name (taking grounding from the graph), else mark it missing
    pub fn build(request: &SubgraphRequest, graph: &InteractionGraph) -> Self {
        let mut in_graph = Vec::new();
        let mut not_in_graph = Vec::new();
        for node in &request.nodes {
            let by_ns_id = graph
                .name_by_ns_id(&node.namespace, &node.identifier)
                .filter(|name| graph.contains_node(&NodeKey::unsigned(*name)));
            if let Some(name) = by_ns_id {
                in_graph.push(Node::new(name, node.namespace.clone(), node.identifier.clone()));
                continue;
            }
            let by_name = node.name.as_deref().and_then(|name| {
                graph
                    .node_attrs(&NodeKey::unsigned(name))
                    .map(|attrs| Node::new(name, attrs.ns.clone(), attrs.id.clone()))
            });
            match by_name {
                Some(resolved) => in_graph.push(resolved),
                None => not_in_graph.push(node.clone()),
            }
        }
        Self {
            options: SubgraphOptions { nodes: in_graph },
            input_nodes: request.nodes.clone(),
            not_in_graph,
            timeout: request.timeout,
        }
    }
}

/// Multi-interactor options; all filters run inside the search
pub fn multi_interactors(
    request: &MultiInteractorsRequest,
    hash_blacklist: &HashSet<i64>,
) -> MultiInteractorsOptions {
    MultiInteractorsOptions {
        nodes: request
            .nodes
            .iter()
            .map(|n| NodeKey::unsigned(n.trim()))
            .collect(),
        downstream: request.downstream,
        max_results: request.max_results,
        filters: NeighborFilters {
            node_blacklist: expand_node_blacklist(&request.node_blacklist, None),
            allowed_ns: lowercase(&request.allowed_ns),
            stmt_types: StmtTypeFilter::allow(request.stmt_types.iter()),
            curated_db_only: request.curated_db_only,
            hash_blacklist: hash_blacklist.clone(),
            belief_cutoff: request.belief_cutoff,
            source_filter: lowercase(&request.source_filter),
        },
    }
}

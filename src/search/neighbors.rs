//! Shared-interactor and multi-interactor search

use crate::error::{SearchError, SearchResult};
use crate::graph::{EdgeAttrs, InteractionGraph, NodeKey, RawStatement, INT_PLUS};
use crate::query::{MultiInteractorsOptions, NeighborFilters, SharedInteractorsOptions};
use std::collections::HashSet;

/// One shared interactor as the two edges connecting it:
/// `([source, x], [target, x])` for targets, `([x, source], [x, target])`
/// for regulators
pub type EdgePair = ([NodeKey; 2], [NodeKey; 2]);

/// Edge between `start` and `neighbor` in search direction
fn edge_between<'g>(
    graph: &'g InteractionGraph,
    start: &NodeKey,
    neighbor: &NodeKey,
    reverse: bool,
) -> Option<&'g EdgeAttrs> {
    if reverse {
        graph.edge(neighbor, start)
    } else {
        graph.edge(start, neighbor)
    }
}

/// Keep neighbors whose edge from `start` has a statement matching `pred`
fn retain_by_statement(
    graph: &InteractionGraph,
    start: &NodeKey,
    neighbors: &mut Vec<NodeKey>,
    reverse: bool,
    pred: impl Fn(&RawStatement) -> bool,
) {
    neighbors.retain(|n| {
        edge_between(graph, start, n, reverse)
            .map(|attrs| attrs.statements.iter().any(&pred))
            .unwrap_or(false)
    });
}

/// Filter the neighbors of `start`, one filter at a time, in order: node
/// blacklist, namespace, statement type, curation, hash blacklist, belief,
/// evidence source. Each statement filter keeps a neighbor if any statement
/// on its edge passes that filter.
pub fn filter_neighbors(
    graph: &InteractionGraph,
    start: &NodeKey,
    mut neighbors: Vec<NodeKey>,
    reverse: bool,
    filters: &NeighborFilters,
) -> Vec<NodeKey> {
    if !filters.node_blacklist.is_empty() {
        neighbors.retain(|n| !filters.node_blacklist.contains(n));
    }
    if !filters.allowed_ns.is_empty() {
        neighbors.retain(|n| {
            graph
                .node_attrs(n)
                .map(|attrs| filters.allowed_ns.contains(&attrs.ns.to_lowercase()))
                .unwrap_or(false)
        });
    }
    if !filters.stmt_types.is_open() {
        retain_by_statement(graph, start, &mut neighbors, reverse, |s| {
            filters.stmt_types.permits(&s.stmt_type)
        });
    }
    if filters.curated_db_only {
        retain_by_statement(graph, start, &mut neighbors, reverse, |s| s.curated);
    }
    if !filters.hash_blacklist.is_empty() {
        retain_by_statement(graph, start, &mut neighbors, reverse, |s| {
            !filters.hash_blacklist.contains(&s.stmt_hash)
        });
    }
    if filters.belief_cutoff > 0.0 {
        retain_by_statement(graph, start, &mut neighbors, reverse, |s| {
            s.belief > filters.belief_cutoff
        });
    }
    if !filters.source_filter.is_empty() {
        retain_by_statement(graph, start, &mut neighbors, reverse, |s| {
            s.source_counts
                .keys()
                .any(|src| filters.source_filter.contains(&src.to_lowercase()))
        });
    }
    neighbors
}

fn best_belief(graph: &InteractionGraph, start: &NodeKey, neighbor: &NodeKey, reverse: bool) -> f64 {
    edge_between(graph, start, neighbor, reverse)
        .map(EdgeAttrs::max_statement_belief)
        .unwrap_or(0.0)
}

/// Entities that both `source` and `target` regulate (or, for regulators,
/// that regulate both), ranked by the weaker of the two best supporting
/// beliefs.
pub fn shared_interactors(
    graph: &InteractionGraph,
    options: &SharedInteractorsOptions,
) -> SearchResult<Vec<EdgePair>> {
    let reverse = options.regulators;
    let (source, target) = (&options.source, &options.target);

    let sign_ok: Box<dyn Fn(&NodeKey) -> bool> = match options.sign {
        None => Box::new(|_: &NodeKey| true),
        Some(sign) if reverse => {
            if source.sign != Some(sign) || target.sign != Some(sign) {
                return Err(SearchError::invalid(format!(
                    "shared regulators with sign {} need source and target of that sign, got {} and {}",
                    sign, source, target
                )));
            }
            Box::new(|n: &NodeKey| n.sign == Some(INT_PLUS))
        }
        Some(sign) => Box::new(move |n: &NodeKey| n.sign == Some(sign)),
    };

    let side = |start: &NodeKey| {
        let candidates: Vec<NodeKey> = graph
            .neighbors(start, reverse)
            .iter()
            .filter(|n| sign_ok(*n))
            .cloned()
            .collect();
        filter_neighbors(graph, start, candidates, reverse, &options.filters)
    };
    let source_side = side(source);
    let target_side: HashSet<NodeKey> = side(target).into_iter().collect();

    let mut ranked: Vec<(f64, NodeKey)> = source_side
        .into_iter()
        .filter(|n| target_side.contains(n))
        .map(|n| {
            let rank = best_belief(graph, source, &n, reverse).min(best_belief(graph, target, &n, reverse));
            (rank, n)
        })
        .collect();
    ranked.sort_by(|a, b| b.0.total_cmp(&a.0));

    Ok(ranked
        .into_iter()
        .take(options.max_results)
        .map(|(_, x)| {
            if reverse {
                ([x.clone(), source.clone()], [x, target.clone()])
            } else {
                ([source.clone(), x.clone()], [target.clone(), x])
            }
        })
        .collect())
}

/// Neighbors shared by every input node, ranked by the weakest best belief
/// over the input nodes, then by name
pub fn direct_multi_interactors(
    graph: &InteractionGraph,
    options: &MultiInteractorsOptions,
) -> SearchResult<Vec<NodeKey>> {
    let Some((first, rest)) = options.nodes.split_first() else {
        return Err(SearchError::invalid("multi-interactor search needs at least one node"));
    };
    let reverse = !options.downstream;

    let mut candidates = filter_neighbors(
        graph,
        first,
        graph.neighbors(first, reverse).to_vec(),
        reverse,
        &options.filters,
    );
    for node in rest {
        if candidates.is_empty() {
            break;
        }
        let allowed: HashSet<NodeKey> = filter_neighbors(
            graph,
            node,
            graph.neighbors(node, reverse).to_vec(),
            reverse,
            &options.filters,
        )
        .into_iter()
        .collect();
        candidates.retain(|c| allowed.contains(c));
    }

    let mut ranked: Vec<(f64, NodeKey)> = candidates
        .into_iter()
        .map(|n| {
            let rank = options
                .nodes
                .iter()
                .map(|start| best_belief(graph, start, &n, reverse))
                .fold(f64::INFINITY, f64::min);
            (rank, n)
        })
        .collect();
    ranked.sort_by(|a, b| b.0.total_cmp(&a.0).then_with(|| b.1.name.cmp(&a.1.name)));
    Ok(ranked
        .into_iter()
        .take(options.max_results)
        .map(|(_, n)| n)
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::NodeAttrs;
    use crate::query::StmtTypeFilter;

    fn stmt(kind: &str, hash: i64, belief: f64) -> RawStatement {
        RawStatement::new(kind, hash, belief).with_source("reach", 1)
    }

    fn link(g: &mut InteractionGraph, s: &str, t: &str, stmts: Vec<RawStatement>) {
        g.add_edge(s.into(), t.into(), EdgeAttrs::from_statements(stmts));
    }

    fn create_test_graph() -> InteractionGraph {
        // S -> Z, X, Y ; T -> Z, X, W
        let mut g = InteractionGraph::unsigned();
        for (i, name) in ["S", "T", "X", "Y", "Z", "W"].iter().enumerate() {
            g.add_node(NodeKey::unsigned(*name), NodeAttrs::new("HGNC", i.to_string()));
        }
        g.add_node(NodeKey::unsigned("F"), NodeAttrs::new("FPLX", "F"));
        link(&mut g, "S", "Z", vec![stmt("Activation", 1, 0.6)]);
        link(&mut g, "S", "X", vec![stmt("Phosphorylation", 2, 0.9).curated(true)]);
        link(&mut g, "S", "Y", vec![stmt("Activation", 3, 0.9)]);
        link(&mut g, "S", "F", vec![stmt("Activation", 9, 0.9)]);
        link(&mut g, "T", "Z", vec![stmt("Activation", 4, 0.7)]);
        link(&mut g, "T", "X", vec![stmt("Activation", 5, 0.8)]);
        link(&mut g, "T", "W", vec![stmt("Activation", 6, 0.9)]);
        link(&mut g, "T", "F", vec![stmt("Activation", 10, 0.9)]);
        g
    }

    fn targets_options() -> SharedInteractorsOptions {
        SharedInteractorsOptions {
            source: "S".into(),
            target: "T".into(),
            max_results: 50,
            regulators: false,
            sign: None,
            filters: NeighborFilters::default(),
        }
    }

    fn neighbor_names(pairs: &[EdgePair]) -> Vec<&str> {
        pairs.iter().map(|(s, _)| s[1].name.as_str()).collect()
    }

    #[test]
    fn shared_targets_are_ranked_by_weaker_belief() {
        let g = create_test_graph();
        let pairs = shared_interactors(&g, &targets_options()).unwrap();
        // F: min(0.9, 0.9), X: min(0.9, 0.8), Z: min(0.6, 0.7)
        assert_eq!(neighbor_names(&pairs), vec!["F", "X", "Z"]);
        let (s_edge, t_edge) = &pairs[1];
        assert_eq!(s_edge[0].name, "S");
        assert_eq!(t_edge[0].name, "T");
        assert_eq!(t_edge[1].name, "X");
    }

    #[test]
    fn results_are_truncated() {
        let g = create_test_graph();
        let mut opts = targets_options();
        opts.max_results = 1;
        assert_eq!(shared_interactors(&g, &opts).unwrap().len(), 1);
    }

    #[test]
    fn filters_apply_per_side() {
        let g = create_test_graph();
        let mut opts = targets_options();
        opts.filters.allowed_ns = vec!["hgnc".into()];
        assert_eq!(neighbor_names(&shared_interactors(&g, &opts).unwrap()), vec!["X", "Z"]);

        opts.filters.stmt_types = StmtTypeFilter::exclude(["phosphorylation"]);
        assert_eq!(neighbor_names(&shared_interactors(&g, &opts).unwrap()), vec!["Z"]);

        let mut curated = targets_options();
        curated.filters.curated_db_only = true;
        // only S -> X is curated, T -> X is not
        assert!(shared_interactors(&g, &curated).unwrap().is_empty());
    }

    #[test]
    fn belief_and_hash_filters_drop_neighbors() {
        let g = create_test_graph();
        let mut opts = targets_options();
        opts.filters.belief_cutoff = 0.6;
        assert_eq!(neighbor_names(&shared_interactors(&g, &opts).unwrap()), vec!["F", "X"]);
        opts.filters.hash_blacklist = [5].into_iter().collect();
        assert_eq!(neighbor_names(&shared_interactors(&g, &opts).unwrap()), vec!["F"]);
    }

    #[test]
    fn source_filter_matches_evidence_sources() {
        let g = create_test_graph();
        let mut opts = targets_options();
        opts.filters.source_filter = vec!["sparser".into()];
        assert!(shared_interactors(&g, &opts).unwrap().is_empty());
        opts.filters.source_filter = vec!["reach".into()];
        assert_eq!(shared_interactors(&g, &opts).unwrap().len(), 3);
    }

    #[test]
    fn shared_regulators_point_into_endpoints() {
        let mut g = InteractionGraph::unsigned();
        link(&mut g, "R", "S", vec![stmt("Activation", 1, 0.5)]);
        link(&mut g, "R", "T", vec![stmt("Activation", 2, 0.5)]);
        let mut opts = targets_options();
        opts.regulators = true;
        let pairs = shared_interactors(&g, &opts).unwrap();
        assert_eq!(pairs.len(), 1);
        assert_eq!(pairs[0].0, [NodeKey::unsigned("R"), NodeKey::unsigned("S")]);
        assert_eq!(pairs[0].1, [NodeKey::unsigned("R"), NodeKey::unsigned("T")]);
    }

    fn signed_graph() -> InteractionGraph {
        let mut g = InteractionGraph::signed();
        link_signed(&mut g, ("S", 0), ("Z", 0));
        link_signed(&mut g, ("T", 0), ("Z", 0));
        link_signed(&mut g, ("S", 0), ("Q", 1));
        link_signed(&mut g, ("T", 0), ("Q", 1));
        link_signed(&mut g, ("R", 0), ("S", 1));
        link_signed(&mut g, ("R", 0), ("T", 1));
        link_signed(&mut g, ("P", 1), ("S", 1));
        link_signed(&mut g, ("P", 1), ("T", 1));
        g
    }

    fn link_signed(g: &mut InteractionGraph, s: (&str, u8), t: (&str, u8)) {
        g.add_edge(s.into(), t.into(), EdgeAttrs::from_statements(vec![stmt("Activation", 1, 0.5)]));
    }

    #[test]
    fn signed_targets_match_requested_sign() {
        let g = signed_graph();
        let mut opts = targets_options();
        opts.source = ("S", 0).into();
        opts.target = ("T", 0).into();
        opts.sign = Some(1);
        let pairs = shared_interactors(&g, &opts).unwrap();
        assert_eq!(neighbor_names(&pairs), vec!["Q"]);
    }

    #[test]
    fn signed_regulators_are_positive() {
        let g = signed_graph();
        let mut opts = targets_options();
        opts.regulators = true;
        opts.source = ("S", 1).into();
        opts.target = ("T", 1).into();
        opts.sign = Some(1);
        let pairs = shared_interactors(&g, &opts).unwrap();
        assert_eq!(pairs.len(), 1);
        assert_eq!(pairs[0].0[0], NodeKey::signed("R", 0));
    }

    #[test]
    fn signed_regulators_reject_sign_mismatch() {
        let g = signed_graph();
        let mut opts = targets_options();
        opts.regulators = true;
        opts.source = ("S", 0).into();
        opts.target = ("T", 1).into();
        opts.sign = Some(1);
        assert!(matches!(
            shared_interactors(&g, &opts),
            Err(SearchError::InvalidParameters(_))
        ));
    }

    fn multi_options(nodes: &[&str], downstream: bool) -> MultiInteractorsOptions {
        MultiInteractorsOptions {
            nodes: nodes.iter().map(|n| NodeKey::unsigned(*n)).collect(),
            downstream,
            max_results: 50,
            filters: NeighborFilters::default(),
        }
    }

    #[test]
    fn multi_interactors_need_nodes() {
        let g = create_test_graph();
        assert!(matches!(
            direct_multi_interactors(&g, &multi_options(&[], true)),
            Err(SearchError::InvalidParameters(_))
        ));
    }

    #[test]
    fn multi_interactors_intersect_all_nodes() {
        let g = create_test_graph();
        let found = direct_multi_interactors(&g, &multi_options(&["S", "T"], true)).unwrap();
        let names: Vec<_> = found.iter().map(|n| n.name.as_str()).collect();
        // F: 0.9, X: 0.8, Z: 0.6
        assert_eq!(names, vec!["F", "X", "Z"]);
    }

    #[test]
    fn single_node_gives_filtered_neighbors() {
        let g = create_test_graph();
        let mut opts = multi_options(&["S"], true);
        opts.filters.allowed_ns = vec!["hgnc".into()];
        let found = direct_multi_interactors(&g, &opts).unwrap();
        let expected = filter_neighbors(&g, &"S".into(), g.successors(&"S".into()).to_vec(), false, &opts.filters);
        let found_set: HashSet<_> = found.into_iter().collect();
        let expected_set: HashSet<_> = expected.into_iter().collect();
        assert_eq!(found_set, expected_set);
        assert_eq!(found_set.len(), 3);
    }

    #[test]
    fn multi_interactors_upstream() {
        let g = create_test_graph();
        let found = direct_multi_interactors(&g, &multi_options(&["Z", "X"], false)).unwrap();
        let names: Vec<_> = found.iter().map(|n| n.name.as_str()).collect();
        assert_eq!(names, vec!["T", "S"]);
    }
}

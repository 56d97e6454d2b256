//! End-to-end network search scenarios
//!
//! Queries run through `NetworkSearchApi` against the small pathway in
//! `common::pathway`:
//!
//! ```text
//! A -> B -> C -> Z
//! A -> D -| C
//! A -> Z
//! ```

mod common;

use common::{names, pathway};
use netsearch::graph::INT_MINUS;
use netsearch::query::InMemoryRefCounts;
use netsearch::search::{InMemoryOntology, OntologyTerm};
use netsearch::{NetworkSearchQuery, ReferenceEngine, SearchError, Weighting};
use std::sync::Arc;

fn path_names(results: &netsearch::Results, len: usize) -> Vec<Vec<String>> {
    results
        .path_results
        .as_ref()
        .and_then(|p| p.paths.get(&len))
        .map(|paths| paths.iter().map(names).collect())
        .unwrap_or_default()
}

#[test]
fn test_point_to_point_paths_and_shared_targets() {
    let results = pathway()
        .api()
        .handle_query(&NetworkSearchQuery::between("A", "C"))
        .unwrap();

    assert_eq!(
        path_names(&results, 3),
        vec![vec!["A", "B", "C"], vec!["A", "D", "C"]]
    );
    let paths = results.path_results.as_ref().unwrap();
    assert_eq!(paths.source.as_ref().and_then(|n| n.name.as_deref()), Some("A"));
    assert_eq!(paths.target.as_ref().and_then(|n| n.name.as_deref()), Some("C"));

    let shared = results.shared_target_results.unwrap();
    assert_eq!(shared.source_data.len(), shared.target_data.len());
    assert_eq!(shared.source_data.len(), 1);
    assert_eq!(shared.source_data[0].edge[1].name.as_deref(), Some("Z"));
    assert_eq!(shared.target_data[0].edge[0].name.as_deref(), Some("C"));
    assert!(results.shared_regulators_results.is_none());
    assert!(!results.timed_out);
}

#[test]
fn test_shared_target_edges_apply_statement_filters() {
    // A -> Z now carries a second, weak activation
    let network = pathway().activates("A", "Z", 0.2);
    let mut query = NetworkSearchQuery::between("A", "C");
    query.belief_cutoff = 0.5;
    let results = network.api().handle_query(&query).unwrap();
    let shared = results.shared_target_results.unwrap();
    assert_eq!(shared.source_data.len(), 1);
    let beliefs: Vec<f64> = shared
        .source_data
        .iter()
        .chain(&shared.target_data)
        .flat_map(|e| e.statements.values())
        .flat_map(|s| s.statements.iter().map(|st| st.belief))
        .collect();
    assert_eq!(beliefs.len(), 2);
    assert!(beliefs.iter().all(|b| *b > 0.5), "beliefs {:?}", beliefs);

    let api = network.api().with_hash_blacklist([6].into_iter().collect());
    let results = api.handle_query(&NetworkSearchQuery::between("A", "C")).unwrap();
    let shared = results.shared_target_results.unwrap();
    let hashes: Vec<i64> = shared.source_data[0].statements["Activation"]
        .statements
        .iter()
        .map(|s| s.stmt_hash)
        .collect();
    assert_eq!(hashes, vec![7]);
}

#[test]
fn test_capped_traversal_reports_truncation() {
    let query = NetworkSearchQuery::between("A", "C");
    let results = pathway().api().handle_query(&query).unwrap();
    assert!(!results.path_results.unwrap().truncated);

    let api = pathway().api().with_engine(Arc::new(ReferenceEngine { max_frontier: 1 }));
    let results = api.handle_query(&query).unwrap();
    let paths = results.path_results.unwrap();
    assert!(paths.truncated);
    assert!(paths.path_count() < 2);
}

#[test]
fn test_edge_data_carries_statements_and_links() {
    let results = pathway()
        .api()
        .handle_query(&NetworkSearchQuery::between("A", "C"))
        .unwrap();
    let path = &results.path_results.unwrap().paths[&3][0];
    assert_eq!(path.edge_data.len(), path.path.len() - 1);

    let edge = &path.edge_data[0];
    assert_eq!(edge.edge[0].name.as_deref(), Some("A"));
    assert!(edge.edge[0].lookup.as_deref().unwrap_or_default().contains("hgnc"));
    let support = &edge.statements["Activation"];
    assert_eq!(support.statements.len(), 1);
    assert_eq!(support.source_counts.get("reach"), Some(&1));
    assert!(support.statements[0].db_url_hash.contains(&support.statements[0].stmt_hash.to_string()));
    assert!(edge.db_url_edge.contains("subject=A@HGNC"));
}

#[test]
fn test_signed_search_follows_signs() {
    let api = pathway().api();

    let mut query = NetworkSearchQuery::between("A", "C");
    query.sign = Some(INT_MINUS);
    let results = api.handle_query(&query).unwrap();
    assert_eq!(path_names(&results, 3), vec![vec!["A", "D", "C"]]);
    let edges = &results.path_results.unwrap().paths[&3][0].edge_data;
    assert_eq!(edges[0].sign, Some(0));
    assert_eq!(edges[1].sign, Some(1));

    query.sign = Some(0);
    let results = api.handle_query(&query).unwrap();
    assert_eq!(path_names(&results, 3), vec![vec!["A", "B", "C"]]);
}

#[test]
fn test_unknown_sign_is_rejected() {
    let mut query = NetworkSearchQuery::between("A", "C");
    query.sign = Some(7);
    assert!(matches!(
        pathway().api().handle_query(&query),
        Err(SearchError::InvalidParameters(_))
    ));
}

#[test]
fn test_node_blacklist_removes_paths() {
    let mut query = NetworkSearchQuery::between("A", "C");
    query.node_blacklist = vec!["B".into()];
    let results = pathway().api().handle_query(&query).unwrap();
    assert_eq!(path_names(&results, 3), vec![vec!["A", "D", "C"]]);
}

#[test]
fn test_statement_filters_drop_unsupported_paths() {
    let api = pathway().api();

    let mut query = NetworkSearchQuery::between("A", "C");
    query.stmt_filter = vec!["inhibition".into()];
    let results = api.handle_query(&query).unwrap();
    assert_eq!(path_names(&results, 3), vec![vec!["A", "B", "C"]]);

    let mut query = NetworkSearchQuery::between("A", "C");
    query.belief_cutoff = 0.7;
    let results = api.handle_query(&query).unwrap();
    assert_eq!(path_names(&results, 3), vec![vec!["A", "B", "C"]]);
}

#[test]
fn test_hash_blacklist_applies_to_every_search() {
    // hash 1 is the A -> B activation
    let api = pathway().api().with_hash_blacklist([1].into_iter().collect());
    let results = api.handle_query(&NetworkSearchQuery::between("A", "C")).unwrap();
    assert_eq!(path_names(&results, 3), vec![vec!["A", "D", "C"]]);
}

#[test]
fn test_path_length_selects_exact_length() {
    let api = pathway().api();

    let mut query = NetworkSearchQuery::between("A", "Z");
    query.path_length = Some(4);
    let results = api.handle_query(&query).unwrap();
    let paths = results.path_results.unwrap();
    assert_eq!(paths.path_count(), 2);
    assert!(paths.paths.keys().all(|len| *len == 4));

    // nothing has three nodes: A -> Z is shorter and the rest are longer
    query.path_length = Some(3);
    let results = api.handle_query(&query).unwrap();
    assert!(results.path_results.unwrap().is_empty());
}

#[test]
fn test_k_shortest_caps_paths() {
    let mut query = NetworkSearchQuery::between("A", "Z");
    query.k_shortest = 1;
    let results = pathway().api().handle_query(&query).unwrap();
    assert_eq!(path_names(&results, 2), vec![vec!["A", "Z"]]);
    assert_eq!(results.path_results.unwrap().path_count(), 1);
}

#[test]
fn test_cull_best_node_prunes_hub() {
    let api = pathway().api();
    let query = NetworkSearchQuery::between("A", "Z");
    let all = api.handle_query(&query).unwrap();
    assert_eq!(all.path_results.unwrap().path_count(), 3);

    // after A-Z and A-B-C-Z, C is the busiest intermediate and gets culled
    let mut query = query;
    query.cull_best_node = Some(1);
    let culled = api.handle_query(&query).unwrap();
    let paths = culled.path_results.unwrap();
    assert_eq!(paths.path_count(), 2);
    assert_eq!(names(&paths.paths[&4][0]), vec!["A", "B", "C", "Z"]);
}

#[test]
fn test_two_way_search_fills_reverse_results() {
    let mut query = NetworkSearchQuery::between("A", "C");
    query.two_way = true;
    let results = pathway().api().handle_query(&query).unwrap();
    assert_eq!(results.path_results.unwrap().path_count(), 2);
    let reverse = results.reverse_path_results.unwrap();
    assert!(reverse.is_empty());
    assert_eq!(reverse.source.and_then(|n| n.name), Some("C".to_string()));
}

#[test]
fn test_shared_regulators_on_request() {
    let network = pathway().activates("Y", "B", 0.8).activates("Y", "D", 0.8).genes(&["Y"]);
    let mut query = NetworkSearchQuery::between("B", "D");
    query.shared_regulators = true;
    let results = network.api().handle_query(&query).unwrap();
    let regulators = results.shared_regulators_results.unwrap();
    assert!(!regulators.downstream);
    let mut upstream: Vec<_> = regulators
        .source_data
        .iter()
        .filter_map(|e| e.edge[0].name.clone())
        .collect();
    upstream.sort();
    assert_eq!(upstream, vec!["A", "Y"]);
}

#[test]
fn test_open_search_downstream_breadth_first() {
    let results = pathway()
        .api()
        .handle_query(&NetworkSearchQuery::downstream_of("A"))
        .unwrap();
    assert_eq!(
        path_names(&results, 2),
        vec![vec!["A", "B"], vec!["A", "D"], vec!["A", "Z"]]
    );
    assert_eq!(
        path_names(&results, 3),
        vec![vec!["A", "B", "C"], vec!["A", "D", "C"]]
    );
    assert!(results.shared_target_results.is_none());
}

#[test]
fn test_open_search_upstream_returns_paths_end_last() {
    let results = pathway()
        .api()
        .handle_query(&NetworkSearchQuery::upstream_of("Z"))
        .unwrap();
    assert_eq!(path_names(&results, 2), vec![vec!["A", "Z"], vec!["C", "Z"]]);
    assert_eq!(
        path_names(&results, 3),
        vec![vec!["B", "C", "Z"], vec!["D", "C", "Z"]]
    );
}

#[test]
fn test_open_search_allowed_namespaces() {
    let network = pathway().node("M", "CHEBI", "CHEBI:1").activates("A", "M", 0.9);
    let mut query = NetworkSearchQuery::downstream_of("A");
    query.allowed_ns = vec!["chebi".into()];
    query.depth_limit = 1;
    let results = network.api().handle_query(&query).unwrap();
    assert_eq!(path_names(&results, 2), vec![vec!["A", "M"]]);
}

#[test]
fn test_weighted_open_search_orders_by_cost() {
    let mut query = NetworkSearchQuery::downstream_of("A");
    query.weighted = Weighting::Belief;
    let results = pathway().api().handle_query(&query).unwrap();
    // settled by belief cost: B, C via B, Z, then D
    assert_eq!(
        path_names(&results, 2),
        vec![vec!["A", "B"], vec!["A", "Z"], vec!["A", "D"]]
    );
    assert_eq!(path_names(&results, 3), vec![vec!["A", "B", "C"]]);
}

#[test]
fn test_missing_endpoints() {
    let err = pathway()
        .api()
        .handle_query(&NetworkSearchQuery::default())
        .unwrap_err();
    assert!(matches!(err, SearchError::MissingParameters(_)));
}

#[test]
fn test_unknown_entities_give_empty_results() {
    let results = pathway()
        .api()
        .handle_query(&NetworkSearchQuery::between("A", "NOPE"))
        .unwrap();
    assert!(results.path_results.unwrap().is_empty());
    assert!(results.shared_target_results.unwrap().is_empty());
}

#[test]
fn test_zero_timeout_returns_partial_envelope() {
    let mut query = NetworkSearchQuery::between("A", "C");
    query.user_timeout = Some(0.0);
    let results = pathway().api().handle_query(&query).unwrap();
    assert!(results.timed_out);
    assert_eq!(results.time_limit, Some(0.0));
    assert!(results.path_results.is_none());

    let mut query = NetworkSearchQuery::downstream_of("A");
    query.user_timeout = Some(0.0);
    let results = pathway().api().handle_query(&query).unwrap();
    assert!(results.timed_out);
    assert!(results.path_results.unwrap().is_empty());
}

#[test]
fn test_strict_context_restricts_to_supported_statements() {
    // hashes 3 and 4 are A -> D and D -| C
    let counts = InMemoryRefCounts::new()
        .with_count("D000001", 3, 2)
        .with_count("D000001", 4, 1)
        .with_total(3, 10)
        .with_total(4, 10);
    let api = pathway().api().with_ref_counts(Arc::new(counts));

    let mut query = NetworkSearchQuery::between("A", "C");
    query.mesh_ids = vec!["D000001".into()];
    query.strict_mesh_id_filtering = true;
    let results = api.handle_query(&query).unwrap();
    assert_eq!(path_names(&results, 3), vec![vec!["A", "D", "C"]]);
    assert_eq!(results.hashes, vec!["3".to_string(), "4".to_string()]);
}

#[test]
fn test_context_weighting_prefers_supported_edges() {
    let counts = InMemoryRefCounts::new()
        .with_count("D000001", 3, 9)
        .with_count("D000001", 4, 9)
        .with_total(3, 10)
        .with_total(4, 10);
    let api = pathway().api().with_ref_counts(Arc::new(counts));

    let mut query = NetworkSearchQuery::between("A", "C");
    query.mesh_ids = vec!["D000001".into()];
    let results = api.handle_query(&query).unwrap();
    assert_eq!(
        path_names(&results, 3),
        vec![vec!["A", "D", "C"], vec!["A", "B", "C"]]
    );
}

#[test]
fn test_ontology_parents_when_lookup_configured() {
    let ontology = InMemoryOntology::new()
        .with_parent(OntologyTerm::new("HGNC", "A"), OntologyTerm::new("FPLX", "AC"), "isa")
        .with_parent(OntologyTerm::new("HGNC", "C"), OntologyTerm::new("FPLX", "AC"), "isa")
        .with_name(OntologyTerm::new("FPLX", "AC"), "AC_family");
    let results = pathway()
        .api()
        .with_ontology(Arc::new(ontology))
        .handle_query(&NetworkSearchQuery::between("A", "C"))
        .unwrap();
    let ontology = results.ontology_results.unwrap();
    assert_eq!(ontology.parents.len(), 1);
    assert_eq!(ontology.parents[0].name.as_deref(), Some("AC_family"));
    assert_eq!(ontology.parents[0].namespace, "FPLX");
}

#[test]
fn test_query_hash_ignores_format() {
    let api = pathway().api();
    let mut query = NetworkSearchQuery::between("A", "C");
    let first = api.handle_query(&query).unwrap();
    query.format = "html".into();
    let second = api.handle_query(&query).unwrap();
    assert_eq!(first.query_hash, second.query_hash);

    query.target = "Z".into();
    let third = api.handle_query(&query).unwrap();
    assert_ne!(first.query_hash, third.query_hash);
}

#[test]
fn test_results_envelope_serializes() {
    let results = pathway()
        .api()
        .handle_query(&NetworkSearchQuery::between("A", "C"))
        .unwrap();
    let value = serde_json::to_value(&results).unwrap();
    assert_eq!(value["timed_out"], serde_json::json!(false));
    assert!(value["path_results"]["paths"]["3"].is_array());
    let back: netsearch::Results = serde_json::from_value(value).unwrap();
    assert_eq!(back.query_hash, results.query_hash);
    assert_eq!(back.path_results.map(|p| p.path_count()), Some(2));
}

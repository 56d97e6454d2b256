//! Result data model, serialized directly to clients

use crate::graph::{NodeKey, RawStatement};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A grounded entity as presented in results
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub namespace: String,
    pub identifier: String,
    /// Deep link to an identifier resolver
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lookup: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sign: Option<u8>,
}

impl Node {
    pub fn new(
        name: impl Into<String>,
        namespace: impl Into<String>,
        identifier: impl Into<String>,
    ) -> Self {
        Self {
            name: Some(name.into()),
            namespace: namespace.into(),
            identifier: identifier.into(),
            lookup: None,
            sign: None,
        }
    }

    pub fn with_sign(mut self, sign: Option<u8>) -> Self {
        self.sign = sign;
        self
    }

    pub fn with_lookup(mut self, lookup: Option<String>) -> Self {
        self.lookup = lookup;
        self
    }

    /// Identity comparison: namespace, identifier and sign (lookup and
    /// display name are presentation only)
    pub fn same_entity(&self, other: &Node) -> bool {
        self.namespace == other.namespace
            && self.identifier == other.identifier
            && self.sign == other.sign
    }

    /// Graph key for this node, if it carries a graph name
    pub fn key(&self) -> Option<NodeKey> {
        self.name.as_ref().map(|name| NodeKey {
            name: name.clone(),
            sign: self.sign,
        })
    }
}

/// One statement supporting an edge
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StmtData {
    pub stmt_type: String,
    pub evidence_count: u64,
    pub stmt_hash: i64,
    pub source_counts: BTreeMap<String, u64>,
    pub belief: f64,
    pub curated: bool,
    pub english: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<f64>,
    #[serde(default)]
    pub residue: String,
    #[serde(default)]
    pub position: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub initial_sign: Option<u8>,
    /// Link to the statement's evidence page
    pub db_url_hash: String,
}

impl StmtData {
    /// Validate a raw record; the error names the offending field
    pub fn from_raw(raw: &RawStatement, db_url_hash: String) -> Result<Self, String> {
        if raw.stmt_type.trim().is_empty() {
            return Err("empty stmt_type".into());
        }
        if raw.evidence_count < 1 {
            return Err(format!("evidence_count {} < 1", raw.evidence_count));
        }
        if !raw.belief.is_finite() || !(0.0..=1.0).contains(&raw.belief) {
            return Err(format!("belief {} outside [0, 1]", raw.belief));
        }
        let initial_sign = match raw.initial_sign {
            None => None,
            Some(s @ 0..=1) => Some(s as u8),
            Some(s) => return Err(format!("initial_sign {} not in {{0, 1}}", s)),
        };
        let mut source_counts = BTreeMap::new();
        for (source, &count) in &raw.source_counts {
            let count = u64::try_from(count)
                .map_err(|_| format!("negative source count for {}", source))?;
            source_counts.insert(source.clone(), count);
        }
        Ok(Self {
            stmt_type: raw.stmt_type.clone(),
            evidence_count: raw.evidence_count as u64,
            stmt_hash: raw.stmt_hash,
            source_counts,
            belief: raw.belief,
            curated: raw.curated,
            english: raw.english.clone(),
            weight: raw.weight,
            residue: raw.residue.clone().unwrap_or_default(),
            position: raw.position.clone().unwrap_or_default(),
            initial_sign,
            db_url_hash,
        })
    }
}

/// Statements of one type supporting an edge
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StmtTypeSupport {
    pub stmt_type: String,
    pub source_counts: BTreeMap<String, u64>,
    pub statements: Vec<StmtData>,
}

impl StmtTypeSupport {
    pub fn new(stmt_type: impl Into<String>) -> Self {
        Self {
            stmt_type: stmt_type.into(),
            source_counts: BTreeMap::new(),
            statements: Vec::new(),
        }
    }

    /// Recompute the summed source counts from the contained statements
    pub fn set_source_counts(&mut self) {
        self.source_counts = sum_source_counts(self.statements.iter().map(|s| &s.source_counts));
    }
}

pub(crate) fn sum_source_counts<'a>(
    counts: impl Iterator<Item = &'a BTreeMap<String, u64>>,
) -> BTreeMap<String, u64> {
    let mut total = BTreeMap::new();
    for map in counts {
        for (source, count) in map {
            *total.entry(source.clone()).or_insert(0) += count;
        }
    }
    total
}

/// Supporting data for one edge.
///
/// Never empty: an edge whose statements are all filtered out is dropped
/// instead of being emitted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EdgeData {
    pub edge: [Node; 2],
    /// Keyed by statement type
    pub statements: BTreeMap<String, StmtTypeSupport>,
    pub belief: f64,
    pub weight: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context_weight: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub z_score: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub corr_weight: Option<f64>,
    /// Set for signed edges: 0 when both ends share a sign, 1 otherwise
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sign: Option<u8>,
    pub db_url_edge: String,
    pub source_counts: BTreeMap<String, u64>,
}

impl EdgeData {
    pub fn is_empty(&self) -> bool {
        self.statements.is_empty()
    }

    pub fn set_source_counts(&mut self) {
        self.source_counts = sum_source_counts(self.statements.values().map(|s| &s.source_counts));
    }
}

/// Edge data keyed by statement hash, used for subgraph results
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EdgeDataByHash {
    pub edge: [Node; 2],
    pub stmts: BTreeMap<i64, StmtData>,
    pub belief: f64,
    pub weight: f64,
    pub db_url_edge: String,
    /// Link per statement type
    pub url_by_type: BTreeMap<String, String>,
}

/// One path with its co-ordered edge data:
/// `path = [a, b, c]`, `edge_data = [(a, b), (b, c)]`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Path {
    pub path: Vec<Node>,
    pub edge_data: Vec<EdgeData>,
}

impl Path {
    pub fn is_empty(&self) -> bool {
        self.path.is_empty() || self.edge_data.is_empty()
    }
}

/// Results of any of the path algorithms
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathResultData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<Node>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<Node>,
    /// Keyed by node count, discovery order within each bucket
    pub paths: BTreeMap<usize, Vec<Path>>,
    /// The traversal hit its memory cap and dropped partial paths
    #[serde(default)]
    pub truncated: bool,
}

impl PathResultData {
    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    /// Number of paths across all buckets
    pub fn path_count(&self) -> usize {
        self.paths.values().map(Vec::len).sum()
    }
}

/// Results of the shared ontology parent search
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OntologyResults {
    pub source: Node,
    pub target: Node,
    pub parents: Vec<Node>,
}

impl OntologyResults {
    pub fn is_empty(&self) -> bool {
        self.parents.is_empty()
    }
}

/// Results of the shared targets or shared regulators search.
///
/// `source_data[i]` and `target_data[i]` share the same neighbor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SharedInteractorsResults {
    pub source_data: Vec<EdgeData>,
    pub target_data: Vec<EdgeData>,
    pub downstream: bool,
}

impl SharedInteractorsResults {
    pub fn is_empty(&self) -> bool {
        self.source_data.is_empty() && self.target_data.is_empty()
    }
}

/// Results of the induced subgraph search
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubgraphResults {
    pub input_nodes: Vec<Node>,
    pub not_in_graph: Vec<Node>,
    pub available_nodes: Vec<Node>,
    pub edges: Vec<EdgeDataByHash>,
}

/// Results of the multi-node common neighbor search
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MultiInteractorsResults {
    pub targets: Vec<Node>,
    pub regulators: Vec<Node>,
    pub edge_data: Vec<EdgeData>,
}

/// Envelope wrapping everything produced for one network search query
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Results {
    pub query_hash: String,
    /// Time budget in seconds, if any
    pub time_limit: Option<f64>,
    pub timed_out: bool,
    /// Statement hashes with context support, as strings
    #[serde(default)]
    pub hashes: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path_results: Option<PathResultData>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reverse_path_results: Option<PathResultData>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ontology_results: Option<OntologyResults>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shared_target_results: Option<SharedInteractorsResults>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shared_regulators_results: Option<SharedInteractorsResults>,
}

impl Results {
    pub fn new(query_hash: impl Into<String>, time_limit: Option<f64>) -> Self {
        Self {
            query_hash: query_hash.into(),
            time_limit,
            timed_out: false,
            hashes: Vec::new(),
            path_results: None,
            reverse_path_results: None,
            ontology_results: None,
            shared_target_results: None,
            shared_regulators_results: None,
        }
    }
}

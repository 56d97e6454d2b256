//! Common test utilities for netsearch integration tests
//!
//! Builds small interaction networks in both graph views, writes them as
//! snapshot files, and generates seeded random networks.

#![allow(dead_code)]

use netsearch::graph::{EdgeRecord, NodeRecord, INT_MINUS, INT_PLUS};
use netsearch::{GraphSnapshot, InteractionGraph, NetworkSearchApi, NodeKey, RawStatement};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::BTreeMap;
use std::io::Write;
use std::sync::Arc;
use tempfile::NamedTempFile;

/// Statement types read as inhibitory when building the signed view
const NEGATIVE_TYPES: &[&str] = &["Inhibition", "DecreaseAmount"];

/// A network described once and built into unsigned and signed graphs.
///
/// Edge signs follow the statement type: inhibitory statements connect
/// opposite signs, everything else connects equal signs.
#[derive(Debug, Clone, Default)]
pub struct TestNetwork {
    nodes: Vec<(String, String, String)>,
    edges: BTreeMap<(String, String), Vec<RawStatement>>,
    next_hash: i64,
}

impl TestNetwork {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a grounded node
    pub fn node(mut self, name: &str, ns: &str, id: &str) -> Self {
        self.nodes.push((name.into(), ns.into(), id.into()));
        self
    }

    /// Add HGNC nodes named after themselves
    pub fn genes(mut self, names: &[&str]) -> Self {
        for name in names {
            self = self.node(name, "HGNC", name);
        }
        self
    }

    /// Add an activation with a fresh statement hash
    pub fn activates(self, source: &str, target: &str, belief: f64) -> Self {
        self.statement(source, target, "Activation", belief)
    }

    /// Add an inhibition with a fresh statement hash
    pub fn inhibits(self, source: &str, target: &str, belief: f64) -> Self {
        self.statement(source, target, "Inhibition", belief)
    }

    pub fn statement(mut self, source: &str, target: &str, stmt_type: &str, belief: f64) -> Self {
        self.next_hash += 1;
        let stmt = RawStatement::new(stmt_type, self.next_hash, belief).with_source("reach", 1);
        self.raw(source, target, stmt)
    }

    /// Add a fully specified statement record
    pub fn raw(mut self, source: &str, target: &str, stmt: RawStatement) -> Self {
        self.edges
            .entry((source.to_string(), target.to_string()))
            .or_default()
            .push(stmt);
        self
    }

    fn node_records(&self, signed: bool) -> Vec<NodeRecord> {
        let signs: &[Option<u8>] = if signed {
            &[Some(INT_PLUS), Some(INT_MINUS)]
        } else {
            &[None]
        };
        self.nodes
            .iter()
            .flat_map(|(name, ns, id)| {
                signs.iter().map(move |sign| NodeRecord {
                    name: name.clone(),
                    sign: *sign,
                    ns: ns.clone(),
                    id: id.clone(),
                })
            })
            .collect()
    }

    fn edge_records(&self, signed: bool) -> Vec<EdgeRecord> {
        let mut records = Vec::new();
        for ((source, target), stmts) in &self.edges {
            if !signed {
                records.push(EdgeRecord {
                    source: NodeKey::unsigned(source.as_str()),
                    target: NodeKey::unsigned(target.as_str()),
                    attrs: netsearch::EdgeAttrs::from_statements(stmts.clone()),
                });
                continue;
            }
            let (negative, positive): (Vec<RawStatement>, Vec<RawStatement>) = stmts
                .iter()
                .cloned()
                .partition(|s| NEGATIVE_TYPES.contains(&s.stmt_type.as_str()));
            for (group, flip) in [(positive, false), (negative, true)] {
                if group.is_empty() {
                    continue;
                }
                for sign in [INT_PLUS, INT_MINUS] {
                    let target_sign = if flip { 1 - sign } else { sign };
                    records.push(EdgeRecord {
                        source: NodeKey::signed(source.as_str(), sign),
                        target: NodeKey::signed(target.as_str(), target_sign),
                        attrs: netsearch::EdgeAttrs::from_statements(group.clone()),
                    });
                }
            }
        }
        records
    }

    pub fn snapshot(&self, signed: bool) -> GraphSnapshot {
        GraphSnapshot {
            signed,
            nodes: self.node_records(signed),
            edges: self.edge_records(signed),
        }
    }

    pub fn unsigned(&self) -> InteractionGraph {
        self.snapshot(false).into_graph()
    }

    pub fn signed(&self) -> InteractionGraph {
        self.snapshot(true).into_graph()
    }

    /// Search API over both views of this network
    pub fn api(&self) -> NetworkSearchApi {
        NetworkSearchApi::new(Arc::new(self.unsigned()), Arc::new(self.signed()))
    }
}

/// A -> B -> C with a side branch through D and a shared target Z:
///
/// ```text
/// A -> B -> C -> Z
/// A -> D -> C
/// A -> Z
/// ```
pub fn pathway() -> TestNetwork {
    TestNetwork::new()
        .genes(&["A", "B", "C", "D", "Z"])
        .activates("A", "B", 0.9)
        .activates("B", "C", 0.9)
        .activates("A", "D", 0.6)
        .inhibits("D", "C", 0.6)
        .activates("C", "Z", 0.8)
        .activates("A", "Z", 0.7)
}

/// Seeded random network over `n` genes with edge probability `p`
pub fn random_network(seed: u64, n: usize, p: f64) -> TestNetwork {
    let mut rng = StdRng::seed_from_u64(seed);
    let names: Vec<String> = (0..n).map(|i| format!("G{}", i)).collect();
    let mut network = TestNetwork::new();
    for name in &names {
        network = network.node(name, "HGNC", name);
    }
    for source in &names {
        for target in &names {
            if source != target && rng.gen_bool(p) {
                let belief = rng.gen_range(0.1..1.0);
                network = network.activates(source, target, belief);
            }
        }
    }
    network
}

/// Write a value as JSON to a temporary file
pub fn json_file<T: serde::Serialize>(value: &T) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("Failed to create temp file");
    let text = serde_json::to_string(value).expect("Failed to serialize");
    file.write_all(text.as_bytes()).expect("Failed to write temp file");
    file
}

/// Node names along a result path
pub fn names(path: &netsearch::results::Path) -> Vec<String> {
    path.path
        .iter()
        .map(|n| n.name.clone().unwrap_or_default())
        .collect()
}

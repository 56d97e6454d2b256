//! JSON graph snapshots
//!
//! A snapshot is the serialized form handed over by the graph build
//! process: a node table with grounding and an edge table with statements.

use super::edge::EdgeAttrs;
use super::network::InteractionGraph;
use super::node::{NodeAttrs, NodeKey};
use crate::error::SearchResult;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// One grounded node in a snapshot
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeRecord {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sign: Option<u8>,
    pub ns: String,
    pub id: String,
}

/// One directed edge in a snapshot
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EdgeRecord {
    pub source: NodeKey,
    pub target: NodeKey,
    #[serde(flatten)]
    pub attrs: EdgeAttrs,
}

/// Serialized graph
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GraphSnapshot {
    #[serde(default)]
    pub signed: bool,
    #[serde(default)]
    pub nodes: Vec<NodeRecord>,
    #[serde(default)]
    pub edges: Vec<EdgeRecord>,
}

impl GraphSnapshot {
    pub fn from_json_str(json: &str) -> SearchResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Read a snapshot file from disk
    pub fn load(path: impl AsRef<Path>) -> SearchResult<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    /// Build the in-memory graph
    pub fn into_graph(self) -> InteractionGraph {
        let mut graph = if self.signed {
            InteractionGraph::signed()
        } else {
            InteractionGraph::unsigned()
        };
        for node in self.nodes {
            let key = NodeKey {
                name: node.name,
                sign: node.sign,
            };
            graph.add_node(key, NodeAttrs::new(node.ns, node.id));
        }
        for edge in self.edges {
            graph.add_edge(edge.source, edge.target, edge.attrs);
        }
        graph
    }
}

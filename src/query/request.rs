//! Inbound request models

use super::filter::{FilterOptions, StmtTypeFilter};
use super::hash::query_hash;
use crate::error::{SearchError, SearchResult};
use crate::graph::WeightKey;
use crate::results::Node;
use serde::{Deserialize, Serialize};

/// Default time budget of a search, in seconds
pub const DEFAULT_TIMEOUT: f64 = 30.0;

/// How a path search weighs its edges
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Weighting {
    Belief,
    Context,
    ZScore,
    #[default]
    Unweighted,
}

impl Weighting {
    /// Edge attribute the weighting reads, if any
    pub fn weight_key(&self) -> Option<WeightKey> {
        match self {
            Weighting::Belief => Some(WeightKey::Weight),
            Weighting::Context => Some(WeightKey::ContextWeight),
            Weighting::ZScore => Some(WeightKey::CorrWeight),
            Weighting::Unweighted => None,
        }
    }
}

/// A network search request: path search between or out from entities,
/// plus optional auxiliary searches.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkSearchQuery {
    pub source: String,
    pub target: String,
    /// Statement types to exclude
    pub stmt_filter: Vec<String>,
    /// Identity only: part of the query hash, no effect on the search.
    /// Curation is filtered with `curated_db_only`.
    pub filter_curated: bool,
    pub allowed_ns: Vec<String>,
    pub node_blacklist: Vec<String>,
    /// Requested number of nodes per path
    pub path_length: Option<usize>,
    pub depth_limit: usize,
    pub sign: Option<u8>,
    pub weighted: Weighting,
    pub belief_cutoff: f64,
    pub curated_db_only: bool,
    /// Identity only: part of the query hash, no effect on the search.
    /// Family expansion of endpoints is not performed.
    pub fplx_expand: bool,
    pub k_shortest: usize,
    pub max_per_node: usize,
    pub cull_best_node: Option<usize>,
    pub mesh_ids: Vec<String>,
    pub strict_mesh_id_filtering: bool,
    pub const_c: u32,
    pub const_tk: u32,
    /// Seconds; `None` means unbounded
    pub user_timeout: Option<f64>,
    pub two_way: bool,
    pub shared_regulators: bool,
    pub terminal_ns: Vec<String>,
    pub format: String,
}

impl Default for NetworkSearchQuery {
    fn default() -> Self {
        Self {
            source: String::new(),
            target: String::new(),
            stmt_filter: Vec::new(),
            filter_curated: true,
            allowed_ns: Vec::new(),
            node_blacklist: Vec::new(),
            path_length: None,
            depth_limit: 2,
            sign: None,
            weighted: Weighting::Unweighted,
            belief_cutoff: 0.0,
            curated_db_only: false,
            fplx_expand: false,
            k_shortest: 50,
            max_per_node: 5,
            cull_best_node: None,
            mesh_ids: Vec::new(),
            strict_mesh_id_filtering: false,
            const_c: 1,
            const_tk: 10,
            user_timeout: Some(DEFAULT_TIMEOUT),
            two_way: false,
            shared_regulators: false,
            terminal_ns: Vec::new(),
            format: "json".to_string(),
        }
    }
}

impl NetworkSearchQuery {
    /// Point-to-point query between two entities
    pub fn between(source: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
            ..Self::default()
        }
    }

    /// Open query downstream of `source`
    pub fn downstream_of(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            ..Self::default()
        }
    }

    /// Open query upstream of `target`
    pub fn upstream_of(target: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            ..Self::default()
        }
    }

    pub fn has_source(&self) -> bool {
        !self.source.trim().is_empty()
    }

    pub fn has_target(&self) -> bool {
        !self.target.trim().is_empty()
    }

    /// Context weighting applies when context ids are given and the search
    /// is not restricted to them
    pub fn is_context_weighted(&self) -> bool {
        !self.mesh_ids.is_empty() && !self.strict_mesh_id_filtering
    }

    /// Whether a weighted algorithm is needed
    pub fn is_overall_weighted(&self) -> bool {
        matches!(self.weighted, Weighting::Belief | Weighting::ZScore) || self.is_context_weighted()
    }

    /// Sign as 0/1, rejecting anything else
    pub fn int_sign(&self) -> SearchResult<Option<u8>> {
        match self.sign {
            None | Some(0) | Some(1) => Ok(self.sign),
            Some(other) => Err(SearchError::invalid(format!("unknown sign {}", other))),
        }
    }

    /// Copy of the query with source and target swapped
    pub fn reverse_search(&self) -> Self {
        Self {
            source: self.target.clone(),
            target: self.source.clone(),
            ..self.clone()
        }
    }

    /// Residual filters implied by the query
    pub fn filter_options(&self) -> FilterOptions {
        FilterOptions {
            stmt_types: StmtTypeFilter::exclude(self.stmt_filter.iter()),
            allowed_ns: lowercase(&self.allowed_ns),
            node_blacklist: self.node_blacklist.clone(),
            path_length: self.path_length,
            belief_cutoff: self.belief_cutoff,
            curated_db_only: self.curated_db_only,
            max_paths: self.k_shortest,
            cull_best_node: self.cull_best_node,
            weighted: self.weighted.weight_key(),
            context_weighted: self.is_context_weighted(),
            overall_weighted: self.is_overall_weighted(),
        }
    }

    /// Content hash identifying the query, independent of output format
    pub fn query_hash(&self) -> SearchResult<String> {
        let value = serde_json::to_value(self)?;
        Ok(query_hash(&value, &["format"]).to_string())
    }
}

pub(crate) fn lowercase(values: &[String]) -> Vec<String> {
    values.iter().map(|v| v.trim().to_lowercase()).collect()
}

/// Request for the subgraph induced by a set of entities
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubgraphRequest {
    pub nodes: Vec<Node>,
    #[serde(default)]
    pub timeout: Option<f64>,
}

/// Request for common up- or downstream neighbors of a set of entities
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MultiInteractorsRequest {
    pub nodes: Vec<String>,
    pub downstream: bool,
    #[serde(default)]
    pub allowed_ns: Vec<String>,
    /// Statement types to allow; empty allows all
    #[serde(default)]
    pub stmt_types: Vec<String>,
    #[serde(default)]
    pub source_filter: Vec<String>,
    #[serde(default = "default_max_results")]
    pub max_results: usize,
    #[serde(default)]
    pub node_blacklist: Vec<String>,
    #[serde(default)]
    pub belief_cutoff: f64,
    #[serde(default)]
    pub curated_db_only: bool,
    #[serde(default = "default_timeout")]
    pub timeout: Option<f64>,
}

fn default_max_results() -> usize {
    50
}

fn default_timeout() -> Option<f64> {
    Some(DEFAULT_TIMEOUT)
}

impl MultiInteractorsRequest {
    pub fn new(nodes: Vec<String>, downstream: bool) -> Self {
        Self {
            nodes,
            downstream,
            allowed_ns: Vec::new(),
            stmt_types: Vec::new(),
            source_filter: Vec::new(),
            max_results: default_max_results(),
            node_blacklist: Vec::new(),
            belief_cutoff: 0.0,
            curated_db_only: false,
            timeout: default_timeout(),
        }
    }
}

//! Building result nodes, statements and edges from graph lookups

use super::types::{EdgeData, EdgeDataByHash, Node, StmtData, StmtTypeSupport};
use crate::graph::{InteractionGraph, NodeKey, RawStatement};
use crate::links::{edge_url, hash_url, identifiers_url, LinkTemplates};
use crate::query::{FilterOptions, StmtFilter};
use std::collections::{BTreeMap, HashSet};
use tracing::{debug, warn};

/// Turns raw graph identities into result objects under a residual filter
/// set.
///
/// Anything that cannot be materialized (ungrounded node, edge with no
/// surviving statement) comes back as `None` and the caller drops the
/// containing result.
#[derive(Debug, Clone)]
pub struct Materializer<'g> {
    graph: &'g InteractionGraph,
    filter_options: FilterOptions,
    stmt_filter: StmtFilter,
    links: LinkTemplates,
    input_nodes: Vec<Node>,
    filter_input_node: bool,
}

impl<'g> Materializer<'g> {
    pub fn new(
        graph: &'g InteractionGraph,
        filter_options: FilterOptions,
        hash_blacklist: &HashSet<i64>,
        links: LinkTemplates,
    ) -> Self {
        let stmt_filter = filter_options.stmt_filter(hash_blacklist);
        Self {
            graph,
            filter_options,
            stmt_filter,
            links,
            input_nodes: Vec::new(),
            filter_input_node: false,
        }
    }

    /// Nodes that bypass node filters
    pub fn with_input_nodes(mut self, input_nodes: Vec<Node>) -> Self {
        self.input_nodes = input_nodes;
        self
    }

    /// Apply node filters to input nodes as well
    pub fn filtering_input_nodes(mut self, filter_input_node: bool) -> Self {
        self.filter_input_node = filter_input_node;
        self
    }

    pub fn graph(&self) -> &'g InteractionGraph {
        self.graph
    }

    pub fn filter_options(&self) -> &FilterOptions {
        &self.filter_options
    }

    pub fn add_input_node(&mut self, node: Node) {
        self.input_nodes.push(node);
    }

    /// Result node for a graph key; `None` if ungrounded or filtered out
    pub fn node(&self, key: &NodeKey, apply_filter: bool) -> Option<Node> {
        let attrs = self.graph.node_attrs(key)?;
        let node = Node::new(key.name.clone(), attrs.ns.clone(), attrs.id.clone()).with_sign(key.sign);
        let bypass = !apply_filter
            || (!self.filter_input_node && self.input_nodes.iter().any(|n| n.same_entity(&node)));
        if !bypass && !self.passes_node_filters(&node) {
            return None;
        }
        let lookup = identifiers_url(&node.namespace, &node.identifier);
        Some(node.with_lookup(lookup))
    }

    fn passes_node_filters(&self, node: &Node) -> bool {
        if self.filter_options.no_node_filters() {
            return true;
        }
        let blacklisted = node
            .name
            .as_deref()
            .map_or(false, |name| self.filter_options.is_blacklisted(name));
        self.filter_options.allows_ns(&node.namespace) && !blacklisted
    }

    /// Validated statement data if the statement passes the filter chain
    pub fn stmt_data(&self, raw: &RawStatement, ev_limit: Option<usize>) -> Option<StmtData> {
        if !self.stmt_filter.passes(raw) {
            return None;
        }
        let url = hash_url(&self.links.hash, raw.stmt_hash, ev_limit);
        match StmtData::from_raw(raw, url) {
            Ok(stmt) => Some(stmt),
            Err(reason) => {
                warn!(
                    stmt_hash = raw.stmt_hash,
                    english = %raw.english,
                    %reason,
                    "skipping malformed statement"
                );
                None
            }
        }
    }

    fn edge_link(&self, a: &Node, b: &Node) -> String {
        edge_url(
            &self.links.edge,
            (&a.namespace, &a.identifier),
            (&b.namespace, &b.identifier),
            self.links.ev_limit,
        )
    }

    /// Edge data for `u -> v` with endpoints materialized under node filters
    pub fn edge_data(&self, u: &NodeKey, v: &NodeKey) -> Option<EdgeData> {
        let a = self.node(u, true)?;
        let b = self.node(v, true)?;
        self.edge_data_for(a, b, u, v)
    }

    /// Edge data for already materialized endpoints.
    ///
    /// Statement groups are keyed by statement type, so they come out in
    /// type-name order rather than the order statements are stored on the
    /// edge. Edge belief is clamped to `[0, 1]`.
    pub fn edge_data_for(&self, a: Node, b: Node, u: &NodeKey, v: &NodeKey) -> Option<EdgeData> {
        let attrs = self.graph.edge(u, v)?;
        let mut statements: BTreeMap<String, StmtTypeSupport> = BTreeMap::new();
        for raw in &attrs.statements {
            if let Some(stmt) = self.stmt_data(raw, None) {
                statements
                    .entry(stmt.stmt_type.clone())
                    .or_insert_with(|| StmtTypeSupport::new(stmt.stmt_type.clone()))
                    .statements
                    .push(stmt);
            }
        }
        if statements.is_empty() {
            return None;
        }
        for support in statements.values_mut() {
            support.set_source_counts();
        }
        let sign = match (u.sign, v.sign) {
            (Some(s), Some(t)) => Some(u8::from(s != t)),
            _ => None,
        };
        let db_url_edge = self.edge_link(&a, &b);
        let mut edge = EdgeData {
            edge: [a, b],
            statements,
            belief: clamped_belief(attrs.belief, u, v),
            weight: attrs.weight,
            context_weight: attrs.context_weight.filter(|w| *w != 0.0),
            z_score: attrs.z_score,
            corr_weight: attrs.corr_weight,
            sign,
            db_url_edge,
            source_counts: BTreeMap::new(),
        };
        edge.set_source_counts();
        Some(edge)
    }

    /// Edge data keyed by statement hash, with per-type links. Statements
    /// are ordered by hash; edge belief is clamped to `[0, 1]`.
    pub fn edge_data_by_hash(&self, a: Node, b: Node, u: &NodeKey, v: &NodeKey) -> Option<EdgeDataByHash> {
        let attrs = self.graph.edge(u, v)?;
        let stmts: BTreeMap<i64, StmtData> = attrs
            .statements
            .iter()
            .filter_map(|raw| self.stmt_data(raw, Some(self.links.ev_limit)))
            .map(|stmt| (stmt.stmt_hash, stmt))
            .collect();
        if stmts.is_empty() {
            return None;
        }
        let db_url_edge = self.edge_link(&a, &b);
        let url_by_type = stmts
            .values()
            .map(|s| (s.stmt_type.clone(), format!("{}&type={}", db_url_edge, s.stmt_type)))
            .collect();
        Some(EdgeDataByHash {
            edge: [a, b],
            stmts,
            belief: clamped_belief(attrs.belief, u, v),
            weight: attrs.weight,
            db_url_edge,
            url_by_type,
        })
    }
}

fn clamped_belief(belief: f64, u: &NodeKey, v: &NodeKey) -> f64 {
    let clamped = belief.clamp(0.0, 1.0);
    if clamped != belief {
        debug!(source = %u, target = %v, belief, "edge belief out of range, clamped");
    }
    clamped
}

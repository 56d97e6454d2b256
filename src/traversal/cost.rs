//! Edge costs for weighted traversal

use crate::graph::{InteractionGraph, NodeKey, WeightKey};
use crate::query::RefCountsFn;

/// How a traversal prices an edge
#[derive(Debug, Clone)]
pub(crate) enum EdgeCost {
    /// Every edge costs one hop
    Hops,
    /// Named edge attribute; edges lacking it cost 1
    Attribute(WeightKey),
    /// `-ln((refs + c) / (total + tk))` from context reference counts
    Context {
        ref_counts: RefCountsFn,
        const_c: u32,
        const_tk: u32,
    },
}

impl EdgeCost {
    pub(crate) fn new(
        weight: Option<WeightKey>,
        ref_counts: Option<&RefCountsFn>,
        const_c: u32,
        const_tk: u32,
    ) -> Self {
        match (ref_counts, weight) {
            (Some(ref_counts), _) => EdgeCost::Context {
                ref_counts: ref_counts.clone(),
                const_c,
                const_tk,
            },
            (None, Some(key)) => EdgeCost::Attribute(key),
            (None, None) => EdgeCost::Hops,
        }
    }

    /// Non-negative cost of `u -> v`
    pub(crate) fn of(&self, graph: &InteractionGraph, u: &NodeKey, v: &NodeKey) -> f64 {
        match self {
            EdgeCost::Hops => 1.0,
            EdgeCost::Attribute(key) => graph
                .edge(u, v)
                .and_then(|attrs| attrs.attr(*key))
                .unwrap_or(1.0)
                .max(0.0),
            EdgeCost::Context {
                ref_counts,
                const_c,
                const_tk,
            } => {
                let (refs, total) = ref_counts.counts(graph, u, v);
                let ratio = (refs + u64::from(*const_c)) as f64 / (total + u64::from(*const_tk)) as f64;
                (-ratio.ln()).max(0.0)
            }
        }
    }
}

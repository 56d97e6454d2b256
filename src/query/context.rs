//! Context weighting from literature reference counts

use super::options::RefCountsFn;
use crate::error::LookupError;
use crate::graph::InteractionGraph;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

/// Key holding the total reference count of a statement
pub const TOTAL_KEY: &str = "total";

/// Reference counts per statement hash: context id (or `"total"`) to count
pub type HashRefCounts = HashMap<i64, HashMap<String, u64>>;

/// External lookup of reference counts for a set of context identifiers
pub trait RefCountLookup: Send + Sync {
    /// Counts for every statement with references to any of `context_ids`
    fn ref_counts(&self, context_ids: &[String]) -> Result<HashRefCounts, LookupError>;
}

/// In-memory reference count table
#[derive(Debug, Clone, Default)]
pub struct InMemoryRefCounts {
    by_context: HashMap<String, HashMap<i64, u64>>,
    totals: HashMap<i64, u64>,
}

impl InMemoryRefCounts {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the total number of references of a statement
    pub fn with_total(mut self, stmt_hash: i64, total: u64) -> Self {
        self.totals.insert(stmt_hash, total);
        self
    }

    /// Record references of a statement tagged with a context id
    pub fn with_count(mut self, context_id: impl Into<String>, stmt_hash: i64, count: u64) -> Self {
        self.by_context
            .entry(context_id.into())
            .or_default()
            .insert(stmt_hash, count);
        self
    }
}

impl RefCountLookup for InMemoryRefCounts {
    fn ref_counts(&self, context_ids: &[String]) -> Result<HashRefCounts, LookupError> {
        let mut out: HashRefCounts = HashMap::new();
        for id in context_ids {
            let Some(counts) = self.by_context.get(id) else {
                continue;
            };
            for (&hash, &count) in counts {
                let entry = out.entry(hash).or_default();
                entry.insert(id.clone(), count);
                let total = self.totals.get(&hash).copied().unwrap_or(count);
                entry.insert(TOTAL_KEY.to_string(), total);
            }
        }
        Ok(out)
    }
}

/// Reference counts fetched once for a query
#[derive(Debug, Clone, Default)]
pub struct ContextWeighting {
    counts: Arc<HashRefCounts>,
}

impl ContextWeighting {
    /// Fetch the counts for `context_ids`; lookup failures propagate
    pub fn fetch(lookup: &dyn RefCountLookup, context_ids: &[String]) -> Result<Self, LookupError> {
        let counts = lookup.ref_counts(context_ids)?;
        tracing::debug!(hashes = counts.len(), "fetched reference counts");
        Ok(Self::from_counts(counts))
    }

    pub fn from_counts(counts: HashRefCounts) -> Self {
        Self {
            counts: Arc::new(counts),
        }
    }

    /// Statement hashes with any reference support
    pub fn related_hashes(&self) -> HashSet<i64> {
        self.counts.keys().copied().collect()
    }

    /// Counts of the best supported hash among `hashes`.
    ///
    /// The ratio of context references to total references is maximized;
    /// the first strictly better hash wins. Returns `(0, 1)` when no hash
    /// has support.
    pub fn score(&self, hashes: impl IntoIterator<Item = i64>) -> (u64, u64) {
        let mut best = (0_u64, 1_u64);
        let mut max_ratio = 0.0_f64;
        for hash in hashes {
            let (refs, total) = match self.counts.get(&hash) {
                Some(counts) => {
                    let refs: u64 = counts
                        .iter()
                        .filter(|(k, _)| k.as_str() != TOTAL_KEY)
                        .map(|(_, v)| *v)
                        .sum();
                    let total = counts.get(TOTAL_KEY).copied().unwrap_or(0).max(1);
                    (refs, total)
                }
                None => (0, 1),
            };
            let ratio = refs as f64 / total as f64;
            if ratio > max_ratio {
                max_ratio = ratio;
                best = (refs, total);
            }
        }
        best
    }

    /// Scoring callback over the statements of a graph edge
    pub fn edge_scorer(&self) -> RefCountsFn {
        let weighting = self.clone();
        RefCountsFn::new(move |graph: &InteractionGraph, u, v| match graph.edge(u, v) {
            Some(attrs) => weighting.score(attrs.statements.iter().map(|s| s.stmt_hash)),
            None => (0, 1),
        })
    }
}

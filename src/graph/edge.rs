//! Edge attributes and the raw statements supporting them

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Edge attribute used as a traversal weight
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeightKey {
    /// Belief-derived weight
    Weight,
    /// Weight derived from context (reference count) support
    ContextWeight,
    /// Weight derived from a correlation z-score
    CorrWeight,
}

impl WeightKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            WeightKey::Weight => "weight",
            WeightKey::ContextWeight => "context_weight",
            WeightKey::CorrWeight => "corr_weight",
        }
    }
}

/// One statement record as stored on a graph edge.
///
/// Records come from an external build process and are not trusted;
/// numeric ranges are checked when the record is materialized into a result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawStatement {
    pub stmt_type: String,
    #[serde(default = "one")]
    pub evidence_count: i64,
    pub stmt_hash: i64,
    #[serde(default)]
    pub source_counts: BTreeMap<String, i64>,
    pub belief: f64,
    #[serde(default)]
    pub curated: bool,
    #[serde(default)]
    pub english: String,
    #[serde(default)]
    pub weight: Option<f64>,
    #[serde(default)]
    pub residue: Option<String>,
    #[serde(default)]
    pub position: Option<String>,
    #[serde(default)]
    pub initial_sign: Option<i64>,
}

fn one() -> i64 {
    1
}

impl RawStatement {
    /// Minimal well-formed statement, used by graph builders and tests
    pub fn new(stmt_type: impl Into<String>, stmt_hash: i64, belief: f64) -> Self {
        Self {
            stmt_type: stmt_type.into(),
            evidence_count: 1,
            stmt_hash,
            source_counts: BTreeMap::new(),
            belief,
            curated: false,
            english: String::new(),
            weight: None,
            residue: None,
            position: None,
            initial_sign: None,
        }
    }

    pub fn curated(mut self, curated: bool) -> Self {
        self.curated = curated;
        self
    }

    pub fn with_source(mut self, source: impl Into<String>, count: i64) -> Self {
        self.source_counts.insert(source.into(), count);
        self
    }
}

/// Attributes of a directed edge
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EdgeAttrs {
    pub statements: Vec<RawStatement>,
    /// Aggregated belief over all statements
    pub belief: f64,
    /// Weight corresponding to the aggregated belief
    pub weight: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context_weight: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub z_score: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub corr_weight: Option<f64>,
}

impl EdgeAttrs {
    /// Edge supported by `statements`, aggregating belief as
    /// `1 - prod(1 - b)` and weight as `-ln(belief)`
    pub fn from_statements(statements: Vec<RawStatement>) -> Self {
        let disbelief: f64 = statements
            .iter()
            .map(|s| 1.0 - s.belief.clamp(0.0, 1.0))
            .product();
        let belief = 1.0 - disbelief;
        let weight = if belief > 0.0 { -belief.ln() } else { f64::MAX };
        Self {
            statements,
            belief,
            weight,
            context_weight: None,
            z_score: None,
            corr_weight: None,
        }
    }

    /// Value of a weight attribute, if present
    pub fn attr(&self, key: WeightKey) -> Option<f64> {
        match key {
            WeightKey::Weight => Some(self.weight),
            WeightKey::ContextWeight => self.context_weight,
            WeightKey::CorrWeight => self.corr_weight,
        }
    }

    /// Highest belief among the supporting statements
    pub fn max_statement_belief(&self) -> f64 {
        self.statements
            .iter()
            .map(|s| s.belief)
            .fold(0.0_f64, f64::max)
    }
}

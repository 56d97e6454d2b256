//! Residual filter configuration

use crate::graph::{RawStatement, WeightKey};
use std::collections::{BTreeSet, HashSet};

/// Statement type restriction, compared case-insensitively.
///
/// Path requests exclude types; multi-interactor requests allow them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StmtTypeFilter {
    Allow(BTreeSet<String>),
    Exclude(BTreeSet<String>),
}

impl Default for StmtTypeFilter {
    fn default() -> Self {
        StmtTypeFilter::Exclude(BTreeSet::new())
    }
}

impl StmtTypeFilter {
    pub fn allow<S: AsRef<str>>(types: impl IntoIterator<Item = S>) -> Self {
        StmtTypeFilter::Allow(normalize(types))
    }

    pub fn exclude<S: AsRef<str>>(types: impl IntoIterator<Item = S>) -> Self {
        StmtTypeFilter::Exclude(normalize(types))
    }

    /// True when every type passes. An empty allow-list allows all.
    pub fn is_open(&self) -> bool {
        match self {
            StmtTypeFilter::Allow(set) | StmtTypeFilter::Exclude(set) => set.is_empty(),
        }
    }

    pub fn permits(&self, stmt_type: &str) -> bool {
        let lower = stmt_type.to_lowercase();
        match self {
            StmtTypeFilter::Allow(set) => set.is_empty() || set.contains(&lower),
            StmtTypeFilter::Exclude(set) => !set.contains(&lower),
        }
    }
}

fn normalize<S: AsRef<str>>(types: impl IntoIterator<Item = S>) -> BTreeSet<String> {
    types
        .into_iter()
        .map(|t| t.as_ref().trim().to_lowercase())
        .filter(|t| !t.is_empty())
        .collect()
}

/// Statement-level filter chain shared by traversal predicates, neighbor
/// search and edge materialization.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StmtFilter {
    pub stmt_types: StmtTypeFilter,
    pub hash_blacklist: HashSet<i64>,
    pub curated_db_only: bool,
    pub belief_cutoff: f64,
}

impl StmtFilter {
    pub fn is_open(&self) -> bool {
        self.stmt_types.is_open()
            && self.hash_blacklist.is_empty()
            && !self.curated_db_only
            && self.belief_cutoff <= 0.0
    }

    /// Check a statement: hash blacklist, type, belief (strict), curated
    pub fn passes(&self, stmt: &RawStatement) -> bool {
        if self.hash_blacklist.contains(&stmt.stmt_hash) {
            return false;
        }
        if !self.stmt_types.permits(&stmt.stmt_type) {
            return false;
        }
        if self.belief_cutoff > 0.0 && stmt.belief <= self.belief_cutoff {
            return false;
        }
        if self.curated_db_only && !stmt.curated {
            return false;
        }
        true
    }
}

/// A single field of [`FilterOptions`], used to strip filters that an
/// upstream search already enforced
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterField {
    StmtTypes,
    AllowedNs,
    NodeBlacklist,
    PathLength,
    BeliefCutoff,
    CuratedDbOnly,
    CullBestNode,
}

/// Filters applied while materializing results
#[derive(Debug, Clone, PartialEq)]
pub struct FilterOptions {
    pub stmt_types: StmtTypeFilter,
    /// Lowercased namespaces
    pub allowed_ns: Vec<String>,
    pub node_blacklist: Vec<String>,
    /// Requested number of nodes per path
    pub path_length: Option<usize>,
    pub belief_cutoff: f64,
    pub curated_db_only: bool,
    pub max_paths: usize,
    pub cull_best_node: Option<usize>,
    pub weighted: Option<WeightKey>,
    pub context_weighted: bool,
    pub overall_weighted: bool,
}

impl Default for FilterOptions {
    fn default() -> Self {
        Self {
            stmt_types: StmtTypeFilter::default(),
            allowed_ns: Vec::new(),
            node_blacklist: Vec::new(),
            path_length: None,
            belief_cutoff: 0.0,
            curated_db_only: false,
            max_paths: 50,
            cull_best_node: None,
            weighted: None,
            context_weighted: false,
            overall_weighted: false,
        }
    }
}

impl FilterOptions {
    /// Excluding statement types
    pub fn excluding_types<S: AsRef<str>>(types: impl IntoIterator<Item = S>) -> Self {
        Self {
            stmt_types: StmtTypeFilter::exclude(types),
            ..Self::default()
        }
    }

    pub fn no_stmt_filters(&self) -> bool {
        self.stmt_types.is_open() && self.belief_cutoff <= 0.0 && !self.curated_db_only
    }

    pub fn no_node_filters(&self) -> bool {
        self.allowed_ns.is_empty() && self.node_blacklist.is_empty()
    }

    pub fn no_filters(&self) -> bool {
        self.no_stmt_filters()
            && self.no_node_filters()
            && self.path_length.is_none()
            && self.cull_best_node.is_none()
    }

    /// New options with the given fields reset to their defaults
    pub fn without(&self, fields: &[FilterField]) -> Self {
        let defaults = Self::default();
        let mut out = self.clone();
        for field in fields {
            match field {
                FilterField::StmtTypes => out.stmt_types = defaults.stmt_types.clone(),
                FilterField::AllowedNs => out.allowed_ns.clear(),
                FilterField::NodeBlacklist => out.node_blacklist.clear(),
                FilterField::PathLength => out.path_length = None,
                FilterField::BeliefCutoff => out.belief_cutoff = defaults.belief_cutoff,
                FilterField::CuratedDbOnly => out.curated_db_only = false,
                FilterField::CullBestNode => out.cull_best_node = None,
            }
        }
        out
    }

    /// Statement filter chain of these options plus a hash blacklist
    pub fn stmt_filter(&self, hash_blacklist: &HashSet<i64>) -> StmtFilter {
        StmtFilter {
            stmt_types: self.stmt_types.clone(),
            hash_blacklist: hash_blacklist.clone(),
            curated_db_only: self.curated_db_only,
            belief_cutoff: self.belief_cutoff,
        }
    }

    /// Whether a namespace passes the allow-list
    pub fn allows_ns(&self, ns: &str) -> bool {
        self.allowed_ns.is_empty() || self.allowed_ns.iter().any(|a| a.eq_ignore_ascii_case(ns))
    }

    /// Whether a node name is blacklisted
    pub fn is_blacklisted(&self, name: &str) -> bool {
        self.node_blacklist.iter().any(|b| b == name)
    }
}

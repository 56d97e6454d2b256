//! Service configuration

use crate::error::{SearchError, SearchResult};
use crate::links::{LinkTemplates, DB_URL_EDGE, DB_URL_HASH};
use crate::query::DEFAULT_TIMEOUT;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Limits and link templates for a search service.
///
/// Every field has a default, so a YAML file only needs the keys it
/// changes:
///
/// ```yaml
/// max_timeout: 120
/// ev_limit: 20
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Budget in seconds for requests that do not set one
    pub default_timeout: f64,
    /// Upper bound on any requested budget
    pub max_timeout: f64,
    /// Evidence shown per edge link
    pub ev_limit: usize,
    /// Cap on partial paths queued by breadth-first search
    pub bfs_max_memory: usize,
    pub db_url_hash: String,
    pub db_url_edge: String,
    pub default_max_paths: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            default_timeout: DEFAULT_TIMEOUT,
            max_timeout: 590.0,
            ev_limit: 10,
            bfs_max_memory: 1 << 29,
            db_url_hash: DB_URL_HASH.to_string(),
            db_url_edge: DB_URL_EDGE.to_string(),
            default_max_paths: 50,
        }
    }
}

impl SearchConfig {
    pub fn from_yaml_str(yaml: &str) -> SearchResult<Self> {
        let config: Self = serde_yaml::from_str(yaml)
            .map_err(|e| SearchError::Config(format!("invalid configuration: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> SearchResult<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        Self::from_yaml_str(&text)
    }

    fn validate(&self) -> SearchResult<()> {
        if !(self.max_timeout.is_finite() && self.max_timeout > 0.0) {
            return Err(SearchError::Config(format!(
                "max_timeout must be positive, got {}",
                self.max_timeout
            )));
        }
        if !self.default_timeout.is_finite() || self.default_timeout < 0.0 {
            return Err(SearchError::Config(format!(
                "default_timeout must be non-negative, got {}",
                self.default_timeout
            )));
        }
        Ok(())
    }

    /// Apply the configured ceiling to a requested budget. An unbounded
    /// request gets the ceiling.
    pub fn clamp_timeout(&self, requested: Option<f64>) -> Option<f64> {
        Some(requested.map_or(self.max_timeout, |t| t.min(self.max_timeout)))
    }

    pub fn link_templates(&self) -> LinkTemplates {
        LinkTemplates {
            hash: self.db_url_hash.clone(),
            edge: self.db_url_edge.clone(),
            ev_limit: self.ev_limit,
        }
    }
}

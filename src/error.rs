//! Error types shared across translation, search and aggregation

use thiserror::Error;

/// Failure reported by an external lookup collaborator
/// (reference counts, ontology ancestry).
#[derive(Debug, Error)]
pub enum LookupError {
    #[error("Reference count lookup failed: {0}")]
    RefCounts(String),

    #[error("Ontology lookup failed: {0}")]
    Ontology(String),
}

/// Errors that abort a search request
#[derive(Debug, Error)]
pub enum SearchError {
    /// A required endpoint or node list is absent
    #[error("Missing parameters: {0}")]
    MissingParameters(String),

    /// Conflicting or otherwise unusable parameters
    #[error("Invalid parameters: {0}")]
    InvalidParameters(String),

    #[error(transparent)]
    Lookup(#[from] LookupError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for search operations
pub type SearchResult<T> = Result<T, SearchError>;

impl SearchError {
    pub fn missing(msg: impl Into<String>) -> Self {
        Self::MissingParameters(msg.into())
    }

    pub fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidParameters(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_error_is_transparent() {
        let err: SearchError = LookupError::Ontology("service down".into()).into();
        assert_eq!(err.to_string(), "Ontology lookup failed: service down");
    }

    #[test]
    fn invalid_parameters_message() {
        let err = SearchError::invalid("both source and target set");
        assert_eq!(err.to_string(), "Invalid parameters: both source and target set");
    }
}

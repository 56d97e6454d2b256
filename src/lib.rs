//! netsearch: mechanistic network search over interaction graphs
//!
//! Finds directed paths and shared neighbors between biological entities
//! in a directed multigraph of causal statements, under per-request time
//! budgets.
//!
//! # Core Concepts
//!
//! - **Graph**: entities keyed by name (and sign, in the signed view),
//!   edges carrying the statements that support them
//! - **Plans**: a request translated into per-algorithm options plus the
//!   residual filters each result aggregator still applies
//! - **Traversal**: lazy path streams that accept culling feedback
//! - **Aggregation**: deadline-bounded consumers that build the result model
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use netsearch::{InteractionGraph, NetworkSearchApi, NetworkSearchQuery};
//!
//! let api = NetworkSearchApi::new(
//!     Arc::new(InteractionGraph::unsigned()),
//!     Arc::new(InteractionGraph::signed()),
//! );
//! let results = api.handle_query(&NetworkSearchQuery::between("BRCA1", "TP53")).unwrap();
//! assert!(results.path_results.map_or(true, |p| p.is_empty()));
//! ```

pub mod api;
pub mod config;
pub mod error;
pub mod graph;
pub mod links;
pub mod query;
pub mod results;
pub mod search;
pub mod traversal;

pub use api::NetworkSearchApi;
pub use config::SearchConfig;
pub use error::{LookupError, SearchError, SearchResult};
pub use graph::{EdgeAttrs, GraphSnapshot, InteractionGraph, NodeAttrs, NodeKey, RawStatement};
pub use query::{MultiInteractorsRequest, NetworkSearchQuery, SubgraphRequest, Weighting};
pub use results::{MultiInteractorsResults, Results, SubgraphResults};
pub use traversal::{ReferenceEngine, TraversalEngine};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

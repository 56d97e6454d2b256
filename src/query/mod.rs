//! Request translation
//!
//! Maps inbound requests onto per-algorithm option structs and the residual
//! filters their result aggregators apply.

mod context;
mod filter;
mod hash;
mod options;
mod request;
mod translate;

pub use context::{ContextWeighting, HashRefCounts, InMemoryRefCounts, RefCountLookup, TOTAL_KEY};
pub use filter::{FilterField, FilterOptions, StmtFilter, StmtTypeFilter};
pub use hash::{fnv1a_32, query_hash, sorted_json_string};
pub use options::{
    BreadthFirstSearchOptions, DijkstraOptions, EdgePredicate, MultiInteractorsOptions,
    NeighborFilters, OntologyOptions, RefCountsFn, ShortestSimplePathOptions,
    SharedInteractorsOptions, SubgraphOptions,
};
pub use request::{
    MultiInteractorsRequest, NetworkSearchQuery, SubgraphRequest, Weighting, DEFAULT_TIMEOUT,
};
pub use translate::{
    expand_node_blacklist, multi_interactors, open_signed_node, source_target, start_node,
    AlgorithmQuery, InteractorResultOptions, OntologyResultOptions, PathResultOptions, QueryPlan,
    SubgraphPlan, Translator,
};

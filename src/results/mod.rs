//! Result aggregation
//!
//! Aggregators consume lazy search output under a per-aggregator deadline,
//! apply the residual filters the search left over and build the result
//! model that is serialized back to clients.

mod deadline;
mod interactors;
mod materialize;
mod paths;
mod types;

pub use deadline::Deadline;
pub use interactors::{
    MultiInteractorsAggregator, OntologyAggregator, SharedInteractorsAggregator, SubgraphAggregator,
};
pub use materialize::Materializer;
pub use paths::{PathAggregator, PathSearchKind};
pub use types::{
    EdgeData, EdgeDataByHash, MultiInteractorsResults, Node, OntologyResults, Path,
    PathResultData, Results, SharedInteractorsResults, StmtData, StmtTypeSupport,
    SubgraphResults,
};

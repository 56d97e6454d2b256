//! Neighbor-based search algorithms over the interaction graph

mod neighbors;
mod ontology;
mod subgraph;

pub use neighbors::{direct_multi_interactors, filter_neighbors, shared_interactors, EdgePair};
pub use ontology::{
    shared_parents, InMemoryOntology, OntologyFile, OntologyLookup, OntologyParent, OntologyTerm,
    ParentLink,
};
pub use subgraph::induced_subgraph_edges;

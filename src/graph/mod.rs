//! Core graph data structures

mod edge;
mod network;
mod node;
mod snapshot;


pub use edge::{EdgeAttrs, RawStatement, WeightKey};
pub use network::InteractionGraph;
pub use node::{NodeAttrs, NodeKey, INT_MINUS, INT_PLUS};
pub use snapshot::{EdgeRecord, GraphSnapshot, NodeRecord};

//! Graph representation and algorithms module

pub mod builder;
pub mod compressed;
pub mod ego;
pub mod store;
pub mod subgraph;
pub mod traversal;

pub use builder::GraphBuilder;
pub use compressed::CompressedGraph;
pub use ego::EgoNetwork;
pub use traversal::Direction;

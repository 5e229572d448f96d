//! Data model: the path-network multigraph, GPS point types and the
//! classified-edge output types.

pub mod classified;
pub mod graph;
pub mod points;

pub use classified::{Category, ClassifiedEdge, VotedEdge};
pub use graph::{Edge, EdgeId, NetworkGraph, Node, NodeId};
pub use points::{CleanPoint, Dataset, MatchedPoint, TrackId, TrackPoint};

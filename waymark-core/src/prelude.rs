// Re-export key components
pub use crate::analysis::{AnalysisSummary, GraphSource, analyse_batch};
pub use crate::classify::{EdgeJoin, classify, join_votes};
pub use crate::config::{AnalysisConfig, DistanceMetric};
pub use crate::error::{Error, Result};
pub use crate::export::{graph_to_geojson, graph_to_geojson_string};
pub use crate::interpolate::{interpolate_tracks, split_at_jumps};
pub use crate::loading::{JsonGraphSource, read_point_csv, read_tile_polygons};
pub use crate::matching::EdgeIndex;
pub use crate::store::{ArtifactKey, ArtifactStore, JsonArtifactStore, Layer, MemoryArtifactStore};
pub use crate::votes::score_dataset;

// Core types for the path network
pub use crate::model::{Edge, EdgeId, NetworkGraph, Node, NodeId};

// Core types for point datasets and classification
pub use crate::model::{
    Category, ClassifiedEdge, CleanPoint, Dataset, MatchedPoint, TrackId, TrackPoint, VotedEdge,
};

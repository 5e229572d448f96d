//! Analysis thresholds, gathered into one explicit configuration struct.

use crate::model::Dataset;

/// Distance function used when scanning a track for jumps.
///
/// `Equirectangular` compares squared degree-space distances scaled to
/// metres, which is cheap and adequate at the scale of one tile.
/// `Haversine` is exact on the sphere.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DistanceMetric {
    #[default]
    Equirectangular,
    Haversine,
}

/// All thresholds of the pipeline, in metres unless noted.
///
/// A single immutable value is passed to every stage so no stage reads
/// ambient constants. Defaults carry the field calibration the pipeline was
/// tuned with.
#[derive(Debug, Clone)]
pub struct AnalysisConfig {
    /// Gap between consecutive track points above which the track is split
    /// into separate sub-tracks.
    pub jump_split_dist: f64,
    /// Sub-tracks with at most this many points are discarded as spurious
    /// (only when segmentation is enabled).
    pub spurious_point_count: usize,
    /// Spacing of resampled points along a cleaned track.
    pub interpolation_dist: f64,
    /// Metric used for the jump scan.
    pub jump_metric: DistanceMetric,
    /// Matched points farther than this from their nearest edge are dropped.
    pub edge_match_dist: f64,
    /// Spacing of the extra points inserted along each edge for the
    /// nearest-edge search. Does not alter stored geometry.
    pub edge_densify_dist: f64,
    /// Density filter for public tracks: an edge needs more than
    /// `length / max_point_separation_public` matched points to survive.
    pub max_point_separation_public: f64,
    /// Density filter for right-of-way tracks, far looser since authoritative
    /// tracks are sparse by design.
    pub max_point_separation_row: f64,
    /// Connected components with total edge length at or below this are
    /// removed as noise.
    pub min_subgraph_length: f64,
    /// Raw distinct-track count treated as 100% activity.
    pub max_activity: f64,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            jump_split_dist: 200.0,
            spurious_point_count: 4,
            interpolation_dist: 5.0,
            jump_metric: DistanceMetric::default(),
            edge_match_dist: 20.0,
            edge_densify_dist: 5.0,
            max_point_separation_public: 30.0,
            max_point_separation_row: 3000.0,
            min_subgraph_length: 200.0,
            max_activity: 20.0,
        }
    }
}

impl AnalysisConfig {
    /// Density-filter separation for the given dataset.
    pub fn max_point_separation(&self, dataset: Dataset) -> f64 {
        match dataset {
            Dataset::Public => self.max_point_separation_public,
            Dataset::RightOfWay => self.max_point_separation_row,
        }
    }
}

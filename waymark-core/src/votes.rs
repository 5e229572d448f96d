//! Per-edge vote aggregation: distance gating, counting, density filtering
//! and per-dataset denoising.

use hashbrown::{HashMap, HashSet};
use log::{debug, info};

use crate::config::AnalysisConfig;
use crate::denoise::filter_small_components;
use crate::model::{Dataset, EdgeId, MatchedPoint, NetworkGraph, TrackId, VotedEdge};

/// Raw per-edge counts for one dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VoteCounts {
    pub point_count: usize,
    pub track_count: usize,
}

/// Count matched points and distinct tracks per edge, keeping only points
/// strictly closer than `max_dist_m` to their edge.
pub fn aggregate_votes(
    matched: &[MatchedPoint],
    max_dist_m: f64,
) -> HashMap<EdgeId, VoteCounts> {
    let mut counts: HashMap<EdgeId, (usize, HashSet<TrackId>)> = HashMap::new();
    for m in matched {
        if m.distance < max_dist_m {
            let entry = counts.entry(m.edge).or_default();
            entry.0 += 1;
            entry.1.insert(m.point.track_id);
        }
    }

    counts
        .into_iter()
        .map(|(edge, (point_count, tracks))| {
            (
                edge,
                VoteCounts {
                    point_count,
                    track_count: tracks.len(),
                },
            )
        })
        .collect()
}

/// Full scoring pass for one dataset: gate by distance, count votes, join the
/// counts back onto the edge table, apply the dataset's density filter and
/// denoise the surviving edge set. Result is sorted by edge id.
///
/// The density filter keeps an edge only when
/// `point_count > length / max_point_separation`, rejecting edges a track
/// merely clipped in passing.
pub fn score_dataset(
    graph: &NetworkGraph,
    matched: &[MatchedPoint],
    dataset: Dataset,
    config: &AnalysisConfig,
) -> Vec<VotedEdge> {
    let votes = aggregate_votes(matched, config.edge_match_dist);
    let separation = config.max_point_separation(dataset);

    // Inner join on edge id: only edges present in the graph survive, and
    // each row carries the edge's geometry, length and attributes.
    let mut voted: Vec<VotedEdge> = votes
        .into_iter()
        .filter_map(|(id, counts)| {
            let edge = graph.edge(&id)?;
            (counts.point_count as f64 > edge.length / separation).then(|| VotedEdge {
                edge: edge.clone(),
                point_count: counts.point_count,
                track_count: counts.track_count,
            })
        })
        .collect();
    debug!(
        "{dataset:?}: {} edges pass the density filter",
        voted.len()
    );

    let kept = filter_small_components(
        voted.iter().map(|v| (v.edge.id, v.edge.length)),
        config.min_subgraph_length,
    );
    voted.retain(|v| kept.contains(&v.edge.id));
    voted.sort_by_key(|v| v.edge.id);

    info!("{dataset:?}: {} voted edges after denoising", voted.len());
    voted
}

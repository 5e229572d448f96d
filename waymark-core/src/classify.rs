//! Combine the two per-dataset vote tables into one classified edge table.
//!
//! The join is expressed as three explicit outcomes keyed by edge id, each
//! with its own row shape, so a row's provenance is carried by its type
//! rather than by nullable columns.

use hashbrown::{HashMap, HashSet};
use log::debug;

use crate::config::AnalysisConfig;
use crate::model::{ClassifiedEdge, EdgeId, VotedEdge};

/// Result of joining the public and right-of-way vote tables on edge id.
/// Edges touched by neither table are never represented.
#[derive(Debug, Default)]
pub struct EdgeJoin {
    /// Edges with votes from both datasets; public-side row kept for its
    /// activity counts.
    pub both: Vec<VotedEdge>,
    /// Edges with public votes only.
    pub public_only: Vec<VotedEdge>,
    /// Edges with right-of-way votes only.
    pub row_only: Vec<VotedEdge>,
}

/// Split the union of the two tables into the three join outcomes.
pub fn join_votes(public: Vec<VotedEdge>, row: Vec<VotedEdge>) -> EdgeJoin {
    let row_ids: HashMap<EdgeId, VotedEdge> =
        row.into_iter().map(|v| (v.edge.id, v)).collect();

    let mut join = EdgeJoin::default();
    let mut seen_public: HashSet<EdgeId> = HashSet::new();
    for voted in public {
        seen_public.insert(voted.edge.id);
        if row_ids.contains_key(&voted.edge.id) {
            join.both.push(voted);
        } else {
            join.public_only.push(voted);
        }
    }
    join.row_only = row_ids
        .into_values()
        .filter(|v| !seen_public.contains(&v.edge.id))
        .collect();
    join.row_only.sort_by_key(|v| v.edge.id);
    join
}

/// Classify the union of edges touched by either dataset.
///
/// Activity starts as the raw distinct-track count on the public side (zero
/// for RoW-only rows) and is normalized exactly once, after the three row
/// sets are concatenated: `clip(activity * 100 / max_activity, 0, 100)`.
/// Output is sorted by edge id.
pub fn classify(
    public: Vec<VotedEdge>,
    row: Vec<VotedEdge>,
    config: &AnalysisConfig,
) -> Vec<ClassifiedEdge> {
    let join = join_votes(public, row);
    debug!(
        "join: {} both, {} public-only, {} row-only",
        join.both.len(),
        join.public_only.len(),
        join.row_only.len()
    );

    let raw_rows = join
        .both
        .into_iter()
        .map(|v| (v, true))
        .chain(join.public_only.into_iter().map(|v| (v, false)))
        .map(|(v, is_row)| (v.track_count as f64, v.edge, is_row))
        .chain(join.row_only.into_iter().map(|v| (0.0, v.edge, true)));

    let mut classified: Vec<ClassifiedEdge> = raw_rows
        .map(|(activity, edge, is_row)| ClassifiedEdge {
            edge,
            activity_pct: (activity * 100.0 / config.max_activity).clamp(0.0, 100.0),
            is_row,
        })
        .collect();
    classified.sort_by_key(|c| c.edge.id);
    classified
}

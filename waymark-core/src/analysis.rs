//! Batch orchestration: run the matching pipeline tile by tile, persist
//! per-tile artifacts, and merge them into region-wide graphs.
//!
//! Tiles are independent, so they run on a rayon worker pool against shared
//! read-only point datasets; each tile writes only its own artifacts. The
//! merge folds tile outputs strictly in tile-id order, never
//! completion-time order, so results are reproducible byte for byte. One
//! tile's fatal error is recorded in the summary and does not stop the
//! others.

use geo::{BoundingRect, Contains, MultiPolygon};
use log::{info, warn};
use rayon::prelude::*;

use crate::classify::classify;
use crate::config::AnalysisConfig;
use crate::denoise::filter_small_components;
use crate::error::Result;
use crate::interpolate::interpolate_tracks;
use crate::matching::EdgeIndex;
use crate::model::{Category, CleanPoint, Dataset, Edge, NetworkGraph, TrackPoint};
use crate::store::{ArtifactKey, ArtifactStore, Layer};
use crate::votes::score_dataset;

/// Supplies one network graph per tile. `Ok(None)` means the tile has no
/// graph at all; an empty graph is equally skippable.
pub trait GraphSource: Sync {
    fn load_tile(&self, tile: usize) -> Result<Option<NetworkGraph>>;
}

/// What happened to each tile, plus any fatal per-tile errors.
#[derive(Debug, Default)]
pub struct AnalysisSummary {
    pub tiles_total: usize,
    /// Tiles computed in this run.
    pub tiles_processed: usize,
    /// Tiles restored from existing artifacts.
    pub tiles_resumed: usize,
    /// Tiles with no graph, no edges or no usable points.
    pub tiles_empty: usize,
    /// Tile index and error description for tiles that failed.
    pub failures: Vec<(usize, String)>,
}

enum TileOutcome {
    Empty,
    Computed([NetworkGraph; 3]),
    Resumed([NetworkGraph; 3]),
}

/// Run the full analysis over a set of tiles partitioning the region.
///
/// Produces per-tile artifacts for the three categories plus merged
/// region-wide graphs for each category and the two display unions. Tiles
/// whose artifacts already exist are loaded, not recomputed, so re-running
/// with no new data is idempotent.
pub fn analyse_batch(
    graphs: &dyn GraphSource,
    store: &dyn ArtifactStore,
    tiles: &[MultiPolygon<f64>],
    public_points: &[TrackPoint],
    row_points: &[TrackPoint],
    config: &AnalysisConfig,
) -> Result<AnalysisSummary> {
    let outcomes: Vec<Result<TileOutcome>> = tiles
        .par_iter()
        .enumerate()
        .map(|(i, polygon)| {
            process_tile(i, polygon, graphs, store, public_points, row_points, config)
        })
        .collect();

    let mut summary = AnalysisSummary {
        tiles_total: tiles.len(),
        ..AnalysisSummary::default()
    };
    let mut merged = [
        NetworkGraph::new(),
        NetworkGraph::new(),
        NetworkGraph::new(),
    ];

    // Deterministic reduction: tile-id order, not completion order.
    for (i, outcome) in outcomes.into_iter().enumerate() {
        let category_graphs = match outcome {
            Ok(TileOutcome::Empty) => {
                summary.tiles_empty += 1;
                continue;
            }
            Ok(TileOutcome::Computed(g)) => {
                summary.tiles_processed += 1;
                g
            }
            Ok(TileOutcome::Resumed(g)) => {
                summary.tiles_resumed += 1;
                g
            }
            Err(e) => {
                warn!("tile {i} failed: {e}");
                summary.failures.push((i, e.to_string()));
                continue;
            }
        };
        for (target, tile_graph) in merged.iter_mut().zip(&category_graphs) {
            target.merge_from(tile_graph);
        }
    }

    for (category, graph) in Category::ALL.into_iter().zip(&merged) {
        store.write(&ArtifactKey::merged(Layer::Category(category)), graph)?;
    }

    // Display unions over the mutually exclusive categories.
    let [public_only, both, row_only] = &merged;
    let mut all_public = public_only.clone();
    all_public.merge_from(both);
    store.write(&ArtifactKey::merged(Layer::AllPublic), &all_public)?;

    let mut all_row = both.clone();
    all_row.merge_from(row_only);
    store.write(&ArtifactKey::merged(Layer::AllRow), &all_row)?;

    info!(
        "analysis done: {} tiles ({} computed, {} resumed, {} empty, {} failed)",
        summary.tiles_total,
        summary.tiles_processed,
        summary.tiles_resumed,
        summary.tiles_empty,
        summary.failures.len()
    );
    Ok(summary)
}

fn tile_keys(tile: usize) -> [ArtifactKey; 3] {
    Category::ALL.map(|c| ArtifactKey::tile(Layer::Category(c), tile))
}

fn process_tile(
    tile: usize,
    polygon: &MultiPolygon<f64>,
    graphs: &dyn GraphSource,
    store: &dyn ArtifactStore,
    public_points: &[TrackPoint],
    row_points: &[TrackPoint],
    config: &AnalysisConfig,
) -> Result<TileOutcome> {
    // Resume: an unreadable existing artifact is fatal for this tile.
    let keys = tile_keys(tile);
    if keys.iter().all(|k| store.exists(k)) {
        info!("tile {tile}: artifacts exist, resuming");
        let read = |k: &ArtifactKey| store.read(k);
        return Ok(TileOutcome::Resumed([
            read(&keys[0])?,
            read(&keys[1])?,
            read(&keys[2])?,
        ]));
    }

    let Some(graph) = graphs.load_tile(tile)? else {
        info!("tile {tile}: no graph, skipping");
        return Ok(TileOutcome::Empty);
    };
    if graph.is_empty() {
        info!("tile {tile}: graph has no edges, skipping");
        return Ok(TileOutcome::Empty);
    }

    let public_in_tile = points_in_polygon(polygon, public_points);
    let row_in_tile = points_in_polygon(polygon, row_points);
    info!(
        "tile {tile}: {} public and {} right-of-way points in polygon",
        public_in_tile.len(),
        row_in_tile.len()
    );

    // Public tracks are raw recordings and need cleaning; right-of-way
    // tracks arrive interpolated upstream.
    let Some(public_clean) = interpolate_tracks(&public_in_tile, config, true) else {
        warn!("tile {tile}: no public points survive cleaning, skipping");
        return Ok(TileOutcome::Empty);
    };
    let row_clean: Vec<CleanPoint> = row_in_tile
        .iter()
        .map(|p| CleanPoint {
            lat: p.lat,
            lon: p.lon,
            track_id: p.track_id,
            segment: 0,
        })
        .collect();

    let index = EdgeIndex::build(&graph, config.edge_densify_dist);
    let matched_public = index.match_points(&public_clean);
    let matched_row = index.match_points(&row_clean);

    let public_votes = score_dataset(&graph, &matched_public, Dataset::Public, config);
    let row_votes = score_dataset(&graph, &matched_row, Dataset::RightOfWay, config);
    let classified = classify(public_votes, row_votes, config);

    let mut outputs = [
        NetworkGraph::new(),
        NetworkGraph::new(),
        NetworkGraph::new(),
    ];
    for (slot, category) in Category::ALL.into_iter().enumerate() {
        let edges: Vec<Edge> = classified
            .iter()
            .filter(|c| c.category() == category)
            .map(|c| {
                let mut edge = c.edge.clone();
                edge.activity = Some(c.activity_pct);
                edge.row = Some(c.is_row);
                edge
            })
            .collect();

        // Denoise each category on its own: the split can leave behind
        // fragments that were connected in the combined table.
        let kept = filter_small_components(
            edges.iter().map(|e| (e.id, e.length)),
            config.min_subgraph_length,
        );
        let category_graph = NetworkGraph::induced(
            &graph,
            edges.into_iter().filter(|e| kept.contains(&e.id)),
        )?;

        store.write(&keys[slot], &category_graph)?;
        outputs[slot] = category_graph;
    }

    Ok(TileOutcome::Computed(outputs))
}

/// Points inside the polygon: a cheap bounding-box pass first, then the
/// exact containment test.
pub fn points_in_polygon(polygon: &MultiPolygon<f64>, points: &[TrackPoint]) -> Vec<TrackPoint> {
    let Some(rect) = polygon.bounding_rect() else {
        return Vec::new();
    };
    let (min, max) = (rect.min(), rect.max());

    points
        .iter()
        .filter(|p| {
            min.x < p.lon && p.lon < max.x && min.y < p.lat && p.lat < max.y
        })
        .filter(|p| polygon.contains(&p.point()))
        .copied()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::polygon;

    #[test]
    fn polygon_bounding_rejects_outside_points() {
        let tile = MultiPolygon::new(vec![polygon![
            (x: -1.0, y: 51.0),
            (x: -0.9, y: 51.0),
            (x: -0.9, y: 51.1),
            (x: -1.0, y: 51.1),
        ]]);
        let points = vec![
            TrackPoint::new(51.05, -0.95, 1), // inside
            TrackPoint::new(51.05, -1.95, 2), // outside bbox
            TrackPoint::new(51.2, -0.95, 3),  // outside bbox
        ];
        let inside = points_in_polygon(&tile, &points);
        assert_eq!(inside.len(), 1);
        assert_eq!(inside[0].track_id, 1);
    }

    #[test]
    fn concave_polygon_needs_exact_test() {
        // L-shaped polygon: the notch is inside the bbox but outside the
        // polygon.
        let tile = MultiPolygon::new(vec![polygon![
            (x: 0.0, y: 0.0),
            (x: 2.0, y: 0.0),
            (x: 2.0, y: 2.0),
            (x: 1.0, y: 2.0),
            (x: 1.0, y: 1.0),
            (x: 0.0, y: 1.0),
        ]]);
        // TrackPoint is (lat, lon), so lat maps to y and lon to x.
        let points = vec![
            TrackPoint::new(0.5, 0.5, 1), // lower arm of the L
            TrackPoint::new(0.5, 1.5, 2), // right arm of the L
            TrackPoint::new(1.9, 0.5, 3), // in the notch: bbox yes, polygon no
        ];
        let inside = points_in_polygon(&tile, &points);
        assert!(inside.iter().any(|p| p.track_id == 1));
        assert!(inside.iter().any(|p| p.track_id == 2));
        assert!(!inside.iter().any(|p| p.track_id == 3));
    }
}

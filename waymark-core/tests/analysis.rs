//! End-to-end pipeline tests over a small synthetic network.
//!
//! The network sits on the equator so degree-to-metre conversion is easy to
//! reason about: 0.001 degrees of longitude is roughly 111 metres.

use geo::{MultiPolygon, line_string, polygon};

use waymark_core::analysis::{GraphSource, analyse_batch};
use waymark_core::config::AnalysisConfig;
use waymark_core::error::{Error, Result};
use waymark_core::model::{Category, Edge, EdgeId, NetworkGraph, Node, TrackPoint};
use waymark_core::store::{ArtifactKey, ArtifactStore, Layer, MemoryArtifactStore};

/// One fixed graph per tile, `None` where a tile has no graph.
struct StaticGraphs(Vec<Option<NetworkGraph>>);

impl GraphSource for StaticGraphs {
    fn load_tile(&self, tile: usize) -> Result<Option<NetworkGraph>> {
        Ok(self.0.get(tile).cloned().flatten())
    }
}

/// Fails tile 0, serves the rest.
struct FaultyGraphs(StaticGraphs);

impl GraphSource for FaultyGraphs {
    fn load_tile(&self, tile: usize) -> Result<Option<NetworkGraph>> {
        if tile == 0 {
            return Err(Error::InvalidData("simulated tile failure".into()));
        }
        self.0.load_tile(tile)
    }
}

/// Two chained edges along the equator, each roughly 330 metres long:
/// node 1 at lon 0.0, node 2 at 0.003, node 3 at 0.006.
fn chain_graph() -> NetworkGraph {
    let mut g = NetworkGraph::new();
    g.add_node(Node { id: 1, lat: 0.0, lon: 0.0 });
    g.add_node(Node { id: 2, lat: 0.0, lon: 0.003 });
    g.add_node(Node { id: 3, lat: 0.0, lon: 0.006 });
    g.add_edge(Edge::new(
        EdgeId::new(1, 2, 0),
        line_string![(x: 0.0, y: 0.0), (x: 0.003, y: 0.0)],
    ))
    .unwrap();
    g.add_edge(Edge::new(
        EdgeId::new(2, 3, 0),
        line_string![(x: 0.003, y: 0.0), (x: 0.006, y: 0.0)],
    ))
    .unwrap();
    g
}

fn whole_region_tile() -> MultiPolygon<f64> {
    MultiPolygon::new(vec![polygon![
        (x: -0.01, y: -0.01),
        (x: 0.01, y: -0.01),
        (x: 0.01, y: 0.01),
        (x: -0.01, y: 0.01),
    ]])
}

/// A track of `n` evenly spaced points on the equator between two longitudes.
fn track_along(track_id: u64, lon_from: f64, lon_to: f64, n: usize) -> Vec<TrackPoint> {
    (0..n)
        .map(|i| {
            let t = i as f64 / (n - 1) as f64;
            TrackPoint::new(0.0, lon_from + t * (lon_to - lon_from), track_id)
        })
        .collect()
}

/// Three public tracks along the first edge, one right-of-way track along
/// both edges. First edge should classify as `both`, second as `row_only`.
fn fixture_points() -> (Vec<TrackPoint>, Vec<TrackPoint>) {
    let mut public = Vec::new();
    for track_id in 1..=3 {
        public.extend(track_along(track_id, 0.0, 0.003, 10));
    }
    let row = track_along(100, 0.0005, 0.0055, 6);
    (public, row)
}

#[test]
fn classifies_edges_into_categories() {
    let graphs = StaticGraphs(vec![Some(chain_graph())]);
    let store = MemoryArtifactStore::new();
    let tiles = vec![whole_region_tile()];
    let (public, row) = fixture_points();
    let config = AnalysisConfig::default();

    let summary = analyse_batch(&graphs, &store, &tiles, &public, &row, &config).unwrap();
    assert_eq!(summary.tiles_total, 1);
    assert_eq!(summary.tiles_processed, 1);
    assert!(summary.failures.is_empty());

    let both = store
        .read(&ArtifactKey::merged(Layer::Category(Category::Both)))
        .unwrap();
    assert_eq!(both.edge_count(), 1);
    let edge = both.edge(&EdgeId::new(1, 2, 0)).unwrap();
    // 3 distinct tracks against a calibration of 20 tracks = 100%.
    assert_eq!(edge.activity, Some(15.0));
    assert_eq!(edge.row, Some(true));

    let row_only = store
        .read(&ArtifactKey::merged(Layer::Category(Category::RowOnly)))
        .unwrap();
    assert_eq!(row_only.edge_count(), 1);
    let edge = row_only.edge(&EdgeId::new(2, 3, 0)).unwrap();
    assert_eq!(edge.activity, Some(0.0));
    assert_eq!(edge.row, Some(true));

    let public_only = store
        .read(&ArtifactKey::merged(Layer::Category(Category::PublicOnly)))
        .unwrap();
    assert!(public_only.is_empty());

    // Display unions over the categories.
    let all_public = store.read(&ArtifactKey::merged(Layer::AllPublic)).unwrap();
    assert_eq!(all_public.edge_count(), 1);
    let all_row = store.read(&ArtifactKey::merged(Layer::AllRow)).unwrap();
    assert_eq!(all_row.edge_count(), 2);
}

#[test]
fn categories_are_mutually_exclusive() {
    let graphs = StaticGraphs(vec![Some(chain_graph())]);
    let store = MemoryArtifactStore::new();
    let tiles = vec![whole_region_tile()];
    let (public, row) = fixture_points();
    let config = AnalysisConfig::default();

    analyse_batch(&graphs, &store, &tiles, &public, &row, &config).unwrap();

    let mut seen = std::collections::HashSet::new();
    for category in Category::ALL {
        let graph = store
            .read(&ArtifactKey::merged(Layer::Category(category)))
            .unwrap();
        for edge in graph.edges() {
            assert!(
                seen.insert(edge.id),
                "edge {} appears in more than one category",
                edge.id
            );
            let activity = edge.activity.unwrap();
            assert!((0.0..=100.0).contains(&activity));
        }
    }
}

#[test]
fn rerun_resumes_and_reproduces_artifacts_exactly() {
    let graphs = StaticGraphs(vec![Some(chain_graph())]);
    let store = MemoryArtifactStore::new();
    let tiles = vec![whole_region_tile()];
    let (public, row) = fixture_points();
    let config = AnalysisConfig::default();

    analyse_batch(&graphs, &store, &tiles, &public, &row, &config).unwrap();

    let merged_keys = [
        ArtifactKey::merged(Layer::Category(Category::PublicOnly)),
        ArtifactKey::merged(Layer::Category(Category::Both)),
        ArtifactKey::merged(Layer::Category(Category::RowOnly)),
        ArtifactKey::merged(Layer::AllPublic),
        ArtifactKey::merged(Layer::AllRow),
    ];
    let first: Vec<Option<String>> = merged_keys.iter().map(|k| store.raw(k)).collect();

    let summary = analyse_batch(&graphs, &store, &tiles, &public, &row, &config).unwrap();
    assert_eq!(summary.tiles_resumed, 1);
    assert_eq!(summary.tiles_processed, 0);

    let second: Vec<Option<String>> = merged_keys.iter().map(|k| store.raw(k)).collect();
    assert_eq!(first, second);
}

#[test]
fn tile_failure_does_not_stop_other_tiles() {
    let graphs = FaultyGraphs(StaticGraphs(vec![None, Some(chain_graph())]));
    let store = MemoryArtifactStore::new();
    // Tile 0 covers empty space to the west, tile 1 covers the network.
    let tiles = vec![
        MultiPolygon::new(vec![polygon![
            (x: -0.03, y: -0.01),
            (x: -0.01, y: -0.01),
            (x: -0.01, y: 0.01),
            (x: -0.03, y: 0.01),
        ]]),
        whole_region_tile(),
    ];
    let (public, row) = fixture_points();
    let config = AnalysisConfig::default();

    let summary = analyse_batch(&graphs, &store, &tiles, &public, &row, &config).unwrap();
    assert_eq!(summary.failures.len(), 1);
    assert_eq!(summary.failures[0].0, 0);
    assert_eq!(summary.tiles_processed, 1);

    // The healthy tile's results still reach the merged artifacts.
    let all_row = store.read(&ArtifactKey::merged(Layer::AllRow)).unwrap();
    assert_eq!(all_row.edge_count(), 2);
}

#[test]
fn tiles_without_graphs_are_skipped() {
    let graphs = StaticGraphs(vec![None, Some(NetworkGraph::new())]);
    let store = MemoryArtifactStore::new();
    let tiles = vec![whole_region_tile(), whole_region_tile()];
    let (public, row) = fixture_points();
    let config = AnalysisConfig::default();

    let summary = analyse_batch(&graphs, &store, &tiles, &public, &row, &config).unwrap();
    assert_eq!(summary.tiles_empty, 2);
    assert_eq!(summary.tiles_processed, 0);
    assert!(summary.failures.is_empty());
}

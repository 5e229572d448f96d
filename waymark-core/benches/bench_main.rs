use criterion::{Criterion, black_box, criterion_group, criterion_main};
use geo::line_string;

use waymark_core::config::AnalysisConfig;
use waymark_core::interpolate::interpolate_tracks;
use waymark_core::matching::EdgeIndex;
use waymark_core::model::{CleanPoint, Edge, EdgeId, NetworkGraph, Node, TrackPoint};

/// Square grid of streets near the equator, `n` nodes per side, roughly
/// 110 m between neighbours.
fn grid_graph(n: u64) -> NetworkGraph {
    let step = 0.001;
    let mut g = NetworkGraph::new();
    for row in 0..n {
        for col in 0..n {
            g.add_node(Node {
                id: row * n + col,
                lat: row as f64 * step,
                lon: col as f64 * step,
            });
        }
    }
    let coord = |id: u64| ((id % n) as f64 * step, (id / n) as f64 * step);
    let mut connect = |a: u64, b: u64| {
        let (ax, ay) = coord(a);
        let (bx, by) = coord(b);
        let edge = Edge::new(
            EdgeId::new(a, b, 0),
            line_string![(x: ax, y: ay), (x: bx, y: by)],
        );
        g.add_edge(edge).unwrap();
    };
    for row in 0..n {
        for col in 0..n {
            let id = row * n + col;
            if col + 1 < n {
                connect(id, id + 1);
            }
            if row + 1 < n {
                connect(id, id + n);
            }
        }
    }
    g
}

/// Points wandering diagonally across the grid, slightly off the streets.
fn wandering_points(count: usize) -> Vec<CleanPoint> {
    (0..count)
        .map(|i| {
            let t = i as f64 / count as f64;
            CleanPoint {
                lat: t * 0.019 + 0.00003,
                lon: t * 0.019,
                track_id: 1,
                segment: 0,
            }
        })
        .collect()
}

fn bench_index_build(c: &mut Criterion) {
    let graph = grid_graph(20);
    let config = AnalysisConfig::default();
    c.bench_function("edge_index_build_20x20", |b| {
        b.iter(|| EdgeIndex::build(black_box(&graph), config.edge_densify_dist));
    });
}

fn bench_match_points(c: &mut Criterion) {
    let graph = grid_graph(20);
    let config = AnalysisConfig::default();
    let index = EdgeIndex::build(&graph, config.edge_densify_dist);
    let points = wandering_points(5_000);
    c.bench_function("match_5k_points", |b| {
        b.iter(|| index.match_points(black_box(&points)));
    });
}

fn bench_interpolate(c: &mut Criterion) {
    let config = AnalysisConfig::default();
    let points: Vec<TrackPoint> = (0..1_000)
        .map(|i| TrackPoint::new(0.0, i as f64 * 0.0003, i as u64 / 100))
        .collect();
    c.bench_function("interpolate_1k_points", |b| {
        b.iter(|| interpolate_tracks(black_box(&points), &config, true));
    });
}

criterion_group!(
    benches,
    bench_index_build,
    bench_match_points,
    bench_interpolate
);
criterion_main!(benches);

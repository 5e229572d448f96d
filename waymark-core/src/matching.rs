//! Map-matching: assign each cleaned point to its nearest network edge.
//!
//! Edge polylines are densified at a fixed spacing and the sample points go
//! into an R-tree. A query walks to the nearest sample, widens the search by
//! the densification spacing, and refines the candidates with an exact
//! point-to-polyline distance, so long straight edges are matched just as
//! well as vertex-dense ones. Densification feeds the index only; stored
//! geometry is untouched.

use geo::{Coord, LineString};
use hashbrown::HashSet;
use log::debug;
use rstar::{RTree, primitives::GeomWithData};

use crate::geo_utils::{LocalProjection, point_polyline_distance};
use crate::model::{CleanPoint, EdgeId, MatchedPoint, NetworkGraph};

type EdgeSample = GeomWithData<[f64; 2], usize>;

/// Spatial index over the edges of one tile graph.
pub struct EdgeIndex {
    tree: RTree<EdgeSample>,
    /// Projected polylines, parallel to the sample payload indices.
    edges: Vec<(EdgeId, LineString<f64>)>,
    projection: LocalProjection,
    spacing: f64,
}

impl EdgeIndex {
    /// Densify every edge at `spacing_m` and bulk-load the R-tree. All
    /// geometry is projected to planar metres around the graph's centroid so
    /// distances come out in metres.
    pub fn build(graph: &NetworkGraph, spacing_m: f64) -> Self {
        let projection = centroid_projection(graph);

        let mut edges = Vec::with_capacity(graph.edge_count());
        let mut samples = Vec::new();
        for id in graph.sorted_edge_ids() {
            let Some(edge) = graph.edge(&id) else {
                continue;
            };
            let line = projection.project_line(&edge.geometry);
            let idx = edges.len();
            for coord in densify(&line, spacing_m) {
                samples.push(EdgeSample::new([coord.x, coord.y], idx));
            }
            edges.push((id, line));
        }
        debug!(
            "edge index: {} edges, {} samples",
            edges.len(),
            samples.len()
        );

        Self {
            tree: RTree::bulk_load(samples),
            edges,
            projection,
            spacing: spacing_m,
        }
    }

    /// Nearest edge to a lat/lon position and the exact distance to its
    /// polyline, in metres. `None` only when the graph has no edges.
    pub fn nearest_edge(&self, lat: f64, lon: f64) -> Option<(EdgeId, f64)> {
        let p = self.projection.to_xy(Coord { x: lon, y: lat });
        let query = [p.x, p.y];

        let nearest = self.tree.nearest_neighbor(&query)?;
        let d0 = {
            let dx = nearest.geom()[0] - p.x;
            let dy = nearest.geom()[1] - p.y;
            (dx * dx + dy * dy).sqrt()
        };

        // Any edge whose polyline passes closer than the best candidate has
        // a sample within one densification step of that, so widening the
        // radius by the spacing cannot miss the true nearest edge.
        let radius = d0 + self.spacing;
        let mut candidates: HashSet<usize> = self
            .tree
            .locate_within_distance(query, radius * radius)
            .map(|s| s.data)
            .collect();
        candidates.insert(nearest.data);

        candidates
            .into_iter()
            .map(|idx| {
                let (id, line) = &self.edges[idx];
                (*id, point_polyline_distance(p, line))
            })
            .min_by(|a, b| a.1.total_cmp(&b.1).then_with(|| a.0.cmp(&b.0)))
    }

    /// Match a batch of points, one result per input point in input order.
    /// Every point gets its globally nearest edge; distance gating happens
    /// downstream.
    pub fn match_points(&self, points: &[CleanPoint]) -> Vec<MatchedPoint> {
        points
            .iter()
            .filter_map(|point| {
                self.nearest_edge(point.lat, point.lon)
                    .map(|(edge, distance)| MatchedPoint {
                        point: *point,
                        edge,
                        distance,
                    })
            })
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }
}

fn centroid_projection(graph: &NetworkGraph) -> LocalProjection {
    let n = graph.node_count();
    if n == 0 {
        return LocalProjection::new(0.0, 0.0);
    }
    let (lat_sum, lon_sum) = graph
        .nodes()
        .fold((0.0, 0.0), |(la, lo), node| (la + node.lat, lo + node.lon));
    LocalProjection::new(lat_sum / n as f64, lon_sum / n as f64)
}

/// Vertices of `line` plus interpolated points so no gap exceeds
/// `spacing_m`. Input is already in planar metres.
fn densify(line: &LineString<f64>, spacing_m: f64) -> Vec<Coord<f64>> {
    let coords = &line.0;
    if coords.len() < 2 {
        return coords.clone();
    }

    let mut out = vec![coords[0]];
    for pair in coords.windows(2) {
        let (a, b) = (pair[0], pair[1]);
        let len = ((b.x - a.x).powi(2) + (b.y - a.y).powi(2)).sqrt();
        let pieces = (len / spacing_m).ceil().max(1.0) as usize;
        for n in 1..=pieces {
            let t = n as f64 / pieces as f64;
            out.push(Coord {
                x: a.x + (b.x - a.x) * t,
                y: a.y + (b.y - a.y) * t,
            });
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Edge, Node};
    use geo::line_string;

    // Two long parallel east-west paths ~220 m apart, sparse vertices.
    fn test_graph() -> NetworkGraph {
        let mut g = NetworkGraph::new();
        for (id, lat, lon) in [
            (1, 51.0, -1.0),
            (2, 51.0, -0.99),
            (3, 51.002, -1.0),
            (4, 51.002, -0.99),
        ] {
            g.add_node(Node { id, lat, lon });
        }
        g.add_edge(Edge::new(
            EdgeId::new(1, 2, 0),
            line_string![(x: -1.0, y: 51.0), (x: -0.99, y: 51.0)],
        ))
        .unwrap();
        g.add_edge(Edge::new(
            EdgeId::new(3, 4, 0),
            line_string![(x: -1.0, y: 51.002), (x: -0.99, y: 51.002)],
        ))
        .unwrap();
        g
    }

    #[test]
    fn matches_mid_edge_not_just_endpoints() {
        let index = EdgeIndex::build(&test_graph(), 5.0);
        // Just north of the middle of the southern edge, far from any vertex.
        let (edge, dist) = index.nearest_edge(51.0001, -0.995).unwrap();
        assert_eq!(edge, EdgeId::new(1, 2, 0));
        assert!((dist - 11.1).abs() < 1.0, "distance {dist}");
    }

    #[test]
    fn picks_the_closer_of_two_parallel_edges() {
        let index = EdgeIndex::build(&test_graph(), 5.0);
        let (edge, _) = index.nearest_edge(51.0015, -0.995).unwrap();
        assert_eq!(edge, EdgeId::new(3, 4, 0));
    }

    #[test]
    fn far_point_still_gets_an_edge() {
        // No coverage gaps: absence is expressed downstream, not here.
        let index = EdgeIndex::build(&test_graph(), 5.0);
        let (_, dist) = index.nearest_edge(51.05, -0.995).unwrap();
        assert!(dist > 1000.0);
    }

    #[test]
    fn results_stay_in_input_order() {
        let index = EdgeIndex::build(&test_graph(), 5.0);
        let points = vec![
            CleanPoint {
                lat: 51.0001,
                lon: -0.995,
                track_id: 7,
                segment: 0,
            },
            CleanPoint {
                lat: 51.0019,
                lon: -0.995,
                track_id: 7,
                segment: 0,
            },
        ];
        let matched = index.match_points(&points);
        assert_eq!(matched.len(), 2);
        assert_eq!(matched[0].edge, EdgeId::new(1, 2, 0));
        assert_eq!(matched[1].edge, EdgeId::new(3, 4, 0));
        assert_eq!(matched[0].point.track_id, 7);
    }

    #[test]
    fn empty_graph_yields_no_matches() {
        let index = EdgeIndex::build(&NetworkGraph::new(), 5.0);
        assert!(index.is_empty());
        assert!(index.nearest_edge(51.0, -1.0).is_none());
    }
}

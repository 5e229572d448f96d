//! Undirected multigraph of the path network.

use std::collections::BTreeMap;
use std::fmt;

use geo::LineString;
use hashbrown::HashMap;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::geo_utils::polyline_length_m;

pub type NodeId = u64;

/// Edge identity: an unordered node pair plus a key disambiguating parallel
/// edges. The constructor canonicalizes the endpoint order so `(u, v, key)`
/// and `(v, u, key)` compare equal.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct EdgeId {
    pub u: NodeId,
    pub v: NodeId,
    pub key: u32,
}

impl EdgeId {
    pub fn new(u: NodeId, v: NodeId, key: u32) -> Self {
        if v < u {
            Self { u: v, v: u, key }
        } else {
            Self { u, v, key }
        }
    }
}

impl fmt::Display for EdgeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.u, self.v, self.key)
    }
}

/// Graph node with its position.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Node {
    pub id: NodeId,
    pub lat: f64,
    pub lon: f64,
}

/// Graph edge: polyline geometry, geometric length and attributes.
///
/// `activity` and `row` are set on classified output edges only and must
/// round-trip exactly through persistence; everything else descriptive lives
/// in `attrs`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Edge {
    pub id: EdgeId,
    /// Polyline in lon/lat order (x = lon, y = lat).
    #[serde(with = "linestring_coords")]
    pub geometry: LineString<f64>,
    /// Geometric length of the polyline in metres, not the straight-line
    /// node distance.
    pub length: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub activity: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub row: Option<bool>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub attrs: BTreeMap<String, String>,
}

impl Edge {
    /// Build an edge, deriving its length from the polyline.
    pub fn new(id: EdgeId, geometry: LineString<f64>) -> Self {
        let length = polyline_length_m(&geometry);
        Self {
            id,
            geometry,
            length,
            activity: None,
            row: None,
            attrs: BTreeMap::new(),
        }
    }
}

/// Undirected multigraph keyed by `(u, v, key)`.
///
/// Nodes and edges are held in hash maps; every ordering-sensitive consumer
/// (persistence, merge) sorts by id first.
#[derive(Debug, Clone, Default)]
pub struct NetworkGraph {
    nodes: HashMap<NodeId, Node>,
    edges: HashMap<EdgeId, Edge>,
}

impl NetworkGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_node(&mut self, node: Node) {
        self.nodes.insert(node.id, node);
    }

    /// Insert an edge. Both endpoints must already be present.
    pub fn add_edge(&mut self, edge: Edge) -> Result<()> {
        let id = edge.id;
        if !self.nodes.contains_key(&id.u) || !self.nodes.contains_key(&id.v) {
            return Err(Error::MissingNode(id.u, id.v, id.key));
        }
        self.edges.insert(id, edge);
        Ok(())
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(&id)
    }

    pub fn edge(&self, id: &EdgeId) -> Option<&Edge> {
        self.edges.get(id)
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// A graph with no edges carries no usable network.
    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values()
    }

    pub fn edges(&self) -> impl Iterator<Item = &Edge> {
        self.edges.values()
    }

    /// Edge ids in canonical order, for deterministic iteration.
    pub fn sorted_edge_ids(&self) -> Vec<EdgeId> {
        let mut ids: Vec<EdgeId> = self.edges.keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    /// Build a graph from the given edges, pulling endpoint nodes from
    /// `base`.
    pub fn induced(base: &NetworkGraph, edges: impl IntoIterator<Item = Edge>) -> Result<Self> {
        let mut graph = NetworkGraph::new();
        for edge in edges {
            let id = edge.id;
            for node_id in [id.u, id.v] {
                let node = base
                    .node(node_id)
                    .ok_or(Error::MissingNode(id.u, id.v, id.key))?;
                graph.add_node(node.clone());
            }
            graph.add_edge(edge)?;
        }
        Ok(graph)
    }

    /// Union `other` into `self`, keeping the first copy of any node or edge
    /// seen twice. Tiles partition the region so duplicates are unexpected,
    /// but the merge tolerates them.
    pub fn merge_from(&mut self, other: &NetworkGraph) {
        for node in other.nodes.values() {
            self.nodes.entry(node.id).or_insert_with(|| node.clone());
        }
        for edge in other.edges.values() {
            self.edges.entry(edge.id).or_insert_with(|| edge.clone());
        }
    }
}

/// Serialize a `LineString` as a flat list of `[lon, lat]` pairs.
mod linestring_coords {
    use geo::{Coord, LineString};
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S: Serializer>(line: &LineString<f64>, ser: S) -> Result<S::Ok, S::Error> {
        let coords: Vec<[f64; 2]> = line.0.iter().map(|c| [c.x, c.y]).collect();
        coords.serialize(ser)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(de: D) -> Result<LineString<f64>, D::Error> {
        let coords = Vec::<[f64; 2]>::deserialize(de)?;
        Ok(LineString::new(
            coords.into_iter().map(|[x, y]| Coord { x, y }).collect(),
        ))
    }
}

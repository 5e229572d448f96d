//! Per-tile network graphs stored as JSON files.

use std::path::PathBuf;

use crate::analysis::GraphSource;
use crate::error::Result;
use crate::model::NetworkGraph;
use crate::store::read_graph_json;

/// Loads tile graphs from files named `{prefix}_{tile}.json`. A missing
/// file is an explicit "no graph for this tile", not an error.
pub struct JsonGraphSource {
    dir: PathBuf,
    prefix: String,
}

impl JsonGraphSource {
    pub fn new(dir: impl Into<PathBuf>, prefix: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            prefix: prefix.into(),
        }
    }

    fn path(&self, tile: usize) -> PathBuf {
        self.dir.join(format!("{}_{tile}.json", self.prefix))
    }
}

impl GraphSource for JsonGraphSource {
    fn load_tile(&self, tile: usize) -> Result<Option<NetworkGraph>> {
        let path = self.path(tile);
        if !path.is_file() {
            return Ok(None);
        }
        read_graph_json(&path).map(Some)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Edge, EdgeId, Node};
    use crate::store::write_graph_json;
    use geo::line_string;

    #[test]
    fn missing_tile_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let source = JsonGraphSource::new(dir.path(), "net");
        assert!(source.load_tile(3).unwrap().is_none());
    }

    #[test]
    fn present_tile_round_trips() {
        let dir = tempfile::tempdir().unwrap();

        let mut g = NetworkGraph::new();
        g.add_node(Node { id: 1, lat: 51.0, lon: -1.0 });
        g.add_node(Node { id: 2, lat: 51.001, lon: -1.0 });
        g.add_edge(Edge::new(
            EdgeId::new(1, 2, 0),
            line_string![(x: -1.0, y: 51.0), (x: -1.0, y: 51.001)],
        ))
        .unwrap();
        write_graph_json(&dir.path().join("net_0.json"), &g).unwrap();

        let source = JsonGraphSource::new(dir.path(), "net");
        let loaded = source.load_tile(0).unwrap().unwrap();
        assert_eq!(loaded.edge_count(), 1);
    }
}

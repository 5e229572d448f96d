//! Persistence of graph artifacts, keyed by layer and tile.
//!
//! Resume works by artifact identity rather than by guessing at file
//! layouts: the orchestrator only ever talks to the `ArtifactStore` trait
//! (exists / read / write). The JSON store keeps records sorted so repeated
//! runs produce byte-identical files, and serde_json round-trips the f64
//! `activity` and bool `row` attributes exactly.

use std::fmt;
use std::fs;
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use hashbrown::HashMap;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::model::{Category, Edge, NetworkGraph, Node};

/// Output layer of the analysis. The three categories are mutually
/// exclusive; the two display layers are unions built at merge time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Layer {
    Category(Category),
    /// Everything with observed public traffic (public-only plus both).
    AllPublic,
    /// Every recorded right of way (both plus RoW-only).
    AllRow,
}

impl Layer {
    /// Short code used in artifact names.
    pub fn code(&self) -> &'static str {
        match self {
            Layer::Category(Category::PublicOnly) => "P",
            Layer::Category(Category::Both) => "B",
            Layer::Category(Category::RowOnly) => "R",
            Layer::AllPublic => "PB",
            Layer::AllRow => "BR",
        }
    }
}

/// Identity of one stored graph: a layer, per-tile or merged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ArtifactKey {
    pub layer: Layer,
    /// `Some(i)` for tile `i`'s output, `None` for the region-wide merge.
    pub tile: Option<usize>,
}

impl ArtifactKey {
    pub fn tile(layer: Layer, tile: usize) -> Self {
        Self {
            layer,
            tile: Some(tile),
        }
    }

    pub fn merged(layer: Layer) -> Self {
        Self { layer, tile: None }
    }
}

impl fmt::Display for ArtifactKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.tile {
            Some(i) => write!(f, "{}_{i}", self.layer.code()),
            None => write!(f, "{}", self.layer.code()),
        }
    }
}

/// Storage contract for graph artifacts.
///
/// `read` of an existing-but-unreadable artifact must fail loudly; the
/// orchestrator treats that as fatal for the tile rather than recomputing,
/// so a corrupt resume never silently produces an incomplete merge.
pub trait ArtifactStore: Sync {
    fn exists(&self, key: &ArtifactKey) -> bool;
    fn read(&self, key: &ArtifactKey) -> Result<NetworkGraph>;
    fn write(&self, key: &ArtifactKey, graph: &NetworkGraph) -> Result<()>;

    /// Whether a finished analysis is already present (all three merged
    /// category artifacts), letting a caller skip a whole run.
    fn analysis_complete(&self) -> bool {
        Category::ALL
            .iter()
            .all(|c| self.exists(&ArtifactKey::merged(Layer::Category(*c))))
    }
}

/// Flat serialized form of a graph. Node and edge lists are sorted by id so
/// serialization is deterministic.
#[derive(Debug, Serialize, Deserialize)]
pub struct GraphRecord {
    nodes: Vec<Node>,
    edges: Vec<Edge>,
}

impl GraphRecord {
    pub fn from_graph(graph: &NetworkGraph) -> Self {
        let mut nodes: Vec<Node> = graph.nodes().cloned().collect();
        nodes.sort_by_key(|n| n.id);
        let mut edges: Vec<Edge> = graph.edges().cloned().collect();
        edges.sort_by_key(|e| e.id);
        Self { nodes, edges }
    }

    pub fn into_graph(self) -> Result<NetworkGraph> {
        let mut graph = NetworkGraph::new();
        for node in self.nodes {
            graph.add_node(node);
        }
        for edge in self.edges {
            graph.add_edge(edge)?;
        }
        Ok(graph)
    }
}

/// Directory of pretty-printed JSON graph files named
/// `{prefix}_{layer}[_{tile}].json`, mirroring the flat per-authority
/// layout the artifacts have always used.
pub struct JsonArtifactStore {
    dir: PathBuf,
    prefix: String,
}

impl JsonArtifactStore {
    pub fn new(dir: impl Into<PathBuf>, prefix: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            prefix: prefix.into(),
        }
    }

    fn path(&self, key: &ArtifactKey) -> PathBuf {
        self.dir.join(format!("{}_{key}.json", self.prefix))
    }
}

impl ArtifactStore for JsonArtifactStore {
    fn exists(&self, key: &ArtifactKey) -> bool {
        self.path(key).is_file()
    }

    fn read(&self, key: &ArtifactKey) -> Result<NetworkGraph> {
        let path = self.path(key);
        if !path.is_file() {
            return Err(Error::ArtifactNotFound(key.to_string()));
        }
        read_graph_json(&path)
            .map_err(|e| Error::ResumeMismatch(key.to_string(), e.to_string()))
    }

    fn write(&self, key: &ArtifactKey, graph: &NetworkGraph) -> Result<()> {
        fs::create_dir_all(&self.dir)?;
        write_graph_json(&self.path(key), graph)
    }
}

/// Read one graph from a JSON file.
pub fn read_graph_json(path: &Path) -> Result<NetworkGraph> {
    let file = fs::File::open(path)?;
    let record: GraphRecord = serde_json::from_reader(BufReader::new(file))?;
    record.into_graph()
}

/// Write one graph to a JSON file.
pub fn write_graph_json(path: &Path, graph: &NetworkGraph) -> Result<()> {
    let file = fs::File::create(path)?;
    serde_json::to_writer_pretty(BufWriter::new(file), &GraphRecord::from_graph(graph))?;
    Ok(())
}

/// In-memory store for tests and ephemeral runs.
#[derive(Default)]
pub struct MemoryArtifactStore {
    graphs: Mutex<HashMap<ArtifactKey, String>>,
}

impl MemoryArtifactStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serialized bytes of one artifact, if present. Lets tests compare
    /// run outputs byte for byte.
    pub fn raw(&self, key: &ArtifactKey) -> Option<String> {
        self.graphs.lock().ok()?.get(key).cloned()
    }
}

impl ArtifactStore for MemoryArtifactStore {
    fn exists(&self, key: &ArtifactKey) -> bool {
        self.graphs
            .lock()
            .map(|g| g.contains_key(key))
            .unwrap_or(false)
    }

    fn read(&self, key: &ArtifactKey) -> Result<NetworkGraph> {
        let guard = self
            .graphs
            .lock()
            .map_err(|_| Error::InvalidData("artifact store poisoned".into()))?;
        let json = guard
            .get(key)
            .ok_or_else(|| Error::ArtifactNotFound(key.to_string()))?;
        let record: GraphRecord = serde_json::from_str(json)
            .map_err(|e| Error::ResumeMismatch(key.to_string(), e.to_string()))?;
        record.into_graph()
    }

    fn write(&self, key: &ArtifactKey, graph: &NetworkGraph) -> Result<()> {
        let json = serde_json::to_string_pretty(&GraphRecord::from_graph(graph))?;
        self.graphs
            .lock()
            .map_err(|_| Error::InvalidData("artifact store poisoned".into()))?
            .insert(*key, json);
        Ok(())
    }
}

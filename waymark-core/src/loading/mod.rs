//! Input collaborators: point datasets, tile polygons and per-tile graphs.
//!
//! The engine itself only sees in-memory point slices, polygons and the
//! `GraphSource` trait; everything here is the file-format boundary.

pub mod graphs;
pub mod points;
pub mod tiles;

pub use graphs::JsonGraphSource;
pub use points::read_point_csv;
pub use tiles::read_tile_polygons;

//! Tile polygons from a GeoJSON file.
//!
//! The file is a FeatureCollection whose features are Polygon or
//! MultiPolygon geometries, in tile order. Together they partition the
//! target region.

use std::fs;
use std::path::Path;

use geo::MultiPolygon;
use geojson::GeoJson;
use log::warn;

use crate::error::{Error, Result};

/// Read the ordered tile polygons for a region.
pub fn read_tile_polygons(path: &Path) -> Result<Vec<MultiPolygon<f64>>> {
    let raw = fs::read_to_string(path)?;
    let geojson: GeoJson = raw
        .parse()
        .map_err(|e: geojson::Error| Error::GeoJson(e.to_string()))?;

    let GeoJson::FeatureCollection(collection) = geojson else {
        return Err(Error::GeoJson(format!(
            "{}: expected a FeatureCollection of tile polygons",
            path.display()
        )));
    };

    let mut tiles = Vec::with_capacity(collection.features.len());
    for (i, feature) in collection.features.into_iter().enumerate() {
        let Some(geometry) = feature.geometry else {
            warn!("tile feature {i} has no geometry, skipping");
            continue;
        };
        let geometry = geo::Geometry::<f64>::try_from(&geometry.value)
            .map_err(|e| Error::GeoJson(format!("tile feature {i}: {e}")))?;
        match geometry {
            geo::Geometry::Polygon(p) => tiles.push(MultiPolygon::new(vec![p])),
            geo::Geometry::MultiPolygon(mp) => tiles.push(mp),
            other => {
                return Err(Error::GeoJson(format!(
                    "tile feature {i}: expected (Multi)Polygon, got {other:?}"
                )));
            }
        }
    }
    Ok(tiles)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_polygon_features() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tiles.geojson");
        std::fs::write(
            &path,
            r#"{"type":"FeatureCollection","features":[
                {"type":"Feature","properties":{},"geometry":
                    {"type":"Polygon","coordinates":[[[-1,51],[-0.9,51],[-0.9,51.1],[-1,51.1],[-1,51]]]}}
            ]}"#,
        )
        .unwrap();

        let tiles = read_tile_polygons(&path).unwrap();
        assert_eq!(tiles.len(), 1);
    }

    #[test]
    fn rejects_non_polygon_features() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tiles.geojson");
        std::fs::write(
            &path,
            r#"{"type":"FeatureCollection","features":[
                {"type":"Feature","properties":{},"geometry":
                    {"type":"Point","coordinates":[-1,51]}}
            ]}"#,
        )
        .unwrap();
        assert!(read_tile_polygons(&path).is_err());
    }
}

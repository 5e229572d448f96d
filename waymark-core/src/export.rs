//! GeoJSON export of classified graphs, for map display.

use geojson::{Feature, FeatureCollection, Geometry, GeometryValue, JsonObject};
use serde_json::json;

use crate::error::Result;
use crate::model::{Category, Edge, NetworkGraph};

/// Convert a graph's edges to a `FeatureCollection` of LineString features.
/// Classified edges carry their activity, right-of-way flag and derived
/// category as properties.
pub fn graph_to_geojson(graph: &NetworkGraph) -> Result<FeatureCollection> {
    let mut features = Vec::with_capacity(graph.edge_count());
    for id in graph.sorted_edge_ids() {
        if let Some(edge) = graph.edge(&id) {
            features.push(edge_feature(edge)?);
        }
    }
    Ok(FeatureCollection {
        features,
        bbox: None,
        foreign_members: None,
    })
}

pub fn graph_to_geojson_string(graph: &NetworkGraph) -> Result<String> {
    Ok(serde_json::to_string(&graph_to_geojson(graph)?)?)
}

fn edge_feature(edge: &Edge) -> Result<Feature> {
    let geometry = Geometry::new(GeometryValue::from(&edge.geometry));

    let category = match (edge.activity, edge.row) {
        (Some(activity), Some(is_row)) => Some(category_name(activity, is_row)),
        _ => None,
    };

    let mut properties = JsonObject::new();
    properties.insert("u".into(), edge.id.u.into());
    properties.insert("v".into(), edge.id.v.into());
    properties.insert("key".into(), edge.id.key.into());
    properties.insert("length".into(), json!(edge.length));
    properties.insert("activity".into(), json!(edge.activity));
    properties.insert("row".into(), json!(edge.row));
    properties.insert("category".into(), json!(category));
    properties.insert("attrs".into(), serde_json::to_value(&edge.attrs)?);

    Ok(Feature {
        bbox: None,
        geometry: Some(geometry),
        id: None,
        properties: Some(properties),
        foreign_members: None,
    })
}

fn category_name(activity: f64, is_row: bool) -> &'static str {
    let category = if is_row {
        if activity > 0.0 {
            Category::Both
        } else {
            Category::RowOnly
        }
    } else {
        Category::PublicOnly
    };
    match category {
        Category::PublicOnly => "public_only",
        Category::Both => "both",
        Category::RowOnly => "row_only",
    }
}

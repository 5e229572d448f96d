//! CSV point datasets: one row per GPS point, `latitude`, `longitude` and
//! `trackid` columns.

use std::path::Path;

use log::info;
use serde::Deserialize;

use crate::error::Result;
use crate::model::TrackPoint;

#[derive(Debug, Deserialize)]
struct PointRecord {
    latitude: f64,
    longitude: f64,
    trackid: u64,
}

/// Read a point dataset. Zero-coordinate sentinel rows (a common GPS export
/// artifact for missing fixes) are dropped here so the engine never sees
/// them.
pub fn read_point_csv(path: &Path) -> Result<Vec<TrackPoint>> {
    let mut reader = csv::Reader::from_path(path)?;
    let mut points = Vec::new();
    let mut sentinels = 0usize;

    for record in reader.deserialize() {
        let record: PointRecord = record?;
        if record.latitude == 0.0 && record.longitude == 0.0 {
            sentinels += 1;
            continue;
        }
        points.push(TrackPoint::new(
            record.latitude,
            record.longitude,
            record.trackid,
        ));
    }

    info!(
        "{}: {} points ({} zero-coordinate rows dropped)",
        path.display(),
        points.len(),
        sentinels
    );
    Ok(points)
}

//! GPS point types at the various pipeline stages.

use geo::Point;

use crate::model::EdgeId;

pub type TrackId = u64;

/// Which source dataset a point or vote table came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dataset {
    /// Crowd-sourced public activity tracks.
    Public,
    /// Authoritative right-of-way tracks.
    RightOfWay,
}

/// Raw dataset row: a position belonging to one recorded track.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrackPoint {
    pub lat: f64,
    pub lon: f64,
    pub track_id: TrackId,
}

impl TrackPoint {
    pub fn new(lat: f64, lon: f64, track_id: TrackId) -> Self {
        Self { lat, lon, track_id }
    }

    /// Position as a geo point, x = lon and y = lat.
    pub fn point(&self) -> Point<f64> {
        Point::new(self.lon, self.lat)
    }
}

/// Cleaned, evenly spaced point produced by the interpolator. Keeps the
/// originating track id and the index of the sub-track it came from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CleanPoint {
    pub lat: f64,
    pub lon: f64,
    pub track_id: TrackId,
    pub segment: usize,
}

/// A cleaned point assigned to its nearest network edge.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MatchedPoint {
    pub point: CleanPoint,
    pub edge: EdgeId,
    /// Distance in metres from the point to the edge polyline.
    pub distance: f64,
}

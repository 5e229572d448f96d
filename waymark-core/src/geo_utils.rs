//! Geographic helpers: distances, polyline length and a local planar
//! projection used for map-matching within one tile.

use geo::{Coord, Distance, Haversine, LineString, Point};

/// Metres per degree of latitude (earth radius * pi / 180).
pub const EARTH_METRES_PER_DEGREE: f64 = 111_194.926_644_558_73;

/// Great-circle distance in metres between two (lat, lon) pairs.
#[inline]
pub fn haversine_m(a: (f64, f64), b: (f64, f64)) -> f64 {
    Haversine.distance(Point::new(a.1, a.0), Point::new(b.1, b.0))
}

/// Squared degree-space distance scaled to squared metres.
///
/// Ignores the longitude convergence with latitude, so it overestimates
/// east-west distances away from the equator; callers compare it against a
/// squared threshold, never report it.
#[inline]
pub fn equirectangular_m2(a: (f64, f64), b: (f64, f64)) -> f64 {
    let dlat = a.0 - b.0;
    let dlon = a.1 - b.1;
    (dlat * dlat + dlon * dlon) * EARTH_METRES_PER_DEGREE * EARTH_METRES_PER_DEGREE
}

/// Length in metres of a lon/lat polyline.
pub fn polyline_length_m(line: &LineString<f64>) -> f64 {
    line.0
        .windows(2)
        .map(|w| haversine_m((w[0].y, w[0].x), (w[1].y, w[1].x)))
        .sum()
}

/// Equirectangular projection centred on a reference point, mapping lon/lat
/// degrees to planar metres. Accurate enough over a single tile (a few
/// kilometres across).
#[derive(Debug, Clone, Copy)]
pub struct LocalProjection {
    lat0: f64,
    lon0: f64,
    cos_lat0: f64,
}

impl LocalProjection {
    pub fn new(lat0: f64, lon0: f64) -> Self {
        Self {
            lat0,
            lon0,
            cos_lat0: lat0.to_radians().cos(),
        }
    }

    /// Project a lon/lat coordinate to planar metres.
    #[inline]
    pub fn to_xy(&self, coord: Coord<f64>) -> Coord<f64> {
        Coord {
            x: (coord.x - self.lon0) * EARTH_METRES_PER_DEGREE * self.cos_lat0,
            y: (coord.y - self.lat0) * EARTH_METRES_PER_DEGREE,
        }
    }

    pub fn project_line(&self, line: &LineString<f64>) -> LineString<f64> {
        LineString::new(line.0.iter().map(|c| self.to_xy(*c)).collect())
    }
}

/// Distance from `p` to the segment `a`-`b`, all in planar metres.
#[inline]
pub fn point_segment_distance(p: Coord<f64>, a: Coord<f64>, b: Coord<f64>) -> f64 {
    let ab = Coord {
        x: b.x - a.x,
        y: b.y - a.y,
    };
    let len2 = ab.x * ab.x + ab.y * ab.y;
    if len2 == 0.0 {
        return ((p.x - a.x).powi(2) + (p.y - a.y).powi(2)).sqrt();
    }
    let t = (((p.x - a.x) * ab.x + (p.y - a.y) * ab.y) / len2).clamp(0.0, 1.0);
    let proj = Coord {
        x: a.x + t * ab.x,
        y: a.y + t * ab.y,
    };
    ((p.x - proj.x).powi(2) + (p.y - proj.y).powi(2)).sqrt()
}

/// Distance from `p` to a projected polyline. A degenerate single-point
/// polyline is treated as that point.
pub fn point_polyline_distance(p: Coord<f64>, line: &LineString<f64>) -> f64 {
    if line.0.len() < 2 {
        return match line.0.first() {
            Some(a) => point_segment_distance(p, *a, *a),
            None => f64::INFINITY,
        };
    }
    line.0
        .windows(2)
        .map(|w| point_segment_distance(p, w[0], w[1]))
        .fold(f64::INFINITY, f64::min)
}

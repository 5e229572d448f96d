//! Track cleaning: jump segmentation and fixed-spacing resampling.
//!
//! Raw GPS tracks teleport when a device reacquires signal far away, and a
//! track clipped to an area boundary can leave and re-enter somewhere else.
//! Splitting at large inter-point gaps turns one dirty track into several
//! contiguous sub-tracks; each surviving sub-track is then resampled into
//! evenly spaced points along its path.

use itertools::Itertools;
use log::debug;

use crate::config::{AnalysisConfig, DistanceMetric};
use crate::geo_utils::{equirectangular_m2, haversine_m};
use crate::model::{CleanPoint, TrackPoint};

/// Split a track wherever the gap between consecutive points exceeds
/// `jump_m`. The fast metric compares squared distances and never takes a
/// square root.
pub fn split_at_jumps(
    points: &[TrackPoint],
    metric: DistanceMetric,
    jump_m: f64,
) -> Vec<Vec<TrackPoint>> {
    if points.is_empty() {
        return Vec::new();
    }

    let mut segments = Vec::new();
    let mut current = vec![points[0]];
    for pair in points.windows(2) {
        let a = (pair[0].lat, pair[0].lon);
        let b = (pair[1].lat, pair[1].lon);
        let jumped = match metric {
            DistanceMetric::Equirectangular => equirectangular_m2(a, b) > jump_m * jump_m,
            DistanceMetric::Haversine => haversine_m(a, b) > jump_m,
        };
        if jumped {
            segments.push(std::mem::take(&mut current));
        }
        current.push(pair[1]);
    }
    segments.push(current);
    segments
}

/// Resample a polyline of (lat, lon) pairs at roughly `spacing_m` arc-length
/// intervals. The interval count is rounded so both endpoints are kept; a
/// zero-length (degenerate) path collapses to its single coordinate.
fn resample_path(points: &[TrackPoint], spacing_m: f64) -> Vec<(f64, f64)> {
    debug_assert!(points.len() >= 2);

    let mut cumulative = Vec::with_capacity(points.len());
    let mut total = 0.0;
    cumulative.push(0.0);
    for pair in points.windows(2) {
        total += haversine_m((pair[0].lat, pair[0].lon), (pair[1].lat, pair[1].lon));
        cumulative.push(total);
    }

    if total == 0.0 {
        return vec![(points[0].lat, points[0].lon)];
    }

    let steps = ((total / spacing_m).round() as usize).max(1);
    let mut out = Vec::with_capacity(steps + 1);
    let mut seg = 0;
    for n in 0..=steps {
        let target = total * n as f64 / steps as f64;
        while seg + 2 < cumulative.len() && cumulative[seg + 1] < target {
            seg += 1;
        }
        let seg_len = cumulative[seg + 1] - cumulative[seg];
        let t = if seg_len > 0.0 {
            ((target - cumulative[seg]) / seg_len).clamp(0.0, 1.0)
        } else {
            0.0
        };
        let a = points[seg];
        let b = points[seg + 1];
        out.push((a.lat + (b.lat - a.lat) * t, a.lon + (b.lon - a.lon) * t));
    }
    out
}

/// Clean one track: optionally split at jumps, discard spurious sub-tracks,
/// and resample the survivors. Returns an empty vector when nothing
/// survives; the caller treats that as expected, not as an error.
///
/// With segmentation enabled, sub-tracks with at most
/// `config.spurious_point_count` points are discarded. With it disabled only
/// single-point sub-tracks are dropped, since one point cannot form a path.
pub fn interpolate_track(
    points: &[TrackPoint],
    config: &AnalysisConfig,
    segmentation: bool,
) -> Vec<CleanPoint> {
    let segments = if segmentation {
        split_at_jumps(points, config.jump_metric, config.jump_split_dist)
    } else {
        vec![points.to_vec()]
    };

    let mut out = Vec::new();
    for (segment_idx, segment) in segments.into_iter().enumerate() {
        let spurious = segmentation && segment.len() <= config.spurious_point_count;
        let degenerate = !segmentation && segment.len() <= 1;
        if spurious || degenerate {
            debug!(
                "dropping sub-track {segment_idx} with {} points",
                segment.len()
            );
            continue;
        }

        let track_id = segment[0].track_id;
        out.extend(
            resample_path(&segment, config.interpolation_dist)
                .into_iter()
                .map(|(lat, lon)| CleanPoint {
                    lat,
                    lon,
                    track_id,
                    segment: segment_idx,
                }),
        );
    }
    out
}

/// Clean a whole dataset, track by track. Returns `None` when every track
/// was dropped, which is distinguishable from "not yet computed" upstream.
pub fn interpolate_tracks(
    points: &[TrackPoint],
    config: &AnalysisConfig,
    segmentation: bool,
) -> Option<Vec<CleanPoint>> {
    let mut sorted = points.to_vec();
    sorted.sort_by_key(|p| p.track_id);

    let mut out = Vec::new();
    for (_, track) in &sorted.iter().chunk_by(|p| p.track_id) {
        let track: Vec<TrackPoint> = track.copied().collect();
        out.extend(interpolate_track(&track, config, segmentation));
    }

    if out.is_empty() { None } else { Some(out) }
}

//! Vote and classification output rows.

use crate::model::Edge;

/// An edge that survived one dataset's matching, with its vote counts.
///
/// Carries the full edge so downstream stages keep geometry, length and
/// attributes without going back to the graph.
#[derive(Debug, Clone)]
pub struct VotedEdge {
    pub edge: Edge,
    /// Total matched points on this edge.
    pub point_count: usize,
    /// Distinct tracks that contributed those points.
    pub track_count: usize,
}

/// Usage category of a classified edge. Derived from the activity and
/// right-of-way fields, never stored separately. Edges touched by neither
/// dataset are excluded before classification, so the combination
/// "no activity, not a right of way" never occurs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Category {
    /// Observed public traffic on a path that is not a recorded right of way.
    PublicOnly,
    /// Observed public traffic on a recorded right of way.
    Both,
    /// A recorded right of way with no observed public traffic.
    RowOnly,
}

impl Category {
    pub const ALL: [Category; 3] = [Category::PublicOnly, Category::Both, Category::RowOnly];
}

/// Final per-edge classification: normalized activity plus the
/// right-of-way flag, always jointly present.
#[derive(Debug, Clone)]
pub struct ClassifiedEdge {
    pub edge: Edge,
    /// Normalized public-track vote density in `[0, 100]`.
    pub activity_pct: f64,
    pub is_row: bool,
}

impl ClassifiedEdge {
    pub fn category(&self) -> Category {
        if self.is_row {
            if self.activity_pct > 0.0 {
                Category::Both
            } else {
                Category::RowOnly
            }
        } else {
            // Edges without votes from either source are never emitted, so a
            // non-RoW row always carries activity.
            Category::PublicOnly
        }
    }
}

//! Connected-component denoising of a classified edge set.
//!
//! Matching noise shows up as small clusters of edges disconnected from the
//! real network. Components are found with union-find over shared nodes and
//! dropped when their total edge length is at or below the threshold.

use hashbrown::{HashMap, HashSet};
use log::{debug, warn};

use crate::model::{EdgeId, NodeId};
use crate::union_find::UnionFind;

/// Ids of the edges that survive component filtering.
///
/// Components with total length at or below `min_length_m` are removed. If
/// that removes everything, the single largest component is kept instead so
/// the result is never empty; the tie-break is by length then smallest edge
/// id, keeping the choice deterministic. The fallback can hide a
/// genuinely-empty result; callers that need one must inspect component
/// lengths themselves.
pub fn filter_small_components(
    edges: impl IntoIterator<Item = (EdgeId, f64)>,
    min_length_m: f64,
) -> HashSet<EdgeId> {
    let edges: Vec<(EdgeId, f64)> = edges.into_iter().collect();
    if edges.is_empty() {
        return HashSet::new();
    }

    let mut uf: UnionFind<NodeId> = UnionFind::new();
    for (id, _) in &edges {
        uf.make_set(id.u);
        uf.make_set(id.v);
        uf.union(&id.u, &id.v);
    }

    // Bucket edges by component root, tracking each component's length.
    let mut components: HashMap<NodeId, (f64, Vec<EdgeId>)> = HashMap::new();
    for (id, length) in &edges {
        let root = uf.find(&id.u);
        let entry = components.entry(root).or_default();
        entry.0 += length;
        entry.1.push(*id);
    }
    debug!("{} components from {} edges", components.len(), edges.len());

    let keep: Vec<&(f64, Vec<EdgeId>)> = components
        .values()
        .filter(|(total, _)| *total > min_length_m)
        .collect();

    if keep.is_empty() {
        // Deterministic largest component: longest, then smallest edge id.
        let largest = components
            .values()
            .max_by(|a, b| {
                a.0.total_cmp(&b.0)
                    .then_with(|| b.1.iter().min().cmp(&a.1.iter().min()))
            })
            .map(|(_, ids)| ids.iter().copied().collect())
            .unwrap_or_default();
        warn!(
            "all components at or below {min_length_m} m, keeping the largest instead of \
             returning nothing"
        );
        return largest;
    }

    keep.into_iter()
        .flat_map(|(_, ids)| ids.iter().copied())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn edge(u: NodeId, v: NodeId) -> EdgeId {
        EdgeId::new(u, v, 0)
    }

    #[test]
    fn drops_small_components() {
        // Component A: 1-2-3, 300 m total. Component B: 10-11, 50 m.
        let edges = vec![
            (edge(1, 2), 150.0),
            (edge(2, 3), 150.0),
            (edge(10, 11), 50.0),
        ];
        let kept = filter_small_components(edges, 200.0);
        assert!(kept.contains(&edge(1, 2)));
        assert!(kept.contains(&edge(2, 3)));
        assert!(!kept.contains(&edge(10, 11)));
    }

    #[test]
    fn threshold_is_exclusive() {
        // Exactly at the threshold counts as too small.
        let edges = vec![(edge(1, 2), 200.0), (edge(10, 11), 201.0)];
        let kept = filter_small_components(edges, 200.0);
        assert!(!kept.contains(&edge(1, 2)));
        assert!(kept.contains(&edge(10, 11)));
    }

    #[test]
    fn keeps_largest_when_all_filtered() {
        // Both components are under threshold; the 150 m one is kept.
        let edges = vec![
            (edge(1, 2), 50.0),
            (edge(2, 3), 50.0),
            (edge(3, 4), 50.0),
            (edge(10, 11), 40.0),
        ];
        let kept = filter_small_components(edges, 200.0);
        assert_eq!(kept.len(), 3);
        assert!(kept.contains(&edge(1, 2)));
    }

    #[test]
    fn empty_input_stays_empty() {
        assert!(filter_small_components(Vec::new(), 200.0).is_empty());
    }

    #[test]
    fn parallel_edges_share_a_component() {
        let edges = vec![
            (EdgeId::new(1, 2, 0), 100.0),
            (EdgeId::new(1, 2, 1), 120.0),
        ];
        let kept = filter_small_components(edges, 200.0);
        // Combined length 220 m clears the threshold.
        assert_eq!(kept.len(), 2);
    }
}

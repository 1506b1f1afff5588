//! Waterfall connection visualizer.
//!
//! Computes the polyline connecting the visited cards in the echo
//! waterfall. Geometry comes from the host through [`LayoutProvider`] --
//! the core never touches rendered layout directly. The path is a pure
//! function of the visited set and the provider; hosts recompute it on
//! visited-set or content changes, never on passive scroll (lighting up is
//! action-driven).

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::treehole::VisitedSet;

/// A point on the connecting polyline, in host coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PathPoint {
    pub x: f64,
    pub y: f64,
}

/// Supplies the current marker position for an echo card.
pub trait LayoutProvider {
    /// Position of the marker for `id`, or `None` when the card is not
    /// currently rendered.
    fn marker_position(&self, id: &str) -> Option<PathPoint>;
}

impl LayoutProvider for HashMap<String, PathPoint> {
    fn marker_position(&self, id: &str) -> Option<PathPoint> {
        self.get(id).copied()
    }
}

/// Ordered path through the visited markers, sorted ascending by `y` so
/// the rendered line always flows top-to-bottom regardless of the order
/// the cards were lit up in. Ids without a rendered marker are skipped.
pub fn connection_path(visited: &VisitedSet, layout: &dyn LayoutProvider) -> Vec<PathPoint> {
    let mut points: Vec<PathPoint> = visited
        .iter()
        .filter_map(|id| layout.marker_position(id))
        .collect();
    points.sort_by(|a, b| a.y.total_cmp(&b.y));
    points
}

#[cfg(test)]
mod tests {
    use super::*;

    fn layout(entries: &[(&str, f64, f64)]) -> HashMap<String, PathPoint> {
        entries
            .iter()
            .map(|(id, x, y)| (id.to_string(), PathPoint { x: *x, y: *y }))
            .collect()
    }

    #[test]
    fn path_is_sorted_by_y_regardless_of_visit_order() {
        let layout = layout(&[("a", 10.0, 300.0), ("b", 20.0, 100.0), ("c", 30.0, 200.0)]);

        // Visit in an order unrelated to vertical position.
        let mut visited = VisitedSet::new();
        visited.insert("a");
        visited.insert("c");
        visited.insert("b");

        let path = connection_path(&visited, &layout);
        let ys: Vec<f64> = path.iter().map(|p| p.y).collect();
        assert_eq!(ys, vec![100.0, 200.0, 300.0]);
    }

    #[test]
    fn unrendered_ids_are_skipped() {
        let layout = layout(&[("a", 0.0, 50.0)]);
        let mut visited = VisitedSet::new();
        visited.insert("a");
        visited.insert("ghost");

        let path = connection_path(&visited, &layout);
        assert_eq!(path.len(), 1);
    }

    #[test]
    fn empty_visited_set_yields_empty_path() {
        let layout = layout(&[("a", 0.0, 50.0)]);
        assert!(connection_path(&VisitedSet::new(), &layout).is_empty());
    }
}

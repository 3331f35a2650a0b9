// Orbit geometry for satellites around their hub.
//
// A satellite is a node whose parent resolves to a hub type (puzzle or
// element). Satellites ring their hub on a circle whose radius grows with
// the satellite count; the start angle depends on the count. One sits
// below the hub and five or more start at the top. Two sit level with the
// hub, since a half-turn step cannot keep both in the lower half.

use crate::graph::{Point, Size, ValidatedGraph};

/// Start angle (degrees, y-down) for a ring of `count` satellites.
///
/// Two satellites are 180 degrees apart, so no start angle puts both below
/// the hub; 0 leaves them on its left and right.
pub fn start_angle_degrees(count: usize) -> f64 {
    match count {
        0 | 1 => 90.0,
        2 => 0.0,
        3 => 30.0,
        4 => 45.0,
        _ => 270.0,
    }
}

/// Shape parameters shared by the footprint estimate and the final ring.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct OrbitShape {
    pub node_width: f64,
    pub gap: f64,
    pub growth: f64,
}

impl OrbitShape {
    pub fn radius(&self, hub_width: f64, count: usize) -> f64 {
        hub_width / 2.0 + self.node_width / 2.0 + self.gap + self.growth * count.saturating_sub(1) as f64
    }

    /// Square reserved for a hub in the layered pass, big enough for its ring.
    /// The count is capped so a crowded hub does not blow up the drawing.
    pub fn footprint(&self, hub_width: f64, count: usize, cap: usize) -> Size {
        let estimate = self.radius(hub_width, count.min(cap));
        Size::square(2.0 * (estimate + self.node_width / 2.0))
    }
}

/// Evenly spaced points on a circle around `hub`.
pub fn ring(hub: Point, radius: f64, count: usize) -> Vec<Point> {
    let start = start_angle_degrees(count);
    let step = 360.0 / count.max(1) as f64;
    (0..count)
        .map(|k| hub.polar_offset((start + step * k as f64).to_radians(), radius))
        .collect()
}

/// Satellite membership for a validated graph.
#[derive(Debug, Clone, Default)]
pub struct Satellites {
    /// Satellites per node index, sorted by id then index. Empty for non-hubs.
    pub by_hub: Vec<Vec<usize>>,
    /// Hubs with at least one satellite, parents before children.
    pub hubs: Vec<usize>,
    /// Nodes whose parent chain never ends.
    pub cyclic: Vec<usize>,
}

impl Satellites {
    pub fn collect(graph: &ValidatedGraph) -> Self {
        let n = graph.len();
        let depths: Vec<Option<usize>> = (0..n).map(|i| chain_depth(graph, i)).collect();

        let mut by_hub: Vec<Vec<usize>> = vec![Vec::new(); n];
        let mut cyclic = Vec::new();
        for i in 0..n {
            if depths[i].is_none() {
                cyclic.push(i);
                continue;
            }
            if let Some(p) = graph.parents[i] {
                if graph.nodes[p].kind.is_hub() {
                    by_hub[p].push(i);
                }
            }
        }
        for members in &mut by_hub {
            members.sort_by(|&a, &b| graph.nodes[a].id.cmp(&graph.nodes[b].id).then(a.cmp(&b)));
        }

        let mut hubs: Vec<usize> = (0..n).filter(|&i| !by_hub[i].is_empty()).collect();
        hubs.sort_by_key(|&i| (depths[i], i));

        Self { by_hub, hubs, cyclic }
    }

    pub fn of(&self, hub: usize) -> &[usize] {
        self.by_hub.get(hub).map_or(&[], Vec::as_slice)
    }
}

/// Steps from `node` to the root of its parent chain; `None` if it loops.
fn chain_depth(graph: &ValidatedGraph, node: usize) -> Option<usize> {
    let mut current = node;
    for depth in 0..=graph.len() {
        match graph.parents[current] {
            Some(p) => current = p,
            None => return Some(depth),
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{validate, Node, NodeType, SizeDefaults};

    fn shape() -> OrbitShape {
        OrbitShape { node_width: 180.0, gap: 30.0, growth: 12.0 }
    }

    #[test]
    fn test_radius_and_footprint() {
        let s = shape();
        assert_eq!(s.radius(180.0, 1), 210.0);
        assert_eq!(s.radius(180.0, 4), 246.0);
        // Capped at 8 satellites
        assert_eq!(s.footprint(180.0, 20, 8), s.footprint(180.0, 8, 8));
        assert_eq!(s.footprint(180.0, 1, 8), Size::square(600.0));
    }

    #[test]
    fn test_ring_start_angles() {
        let hub = Point::new(100.0, 100.0);

        let one = ring(hub, 50.0, 1);
        assert!((one[0].x - 100.0).abs() < 1e-9);
        assert!((one[0].y - 150.0).abs() < 1e-9);

        let two = ring(hub, 50.0, 2);
        assert!((two[0].y - 100.0).abs() < 1e-9 && (two[1].y - 100.0).abs() < 1e-9);
        assert!((two[0].x - two[1].x).abs() > 99.0);

        let five = ring(hub, 50.0, 5);
        assert!((five[0].y - 50.0).abs() < 1e-9);
    }

    #[test]
    fn test_collect_orders_and_filters() {
        let nodes = vec![
            Node::new("hub", NodeType::Puzzle),
            Node::new("z", NodeType::Element).with_parent("hub"),
            Node::new("a", NodeType::Character).with_parent("hub"),
            Node::new("who", NodeType::Character),
            Node::new("x", NodeType::Element).with_parent("who"),
            Node::new("inner", NodeType::Element).with_parent("z"),
        ];
        let graph = validate(&nodes, &[], SizeDefaults::uniform(Size::new(180.0, 60.0)));
        let sat = Satellites::collect(&graph);

        assert_eq!(sat.of(0), &[2, 1]);
        // Character parents do not own satellites
        assert!(sat.of(3).is_empty());
        // Outer hub first, nested hub after
        assert_eq!(sat.hubs, vec![0, 1]);
        assert!(sat.cyclic.is_empty());
    }

    #[test]
    fn test_parent_cycle_detected() {
        let nodes = vec![
            Node::new("a", NodeType::Puzzle).with_parent("b"),
            Node::new("b", NodeType::Puzzle).with_parent("a"),
            Node::new("c", NodeType::Element).with_parent("a"),
            Node::new("d", NodeType::Puzzle),
        ];
        let graph = validate(&nodes, &[], SizeDefaults::uniform(Size::new(180.0, 60.0)));
        let sat = Satellites::collect(&graph);

        assert_eq!(sat.cyclic, vec![0, 1, 2]);
        assert!(sat.hubs.is_empty());
    }
}

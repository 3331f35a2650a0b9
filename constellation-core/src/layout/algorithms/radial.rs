// Radial sector layout.
//
// The center node sits at the origin. Every other node is grouped by type
// and each type owns a fixed angular sector:
//
//               character (270)
//                     |
//   timeline (180) -- C -- puzzle (0)
//                     |
//               element (90)
//
// Unknown types share a diagonal sector at 45 degrees. Angles are measured
// in a y-down space, so 90 points below the center.
//
// Properties:
// - Deterministic: groups in fixed priority order, members sorted by id
// - Small groups fan out around their base angle, capped spread
// - A ring too crowded for its spread moves outward until its boxes clear
// - Large groups wrap onto concentric rings
// - No center node: grid placement

use std::f64::consts::PI;

use serde::{Deserialize, Serialize};

use crate::diagnostics::Diagnostics;
use crate::error::LayoutError;
use crate::graph::{Edge, Node, NodeType, Point, Size, SizeDefaults, ValidatedGraph, Warning};
use crate::layout::{run_strategy, LayoutResult, LayoutStrategy, Placement};
use super::{positive_or_default, GridConfig};

/// Relative clearance added when a ring is pushed outward.
const RADIUS_SLACK: f64 = 1e-9;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RadialConfig {
    /// Radius of the first ring before the per-type factor is applied.
    pub base_radius: f64,
    /// Radius added for each extra ring of an overflowing group.
    pub min_radius_between_rings: f64,
    pub max_nodes_per_ring: usize,
    /// Typical node width, used for angular spacing.
    pub node_width: f64,
    pub node_height: f64,
    /// Widest fan a single ring of one group may cover.
    pub max_spread_degrees: f64,
    pub grid: GridConfig,
}

impl Default for RadialConfig {
    fn default() -> Self {
        Self {
            base_radius: 300.0,
            min_radius_between_rings: 150.0,
            max_nodes_per_ring: 5,
            node_width: 180.0,
            node_height: 60.0,
            max_spread_degrees: 60.0,
            grid: GridConfig::default(),
        }
    }
}

impl RadialConfig {
    pub fn sanitized(&self, diagnostics: &dyn Diagnostics) -> Self {
        let d = Self::default();
        let max_nodes_per_ring = if self.max_nodes_per_ring == 0 {
            diagnostics.warn("config maxNodesPerRing = 0 is unusable; using default");
            d.max_nodes_per_ring
        } else {
            self.max_nodes_per_ring
        };
        Self {
            base_radius: positive_or_default(self.base_radius, d.base_radius, "baseRadius", diagnostics),
            min_radius_between_rings: positive_or_default(
                self.min_radius_between_rings,
                d.min_radius_between_rings,
                "minRadiusBetweenRings",
                diagnostics,
            ),
            max_nodes_per_ring,
            node_width: positive_or_default(self.node_width, d.node_width, "nodeWidth", diagnostics),
            node_height: positive_or_default(self.node_height, d.node_height, "nodeHeight", diagnostics),
            max_spread_degrees: positive_or_default(
                self.max_spread_degrees,
                d.max_spread_degrees,
                "maxSpreadDegrees",
                diagnostics,
            )
            .min(360.0),
            grid: self.grid.sanitized(diagnostics),
        }
    }
}

/// Angular sector reserved for one node type.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Sector {
    pub base_angle_degrees: f64,
    pub radius_factor: f64,
}

pub fn sector_for(kind: NodeType) -> Sector {
    let (base_angle_degrees, radius_factor) = match kind {
        NodeType::Character => (270.0, 1.0),
        NodeType::Puzzle => (0.0, 1.2),
        NodeType::Element => (90.0, 1.4),
        NodeType::Timeline => (180.0, 1.6),
        NodeType::Unknown => (45.0, 1.8),
    };
    Sector { base_angle_degrees, radius_factor }
}

/// Smallest angle between neighbours on a ring of `radius` that keeps two
/// `size` boxes from touching.
///
/// Centers one box diagonal apart can never overlap, so the chord must be at
/// least that long. The arc must also cover one node width.
pub fn min_step(radius: f64, size: Size) -> f64 {
    let diagonal = size.width.hypot(size.height);
    let chord_step = if diagonal >= 2.0 * radius {
        PI
    } else {
        2.0 * (diagonal / (2.0 * radius)).asin()
    };
    size.width.atan2(radius).max(chord_step)
}

/// Radius at which `count` boxes fit in `max_spread`; never below `radius`.
pub fn fitted_radius(count: usize, radius: f64, size: Size, max_spread: f64) -> f64 {
    if count <= 1 {
        return radius;
    }
    let allowed = max_spread / (count - 1) as f64;
    if min_step(radius, size) <= allowed {
        return radius;
    }
    let by_chord = size.width.hypot(size.height) / (2.0 * (allowed / 2.0).sin());
    let by_arc = size.width / allowed.tan();
    radius.max(by_chord.max(by_arc) * (1.0 + RADIUS_SLACK))
}

/// Angles (radians) for `count` nodes sharing one ring at `ring_radius`.
///
/// The fan is centered on `base`, at most `max_spread` wide, and no wider
/// than needed to keep neighbouring boxes apart.
pub fn ring_angles(count: usize, base: f64, ring_radius: f64, size: Size, max_spread: f64) -> Vec<f64> {
    if count <= 1 {
        return vec![base; count];
    }
    let step_needed = min_step(ring_radius, size);
    let spread = max_spread.min(step_needed * (count - 1) as f64);
    let step = spread / (count - 1) as f64;
    let start = base - spread / 2.0;
    (0..count).map(|j| start + step * j as f64).collect()
}

pub struct RadialLayout {
    cfg: RadialConfig,
}

impl RadialLayout {
    pub fn new(cfg: RadialConfig) -> Self {
        Self { cfg }
    }
}

impl LayoutStrategy for RadialLayout {
    fn name(&self) -> &'static str {
        "radial"
    }

    fn size_defaults(&self) -> SizeDefaults {
        SizeDefaults::uniform(Size::new(self.cfg.node_width, self.cfg.node_height))
    }

    fn grid(&self) -> &GridConfig {
        &self.cfg.grid
    }

    fn place(
        &self,
        graph: &ValidatedGraph,
        _warnings: &mut Vec<Warning>,
        diagnostics: &dyn Diagnostics,
    ) -> Result<Placement, LayoutError> {
        let Some(center) = graph.center else {
            return Ok(Placement::NeedsGrid);
        };
        let cfg = &self.cfg;
        let max_spread = cfg.max_spread_degrees.to_radians();

        let mut positions = vec![Point::ORIGIN; graph.len()];

        for kind in NodeType::PRIORITY {
            let mut members: Vec<usize> = (0..graph.len())
                .filter(|&i| i != center && graph.nodes[i].kind == kind)
                .collect();
            if members.is_empty() {
                continue;
            }
            // Index breaks ties between duplicate ids
            members.sort_by(|&a, &b| graph.nodes[a].id.cmp(&graph.nodes[b].id).then(a.cmp(&b)));

            let sector = sector_for(kind);
            let base = sector.base_angle_degrees.to_radians();
            let first_radius = cfg.base_radius * sector.radius_factor;

            let mut previous: Option<f64> = None;
            for (ring, batch) in members.chunks(cfg.max_nodes_per_ring).enumerate() {
                // Largest box in the ring sets the spacing
                let size = batch.iter().fold(Size::new(cfg.node_width, cfg.node_height), |acc, &i| {
                    Size::new(acc.width.max(graph.sizes[i].width), acc.height.max(graph.sizes[i].height))
                });
                let nominal = first_radius + ring as f64 * cfg.min_radius_between_rings;
                let floor = previous.map_or(nominal, |r| nominal.max(r + cfg.min_radius_between_rings));
                let radius = fitted_radius(batch.len(), floor, size, max_spread);
                if radius > floor {
                    diagnostics.debug(&format!(
                        "radial: {} ring {} pushed out to {:.1} to fit {} node(s)",
                        kind.as_str(),
                        ring,
                        radius,
                        batch.len()
                    ));
                }
                let angles = ring_angles(batch.len(), base, radius, size, max_spread);
                for (&i, angle) in batch.iter().zip(angles) {
                    positions[i] = Point::ORIGIN.polar_offset(angle, radius);
                }
                previous = Some(radius);
            }

            diagnostics.debug(&format!(
                "radial: {} {} node(s) in {} ring(s)",
                members.len(),
                kind.as_str(),
                members.len().div_ceil(cfg.max_nodes_per_ring)
            ));
        }

        Ok(Placement::Positioned(positions))
    }
}

/// Radial sector layout around the center node.
pub fn radial_layout(
    nodes: &[Node],
    edges: &[Edge],
    cfg: &RadialConfig,
    diagnostics: &dyn Diagnostics,
) -> LayoutResult {
    let strategy = RadialLayout::new(cfg.sanitized(diagnostics));
    run_strategy(&strategy, nodes, edges, diagnostics)
}

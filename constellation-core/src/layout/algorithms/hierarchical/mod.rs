// Hierarchical orbit layout.
//
// A layered drawing of the whole graph, followed by an orbit pass:
// - Hubs (puzzle, element) that own satellites reserve a square footprint
//   in the layered pass, sized for their future ring
// - The layered pass places every node, satellites included
// - Each hub then pulls its satellites onto a circle around its final
//   position, outer hubs first so nested rings follow their parent
//
// Properties:
// - Deterministic: no randomness, satellites sorted by id
// - Edge cycles are broken inside the layered pass, never an error
// - Parent cycles are reported and those nodes keep their layered position
// - Layered failures fall back to grid placement for the whole graph

mod layered;
mod orbit;

use serde::{Deserialize, Serialize};

use crate::diagnostics::Diagnostics;
use crate::error::LayoutError;
use crate::graph::{Edge, Node, Size, SizeDefaults, ValidatedGraph, Warning};
use crate::layout::{run_strategy, LayoutResult, LayoutStrategy, Placement};
use super::{clamped_or_default, positive_or_default, GridConfig};
use layered::LayeredGraph;
use orbit::{OrbitShape, Satellites};

const MAX_CROSSING_SWEEPS: usize = 64;

/// Direction ranks advance in.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Direction {
    #[default]
    #[serde(rename = "TB")]
    TopBottom,
    #[serde(rename = "LR")]
    LeftRight,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct HierarchicalConfig {
    pub direction: Direction,
    /// Gap between neighbours in one rank.
    pub node_separation: f64,
    /// Gap between consecutive ranks.
    pub rank_separation: f64,
    pub node_width: f64,
    pub node_height: f64,
    pub center_node_width: f64,
    pub center_node_height: f64,
    /// Extra orbit radius per satellite beyond the first.
    pub per_child_orbit_growth_factor: f64,
    /// Clearance between a hub's edge and its satellites.
    pub orbit_gap: f64,
    /// Satellite count above which the reserved footprint stops growing.
    pub satellite_estimate_cap: usize,
    pub crossing_sweeps: usize,
    pub grid: GridConfig,
}

impl Default for HierarchicalConfig {
    fn default() -> Self {
        Self {
            direction: Direction::TopBottom,
            node_separation: 50.0,
            rank_separation: 100.0,
            node_width: 180.0,
            node_height: 60.0,
            center_node_width: 220.0,
            center_node_height: 80.0,
            per_child_orbit_growth_factor: 12.0,
            orbit_gap: 30.0,
            satellite_estimate_cap: 8,
            crossing_sweeps: 8,
            grid: GridConfig::default(),
        }
    }
}

impl HierarchicalConfig {
    pub fn sanitized(&self, diagnostics: &dyn Diagnostics) -> Self {
        let d = Self::default();
        let satellite_estimate_cap = if self.satellite_estimate_cap == 0 {
            diagnostics.warn("config satelliteEstimateCap = 0 is unusable; using default");
            d.satellite_estimate_cap
        } else {
            self.satellite_estimate_cap
        };
        let crossing_sweeps = if self.crossing_sweeps > MAX_CROSSING_SWEEPS {
            diagnostics.warn(&format!(
                "config crossingSweeps = {} clamped to {}",
                self.crossing_sweeps, MAX_CROSSING_SWEEPS
            ));
            MAX_CROSSING_SWEEPS
        } else {
            self.crossing_sweeps
        };
        Self {
            direction: self.direction,
            node_separation: clamped_or_default(
                self.node_separation,
                d.node_separation,
                0.0..=f64::MAX,
                "nodeSeparation",
                diagnostics,
            ),
            rank_separation: clamped_or_default(
                self.rank_separation,
                d.rank_separation,
                0.0..=f64::MAX,
                "rankSeparation",
                diagnostics,
            ),
            node_width: positive_or_default(self.node_width, d.node_width, "nodeWidth", diagnostics),
            node_height: positive_or_default(self.node_height, d.node_height, "nodeHeight", diagnostics),
            center_node_width: positive_or_default(
                self.center_node_width,
                d.center_node_width,
                "centerNodeWidth",
                diagnostics,
            ),
            center_node_height: positive_or_default(
                self.center_node_height,
                d.center_node_height,
                "centerNodeHeight",
                diagnostics,
            ),
            per_child_orbit_growth_factor: clamped_or_default(
                self.per_child_orbit_growth_factor,
                d.per_child_orbit_growth_factor,
                0.0..=f64::MAX,
                "perChildOrbitGrowthFactor",
                diagnostics,
            ),
            orbit_gap: clamped_or_default(self.orbit_gap, d.orbit_gap, 0.0..=f64::MAX, "orbitGap", diagnostics),
            satellite_estimate_cap,
            crossing_sweeps,
            grid: self.grid.sanitized(diagnostics),
        }
    }

    fn orbit_shape(&self) -> OrbitShape {
        OrbitShape {
            node_width: self.node_width,
            gap: self.orbit_gap,
            growth: self.per_child_orbit_growth_factor,
        }
    }
}

pub struct HierarchicalLayout {
    cfg: HierarchicalConfig,
}

impl HierarchicalLayout {
    pub fn new(cfg: HierarchicalConfig) -> Self {
        Self { cfg }
    }
}

impl LayoutStrategy for HierarchicalLayout {
    fn name(&self) -> &'static str {
        "hierarchicalOrbit"
    }

    fn size_defaults(&self) -> SizeDefaults {
        SizeDefaults {
            node: Size::new(self.cfg.node_width, self.cfg.node_height),
            center: Size::new(self.cfg.center_node_width, self.cfg.center_node_height),
        }
    }

    fn grid(&self) -> &GridConfig {
        &self.cfg.grid
    }

    fn place(
        &self,
        graph: &ValidatedGraph,
        warnings: &mut Vec<Warning>,
        diagnostics: &dyn Diagnostics,
    ) -> Result<Placement, LayoutError> {
        let cfg = &self.cfg;
        let shape = cfg.orbit_shape();
        let satellites = Satellites::collect(graph);

        for &i in &satellites.cyclic {
            let warning = Warning::ParentCycle { node_id: graph.nodes[i].id.clone() };
            diagnostics.warn(&warning.to_string());
            warnings.push(warning);
        }

        let mut layered = LayeredGraph::new(cfg.direction, cfg.node_separation, cfg.rank_separation, cfg.crossing_sweeps);
        for (i, &size) in graph.sizes.iter().enumerate() {
            let count = satellites.of(i).len();
            let layout_size = if count > 0 {
                shape.footprint(size.width, count, cfg.satellite_estimate_cap)
            } else {
                size
            };
            layered.add_node(layout_size);
        }
        for &(source, target) in &graph.links {
            layered.add_edge(source, target);
        }

        let placed = layered.layout()?;
        if let Some(extent) = placed.iter().map(|p| p.bounds).reduce(|a, b| a.union(&b)) {
            diagnostics.debug(&format!(
                "hierarchical: layered {} node(s) into {:.0}x{:.0}",
                placed.len(),
                extent.width,
                extent.height
            ));
        }

        let mut positions: Vec<_> = placed.iter().map(|p| p.center).collect();
        for &hub in &satellites.hubs {
            let members = satellites.of(hub);
            let radius = shape.radius(graph.sizes[hub].width, members.len());
            for (&s, point) in members.iter().zip(orbit::ring(positions[hub], radius, members.len())) {
                positions[s] = point;
            }
        }

        Ok(Placement::Positioned(positions))
    }
}

/// Layered layout with satellites orbiting their hubs.
pub fn hierarchical_layout(
    nodes: &[Node],
    edges: &[Edge],
    cfg: &HierarchicalConfig,
    diagnostics: &dyn Diagnostics,
) -> LayoutResult {
    let strategy = HierarchicalLayout::new(cfg.sanitized(diagnostics));
    run_strategy(&strategy, nodes, edges, diagnostics)
}

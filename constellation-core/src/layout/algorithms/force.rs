// Force-directed placement.
//
// A spring-embedder simulation run for a fixed number of ticks:
// - Link springs pull connected nodes toward the target link distance
// - Many-body charge pushes every pair apart (brute force, no quadtree)
// - A per-axis pull keeps the graph around the centering target
// - Collision keeps node circles from overlapping
//
// Each tick cools `alpha` toward zero, so the forces shrink as the graph
// settles. The center node, if any, is pinned at the origin for the whole
// run and the centering target moves there too.
//
// A node's collision circle covers its whole rendered box. After the last
// tick any circles that still overlap are pushed apart directly, so boxes
// never overlap in the output.
//
// Deterministic: free nodes start on a phyllotaxis spiral and the jitter
// used to separate coincident nodes comes from a fixed-seed `StdRng`.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::diagnostics::Diagnostics;
use crate::error::LayoutError;
use crate::graph::{Edge, Node, Point, Size, SizeDefaults, ValidatedGraph, Warning};
use crate::layout::adjacency::Adjacency;
use crate::layout::spatial_grid::SpatialGrid;
use crate::layout::{run_strategy, LayoutResult, LayoutStrategy, Placement};
use super::{clamped_or_default, positive_or_default, GridConfig};

const MAX_ITERATIONS: usize = 10_000;
const ALPHA_MIN: f64 = 0.001;
/// Ticks over which alpha cools from 1 to `ALPHA_MIN`.
const COOLING_TICKS: f64 = 300.0;
const VELOCITY_DECAY: f64 = 0.4;
const INITIAL_RADIUS: f64 = 10.0;
const JITTER_SEED: u64 = 1;
const MAX_SEPARATION_ROUNDS: usize = 200;
/// Relative clearance left between circles by the separation pass.
const SEPARATION_SLACK: f64 = 1e-6;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ForceConfig {
    /// Viewport size; without a center node the graph is pulled toward its middle.
    pub width: f64,
    pub height: f64,
    /// Many-body strength. Negative values repel.
    pub charge_strength: f64,
    pub link_distance: f64,
    /// Spring stiffness, 0 to 1.
    pub link_strength: f64,
    pub center_strength: f64,
    pub collision_radius: f64,
    pub center_collision_radius: f64,
    pub iterations: usize,
    /// Render size for nodes without their own `visualSize`.
    pub node_width: f64,
    pub node_height: f64,
    pub grid: GridConfig,
}

impl Default for ForceConfig {
    fn default() -> Self {
        Self {
            width: 800.0,
            height: 600.0,
            charge_strength: -300.0,
            link_distance: 100.0,
            link_strength: 0.7,
            center_strength: 0.05,
            collision_radius: 60.0,
            center_collision_radius: 90.0,
            iterations: 300,
            node_width: 180.0,
            node_height: 60.0,
            grid: GridConfig::default(),
        }
    }
}

impl ForceConfig {
    pub fn sanitized(&self, diagnostics: &dyn Diagnostics) -> Self {
        let d = Self::default();
        let charge_strength = if self.charge_strength.is_finite() {
            self.charge_strength
        } else {
            diagnostics.warn("config chargeStrength is not finite; using default");
            d.charge_strength
        };
        let iterations = if self.iterations > MAX_ITERATIONS {
            diagnostics.warn(&format!("config iterations = {} clamped to {}", self.iterations, MAX_ITERATIONS));
            MAX_ITERATIONS
        } else {
            self.iterations
        };
        Self {
            width: positive_or_default(self.width, d.width, "width", diagnostics),
            height: positive_or_default(self.height, d.height, "height", diagnostics),
            charge_strength,
            link_distance: positive_or_default(self.link_distance, d.link_distance, "linkDistance", diagnostics),
            link_strength: clamped_or_default(self.link_strength, d.link_strength, 0.0..=1.0, "linkStrength", diagnostics),
            center_strength: clamped_or_default(
                self.center_strength,
                d.center_strength,
                0.0..=1.0,
                "centerStrength",
                diagnostics,
            ),
            collision_radius: clamped_or_default(
                self.collision_radius,
                d.collision_radius,
                0.0..=f64::MAX,
                "collisionRadius",
                diagnostics,
            ),
            center_collision_radius: clamped_or_default(
                self.center_collision_radius,
                d.center_collision_radius,
                0.0..=f64::MAX,
                "centerCollisionRadius",
                diagnostics,
            ),
            iterations,
            node_width: positive_or_default(self.node_width, d.node_width, "nodeWidth", diagnostics),
            node_height: positive_or_default(self.node_height, d.node_height, "nodeHeight", diagnostics),
            grid: self.grid.sanitized(diagnostics),
        }
    }
}

/// Tiny nonzero offset to separate coincident points.
fn jiggle(rng: &mut StdRng) -> f64 {
    (rng.random::<f64>() - 0.5) * 1e-6
}

#[derive(Debug, Clone)]
struct Particle {
    x: f64,
    y: f64,
    vx: f64,
    vy: f64,
    pinned: Option<Point>,
    radius: f64,
}

#[derive(Debug, Clone, Copy)]
struct Link {
    source: usize,
    target: usize,
    /// Share of the correction taken by the target; the lower-degree end moves more.
    bias: f64,
    strength: f64,
}

struct Simulation<'a> {
    cfg: &'a ForceConfig,
    particles: Vec<Particle>,
    links: Vec<Link>,
    target: Point,
    alpha: f64,
    alpha_decay: f64,
    rng: StdRng,
}

impl<'a> Simulation<'a> {
    fn new(graph: &ValidatedGraph, cfg: &'a ForceConfig) -> Self {
        let target = match graph.center {
            Some(_) => Point::ORIGIN,
            None => Point::new(cfg.width / 2.0, cfg.height / 2.0),
        };

        let golden_angle = std::f64::consts::PI * (3.0 - 5f64.sqrt());
        let particles = (0..graph.len())
            .map(|i| {
                let is_center = graph.center == Some(i);
                let spiral = target.polar_offset(i as f64 * golden_angle, INITIAL_RADIUS * (0.5 + i as f64).sqrt());
                let start = if is_center { Point::ORIGIN } else { spiral };
                let configured = if is_center { cfg.center_collision_radius } else { cfg.collision_radius };
                let size = graph.sizes[i];
                let half_diagonal = (size.width * size.width + size.height * size.height).sqrt() / 2.0;
                Particle {
                    x: start.x,
                    y: start.y,
                    vx: 0.0,
                    vy: 0.0,
                    pinned: is_center.then_some(Point::ORIGIN),
                    radius: configured.max(half_diagonal),
                }
            })
            .collect();

        let adjacency = Adjacency::from_links(graph.len(), &graph.links);
        let links = graph
            .links
            .iter()
            .filter(|(s, t)| s != t)
            .map(|&(source, target)| {
                let ds = adjacency.degree(source) as f64;
                let dt = adjacency.degree(target) as f64;
                // Parallel edges share one spring's stiffness
                let parallel = adjacency.edge_count(source, target).max(1) as f64;
                Link {
                    source,
                    target,
                    bias: ds / (ds + dt),
                    strength: cfg.link_strength / parallel,
                }
            })
            .collect();

        Self {
            cfg,
            particles,
            links,
            target,
            alpha: 1.0,
            alpha_decay: 1.0 - ALPHA_MIN.powf(1.0 / COOLING_TICKS),
            rng: StdRng::seed_from_u64(JITTER_SEED),
        }
    }

    fn run(&mut self, ticks: usize) {
        for _ in 0..ticks {
            self.tick();
        }
    }

    fn tick(&mut self) {
        self.alpha -= self.alpha * self.alpha_decay;

        self.apply_links();
        self.apply_charge();
        self.apply_centering();
        self.apply_collision();

        for p in &mut self.particles {
            match p.pinned {
                Some(fixed) => {
                    p.x = fixed.x;
                    p.y = fixed.y;
                    p.vx = 0.0;
                    p.vy = 0.0;
                }
                None => {
                    p.vx *= 1.0 - VELOCITY_DECAY;
                    p.vy *= 1.0 - VELOCITY_DECAY;
                    p.x += p.vx;
                    p.y += p.vy;
                }
            }
        }
    }

    fn apply_links(&mut self) {
        for link in &self.links {
            let (s, t) = (&self.particles[link.source], &self.particles[link.target]);
            let mut dx = t.x + t.vx - s.x - s.vx;
            let mut dy = t.y + t.vy - s.y - s.vy;
            if dx == 0.0 {
                dx = jiggle(&mut self.rng);
            }
            if dy == 0.0 {
                dy = jiggle(&mut self.rng);
            }
            let dist = (dx * dx + dy * dy).sqrt();
            let k = (dist - self.cfg.link_distance) / dist * link.strength * self.alpha;
            let (fx, fy) = (dx * k, dy * k);

            let t = &mut self.particles[link.target];
            t.vx -= fx * link.bias;
            t.vy -= fy * link.bias;
            let s = &mut self.particles[link.source];
            s.vx += fx * (1.0 - link.bias);
            s.vy += fy * (1.0 - link.bias);
        }
    }

    fn apply_charge(&mut self) {
        let strength = self.cfg.charge_strength * self.alpha;
        if strength == 0.0 {
            return;
        }
        let n = self.particles.len();
        for i in 0..n {
            let (mut ax, mut ay) = (0.0, 0.0);
            for j in 0..n {
                if i == j {
                    continue;
                }
                let mut dx = self.particles[j].x - self.particles[i].x;
                let mut dy = self.particles[j].y - self.particles[i].y;
                if dx == 0.0 {
                    dx = jiggle(&mut self.rng);
                }
                if dy == 0.0 {
                    dy = jiggle(&mut self.rng);
                }
                let mut l = dx * dx + dy * dy;
                // Soften very close pairs
                if l < 1.0 {
                    l = l.sqrt();
                }
                ax += dx * strength / l;
                ay += dy * strength / l;
            }
            self.particles[i].vx += ax;
            self.particles[i].vy += ay;
        }
    }

    fn apply_centering(&mut self) {
        let k = self.cfg.center_strength * self.alpha;
        if k == 0.0 {
            return;
        }
        for p in &mut self.particles {
            p.vx += (self.target.x - p.x) * k;
            p.vy += (self.target.y - p.y) * k;
        }
    }

    fn apply_collision(&mut self) {
        let max_radius = self.particles.iter().map(|p| p.radius).fold(0.0, f64::max);
        if max_radius <= 0.0 {
            return;
        }

        let mut grid = SpatialGrid::new(max_radius * 2.0);
        for (i, p) in self.particles.iter().enumerate() {
            grid.insert(i, Point::new(p.x + p.vx, p.y + p.vy));
        }

        for i in 0..self.particles.len() {
            let ri = self.particles[i].radius;
            let pi = Point::new(
                self.particles[i].x + self.particles[i].vx,
                self.particles[i].y + self.particles[i].vy,
            );
            for j in grid.nearby(pi) {
                if j <= i {
                    continue;
                }
                let rj = self.particles[j].radius;
                let r = ri + rj;
                let mut dx = pi.x - self.particles[j].x - self.particles[j].vx;
                let mut dy = pi.y - self.particles[j].y - self.particles[j].vy;
                let mut l = dx * dx + dy * dy;
                if l >= r * r {
                    continue;
                }
                if dx == 0.0 {
                    dx = jiggle(&mut self.rng);
                    l += dx * dx;
                }
                if dy == 0.0 {
                    dy = jiggle(&mut self.rng);
                    l += dy * dy;
                }
                let l = l.sqrt();
                let k = (r - l) / l;
                let (fx, fy) = (dx * k, dy * k);
                // Larger circle moves less
                let share = rj * rj / (ri * ri + rj * rj);

                let a = &mut self.particles[i];
                a.vx += fx * share;
                a.vy += fy * share;
                let b = &mut self.particles[j];
                b.vx -= fx * (1.0 - share);
                b.vy -= fy * (1.0 - share);
            }
        }
    }

    /// Push apart circles that still overlap. Pinned particles stay put;
    /// otherwise both sides move half the overlap. Returns the rounds used.
    fn separate(&mut self) -> usize {
        let max_radius = self.particles.iter().map(|p| p.radius).fold(0.0, f64::max);
        if max_radius <= 0.0 {
            return 0;
        }

        for round in 1..=MAX_SEPARATION_ROUNDS {
            let mut grid = SpatialGrid::new(max_radius * 2.0);
            for (i, p) in self.particles.iter().enumerate() {
                grid.insert(i, Point::new(p.x, p.y));
            }

            let mut moved = false;
            for i in 0..self.particles.len() {
                let at = Point::new(self.particles[i].x, self.particles[i].y);
                for j in grid.nearby(at) {
                    if j <= i {
                        continue;
                    }
                    let (a, b) = (&self.particles[i], &self.particles[j]);
                    let (i_moves, j_moves) = match (a.pinned.is_some(), b.pinned.is_some()) {
                        (true, true) => continue,
                        (true, false) => (0.0, 1.0),
                        (false, true) => (1.0, 0.0),
                        (false, false) => (0.5, 0.5),
                    };
                    let r = (a.radius + b.radius) * (1.0 + SEPARATION_SLACK);
                    let mut dx = b.x - a.x;
                    let mut dy = b.y - a.y;
                    if dx * dx + dy * dy >= r * r {
                        continue;
                    }
                    if dx == 0.0 && dy == 0.0 {
                        dx = jiggle(&mut self.rng);
                        dy = jiggle(&mut self.rng);
                    }
                    let l = (dx * dx + dy * dy).sqrt();
                    let push = r - l;
                    let (ux, uy) = (dx / l, dy / l);

                    let a = &mut self.particles[i];
                    a.x -= ux * push * i_moves;
                    a.y -= uy * push * i_moves;
                    let b = &mut self.particles[j];
                    b.x += ux * push * j_moves;
                    b.y += uy * push * j_moves;
                    moved = true;
                }
            }
            if !moved {
                return round;
            }
        }
        MAX_SEPARATION_ROUNDS
    }

    fn positions(&self) -> Vec<Point> {
        self.particles.iter().map(|p| Point::new(p.x, p.y)).collect()
    }
}

pub struct ForceLayout {
    cfg: ForceConfig,
}

impl ForceLayout {
    pub fn new(cfg: ForceConfig) -> Self {
        Self { cfg }
    }
}

impl LayoutStrategy for ForceLayout {
    fn name(&self) -> &'static str {
        "forceDirected"
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
        let mut sim = Simulation::new(graph, &self.cfg);
        sim.run(self.cfg.iterations);
        let rounds = sim.separate();
        diagnostics.debug(&format!(
            "forceDirected: {} nodes, {} links, {} ticks, final alpha {:.5}, {} separation round(s)",
            graph.len(),
            sim.links.len(),
            self.cfg.iterations,
            sim.alpha,
            rounds
        ));

        let positions = sim.positions();
        if let Some(i) = positions.iter().position(|p| !p.is_finite()) {
            return Err(LayoutError::NonFinitePosition { node_id: graph.nodes[i].id.clone() });
        }
        Ok(Placement::Positioned(positions))
    }
}

/// Force-directed layout with the center node pinned at the origin.
pub fn force_layout(
    nodes: &[Node],
    edges: &[Edge],
    cfg: &ForceConfig,
    diagnostics: &dyn Diagnostics,
) -> LayoutResult {
    let strategy = ForceLayout::new(cfg.sanitized(diagnostics));
    run_strategy(&strategy, nodes, edges, diagnostics)
}

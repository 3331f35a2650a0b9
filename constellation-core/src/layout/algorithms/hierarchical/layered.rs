// Layered (Sugiyama-style) graph drawing.
//
// A small mutable builder: add sized nodes and directed edges, then call
// `layout` once. The pipeline:
// - Cycle removal: DFS from each node in index order, back edges reversed
//   (petgraph's `depth_first_search` reports them)
// - Ranking: longest path along a petgraph `toposort`, then sources pulled
//   down to sit one rank above their nearest child
// - Normalization: edges spanning several ranks get zero-size virtual nodes
// - Ordering: barycenter sweeps (down, up, down...) keeping the ordering
//   with the fewest crossings seen
// - Coordinates: ranks stacked by their tallest node plus `rank_sep`; within
//   a rank nodes move toward the average of their neighbors in the adjacent
//   rank without breaking the minimum separation
//
// Everything is computed in (cross, rank) axes; `Direction` only decides
// how those map onto x and y at the end. Output is translated so the
// bounding box of the real nodes starts at (0, 0).

use std::collections::{HashMap, HashSet};

use petgraph::algo::toposort;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::{depth_first_search, DfsEvent};
use petgraph::Direction::Incoming;

use crate::error::LayoutError;
use crate::graph::{Point, Rect, Size};
use super::Direction;

/// Alignment rounds; each is one downward and one upward pass.
const ALIGN_ROUNDS: usize = 4;

/// Final placement of one node.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct LayeredNode {
    pub center: Point,
    pub bounds: Rect,
}

pub struct LayeredGraph {
    direction: Direction,
    node_sep: f64,
    rank_sep: f64,
    sweeps: usize,
    sizes: Vec<Size>,
    edges: Vec<(usize, usize)>,
}

/// Node in the normalized graph; real nodes keep their builder index.
struct Slot {
    rank: usize,
    /// Half extent along the cross axis; zero for virtual nodes.
    half: f64,
    /// Extent along the rank axis; zero for virtual nodes.
    depth: f64,
    is_virtual: bool,
    up: Vec<usize>,
    down: Vec<usize>,
}

impl LayeredGraph {
    pub fn new(direction: Direction, node_sep: f64, rank_sep: f64, sweeps: usize) -> Self {
        Self {
            direction,
            node_sep,
            rank_sep,
            sweeps,
            sizes: Vec::new(),
            edges: Vec::new(),
        }
    }

    pub fn add_node(&mut self, size: Size) -> usize {
        self.sizes.push(size);
        self.sizes.len() - 1
    }

    pub fn add_edge(&mut self, source: usize, target: usize) {
        self.edges.push((source, target));
    }

    pub fn layout(&self) -> Result<Vec<LayeredNode>, LayoutError> {
        self.check()?;
        let n = self.sizes.len();
        if n == 0 {
            return Ok(Vec::new());
        }

        let (dag, reversed) = self.acyclic_edges();
        let ranks = rank_nodes(n, &dag, reversed)?;
        let slots = self.normalize(&ranks, &dag);
        let layers = self.order(&slots);
        let (cross, rank_pos) = self.coordinates(&slots, &layers);

        let min_cross = (0..n)
            .map(|i| cross[i] - slots[i].half)
            .fold(f64::INFINITY, f64::min);

        Ok((0..n)
            .map(|i| {
                let c = cross[i] - min_cross;
                let r = rank_pos[slots[i].rank];
                let center = match self.direction {
                    Direction::TopBottom => Point::new(c, r),
                    Direction::LeftRight => Point::new(r, c),
                };
                LayeredNode {
                    center,
                    bounds: Rect::centered(center, self.sizes[i]),
                }
            })
            .collect())
    }

    fn check(&self) -> Result<(), LayoutError> {
        if let Some(index) = self.sizes.iter().position(|s| !s.is_valid()) {
            let size = self.sizes[index];
            return Err(LayoutError::InvalidNodeSize {
                index,
                width: size.width,
                height: size.height,
            });
        }
        let n = self.sizes.len();
        if let Some(&(source_index, target_index)) = self.edges.iter().find(|(s, t)| *s >= n || *t >= n) {
            return Err(LayoutError::UnknownEndpoint { source_index, target_index });
        }
        Ok(())
    }

    /// Cross-axis and rank-axis extents of a node.
    fn extents(&self, size: Size) -> (f64, f64) {
        match self.direction {
            Direction::TopBottom => (size.width, size.height),
            Direction::LeftRight => (size.height, size.width),
        }
    }

    /// Edges with back edges reversed, self loops and duplicates removed.
    /// Also returns how many edges were reversed.
    fn acyclic_edges(&self) -> (Vec<(usize, usize)>, usize) {
        let n = self.sizes.len();
        // Neighbors come back newest first; add in reverse so the walk
        // follows insertion order.
        let forward: Vec<(usize, usize)> = self.edges.iter().rev().copied().filter(|(s, t)| s != t).collect();
        let graph = digraph(n, &forward);

        let mut back = HashSet::new();
        depth_first_search(&graph, graph.node_indices(), |event| {
            if let DfsEvent::BackEdge(u, v) = event {
                back.insert((u.index(), v.index()));
            }
        });

        let mut seen = HashSet::new();
        let mut dag = Vec::with_capacity(self.edges.len());
        let mut reversed = 0;
        for &(s, t) in &self.edges {
            if s == t {
                continue;
            }
            let edge = if back.contains(&(s, t)) {
                reversed += 1;
                (t, s)
            } else {
                (s, t)
            };
            if seen.insert(edge) {
                dag.push(edge);
            }
        }
        (dag, reversed)
    }

    /// Build the normalized graph: one slot per real node, then virtual
    /// chains for every edge spanning more than one rank.
    fn normalize(&self, ranks: &[usize], dag: &[(usize, usize)]) -> Vec<Slot> {
        let mut slots: Vec<Slot> = self
            .sizes
            .iter()
            .zip(ranks)
            .map(|(&size, &rank)| {
                let (cross, depth) = self.extents(size);
                Slot {
                    rank,
                    half: cross / 2.0,
                    depth,
                    is_virtual: false,
                    up: Vec::new(),
                    down: Vec::new(),
                }
            })
            .collect();

        for &(s, t) in dag {
            let mut prev = s;
            for rank in ranks[s] + 1..ranks[t] {
                slots.push(Slot {
                    rank,
                    half: 0.0,
                    depth: 0.0,
                    is_virtual: true,
                    up: Vec::new(),
                    down: Vec::new(),
                });
                let v = slots.len() - 1;
                slots[prev].down.push(v);
                slots[v].up.push(prev);
                prev = v;
            }
            slots[prev].down.push(t);
            slots[t].up.push(prev);
        }
        slots
    }

    /// Order each rank to reduce edge crossings.
    fn order(&self, slots: &[Slot]) -> Vec<Vec<usize>> {
        let rank_count = slots.iter().map(|s| s.rank + 1).max().unwrap_or(0);
        let mut layers: Vec<Vec<usize>> = vec![Vec::new(); rank_count];
        for (i, slot) in slots.iter().enumerate() {
            layers[slot.rank].push(i);
        }

        let mut best = layers.clone();
        let mut best_crossings = total_crossings(slots, &layers);
        for sweep in 0..self.sweeps {
            if best_crossings == 0 {
                break;
            }
            if sweep % 2 == 0 {
                for r in 1..rank_count {
                    let (above, rest) = layers.split_at_mut(r);
                    reorder(&mut rest[0], &above[r - 1], slots, |s| &s.up);
                }
            } else {
                for r in (0..rank_count.saturating_sub(1)).rev() {
                    let (head, below) = layers.split_at_mut(r + 1);
                    reorder(&mut head[r], &below[0], slots, |s| &s.down);
                }
            }
            let crossings = total_crossings(slots, &layers);
            if crossings < best_crossings {
                best_crossings = crossings;
                best = layers.clone();
            }
        }
        best
    }

    /// Cross-axis center per slot and rank-axis center per rank.
    fn coordinates(&self, slots: &[Slot], layers: &[Vec<usize>]) -> (Vec<f64>, Vec<f64>) {
        let mut rank_pos = Vec::with_capacity(layers.len());
        let mut prev_half = 0.0;
        for (r, layer) in layers.iter().enumerate() {
            let depth = layer.iter().map(|&i| slots[i].depth).fold(0.0, f64::max);
            let pos = match r {
                0 => depth / 2.0,
                _ => rank_pos[r - 1] + prev_half + self.rank_sep + depth / 2.0,
            };
            rank_pos.push(pos);
            prev_half = depth / 2.0;
        }

        // Initial packing, left to right
        let mut cross = vec![0.0; slots.len()];
        for layer in layers {
            let mut cursor: Option<(usize, f64)> = None;
            for &i in layer {
                let x = match cursor {
                    None => slots[i].half,
                    Some((prev, at)) => at + self.gap(slots, prev, i),
                };
                cross[i] = x;
                cursor = Some((i, x));
            }
        }

        for _ in 0..ALIGN_ROUNDS {
            for layer in layers.iter().skip(1) {
                self.align(layer, slots, &mut cross, |s| &s.up);
            }
            for layer in layers.iter().rev().skip(1) {
                self.align(layer, slots, &mut cross, |s| &s.down);
            }
        }
        (cross, rank_pos)
    }

    /// Minimum center distance between neighbours `a` and `b` in one rank.
    fn gap(&self, slots: &[Slot], a: usize, b: usize) -> f64 {
        let sep = if slots[a].is_virtual || slots[b].is_virtual {
            self.node_sep / 2.0
        } else {
            self.node_sep
        };
        slots[a].half + sep + slots[b].half
    }

    /// Move a rank toward its neighbors' average while keeping separation.
    ///
    /// Two feasible placements are built, one pushing right from the left
    /// end and one pushing left from the right end, and averaged. The
    /// average of two placements that respect every gap respects them too.
    fn align(
        &self,
        layer: &[usize],
        slots: &[Slot],
        cross: &mut [f64],
        neighbors: impl Fn(&Slot) -> &Vec<usize>,
    ) {
        if layer.is_empty() {
            return;
        }
        let desired: Vec<f64> = layer
            .iter()
            .map(|&i| {
                let adjacent = neighbors(&slots[i]);
                if adjacent.is_empty() {
                    cross[i]
                } else {
                    adjacent.iter().map(|&j| cross[j]).sum::<f64>() / adjacent.len() as f64
                }
            })
            .collect();

        let last = layer.len() - 1;
        let mut from_left = desired.clone();
        for k in 1..=last {
            let min = from_left[k - 1] + self.gap(slots, layer[k - 1], layer[k]);
            from_left[k] = from_left[k].max(min);
        }
        let mut from_right = desired;
        for k in (0..last).rev() {
            let max = from_right[k + 1] - self.gap(slots, layer[k], layer[k + 1]);
            from_right[k] = from_right[k].min(max);
        }
        for (k, &i) in layer.iter().enumerate() {
            cross[i] = (from_left[k] + from_right[k]) / 2.0;
        }
    }
}

/// Longest-path ranking over an acyclic edge list, ranks starting at 0.
fn rank_nodes(n: usize, dag: &[(usize, usize)], reversed: usize) -> Result<Vec<usize>, LayoutError> {
    let graph = digraph(n, dag);
    let topo = toposort(&graph, None).map_err(|_| LayoutError::CyclicRanking { reversed })?;

    let mut rank = vec![0usize; n];
    for &u in &topo {
        for v in graph.neighbors(u) {
            rank[v.index()] = rank[v.index()].max(rank[u.index()] + 1);
        }
    }

    // Sources sit directly above their closest child
    for &u in topo.iter().rev() {
        if graph.neighbors_directed(u, Incoming).next().is_none() {
            if let Some(min_child) = graph.neighbors(u).map(|v| rank[v.index()]).min() {
                rank[u.index()] = min_child.saturating_sub(1);
            }
        }
    }

    let min = rank.iter().copied().min().unwrap_or(0);
    Ok(rank.into_iter().map(|r| r - min).collect())
}

/// Directed graph over `n` unit nodes; node `i` has index `i`.
fn digraph(n: usize, edges: &[(usize, usize)]) -> DiGraph<(), ()> {
    let mut graph = DiGraph::with_capacity(n, edges.len());
    for _ in 0..n {
        graph.add_node(());
    }
    for &(s, t) in edges {
        graph.add_edge(NodeIndex::new(s), NodeIndex::new(t), ());
    }
    graph
}

/// Stable sort of `layer` by the mean position of each node's neighbors in
/// `fixed`. Nodes with no neighbors there keep their current position.
fn reorder(
    layer: &mut [usize],
    fixed: &[usize],
    slots: &[Slot],
    neighbors: impl Fn(&Slot) -> &Vec<usize>,
) {
    let mut pos_in_fixed = HashMap::with_capacity(fixed.len());
    for (k, &i) in fixed.iter().enumerate() {
        pos_in_fixed.insert(i, k as f64);
    }
    let mut keyed: Vec<(f64, usize)> = layer
        .iter()
        .enumerate()
        .map(|(k, &i)| {
            let positions: Vec<f64> = neighbors(&slots[i])
                .iter()
                .filter_map(|j| pos_in_fixed.get(j).copied())
                .collect();
            let key = if positions.is_empty() {
                k as f64
            } else {
                positions.iter().sum::<f64>() / positions.len() as f64
            };
            (key, i)
        })
        .collect();
    keyed.sort_by(|a, b| a.0.total_cmp(&b.0));
    for (slot, (_, i)) in layer.iter_mut().zip(keyed) {
        *slot = i;
    }
}

fn total_crossings(slots: &[Slot], layers: &[Vec<usize>]) -> usize {
    layers
        .windows(2)
        .map(|pair| crossings_between(slots, &pair[0], &pair[1]))
        .sum()
}

/// Crossings among the edges joining two adjacent ranks.
fn crossings_between(slots: &[Slot], upper: &[usize], lower: &[usize]) -> usize {
    let mut lower_pos = vec![usize::MAX; slots.len()];
    for (k, &i) in lower.iter().enumerate() {
        lower_pos[i] = k;
    }
    let segments: Vec<(usize, usize)> = upper
        .iter()
        .enumerate()
        .flat_map(|(a, &i)| slots[i].down.iter().map(move |&j| (a, j)))
        .filter_map(|(a, j)| (lower_pos[j] != usize::MAX).then(|| (a, lower_pos[j])))
        .collect();

    let mut count = 0;
    for (k, &(a1, b1)) in segments.iter().enumerate() {
        for &(a2, b2) in &segments[k + 1..] {
            if (a1 < a2 && b1 > b2) || (a1 > a2 && b1 < b2) {
                count += 1;
            }
        }
    }
    count
}

#[cfg(test)]
mod tests {
    use super::*;

    fn builder(direction: Direction, count: usize) -> LayeredGraph {
        let mut g = LayeredGraph::new(direction, 50.0, 100.0, 8);
        for _ in 0..count {
            g.add_node(Size::new(180.0, 60.0));
        }
        g
    }

    #[test]
    fn test_chain_top_to_bottom() {
        let mut g = builder(Direction::TopBottom, 3);
        g.add_edge(0, 1);
        g.add_edge(1, 2);
        let placed = g.layout().unwrap();

        assert!(placed[0].center.y < placed[1].center.y);
        assert!(placed[1].center.y < placed[2].center.y);
        // 60 tall ranks, 100 apart
        assert_eq!(placed[0].center.y, 30.0);
        assert_eq!(placed[1].center.y, 190.0);
        assert_eq!(placed[0].bounds.x, 0.0);
        assert_eq!(placed[0].bounds.y, 0.0);
    }

    #[test]
    fn test_chain_left_to_right() {
        let mut g = builder(Direction::LeftRight, 3);
        g.add_edge(0, 1);
        g.add_edge(1, 2);
        let placed = g.layout().unwrap();

        assert!(placed[0].center.x < placed[1].center.x);
        assert!(placed[1].center.x < placed[2].center.x);
        assert_eq!(placed[0].center.y, placed[2].center.y);
        // Rank axis is the width in this direction
        assert_eq!(placed[1].center.x - placed[0].center.x, 280.0);
    }

    #[test]
    fn test_siblings_keep_separation() {
        let mut g = builder(Direction::TopBottom, 4);
        g.add_edge(0, 1);
        g.add_edge(0, 2);
        g.add_edge(0, 3);
        let placed = g.layout().unwrap();

        let mut xs: Vec<f64> = placed[1..].iter().map(|p| p.center.x).collect();
        xs.sort_by(f64::total_cmp);
        for pair in xs.windows(2) {
            assert!(pair[1] - pair[0] >= 230.0 - 1e-9, "{:?}", xs);
        }
        assert!(placed[1..].iter().all(|p| p.center.y == placed[1].center.y));
        // Parent sits over the middle child
        assert!((placed[0].center.x - xs[1]).abs() < 1e-9);
    }

    #[test]
    fn test_cycle_is_broken() {
        let mut g = builder(Direction::TopBottom, 3);
        g.add_edge(0, 1);
        g.add_edge(1, 2);
        g.add_edge(2, 0);
        let placed = g.layout().unwrap();

        let mut ys: Vec<f64> = placed.iter().map(|p| p.center.y).collect();
        ys.dedup();
        assert_eq!(ys.len(), 3);
        assert!(ys.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_back_edges_reversed_once() {
        let mut g = builder(Direction::TopBottom, 3);
        g.add_edge(0, 1);
        g.add_edge(1, 2);
        g.add_edge(2, 0);
        g.add_edge(2, 0);
        g.add_edge(1, 1);
        let (dag, reversed) = g.acyclic_edges();

        assert_eq!(reversed, 2);
        assert_eq!(dag, vec![(0, 1), (1, 2), (0, 2)]);
        assert_eq!(rank_nodes(3, &dag, reversed), Ok(vec![0, 1, 2]));
        assert_eq!(
            rank_nodes(2, &[(0, 1), (1, 0)], 0),
            Err(LayoutError::CyclicRanking { reversed: 0 })
        );
    }

    #[test]
    fn test_barycenter_removes_crossing() {
        // 0 -> 3 and 1 -> 2 cross in index order
        let mut g = builder(Direction::TopBottom, 4);
        g.add_edge(0, 3);
        g.add_edge(1, 2);
        let placed = g.layout().unwrap();

        let top = placed[0].center.x < placed[1].center.x;
        let bottom = placed[3].center.x < placed[2].center.x;
        assert_eq!(top, bottom);
    }

    #[test]
    fn test_long_edge_spans_ranks() {
        // 0 -> 1 -> 2 and a shortcut 0 -> 2
        let mut g = builder(Direction::TopBottom, 3);
        g.add_edge(0, 1);
        g.add_edge(1, 2);
        g.add_edge(0, 2);
        let placed = g.layout().unwrap();
        assert!(placed[0].center.y < placed[1].center.y);
        assert!(placed[1].center.y < placed[2].center.y);
    }

    #[test]
    fn test_real_nodes_never_overlap() {
        let mut g = LayeredGraph::new(Direction::TopBottom, 20.0, 40.0, 8);
        for i in 0..9 {
            g.add_node(Size::new(60.0 + 10.0 * i as f64, 30.0 + 5.0 * (i % 3) as f64));
        }
        for &(s, t) in &[(0, 4), (1, 4), (2, 5), (3, 5), (4, 6), (5, 6), (0, 7), (6, 8), (8, 1)] {
            g.add_edge(s, t);
        }
        let placed = g.layout().unwrap();
        for i in 0..placed.len() {
            for j in i + 1..placed.len() {
                assert!(!placed[i].bounds.overlaps(&placed[j].bounds), "{} and {} overlap", i, j);
            }
        }
    }

    #[test]
    fn test_sources_pulled_toward_children() {
        // 0 -> 1 -> 2, and 3 -> 2 should land on rank 1, not rank 0
        let mut g = builder(Direction::TopBottom, 4);
        g.add_edge(0, 1);
        g.add_edge(1, 2);
        g.add_edge(3, 2);
        let placed = g.layout().unwrap();
        assert_eq!(placed[3].center.y, placed[1].center.y);
    }

    #[test]
    fn test_invalid_input() {
        let mut g = builder(Direction::TopBottom, 2);
        g.add_edge(0, 5);
        assert_eq!(
            g.layout(),
            Err(LayoutError::UnknownEndpoint { source_index: 0, target_index: 5 })
        );

        let mut g = builder(Direction::TopBottom, 1);
        g.add_node(Size::new(0.0, 10.0));
        assert!(matches!(g.layout(), Err(LayoutError::InvalidNodeSize { index: 1, .. })));
    }

    #[test]
    fn test_empty_builder() {
        assert_eq!(builder(Direction::TopBottom, 0).layout(), Ok(Vec::new()));
    }
}

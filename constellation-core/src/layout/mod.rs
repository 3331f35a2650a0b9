// Layout engine entry points.
//
// Every strategy has the same shape: (nodes, edges, config) -> positioned
// graph. The shared glue here owns the contract around the algorithms:
// - Validation first; algorithms only see a `ValidatedGraph`
// - Empty input short-circuits to an empty result
// - Any `LayoutError` is reported and replaced by grid placement
// - Output node count and order always match the input
//
// Submodules:
// - adjacency: node degrees and parallel edge counts
// - spatial_grid: hashed cell lookup for collision candidates
// - algorithms: grid, radial, force and hierarchical orbit strategies

use serde::{Deserialize, Serialize};

use crate::diagnostics::Diagnostics;
use crate::error::LayoutError;
use crate::graph::{validate, Edge, Node, Point, Rect, SizeDefaults, ValidatedGraph, Warning};

mod adjacency;
mod spatial_grid;
pub mod algorithms;

pub use algorithms::{
    force_layout, grid_positions, hierarchical_layout, radial_layout, Direction, ForceConfig,
    GridConfig, HierarchicalConfig, RadialConfig,
};

/// Which strategy to run, with its configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum LayoutKind {
    Radial(RadialConfig),
    ForceDirected(ForceConfig),
    HierarchicalOrbit(HierarchicalConfig),
}

impl Default for LayoutKind {
    fn default() -> Self {
        LayoutKind::Radial(RadialConfig::default())
    }
}

impl LayoutKind {
    pub fn name(&self) -> &'static str {
        match self {
            LayoutKind::Radial(_) => "radial",
            LayoutKind::ForceDirected(_) => "forceDirected",
            LayoutKind::HierarchicalOrbit(_) => "hierarchicalOrbit",
        }
    }
}

/// Positioned graph returned by every strategy.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LayoutResult {
    /// Input nodes, in input order, with `position` and `visual_size` set.
    pub nodes: Vec<Node>,
    /// Input edges minus those with a missing endpoint.
    pub edges: Vec<Edge>,
    pub warnings: Vec<Warning>,
    /// True when the grid placement was used instead of the strategy.
    pub fallback: bool,
}

impl LayoutResult {
    /// Bounding box over all nodes at their visual size.
    pub fn bounds(&self) -> Option<Rect> {
        self.nodes
            .iter()
            .filter_map(|n| Some(Rect::centered(n.position?, n.visual_size?)))
            .reduce(|acc, r| acc.union(&r))
    }

    pub fn position_of(&self, id: &str) -> Option<Point> {
        self.nodes.iter().find(|n| n.id == id)?.position
    }
}

/// Outcome of a strategy's placement step.
pub enum Placement {
    /// One point per validated node, in node order.
    Positioned(Vec<Point>),
    /// The strategy cannot work with this input; use grid placement.
    NeedsGrid,
}

/// A layout algorithm over a validated graph.
pub trait LayoutStrategy {
    fn name(&self) -> &'static str;

    fn size_defaults(&self) -> SizeDefaults;

    fn grid(&self) -> &GridConfig;

    fn place(
        &self,
        graph: &ValidatedGraph,
        warnings: &mut Vec<Warning>,
        diagnostics: &dyn Diagnostics,
    ) -> Result<Placement, LayoutError>;
}

/// Lay out a graph with the strategy selected by `kind`.
pub fn layout(
    nodes: &[Node],
    edges: &[Edge],
    kind: &LayoutKind,
    diagnostics: &dyn Diagnostics,
) -> LayoutResult {
    match kind {
        LayoutKind::Radial(cfg) => radial_layout(nodes, edges, cfg, diagnostics),
        LayoutKind::ForceDirected(cfg) => force_layout(nodes, edges, cfg, diagnostics),
        LayoutKind::HierarchicalOrbit(cfg) => hierarchical_layout(nodes, edges, cfg, diagnostics),
    }
}

/// Shared driver: validate, place, fall back, assemble.
pub(crate) fn run_strategy<S: LayoutStrategy>(
    strategy: &S,
    nodes: &[Node],
    edges: &[Edge],
    diagnostics: &dyn Diagnostics,
) -> LayoutResult {
    if nodes.is_empty() {
        return LayoutResult::default();
    }

    let graph = validate(nodes, edges, strategy.size_defaults());
    let mut warnings = graph.warnings.clone();
    for warning in &warnings {
        diagnostics.warn(&warning.to_string());
    }

    let placed = strategy
        .place(&graph, &mut warnings, diagnostics)
        .and_then(|placement| match placement {
            Placement::Positioned(points) => check_positions(&graph, points).map(Some),
            Placement::NeedsGrid => Ok(None),
        });

    let (positions, fallback) = match placed {
        Ok(Some(points)) => (points, false),
        Ok(None) => {
            diagnostics.debug(&format!(
                "{} layout needs a center node; using grid placement",
                strategy.name()
            ));
            (grid_positions(graph.len(), strategy.grid()), true)
        }
        Err(e) => {
            diagnostics.error(&format!("{} layout failed: {}; using grid placement", strategy.name(), e));
            (grid_positions(graph.len(), strategy.grid()), true)
        }
    };

    let nodes = graph
        .nodes
        .into_iter()
        .zip(positions)
        .map(|(mut node, position)| {
            node.position = Some(position);
            node
        })
        .collect();

    LayoutResult {
        nodes,
        edges: graph.edges,
        warnings,
        fallback,
    }
}

fn check_positions(graph: &ValidatedGraph, points: Vec<Point>) -> Result<Vec<Point>, LayoutError> {
    if points.len() < graph.len() {
        return Err(LayoutError::MissingPosition {
            node_id: graph.nodes[points.len()].id.clone(),
        });
    }
    if let Some(i) = points.iter().position(|p| !p.is_finite()) {
        return Err(LayoutError::NonFinitePosition {
            node_id: graph.nodes[i].id.clone(),
        });
    }
    Ok(points)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::Silent;
    use crate::graph::{NodeType, Size};
    use proptest::prelude::*;
    use std::cell::RefCell;

    /// Records every message so tests can assert on diagnostics.
    #[derive(Default)]
    struct Recorder {
        warnings: RefCell<Vec<String>>,
        errors: RefCell<Vec<String>>,
    }

    impl Diagnostics for Recorder {
        fn debug(&self, _message: &str) {}
        fn warn(&self, message: &str) {
            self.warnings.borrow_mut().push(message.to_string());
        }
        fn error(&self, message: &str) {
            self.errors.borrow_mut().push(message.to_string());
        }
    }

    /// Strategy that always fails, to exercise the fallback path.
    struct Broken {
        grid: GridConfig,
    }

    impl LayoutStrategy for Broken {
        fn name(&self) -> &'static str {
            "broken"
        }
        fn size_defaults(&self) -> SizeDefaults {
            SizeDefaults::uniform(Size::new(100.0, 50.0))
        }
        fn grid(&self) -> &GridConfig {
            &self.grid
        }
        fn place(
            &self,
            graph: &ValidatedGraph,
            _warnings: &mut Vec<Warning>,
            _diagnostics: &dyn Diagnostics,
        ) -> Result<Placement, LayoutError> {
            Ok(Placement::Positioned(vec![Point::new(f64::NAN, 0.0); graph.len()]))
        }
    }

    fn all_kinds() -> Vec<LayoutKind> {
        vec![
            LayoutKind::Radial(RadialConfig::default()),
            LayoutKind::ForceDirected(ForceConfig::default()),
            LayoutKind::HierarchicalOrbit(HierarchicalConfig::default()),
        ]
    }

    fn sample_graph() -> (Vec<Node>, Vec<Edge>) {
        let nodes = vec![
            Node::new("alex", NodeType::Character).center(),
            Node::new("safe", NodeType::Puzzle),
            Node::new("key", NodeType::Element).with_parent("safe"),
            Node::new("letter", NodeType::Element).with_parent("safe"),
            Node::new("party", NodeType::Timeline),
            Node::new("mystery", NodeType::Unknown),
        ];
        let edges = vec![
            Edge::new("e1", "alex", "safe"),
            Edge::new("e2", "safe", "key"),
            Edge::new("e3", "safe", "letter"),
            Edge::new("e4", "party", "alex"),
            Edge::new("e5", "alex", "ghost"),
        ];
        (nodes, edges)
    }

    #[test]
    fn test_empty_graph_all_strategies() {
        for kind in all_kinds() {
            let result = layout(&[], &[Edge::new("e", "a", "b")], &kind, &Silent);
            assert!(result.nodes.is_empty(), "{}", kind.name());
            assert!(result.edges.is_empty(), "{}", kind.name());
            assert!(!result.fallback);
        }
    }

    #[test]
    fn test_dangling_edge_all_strategies() {
        let nodes = vec![Node::new("A", NodeType::Character), Node::new("B", NodeType::Puzzle)];
        let edges = vec![Edge::new("e1", "A", "ghost")];

        for kind in all_kinds() {
            let recorder = Recorder::default();
            let result = layout(&nodes, &edges, &kind, &recorder);
            assert!(result.edges.is_empty(), "{}", kind.name());
            assert_eq!(result.nodes.len(), 2);
            assert!(result.nodes.iter().all(|n| n.position.is_some_and(|p| p.is_finite())));
            assert_eq!(recorder.warnings.borrow().len(), 1);
        }
    }

    #[test]
    fn test_output_preserves_order_and_payload() {
        let (mut nodes, edges) = sample_graph();
        nodes[1].label = Some("The Safe".into());
        nodes[1].data = serde_json::json!({"difficulty": 3});

        for kind in all_kinds() {
            let result = layout(&nodes, &edges, &kind, &Silent);
            let ids: Vec<&str> = result.nodes.iter().map(|n| n.id.as_str()).collect();
            assert_eq!(ids, ["alex", "safe", "key", "letter", "party", "mystery"]);
            assert_eq!(result.nodes[1].label.as_deref(), Some("The Safe"));
            assert_eq!(result.nodes[1].data["difficulty"], 3);
            assert_eq!(result.edges.len(), 4);
            // Caller's nodes are untouched
            assert!(nodes.iter().all(|n| n.position.is_none()));
        }
    }

    #[test]
    fn test_center_at_origin_for_anchoring_strategies() {
        let (nodes, edges) = sample_graph();
        for kind in [
            LayoutKind::Radial(RadialConfig::default()),
            LayoutKind::ForceDirected(ForceConfig::default()),
        ] {
            let result = layout(&nodes, &edges, &kind, &Silent);
            assert_eq!(result.position_of("alex"), Some(Point::ORIGIN), "{}", kind.name());
            assert!(!result.fallback);
        }
    }

    #[test]
    fn test_failed_strategy_falls_back_to_grid() {
        let (nodes, edges) = sample_graph();
        let recorder = Recorder::default();
        let strategy = Broken { grid: GridConfig::default() };

        let result = run_strategy(&strategy, &nodes, &edges, &recorder);

        assert!(result.fallback);
        assert_eq!(recorder.errors.borrow().len(), 1);
        assert!(recorder.errors.borrow()[0].contains("non-finite"));
        let expected = grid_positions(nodes.len(), &GridConfig::default());
        let got: Vec<Point> = result.nodes.iter().filter_map(|n| n.position).collect();
        assert_eq!(got, expected);
    }

    #[test]
    fn test_bounds_cover_all_nodes() {
        let (nodes, edges) = sample_graph();
        let result = layout(&nodes, &edges, &LayoutKind::default(), &Silent);
        let bounds = result.bounds().unwrap();
        for node in &result.nodes {
            let r = Rect::centered(node.position.unwrap(), node.visual_size.unwrap());
            assert!(r.x >= bounds.x - 1e-9 && r.right() <= bounds.right() + 1e-9);
            assert!(r.y >= bounds.y - 1e-9 && r.bottom() <= bounds.bottom() + 1e-9);
        }
        assert!(LayoutResult::default().bounds().is_none());
    }

    #[test]
    fn test_layout_kind_json_tagging() {
        let kind: LayoutKind = serde_json::from_value(serde_json::json!({
            "kind": "hierarchicalOrbit",
            "direction": "LR",
            "rankSeparation": 140.0
        }))
        .unwrap();
        match kind {
            LayoutKind::HierarchicalOrbit(cfg) => {
                assert_eq!(cfg.direction, Direction::LeftRight);
                assert_eq!(cfg.rank_separation, 140.0);
                assert_eq!(cfg.node_separation, HierarchicalConfig::default().node_separation);
            }
            other => panic!("unexpected kind {:?}", other),
        }
    }

    fn arb_graph() -> impl Strategy<Value = (Vec<Node>, Vec<Edge>)> {
        let kinds = prop_oneof![
            Just(NodeType::Character),
            Just(NodeType::Puzzle),
            Just(NodeType::Element),
            Just(NodeType::Timeline),
            Just(NodeType::Unknown),
        ];
        (1usize..24)
            .prop_flat_map(move |n| {
                (
                    proptest::collection::vec((kinds.clone(), proptest::option::of(0..n)), n),
                    proptest::collection::vec((0..n + 2, 0..n + 2), 0..n * 2),
                    proptest::option::of(0..n),
                )
            })
            .prop_map(|(specs, links, center)| {
                let nodes = specs
                    .into_iter()
                    .enumerate()
                    .map(|(i, (kind, parent))| {
                        let mut node = Node::new(format!("n{}", i), kind);
                        node.is_center = center == Some(i);
                        node.parent_id = parent.map(|p| format!("n{}", p));
                        node
                    })
                    .collect();
                // Indices past the node count produce dangling edges
                let edges = links
                    .into_iter()
                    .enumerate()
                    .map(|(i, (s, t))| Edge::new(format!("e{}", i), format!("n{}", s), format!("n{}", t)))
                    .collect();
                (nodes, edges)
            })
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(48))]

        #[test]
        fn prop_every_node_positioned((nodes, edges) in arb_graph()) {
            for kind in all_kinds() {
                let result = layout(&nodes, &edges, &kind, &Silent);
                prop_assert_eq!(result.nodes.len(), nodes.len());
                for node in &result.nodes {
                    let p = node.position.expect("position set");
                    prop_assert!(p.is_finite());
                    prop_assert!(node.visual_size.is_some_and(|s| s.is_valid()));
                }
                for edge in &result.edges {
                    prop_assert!(nodes.iter().any(|n| n.id == edge.source));
                    prop_assert!(nodes.iter().any(|n| n.id == edge.target));
                }
            }
        }

        #[test]
        fn prop_radial_and_hierarchical_deterministic((nodes, edges) in arb_graph()) {
            for kind in [
                LayoutKind::Radial(RadialConfig::default()),
                LayoutKind::HierarchicalOrbit(HierarchicalConfig::default()),
            ] {
                let first = layout(&nodes, &edges, &kind, &Silent);
                let second = layout(&nodes, &edges, &kind, &Silent);
                prop_assert_eq!(first, second);
            }
        }
    }
}

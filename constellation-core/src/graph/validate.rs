// Validation at the graph model boundary.
//
// Every anomaly here is recoverable: it becomes a `Warning` and the graph is
// repaired so layout code can index nodes and read sizes without checks.

use std::collections::HashMap;
use std::fmt;

use serde::Serialize;

use super::{Edge, Node, Size};

/// Input anomaly that was repaired during validation.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Warning {
    /// Edge dropped because one of its endpoints is not in the node list.
    #[serde(rename_all = "camelCase")]
    DanglingEdge { edge_id: String, missing: String },
    /// Second or later node carrying an id already seen.
    #[serde(rename_all = "camelCase")]
    DuplicateNodeId { node_id: String },
    /// More than one node flagged as center; only the first one counts.
    #[serde(rename_all = "camelCase")]
    MultipleCenters { node_id: String },
    #[serde(rename_all = "camelCase")]
    UnknownParent { node_id: String, parent_id: String },
    #[serde(rename_all = "camelCase")]
    SelfParent { node_id: String },
    /// Visual size was missing a usable value and was replaced by the default.
    #[serde(rename_all = "camelCase")]
    InvalidSize { node_id: String },
    /// Satellite chain loops back on itself; orbit placement skipped.
    #[serde(rename_all = "camelCase")]
    ParentCycle { node_id: String },
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Warning::DanglingEdge { edge_id, missing } => {
                write!(f, "edge '{}' references missing node '{}'; dropped", edge_id, missing)
            }
            Warning::DuplicateNodeId { node_id } => {
                write!(f, "duplicate node id '{}'; first occurrence wins", node_id)
            }
            Warning::MultipleCenters { node_id } => {
                write!(f, "node '{}' is an extra center; ignored as center", node_id)
            }
            Warning::UnknownParent { node_id, parent_id } => {
                write!(f, "node '{}' names missing parent '{}'", node_id, parent_id)
            }
            Warning::SelfParent { node_id } => write!(f, "node '{}' is its own parent", node_id),
            Warning::InvalidSize { node_id } => {
                write!(f, "node '{}' has an unusable visual size; default applied", node_id)
            }
            Warning::ParentCycle { node_id } => {
                write!(f, "node '{}' is part of a parent cycle; not orbited", node_id)
            }
        }
    }
}

/// Sizes used when a node does not carry its own `visualSize`.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct SizeDefaults {
    pub node: Size,
    pub center: Size,
}

impl SizeDefaults {
    pub fn uniform(size: Size) -> Self {
        Self { node: size, center: size }
    }
}

/// Nodes and edges after repair. Edge endpoints and parents are indices
/// into `nodes`; every node has a valid `visual_size`.
#[derive(Debug, Clone)]
pub struct ValidatedGraph {
    pub nodes: Vec<Node>,
    pub sizes: Vec<Size>,
    /// Surviving edges, in input order.
    pub edges: Vec<Edge>,
    /// `(source, target)` node indices, parallel to `edges`.
    pub links: Vec<(usize, usize)>,
    /// Resolved `parent_id` per node.
    pub parents: Vec<Option<usize>>,
    pub center: Option<usize>,
    pub warnings: Vec<Warning>,
}

impl ValidatedGraph {
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

/// Validate and repair an input graph.
pub fn validate(nodes: &[Node], edges: &[Edge], defaults: SizeDefaults) -> ValidatedGraph {
    let mut warnings = Vec::new();

    // First occurrence of an id owns it
    let mut index: HashMap<String, usize> = HashMap::with_capacity(nodes.len());
    for (i, node) in nodes.iter().enumerate() {
        if index.contains_key(&node.id) {
            warnings.push(Warning::DuplicateNodeId { node_id: node.id.clone() });
        } else {
            index.insert(node.id.clone(), i);
        }
    }

    let mut center = None;
    for (i, node) in nodes.iter().enumerate().filter(|(_, n)| n.is_center) {
        if center.is_none() {
            center = Some(i);
        } else {
            warnings.push(Warning::MultipleCenters { node_id: node.id.clone() });
        }
    }

    let mut sizes = Vec::with_capacity(nodes.len());
    let mut repaired = Vec::with_capacity(nodes.len());
    for (i, node) in nodes.iter().enumerate() {
        let fallback = if center == Some(i) { defaults.center } else { defaults.node };
        let size = match node.visual_size {
            Some(size) if size.is_valid() => size,
            Some(_) => {
                warnings.push(Warning::InvalidSize { node_id: node.id.clone() });
                fallback
            }
            None => fallback,
        };
        sizes.push(size);

        let mut node = node.clone();
        node.visual_size = Some(size);
        node.position = None;
        repaired.push(node);
    }

    let parents = nodes
        .iter()
        .enumerate()
        .map(|(i, node)| {
            let parent_id = node.parent_id.as_ref()?;
            match index.get(parent_id) {
                Some(&p) if p == i => {
                    warnings.push(Warning::SelfParent { node_id: node.id.clone() });
                    None
                }
                Some(&p) => Some(p),
                None => {
                    warnings.push(Warning::UnknownParent {
                        node_id: node.id.clone(),
                        parent_id: parent_id.clone(),
                    });
                    None
                }
            }
        })
        .collect();

    let mut kept = Vec::with_capacity(edges.len());
    let mut links = Vec::with_capacity(edges.len());
    for edge in edges {
        match (index.get(&edge.source), index.get(&edge.target)) {
            (Some(&s), Some(&t)) => {
                kept.push(edge.clone());
                links.push((s, t));
            }
            (None, _) => warnings.push(Warning::DanglingEdge {
                edge_id: edge.id.clone(),
                missing: edge.source.clone(),
            }),
            (_, None) => warnings.push(Warning::DanglingEdge {
                edge_id: edge.id.clone(),
                missing: edge.target.clone(),
            }),
        }
    }

    ValidatedGraph {
        nodes: repaired,
        sizes,
        edges: kept,
        links,
        parents,
        center,
        warnings,
    }
}

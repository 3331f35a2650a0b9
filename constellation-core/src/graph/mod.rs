//! Graph model shared by every layout strategy.
//!
//! Nodes and edges arrive from the data-mapping layer as plain serde values.
//! `validate` turns them into a `ValidatedGraph` whose fields the algorithms
//! can trust without further checks.

use serde::{Deserialize, Serialize};

mod validate;

pub use validate::{validate, SizeDefaults, ValidatedGraph, Warning};

/// The kind of entity a node stands for.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum NodeType {
    #[serde(alias = "Character")]
    Character,
    #[serde(alias = "Puzzle")]
    Puzzle,
    #[serde(alias = "Element")]
    Element,
    #[serde(alias = "Timeline")]
    Timeline,
    #[default]
    #[serde(other)]
    Unknown,
}

impl NodeType {
    /// All variants, in radial placement priority order.
    pub const PRIORITY: [NodeType; 5] = [
        NodeType::Character,
        NodeType::Puzzle,
        NodeType::Element,
        NodeType::Timeline,
        NodeType::Unknown,
    ];

    /// Types that may own satellites in the hierarchical orbit layout.
    pub fn is_hub(self) -> bool {
        matches!(self, NodeType::Puzzle | NodeType::Element)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            NodeType::Character => "character",
            NodeType::Puzzle => "puzzle",
            NodeType::Element => "element",
            NodeType::Timeline => "timeline",
            NodeType::Unknown => "unknown",
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const ORIGIN: Point = Point { x: 0.0, y: 0.0 };

    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Point at `radius` along `angle` (radians) from `self`.
    pub fn polar_offset(&self, angle: f64, radius: f64) -> Point {
        Point {
            x: self.x + radius * angle.cos(),
            y: self.y + radius * angle.sin(),
        }
    }

    pub fn distance(&self, other: &Point) -> f64 {
        ((self.x - other.x).powi(2) + (self.y - other.y).powi(2)).sqrt()
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    pub fn square(side: f64) -> Self {
        Self { width: side, height: side }
    }

    /// Finite and strictly positive in both dimensions.
    pub fn is_valid(&self) -> bool {
        self.width.is_finite() && self.height.is_finite() && self.width > 0.0 && self.height > 0.0
    }
}

/// Axis-aligned rectangle given by its top-left corner.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn centered(center: Point, size: Size) -> Self {
        Self {
            x: center.x - size.width / 2.0,
            y: center.y - size.height / 2.0,
            width: size.width,
            height: size.height,
        }
    }

    pub fn right(&self) -> f64 { self.x + self.width }
    pub fn bottom(&self) -> f64 { self.y + self.height }

    pub fn overlaps(&self, other: &Rect) -> bool {
        self.x < other.right()
            && self.right() > other.x
            && self.y < other.bottom()
            && self.bottom() > other.y
    }

    pub fn union(&self, other: &Rect) -> Rect {
        let x0 = self.x.min(other.x);
        let y0 = self.y.min(other.y);
        let x1 = self.right().max(other.right());
        let y1 = self.bottom().max(other.bottom());
        Rect { x: x0, y: y0, width: x1 - x0, height: y1 - y0 }
    }
}

/// A typed entity in a relationship diagram.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Node {
    pub id: String,
    #[serde(rename = "type", default)]
    pub kind: NodeType,
    #[serde(default)]
    pub is_center: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "serde_json::Value::is_null")]
    pub data: serde_json::Value,
    /// Center of the node, filled in by layout.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<Point>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visual_size: Option<Size>,
}

impl Node {
    pub fn new(id: impl Into<String>, kind: NodeType) -> Self {
        Self {
            id: id.into(),
            kind,
            is_center: false,
            parent_id: None,
            label: None,
            data: serde_json::Value::Null,
            position: None,
            visual_size: None,
        }
    }

    pub fn center(mut self) -> Self {
        self.is_center = true;
        self
    }

    pub fn with_parent(mut self, parent_id: impl Into<String>) -> Self {
        self.parent_id = Some(parent_id.into());
        self
    }

    pub fn with_size(mut self, width: f64, height: f64) -> Self {
        self.visual_size = Some(Size::new(width, height));
        self
    }
}

/// A typed relationship between two nodes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    pub id: String,
    pub source: String,
    pub target: String,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

impl Edge {
    pub fn new(id: impl Into<String>, source: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            source: source.into(),
            target: target.into(),
            kind: None,
            label: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_unknown_type_deserializes_to_unknown() {
        let node: Node = serde_json::from_value(json!({"id": "n1", "type": "sound-cue"})).unwrap();
        assert_eq!(node.kind, NodeType::Unknown);
        assert!(!node.is_center);
        assert!(node.position.is_none());
    }

    #[test]
    fn test_node_camel_case_fields() {
        let node: Node = serde_json::from_value(json!({
            "id": "p1",
            "type": "Puzzle",
            "isCenter": true,
            "parentId": "e1",
            "visualSize": {"width": 200.0, "height": 80.0}
        }))
        .unwrap();
        assert_eq!(node.kind, NodeType::Puzzle);
        assert!(node.is_center);
        assert_eq!(node.parent_id.as_deref(), Some("e1"));
        assert_eq!(node.visual_size, Some(Size::new(200.0, 80.0)));

        let out = serde_json::to_value(&node).unwrap();
        assert_eq!(out["type"], "puzzle");
        assert_eq!(out["isCenter"], true);
    }

    #[test]
    fn test_rect_overlap_and_union() {
        let a = Rect::centered(Point::ORIGIN, Size::new(100.0, 50.0));
        let b = Rect::centered(Point::new(80.0, 0.0), Size::new(100.0, 50.0));
        let c = Rect::centered(Point::new(300.0, 0.0), Size::new(100.0, 50.0));
        assert!(a.overlaps(&b));
        assert!(!a.overlaps(&c));
        let u = a.union(&c);
        assert_eq!(u.x, -50.0);
        assert_eq!(u.right(), 350.0);
    }
}

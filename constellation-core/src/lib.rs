//! Automatic layout for relationship diagrams.
//!
//! Given typed nodes and edges, compute a position for every node with one
//! of three strategies: radial sectors around a center node, a
//! force-directed simulation, or a layered drawing with satellites orbiting
//! their hub. Any strategy that cannot handle its input falls back to a grid.

pub mod diagnostics;
pub mod error;
pub mod graph;
pub mod layout;
pub mod output;
mod wasm;

pub use diagnostics::{Diagnostics, LogDiagnostics, Silent};
pub use error::LayoutError;
pub use graph::{Edge, Node, NodeType, Point, Rect, Size, Warning};
pub use layout::{layout, LayoutKind, LayoutResult};
pub use output::{layout_from_json, LayoutRequest, LayoutResponse};
pub use wasm::{compute_layout, init_logging};

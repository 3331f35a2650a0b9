//! JSON envelope for the browser boundary.
//!
//! The frontend sends one request object and gets one response object back.
//! A request that cannot be parsed still yields a response, with `error`
//! set and no nodes.

use serde::{Deserialize, Serialize};

use crate::diagnostics::Diagnostics;
use crate::graph::{Edge, Node, Warning};
use crate::layout::{layout, LayoutKind, LayoutResult};

/// What the frontend sends.
#[derive(Debug, Clone, Deserialize)]
pub struct LayoutRequest {
    pub nodes: Vec<Node>,
    #[serde(default)]
    pub edges: Vec<Edge>,
    /// Strategy and its config; radial with defaults when absent.
    #[serde(default)]
    pub layout: LayoutKind,
}

/// What the frontend receives.
#[derive(Debug, Clone, Default, Serialize)]
pub struct LayoutResponse {
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<Warning>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub fallback: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl From<LayoutResult> for LayoutResponse {
    fn from(result: LayoutResult) -> Self {
        Self {
            nodes: result.nodes,
            edges: result.edges,
            warnings: result.warnings,
            fallback: result.fallback,
            error: None,
        }
    }
}

impl LayoutResponse {
    pub fn from_error(message: impl Into<String>) -> Self {
        Self {
            error: Some(message.into()),
            ..Self::default()
        }
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|e| {
            serde_json::json!({ "nodes": [], "edges": [], "error": e.to_string() }).to_string()
        })
    }
}

/// Parse a request, run the selected strategy, and build the response.
pub fn layout_from_json(input: &str, diagnostics: &dyn Diagnostics) -> LayoutResponse {
    let request: LayoutRequest = match serde_json::from_str(input) {
        Ok(request) => request,
        Err(e) => {
            diagnostics.error(&format!("invalid layout request: {}", e));
            return LayoutResponse::from_error(format!("invalid layout request: {}", e));
        }
    };
    diagnostics.debug(&format!(
        "{} layout for {} node(s), {} edge(s)",
        request.layout.name(),
        request.nodes.len(),
        request.edges.len()
    ));
    layout(&request.nodes, &request.edges, &request.layout, diagnostics).into()
}

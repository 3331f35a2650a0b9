//! Simple grid placement.
//!
//! Places nodes left-to-right, top-to-bottom in fixed-size cells. It ignores
//! edges entirely. Every strategy falls back to it when it cannot produce a
//! layout, so it must never fail.

use serde::{Deserialize, Serialize};

use crate::diagnostics::Diagnostics;
use crate::graph::Point;
use super::positive_or_default;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GridConfig {
    /// Horizontal distance between node centers.
    pub cell_width: f64,
    /// Vertical distance between node centers.
    pub cell_height: f64,
    /// Nodes per row. `None` picks a roughly square grid.
    pub columns: Option<usize>,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            cell_width: 250.0,
            cell_height: 120.0,
            columns: None,
        }
    }
}

impl GridConfig {
    pub fn sanitized(&self, diagnostics: &dyn Diagnostics) -> Self {
        let defaults = Self::default();
        Self {
            cell_width: positive_or_default(self.cell_width, defaults.cell_width, "grid.cellWidth", diagnostics),
            cell_height: positive_or_default(self.cell_height, defaults.cell_height, "grid.cellHeight", diagnostics),
            columns: self.columns.filter(|&c| c > 0),
        }
    }

    fn columns_for(&self, count: usize) -> usize {
        self.columns
            .filter(|&c| c > 0)
            .unwrap_or_else(|| (count as f64).sqrt().ceil() as usize)
            .max(1)
    }
}

/// Row-major positions for `count` nodes, starting at the origin.
pub fn grid_positions(count: usize, cfg: &GridConfig) -> Vec<Point> {
    let columns = cfg.columns_for(count);
    (0..count)
        .map(|i| {
            let col = i % columns;
            let row = i / columns;
            Point::new(col as f64 * cfg.cell_width, row as f64 * cfg.cell_height)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::Silent;

    #[test]
    fn test_five_nodes_square_grid() {
        let positions = grid_positions(5, &GridConfig::default());

        // ceil(sqrt(5)) = 3 columns
        assert_eq!(positions[0], Point::new(0.0, 0.0));
        assert_eq!(positions[2], Point::new(500.0, 0.0));
        assert_eq!(positions[3], Point::new(0.0, 120.0));
        assert_eq!(positions[4], Point::new(250.0, 120.0));
    }

    #[test]
    fn test_fixed_columns() {
        let cfg = GridConfig { columns: Some(2), ..GridConfig::default() };
        let positions = grid_positions(3, &cfg);
        assert_eq!(positions[2], Point::new(0.0, 120.0));
    }

    #[test]
    fn test_empty() {
        assert!(grid_positions(0, &GridConfig::default()).is_empty());
    }

    #[test]
    fn test_sanitized_restores_defaults() {
        let cfg = GridConfig { cell_width: -5.0, cell_height: f64::INFINITY, columns: Some(0) };
        let clean = cfg.sanitized(&Silent);
        assert_eq!(clean, GridConfig::default());
    }
}

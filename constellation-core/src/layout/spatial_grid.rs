// Spatial hash grid for collision candidate lookup.
//
// Instead of checking every pair of particles, points are bucketed into
// square cells. Two circles whose radii sum to at most the cell size can
// only touch if their cells are adjacent.

use std::collections::HashMap;

use crate::graph::Point;

/// A spatial hash grid over indexed points.
#[derive(Debug, Clone)]
pub struct SpatialGrid {
    /// Size of each cell in the grid.
    cell_size: f64,
    /// Map from cell coordinates to the indices inserted into that cell.
    cells: HashMap<(i64, i64), Vec<usize>>,
}

impl SpatialGrid {
    /// Create a new spatial grid with the given cell size.
    /// Cell size should be at least the largest interaction distance.
    pub fn new(cell_size: f64) -> Self {
        let cell_size = if cell_size.is_finite() && cell_size > 0.0 { cell_size } else { 1.0 };
        Self {
            cell_size,
            cells: HashMap::new(),
        }
    }

    fn cell_of(&self, p: Point) -> (i64, i64) {
        (
            (p.x / self.cell_size).floor() as i64,
            (p.y / self.cell_size).floor() as i64,
        )
    }

    pub fn insert(&mut self, index: usize, p: Point) {
        let cell = self.cell_of(p);
        self.cells.entry(cell).or_default().push(index);
    }

    /// Indices in the cell containing `p` and its eight neighbours.
    /// May include false positives; caller does the exact distance check.
    pub fn nearby(&self, p: Point) -> Vec<usize> {
        let (cx, cy) = self.cell_of(p);
        let mut result = Vec::new();
        for dx in -1..=1 {
            for dy in -1..=1 {
                if let Some(indices) = self.cells.get(&(cx + dx, cy + dy)) {
                    result.extend_from_slice(indices);
                }
            }
        }
        result
    }
}

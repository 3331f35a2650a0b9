//! Layout algorithms for relationship diagrams.
//!
//! This module contains all available layout algorithms:
//! - `grid`: Row-major placement used as the fallback for every strategy
//! - `radial`: Type sectors around a center node
//! - `force`: Fixed-iteration spring-embedder simulation
//! - `hierarchical`: Layered drawing with satellites orbiting their hubs

mod force;
mod grid;
mod hierarchical;
mod radial;

pub use force::{force_layout, ForceConfig, ForceLayout};
pub use grid::{grid_positions, GridConfig};
pub use hierarchical::{hierarchical_layout, Direction, HierarchicalConfig, HierarchicalLayout};
pub use radial::{radial_layout, RadialConfig, RadialLayout};

use crate::diagnostics::Diagnostics;

/// Replace a non-finite or non-positive config value with its default.
pub(crate) fn positive_or_default(
    value: f64,
    default: f64,
    field: &str,
    diagnostics: &dyn Diagnostics,
) -> f64 {
    if value.is_finite() && value > 0.0 {
        value
    } else {
        diagnostics.warn(&format!("config {} = {} is unusable; using {}", field, value, default));
        default
    }
}

/// Replace a non-finite config value with its default and clamp to a range.
pub(crate) fn clamped_or_default(
    value: f64,
    default: f64,
    range: std::ops::RangeInclusive<f64>,
    field: &str,
    diagnostics: &dyn Diagnostics,
) -> f64 {
    if !value.is_finite() {
        diagnostics.warn(&format!("config {} = {} is unusable; using {}", field, value, default));
        return default;
    }
    let clamped = value.clamp(*range.start(), *range.end());
    if clamped != value {
        diagnostics.warn(&format!("config {} = {} clamped to {}", field, value, clamped));
    }
    clamped
}

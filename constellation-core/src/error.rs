use thiserror::Error;

/// Failure inside a layout algorithm.
///
/// These never reach the caller of `layout`: the strategy glue reports them
/// through `Diagnostics::error` and falls back to grid placement.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LayoutError {
    #[error("node '{node_id}' ended with a non-finite position")]
    NonFinitePosition { node_id: String },

    #[error("node '{node_id}' was not assigned a position")]
    MissingPosition { node_id: String },

    #[error("layered graph edge {source_index} -> {target_index} references an unknown node")]
    UnknownEndpoint { source_index: usize, target_index: usize },

    #[error("layered graph node {index} has unusable size {width}x{height}")]
    InvalidNodeSize { index: usize, width: f64, height: f64 },

    #[error("rank assignment did not terminate; graph still cyclic after {reversed} reversals")]
    CyclicRanking { reversed: usize },
}

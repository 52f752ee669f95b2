use crate::NodeIdx;

pub type Result<T> = std::result::Result<T, GfdmError>;

/// Errors raised while setting up a discretization.
///
/// The numerical core itself degrades gracefully instead of failing:
/// degenerate stencils and non-convergence are reported as inspectable states.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum GfdmError {
  #[error("coordinate matrices have different shapes: x is {x:?}, y is {y:?}")]
  CoordShapeMismatch {
    x: (usize, usize),
    y: (usize, usize),
  },
  #[error("structured mesh needs at least 3x3 nodes, got {nx}x{ny}")]
  MeshTooSmall { nx: usize, ny: usize },
  #[error("expected {expected} boundary flags, got {actual}")]
  BoundaryFlagsMismatch { expected: usize, actual: usize },
  #[error("neighbor list covers {actual} nodes, but the domain has {expected}")]
  NeighborCountMismatch { expected: usize, actual: usize },
  #[error("node {node} references neighbor {neighbor}, but there are only {nnodes} nodes")]
  NeighborOutOfRange {
    node: NodeIdx,
    neighbor: NodeIdx,
    nnodes: usize,
  },
  #[error("node {node} has invalid neighbor index {value}")]
  InvalidNeighborIndex { node: NodeIdx, value: isize },
  #[error("node {node} lists itself as a neighbor")]
  SelfNeighbor { node: NodeIdx },
  #[error("node {node} has {count} neighbors, more than the maximum of {max}")]
  TooManyNeighbors {
    node: NodeIdx,
    count: usize,
    max: usize,
  },
  #[error("triangle {triangle} references node {node}, but there are only {nnodes} nodes")]
  TriangleOutOfRange {
    triangle: usize,
    node: NodeIdx,
    nnodes: usize,
  },
  #[error("sparse factorization failed: {0}")]
  Factorization(String),
}

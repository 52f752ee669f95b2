use super::{coordinates::NodeCoords, structured::StructuredMesh};
use crate::{
  error::{GfdmError, Result},
  util, NodeIdx,
};

/// Unstructured set of nodes, each flagged as boundary or interior.
#[derive(Debug, Clone)]
pub struct PointCloud {
  coords: NodeCoords,
  boundary: Vec<bool>,
}

impl PointCloud {
  pub fn new(coords: NodeCoords, boundary: Vec<bool>) -> Result<Self> {
    if boundary.len() != coords.nnodes() {
      return Err(GfdmError::BoundaryFlagsMismatch {
        expected: coords.nnodes(),
        actual: boundary.len(),
      });
    }
    Ok(Self { coords, boundary })
  }

  /// Flags the nodes listed in `boundary_nodes` as boundary, all others as interior.
  pub fn with_boundary_nodes(coords: NodeCoords, boundary_nodes: &[NodeIdx]) -> Self {
    let boundary = util::indicies_to_flags(boundary_nodes, coords.nnodes());
    Self { coords, boundary }
  }

  /// Forgets the grid connectivity, keeps nodes and boundary flags.
  pub fn from_structured(mesh: &StructuredMesh) -> Self {
    Self {
      coords: mesh.node_coords(),
      boundary: mesh.boundary_flags(),
    }
  }

  pub fn nnodes(&self) -> usize {
    self.coords.nnodes()
  }
  pub fn coords(&self) -> &NodeCoords {
    &self.coords
  }
  pub fn boundary_flags(&self) -> &[bool] {
    &self.boundary
  }
  pub fn is_boundary(&self, inode: NodeIdx) -> bool {
    self.boundary[inode]
  }
  pub fn boundary_nodes(&self) -> Vec<NodeIdx> {
    util::flags_to_indicies(&self.boundary)
  }

  pub fn into_parts(self) -> (NodeCoords, Vec<bool>) {
    (self.coords, self.boundary)
  }
}

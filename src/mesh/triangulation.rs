use super::{cloud::PointCloud, coordinates::NodeCoords, structured::StructuredMesh};
use crate::{
  error::{GfdmError, Result},
  NodeIdx,
};

pub type Triangle = [NodeIdx; 3];

/// Point cloud together with triangles connecting its nodes.
///
/// The triangles only serve to find the neighbors of a node,
/// orientation is irrelevant.
#[derive(Debug, Clone)]
pub struct Triangulation {
  cloud: PointCloud,
  triangles: Vec<Triangle>,
}

impl Triangulation {
  pub fn new(cloud: PointCloud, triangles: Vec<Triangle>) -> Result<Self> {
    let nnodes = cloud.nnodes();
    for (itri, tri) in triangles.iter().enumerate() {
      if let Some(&node) = tri.iter().find(|&&v| v >= nnodes) {
        return Err(GfdmError::TriangleOutOfRange {
          triangle: itri,
          node,
          nnodes,
        });
      }
    }
    Ok(Self { cloud, triangles })
  }

  /// Boundary flags are derived from the topology, see [`Self::topological_boundary_nodes`].
  pub fn from_topology(coords: NodeCoords, triangles: Vec<Triangle>) -> Result<Self> {
    let nnodes = coords.nnodes();
    let this = Self::new(PointCloud::new(coords, vec![false; nnodes])?, triangles)?;
    let boundary_nodes = this.topological_boundary_nodes();
    let (coords, _) = this.cloud.into_parts();
    Ok(Self {
      cloud: PointCloud::with_boundary_nodes(coords, &boundary_nodes),
      triangles: this.triangles,
    })
  }

  /// Splits every grid cell along its `(i, j)`-`(i+1, j+1)` diagonal.
  pub fn from_structured(mesh: &StructuredMesh) -> Self {
    let mut triangles = Vec::with_capacity(2 * (mesh.nx() - 1) * (mesh.ny() - 1));
    for j in 0..mesh.ny() - 1 {
      for i in 0..mesh.nx() - 1 {
        let v00 = mesh.node_idx(i, j);
        let v10 = mesh.node_idx(i + 1, j);
        let v01 = mesh.node_idx(i, j + 1);
        let v11 = mesh.node_idx(i + 1, j + 1);
        triangles.push([v00, v10, v11]);
        triangles.push([v00, v11, v01]);
      }
    }
    Self {
      cloud: PointCloud::from_structured(mesh),
      triangles,
    }
  }

  pub fn cloud(&self) -> &PointCloud {
    &self.cloud
  }
  pub fn coords(&self) -> &NodeCoords {
    self.cloud.coords()
  }
  pub fn nnodes(&self) -> usize {
    self.cloud.nnodes()
  }
  pub fn triangles(&self) -> &[Triangle] {
    &self.triangles
  }

  pub fn into_parts(self) -> (PointCloud, Vec<Triangle>) {
    (self.cloud, self.triangles)
  }
}

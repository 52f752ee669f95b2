//! The discretized domain: nodes, boundary flags and how neighbors are found.
//!
//! All three supported node layouts share the same stencil and solver code.
//! They only differ in which nodes make up the local neighborhood of a node
//! and in which order the nodes are relaxed.

use crate::{
  error::{GfdmError, Result},
  mesh::{NodeCoords, PointCloud, StructuredMesh, Triangulation},
  neighbors::{NeighborFinder, NeighborList, TriangleAdjacency},
  NodeIdx,
};

use std::fmt;

#[derive(Debug, Clone)]
pub enum Geometry {
  /// Logically rectangular mesh with the fixed 8-node ring as neighborhood.
  RegularGrid(StructuredMesh),
  Triangulation {
    triangulation: Triangulation,
    neighbors: NeighborList,
  },
  UnstructuredCloud {
    cloud: PointCloud,
    neighbors: NeighborList,
  },
}

impl Geometry {
  pub fn kind(&self) -> GeometryKind {
    match self {
      Self::RegularGrid(_) => GeometryKind::RegularGrid,
      Self::Triangulation { .. } => GeometryKind::Triangulation,
      Self::UnstructuredCloud { .. } => GeometryKind::UnstructuredCloud,
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GeometryKind {
  RegularGrid,
  Triangulation,
  UnstructuredCloud,
}
impl fmt::Display for GeometryKind {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let name = match self {
      Self::RegularGrid => "regular grid",
      Self::Triangulation => "triangulation",
      Self::UnstructuredCloud => "unstructured cloud",
    };
    f.write_str(name)
  }
}

/// A geometry with its node coordinates and boundary flags resolved.
#[derive(Debug, Clone)]
pub struct Domain {
  coords: NodeCoords,
  boundary: Vec<bool>,
  geometry: Geometry,
}

// constructors
impl Domain {
  pub fn regular_grid(mesh: StructuredMesh) -> Self {
    Self {
      coords: mesh.node_coords(),
      boundary: mesh.boundary_flags(),
      geometry: Geometry::RegularGrid(mesh),
    }
  }

  /// Neighbors are found through triangle adjacency.
  pub fn triangulation(triangulation: Triangulation, max_neighbors: usize) -> Self {
    let neighbors = TriangleAdjacency::new(triangulation.triangles())
      .find_neighbors(triangulation.coords(), max_neighbors);
    Self::triangulation_with_neighbors(triangulation, neighbors)
      .expect("triangle adjacency covers every node")
  }

  pub fn triangulation_with_neighbors(
    triangulation: Triangulation,
    neighbors: NeighborList,
  ) -> Result<Self> {
    check_neighbor_count(triangulation.nnodes(), &neighbors)?;
    Ok(Self {
      coords: triangulation.coords().clone(),
      boundary: triangulation.cloud().boundary_flags().to_vec(),
      geometry: Geometry::Triangulation {
        triangulation,
        neighbors,
      },
    })
  }

  pub fn cloud(cloud: PointCloud, finder: &impl NeighborFinder, max_neighbors: usize) -> Self {
    let neighbors = finder.find_neighbors(cloud.coords(), max_neighbors);
    Self::cloud_with_neighbors(cloud, neighbors).expect("finder covers every node")
  }

  pub fn cloud_with_neighbors(cloud: PointCloud, neighbors: NeighborList) -> Result<Self> {
    check_neighbor_count(cloud.nnodes(), &neighbors)?;
    Ok(Self {
      coords: cloud.coords().clone(),
      boundary: cloud.boundary_flags().to_vec(),
      geometry: Geometry::UnstructuredCloud { cloud, neighbors },
    })
  }
}

fn check_neighbor_count(nnodes: usize, neighbors: &NeighborList) -> Result<()> {
  if neighbors.nnodes() != nnodes {
    return Err(GfdmError::NeighborCountMismatch {
      expected: nnodes,
      actual: neighbors.nnodes(),
    });
  }
  Ok(())
}

// getters
impl Domain {
  pub fn geometry(&self) -> &Geometry {
    &self.geometry
  }
  pub fn kind(&self) -> GeometryKind {
    self.geometry.kind()
  }
  pub fn coords(&self) -> &NodeCoords {
    &self.coords
  }
  pub fn nnodes(&self) -> usize {
    self.coords.nnodes()
  }
  pub fn boundary_flags(&self) -> &[bool] {
    &self.boundary
  }
  pub fn is_boundary(&self, inode: NodeIdx) -> bool {
    self.boundary[inode]
  }
  pub fn ninterior(&self) -> usize {
    self.boundary.iter().filter(|&&b| !b).count()
  }

  /// The neighbor lists of a triangulation or cloud, `None` for a regular grid.
  pub fn neighbors(&self) -> Option<&NeighborList> {
    match &self.geometry {
      Geometry::RegularGrid(_) => None,
      Geometry::Triangulation { neighbors, .. } | Geometry::UnstructuredCloud { neighbors, .. } => {
        Some(neighbors)
      }
    }
  }
}

impl Domain {
  /// The nodes the stencil of `inode` is built from, in stencil order.
  ///
  /// Boundary nodes of a regular grid have no neighborhood.
  pub fn local_neighbors(&self, inode: NodeIdx) -> Vec<NodeIdx> {
    match &self.geometry {
      Geometry::RegularGrid(mesh) => {
        let (i, j) = mesh.cart_idx(inode);
        if mesh.is_boundary(i, j) {
          Vec::new()
        } else {
          mesh.ring_neighbors(i, j).to_vec()
        }
      }
      Geometry::Triangulation { neighbors, .. } | Geometry::UnstructuredCloud { neighbors, .. } => {
        neighbors.neighbors(inode).to_vec()
      }
    }
  }

  /// Positions of the local neighbors relative to `inode`.
  pub fn local_offsets(&self, inode: NodeIdx) -> Vec<na::Vector2<f64>> {
    self
      .local_neighbors(inode)
      .into_iter()
      .map(|neighbor| self.coords.offset(inode, neighbor))
      .collect()
  }

  /// The order in which interior nodes are visited in a relaxation sweep.
  ///
  /// Row-major over `(i, j)` for a regular grid, node index order otherwise.
  pub fn sweep_order(&self) -> Vec<NodeIdx> {
    match &self.geometry {
      Geometry::RegularGrid(mesh) => mesh.interior_nodes().collect(),
      _ => (0..self.nnodes()).filter(|&i| !self.boundary[i]).collect(),
    }
  }

  /// Evaluates `f` at every node.
  pub fn eval_coord_fn<F>(&self, f: F) -> na::DVector<f64>
  where
    F: FnMut(f64, f64) -> f64,
  {
    self.coords.eval_coord_fn(f)
  }
}

#[cfg(test)]
mod test {
  use super::{Domain, GeometryKind};
  use crate::{
    error::GfdmError,
    mesh::{PointCloud, StructuredMesh, Triangulation},
    neighbors::{NearestNeighbors, NeighborList},
  };

  #[test]
  fn grid_neighborhoods() {
    let mesh = StructuredMesh::new_uniform([0.0, 0.0], [2.0, 1.0], 5, 3).unwrap();
    let domain = Domain::regular_grid(mesh.clone());
    assert_eq!(domain.kind(), GeometryKind::RegularGrid);
    assert!(domain.neighbors().is_none());
    assert!(domain.local_neighbors(0).is_empty());

    let center = mesh.node_idx(2, 1);
    let offsets = domain.local_offsets(center);
    assert_eq!(offsets.len(), 8);
    assert_eq!(offsets[0], na::Vector2::new(0.5, 0.0));
    assert_eq!(offsets[1], na::Vector2::new(0.5, 0.5));
    assert_eq!(offsets[5], na::Vector2::new(-0.5, -0.5));
    assert_eq!(domain.sweep_order().len(), 3);
  }

  #[test]
  fn cloud_sweep_order_skips_boundary() {
    let mesh = StructuredMesh::new_unit_square(4).unwrap();
    let domain = Domain::cloud(PointCloud::from_structured(&mesh), &NearestNeighbors, 8);
    assert_eq!(domain.kind(), GeometryKind::UnstructuredCloud);
    assert_eq!(domain.sweep_order(), vec![5, 6, 9, 10]);
    assert_eq!(domain.ninterior(), 4);
    assert_eq!(domain.neighbors().map(|n| n.nnodes()), Some(16));
  }

  #[test]
  fn neighbor_lists_must_cover_all_nodes() {
    let mesh = StructuredMesh::new_unit_square(3).unwrap();
    let tria = Triangulation::from_structured(&mesh);
    let neighbors = NeighborList::new(vec![vec![]; 4], 8).unwrap();
    assert_eq!(
      Domain::triangulation_with_neighbors(tria, neighbors).unwrap_err(),
      GfdmError::NeighborCountMismatch {
        expected: 9,
        actual: 4
      }
    );
  }
}

use super::coordinates::NodeCoords;
use crate::{
  error::{GfdmError, Result},
  NodeIdx,
};

/// Offsets of the 8 grid-adjacent nodes, in counter-clockwise order starting at `(i+1, j)`.
pub const RING_OFFSETS: [(isize, isize); 8] = [
  (1, 0),
  (1, 1),
  (0, 1),
  (-1, 1),
  (-1, 0),
  (-1, -1),
  (0, -1),
  (1, -1),
];

/// Logically rectangular mesh of `nx * ny` nodes.
///
/// Node `(i, j)` is at `(x[(i, j)], y[(i, j)])`. The coordinates don't need to
/// be equispaced, only the connectivity is that of a cartesian grid.
/// The global node index is `i + nx * j`, which is the column-major
/// storage order of the coordinate matrices.
#[derive(Debug, Clone)]
pub struct StructuredMesh {
  x: na::DMatrix<f64>,
  y: na::DMatrix<f64>,
}

// constructors
impl StructuredMesh {
  pub fn new(x: na::DMatrix<f64>, y: na::DMatrix<f64>) -> Result<Self> {
    if x.shape() != y.shape() {
      return Err(GfdmError::CoordShapeMismatch {
        x: x.shape(),
        y: y.shape(),
      });
    }
    let (nx, ny) = x.shape();
    if nx < 3 || ny < 3 {
      return Err(GfdmError::MeshTooSmall { nx, ny });
    }
    Ok(Self { x, y })
  }

  /// Equispaced mesh of the rectangle `[min, max]` with `nx * ny` nodes.
  pub fn new_uniform(min: [f64; 2], max: [f64; 2], nx: usize, ny: usize) -> Result<Self> {
    if nx < 3 || ny < 3 {
      return Err(GfdmError::MeshTooSmall { nx, ny });
    }
    let hx = (max[0] - min[0]) / (nx - 1) as f64;
    let hy = (max[1] - min[1]) / (ny - 1) as f64;
    let x = na::DMatrix::from_fn(nx, ny, |i, _| min[0] + i as f64 * hx);
    let y = na::DMatrix::from_fn(nx, ny, |_, j| min[1] + j as f64 * hy);
    Self::new(x, y)
  }

  pub fn new_unit_square(nnodes_axis: usize) -> Result<Self> {
    Self::new_uniform([0.0, 0.0], [1.0, 1.0], nnodes_axis, nnodes_axis)
  }
}

// getters
impl StructuredMesh {
  pub fn nx(&self) -> usize {
    self.x.nrows()
  }
  pub fn ny(&self) -> usize {
    self.x.ncols()
  }
  pub fn nnodes(&self) -> usize {
    self.nx() * self.ny()
  }

  pub fn node_idx(&self, i: usize, j: usize) -> NodeIdx {
    cartesian_index2linear_index(i, j, self.nx())
  }
  pub fn cart_idx(&self, inode: NodeIdx) -> (usize, usize) {
    linear_index2cartesian_index(inode, self.nx())
  }

  pub fn is_boundary(&self, i: usize, j: usize) -> bool {
    i == 0 || j == 0 || i == self.nx() - 1 || j == self.ny() - 1
  }

  pub fn ninterior(&self) -> usize {
    (self.nx() - 2) * (self.ny() - 2)
  }
}

impl StructuredMesh {
  pub fn node_coords(&self) -> NodeCoords {
    let matrix = na::Matrix2xX::from_fn(self.nnodes(), |r, inode| {
      let coords = if r == 0 { &self.x } else { &self.y };
      coords.as_slice()[inode]
    });
    NodeCoords::new(matrix)
  }

  pub fn boundary_flags(&self) -> Vec<bool> {
    (0..self.nnodes())
      .map(|inode| {
        let (i, j) = self.cart_idx(inode);
        self.is_boundary(i, j)
      })
      .collect()
  }

  /// The 8 grid-adjacent nodes of interior node `(i, j)`, ordered as [`RING_OFFSETS`].
  pub fn ring_neighbors(&self, i: usize, j: usize) -> [NodeIdx; 8] {
    assert!(!self.is_boundary(i, j), "boundary nodes have no full ring");
    RING_OFFSETS.map(|(di, dj)| {
      let ni = i.wrapping_add_signed(di);
      let nj = j.wrapping_add_signed(dj);
      self.node_idx(ni, nj)
    })
  }

  /// Interior nodes in row-major order of `(i, j)`, `i` outermost.
  pub fn interior_nodes(&self) -> impl Iterator<Item = NodeIdx> + '_ {
    (1..self.nx() - 1).flat_map(move |i| (1..self.ny() - 1).map(move |j| self.node_idx(i, j)))
  }
}

pub fn linear_index2cartesian_index(lin_idx: usize, nx: usize) -> (usize, usize) {
  (lin_idx % nx, lin_idx / nx)
}

pub fn cartesian_index2linear_index(i: usize, j: usize, nx: usize) -> usize {
  i + nx * j
}

#[cfg(test)]
mod test {
  use super::StructuredMesh;
  use crate::error::GfdmError;

  #[test]
  fn unit_square_mesh() {
    let mesh = StructuredMesh::new_unit_square(3).unwrap();
    #[rustfmt::skip]
    let expected = na::Matrix2xX::from_column_slice(&[
      0.0, 0.0,
      0.5, 0.0,
      1.0, 0.0,
      0.0, 0.5,
      0.5, 0.5,
      1.0, 0.5,
      0.0, 1.0,
      0.5, 1.0,
      1.0, 1.0,
    ]);
    assert_eq!(*mesh.node_coords().matrix(), expected);

    let boundary = mesh.boundary_flags();
    assert_eq!(boundary.iter().filter(|&&b| !b).count(), 1);
    assert!(!boundary[4]);
    assert_eq!(mesh.ring_neighbors(1, 1), [5, 8, 7, 6, 3, 0, 1, 2]);
  }

  #[test]
  fn interior_nodes_are_row_major() {
    let mesh = StructuredMesh::new_uniform([0.0, 0.0], [1.0, 2.0], 4, 5).unwrap();
    let order: Vec<_> = mesh.interior_nodes().map(|inode| mesh.cart_idx(inode)).collect();
    assert_eq!(
      order,
      vec![(1, 1), (1, 2), (1, 3), (2, 1), (2, 2), (2, 3)]
    );
    assert_eq!(mesh.ninterior(), 6);
  }

  #[test]
  fn rejects_bad_shapes() {
    let x = na::DMatrix::zeros(3, 4);
    let y = na::DMatrix::zeros(4, 3);
    assert_eq!(
      StructuredMesh::new(x, y).unwrap_err(),
      GfdmError::CoordShapeMismatch {
        x: (3, 4),
        y: (4, 3)
      }
    );
    assert_eq!(
      StructuredMesh::new_unit_square(2).unwrap_err(),
      GfdmError::MeshTooSmall { nx: 2, ny: 2 }
    );
  }
}

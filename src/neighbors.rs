//! Neighbor lists for triangulations and unstructured clouds.
//!
//! Each node gets an ordered sequence of at most `max_neighbors` other nodes.
//! The GFDM stencil of a node is built from exactly these neighbors.

use crate::{
  error::{GfdmError, Result},
  mesh::{triangulation::Triangle, NodeCoords},
  NodeIdx,
};

use itertools::Itertools;

pub const DEFAULT_MAX_NEIGHBORS: usize = 8;

/// Marks an unused slot in a padded neighbor table.
pub const NO_NEIGHBOR: isize = -1;

/// Variable-length neighbor sequences of all nodes, in compressed storage.
///
/// Immutable after construction.
#[derive(Debug, Clone, PartialEq)]
pub struct NeighborList {
  /// `offsets[i]..offsets[i + 1]` is the range of node `i` in `indices`.
  offsets: Vec<usize>,
  indices: Vec<NodeIdx>,
  max_neighbors: usize,
}

impl NeighborList {
  pub fn new(lists: Vec<Vec<NodeIdx>>, max_neighbors: usize) -> Result<Self> {
    let nnodes = lists.len();
    for (node, list) in lists.iter().enumerate() {
      if list.len() > max_neighbors {
        return Err(GfdmError::TooManyNeighbors {
          node,
          count: list.len(),
          max: max_neighbors,
        });
      }
      for &neighbor in list {
        if neighbor >= nnodes {
          return Err(GfdmError::NeighborOutOfRange {
            node,
            neighbor,
            nnodes,
          });
        }
        if neighbor == node {
          return Err(GfdmError::SelfNeighbor { node });
        }
      }
    }
    Ok(Self::from_lists_unchecked(lists, max_neighbors))
  }

  /// Converts a sentinel padded table, where each row ends at the first [`NO_NEIGHBOR`].
  ///
  /// The row width is taken as `max_neighbors`.
  pub fn from_padded(rows: &[Vec<isize>]) -> Result<Self> {
    let max_neighbors = rows.iter().map(|row| row.len()).max().unwrap_or(0);
    let lists = rows
      .iter()
      .enumerate()
      .map(|(node, row)| {
        row
          .iter()
          .take_while(|&&v| v != NO_NEIGHBOR)
          .map(|&v| {
            usize::try_from(v).map_err(|_| GfdmError::InvalidNeighborIndex { node, value: v })
          })
          .collect::<Result<Vec<_>>>()
      })
      .collect::<Result<Vec<_>>>()?;
    Self::new(lists, max_neighbors)
  }

  fn from_lists_unchecked(lists: Vec<Vec<NodeIdx>>, max_neighbors: usize) -> Self {
    let mut offsets = Vec::with_capacity(lists.len() + 1);
    offsets.push(0);
    let mut indices = Vec::with_capacity(lists.iter().map(Vec::len).sum());
    for list in lists {
      indices.extend(list);
      offsets.push(indices.len());
    }
    Self {
      offsets,
      indices,
      max_neighbors,
    }
  }

  pub fn nnodes(&self) -> usize {
    self.offsets.len() - 1
  }
  pub fn max_neighbors(&self) -> usize {
    self.max_neighbors
  }

  pub fn neighbors(&self, inode: NodeIdx) -> &[NodeIdx] {
    &self.indices[self.offsets[inode]..self.offsets[inode + 1]]
  }
  pub fn count(&self, inode: NodeIdx) -> usize {
    self.offsets[inode + 1] - self.offsets[inode]
  }

  pub fn iter(&self) -> impl Iterator<Item = &[NodeIdx]> + '_ {
    (0..self.nnodes()).map(|inode| self.neighbors(inode))
  }

  /// Sentinel padded table with `max_neighbors` columns.
  pub fn to_padded(&self) -> Vec<Vec<isize>> {
    self
      .iter()
      .map(|list| {
        let mut row: Vec<isize> = list.iter().map(|&v| v as isize).collect();
        row.resize(self.max_neighbors, NO_NEIGHBOR);
        row
      })
      .collect()
  }
}

/// Source of the neighbor lists of triangulations and clouds.
pub trait NeighborFinder {
  fn find_neighbors(&self, coords: &NodeCoords, max_neighbors: usize) -> NeighborList;
}

/// Neighbors are the nodes sharing a triangle with the central node.
///
/// If there are more than `max_neighbors`, the closest ones are kept.
/// Every list is ordered counter-clockwise around its node.
pub struct TriangleAdjacency<'a> {
  triangles: &'a [Triangle],
}
impl<'a> TriangleAdjacency<'a> {
  pub fn new(triangles: &'a [Triangle]) -> Self {
    Self { triangles }
  }
}
impl NeighborFinder for TriangleAdjacency<'_> {
  fn find_neighbors(&self, coords: &NodeCoords, max_neighbors: usize) -> NeighborList {
    let nnodes = coords.nnodes();
    let mut adjacency = vec![Vec::new(); nnodes];
    for tri in self.triangles {
      for (&a, &b) in tri.iter().tuple_combinations() {
        adjacency[a].push(b);
        adjacency[b].push(a);
      }
    }

    let lists = adjacency
      .into_iter()
      .enumerate()
      .map(|(inode, candidates)| {
        let candidates = candidates.into_iter().unique().collect();
        select_closest(coords, inode, candidates, max_neighbors)
      })
      .collect();
    NeighborList::from_lists_unchecked(lists, max_neighbors)
  }
}

/// The `max_neighbors` nodes closest to the central node, by euclidean distance.
///
/// Every list is ordered counter-clockwise around its node.
pub struct NearestNeighbors;
impl NeighborFinder for NearestNeighbors {
  fn find_neighbors(&self, coords: &NodeCoords, max_neighbors: usize) -> NeighborList {
    let nnodes = coords.nnodes();
    let lists = (0..nnodes)
      .map(|inode| {
        let candidates = (0..nnodes).filter(|&other| other != inode).collect();
        select_closest(coords, inode, candidates, max_neighbors)
      })
      .collect();
    NeighborList::from_lists_unchecked(lists, max_neighbors)
  }
}

fn select_closest(
  coords: &NodeCoords,
  center: NodeIdx,
  mut candidates: Vec<NodeIdx>,
  max_neighbors: usize,
) -> Vec<NodeIdx> {
  let dist2 = |other: NodeIdx| coords.offset(center, other).norm_squared();
  candidates.sort_by(|&a, &b| dist2(a).total_cmp(&dist2(b)).then(a.cmp(&b)));
  candidates.truncate(max_neighbors);
  coords.sort_by_angle(center, &mut candidates);
  candidates
}

#[cfg(test)]
mod test {
  use super::{NearestNeighbors, NeighborFinder, NeighborList, TriangleAdjacency, NO_NEIGHBOR};
  use crate::{
    error::GfdmError,
    mesh::{StructuredMesh, Triangulation},
  };

  #[test]
  fn validation() {
    assert_eq!(
      NeighborList::new(vec![vec![1], vec![0, 2]], 1).unwrap_err(),
      GfdmError::TooManyNeighbors {
        node: 1,
        count: 2,
        max: 1
      }
    );
    assert_eq!(
      NeighborList::new(vec![vec![1], vec![1]], 2).unwrap_err(),
      GfdmError::SelfNeighbor { node: 1 }
    );
    assert_eq!(
      NeighborList::new(vec![vec![2], vec![0]], 2).unwrap_err(),
      GfdmError::NeighborOutOfRange {
        node: 0,
        neighbor: 2,
        nnodes: 2
      }
    );
  }

  #[test]
  fn padded_table_is_trimmed_at_sentinel() {
    let padded = vec![
      vec![1, 2, NO_NEIGHBOR],
      vec![0, NO_NEIGHBOR, NO_NEIGHBOR],
      vec![0, 1, NO_NEIGHBOR],
    ];
    let list = NeighborList::from_padded(&padded).unwrap();
    assert_eq!(list.max_neighbors(), 3);
    assert_eq!(list.neighbors(0), &[1, 2]);
    assert_eq!(list.count(1), 1);
    assert_eq!(list.to_padded(), padded);
  }

  #[test]
  fn nearest_on_grid_is_the_ring() {
    let mesh = StructuredMesh::new_unit_square(5).unwrap();
    let coords = mesh.node_coords();
    let list = NearestNeighbors.find_neighbors(&coords, 8);
    for inode in mesh.interior_nodes() {
      let (i, j) = mesh.cart_idx(inode);
      assert_eq!(list.neighbors(inode), &mesh.ring_neighbors(i, j));
    }
    // Corner nodes have plenty of candidates too.
    assert_eq!(list.count(0), 8);
  }

  #[test]
  fn triangle_adjacency_of_structured_split() {
    let mesh = StructuredMesh::new_unit_square(4).unwrap();
    let tria = Triangulation::from_structured(&mesh);
    let list = TriangleAdjacency::new(tria.triangles()).find_neighbors(tria.coords(), 8);
    let center = mesh.node_idx(1, 1);
    let expected =
      [(2, 1), (2, 2), (1, 2), (0, 1), (0, 0), (1, 0)].map(|(i, j)| mesh.node_idx(i, j));
    assert_eq!(list.neighbors(center), &expected);
    // Corner (0, 0) touches both triangles of its cell.
    assert_eq!(list.count(0), 3);
    // Corner (3, 0) only touches one triangle.
    assert_eq!(list.count(mesh.node_idx(3, 0)), 2);
  }
}
